pub mod toaster;
pub mod todo_form;
pub mod todo_item;
pub mod todo_list;
pub mod ui;

pub use toaster::Toasts;
pub use todo_form::TodoForm;
pub use todo_item::TodoItem;
pub use todo_list::TodoList;
