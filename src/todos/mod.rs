//! Client-side state machines behind the todo page.
//!
//! None of the controllers patch rows locally after a mutation: they fire the
//! shared [`RefreshTrigger`] and the list re-reads the current page.

mod create;
mod item;
mod list;

pub(crate) use create::TodoFormController;
pub(crate) use item::{ItemMode, TodoItemController};
pub(crate) use list::TodoListController;

use crate::error::{TodoError, TodoResult};
use crate::models::Session;
use leptos::prelude::*;

pub(crate) fn require_session(session: ReadSignal<Option<Session>>) -> TodoResult<Session> {
    session.get_untracked().ok_or(TodoError::Unauthenticated)
}

/// Monotonic counter the list watches; bumped after every successful mutation.
///
/// Create it at app level: the callback handed to rows and forms lives with
/// the trigger, so it outlasts a row unmounted mid-request.
#[derive(Clone, Copy)]
pub(crate) struct RefreshTrigger {
    counter: RwSignal<u32>,
    on_change: Callback<()>,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        let counter = RwSignal::new(0u32);
        Self {
            counter,
            on_change: Callback::new(move |_| counter.update(|n| *n = n.wrapping_add(1))),
        }
    }

    /// Tracked read, for effects.
    pub fn get(&self) -> u32 {
        self.counter.get()
    }

    pub fn callback(&self) -> Callback<()> {
        self.on_change
    }
}

impl Default for RefreshTrigger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::api::{ApiError, ApiErrorKind, ApiResult, TodoBackend};
    use crate::models::{NewTodo, Session, Todo, TodoPatch, TodoStatus};
    use futures::channel::oneshot;
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    #[derive(Default)]
    pub(crate) struct MemoryState {
        /// `(owner user id, row)`.
        pub rows: Vec<(String, Todo)>,
        /// Operation names in call order.
        pub calls: Vec<&'static str>,
        pub failing: HashSet<&'static str>,
        gate: Option<oneshot::Receiver<()>>,
        clock: u32,
    }

    /// In-memory `todos` table.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryBackend {
        pub state: Rc<RefCell<MemoryState>>,
    }

    impl MemoryBackend {
        pub fn seed(&self, user_id: &str, n: usize) {
            for i in 1..=n {
                self.push_row(user_id, &format!("Todo {i}"), None);
            }
        }

        fn push_row(&self, user_id: &str, title: &str, description: Option<String>) {
            let mut s = self.state.borrow_mut();
            s.clock += 1;
            let ts = format!("2025-01-01T{:02}:{:02}:00Z", s.clock / 60, s.clock % 60);
            let row = Todo {
                id: format!("todo-{}", s.clock),
                title: title.to_string(),
                description,
                status: TodoStatus::Pending,
                created_at: ts.clone(),
                updated_at: ts,
            };
            s.rows.push((user_id.to_string(), row));
        }

        pub fn fail(&self, op: &'static str) {
            self.state.borrow_mut().failing.insert(op);
        }

        pub fn heal(&self, op: &'static str) {
            self.state.borrow_mut().failing.remove(op);
        }

        /// The next backend call parks until the returned sender fires.
        pub fn hold_next_call(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.state.borrow_mut().gate = Some(rx);
            tx
        }

        pub fn calls(&self, op: &str) -> usize {
            self.state.borrow().calls.iter().filter(|c| **c == op).count()
        }

        pub fn total_calls(&self) -> usize {
            self.state.borrow().calls.len()
        }

        pub fn row(&self, id: &str) -> Option<Todo> {
            self.state
                .borrow()
                .rows
                .iter()
                .find(|(_, t)| t.id == id)
                .map(|(_, t)| t.clone())
        }

        async fn enter(&self, op: &'static str) -> ApiResult<()> {
            let gate = {
                let mut s = self.state.borrow_mut();
                s.calls.push(op);
                s.gate.take()
            };
            if let Some(rx) = gate {
                let _ = rx.await;
            }
            if self.state.borrow().failing.contains(op) {
                return Err(ApiError {
                    kind: ApiErrorKind::Http,
                    message: format!("{op} failed"),
                });
            }
            Ok(())
        }
    }

    impl TodoBackend for MemoryBackend {
        async fn count(&self, session: &Session) -> ApiResult<u64> {
            self.enter("count").await?;
            let s = self.state.borrow();
            Ok(s.rows.iter().filter(|(u, _)| u == session.user_id()).count() as u64)
        }

        async fn list_page(
            &self,
            session: &Session,
            offset: usize,
            limit: usize,
        ) -> ApiResult<Vec<Todo>> {
            self.enter("list").await?;
            let s = self.state.borrow();
            let mut mine: Vec<Todo> = s
                .rows
                .iter()
                .filter(|(u, _)| u == session.user_id())
                .map(|(_, t)| t.clone())
                .collect();
            mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(mine.into_iter().skip(offset).take(limit).collect())
        }

        async fn insert(&self, session: &Session, row: &NewTodo) -> ApiResult<()> {
            self.enter("insert").await?;
            assert_eq!(row.user_id, session.user_id());
            self.push_row(&row.user_id, &row.title, row.description.clone());
            Ok(())
        }

        async fn update(&self, _session: &Session, id: &str, patch: &TodoPatch) -> ApiResult<()> {
            self.enter("update").await?;
            let mut s = self.state.borrow_mut();
            if let Some((_, t)) = s.rows.iter_mut().find(|(_, t)| t.id == id) {
                if let Some(title) = &patch.title {
                    t.title = title.clone();
                }
                if let Some(description) = &patch.description {
                    t.description = description.clone();
                }
                if let Some(status) = patch.status {
                    t.status = status;
                }
            }
            Ok(())
        }

        async fn delete(&self, _session: &Session, id: &str) -> ApiResult<()> {
            self.enter("delete").await?;
            self.state.borrow_mut().rows.retain(|(_, t)| t.id != id);
            Ok(())
        }
    }
}
