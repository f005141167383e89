use crate::components::ui::{Button, ButtonSize, ButtonVariant, Spinner};
use crate::components::TodoItem;
use crate::state::AppContext;
use crate::todos::TodoListController;
use icons::{ChevronLeft, ChevronRight};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn TodoList() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let list = TodoListController::new(
        app.api_client.clone(),
        app.session_gate.session(),
        app.toaster,
    );
    let todos = list.todos;
    let loading = list.loading;
    let current_page = list.current_page;
    let refresh = app.refresh;
    let list = StoredValue::new(list);

    // Runs on mount, on every page change and on every refresh signal.
    Effect::new(move |_| {
        let _tick = refresh.get();
        let _page = current_page.get();

        let list = list.get_value();
        spawn_local(async move {
            let _ = list.fetch().await;
        });
    });

    let total_pages = move || list.with_value(|l| l.total_pages());
    let is_empty = move || todos.with(|t| t.is_empty());

    view! {
        <section class="flex flex-col gap-3">
            <Show
                when=move || !is_empty()
                fallback=move || {
                    view! {
                        <div class="flex justify-center py-10 text-sm text-muted-foreground">
                            <Show
                                when=move || loading.get()
                                fallback=|| "No todos yet. Create your first one above!"
                            >
                                <Spinner class="size-6" />
                            </Show>
                        </div>
                    }
                }
            >
                <ul class=move || {
                    if loading.get() {
                        "flex flex-col gap-2 opacity-60 transition-opacity"
                    } else {
                        "flex flex-col gap-2 transition-opacity"
                    }
                }>
                    <For
                        each=move || todos.get()
                        // Every mutable field, so a re-fetched row gets a fresh controller.
                        key=|t| {
                            (
                                t.id.clone(),
                                t.updated_at.clone(),
                                t.status.as_str(),
                                t.title.clone(),
                                t.description.clone(),
                            )
                        }
                        children=move |todo| view! { <TodoItem todo=todo /> }
                    />
                </ul>
            </Show>

            <Show when=move || { total_pages() > 1 }>
                <nav class="flex items-center justify-between pt-1" aria-label="Pagination">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !list.with_value(|l| l.has_prev())
                        on:click=move |_| {
                            list.with_value(|l| l.prev_page());
                        }
                    >
                        <ChevronLeft />
                        "Previous"
                    </Button>
                    <span class="text-xs text-muted-foreground">
                        {move || format!("Page {} of {}", current_page.get(), total_pages())}
                    </span>
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || !list.with_value(|l| l.has_next())
                        on:click=move |_| {
                            list.with_value(|l| l.next_page());
                        }
                    >
                        "Next"
                        <ChevronRight />
                    </Button>
                </nav>
            </Show>
        </section>
    }
}
