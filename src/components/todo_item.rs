use crate::components::ui::{
    Badge, Button, ButtonSize, ButtonVariant, Input, Label, Spinner, Textarea,
};
use crate::models::{Todo, TodoStatus, DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::error::TodoResult;
use crate::state::AppContext;
use crate::todos::{ItemMode, TodoItemController};
use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;
use std::str::FromStr;
use strum::IntoEnumIterator;
use wasm_bindgen::JsCast;

fn status_badge_class(status: TodoStatus) -> &'static str {
    match status {
        TodoStatus::Pending => "border-amber-300 bg-amber-50 text-amber-800",
        TodoStatus::InProgress => "border-sky-300 bg-sky-50 text-sky-800",
        TodoStatus::Completed => "border-emerald-300 bg-emerald-50 text-emerald-800",
    }
}

/// `2025-01-01T10:00:00.000Z` -> `2025-01-01 10:00`.
fn short_timestamp(ts: &str) -> String {
    let mut s = ts.replacen('T', " ", 1);
    s.truncate(16);
    s
}

/// The value the status `<select>` must be put back to after an update.
///
/// A success refreshes the list and remounts the row, so only a failure
/// leaves the user's pick stranded in the control.
fn status_to_restore(cached: TodoStatus, result: &TodoResult<()>) -> Option<TodoStatus> {
    result.is_err().then_some(cached)
}

/// One row of the list, backed by its own [`TodoItemController`].
#[component]
pub fn TodoItem(todo: Todo) -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let item = TodoItemController::new(
        app.api_client.clone(),
        app.session_gate.session(),
        app.toaster,
        todo,
        app.refresh.callback(),
    );
    let todo = item.todo().clone();
    let mode = item.mode;
    let busy = item.busy;
    let confirming = item.confirming_delete;
    let edit_title = item.edit_title;
    let edit_description = item.edit_description;
    let item = StoredValue::new(item);
    let cached_status = todo.status;

    let on_status_change = move |ev: web_sys::Event| {
        let Some(select) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlSelectElement>().ok())
        else {
            return;
        };
        let Ok(status) = TodoStatus::from_str(&select.value()) else {
            return;
        };
        let item = item.get_value();
        spawn_local(async move {
            let result = item.update_status(status).await;
            if let Some(restore) = status_to_restore(cached_status, &result) {
                select.set_value(restore.as_str());
            }
        });
    };

    let on_save = move |_: web_sys::MouseEvent| {
        let item = item.get_value();
        spawn_local(async move {
            let _ = item.save_edit().await;
        });
    };

    let on_confirm_delete = move |_: web_sys::MouseEvent| {
        let item = item.get_value();
        spawn_local(async move {
            let _ = item.confirm_delete().await;
        });
    };

    let key_handle = window_event_listener(ev::keydown, move |ev: web_sys::KeyboardEvent| {
        if ev.key() == "Escape" && confirming.get_untracked() {
            item.with_value(|i| i.dismiss_delete());
        }
    });
    on_cleanup(move || key_handle.remove());

    let status = todo.status;
    let title = todo.title.clone();
    let confirm_title = todo.title.clone();
    let description = todo.description.clone();
    let created = short_timestamp(&todo.created_at);

    let viewing = move || {
        let title = title.clone();
        let description = description.clone();
        let created = created.clone();
        view! {
            <div class="flex flex-col gap-2">
                <div class="flex items-start justify-between gap-3">
                    <div class="min-w-0 flex-1">
                        <div class=move || {
                            if status == TodoStatus::Completed {
                                "break-words text-sm font-medium text-muted-foreground line-through"
                            } else {
                                "break-words text-sm font-medium"
                            }
                        }>{title}</div>
                        {description.map(|d| view! {
                            <p class="mt-1 whitespace-pre-wrap break-words text-xs text-muted-foreground">{d}</p>
                        })}
                    </div>
                    <Badge class={status_badge_class(status)}>{status.label()}</Badge>
                </div>

                <div class="flex flex-wrap items-center justify-between gap-2">
                    <span class="text-xs text-muted-foreground">{created}</span>
                    <div class="flex items-center gap-2">
                        <select
                            class="h-8 rounded-md border border-input bg-transparent px-2 text-xs"
                            aria-label="Status"
                            disabled=move || busy.get()
                            on:change=on_status_change
                        >
                            {TodoStatus::iter()
                                .map(|s| view! {
                                    <option value={s.as_str()} selected={s == status}>{s.label()}</option>
                                })
                                .collect_view()}
                        </select>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            attr:disabled=move || busy.get()
                            on:click=move |_| item.with_value(|i| i.begin_edit())
                        >
                            "Edit"
                        </Button>
                        <Button
                            variant=ButtonVariant::Outline
                            size=ButtonSize::Sm
                            class="border-destructive/40 text-destructive"
                            attr:disabled=move || busy.get()
                            on:click=move |_| item.with_value(|i| i.request_delete())
                        >
                            "Delete"
                        </Button>
                    </div>
                </div>
            </div>
        }
    };

    let editing = move || {
        view! {
            <div class="flex flex-col gap-2">
                <div class="flex flex-col gap-1.5">
                    <Label class="text-xs">"Title"</Label>
                    <Input
                        bind_value=edit_title
                        required=true
                        autofocus=true
                        max_chars=TITLE_MAX_CHARS
                        disabled=busy
                        class="h-8 text-sm"
                    />
                </div>
                <div class="flex flex-col gap-1.5">
                    <Label class="text-xs">"Description"</Label>
                    <Textarea
                        bind_value=edit_description
                        max_chars=DESCRIPTION_MAX_CHARS
                        disabled=busy
                        class="text-sm"
                    />
                </div>
                <div class="flex items-center justify-end gap-2">
                    <Button
                        variant=ButtonVariant::Outline
                        size=ButtonSize::Sm
                        attr:disabled=move || busy.get()
                        on:click=move |_| item.with_value(|i| i.cancel_edit())
                    >
                        "Cancel"
                    </Button>
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || busy.get() || edit_title.with(|t| t.trim().is_empty())
                        on:click=on_save
                    >
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || busy.get()>
                                <Spinner />
                            </Show>
                            {move || if busy.get() { "Saving..." } else { "Save" }}
                        </span>
                    </Button>
                </div>
            </div>
        }
    };

    view! {
        <li class="rounded-md border border-border bg-card p-3 shadow-xs">
            <Show when=move || mode.get() == ItemMode::Editing fallback=viewing>
                {editing()}
            </Show>

            <Show when=move || confirming.get()>
                <div class="fixed inset-0 z-50 flex items-center justify-center bg-black/30 px-4">
                    <div class="w-full max-w-sm rounded-md border border-border bg-background p-4 shadow-lg" role="dialog">
                        <div class="mb-3 space-y-1">
                            <div class="text-sm font-medium text-destructive">"Delete todo"</div>
                            <div class="text-xs text-muted-foreground">
                                "This permanently removes \"" {confirm_title.clone()} "\"."
                            </div>
                        </div>
                        <div class="flex items-center justify-end gap-2 pt-2">
                            <Button
                                variant=ButtonVariant::Outline
                                size=ButtonSize::Sm
                                attr:disabled=move || busy.get()
                                on:click=move |_| item.with_value(|i| i.dismiss_delete())
                            >
                                "Cancel"
                            </Button>
                            <Button
                                variant=ButtonVariant::Destructive
                                size=ButtonSize::Sm
                                attr:disabled=move || busy.get()
                                on:click=on_confirm_delete
                            >
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || busy.get()>
                                        <Spinner />
                                    </Show>
                                    {move || if busy.get() { "Deleting..." } else { "Delete" }}
                                </span>
                            </Button>
                        </div>
                    </div>
                </div>
            </Show>
        </li>
    }
}
