use crate::components::ui::{
    Button, Card, CardContent, CardHeader, CardTitle, Input, Label, Spinner, Textarea,
};
use crate::models::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::state::AppContext;
use crate::todos::TodoFormController;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn TodoForm() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let form = TodoFormController::new(
        app.api_client.clone(),
        app.session_gate.session(),
        app.toaster,
        app.refresh.callback(),
    );
    let title = form.title;
    let description = form.description;
    let submitting = form.submitting;
    let form = StoredValue::new(form);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = form.get_value();
        spawn_local(async move {
            let _ = form.submit().await;
        });
    };

    let blank = move || title.with(|t| t.trim().is_empty());

    view! {
        <Card>
            <CardHeader>
                <CardTitle class="text-lg">"Add a todo"</CardTitle>
            </CardHeader>
            <CardContent>
                <form class="flex flex-col gap-3" on:submit=on_submit>
                    <div class="flex flex-col gap-1.5">
                        <Label html_for="new-title" class="text-xs">"Title"</Label>
                        <Input
                            id="new-title"
                            placeholder="What needs to be done?"
                            bind_value=title
                            required=true
                            max_chars=TITLE_MAX_CHARS
                            disabled=submitting
                        />
                    </div>

                    <div class="flex flex-col gap-1.5">
                        <Label html_for="new-description" class="text-xs">"Description"</Label>
                        <Textarea
                            id="new-description"
                            placeholder="Optional details"
                            bind_value=description
                            max_chars=DESCRIPTION_MAX_CHARS
                            disabled=submitting
                        />
                    </div>

                    <Button class="w-full" attr:disabled=move || submitting.get() || blank()>
                        <span class="inline-flex items-center gap-2">
                            <Show when=move || submitting.get()>
                                <Spinner />
                            </Show>
                            {move || if submitting.get() { "Adding..." } else { "Add Todo" }}
                        </span>
                    </Button>
                </form>
            </CardContent>
        </Card>
    }
}
