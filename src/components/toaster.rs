use crate::components::ui::{Alert, AlertDescription, AlertTitle, Button, ButtonSize, ButtonVariant};
use crate::notify::{Toast, ToastVariant, Toaster, TOAST_TIMEOUT_MS};
use icons::X;
use leptos::prelude::*;
use wasm_bindgen::JsCast;

fn schedule_dismiss(toaster: Toaster, id: u64) {
    let _ = window().set_timeout_with_callback_and_timeout_and_arguments_0(
        wasm_bindgen::closure::Closure::once_into_js(move || toaster.dismiss(id))
            .as_ref()
            .unchecked_ref(),
        TOAST_TIMEOUT_MS as i32,
    );
}

#[component]
fn ToastCard(toast: Toast, toaster: Toaster) -> impl IntoView {
    let id = toast.id;
    schedule_dismiss(toaster, id);

    let class = match toast.variant {
        ToastVariant::Default => "pr-10",
        ToastVariant::Destructive => "pr-10 border-destructive/40 text-destructive",
    };

    view! {
        <Alert class=class attr:role="status">
            <AlertTitle>{toast.title}</AlertTitle>
            <AlertDescription class="text-muted-foreground">{toast.description}</AlertDescription>
            <Button
                variant=ButtonVariant::Ghost
                size=ButtonSize::Icon
                class="absolute right-1 top-1"
                attr:aria-label="Dismiss"
                on:click=move |_| toaster.dismiss(id)
            >
                <X />
            </Button>
        </Alert>
    }
}

/// Bottom-right stack of the live toasts.
#[component]
pub fn Toasts(toaster: Toaster) -> impl IntoView {
    view! {
        <div class="pointer-events-none fixed bottom-4 right-4 z-[60] flex w-full max-w-sm flex-col gap-2">
            <For
                each=move || toaster.toasts.get()
                key=|t| t.id
                children=move |toast| {
                    view! {
                        <div class="pointer-events-auto">
                            <ToastCard toast=toast toaster=toaster />
                        </div>
                    }
                }
            />
        </div>
    }
}
