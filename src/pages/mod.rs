use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardDescription, CardHeader, CardTitle,
    Input, Label, Spinner,
};
use crate::components::{TodoForm, TodoList};
use crate::session::log_session_changes;
use crate::state::AppContext;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AuthMode {
    SignIn,
    SignUp,
}

#[component]
pub fn AuthForm() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let mode: RwSignal<AuthMode> = RwSignal::new(AuthMode::SignIn);

    let gate = StoredValue::new(expect_context::<AppContext>().0.session_gate);
    let busy = move || gate.with_value(|g| g.is_busy());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get_untracked();
        let password_val = password.get_untracked();
        let gate = gate.get_value();

        spawn_local(async move {
            match mode.get_untracked() {
                AuthMode::SignIn => {
                    let _ = gate.sign_in(&email_val, &password_val).await;
                }
                AuthMode::SignUp => {
                    // Confirmation pending: next step is signing in.
                    if let Ok(false) = gate.sign_up(&email_val, &password_val).await {
                        password.set(String::new());
                        mode.set(AuthMode::SignIn);
                    }
                }
            }
        });
    };

    let toggle_mode = move |_: web_sys::MouseEvent| {
        mode.update(|m| {
            *m = match m {
                AuthMode::SignIn => AuthMode::SignUp,
                AuthMode::SignUp => AuthMode::SignIn,
            }
        });
    };

    let is_sign_in = move || mode.get() == AuthMode::SignIn;

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
            <div class="mb-6 flex items-center justify-center">
                <span class="text-sm font-medium text-foreground">"Todo Manager"</span>
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-lg">
                        {move || if is_sign_in() { "Sign in" } else { "Create an account" }}
                    </CardTitle>
                    <CardDescription class="text-xs">
                        "Use your email and password to continue."
                    </CardDescription>
                </CardHeader>

                <CardContent>
                    <form class="flex flex-col gap-3" on:submit=on_submit>
                        <div class="flex flex-col gap-1.5">
                            <Label html_for="email" class="text-xs">"Email"</Label>
                            <Input
                                id="email"
                                r#type="email"
                                placeholder="you@example.com"
                                bind_value=email
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <div class="flex flex-col gap-1.5">
                            <Label html_for="password" class="text-xs">"Password"</Label>
                            <Input
                                id="password"
                                r#type="password"
                                placeholder="••••••••"
                                bind_value=password
                                required=true
                                class="h-8 text-sm"
                            />
                        </div>

                        <Button class="w-full" size=ButtonSize::Sm attr:disabled=busy>
                            <span class="inline-flex items-center gap-2">
                                <Show when=busy>
                                    <Spinner />
                                </Show>
                                {move || match (busy(), is_sign_in()) {
                                    (true, true) => "Signing in...",
                                    (true, false) => "Creating account...",
                                    (false, true) => "Sign in",
                                    (false, false) => "Sign up",
                                }}
                            </span>
                        </Button>

                        <div class="pt-1 text-xs text-muted-foreground">
                            {move || if is_sign_in() { "No account? " } else { "Already registered? " }}
                            <button
                                type="button"
                                class="text-primary underline underline-offset-4 hover:cursor-pointer"
                                on:click=toggle_mode
                            >
                                {move || if is_sign_in() { "Sign up" } else { "Sign in" }}
                            </button>
                        </div>
                    </form>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
fn TodoShell() -> impl IntoView {
    let gate = StoredValue::new(expect_context::<AppContext>().0.session_gate);
    let session = gate.with_value(|g| g.session());
    let email = move || {
        session
            .get()
            .and_then(|s| s.user.email)
            .unwrap_or_default()
    };

    let on_sign_out = move |_: web_sys::MouseEvent| {
        let gate = gate.get_value();
        spawn_local(async move {
            gate.sign_out().await;
        });
    };

    view! {
        <div class="mx-auto flex min-h-screen w-full max-w-2xl flex-col gap-4 px-4 py-8">
            <header class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Todo Manager"</h1>
                <div class="flex items-center gap-3">
                    <span class="text-xs text-muted-foreground">{email}</span>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_sign_out>
                        "Sign Out"
                    </Button>
                </div>
            </header>

            <TodoForm />
            <TodoList />
        </div>
    }
}

/// `/`: loading placeholder, then either the auth form or the todo UI.
#[component]
pub fn IndexPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let gate = StoredValue::new(app.session_gate);

    let subscription = gate.with_value(|g| g.subscribe(log_session_changes()));
    on_cleanup(move || subscription.unsubscribe());

    view! {
        <div class="min-h-screen bg-background">
            <Show
                when=move || !gate.with_value(|g| g.is_loading())
                fallback=|| view! {
                    <div class="flex min-h-screen items-center justify-center gap-2 text-sm text-muted-foreground">
                        <Spinner />
                        "Loading..."
                    </div>
                }
            >
                <Show
                    when=move || gate.with_value(|g| g.is_authenticated())
                    fallback=AuthForm
                >
                    <TodoShell />
                </Show>
            </Show>
        </div>
    }
}
