use crate::components::Toasts;
use crate::config::EnvConfig;
use crate::pages::IndexPage;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
    let state = AppState::new(&EnvConfig::new());
    let toaster = state.toaster;

    let gate = state.session_gate.clone();
    spawn_local(async move {
        gate.restore().await;
    });

    provide_context(AppContext(state));

    view! {
        <Router>
            <Routes fallback=|| view! { <div class="px-4 py-8 text-xs text-muted-foreground">"Not found"</div> }>
                <Route path=path!("") view=IndexPage />
            </Routes>
        </Router>
        <Toasts toaster=toaster />
    }
}
