use crate::api::ApiClient;
use crate::config::EnvConfig;
use crate::notify::Toaster;
use crate::session::SessionGate;
use crate::todos::RefreshTrigger;

/// Everything the page tree shares, provided once by `App`.
#[derive(Clone)]
pub(crate) struct AppState {
    pub api_client: ApiClient,
    pub session_gate: SessionGate<ApiClient>,
    pub toaster: Toaster,

    /// Bumped by the form and the rows after a successful mutation.
    pub refresh: RefreshTrigger,
}

impl AppState {
    pub fn new(config: &EnvConfig) -> Self {
        let api_client = ApiClient::from_env(config);
        let toaster = Toaster::new();
        Self {
            session_gate: SessionGate::new(api_client.clone(), toaster),
            api_client,
            toaster,
            refresh: RefreshTrigger::new(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub AppState);
