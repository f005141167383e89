use crate::api::AuthBackend;
use crate::error::{TodoError, TodoResult};
use crate::models::{AuthEvent, Session};
use crate::notify::Toaster;
use leptos::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub(crate) type SessionListener = Arc<dyn Fn(AuthEvent, Option<Session>) + Send + Sync>;

type Listeners = Arc<Mutex<Vec<(u64, SessionListener)>>>;

/// Session-change feed. Listeners get every change until they unsubscribe.
#[derive(Clone, Default)]
pub(crate) struct SessionFeed {
    listeners: Listeners,
    next_id: Arc<AtomicU64>,
}

/// Handle returned by [`SessionFeed::subscribe`].
pub(crate) struct Subscription {
    id: u64,
    listeners: Listeners,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Ok(mut l) = self.listeners.lock() {
            l.retain(|(id, _)| *id != self.id);
        }
    }
}

impl SessionFeed {
    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut l) = self.listeners.lock() {
            l.push((id, listener));
        }
        Subscription {
            id,
            listeners: self.listeners.clone(),
        }
    }

    pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
        // Snapshot first so a listener may (un)subscribe while being called.
        let snapshot: Vec<SessionListener> = match self.listeners.lock() {
            Ok(l) => l.iter().map(|(_, f)| f.clone()).collect(),
            Err(_) => return,
        };
        for f in snapshot {
            f(event, session.clone());
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.listeners.lock().map(|l| l.len()).unwrap_or(0)
    }
}

/// Listener that only logs. The todo list fetches on mount, so a sign-in
/// needs no extra refresh from here.
pub(crate) fn log_session_changes() -> SessionListener {
    Arc::new(|event: AuthEvent, session: Option<Session>| {
        log::info!(
            "session changed: {event:?} ({})",
            if session.is_some() { "signed in" } else { "signed out" }
        );
    })
}

/// Tracks whether a user is signed in; decides between the auth form and the
/// todo UI.
#[derive(Clone)]
pub(crate) struct SessionGate<A> {
    auth: A,
    toaster: Toaster,
    session: RwSignal<Option<Session>>,
    loading: RwSignal<bool>,
    busy: RwSignal<bool>,
    feed: SessionFeed,
}

impl<A: AuthBackend> SessionGate<A> {
    pub fn new(auth: A, toaster: Toaster) -> Self {
        Self {
            auth,
            toaster,
            session: RwSignal::new(None),
            loading: RwSignal::new(true),
            busy: RwSignal::new(false),
            feed: SessionFeed::default(),
        }
    }

    pub fn session(&self) -> ReadSignal<Option<Session>> {
        self.session.read_only()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.with(|s| s.is_some())
    }

    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.feed.subscribe(listener)
    }

    fn apply(&self, event: AuthEvent, session: Option<Session>) {
        log::debug!(
            "auth event {event:?}, user={:?}",
            session.as_ref().map(|s| s.user_id())
        );
        self.session.set(session.clone());
        self.feed.emit(event, session);
    }

    /// Picks up a persisted session on startup.
    pub async fn restore(&self) {
        let session = self.auth.get_session().await;
        self.loading.set(false);
        self.apply(AuthEvent::InitialSession, session);
    }

    fn begin(&self) -> TodoResult<()> {
        if self.busy.get_untracked() {
            return Err(TodoError::InFlight);
        }
        self.busy.set(true);
        Ok(())
    }

    fn finish(&self, result: TodoResult<()>) -> TodoResult<()> {
        self.busy.set(false);
        if let Err(e) = &result {
            if !e.is_silent() {
                log::warn!("auth request failed: {e}");
            }
            self.toaster.report(e);
        }
        result
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> TodoResult<()> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(TodoError::ValidationFailed);
        }
        self.begin()?;

        let result = match self.auth.sign_in(email.trim(), password).await {
            Ok(session) => {
                self.apply(AuthEvent::SignedIn, Some(session));
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
        self.finish(result)
    }

    /// Returns whether the new account is signed in right away.
    pub async fn sign_up(&self, email: &str, password: &str) -> TodoResult<bool> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(TodoError::ValidationFailed);
        }
        self.begin()?;

        let mut signed_in = false;
        let result = match self.auth.sign_up(email.trim(), password).await {
            Ok(Some(session)) => {
                signed_in = true;
                self.apply(AuthEvent::SignedIn, Some(session));
                Ok(())
            }
            Ok(None) => {
                self.toaster.success("Check your email to confirm your account.");
                Ok(())
            }
            Err(e) => Err(e.into()),
        };
        self.finish(result).map(|_| signed_in)
    }

    /// Local session is dropped even if the backend call fails.
    pub async fn sign_out(&self) {
        let Some(session) = self.session.get_untracked() else {
            return;
        };

        if let Err(e) = self.auth.sign_out(&session).await {
            log::warn!("sign out request failed: {e}");
        }
        self.apply(AuthEvent::SignedOut, None);
        self.toaster.push(
            "Signed out",
            "You have been signed out successfully.",
            crate::notify::ToastVariant::Default,
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::{ApiError, ApiErrorKind, ApiResult};
    use crate::models::AuthUser;
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub(crate) fn session_for(user_id: &str) -> Session {
        Session {
            access_token: format!("token-{user_id}"),
            refresh_token: None,
            expires_at: None,
            user: AuthUser {
                id: user_id.to_string(),
                email: Some(format!("{user_id}@example.com")),
            },
        }
    }

    #[derive(Clone, Default)]
    struct MockAuth {
        stored: Rc<RefCell<Option<Session>>>,
        reject_login: bool,
        confirm_required: bool,
        sign_out_calls: Rc<RefCell<usize>>,
    }

    impl AuthBackend for MockAuth {
        async fn current_user(&self, access_token: &str) -> ApiResult<AuthUser> {
            self.stored
                .borrow()
                .as_ref()
                .filter(|s| s.access_token == access_token)
                .map(|s| s.user.clone())
                .ok_or_else(|| ApiError {
                    kind: ApiErrorKind::Unauthorized,
                    message: "invalid JWT".to_string(),
                })
        }

        async fn get_session(&self) -> Option<Session> {
            self.stored.borrow().clone()
        }

        async fn sign_in(&self, email: &str, _password: &str) -> ApiResult<Session> {
            if self.reject_login {
                return Err(ApiError {
                    kind: ApiErrorKind::Http,
                    message: "Invalid login credentials".to_string(),
                });
            }
            let s = session_for(email);
            *self.stored.borrow_mut() = Some(s.clone());
            Ok(s)
        }

        async fn sign_up(&self, email: &str, password: &str) -> ApiResult<Option<Session>> {
            if self.confirm_required {
                return Ok(None);
            }
            self.sign_in(email, password).await.map(Some)
        }

        async fn sign_out(&self, _session: &Session) -> ApiResult<()> {
            *self.sign_out_calls.borrow_mut() += 1;
            *self.stored.borrow_mut() = None;
            Err(ApiError {
                kind: ApiErrorKind::Network,
                message: "offline".to_string(),
            })
        }
    }

    fn recorder(feed_owner: &SessionGate<MockAuth>) -> (Arc<Mutex<Vec<AuthEvent>>>, Subscription) {
        let events = Arc::new(Mutex::new(vec![]));
        let sink = events.clone();
        let sub = feed_owner.subscribe(Arc::new(move |event: AuthEvent, _: Option<Session>| {
            sink.lock().unwrap().push(event);
        }));
        (events, sub)
    }

    #[test]
    fn test_restore_without_session_shows_auth_form() {
        let gate = SessionGate::new(MockAuth::default(), Toaster::new());
        assert!(gate.loading.get_untracked());

        let (events, _sub) = recorder(&gate);
        block_on(gate.restore());

        assert!(!gate.loading.get_untracked());
        assert!(gate.session().get_untracked().is_none());
        assert_eq!(*events.lock().unwrap(), vec![AuthEvent::InitialSession]);
    }

    #[test]
    fn test_restore_picks_up_stored_session() {
        let auth = MockAuth::default();
        *auth.stored.borrow_mut() = Some(session_for("u-1"));
        let gate = SessionGate::new(auth, Toaster::new());

        block_on(gate.restore());
        assert_eq!(
            gate.session().get_untracked().map(|s| s.user.id),
            Some("u-1".to_string())
        );
    }

    #[test]
    fn test_sign_in_then_sign_out_emits_events_until_unsubscribed() {
        let toaster = Toaster::new();
        let gate = SessionGate::new(MockAuth::default(), toaster);
        let (events, sub) = recorder(&gate);

        block_on(gate.sign_in("u@example.com", "secret")).expect("sign in");
        assert!(gate.session().get_untracked().is_some());

        block_on(gate.sign_out());
        assert!(gate.session().get_untracked().is_none());
        assert_eq!(
            *events.lock().unwrap(),
            vec![AuthEvent::SignedIn, AuthEvent::SignedOut]
        );
        let last = toaster.toasts.get_untracked().pop().expect("toast");
        assert_eq!(last.title, "Signed out");

        sub.unsubscribe();
        assert_eq!(gate.feed.len(), 0);
        block_on(gate.sign_in("u@example.com", "secret")).expect("sign in");
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_sign_in_does_not_bump_list_refresh() {
        let gate = SessionGate::new(MockAuth::default(), Toaster::new());
        let refresh = crate::todos::RefreshTrigger::new();
        let sub = gate.subscribe(log_session_changes());

        block_on(gate.sign_in("u@example.com", "secret")).expect("sign in");
        block_on(gate.sign_out());

        assert_eq!(refresh.get(), 0);
        sub.unsubscribe();
        assert_eq!(gate.feed.len(), 0);
    }

    #[test]
    fn test_sign_out_clears_session_even_when_backend_fails() {
        let auth = MockAuth::default();
        let gate = SessionGate::new(auth.clone(), Toaster::new());
        block_on(gate.sign_in("u@example.com", "pw")).unwrap();

        block_on(gate.sign_out());
        assert_eq!(*auth.sign_out_calls.borrow(), 1);
        assert!(gate.session().get_untracked().is_none());
    }

    #[test]
    fn test_failed_sign_in_surfaces_backend_message() {
        let toaster = Toaster::new();
        let auth = MockAuth {
            reject_login: true,
            ..Default::default()
        };
        let gate = SessionGate::new(auth, toaster);

        let err = block_on(gate.sign_in("u@example.com", "bad")).unwrap_err();
        assert_eq!(err, TodoError::Backend("Invalid login credentials".to_string()));
        assert!(gate.session().get_untracked().is_none());
        assert!(!gate.busy.get_untracked());
        assert_eq!(
            toaster.toasts.get_untracked()[0].description,
            "Invalid login credentials"
        );
    }

    #[test]
    fn test_blank_credentials_are_rejected_silently() {
        let toaster = Toaster::new();
        let gate = SessionGate::new(MockAuth::default(), toaster);
        let err = block_on(gate.sign_in("  ", "pw")).unwrap_err();
        assert_eq!(err, TodoError::ValidationFailed);
        assert!(toaster.toasts.get_untracked().is_empty());
    }

    #[test]
    fn test_sign_up_requiring_confirmation_stays_signed_out() {
        let toaster = Toaster::new();
        let auth = MockAuth {
            confirm_required: true,
            ..Default::default()
        };
        let gate = SessionGate::new(auth, toaster);

        let signed_in = block_on(gate.sign_up("new@example.com", "secret")).unwrap();
        assert!(!signed_in);
        assert!(gate.session().get_untracked().is_none());
        assert_eq!(toaster.toasts.get_untracked().len(), 1);
    }
}
