use super::require_session;
use crate::api::TodoBackend;
use crate::error::{TodoError, TodoResult};
use crate::models::{validate_fields, NewTodo, Session};
use crate::notify::Toaster;
use leptos::prelude::*;

/// New-item form state: two input buffers and a single-flight submit.
#[derive(Clone)]
pub(crate) struct TodoFormController<B> {
    backend: B,
    session: ReadSignal<Option<Session>>,
    toaster: Toaster,
    on_created: Callback<()>,

    pub title: RwSignal<String>,
    pub description: RwSignal<String>,
    pub submitting: RwSignal<bool>,
}

impl<B: TodoBackend> TodoFormController<B> {
    pub fn new(
        backend: B,
        session: ReadSignal<Option<Session>>,
        toaster: Toaster,
        on_created: Callback<()>,
    ) -> Self {
        Self {
            backend,
            session,
            toaster,
            on_created,
            title: RwSignal::new(String::new()),
            description: RwSignal::new(String::new()),
            submitting: RwSignal::new(false),
        }
    }

    pub async fn submit(&self) -> TodoResult<()> {
        if self.submitting.get_untracked() {
            return Err(TodoError::InFlight);
        }

        let Some((title, description)) = validate_fields(
            &self.title.get_untracked(),
            &self.description.get_untracked(),
        ) else {
            return Err(TodoError::ValidationFailed);
        };

        let session = require_session(self.session).inspect_err(|e| self.toaster.report(e))?;

        self.submitting.set(true);
        let row = NewTodo {
            title,
            description,
            user_id: session.user_id().to_string(),
        };
        let result = self.backend.insert(&session, &row).await;
        // The form may have been unmounted (signed out) while inserting.
        let mounted = self.submitting.try_set(false).is_none();

        match result {
            Ok(()) => {
                log::debug!("created todo {:?}", row.title);
                if mounted {
                    self.title.set(String::new());
                    self.description.set(String::new());
                }
                self.toaster.success("Todo created successfully.");
                self.on_created.try_run(());
                Ok(())
            }
            Err(e) => {
                log::warn!("create failed ({:?}): {e}", e.kind);
                let e = TodoError::from(e);
                self.toaster.report(&e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::session_for;
    use crate::todos::testing::MemoryBackend;
    use futures::executor::block_on;
    use leptos::reactive::owner::Owner;

    struct Harness {
        backend: MemoryBackend,
        form: TodoFormController<MemoryBackend>,
        toaster: Toaster,
        created: RwSignal<u32>,
    }

    fn harness(signed_in: bool) -> Harness {
        let backend = MemoryBackend::default();
        let session = RwSignal::new(signed_in.then(|| session_for("u-1")));
        let toaster = Toaster::new();
        let created = RwSignal::new(0u32);
        let form = TodoFormController::new(
            backend.clone(),
            session.read_only(),
            toaster,
            Callback::new(move |_| created.update(|n| *n += 1)),
        );
        Harness {
            backend,
            form,
            toaster,
            created,
        }
    }

    #[test]
    fn test_blank_title_is_a_silent_noop() {
        let h = harness(true);
        for title in ["", "   ", "\t\n"] {
            h.form.title.set(title.to_string());
            h.form.description.set("details".to_string());
            assert_eq!(block_on(h.form.submit()), Err(TodoError::ValidationFailed));
        }
        assert_eq!(h.backend.total_calls(), 0);
        assert_eq!(h.form.description.get_untracked(), "details");
        assert!(h.toaster.toasts.get_untracked().is_empty());
        assert_eq!(h.created.get_untracked(), 0);
    }

    #[test]
    fn test_create_clears_buffers_and_refreshes_once() {
        let h = harness(true);
        h.form.title.set("  Buy milk  ".to_string());
        h.form.description.set("".to_string());

        block_on(h.form.submit()).unwrap();

        assert_eq!(h.form.title.get_untracked(), "");
        assert_eq!(h.form.description.get_untracked(), "");
        assert_eq!(h.created.get_untracked(), 1);
        assert!(!h.form.submitting.get_untracked());

        let rows = h.backend.state.borrow().rows.clone();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "u-1");
        assert_eq!(rows[0].1.title, "Buy milk");
        assert_eq!(rows[0].1.description, None);
        assert_eq!(h.toaster.toasts.get_untracked()[0].title, "Success!");
    }

    #[test]
    fn test_backend_failure_keeps_buffers_for_retry() {
        let h = harness(true);
        h.backend.fail("insert");
        h.form.title.set("Buy milk".to_string());
        h.form.description.set("2 litres".to_string());

        let err = block_on(h.form.submit()).unwrap_err();
        assert_eq!(err, TodoError::Backend("insert failed".to_string()));
        assert_eq!(h.form.title.get_untracked(), "Buy milk");
        assert_eq!(h.form.description.get_untracked(), "2 litres");
        assert_eq!(h.created.get_untracked(), 0);
        assert!(!h.form.submitting.get_untracked());
        assert_eq!(h.toaster.toasts.get_untracked()[0].description, "insert failed");

        h.backend.heal("insert");
        block_on(h.form.submit()).unwrap();
        assert_eq!(h.created.get_untracked(), 1);
    }

    #[test]
    fn test_signed_out_submit_never_reaches_backend() {
        let h = harness(false);
        h.form.title.set("Buy milk".to_string());
        assert_eq!(block_on(h.form.submit()), Err(TodoError::Unauthenticated));
        assert_eq!(h.backend.total_calls(), 0);
        assert_eq!(h.toaster.toasts.get_untracked().len(), 1);
    }

    #[test]
    fn test_form_unmounted_mid_submit_still_refreshes() {
        let backend = MemoryBackend::default();
        let session = RwSignal::new(Some(session_for("u-1")));
        let toaster = Toaster::new();
        let refresh = crate::todos::RefreshTrigger::new();

        let owner = Owner::new();
        let form = owner.with(|| {
            TodoFormController::new(backend.clone(), session.read_only(), toaster, refresh.callback())
        });
        form.title.set("Buy milk".to_string());

        block_on(async {
            let release = backend.hold_next_call();
            let mut pending = Box::pin(form.submit());
            assert!(futures::poll!(pending.as_mut()).is_pending());

            owner.cleanup();
            drop(owner);

            release.send(()).unwrap();
            assert_eq!(pending.await, Ok(()));
        });

        assert_eq!(backend.state.borrow().rows.len(), 1);
        assert_eq!(refresh.get(), 1);
    }

    #[test]
    fn test_second_submit_while_in_flight_is_dropped() {
        let h = harness(true);
        h.form.title.set("Buy milk".to_string());

        block_on(async {
            let release = h.backend.hold_next_call();
            let mut first = Box::pin(h.form.submit());
            assert!(futures::poll!(first.as_mut()).is_pending());
            assert!(h.form.submitting.get_untracked());

            assert_eq!(h.form.submit().await, Err(TodoError::InFlight));

            release.send(()).unwrap();
            first.await.unwrap();
        });

        assert_eq!(h.backend.calls("insert"), 1);
        assert_eq!(h.created.get_untracked(), 1);
    }
}
