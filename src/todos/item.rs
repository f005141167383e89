use super::require_session;
use crate::api::{ApiResult, TodoBackend};
use crate::error::{TodoError, TodoResult};
use crate::models::{validate_fields, Session, Todo, TodoPatch, TodoStatus};
use crate::notify::Toaster;
use leptos::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ItemMode {
    Viewing,
    Editing,
}

/// Per-row controller: `Viewing ⇄ Editing`, plus a delete confirmation.
///
/// The row it was built from is never patched locally; after a successful
/// mutation `on_changed` runs and the list hands out a fresh row.
#[derive(Clone)]
pub(crate) struct TodoItemController<B> {
    backend: B,
    session: ReadSignal<Option<Session>>,
    toaster: Toaster,
    on_changed: Callback<()>,
    todo: Todo,

    pub mode: RwSignal<ItemMode>,
    pub edit_title: RwSignal<String>,
    pub edit_description: RwSignal<String>,
    pub busy: RwSignal<bool>,
    pub confirming_delete: RwSignal<bool>,
}

impl<B: TodoBackend> TodoItemController<B> {
    pub fn new(
        backend: B,
        session: ReadSignal<Option<Session>>,
        toaster: Toaster,
        todo: Todo,
        on_changed: Callback<()>,
    ) -> Self {
        let edit_title = RwSignal::new(todo.title.clone());
        let edit_description = RwSignal::new(todo.description.clone().unwrap_or_default());
        Self {
            backend,
            session,
            toaster,
            on_changed,
            todo,
            mode: RwSignal::new(ItemMode::Viewing),
            edit_title,
            edit_description,
            busy: RwSignal::new(false),
            confirming_delete: RwSignal::new(false),
        }
    }

    pub fn todo(&self) -> &Todo {
        &self.todo
    }

    fn reset_buffers(&self) {
        self.edit_title.set(self.todo.title.clone());
        self.edit_description
            .set(self.todo.description.clone().unwrap_or_default());
    }

    pub fn begin_edit(&self) {
        if self.busy.get_untracked() || self.mode.get_untracked() != ItemMode::Viewing {
            return;
        }
        self.reset_buffers();
        self.mode.set(ItemMode::Editing);
    }

    pub fn cancel_edit(&self) {
        if self.busy.get_untracked() || self.mode.get_untracked() != ItemMode::Editing {
            return;
        }
        self.reset_buffers();
        self.mode.set(ItemMode::Viewing);
    }

    pub fn request_delete(&self) {
        if self.busy.get_untracked() || self.mode.get_untracked() != ItemMode::Viewing {
            return;
        }
        self.confirming_delete.set(true);
    }

    pub fn dismiss_delete(&self) {
        if self.busy.get_untracked() {
            return;
        }
        self.confirming_delete.set(false);
    }

    /// Marks the item busy and resolves the session, or explains why not.
    fn begin(&self) -> TodoResult<Session> {
        if self.busy.get_untracked() {
            return Err(TodoError::InFlight);
        }
        let session = require_session(self.session).inspect_err(|e| self.toaster.report(e))?;
        self.busy.set(true);
        Ok(session)
    }

    /// Runs after the backend answered. The row may have been unmounted in
    /// the meantime, so its own signals are only touched through `try_*`.
    fn settle(&self, op: &str, result: ApiResult<()>, success: &str) -> TodoResult<()> {
        if self.busy.try_set(false).is_some() {
            log::debug!("{op} {} finished after the row was unmounted", self.todo.id);
        }
        match result {
            Ok(()) => {
                log::debug!("{op} {} ok", self.todo.id);
                self.toaster.success(success);
                self.on_changed.try_run(());
                Ok(())
            }
            Err(e) => {
                log::warn!("{op} {} failed ({:?}): {e}", self.todo.id, e.kind);
                let e = TodoError::from(e);
                self.toaster.report(&e);
                Err(e)
            }
        }
    }

    /// Any status may follow any other, itself included.
    pub async fn update_status(&self, status: TodoStatus) -> TodoResult<()> {
        if self.mode.get_untracked() != ItemMode::Viewing {
            return Ok(());
        }
        let session = self.begin()?;
        let result = self
            .backend
            .update(&session, &self.todo.id, &TodoPatch::status(status))
            .await;
        self.settle("status update", result, "Todo status updated.")
    }

    pub async fn save_edit(&self) -> TodoResult<()> {
        if self.mode.get_untracked() != ItemMode::Editing {
            return Ok(());
        }
        let Some((title, description)) = validate_fields(
            &self.edit_title.get_untracked(),
            &self.edit_description.get_untracked(),
        ) else {
            return Err(TodoError::ValidationFailed);
        };
        let session = self.begin()?;

        let result = self
            .backend
            .update(&session, &self.todo.id, &TodoPatch::content(title, description))
            .await;
        if result.is_ok() {
            self.mode.try_set(ItemMode::Viewing);
        }
        self.settle("edit", result, "Todo updated successfully.")
    }

    /// Only acts while the confirmation is open; closes it either way.
    pub async fn confirm_delete(&self) -> TodoResult<()> {
        if !self.confirming_delete.get_untracked() {
            return Ok(());
        }
        let session = match self.begin() {
            Ok(s) => s,
            Err(TodoError::InFlight) => return Err(TodoError::InFlight),
            Err(e) => {
                self.confirming_delete.set(false);
                return Err(e);
            }
        };

        let result = self.backend.delete(&session, &self.todo.id).await;
        self.confirming_delete.try_set(false);
        self.settle("delete", result, "Todo deleted successfully.")
    }
}
