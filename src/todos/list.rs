use super::require_session;
use crate::api::TodoBackend;
use crate::error::{TodoError, TodoResult};
use crate::models::{Session, Todo};
use crate::notify::Toaster;
use leptos::prelude::*;

pub(crate) const PAGE_SIZE: usize = 6;

pub(crate) fn total_pages(count: u64) -> usize {
    (count as usize).div_ceil(PAGE_SIZE)
}

/// `max(1, min(page, total_pages))`.
pub(crate) fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.min(total_pages).max(1)
}

pub(crate) fn page_offset(page: usize) -> usize {
    page.saturating_sub(1) * PAGE_SIZE
}

/// Owns the current page window of the signed-in user's todos.
#[derive(Clone)]
pub(crate) struct TodoListController<B> {
    backend: B,
    session: ReadSignal<Option<Session>>,
    toaster: Toaster,

    pub todos: RwSignal<Vec<Todo>>,
    pub loading: RwSignal<bool>,
    pub current_page: RwSignal<usize>,
    pub total_count: RwSignal<u64>,

    /// Latest fetch; older responses are dropped.
    request_id: RwSignal<u64>,
}

impl<B: TodoBackend> TodoListController<B> {
    pub fn new(backend: B, session: ReadSignal<Option<Session>>, toaster: Toaster) -> Self {
        Self {
            backend,
            session,
            toaster,
            todos: RwSignal::new(vec![]),
            loading: RwSignal::new(true),
            current_page: RwSignal::new(1),
            total_count: RwSignal::new(0),
            request_id: RwSignal::new(0),
        }
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_count.get())
    }

    pub fn has_prev(&self) -> bool {
        self.current_page.get() > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page.get() < self.total_pages()
    }

    /// Returns whether the page actually changed.
    pub fn set_page(&self, page: usize) -> bool {
        let target = clamp_page(page, total_pages(self.total_count.get_untracked()));
        if target == self.current_page.get_untracked() {
            return false;
        }
        log::debug!("page -> {target}");
        self.current_page.set(target);
        true
    }

    pub fn next_page(&self) -> bool {
        self.set_page(self.current_page.get_untracked().saturating_add(1))
    }

    pub fn prev_page(&self) -> bool {
        self.set_page(self.current_page.get_untracked().saturating_sub(1))
    }

    /// Superseded by a newer fetch, or the list was unmounted meanwhile.
    fn is_stale(&self, req_id: u64) -> bool {
        self.request_id.try_get_untracked() != Some(req_id)
    }

    fn fail(&self, e: TodoError) -> TodoResult<()> {
        log::warn!("todo fetch failed: {e}");
        self.toaster.report(&e);
        self.loading.set(false);
        Err(e)
    }

    /// Reads the count and the current page window.
    ///
    /// On error the previously shown rows stay in place.
    pub async fn fetch(&self) -> TodoResult<()> {
        let req_id = self.request_id.get_untracked().saturating_add(1);
        self.request_id.set(req_id);
        self.loading.set(true);

        let session = match require_session(self.session) {
            Ok(s) => s,
            Err(e) => return self.fail(e),
        };
        let page = self.current_page.get_untracked();
        log::debug!("fetching page {page} (request {req_id})");

        let count = self.backend.count(&session).await;
        if self.is_stale(req_id) {
            log::debug!("dropping stale count for request {req_id}");
            return Ok(());
        }
        let count = match count {
            Ok(c) => c,
            Err(e) => return self.fail(e.into()),
        };
        self.total_count.set(count);

        let rows = self
            .backend
            .list_page(&session, page_offset(page), PAGE_SIZE)
            .await;
        if self.is_stale(req_id) {
            log::debug!("dropping stale response for request {req_id}");
            return Ok(());
        }
        match rows {
            Ok(rows) => self.todos.set(rows),
            Err(e) => return self.fail(e.into()),
        }
        self.loading.set(false);

        // The last row of the last page was removed: step back.
        let last = total_pages(count);
        if last >= 1 && page > last {
            self.current_page.set(last);
        }
        Ok(())
    }
}
