use crate::error::TodoError;
use leptos::prelude::*;

/// How long a toast stays up unless dismissed earlier.
pub(crate) const TOAST_TIMEOUT_MS: u64 = 5_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

/// One-shot user notifications, shown by `<Toaster />`.
#[derive(Clone, Copy)]
pub(crate) struct Toaster {
    pub toasts: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u64>,
}

impl Toaster {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(vec![]),
            next_id: RwSignal::new(1),
        }
    }

    pub fn push(&self, title: &str, description: &str, variant: ToastVariant) -> u64 {
        let Some(id) = self.next_id.try_get_untracked() else {
            log::debug!("toast dropped, toaster is gone: {title}: {description}");
            return 0;
        };
        self.next_id.try_set(id.saturating_add(1));
        self.toasts.try_update(|t| {
            t.push(Toast {
                id,
                title: title.to_string(),
                description: description.to_string(),
                variant,
            })
        });
        id
    }

    pub fn success(&self, description: &str) -> u64 {
        self.push("Success!", description, ToastVariant::Default)
    }

    pub fn error(&self, description: &str) -> u64 {
        self.push("Error", description, ToastVariant::Destructive)
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.try_update(|t| t.retain(|x| x.id != id));
    }

    /// Surfaces `e` unless it is a silent no-op.
    pub fn report(&self, e: &TodoError) {
        if e.is_silent() {
            return;
        }
        self.error(&e.to_string());
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let toaster = Toaster::new();
        let a = toaster.success("Todo created successfully.");
        let b = toaster.error("boom");
        assert_ne!(a, b);

        let toasts = toaster.toasts.get_untracked();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].title, "Success!");
        assert_eq!(toasts[1].variant, ToastVariant::Destructive);

        toaster.dismiss(a);
        let toasts = toaster.toasts.get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].id, b);
    }

    #[test]
    fn test_report_skips_silent_errors() {
        let toaster = Toaster::new();
        toaster.report(&TodoError::ValidationFailed);
        toaster.report(&TodoError::InFlight);
        assert!(toaster.toasts.get_untracked().is_empty());

        toaster.report(&TodoError::Backend("permission denied".to_string()));
        let toasts = toaster.toasts.get_untracked();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].description, "permission denied");
    }
}
