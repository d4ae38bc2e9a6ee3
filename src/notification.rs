//! Toast notifications surfaced by the data hooks.
//!
//! Hooks never hand errors back to their callers; they push a toast here and
//! the shell drains the queue on its next render.

use parking_lot::Mutex;
use serde::Serialize;

/// Longest description shown before truncation.
const MAX_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

#[derive(Default)]
pub struct Toaster {
    queue: Mutex<Vec<Toast>>,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, title: &str, description: &str) {
        self.push(ToastKind::Success, title, description);
    }

    pub fn error(&self, title: &str, description: &str) {
        self.push(ToastKind::Error, title, description);
    }

    fn push(&self, kind: ToastKind, title: &str, description: &str) {
        let description = if description.chars().count() > MAX_DESCRIPTION_CHARS {
            let cut: String = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
            format!("{}...", cut)
        } else {
            description.to_string()
        };
        self.queue.lock().push(Toast {
            kind,
            title: title.to_string(),
            description,
        });
    }

    /// Take every pending toast, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.queue.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let toaster = Toaster::new();
        toaster.success("Deal deleted", "Removed Acme");
        toaster.error("Error", "boom");
        let toasts = toaster.drain();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].kind, ToastKind::Success);
        assert_eq!(toasts[1].description, "boom");
        assert!(toaster.drain().is_empty());
    }

    #[test]
    fn test_long_descriptions_are_truncated_on_char_boundary() {
        let toaster = Toaster::new();
        let long = "错".repeat(150);
        toaster.error("Error", &long);
        let toast = &toaster.drain()[0];
        assert!(toast.description.ends_with("..."));
        assert_eq!(toast.description.chars().count(), MAX_DESCRIPTION_CHARS + 3);
    }
}
