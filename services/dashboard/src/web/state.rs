//! services/dashboard/src/web/state.rs
//!
//! Defines the shared application state and the per-request prompt.

use crate::controller::DashboardController;
use dashboard_core::ports::UserPrompt;
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub controller: Arc<DashboardController>,
    /// Notices raised by the last actions, shown once on the next page render.
    pub notices: Mutex<Vec<String>>,
}

impl AppState {
    pub fn new(controller: Arc<DashboardController>) -> Self {
        Self {
            controller,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Moves the notices collected by a request into the shared queue.
    pub async fn push_notices(&self, prompt: FormPrompt) {
        let collected = prompt.into_notices();
        if !collected.is_empty() {
            self.notices.lock().await.extend(collected);
        }
    }

    pub async fn take_notices(&self) -> Vec<String> {
        std::mem::take(&mut *self.notices.lock().await)
    }
}

//=========================================================================================
// FormPrompt (Specific to One Request)
//=========================================================================================

/// A `UserPrompt` backed by a submitted form. Confirmation comes from a form field;
/// notices are collected and handed back to the page.
pub struct FormPrompt {
    confirmed: bool,
    notices: std::sync::Mutex<Vec<String>>,
}

impl FormPrompt {
    pub fn new(confirmed: bool) -> Self {
        Self {
            confirmed,
            notices: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn into_notices(self) -> Vec<String> {
        self.notices
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UserPrompt for FormPrompt {
    fn notify(&self, message: &str) {
        let mut notices = self
            .notices
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        notices.push(message.to_string());
    }

    fn confirm(&self, _question: &str) -> bool {
        self.confirmed
    }
}
