//! crates/dashboard_core/src/ports.rs
//!
//! Defines the service contracts (traits) the dashboard controller depends on.
//! The backend port hides the HTTP contract; the prompt port hides how the user
//! is alerted and asked for confirmation.

use async_trait::async_trait;
use crate::domain::{ConversationTurn, CreatedDeadline, DeadlineTask, NewDeadline, SearchResult};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PortError {
    /// The backend answered but refused the request. Holds its message verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The backend could not be reached or its answer could not be read.
    #[error("Could not reach the server: {0}")]
    Transport(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// The deadline backend, one method per endpoint.
#[async_trait]
pub trait DashboardBackend: Send + Sync {
    async fn search_material(&self, query: &str) -> PortResult<Vec<SearchResult>>;

    async fn create_deadline(&self, deadline: &NewDeadline) -> PortResult<CreatedDeadline>;

    /// Returns the student's deadlines in the order the backend ranked them.
    async fn optimize_schedule(&self, student_id: &str) -> PortResult<Vec<DeadlineTask>>;

    async fn delete_deadline(&self, task_id: &str) -> PortResult<()>;

    /// Sends `message` along with the prior turns and returns the assistant's reply.
    async fn chat(&self, message: &str, history: &[ConversationTurn]) -> PortResult<String>;
}

/// Synchronous interaction with whoever is driving the dashboard.
pub trait UserPrompt: Send + Sync {
    /// Shows a blocking notice, like a browser alert.
    fn notify(&self, message: &str);

    /// Asks a yes/no question. Returns `true` only on explicit approval.
    fn confirm(&self, question: &str) -> bool;
}
