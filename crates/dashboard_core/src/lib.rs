pub mod domain;
pub mod ports;

pub use domain::{
    ConversationTurn, CreatedDeadline, DeadlineTask, Importance, NewDeadline, Role, SearchResult,
    Transcript, TrustScore, Urgency,
};
pub use ports::{DashboardBackend, PortError, PortResult, UserPrompt};
