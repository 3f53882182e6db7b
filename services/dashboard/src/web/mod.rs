pub mod routes;
pub mod state;

// Re-export the router so the binary can mount it directly.
pub use routes::router;
pub use state::{AppState, FormPrompt};
