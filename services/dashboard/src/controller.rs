//! services/dashboard/src/controller.rs
//!
//! The dashboard controller. It owns every piece of view state (the four panels,
//! the shared student id and the chat transcript) and drives the backend port.
//!
//! Locks are only held for short, synchronous state updates and never across a
//! backend call, so independent panels interleave freely. Backend calls and the
//! state write-back that follows them run on a spawned task, so a request that
//! is dropped mid-call still leaves its panel in a settled state.

use crate::config::Config;
use dashboard_core::{
    domain::{
        normalize_due_input, ConversationTurn, DeadlineTask, Importance, NewDeadline,
        SearchResult, Transcript,
    },
    ports::{DashboardBackend, PortError, UserPrompt},
};
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const EMPTY_QUERY_NOTICE: &str = "Please enter a search keyword.";
pub const MISSING_DUE_NOTICE: &str = "Please choose a due time.";
pub const DELETE_QUESTION: &str = "Are you sure you want to delete this deadline?";
pub const CONNECTION_ERROR: &str = "Could not connect to the server.";
pub const CHAT_NETWORK_ERROR: &str = "Network error.";

//=========================================================================================
// View State
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum SearchView {
    Idle,
    Loading { query: String },
    Results { query: String, items: Vec<SearchResult> },
    NoResults { query: String },
    Failed { query: String, message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeadlineView {
    Idle,
    Submitting,
    Created { priority_score: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleView {
    NotLoaded,
    Loading { student_id: String },
    Loaded { student_id: String, tasks: Vec<DeadlineTask> },
    Failed { student_id: String, message: String },
}

/// The two states of the chat widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    AwaitingReply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatEntryKind {
    User,
    Assistant,
    Error,
}

/// A line shown in the chat box. Error lines are display-only.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub kind: ChatEntryKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatView {
    pub phase: ChatPhase,
    pub visible: bool,
    /// The most recent lines, oldest first.
    pub entries: VecDeque<ChatEntry>,
}

impl ChatView {
    fn push_entry(&mut self, entry: ChatEntry, limit: usize) {
        while self.entries.len() >= limit.max(1) {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// Everything needed to render the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub student_id: String,
    pub search: SearchView,
    pub deadline: DeadlineView,
    pub schedule: ScheduleView,
    pub chat: ChatView,
}

/// Outcome of a chat send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSend {
    Sent,
    /// Empty message, or a reply was still pending.
    Ignored,
}

/// The deadline form as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeadlineForm {
    #[serde(default)]
    pub student_id: String,
    #[serde(default)]
    pub subject_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub importance: String,
    #[serde(default)]
    pub due_at: String,
}

struct Inner {
    view: ViewState,
    transcript: Transcript,
}

//=========================================================================================
// DashboardController
//=========================================================================================

pub struct DashboardController {
    backend: Arc<dyn DashboardBackend>,
    default_student_id: String,
    chat_display_limit: usize,
    inner: Arc<Mutex<Inner>>,
}

impl DashboardController {
    pub fn new(backend: Arc<dyn DashboardBackend>, config: &Config) -> Self {
        Self {
            backend,
            default_student_id: config.default_student_id.clone(),
            chat_display_limit: config.chat_display_limit,
            inner: Arc::new(Mutex::new(Inner {
                view: ViewState {
                    student_id: String::new(),
                    search: SearchView::Idle,
                    deadline: DeadlineView::Idle,
                    schedule: ScheduleView::NotLoaded,
                    chat: ChatView {
                        phase: ChatPhase::Idle,
                        visible: true,
                        entries: VecDeque::new(),
                    },
                },
                transcript: Transcript::with_capacity(config.chat_history_limit),
            })),
        }
    }

    /// A copy of the current view state.
    pub async fn snapshot(&self) -> ViewState {
        self.inner.lock().await.view.clone()
    }

    /// The turns that would accompany the next chat message.
    pub async fn transcript(&self) -> Vec<ConversationTurn> {
        self.inner.lock().await.transcript.history()
    }

    pub async fn set_student_id(&self, student_id: &str) {
        self.inner.lock().await.view.student_id = student_id.trim().to_string();
    }

    fn resolve_student_id(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.default_student_id.clone()
        } else {
            trimmed.to_string()
        }
    }

    // --- Search ---

    pub async fn search(&self, query: &str, prompt: &dyn UserPrompt) {
        let query = query.trim().to_string();
        if query.is_empty() {
            prompt.notify(EMPTY_QUERY_NOTICE);
            return;
        }

        self.inner.lock().await.view.search = SearchView::Loading { query: query.clone() };
        info!("Searching materials for '{}'", query);

        let backend = self.backend.clone();
        let shared = self.inner.clone();
        let task = tokio::spawn(async move {
            let next = match backend.search_material(&query).await {
                Ok(items) if items.is_empty() => SearchView::NoResults { query },
                Ok(items) => SearchView::Results { query, items },
                Err(e) => {
                    warn!("Search failed: {}", e);
                    let message = match e {
                        PortError::Rejected(msg) => msg,
                        _ => CONNECTION_ERROR.to_string(),
                    };
                    SearchView::Failed { query, message }
                }
            };
            shared.lock().await.view.search = next;
        });
        if let Err(e) = task.await {
            error!("Search task failed: {}", e);
        }
    }

    // --- Deadlines ---

    pub async fn submit_deadline(&self, form: DeadlineForm, prompt: &dyn UserPrompt) {
        if form.due_at.trim().is_empty() {
            prompt.notify(MISSING_DUE_NOTICE);
            return;
        }
        let Some(due_at) = normalize_due_input(&form.due_at) else {
            prompt.notify(&format!("'{}' is not a valid due time.", form.due_at.trim()));
            return;
        };
        let Some(importance) = Importance::parse(&form.importance) else {
            prompt.notify(&format!(
                "Importance must be between {} and {}.",
                Importance::MIN,
                Importance::MAX
            ));
            return;
        };

        let student_id = self.resolve_student_id(&form.student_id);
        let deadline = NewDeadline {
            student_id: student_id.clone(),
            subject_id: form.subject_id.trim().to_string(),
            title: form.title.trim().to_string(),
            importance,
            due_at,
        };

        {
            let mut inner = self.inner.lock().await;
            inner.view.student_id = form.student_id.trim().to_string();
            inner.view.deadline = DeadlineView::Submitting;
        }
        info!("Submitting deadline '{}' for {}", deadline.title, student_id);

        let backend = self.backend.clone();
        let shared = self.inner.clone();
        let task = tokio::spawn(async move {
            let result = backend.create_deadline(&deadline).await;
            shared.lock().await.view.deadline = match &result {
                Ok(created) => DeadlineView::Created {
                    priority_score: created.priority_score,
                },
                Err(_) => DeadlineView::Idle,
            };
            result
        });

        match task.await {
            Ok(Ok(_)) => self.refresh_schedule(&student_id).await,
            Ok(Err(e)) => {
                error!("Failed to create deadline: {}", e);
                match e {
                    PortError::Rejected(msg) => prompt.notify(&format!("Error: {}", msg)),
                    _ => prompt.notify(CONNECTION_ERROR),
                }
            }
            Err(e) => {
                error!("Deadline task failed: {}", e);
                self.inner.lock().await.view.deadline = DeadlineView::Idle;
                prompt.notify(CONNECTION_ERROR);
            }
        }
    }

    // --- Schedule ---

    pub async fn refresh_schedule(&self, student_id: &str) {
        let student_id = self.resolve_student_id(student_id);
        self.inner.lock().await.view.schedule = ScheduleView::Loading {
            student_id: student_id.clone(),
        };
        self.fetch_schedule(student_id).await;
    }

    /// Loads the schedule for the first view. Returns `false` when it is already
    /// loaded or another caller is loading it.
    pub async fn load_schedule_once(&self) -> bool {
        let student_id = {
            let mut inner = self.inner.lock().await;
            if inner.view.schedule != ScheduleView::NotLoaded {
                return false;
            }
            let student_id = self.resolve_student_id(&inner.view.student_id);
            inner.view.schedule = ScheduleView::Loading {
                student_id: student_id.clone(),
            };
            student_id
        };
        self.fetch_schedule(student_id).await;
        true
    }

    async fn fetch_schedule(&self, student_id: String) {
        let backend = self.backend.clone();
        let shared = self.inner.clone();
        let task = tokio::spawn(async move {
            let next = match backend.optimize_schedule(&student_id).await {
                Ok(tasks) => ScheduleView::Loaded { student_id, tasks },
                Err(e) => {
                    warn!("Failed to load schedule for {}: {}", student_id, e);
                    let message = match e {
                        PortError::Rejected(msg) => format!("Failed to load deadlines: {}", msg),
                        _ => "Failed to load deadlines.".to_string(),
                    };
                    ScheduleView::Failed { student_id, message }
                }
            };
            shared.lock().await.view.schedule = next;
        });
        if let Err(e) = task.await {
            error!("Schedule task failed: {}", e);
        }
    }

    pub async fn delete_deadline(&self, task_id: &str, prompt: &dyn UserPrompt) {
        if !prompt.confirm(DELETE_QUESTION) {
            info!("Deletion of {} cancelled.", task_id);
            return;
        }

        match self.backend.delete_deadline(task_id).await {
            Ok(()) => {
                let student_id = self.inner.lock().await.view.student_id.clone();
                self.refresh_schedule(&student_id).await;
            }
            Err(PortError::Rejected(msg)) => {
                warn!("Backend refused to delete {}: {}", task_id, msg);
                prompt.notify(&format!("Delete failed: {}", msg));
            }
            Err(e) => {
                error!("Failed to delete {}: {}", task_id, e);
                prompt.notify("Could not connect to the server while deleting.");
            }
        }
    }

    // --- Chat ---

    pub async fn send_chat(&self, message: &str) -> ChatSend {
        let message = message.trim().to_string();
        if message.is_empty() {
            return ChatSend::Ignored;
        }

        // Check and flip the phase under one lock so a concurrent send sees AwaitingReply.
        let history = {
            let mut inner = self.inner.lock().await;
            if inner.view.chat.phase == ChatPhase::AwaitingReply {
                info!("Chat reply still pending; message ignored.");
                return ChatSend::Ignored;
            }
            inner.view.chat.phase = ChatPhase::AwaitingReply;
            let history = inner.transcript.history();
            inner.transcript.push(ConversationTurn::user(message.clone()));
            inner.view.chat.push_entry(
                ChatEntry {
                    kind: ChatEntryKind::User,
                    text: message.clone(),
                },
                self.chat_display_limit,
            );
            history
        };

        let backend = self.backend.clone();
        let shared = self.inner.clone();
        let display_limit = self.chat_display_limit;
        let task = tokio::spawn(async move {
            let result = backend.chat(&message, &history).await;

            let mut inner = shared.lock().await;
            let entry = match result {
                Ok(reply) => {
                    inner.transcript.push(ConversationTurn::assistant(reply.clone()));
                    ChatEntry {
                        kind: ChatEntryKind::Assistant,
                        text: reply,
                    }
                }
                Err(e) => {
                    warn!("Chat request failed: {}", e);
                    let text = match e {
                        PortError::Rejected(msg) => msg,
                        _ => CHAT_NETWORK_ERROR.to_string(),
                    };
                    ChatEntry {
                        kind: ChatEntryKind::Error,
                        text,
                    }
                }
            };
            inner.view.chat.push_entry(entry, display_limit);
            inner.view.chat.phase = ChatPhase::Idle;
        });
        if let Err(e) = task.await {
            error!("Chat task failed: {}", e);
            self.inner.lock().await.view.chat.phase = ChatPhase::Idle;
        }
        ChatSend::Sent
    }

    /// Shows or hides the chat box. Returns the new visibility.
    pub async fn toggle_chat(&self) -> bool {
        let mut inner = self.inner.lock().await;
        inner.view.chat.visible = !inner.view.chat.visible;
        inner.view.chat.visible
    }
}
