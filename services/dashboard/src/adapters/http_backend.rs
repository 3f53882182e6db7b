//! services/dashboard/src/adapters/http_backend.rs
//!
//! This module contains the adapter for the deadline backend.
//! It implements the `DashboardBackend` port from the `core` crate over HTTP.

use async_trait::async_trait;
use dashboard_core::{
    domain::{
        ConversationTurn, CreatedDeadline, DeadlineTask, Importance, NewDeadline, SearchResult,
        TrustScore,
    },
    ports::{DashboardBackend, PortError, PortResult},
};
use reqwest::{header::CONTENT_TYPE, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::adapters::wire::{
    ChatRequest, ChatResponse, ChatTurn, CreateDeadlineRequest, CreateDeadlineResponse,
    DeleteDeadlineRequest, ScheduleRequest, ScheduleResponse, SearchRequest, SearchResponse,
    StatusResponse, STATUS_SUCCESS,
};

const SEARCH_PATH: &str = "/api/search/material";
const CREATE_PATH: &str = "/api/deadline/create";
const SCHEDULE_PATH: &str = "/api/schedule/optimize";
const DELETE_PATH: &str = "/api/deadline/delete";
const CHAT_PATH: &str = "/api/chat";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `DashboardBackend` with JSON `POST`s against the backend origin.
#[derive(Clone)]
pub struct HttpBackendAdapter {
    http: reqwest::Client,
    api_base: String,
}

/// A decoded reply. `body` is `None` when the payload was not the JSON we expected.
struct BackendReply<R> {
    status: StatusCode,
    body: Option<R>,
}

impl HttpBackendAdapter {
    /// Creates a new `HttpBackendAdapter`. `api_base` must not end with a slash.
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.into(),
        }
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> PortResult<BackendReply<R>>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.api_base, path);
        debug!("POST {}", url);

        let resp = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", path, e);
                PortError::Transport(e.to_string())
            })?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        let body = match serde_json::from_str::<R>(&text) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Unreadable response from {} ({}): {}", path, status, e);
                None
            }
        };

        Ok(BackendReply { status, body })
    }
}

/// Picks the most useful message out of a failed reply.
fn failure_message(status: StatusCode, error: Option<String>, message: Option<String>) -> String {
    error
        .or(message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Server returned {}", status))
}

fn is_success(status: &Option<String>) -> bool {
    status.as_deref() == Some(STATUS_SUCCESS)
}

//=========================================================================================
// `DashboardBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl DashboardBackend for HttpBackendAdapter {
    async fn search_material(&self, query: &str) -> PortResult<Vec<SearchResult>> {
        let reply: BackendReply<SearchResponse> =
            self.post(SEARCH_PATH, &SearchRequest { query }).await?;

        let body = match reply.body {
            Some(body) => body,
            None if reply.status.is_success() => {
                return Err(PortError::Transport("malformed search response".to_string()))
            }
            None => return Err(PortError::Rejected(failure_message(reply.status, None, None))),
        };

        if !is_success(&body.status) {
            return Err(PortError::Rejected(failure_message(
                reply.status,
                None,
                body.message,
            )));
        }

        let results: Vec<SearchResult> = body
            .results
            .into_iter()
            .map(|item| SearchResult {
                title: item.title.unwrap_or_default(),
                url: item.url.unwrap_or_default(),
                trust_score: TrustScore::from_raw(item.trust_score),
            })
            .collect();
        info!("Search returned {} results.", results.len());
        Ok(results)
    }

    async fn create_deadline(&self, deadline: &NewDeadline) -> PortResult<CreatedDeadline> {
        let request = CreateDeadlineRequest {
            student_id: &deadline.student_id,
            subject_id: &deadline.subject_id,
            title: &deadline.title,
            importance: deadline.importance.level(),
            due_at: &deadline.due_at,
        };
        let reply: BackendReply<CreateDeadlineResponse> = self.post(CREATE_PATH, &request).await?;

        let body = match reply.body {
            Some(body) => body,
            None if reply.status.is_success() => {
                return Err(PortError::Transport("malformed create response".to_string()))
            }
            None => return Err(PortError::Rejected(failure_message(reply.status, None, None))),
        };

        if !is_success(&body.status) {
            return Err(PortError::Rejected(failure_message(
                reply.status,
                body.error,
                body.message,
            )));
        }

        let priority_score = body.priority_score.ok_or_else(|| {
            PortError::Unexpected("create response is missing DiemUuTien".to_string())
        })?;
        info!(
            "Deadline created (id: {:?}, priority: {}).",
            body.created_id, priority_score
        );
        Ok(CreatedDeadline {
            priority_score,
            task_id: body.created_id,
        })
    }

    async fn optimize_schedule(&self, student_id: &str) -> PortResult<Vec<DeadlineTask>> {
        let reply: BackendReply<ScheduleResponse> =
            self.post(SCHEDULE_PATH, &ScheduleRequest { student_id }).await?;

        let body = match reply.body {
            Some(body) => body,
            None if reply.status.is_success() => {
                return Err(PortError::Transport("malformed schedule response".to_string()))
            }
            None => return Err(PortError::Rejected(failure_message(reply.status, None, None))),
        };

        // Some backends omit `status` on success, so the array is what counts.
        let refused = body.status.is_some() && !is_success(&body.status);
        let items = match body.schedule {
            Some(items) if reply.status.is_success() && !refused => items,
            _ => {
                return Err(PortError::Rejected(failure_message(
                    reply.status,
                    body.error,
                    body.message,
                )))
            }
        };

        let tasks: Vec<DeadlineTask> = items
            .into_iter()
            .map(|item| DeadlineTask {
                id: item.id.unwrap_or_default(),
                student_id: student_id.to_string(),
                subject_id: item.subject_id.unwrap_or_default(),
                title: item.title.unwrap_or_default(),
                importance: item
                    .importance
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .and_then(|v| Importance::new(v.round() as u8)),
                due_at: item.due_at.unwrap_or_default(),
                priority_score: item.priority_score.unwrap_or(0.0),
            })
            .collect();
        info!("Loaded {} deadlines for {}.", tasks.len(), student_id);
        Ok(tasks)
    }

    async fn delete_deadline(&self, task_id: &str) -> PortResult<()> {
        let reply: BackendReply<StatusResponse> =
            self.post(DELETE_PATH, &DeleteDeadlineRequest { task_id }).await?;

        match reply.body {
            Some(body) if is_success(&body.status) => {
                info!("Deadline {} deleted.", task_id);
                Ok(())
            }
            Some(body) => Err(PortError::Rejected(failure_message(
                reply.status,
                body.error,
                body.message,
            ))),
            None if reply.status.is_success() => {
                Err(PortError::Transport("malformed delete response".to_string()))
            }
            None => Err(PortError::Rejected(failure_message(reply.status, None, None))),
        }
    }

    async fn chat(&self, message: &str, history: &[ConversationTurn]) -> PortResult<String> {
        let request = ChatRequest {
            message,
            history: history
                .iter()
                .map(|turn| ChatTurn {
                    role: turn.role.as_str(),
                    content: &turn.content,
                })
                .collect(),
        };
        let reply: BackendReply<ChatResponse> = self.post(CHAT_PATH, &request).await?;
        let text = reply.body.and_then(|b| b.reply);

        if reply.status.is_success() {
            text.ok_or_else(|| PortError::Unexpected("chat response is missing reply".to_string()))
        } else {
            Err(PortError::Rejected(failure_message(reply.status, text, None)))
        }
    }
}
