//! services/dashboard/src/web/routes.rs
//!
//! Contains the Axum handlers serving the dashboard page and the form actions
//! posted from it. Every action redirects back to `/`.

use crate::controller::{ChatSend, DeadlineForm, DELETE_QUESTION};
use crate::render;
use crate::web::state::{AppState, FormPrompt};
use axum::{
    extract::{Form, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

//=========================================================================================
// Form Payloads
//=========================================================================================

#[derive(Deserialize, Debug)]
pub struct SearchForm {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize, Debug)]
pub struct ScheduleForm {
    #[serde(default)]
    pub student_id: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteQuery {
    pub id: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteForm {
    pub id: String,
    #[serde(default)]
    pub confirmed: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

//=========================================================================================
// Router
//=========================================================================================

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/search", post(search_handler))
        .route("/deadlines", post(create_deadline_handler))
        .route("/schedule", post(refresh_schedule_handler))
        .route("/deadlines/confirm-delete", get(confirm_delete_handler))
        .route("/deadlines/delete", post(delete_deadline_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/toggle", post(toggle_chat_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Renders the dashboard. The schedule is loaded on first view.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    if state.controller.load_schedule_once().await {
        debug!("Schedule loaded for first view.");
    }
    let view = state.controller.snapshot().await;
    let notices = state.take_notices().await;
    Html(render::page(&view, &notices))
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SearchForm>,
) -> Redirect {
    let prompt = FormPrompt::new(false);
    state.controller.search(&form.q, &prompt).await;
    state.push_notices(prompt).await;
    Redirect::to("/")
}

pub async fn create_deadline_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeadlineForm>,
) -> Redirect {
    let prompt = FormPrompt::new(false);
    state.controller.submit_deadline(form, &prompt).await;
    state.push_notices(prompt).await;
    Redirect::to("/")
}

pub async fn refresh_schedule_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ScheduleForm>,
) -> Redirect {
    state.controller.set_student_id(&form.student_id).await;
    state.controller.refresh_schedule(&form.student_id).await;
    Redirect::to("/")
}

pub async fn confirm_delete_handler(Query(query): Query<DeleteQuery>) -> Html<String> {
    Html(render::confirm_delete_page(&query.id, DELETE_QUESTION))
}

pub async fn delete_deadline_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<DeleteForm>,
) -> Redirect {
    let confirmed = form.confirmed.as_deref() == Some("yes");
    let prompt = FormPrompt::new(confirmed);
    state.controller.delete_deadline(&form.id, &prompt).await;
    state.push_notices(prompt).await;
    Redirect::to("/")
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ChatForm>,
) -> Redirect {
    if state.controller.send_chat(&form.message).await == ChatSend::Ignored {
        debug!("Chat message not sent.");
    }
    Redirect::to("/")
}

pub async fn toggle_chat_handler(State(state): State<Arc<AppState>>) -> Redirect {
    let visible = state.controller.toggle_chat().await;
    debug!("Chat visible: {}", visible);
    Redirect::to("/")
}
