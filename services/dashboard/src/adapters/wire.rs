//! services/dashboard/src/adapters/wire.rs
//!
//! JSON bodies exchanged with the deadline backend. Field names follow the
//! backend's column names, so every field carries an explicit rename.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The value of `status` on a successful response.
pub const STATUS_SUCCESS: &str = "success";

//=========================================================================================
// Lenient field decoding
//=========================================================================================

// Scores arrive as numbers from some endpoints and as formatted strings ("82.50") from others.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

// Ids are strings like "LT3F2" but some databases hand back integers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

//=========================================================================================
// /api/search/material
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchItem>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchItem {
    #[serde(rename = "TieuDe", default)]
    pub title: Option<String>,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "DiemTinCay", default, deserialize_with = "lenient_number")]
    pub trust_score: Option<f64>,
}

//=========================================================================================
// /api/deadline/create
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct CreateDeadlineRequest<'a> {
    #[serde(rename = "SinhVienID")]
    pub student_id: &'a str,
    #[serde(rename = "MonHocID")]
    pub subject_id: &'a str,
    #[serde(rename = "TieuDe")]
    pub title: &'a str,
    #[serde(rename = "MucDoQuanTrong")]
    pub importance: u8,
    #[serde(rename = "ThoiGianKetThuc")]
    pub due_at: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct CreateDeadlineResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "DiemUuTien", default, deserialize_with = "lenient_number")]
    pub priority_score: Option<f64>,
    #[serde(rename = "LichTrinhID_created", default, deserialize_with = "lenient_string")]
    pub created_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

//=========================================================================================
// /api/schedule/optimize
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct ScheduleRequest<'a> {
    #[serde(rename = "SinhVienID")]
    pub student_id: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct ScheduleResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "OptimizedSchedule", default)]
    pub schedule: Option<Vec<ScheduleItem>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ScheduleItem {
    #[serde(rename = "LichTrinhID", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(rename = "TieuDe", default)]
    pub title: Option<String>,
    #[serde(rename = "MonHocID", default, deserialize_with = "lenient_string")]
    pub subject_id: Option<String>,
    #[serde(rename = "DiemUuTien", default, deserialize_with = "lenient_number")]
    pub priority_score: Option<f64>,
    #[serde(rename = "ThoiGianKetThuc", default)]
    pub due_at: Option<String>,
    #[serde(rename = "MucDoQuanTrong", default, deserialize_with = "lenient_number")]
    pub importance: Option<f64>,
}

//=========================================================================================
// /api/deadline/delete
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct DeleteDeadlineRequest<'a> {
    #[serde(rename = "LichTrinhID")]
    pub task_id: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

//=========================================================================================
// /api/chat
//=========================================================================================

#[derive(Serialize, Debug)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub history: Vec<ChatTurn<'a>>,
}

#[derive(Serialize, Debug)]
pub struct ChatTurn<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChatResponse {
    #[serde(default)]
    pub reply: Option<String>,
}
