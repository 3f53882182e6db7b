//! services/dashboard/src/render.rs
//!
//! Pure functions turning view state into HTML. Every piece of text that did not
//! originate in this file goes through `escape_html`.

use crate::controller::{
    ChatEntryKind, ChatPhase, ChatView, DeadlineView, ScheduleView, SearchView, ViewState,
};
use dashboard_core::domain::{Importance, Urgency};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; background: #f7fafc; color: #2d3748; margin: 0; }
main { max-width: 880px; margin: 0 auto; padding: 24px; }
section { background: #fff; border-radius: 8px; padding: 16px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.notice { background: #fffbeb; border: 1px solid #f6e05e; padding: 10px 14px; border-radius: 6px; margin-bottom: 12px; }
.res-item { padding: 10px 0; border-bottom: 1px solid #edf2f7; }
.res-url { font-size: .8rem; color: #718096; word-break: break-all; }
.task-row { padding: 12px 0; border-bottom: 1px solid #edf2f7; display: flex; justify-content: space-between; align-items: center; }
.tag { font-size: .8rem; background: #edf2f7; padding: 2px 6px; border-radius: 4px; }
.muted { color: #718096; text-align: center; padding: 16px; }
.error { color: #e53e3e; text-align: center; padding: 16px; }
.msg { padding: 6px 10px; margin: 4px 0; border-radius: 6px; }
.msg.user { background: #ebf8ff; text-align: right; }
.msg.bot { background: #edf2f7; }
.msg.error { color: #e53e3e; }
"#;

/// Escapes `& < > " '` so server text is rendered literally.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn urgency_color(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::High => "#e53e3e",
        Urgency::Medium => "#d69e2e",
        Urgency::Neutral => "#4a5568",
    }
}

/// Only http(s) URLs become links; anything else is shown as text.
fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

//=========================================================================================
// Panels
//=========================================================================================

pub fn notices(messages: &[String]) -> String {
    messages
        .iter()
        .map(|m| format!(r#"<div class="notice" role="alert">{}</div>"#, escape_html(m)))
        .collect()
}

pub fn search_results(view: &SearchView) -> String {
    match view {
        SearchView::Idle => String::new(),
        SearchView::Loading { .. } => r#"<div class="muted">Searching...</div>"#.to_string(),
        SearchView::NoResults { .. } => r#"<div class="muted">No results found.</div>"#.to_string(),
        SearchView::Failed { message, .. } => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        SearchView::Results { items, .. } => items
            .iter()
            .map(|item| {
                let url = escape_html(&item.url);
                let title = escape_html(&item.title);
                let heading = if is_web_url(&item.url) {
                    format!(r#"<a href="{url}" target="_blank" rel="noopener" class="res-title">{title}</a>"#)
                } else {
                    format!(r#"<span class="res-title">{title}</span>"#)
                };
                format!(
                    r#"<div class="res-item">{heading}<div class="res-url">{url}</div><div>Trust: <strong>{score}%</strong></div></div>"#,
                    score = item.trust_score.value(),
                )
            })
            .collect(),
    }
}

pub fn search_panel(view: &SearchView) -> String {
    let query = match view {
        SearchView::Idle => "",
        SearchView::Loading { query }
        | SearchView::Results { query, .. }
        | SearchView::NoResults { query }
        | SearchView::Failed { query, .. } => query.as_str(),
    };
    format!(
        r#"<section id="search"><h2>Find study materials</h2><form method="post" action="/search"><input name="q" value="{}" placeholder="Keyword"> <button type="submit">Search</button></form><div id="search-res">{}</div></section>"#,
        escape_html(query),
        search_results(view)
    )
}

pub fn deadline_panel(view: &DeadlineView, student_id: &str) -> String {
    let options: String = (Importance::MIN..=Importance::MAX)
        .map(|level| {
            let selected = if level == Importance::default().level() { " selected" } else { "" };
            format!(r#"<option value="{level}"{selected}>{level}</option>"#)
        })
        .collect();
    let result = match view {
        DeadlineView::Idle => String::new(),
        DeadlineView::Submitting => r#"<div class="muted">Saving...</div>"#.to_string(),
        DeadlineView::Created { priority_score } => format!(
            r#"<div id="dl-result">Priority score: <strong id="res-score">{:.2}</strong></div>"#,
            priority_score
        ),
    };
    format!(
        r#"<section id="deadline"><h2>New deadline</h2><form method="post" action="/deadlines">
<label>Student <input name="student_id" value="{student}"></label>
<label>Subject <input name="subject_id" required></label>
<label>Title <input name="title" required></label>
<label>Importance <select name="importance">{options}</select></label>
<label>Due <input type="datetime-local" name="due_at"></label>
<button type="submit">Save</button></form>{result}</section>"#,
        student = escape_html(student_id),
        options = options,
        result = result,
    )
}

pub fn schedule_list(view: &ScheduleView) -> String {
    match view {
        ScheduleView::NotLoaded => String::new(),
        ScheduleView::Loading { .. } => r#"<div class="muted">Loading...</div>"#.to_string(),
        ScheduleView::Failed { message, .. } => {
            format!(r#"<div class="error">{}</div>"#, escape_html(message))
        }
        ScheduleView::Loaded { tasks, .. } if tasks.is_empty() => {
            r#"<div class="muted">No deadlines yet.</div>"#.to_string()
        }
        ScheduleView::Loaded { tasks, .. } => tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                format!(
                    r#"<div class="task-row"><div><span class="muted-index">#{position}</span> {title} <span class="tag">{subject}</span><div class="due">Due: {due}</div></div><div><span class="score" style="color:{color}">{score}</span> <a class="delete" href="/deadlines/confirm-delete?id={id_query}">Delete</a></div></div>"#,
                    position = index + 1,
                    title = escape_html(&task.title),
                    subject = escape_html(&task.subject_id),
                    due = escape_html(&task.due_label()),
                    color = urgency_color(task.urgency()),
                    score = task.score_label(),
                    id_query = escape_html(&urlencoding::encode(&task.id)),
                )
            })
            .collect(),
    }
}

pub fn schedule_panel(view: &ScheduleView, student_id: &str) -> String {
    format!(
        r#"<section id="schedule"><h2>My deadlines</h2><form method="post" action="/schedule"><input name="student_id" value="{}" placeholder="Student id"> <button type="submit">Refresh</button></form><div id="schedule-list">{}</div></section>"#,
        escape_html(student_id),
        schedule_list(view)
    )
}

pub fn chat_transcript(view: &ChatView) -> String {
    let mut out: String = view
        .entries
        .iter()
        .map(|entry| {
            // Line breaks are inserted after escaping so the reply cannot smuggle markup.
            let text = escape_html(&entry.text).replace('\n', "<br>");
            let class = match entry.kind {
                ChatEntryKind::User => "msg user",
                ChatEntryKind::Assistant => "msg bot",
                ChatEntryKind::Error => "msg bot error",
            };
            format!(r#"<div class="{class}">{text}</div>"#)
        })
        .collect();
    if view.phase == ChatPhase::AwaitingReply {
        out.push_str(r#"<div class="msg bot typing">...</div>"#);
    }
    out
}

pub fn chat_panel(view: &ChatView) -> String {
    let display = if view.visible { "block" } else { "none" };
    let icon = if view.visible { "▼" } else { "▲" };
    let (disabled, autofocus) = match view.phase {
        ChatPhase::AwaitingReply => (" disabled", ""),
        ChatPhase::Idle => ("", " autofocus"),
    };
    format!(
        r#"<section id="chat"><form method="post" action="/chat/toggle"><button type="submit" id="chat-toggle">Assistant <span id="chat-icon">{icon}</span></button></form><div id="chatBox" style="display:{display}">{transcript}</div><form id="chat-input" method="post" action="/chat" style="display:{display}"><input id="chatInp" name="message" placeholder="Ask something"{autofocus}{disabled}> <button type="submit"{disabled}>Send</button></form></section>"#,
        icon = icon,
        display = display,
        transcript = chat_transcript(view),
        autofocus = autofocus,
        disabled = disabled,
    )
}

//=========================================================================================
// Pages
//=========================================================================================

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><title>{}</title><style>{}</style></head><body><main>{}</main></body></html>"#,
        escape_html(title),
        STYLE,
        body
    )
}

/// The whole dashboard.
pub fn page(view: &ViewState, pending: &[String]) -> String {
    let body = format!(
        "<h1>Deadline dashboard</h1>{}{}{}{}{}",
        notices(pending),
        search_panel(&view.search),
        deadline_panel(&view.deadline, &view.student_id),
        schedule_panel(&view.schedule, &view.student_id),
        chat_panel(&view.chat),
    );
    layout("Deadline dashboard", &body)
}

/// Asks the user to confirm a deletion before anything is sent.
pub fn confirm_delete_page(task_id: &str, question: &str) -> String {
    let body = format!(
        r#"<section><p>{question}</p><form method="post" action="/deadlines/delete"><input type="hidden" name="id" value="{id}"><input type="hidden" name="confirmed" value="yes"><button type="submit">Delete</button> <a href="/">Cancel</a></form></section>"#,
        question = escape_html(question),
        id = escape_html(task_id),
    );
    layout("Delete deadline", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::domain::{DeadlineTask, SearchResult, TrustScore};
    use std::collections::VecDeque;

    fn task(id: &str, title: &str, score: f64) -> DeadlineTask {
        DeadlineTask {
            id: id.to_string(),
            student_id: "SV001".to_string(),
            subject_id: "AI1".to_string(),
            title: title.to_string(),
            importance: None,
            due_at: "2025-12-20T23:59:00".to_string(),
            priority_score: score,
        }
    }

    #[test]
    fn escapes_all_five_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn search_results_are_escaped_and_counted() {
        let view = SearchView::Results {
            query: "rust".to_string(),
            items: vec![
                SearchResult {
                    title: "<script>alert(1)</script>".to_string(),
                    url: "https://a.edu/?a=1&b=2".to_string(),
                    trust_score: TrustScore::from_raw(Some(80.0)),
                },
                SearchResult {
                    title: "Plain".to_string(),
                    url: "https://b.gov".to_string(),
                    trust_score: TrustScore::DEFAULT,
                },
            ],
        };
        let html = search_results(&view);
        assert_eq!(html.matches(r#"class="res-item""#).count(), 2);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("https://a.edu/?a=1&amp;b=2"));
        assert!(html.contains("<strong>50%</strong>"));
    }

    #[test]
    fn only_web_urls_become_links() {
        let view = SearchView::Results {
            query: "rust".to_string(),
            items: vec![
                SearchResult {
                    title: "Sneaky".to_string(),
                    url: "javascript:alert(1)".to_string(),
                    trust_score: TrustScore::DEFAULT,
                },
                SearchResult {
                    title: "Course".to_string(),
                    url: "HTTPS://cs.mit.edu".to_string(),
                    trust_score: TrustScore::DEFAULT,
                },
            ],
        };
        let html = search_results(&view);
        assert!(!html.contains(r#"href="javascript:"#));
        assert!(html.contains(r#"<span class="res-title">Sneaky</span>"#));
        assert!(html.contains(r#"<a href="HTTPS://cs.mit.edu""#));
    }

    #[test]
    fn no_results_and_failure_differ() {
        let empty = search_results(&SearchView::NoResults { query: "q".into() });
        let failed = search_results(&SearchView::Failed {
            query: "q".into(),
            message: "Could not connect to the server.".into(),
        });
        assert!(empty.contains("No results"));
        assert!(failed.contains("class=\"error\""));
        assert_ne!(empty, failed);
    }

    #[test]
    fn schedule_rows_keep_server_order() {
        let view = ScheduleView::Loaded {
            student_id: "SV001".into(),
            tasks: vec![task("b", "Second best", 40.0), task("a", "Top", 83.456)],
        };
        let html = schedule_list(&view);
        let first = html.find("Second best").unwrap();
        let second = html.find("Top").unwrap();
        assert!(first < second);
        assert!(html.contains("#1</span> Second best"));
        assert!(html.contains("#2</span> Top"));
        assert!(html.contains(r#"style="color:#e53e3e">83.5<"#));
        assert!(html.contains(r#"style="color:#4a5568">40.0<"#));
        assert!(html.contains("Due: 2025-12-20 23:59"));
    }

    #[test]
    fn empty_schedule_is_not_an_error() {
        let html = schedule_list(&ScheduleView::Loaded {
            student_id: "SV001".into(),
            tasks: vec![],
        });
        assert!(html.contains("No deadlines yet."));
        assert!(!html.contains("error"));
    }

    #[test]
    fn delete_link_encodes_id() {
        let html = schedule_list(&ScheduleView::Loaded {
            student_id: "SV001".into(),
            tasks: vec![task("LT 1&2", "x", 10.0)],
        });
        assert!(html.contains("/deadlines/confirm-delete?id=LT%201%262"));
    }

    #[test]
    fn chat_reply_keeps_line_breaks_without_markup() {
        let view = ChatView {
            phase: ChatPhase::AwaitingReply,
            visible: true,
            entries: VecDeque::from(vec![crate::controller::ChatEntry {
                kind: ChatEntryKind::Assistant,
                text: "line one\n<b>line two</b>".to_string(),
            }]),
        };
        let html = chat_transcript(&view);
        assert!(html.contains("line one<br>&lt;b&gt;line two&lt;/b&gt;"));
        assert!(html.contains("typing"));
        assert!(chat_panel(&view).contains(" disabled"));
    }

    #[test]
    fn hidden_chat_hides_box_and_input() {
        let view = ChatView {
            phase: ChatPhase::Idle,
            visible: false,
            entries: VecDeque::new(),
        };
        let html = chat_panel(&view);
        assert_eq!(html.matches("display:none").count(), 2);
        assert!(html.contains("▲"));
    }
}
