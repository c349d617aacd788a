// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;

use crate::dashboard::state::ServerState;
use crate::dashboard::template::page_template;
use crate::error::Fallible;
use crate::hours::daily_minutes;
use crate::hours::total_ms;
use crate::markdown::markdown_to_html;
use crate::notes::find_topic_in_module;
use crate::streak::calculate_streaks;
use crate::types::session::StudySession;
use crate::types::session::format_duration;
use crate::types::timestamp::Timestamp;

pub async fn dashboard_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match render_dashboard(&state) {
        Ok(body) => (
            StatusCode::OK,
            Html(page_template("studylog", body).into_string()),
        ),
        Err(e) => {
            log::error!("{e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Internal Server Error".to_string()),
            )
        }
    }
}

fn render_dashboard(state: &ServerState) -> Fallible<Markup> {
    let now = Timestamp::now();
    let sessions = state.db.all_sessions()?;
    let stored = state.db.longest_streak()?;
    let summary = calculate_streaks(&sessions, stored, now);
    if summary.highest_streak > stored {
        log::debug!("New longest streak: {}", summary.highest_streak);
        state.db.set_longest_streak(summary.highest_streak)?;
    }
    let week = daily_minutes(&sessions, now.utc_date());
    let max_minutes = week.iter().map(|d| d.minutes).max().unwrap_or(0).max(1);

    let recent: Vec<&StudySession> = sessions.iter().rev().take(10).collect();

    Ok(html! {
        div.root {
            h1 { "studylog" }
            div.widgets {
                div.widget {
                    div.value { (summary.current_streak) }
                    div.label { "day streak" }
                }
                div.widget {
                    div.value { (summary.highest_streak) }
                    div.label { "longest streak" }
                }
                div.widget {
                    div.value { (format_duration(total_ms(&sessions))) }
                    div.label { "total study time" }
                }
            }
            h2 { "Last 7 days" }
            div.chart {
                @for day in &week {
                    div.column {
                        div.bar style=(bar_style(day.minutes, max_minutes)) {}
                        div.minutes { (day.minutes) }
                        div.day { (day.date.day_month()) }
                    }
                }
            }
            h2 { "Recent sessions" }
            @if recent.is_empty() {
                p { "No sessions yet. Run " code { "studylog timer" } " to start one." }
            } @else {
                table.sessions {
                    tbody {
                        @for session in &recent {
                            tr {
                                td { (session.started_at.utc_date()) }
                                td { (format_duration(session.duration_ms)) }
                            }
                        }
                    }
                }
            }
            h2 { "Notes" }
            @if state.topics.is_empty() {
                p { "No notes found. Add Markdown files under module directories." }
            } @else {
                ul.topics {
                    @for topic in &state.topics {
                        li {
                            a href=(note_url(&topic.module, &topic.name)) {
                                (topic.module) " / " (topic.name)
                            }
                        }
                    }
                }
            }
        }
    })
}

fn bar_style(minutes: i64, max_minutes: i64) -> String {
    let percent = (minutes * 100) / max_minutes;
    format!("height: {percent}%;")
}

fn note_url(module: &str, name: &str) -> String {
    format!(
        "/notes/{}/{}",
        utf8_percent_encode(module, NON_ALPHANUMERIC),
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

pub async fn notes_handler(
    State(state): State<ServerState>,
    Path((module, name)): Path<(String, String)>,
) -> (StatusCode, Html<String>) {
    match find_topic_in_module(&state.topics, &module, &name) {
        Some(topic) => {
            let content = markdown_to_html(&topic.content);
            let body = html! {
                div.root {
                    p.breadcrumb {
                        a href="/" { "studylog" }
                        " / " (topic.module) " / " (topic.name)
                    }
                    div.notes .rich-text {
                        (PreEscaped(content))
                    }
                }
            };
            (
                StatusCode::OK,
                Html(page_template(&topic.name, body).into_string()),
            )
        }
        None => (StatusCode::NOT_FOUND, Html("Not Found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_style() {
        assert_eq!(bar_style(0, 1), "height: 0%;");
        assert_eq!(bar_style(30, 60), "height: 50%;");
        assert_eq!(bar_style(60, 60), "height: 100%;");
    }

    #[test]
    fn test_note_url_escapes() {
        assert_eq!(
            note_url("real analysis", "limits"),
            "/notes/real%20analysis/limits"
        );
    }
}
