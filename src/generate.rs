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

use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::Serialize;

use crate::config::GenerationConfig;
use crate::error::Fallible;
use crate::error::fail;
use crate::quiz::Question;
use crate::quiz::QuizKind;
use crate::quiz::parse_questions;

/// A source of generated questions. The CLI commands take this as a
/// parameter so tests can substitute a canned source for the real service.
pub trait QuestionSource {
    fn generate(
        &self,
        kind: QuizKind,
        notes: &str,
    ) -> impl Future<Output = Fallible<Vec<Question>>>;
}

/// Generates questions by calling an OpenAI-compatible chat-completions
/// endpoint with the topic notes as the user message. The API key is
/// resolved per call, so a stored quiz can be retaken without one.
pub struct ChatCompletionsSource {
    client: Client,
    config: GenerationConfig,
}

impl ChatCompletionsSource {
    pub fn new(config: GenerationConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

fn system_prompt(kind: QuizKind) -> String {
    let count = kind.question_count();
    let difficulty = match kind {
        QuizKind::Quiz => "very hard",
        QuizKind::Exam => "hard",
    };
    format!(
        "Make {count} {difficulty} multiple-choice questions about the following notes. \
         Output must be a JSON array of objects with fields \"question\", \"options\" \
         (an array of strings), and \"answer\" (one of the options). \
         DO NOT ADD ANYTHING OTHER THAN THE JSON ITSELF, BEFORE OR AFTER."
    )
}

impl QuestionSource for ChatCompletionsSource {
    async fn generate(&self, kind: QuizKind, notes: &str) -> Fallible<Vec<Question>> {
        let api_key = self.config.resolve_api_key()?;
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt(kind),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: notes.to_string(),
                },
            ],
        };
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        log::debug!(
            "Requesting {} questions from {}",
            kind.question_count(),
            self.config.model
        );
        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&request)?)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::error!("generation request failed: {body}");
            return fail(&format!("generation service returned {status}."));
        }
        let reply: ChatResponse = serde_json::from_str(&body)?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        if content.is_empty() {
            return fail("generation service returned no message.");
        }
        parse_questions(&content)
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_counts() {
        assert!(system_prompt(QuizKind::Quiz).contains("10"));
        assert!(system_prompt(QuizKind::Exam).contains("30"));
    }

    #[test]
    fn test_response_shape() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": "[]"}}]}"#;
        let reply: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(reply.choices[0].message.content, "[]");
    }
}
