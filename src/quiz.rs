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

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;

/// The two flavors of generated question sets: a short topic quiz, and a
/// longer, harder practice exam with a time allowance.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuizKind {
    Quiz,
    Exam,
}

impl QuizKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuizKind::Quiz => "quiz",
            QuizKind::Exam => "exam",
        }
    }

    pub fn from_str(s: &str) -> Fallible<Self> {
        match s {
            "quiz" => Ok(QuizKind::Quiz),
            "exam" => Ok(QuizKind::Exam),
            _ => fail(&format!("unknown quiz kind: {s}")),
        }
    }

    pub fn question_count(&self) -> usize {
        match self {
            QuizKind::Quiz => 10,
            QuizKind::Exam => 30,
        }
    }

    /// Time allowed to finish, in minutes. Quizzes are untimed.
    pub fn time_allowance_min(&self) -> Option<i64> {
        match self {
            QuizKind::Quiz => None,
            QuizKind::Exam => Some(30),
        }
    }
}

/// A multiple-choice question. `options` is empty for free-response
/// questions.
#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub answer: String,
}

/// Parse a generation-service reply into a list of questions.
///
/// The service is instructed to return bare JSON, but replies are sometimes
/// wrapped in Markdown code fences, and the payload may be either an array
/// or an object with a `questions` field. Anything else is an error: parsing
/// failures stop here and never reach the scorer.
pub fn parse_questions(raw: &str) -> Fallible<Vec<Question>> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return fail("generation service returned an empty reply.");
    }
    #[derive(Deserialize)]
    struct Wrapper {
        questions: Vec<Question>,
    }
    let questions = match serde_json::from_str::<Vec<Question>>(cleaned) {
        Ok(questions) => questions,
        Err(_) => match serde_json::from_str::<Wrapper>(cleaned) {
            Ok(wrapper) => wrapper.questions,
            Err(e) => {
                log::error!("unparseable generation reply: {raw}");
                return fail(&format!("generation service returned invalid JSON: {e}"));
            }
        },
    };
    if questions.is_empty() {
        return fail("generation service returned no questions.");
    }
    Ok(questions)
}

fn strip_code_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    for prefix in ["```json", "```"] {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest;
            break;
        }
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// The result of grading an attempt. Invariant: `score <= total`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub score: usize,
    pub total: usize,
}

impl Score {
    /// Percentage of correct answers, rounded to the nearest integer. The
    /// rounding policy is round-half-up everywhere; zero questions score
    /// zero.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.score as f64 / self.total as f64) * 100.0).round() as u32
    }
}

/// Grade selected answers against the answer key.
///
/// Comparison is exact, case-sensitive string equality after trimming
/// surrounding whitespace on both sides (the trim guards against stray
/// whitespace in generated answer keys). Unanswered questions count as
/// incorrect; `total` is always the full question count.
pub fn grade(questions: &[Question], selected: &HashMap<usize, String>) -> Score {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            selected
                .get(i)
                .is_some_and(|answer| answer.trim() == q.answer.trim())
        })
        .count();
    Score {
        score,
        total: questions.len(),
    }
}

/// One pass through a quiz: the user's selected answers and whether the
/// attempt has been submitted for grading.
#[derive(Clone, Debug, Default)]
pub struct Attempt {
    selected: HashMap<usize, String>,
    submitted: bool,
}

impl Attempt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, index: usize, answer: String) {
        self.selected.insert(index, answer);
    }

    pub fn selected(&self) -> &HashMap<usize, String> {
        &self.selected
    }

    pub fn answered_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Submit the attempt and grade it.
    pub fn submit(&mut self, questions: &[Question]) -> Score {
        self.submitted = true;
        grade(questions, &self.selected)
    }

    /// Clear all selections and the submitted flag, returning the attempt to
    /// a clean, gradeable state.
    pub fn retry(&mut self) {
        self.selected.clear();
        self.submitted = false;
    }
}
