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

use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::quiz::Question;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;

pub fn export_collection(directory: Option<String>) -> Fallible<()> {
    let coll: Collection = Collection::new(directory)?;
    let export: Export = get_export(&coll)?;
    let json: String = serde_json::to_string_pretty(&export)?;
    println!("{json}");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Export {
    longest_streak: u32,
    sessions: Vec<SessionExport>,
    quizzes: Vec<QuizExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionExport {
    started_at: Timestamp,
    date: Date,
    duration_ms: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuizExport {
    topic: String,
    kind: String,
    created_at: Timestamp,
    questions: Vec<Question>,
    attempts: Vec<AttemptExport>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptExport {
    taken_at: Timestamp,
    score: usize,
    total: usize,
    selected_answers: HashMap<usize, String>,
}

fn get_export(coll: &Collection) -> Fallible<Export> {
    let longest_streak = coll.db.longest_streak()?;
    let sessions = coll
        .db
        .all_sessions()?
        .into_iter()
        .map(|s| SessionExport {
            started_at: s.started_at,
            date: s.started_at.utc_date(),
            duration_ms: s.duration_ms,
        })
        .collect();
    let mut quizzes = Vec::new();
    for quiz in coll.db.all_quizzes()? {
        let attempts = coll
            .db
            .attempts(quiz.quiz_id)?
            .into_iter()
            .map(|a| AttemptExport {
                taken_at: a.taken_at,
                score: a.score.score,
                total: a.score.total,
                selected_answers: a.answers,
            })
            .collect();
        quizzes.push(QuizExport {
            topic: quiz.topic,
            kind: quiz.kind.as_str().to_string(),
            created_at: quiz.created_at,
            questions: quiz.questions,
            attempts,
        });
    }
    Ok(Export {
        longest_streak,
        sessions,
        quizzes,
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::quiz::QuizKind;
    use crate::quiz::Score;
    use crate::types::session::StudySession;

    #[test]
    fn test_export_shape() {
        let dir = tempdir().unwrap();
        let coll = Collection::new(Some(dir.path().display().to_string())).unwrap();
        coll.db
            .add_session(StudySession {
                started_at: Timestamp::from_epoch_ms(1704240000000).unwrap(),
                duration_ms: 60_000,
            })
            .unwrap();
        coll.db.set_longest_streak(4).unwrap();
        let questions = vec![Question {
            question: "q".to_string(),
            options: vec!["a".to_string()],
            answer: "a".to_string(),
        }];
        let now = Timestamp::from_epoch_ms(1704240000000).unwrap();
        let quiz_id = coll
            .db
            .save_quiz("limits", QuizKind::Quiz, now, &questions)
            .unwrap();
        let mut answers = HashMap::new();
        answers.insert(0, "a".to_string());
        coll.db
            .save_attempt(quiz_id, now, Score { score: 1, total: 1 }, &answers)
            .unwrap();

        let export = get_export(&coll).unwrap();
        assert_eq!(export.longest_streak, 4);
        assert_eq!(export.sessions.len(), 1);
        assert_eq!(export.quizzes.len(), 1);
        assert_eq!(export.quizzes[0].attempts.len(), 1);

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"longestStreak\":4"));
        assert!(json.contains("\"durationMs\":60000"));
        assert!(json.contains("\"2024-01-03\""));
    }
}
