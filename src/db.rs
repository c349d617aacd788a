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
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::config::DbConfig;

use crate::error::Fallible;
use crate::quiz::Question;
use crate::quiz::QuizKind;
use crate::quiz::Score;
use crate::types::session::StudySession;
use crate::types::timestamp::Timestamp;

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

pub type QuizId = i64;

pub struct QuizRow {
    pub quiz_id: QuizId,
    pub topic: String,
    pub kind: QuizKind,
    pub created_at: Timestamp,
    pub questions: Vec<Question>,
}

pub struct AttemptRow {
    pub taken_at: Timestamp,
    pub score: Score,
    pub answers: HashMap<usize, String>,
}

impl Database {
    pub fn new(database_path: &str) -> Fallible<Self> {
        let mut conn = Connection::open(database_path)?;
        conn.set_db_config(DbConfig::SQLITE_DBCONFIG_ENABLE_FKEY, true)?;
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        let conn = Arc::new(Mutex::new(conn));
        Ok(Self { conn })
    }

    /// Record a completed study session.
    pub fn add_session(&self, session: StudySession) -> Fallible<()> {
        log::debug!(
            "Recording session: {} ({}ms)",
            session.started_at.utc_date(),
            session.duration_ms
        );
        let conn = self.acquire();
        let sql = "insert into sessions (started_at, duration_ms) values (?, ?);";
        conn.execute(sql, (session.started_at, session.duration_ms))?;
        Ok(())
    }

    /// Return all study sessions, oldest first.
    pub fn all_sessions(&self) -> Fallible<Vec<StudySession>> {
        let mut sessions = Vec::new();
        let conn = self.acquire();
        let mut stmt =
            conn.prepare("select started_at, duration_ms from sessions order by started_at;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let started_at: Timestamp = row.get(0)?;
            let duration_ms: i64 = row.get(1)?;
            sessions.push(StudySession {
                started_at,
                duration_ms,
            });
        }
        Ok(sessions)
    }

    /// The persisted longest streak, or zero if none has been recorded.
    pub fn longest_streak(&self) -> Fallible<u32> {
        let conn = self.acquire();
        let sql = "select longest_streak from streaks where streak_id = 1;";
        let streak: Option<u32> = conn.query_row(sql, [], |row| row.get(0)).optional()?;
        Ok(streak.unwrap_or(0))
    }

    /// Persist a new longest streak.
    pub fn set_longest_streak(&self, streak: u32) -> Fallible<()> {
        let conn = self.acquire();
        let sql = "insert into streaks (streak_id, longest_streak) values (1, ?)
                   on conflict (streak_id) do update set longest_streak = excluded.longest_streak;";
        conn.execute(sql, [streak])?;
        Ok(())
    }

    /// Save a generated quiz for later reuse.
    pub fn save_quiz(
        &self,
        topic: &str,
        kind: QuizKind,
        created_at: Timestamp,
        questions: &[Question],
    ) -> Fallible<QuizId> {
        let questions_json = serde_json::to_string(questions)?;
        let conn = self.acquire();
        let sql = "insert into quizzes (topic, kind, created_at, questions_json)
                   values (?, ?, ?, ?) returning quiz_id;";
        let quiz_id: QuizId = conn.query_row(
            sql,
            (topic, kind.as_str(), created_at, questions_json),
            |row| row.get(0),
        )?;
        Ok(quiz_id)
    }

    /// The most recently generated quiz for a topic, if any.
    pub fn latest_quiz(&self, topic: &str, kind: QuizKind) -> Fallible<Option<QuizRow>> {
        let conn = self.acquire();
        let sql = "select quiz_id, topic, kind, created_at, questions_json from quizzes
                   where topic = ? and kind = ? order by created_at desc limit 1;";
        let row = conn
            .query_row(sql, (topic, kind.as_str()), |row| {
                Ok((
                    row.get::<_, QuizId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Timestamp>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .optional()?;
        match row {
            None => Ok(None),
            Some((quiz_id, topic, created_at, questions_json)) => {
                let questions: Vec<Question> = serde_json::from_str(&questions_json)?;
                Ok(Some(QuizRow {
                    quiz_id,
                    topic,
                    kind,
                    created_at,
                    questions,
                }))
            }
        }
    }

    /// Return all stored quizzes, oldest first.
    pub fn all_quizzes(&self) -> Fallible<Vec<QuizRow>> {
        let mut quizzes = Vec::new();
        let conn = self.acquire();
        let sql = "select quiz_id, topic, kind, created_at, questions_json from quizzes
                   order by created_at;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let kind: String = row.get(2)?;
            let questions_json: String = row.get(4)?;
            quizzes.push(QuizRow {
                quiz_id: row.get(0)?,
                topic: row.get(1)?,
                kind: QuizKind::from_str(&kind)?,
                created_at: row.get(3)?,
                questions: serde_json::from_str(&questions_json)?,
            });
        }
        Ok(quizzes)
    }

    /// Save a graded attempt at a quiz.
    pub fn save_attempt(
        &self,
        quiz_id: QuizId,
        taken_at: Timestamp,
        score: Score,
        answers: &HashMap<usize, String>,
    ) -> Fallible<()> {
        let answers_json = serde_json::to_string(answers)?;
        let conn = self.acquire();
        let sql = "insert into attempts (quiz_id, taken_at, score, total, answers_json)
                   values (?, ?, ?, ?, ?);";
        conn.execute(
            sql,
            (
                quiz_id,
                taken_at,
                score.score as i64,
                score.total as i64,
                answers_json,
            ),
        )?;
        Ok(())
    }

    /// Return all attempts at a quiz, oldest first.
    pub fn attempts(&self, quiz_id: QuizId) -> Fallible<Vec<AttemptRow>> {
        let mut attempts = Vec::new();
        let conn = self.acquire();
        let sql = "select taken_at, score, total, answers_json from attempts
                   where quiz_id = ? order by taken_at;";
        let mut stmt = conn.prepare(sql)?;
        let mut rows = stmt.query([quiz_id])?;
        while let Some(row) = rows.next()? {
            let taken_at: Timestamp = row.get(0)?;
            let score: i64 = row.get(1)?;
            let total: i64 = row.get(2)?;
            let answers_json: String = row.get(3)?;
            attempts.push(AttemptRow {
                taken_at,
                score: Score {
                    score: score as usize,
                    total: total as usize,
                },
                answers: serde_json::from_str(&answers_json)?,
            });
        }
        Ok(attempts)
    }

    fn acquire(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["sessions"], |row| row.get(0))?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("studylog.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        (dir, db)
    }

    fn session(ms: i64) -> StudySession {
        StudySession {
            started_at: Timestamp::from_epoch_ms(ms).unwrap(),
            duration_ms: 60_000,
        }
    }

    #[test]
    fn test_schema_probe_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("studylog.db");
        let db = Database::new(path.to_str().unwrap()).unwrap();
        db.add_session(session(1_000)).unwrap();
        drop(db);
        // Reopening must not recreate the schema.
        let db = Database::new(path.to_str().unwrap()).unwrap();
        assert_eq!(db.all_sessions().unwrap().len(), 1);
    }

    #[test]
    fn test_sessions_round_trip_ordered() {
        let (_dir, db) = test_db();
        db.add_session(session(2_000)).unwrap();
        db.add_session(session(1_000)).unwrap();
        let sessions = db.all_sessions().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].started_at.epoch_ms(), 1_000);
        assert_eq!(sessions[1].started_at.epoch_ms(), 2_000);
    }

    #[test]
    fn test_longest_streak_defaults_to_zero() {
        let (_dir, db) = test_db();
        assert_eq!(db.longest_streak().unwrap(), 0);
    }

    #[test]
    fn test_longest_streak_upsert() {
        let (_dir, db) = test_db();
        db.set_longest_streak(3).unwrap();
        assert_eq!(db.longest_streak().unwrap(), 3);
        db.set_longest_streak(5).unwrap();
        assert_eq!(db.longest_streak().unwrap(), 5);
    }

    #[test]
    fn test_quiz_round_trip() {
        let (_dir, db) = test_db();
        let questions = vec![Question {
            question: "2+2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            answer: "4".to_string(),
        }];
        let now = Timestamp::from_epoch_ms(1_000).unwrap();
        let quiz_id = db
            .save_quiz("algebra", QuizKind::Quiz, now, &questions)
            .unwrap();
        let quiz = db.latest_quiz("algebra", QuizKind::Quiz).unwrap().unwrap();
        assert_eq!(quiz.quiz_id, quiz_id);
        assert_eq!(quiz.questions, questions);
        // A quiz is not an exam.
        assert!(db.latest_quiz("algebra", QuizKind::Exam).unwrap().is_none());
        assert!(db.latest_quiz("calculus", QuizKind::Quiz).unwrap().is_none());
    }

    #[test]
    fn test_latest_quiz_is_most_recent() {
        let (_dir, db) = test_db();
        let old = vec![Question {
            question: "old".to_string(),
            options: vec![],
            answer: "old".to_string(),
        }];
        let new = vec![Question {
            question: "new".to_string(),
            options: vec![],
            answer: "new".to_string(),
        }];
        let t1 = Timestamp::from_epoch_ms(1_000).unwrap();
        let t2 = Timestamp::from_epoch_ms(2_000).unwrap();
        db.save_quiz("algebra", QuizKind::Quiz, t1, &old).unwrap();
        db.save_quiz("algebra", QuizKind::Quiz, t2, &new).unwrap();
        let quiz = db.latest_quiz("algebra", QuizKind::Quiz).unwrap().unwrap();
        assert_eq!(quiz.questions[0].question, "new");
    }

    #[test]
    fn test_attempt_round_trip() {
        let (_dir, db) = test_db();
        let questions = vec![Question {
            question: "q".to_string(),
            options: vec![],
            answer: "a".to_string(),
        }];
        let now = Timestamp::from_epoch_ms(1_000).unwrap();
        let quiz_id = db
            .save_quiz("algebra", QuizKind::Quiz, now, &questions)
            .unwrap();
        let mut answers = HashMap::new();
        answers.insert(0, "a".to_string());
        let score = Score { score: 1, total: 1 };
        db.save_attempt(quiz_id, now, score, &answers).unwrap();
        let attempts = db.attempts(quiz_id).unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].score, score);
        assert_eq!(attempts[0].answers.get(&0).unwrap(), "a");
    }
}
