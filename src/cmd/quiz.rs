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

use std::time::Instant;

use crate::collection::Collection;
use crate::db::QuizId;
use crate::error::Fallible;
use crate::error::fail;
use crate::generate::QuestionSource;
use crate::notes::find_topic;
use crate::quiz::Attempt;
use crate::quiz::Question;
use crate::quiz::QuizKind;
use crate::types::timestamp::Timestamp;

/// Take a quiz or practice exam on a topic. A previously generated question
/// set for the topic is reused unless `fresh` is set; a newly generated set
/// is persisted before the first question is asked.
pub async fn run_quiz(
    coll: Collection,
    topic_name: &str,
    kind: QuizKind,
    fresh: bool,
    source: &impl QuestionSource,
) -> Fallible<()> {
    let topic = match find_topic(&coll.topics, topic_name) {
        Some(topic) => topic,
        None => return fail(&format!("no notes found for topic '{topic_name}'.")),
    };

    let stored = if fresh {
        None
    } else {
        coll.db.latest_quiz(&topic.name, kind)?
    };
    let (quiz_id, questions): (QuizId, Vec<Question>) = match stored {
        Some(quiz) => {
            println!("Reusing stored questions (pass --fresh to regenerate).");
            (quiz.quiz_id, quiz.questions)
        }
        None => {
            println!("Generating questions for '{}'...", topic.name);
            let questions = source.generate(kind, &topic.content).await?;
            let quiz_id = coll
                .db
                .save_quiz(&topic.name, kind, Timestamp::now(), &questions)?;
            (quiz_id, questions)
        }
    };

    loop {
        let taken_at = Timestamp::now();
        let mut attempt = ask_questions(&questions, kind)?;
        let score = attempt.submit(&questions);
        coll.db
            .save_attempt(quiz_id, taken_at, score, attempt.selected())?;

        println!();
        print_results(&questions, &attempt);
        println!(
            "Your score: {} out of {} ({}%)",
            score.score,
            score.total,
            score.percentage()
        );

        println!("Retry? [y/N]");
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            return Ok(());
        }
        // Retrying starts over from a clean attempt.
    }
}

/// Ask each question in order, collecting answers. Enter skips a question.
/// For a timed exam, questions stop being asked once the allowance runs
/// out; whatever was answered is graded.
fn ask_questions(questions: &[Question], kind: QuizKind) -> Fallible<Attempt> {
    let started = Instant::now();
    let deadline_min = kind.time_allowance_min();
    if let Some(minutes) = deadline_min {
        println!("You have {minutes} minutes. Go!");
    }
    let mut attempt = Attempt::new();
    for (i, question) in questions.iter().enumerate() {
        if let Some(minutes) = deadline_min {
            let elapsed_min = started.elapsed().as_secs() as i64 / 60;
            if elapsed_min >= minutes {
                println!("Time is up.");
                break;
            }
        }
        println!();
        println!("{}. {}", i + 1, question.question);
        for (j, option) in question.options.iter().enumerate() {
            println!("  {}) {}", j + 1, option);
        }
        match read_answer(question)? {
            Some(answer) => attempt.select(i, answer),
            None => {}
        }
    }
    Ok(attempt)
}

/// Read an answer from stdin: an option number for multiple-choice
/// questions, free text otherwise. Empty input skips.
fn read_answer(question: &Question) -> Fallible<Option<String>> {
    loop {
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }
        if question.options.is_empty() {
            return Ok(Some(input.to_string()));
        }
        match input.parse::<usize>() {
            Ok(n) if n >= 1 && n <= question.options.len() => {
                return Ok(Some(question.options[n - 1].clone()));
            }
            _ => {
                println!(
                    "Enter a number between 1 and {}, or press Enter to skip.",
                    question.options.len()
                );
            }
        }
    }
}

fn print_results(questions: &[Question], attempt: &Attempt) {
    for (i, question) in questions.iter().enumerate() {
        let selected = attempt.selected().get(&i);
        let correct = selected.is_some_and(|answer| answer.trim() == question.answer.trim());
        if correct {
            println!("{}. Correct.", i + 1);
        } else {
            match selected {
                Some(answer) => println!(
                    "{}. Incorrect ({}). The correct answer is: {}",
                    i + 1,
                    answer,
                    question.answer
                ),
                None => println!(
                    "{}. Unanswered. The correct answer is: {}",
                    i + 1,
                    question.answer
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::collection::Collection;

    struct CannedSource {
        questions: Vec<Question>,
    }

    impl QuestionSource for CannedSource {
        async fn generate(&self, _kind: QuizKind, _notes: &str) -> Fallible<Vec<Question>> {
            Ok(self.questions.clone())
        }
    }

    struct FailingSource;

    impl QuestionSource for FailingSource {
        async fn generate(&self, _kind: QuizKind, _notes: &str) -> Fallible<Vec<Question>> {
            fail("generation service returned invalid JSON: boom")
        }
    }

    #[tokio::test]
    async fn test_unknown_topic_is_an_error() {
        let dir = tempdir().unwrap();
        let coll = Collection::new(Some(dir.path().display().to_string())).unwrap();
        let source = CannedSource { questions: vec![] };
        let result = run_quiz(coll, "limits", QuizKind::Quiz, false, &source).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_generation_failure_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("limits.md"), "# Limits").unwrap();
        let coll = Collection::new(Some(dir.path().display().to_string())).unwrap();
        let result = run_quiz(coll, "limits", QuizKind::Quiz, false, &FailingSource).await;
        assert!(result.is_err());
        // No quiz should have been stored.
        let coll = Collection::new(Some(dir.path().display().to_string())).unwrap();
        assert!(coll.db.latest_quiz("limits", QuizKind::Quiz).unwrap().is_none());
    }
}
