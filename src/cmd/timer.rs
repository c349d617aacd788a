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
use crate::error::Fallible;
use crate::streak::calculate_streaks;
use crate::types::session::StudySession;
use crate::types::session::format_duration;
use crate::types::timestamp::Timestamp;

/// Run the study stopwatch. The timer starts immediately; `p` pauses and
/// resumes, Enter stops and saves the session, `q` discards it.
pub fn run_timer(directory: Option<String>) -> Fallible<()> {
    let coll = Collection::new(directory)?;
    let started_at = Timestamp::now();
    let mut stopwatch = Stopwatch::start();

    println!("Timer started. [Enter] save, [p] pause/resume, [q] discard.");
    loop {
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        match input.trim() {
            "p" => {
                if stopwatch.is_running() {
                    stopwatch.pause();
                    println!("Paused at {}.", format_duration(stopwatch.elapsed_ms()));
                } else {
                    stopwatch.resume();
                    println!("Resumed.");
                }
            }
            "q" => {
                println!("Discarded.");
                return Ok(());
            }
            "" => break,
            _ => println!("[Enter] save, [p] pause/resume, [q] discard."),
        }
    }

    let duration_ms = stopwatch.elapsed_ms();
    let session = StudySession {
        started_at,
        duration_ms,
    };
    coll.db.add_session(session)?;
    println!("Studied for {}.", format_duration(duration_ms));

    // Show where the streak stands now that the session is saved.
    let sessions = coll.db.all_sessions()?;
    let stored = coll.db.longest_streak()?;
    let summary = calculate_streaks(&sessions, stored, Timestamp::now());
    if summary.highest_streak > stored {
        coll.db.set_longest_streak(summary.highest_streak)?;
    }
    println!(
        "Current streak: {} days. Longest: {} days.",
        summary.current_streak, summary.highest_streak
    );
    Ok(())
}

/// A pausable stopwatch. Accumulates completed segments and tracks the start
/// of the running segment, mirroring tick-based elapsed accounting.
struct Stopwatch {
    accumulated_ms: i64,
    running_since: Option<Instant>,
}

impl Stopwatch {
    fn start() -> Self {
        Self {
            accumulated_ms: 0,
            running_since: Some(Instant::now()),
        }
    }

    fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    fn pause(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ms += since.elapsed().as_millis() as i64;
        }
    }

    fn resume(&mut self) {
        if self.running_since.is_none() {
            self.running_since = Some(Instant::now());
        }
    }

    fn elapsed_ms(&self) -> i64 {
        let running = self
            .running_since
            .map(|since| since.elapsed().as_millis() as i64)
            .unwrap_or(0);
        self.accumulated_ms + running
    }
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_stopwatch_accumulates() {
        let mut stopwatch = Stopwatch::start();
        sleep(Duration::from_millis(20));
        stopwatch.pause();
        let at_pause = stopwatch.elapsed_ms();
        assert!(at_pause >= 20);
        // Paused: no further accumulation.
        sleep(Duration::from_millis(20));
        assert_eq!(stopwatch.elapsed_ms(), at_pause);
        stopwatch.resume();
        sleep(Duration::from_millis(20));
        assert!(stopwatch.elapsed_ms() >= at_pause + 20);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut stopwatch = Stopwatch::start();
        stopwatch.pause();
        let elapsed = stopwatch.elapsed_ms();
        stopwatch.pause();
        assert_eq!(stopwatch.elapsed_ms(), elapsed);
    }
}
