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

use clap::Parser;

use crate::cmd::check::check_collection;
use crate::cmd::export::export_collection;
use crate::cmd::quiz::run_quiz;
use crate::cmd::record::record_session;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::timer::run_timer;
use crate::collection::Collection;
use crate::dashboard::server::start_server;
use crate::error::Fallible;
use crate::generate::ChatCompletionsSource;
use crate::quiz::QuizKind;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Run the study stopwatch and save the session.
    Timer {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Record a study session of N minutes without running the timer.
    Record {
        /// Session length in minutes.
        minutes: i64,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Show streak and study-hours statistics.
    Stats {
        /// Output format.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Take a generated quiz on a topic.
    Quiz {
        /// The topic to be quizzed on.
        topic: String,
        /// Generate a new question set instead of reusing the stored one.
        #[arg(long)]
        fresh: bool,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Take a timed practice exam on a topic.
    Exam {
        /// The topic to be examined on.
        topic: String,
        /// Generate a new question set instead of reusing the stored one.
        #[arg(long)]
        fresh: bool,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Serve the web dashboard.
    Dash {
        /// The port to serve on.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Don't open the browser.
        #[arg(long)]
        no_open: bool,
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Export sessions, streaks, quizzes and attempts as JSON.
    Export {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
    /// Validate the collection directory.
    Check {
        /// Optional path to the collection directory.
        directory: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Timer { directory } => run_timer(directory),
        Command::Record { minutes, directory } => record_session(directory, minutes),
        Command::Stats { format, directory } => print_stats(directory, format),
        Command::Quiz {
            topic,
            fresh,
            directory,
        } => {
            let coll = Collection::new(directory)?;
            let source = ChatCompletionsSource::new(coll.config.generation.clone());
            run_quiz(coll, &topic, QuizKind::Quiz, fresh, &source).await
        }
        Command::Exam {
            topic,
            fresh,
            directory,
        } => {
            let coll = Collection::new(directory)?;
            let source = ChatCompletionsSource::new(coll.config.generation.clone());
            run_quiz(coll, &topic, QuizKind::Exam, fresh, &source).await
        }
        Command::Dash {
            port,
            no_open,
            directory,
        } => start_server(directory, port, !no_open).await,
        Command::Export { directory } => export_collection(directory),
        Command::Check { directory } => check_collection(directory),
    }
}
