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

use std::env::current_dir;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::Config;
use crate::config::load_config;
use crate::db::Database;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::notes::Topic;
use crate::notes::load_topics;

pub const DB_FILE_NAME: &str = "studylog.db";

/// A study collection: a directory of module subdirectories with Markdown
/// topic notes, plus the session database and optional config file.
pub struct Collection {
    pub directory: PathBuf,
    pub db: Database,
    pub config: Config,
    pub topics: Vec<Topic>,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => current_dir()?,
        };
        let directory = if directory.exists() {
            directory.canonicalize()?
        } else {
            return fail("directory does not exist.");
        };

        let db_path: PathBuf = directory.join(DB_FILE_NAME);
        let db_path: &str = db_path
            .to_str()
            .ok_or_else(|| ErrorReport::new("invalid path"))?;
        let db: Database = Database::new(db_path)?;

        let config: Config = load_config(&directory)?;

        let topics = {
            log::debug!("Loading notes...");
            let start = Instant::now();
            let topics = load_topics(&directory)?;
            let end = Instant::now();
            let duration = end.duration_since(start).as_millis();
            log::debug!("{} topics loaded in {duration}ms.", topics.len());
            topics
        };

        Ok(Self {
            directory,
            db,
            config,
            topics,
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let coll = Collection::new(Some(dir.path().display().to_string())).unwrap();
        assert!(coll.topics.is_empty());
        assert!(coll.directory.join(DB_FILE_NAME).exists());
    }
}
