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

use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::error::Fallible;

/// The default module name for notes placed at the collection root.
const ROOT_MODULE: &str = "general";

/// A topic's notes: one Markdown file inside a module directory.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Topic {
    pub module: String,
    pub name: String,
    pub path: PathBuf,
    pub content: String,
}

/// Load all topic notes under a collection directory. Modules are the
/// subdirectories; `foo/bar.md` is topic `bar` in module `foo`. Markdown
/// files at the root land in the `general` module. Hidden files and
/// directories are skipped.
pub fn load_topics(directory: &Path) -> Fallible<Vec<Topic>> {
    let mut topics = Vec::new();
    let walker = WalkDir::new(directory)
        .into_iter()
        .filter_entry(|e| !is_hidden(e));
    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
            let name = match path.file_stem() {
                Some(stem) => stem.to_string_lossy().to_string(),
                None => continue,
            };
            let module = path
                .parent()
                .filter(|parent| *parent != directory)
                .and_then(|parent| parent.file_name())
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| ROOT_MODULE.to_string());
            let content = std::fs::read_to_string(path)?;
            topics.push(Topic {
                module,
                name,
                path: path.to_path_buf(),
                content,
            });
        }
    }
    topics.sort_by(|a, b| (&a.module, &a.name).cmp(&(&b.module, &b.name)));
    Ok(topics)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Find a topic by name, case-insensitively.
pub fn find_topic<'a>(topics: &'a [Topic], name: &str) -> Option<&'a Topic> {
    topics
        .iter()
        .find(|topic| topic.name.eq_ignore_ascii_case(name))
}

/// Find a topic by module and name, case-insensitively.
pub fn find_topic_in_module<'a>(
    topics: &'a [Topic],
    module: &str,
    name: &str,
) -> Option<&'a Topic> {
    topics.iter().find(|topic| {
        topic.module.eq_ignore_ascii_case(module) && topic.name.eq_ignore_ascii_case(name)
    })
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_topics() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("calculus")).unwrap();
        write(dir.path().join("calculus/limits.md"), "# Limits").unwrap();
        write(dir.path().join("calculus/series.md"), "# Series").unwrap();
        write(dir.path().join("scratch.md"), "# Scratch").unwrap();
        write(dir.path().join("calculus/notes.txt"), "ignored").unwrap();

        let topics = load_topics(dir.path()).unwrap();
        assert_eq!(topics.len(), 3);
        assert_eq!(topics[0].module, "calculus");
        assert_eq!(topics[0].name, "limits");
        assert_eq!(topics[1].name, "series");
        assert_eq!(topics[2].module, "general");
        assert_eq!(topics[2].name, "scratch");
        assert_eq!(topics[0].content, "# Limits");
    }

    #[test]
    fn test_hidden_entries_skipped() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join(".git")).unwrap();
        write(dir.path().join(".git/topic.md"), "nope").unwrap();
        write(dir.path().join(".hidden.md"), "nope").unwrap();
        let topics = load_topics(dir.path()).unwrap();
        assert!(topics.is_empty());
    }

    #[test]
    fn test_find_topic() {
        let dir = tempdir().unwrap();
        create_dir_all(dir.path().join("calculus")).unwrap();
        write(dir.path().join("calculus/Limits.md"), "# Limits").unwrap();
        let topics = load_topics(dir.path()).unwrap();
        assert!(find_topic(&topics, "limits").is_some());
        assert!(find_topic(&topics, "derivatives").is_none());
        assert!(find_topic_in_module(&topics, "Calculus", "limits").is_some());
        assert!(find_topic_in_module(&topics, "algebra", "limits").is_none());
    }
}
