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

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE_NAME: &str = "studylog.toml";

/// Collection-level configuration, read from `studylog.toml` in the
/// collection directory. Every field has a default, and the file itself is
/// optional.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub generation: GenerationConfig,
}

/// Settings for the question-generation service.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

impl GenerationConfig {
    /// The API key from the config file, falling back to the
    /// `OPENAI_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Fallible<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => fail("no API key: set `generation.api-key` in studylog.toml or OPENAI_API_KEY."),
        }
    }
}

pub fn load_config(directory: &Path) -> Fallible<Config> {
    let path = directory.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
