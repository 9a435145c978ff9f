use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};
use url::form_urlencoded::byte_serialize;

const DEFAULT_ENDPOINT: &str = "https://content.guardianapis.com/search";
const DEFAULT_TOPIC: &str = "bitcoin";
// Baked in at build time; the public "test" key is rate limited but works.
const DEFAULT_API_KEY: &str = match option_env!("GUARDIAN_API_KEY") {
    Some(key) => key,
    None => "test",
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: Option<String>,
    pub topic: Option<String>,
    pub api_key: Option<String>,
    pub open_command: Option<String>,
    pub header: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub endpoint: String,
    pub topic: String,
    pub api_key: String,
    pub open_command: Option<String>,
    pub header: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            topic: DEFAULT_TOPIC.into(),
            api_key: DEFAULT_API_KEY.into(),
            open_command: None,
            header: None,
        }
    }
}

impl RuntimeConfig {
    pub fn request_url(&self) -> String {
        format!(
            "{}?order-by=newest&q={}&show-tags=contributor&api-key={}",
            self.endpoint,
            encode(&self.topic),
            encode(&self.api_key),
        )
    }

    fn apply(mut self, file: AppConfig) -> Self {
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
        if let Some(topic) = file.topic {
            self.topic = topic;
        }
        if let Some(api_key) = file.api_key {
            self.api_key = api_key;
        }
        self.open_command = file.open_command.or(self.open_command);
        self.header = file.header.or(self.header);
        self
    }
}

pub fn load(config_override: Option<String>) -> Result<RuntimeConfig> {
    let defaults = RuntimeConfig::default();

    if let Some(path_str) = config_override {
        let file = read_file(Path::new(&path_str))?;
        return Ok(defaults.apply(file));
    }

    if let Some(path) = default_config_path() {
        if path.is_file() {
            let file = read_file(&path)?;
            return Ok(defaults.apply(file));
        }
    }

    Ok(defaults)
}

fn read_file(path: &Path) -> Result<AppConfig> {
    let txt = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&txt).with_context(|| format!("failed to parse toml: {}", path.display()))
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

fn default_config_path() -> Option<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let mut p = PathBuf::from(xdg);
        p.push("guardian-news");
        p.push("config.toml");
        return Some(p);
    }
    if let Ok(home) = env::var("HOME") {
        let mut p = PathBuf::from(home);
        p.push(".config");
        p.push("guardian-news");
        p.push("config.toml");
        return Some(p);
    }
    None
}
