use anyhow::{Context, Result};
use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    /// Everything before `/tasks`, e.g. `http://localhost:8080/api/v1`.
    pub base_url: String,
}

impl ApiSettings {
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .with_context(|| format!("invalid api.base_url {:?}", self.base_url))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub directory: PathBuf,
    pub file: String,
    pub level: String,
}

impl Settings {
    /// Defaults, then `taskboard.{toml,json,yaml}` if present, then
    /// `TASKBOARD__SECTION__KEY` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(
            Self::defaults()?
                .add_source(File::with_name("taskboard").required(false))
                .add_source(Environment::with_prefix("TASKBOARD").separator("__")),
        )
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("api.base_url", "http://localhost:8080/api/v1")?
            .set_default("log.directory", ".")?
            .set_default("log.file", "taskboard.log")?
            .set_default("log.level", "info")
    }

    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
