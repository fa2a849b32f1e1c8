use {
    std::{collections::HashMap, fs, path::Path},
    serde::Deserialize,
    serde_yml::Value,
    thiserror::Error,
    crate::storage::{BoxedStorage, MemoryStorage, SqliteStorage},
};

#[derive(Deserialize, Debug)]
pub struct Config {
    pub http: HttpConfig,
    pub metrics: Option<MetricsConfig>,
    pub kv: KvConfig,
}

#[derive(Deserialize, Debug)]
pub struct HttpConfig {
    pub port: u16,
}

#[derive(Deserialize, Debug)]
pub struct MetricsConfig {
    pub port: u16,
}

#[derive(Deserialize, Debug)]
pub struct KvConfig {
    pub driver: String,
    #[serde(default)]
    pub params: HashMap<String, Value>,
}

#[derive(Deserialize, Debug)]
pub struct SqliteParams {
    pub path: Option<String>,
    pub in_memory: Option<bool>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {reason}")]
    FailedToRead { reason: String },

    #[error("failed to parse config: {reason}")]
    FailedToParse { reason: String },

    #[error("unknown kv driver: {driver}")]
    UnknownKvDriver { driver: String },

    #[error("failed to init kv storage: {reason}")]
    KvInitError { reason: String },
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read(path.as_ref())
            .map_err(|err| ConfigError::FailedToRead { reason: format!("{err:?}") })?;
        serde_yml::from_slice(&raw)
            .map_err(|err| ConfigError::FailedToParse { reason: format!("{err:?}") })
    }
}

pub fn kv_from_config(config: &KvConfig) -> Result<BoxedStorage, ConfigError> {
    let params: Value = serde_yml::to_value(&config.params)
        .map_err(|err| ConfigError::FailedToParse { reason: format!("kv params: {err:?}") })?;

    Ok(match config.driver.as_str() {
        "sqlite" => {
            let params: SqliteParams = serde_yml::from_value(params)
                .map_err(|err| ConfigError::FailedToParse { reason: format!("sqlite kv params: {err:?}") })?;
            let storage = if params.in_memory.unwrap_or(false) {
                SqliteStorage::in_memory()
            } else {
                let path = params.path
                    .ok_or_else(|| ConfigError::KvInitError { reason: "sqlite kv requires either `path` or `in_memory: true`".to_owned() })?;
                SqliteStorage::new(path)
            }.map_err(|err| ConfigError::KvInitError { reason: format!("{err:?}") })?;
            BoxedStorage::new(storage)
        },
        "memory" => BoxedStorage::new(MemoryStorage::new()),
        other => return Err(ConfigError::UnknownKvDriver { driver: other.to_owned() }),
    })
}
