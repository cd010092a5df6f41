use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Master connection; all writes go here.
    pub database: DatabaseConfig,
    /// Read replica for the bulk score and beatmap reads.
    pub database_slave: DatabaseConfig,
    /// Column of `osu_user_stats{suffix}` holding this mode's rating.
    pub user_pp_column_name: String,
    /// Milliseconds between score polls.
    pub score_update_interval: u64,
    /// Milliseconds between beatmap-set polls.
    pub difficulty_update_interval: u64,
    pub datadog: DatadogConfig,
    pub slack_hook_host: Option<String>,
    pub sentry: SentryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatadogConfig {
    pub host: String,
    pub port: u16,
    pub namespace: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentryConfig {
    pub host: Option<String>,
    pub project_id: Option<String>,
    pub public_key: Option<String>,
    pub private_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            database_slave: DatabaseConfig::default(),
            user_pp_column_name: "rank_score".into(),
            score_update_interval: 50,
            difficulty_update_interval: 10_000,
            datadog: DatadogConfig::default(),
            slack_hook_host: None,
            sentry: SentryConfig::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            username: "root".into(),
            password: "password".into(),
            database: "osu".into(),
            max_connections: 10,
            min_connections: 5,
        }
    }
}

impl Default for DatadogConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8125,
            namespace: "osu.pp".into(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        apply_database_env(&mut config.database, "DATABASE")?;

        // The slave falls back to the master credentials unless overridden.
        config.database_slave = config.database.clone();
        apply_database_env(&mut config.database_slave, "SLAVE_DATABASE")?;

        if let Ok(column) = std::env::var("USER_PP_COLUMN_NAME") {
            config.user_pp_column_name = column;
        }
        if let Ok(interval) = std::env::var("SCORE_UPDATE_INTERVAL") {
            config.score_update_interval = interval.parse()?;
        }
        if let Ok(interval) = std::env::var("DIFFICULTY_UPDATE_INTERVAL") {
            config.difficulty_update_interval = interval.parse()?;
        }

        if let Ok(datadog_host) = std::env::var("DATADOG_HOST") {
            config.datadog.host = datadog_host;
        }
        if let Ok(datadog_port) = std::env::var("DATADOG_PORT") {
            config.datadog.port = datadog_port.parse()?;
        }
        if let Ok(datadog_namespace) = std::env::var("DATADOG_NAMESPACE") {
            config.datadog.namespace = datadog_namespace;
        }

        if let Ok(slack_hook_host) = std::env::var("SLACK_HOOK_HOST") {
            config.slack_hook_host = Some(slack_hook_host);
        }

        if let Ok(sentry_host) = std::env::var("SENTRY_HOST") {
            config.sentry.host = Some(sentry_host);
        }
        if let Ok(sentry_project_id) = std::env::var("SENTRY_PROJECT_ID") {
            config.sentry.project_id = Some(sentry_project_id);
        }
        if let Ok(sentry_public_key) = std::env::var("SENTRY_PUBLIC_KEY") {
            config.sentry.public_key = Some(sentry_public_key);
        }
        if let Ok(sentry_private_key) = std::env::var("SENTRY_PRIVATE_KEY") {
            config.sentry.private_key = Some(sentry_private_key);
        }

        Ok(config)
    }
}

fn apply_database_env(config: &mut DatabaseConfig, prefix: &str) -> Result<()> {
    if let Ok(host) = std::env::var(format!("{prefix}_HOST")) {
        config.host = host;
    }
    if let Ok(port) = std::env::var(format!("{prefix}_PORT")) {
        config.port = port.parse()?;
    }
    if let Ok(username) = std::env::var(format!("{prefix}_USERNAME")) {
        config.username = username;
    }
    if let Ok(password) = std::env::var(format!("{prefix}_PASSWORD")) {
        config.password = password;
    }
    if let Ok(database) = std::env::var(format!("{prefix}_NAME")) {
        config.database = database;
    }
    if let Ok(max_connections) = std::env::var(format!("{prefix}_MAX_CONNECTIONS")) {
        config.max_connections = max_connections.parse()?;
    }
    if let Ok(min_connections) = std::env::var(format!("{prefix}_MIN_CONNECTIONS")) {
        config.min_connections = min_connections.parse()?;
    }

    Ok(())
}
