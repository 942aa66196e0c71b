use crate::error::{BadEnvVarSnafu, ParseNumberSnafu, RecordResult};
use dotenvy::var;
use secrecy::SecretString;
use snafu::ResultExt;
use std::{num::ParseIntError, str::FromStr, sync::Arc};

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_config: Arc<ServerConfig>,
}

impl RuntimeConfiguration {
    pub fn new() -> RecordResult<Self> {
        Ok(Self {
            db_config: Arc::new(DbConfig::new()?),
            server_config: Arc::new(ServerConfig::new()?),
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_config(&self) -> Arc<ServerConfig> {
        self.server_config.clone()
    }
}

fn optional_number<T>(
    get_env_var: &impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    name: &'static str,
    default: T,
) -> RecordResult<T>
where
    T: FromStr<Err = ParseIntError>,
{
    match get_env_var(name) {
        Ok(value) => value.trim().parse().context(ParseNumberSnafu { name }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub struct DbConfig {
    url: SecretString,
    max_connections: u32,
}

impl DbConfig {
    pub fn new() -> RecordResult<Self> {
        Self::from_vars(var)
    }

    fn from_vars(
        get_env_var: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RecordResult<Self> {
        let url = get_env_var("DATABASE_URL").context(BadEnvVarSnafu {
            name: "DATABASE_URL",
        })?;

        Ok(Self {
            url: SecretString::from(url),
            max_connections: optional_number(&get_env_var, "DB_MAX_CONNECTIONS", 15)?,
        })
    }

    pub const fn url(&self) -> &SecretString {
        &self.url
    }

    pub const fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

#[derive(Debug)]
pub struct ServerConfig {
    host: String,
    port: u16,
}

impl ServerConfig {
    pub fn new() -> RecordResult<Self> {
        Self::from_vars(var)
    }

    fn from_vars(
        get_env_var: impl Fn(&'static str) -> Result<String, dotenvy::Error>,
    ) -> RecordResult<Self> {
        Ok(Self {
            host: get_env_var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: optional_number(&get_env_var, "PORT", 3000)?,
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
