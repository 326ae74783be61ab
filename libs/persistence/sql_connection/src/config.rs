pub trait DbConnectConfig {
    fn uri(&self) -> &str;
}

/// Configure database connection pool data
pub trait DbOptionsConfig {
    fn max_conn(&self) -> Option<u32> { None }
    fn min_conn(&self) -> Option<u32> { None }
    fn sql_logger(&self) -> bool { false }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct PostgresDbConfig {
    pub uri: String,
    pub max_conn: Option<u32>,
    pub min_conn: Option<u32>,
    #[serde(default = "logger_default")]
    pub logger: bool,
}

impl PostgresDbConfig {
    /// Builds the connection URI from discrete settings, the way the
    /// `DB_HOST`/`DB_USER`/... environment is laid out.
    pub fn from_parts(
        host: &str, port: u16, user: &str, password: &str, name: &str,
    ) -> Self {
        Self {
            uri: format!(
                "host={} port={port} user={} password={} dbname={}",
                quote(host),
                quote(user),
                quote(password),
                quote(name)
            ),
            max_conn: None,
            min_conn: None,
            logger: logger_default(),
        }
    }
}

impl DbConnectConfig for PostgresDbConfig {
    fn uri(&self) -> &str { &self.uri }
}

impl DbOptionsConfig for PostgresDbConfig {
    fn max_conn(&self) -> Option<u32> { self.max_conn }

    fn min_conn(&self) -> Option<u32> { self.min_conn }

    fn sql_logger(&self) -> bool { self.logger }
}

fn logger_default() -> bool { false }

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
