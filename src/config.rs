use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    pub db_host: String,
    pub db_port: String,
    pub db_name: String,
    pub db_user: String,
    pub db_pass: String,
    pub host: String,
    pub port: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_host: "localhost".into(),
            db_port: "5432".into(),
            db_name: "db".into(),
            db_user: "root".into(),
            db_pass: "password".into(),
            host: "localhost".into(),
            port: "8000".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlays every non-empty value returned by `lookup` on top of the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pick = |key: &str, fallback: String| {
            lookup(key).filter(|v| !v.is_empty()).unwrap_or(fallback)
        };
        Self {
            db_host: pick("DBHOST", defaults.db_host),
            db_port: pick("DBPORT", defaults.db_port),
            db_name: pick("DBNAME", defaults.db_name),
            db_user: pick("DBUSER", defaults.db_user),
            db_pass: pick("DBPASS", defaults.db_pass),
            host: pick("HOST", defaults.host),
            port: pick("PORT", defaults.port),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
