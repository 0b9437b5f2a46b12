use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,
    pub neo4j_database: Option<String>,
    pub connect_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub max_concurrent_queries: usize,
    /// Centre of the proximity metric, in degrees.
    pub reference_latitude: f64,
    pub reference_longitude: f64,
    pub radius_meters: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            neo4j_uri: "bolt://localhost:7687".to_string(),
            neo4j_user: "neo4j".to_string(),
            // Deliberately empty: the password must come from the file or NEO4J_PASSWORD.
            neo4j_password: String::new(),
            neo4j_database: None,
            connect_timeout_secs: 10,
            query_timeout_secs: 30,
            max_concurrent_queries: 4,
            reference_latitude: 40.7128,
            reference_longitude: -74.0060,
            radius_meters: 1000.0,
        }
    }
}

impl Config {
    /// Loads the file at `config_path` (or `config.json` when present), applies
    /// `NEO4J_*` environment overrides and validates the result.
    pub fn load_from_path(config_path: Option<&str>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::read_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::read_file(DEFAULT_CONFIG_PATH)?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e)
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            anyhow::anyhow!(
                "Failed to parse config file '{}': {}",
                path_ref.display(),
                e
            )
        })?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("NEO4J_URI") {
            self.neo4j_uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.neo4j_user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.neo4j_password = password;
        }
        if let Some(database) = lookup("NEO4J_DATABASE") {
            self.neo4j_database = Some(database).filter(|db| !db.is_empty());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.neo4j_uri.is_empty() {
            return Err(anyhow::anyhow!("Neo4j URI cannot be empty"));
        }

        if self.neo4j_user.is_empty() {
            return Err(anyhow::anyhow!("Neo4j user cannot be empty"));
        }

        if self.neo4j_password.is_empty() {
            return Err(anyhow::anyhow!(
                "Neo4j password cannot be empty (set neo4j_password or NEO4J_PASSWORD)"
            ));
        }

        if self.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!("connect_timeout_secs must be greater than 0"));
        }

        if self.query_timeout_secs == 0 {
            return Err(anyhow::anyhow!("query_timeout_secs must be greater than 0"));
        }

        if self.max_concurrent_queries == 0 {
            return Err(anyhow::anyhow!(
                "max_concurrent_queries must be greater than 0"
            ));
        }

        if !(-90.0..=90.0).contains(&self.reference_latitude) {
            return Err(anyhow::anyhow!(
                "reference_latitude must be within [-90, 90], got {}",
                self.reference_latitude
            ));
        }

        if !(-180.0..=180.0).contains(&self.reference_longitude) {
            return Err(anyhow::anyhow!(
                "reference_longitude must be within [-180, 180], got {}",
                self.reference_longitude
            ));
        }

        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(anyhow::anyhow!(
                "radius_meters must be a positive number, got {}",
                self.radius_meters
            ));
        }

        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn with_password() -> Config {
        Config {
            neo4j_password: "secret".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_default_has_no_password() {
        let config = Config::default();
        assert!(config.neo4j_password.is_empty());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("password"), "unexpected error: {err}");
    }

    #[test]
    fn test_load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"neo4j_uri": "bolt://db:7687", "neo4j_password": "pw", "max_concurrent_queries": 2}}"#
        )
        .unwrap();

        let config = Config::read_file(file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.neo4j_uri, "bolt://db:7687");
        assert_eq!(config.neo4j_user, "neo4j");
        assert_eq!(config.max_concurrent_queries, 2);
        assert_eq!(config.query_timeout_secs, 30);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = Config::read_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = Config::load_from_path(missing.to_str()).unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = [
            ("NEO4J_URI", "neo4j://cluster:7687"),
            ("NEO4J_PASSWORD", "from-env"),
            ("NEO4J_DATABASE", "listings"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.neo4j_uri, "neo4j://cluster:7687");
        assert_eq!(config.neo4j_user, "neo4j");
        assert_eq!(config.neo4j_password, "from-env");
        assert_eq!(config.neo4j_database.as_deref(), Some("listings"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_database_override_clears_database() {
        let mut config = with_password();
        config.neo4j_database = Some("old".to_string());
        config.apply_overrides(|key| (key == "NEO4J_DATABASE").then(String::new));
        assert_eq!(config.neo4j_database, None);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases: Vec<(Config, &str)> = vec![
            (Config { neo4j_uri: String::new(), ..with_password() }, "URI"),
            (Config { neo4j_user: String::new(), ..with_password() }, "user"),
            (Config { query_timeout_secs: 0, ..with_password() }, "query_timeout_secs"),
            (Config { connect_timeout_secs: 0, ..with_password() }, "connect_timeout_secs"),
            (Config { max_concurrent_queries: 0, ..with_password() }, "max_concurrent_queries"),
            (Config { reference_latitude: 91.0, ..with_password() }, "reference_latitude"),
            (Config { reference_longitude: -181.0, ..with_password() }, "reference_longitude"),
            (Config { radius_meters: 0.0, ..with_password() }, "radius_meters"),
            (Config { radius_meters: f64::NAN, ..with_password() }, "radius_meters"),
        ];

        for (config, field) in cases {
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains(field), "expected '{field}' in '{err}'");
        }
    }
}
