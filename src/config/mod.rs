use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseBackend {
    MongoDb,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub uri: Option<String>,
    pub name: String,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub image_dir: PathBuf,
    pub web_domain: String,
    /// Staging directory for uploaded spreadsheets. `None` uses the OS temp dir.
    pub upload_dir: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

impl AppConfig {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };

        config.with_overrides(&lookup)?.validated()
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        self.server.port = parsed(lookup, "PORT", self.server.port);

        // Database overrides
        if let Some(v) = lookup("DATABASE_BACKEND") {
            self.database.backend = match v.to_ascii_lowercase().as_str() {
                "mongo" | "mongodb" => DatabaseBackend::MongoDb,
                "memory" => DatabaseBackend::Memory,
                _ => return Err(ConfigError::Invalid { key: "DATABASE_BACKEND", value: v }),
            };
        }
        if let Some(v) = lookup("MONGODB_URI") {
            self.database.uri = Some(v);
        }
        if let Some(v) = lookup("MONGODB_NAME") {
            self.database.name = v;
        }
        self.database.connection_timeout =
            parsed(lookup, "DATABASE_CONNECTION_TIMEOUT", self.database.connection_timeout);

        // API overrides
        self.api.enable_request_logging =
            parsed(lookup, "API_ENABLE_REQUEST_LOGGING", self.api.enable_request_logging);
        self.api.max_request_size_bytes =
            parsed(lookup, "API_MAX_REQUEST_SIZE_BYTES", self.api.max_request_size_bytes);

        // Security overrides
        if let Some(v) = lookup("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        self.security.token_ttl_minutes =
            parsed(lookup, "JWT_EXPIRATION_MINUTES", self.security.token_ttl_minutes);
        self.security.bcrypt_cost = parsed(lookup, "BCRYPT_COST", self.security.bcrypt_cost);
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Storage overrides
        if let Some(v) = lookup("IMAGE_DIR") {
            self.storage.image_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("WEB_DOMAIN") {
            self.storage.web_domain = v;
        }
        if let Some(v) = lookup("UPLOAD_DIR") {
            self.storage.upload_dir = Some(PathBuf::from(v));
        }

        if self.is_development() && self.storage.web_domain.is_empty() {
            self.storage.web_domain = format!("http://localhost:{}", self.server.port);
        }

        Ok(self)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.security.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.security.token_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                key: "JWT_EXPIRATION_MINUTES",
                value: self.security.token_ttl_minutes.to_string(),
            });
        }
        if !(4..=31).contains(&self.security.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                value: self.security.bcrypt_cost.to_string(),
            });
        }
        if self.database.backend == DatabaseBackend::MongoDb && self.database.uri.is_none() {
            return Err(ConfigError::Missing("MONGODB_URI"));
        }
        if self.database.name.is_empty() {
            return Err(ConfigError::Missing("MONGODB_NAME"));
        }
        if self.storage.image_dir.as_os_str().is_empty() {
            return Err(ConfigError::Missing("IMAGE_DIR"));
        }
        if self.storage.web_domain.is_empty() {
            return Err(ConfigError::Missing("WEB_DOMAIN"));
        }
        if url::Url::parse(&self.storage.web_domain).is_err() {
            return Err(ConfigError::Invalid {
                key: "WEB_DOMAIN",
                value: self.storage.web_domain.clone(),
            });
        }
        Ok(self)
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                backend: DatabaseBackend::MongoDb,
                uri: None,
                name: "elible".to_string(),
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 20 * 1024 * 1024, // 20MB
            },
            security: SecurityConfig {
                jwt_secret: "development-only-secret".to_string(),
                token_ttl_minutes: 15,
                bcrypt_cost: 4,
                cors_origins: Vec::new(),
            },
            storage: StorageConfig {
                image_dir: PathBuf::from("./images"),
                web_domain: String::new(),
                upload_dir: None,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                backend: DatabaseBackend::MongoDb,
                uri: None,
                name: "elible".to_string(),
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_minutes: 15,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: Vec::new(),
            },
            storage: StorageConfig {
                image_dir: PathBuf::new(),
                web_domain: String::new(),
                upload_dir: None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 8080 },
            database: DatabaseConfig {
                backend: DatabaseBackend::MongoDb,
                uri: None,
                name: "elible".to_string(),
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_ttl_minutes: 15,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                cors_origins: Vec::new(),
            },
            storage: StorageConfig {
                image_dir: PathBuf::new(),
                web_domain: String::new(),
                upload_dir: None,
            },
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str, current: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(v) => v.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring unparseable {}={:?}", key, v);
            current
        }),
        None => current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn development_defaults_with_memory_backend() {
        let config = AppConfig::from_lookup(lookup_from(&[("DATABASE_BACKEND", "memory")])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.token_ttl_minutes, 15);
        assert_eq!(config.storage.web_domain, "http://localhost:8080");
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
    }

    #[test]
    fn mongodb_backend_requires_uri() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("MONGODB_URI")));
    }

    #[test]
    fn production_requires_secret_and_storage() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));

        let config = AppConfig::from_lookup(lookup_from(&[
            ("APP_ENV", "production"),
            ("MONGODB_URI", "mongodb://localhost:27017"),
            ("MONGODB_NAME", "admissions"),
            ("JWT_SECRET", "s3cret"),
            ("IMAGE_DIR", "/var/lib/elible/images"),
            ("WEB_DOMAIN", "https://cdn.example.com"),
            ("PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.name, "admissions");
        assert_eq!(config.security.bcrypt_cost, bcrypt::DEFAULT_COST);
    }

    #[test]
    fn rejects_unknown_backend_and_bad_domain() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_BACKEND", "postgres")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "DATABASE_BACKEND", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_BACKEND", "memory"),
            ("WEB_DOMAIN", "not a url"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "WEB_DOMAIN", .. }));
    }

    #[test]
    fn unparseable_numbers_keep_preset() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_BACKEND", "memory"),
            ("PORT", "eighty"),
            ("SECURITY_CORS_ORIGINS", "https://a.example, ,https://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.security.cors_origins, vec!["https://a.example", "https://b.example"]);
    }
}
