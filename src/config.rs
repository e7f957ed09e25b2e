use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,  // in bytes
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub data_dir: String,
    pub users_file: String,
    pub tasks_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub cookie_name: String,
    pub secure_cookie: bool,
    pub min_password_length: usize,
}

impl StorageConfig {
    pub fn users_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.users_file)
    }

    pub fn tasks_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(&self.tasks_file)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.max_body_size", 64 * 1024)?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.users_file", "users.json")?
            .set_default("storage.tasks_file", "tasks.json")?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("auth.cookie_name", "session")?
            .set_default("auth.secure_cookie", false)?
            .set_default("auth.min_password_length", 1)?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

// bcrypt's minimum work factor
#[cfg(test)]
const TEST_BCRYPT_COST: u32 = 4;

#[cfg(test)]
impl Config {
    /// Configuration for in-process tests: files under `data_dir`, cheap hashing.
    pub fn for_tests(data_dir: &std::path::Path) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                max_body_size: 64 * 1024,
            },
            storage: StorageConfig {
                data_dir: data_dir.to_string_lossy().into_owned(),
                users_file: "users.json".into(),
                tasks_file: "tasks.json".into(),
            },
            auth: AuthConfig {
                bcrypt_cost: TEST_BCRYPT_COST,
                cookie_name: "session".into(),
                secure_cookie: false,
                min_password_length: 1,
            },
        }
    }
}
