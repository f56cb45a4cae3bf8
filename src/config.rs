use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub timeout_ms: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            api_url: try_load("BOXOFFICE_API_URL", "http://localhost"),
            session_file: var("BOXOFFICE_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_session_file()),
            timeout_ms: try_load("BOXOFFICE_TIMEOUT_MS", "10000"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn default_session_file() -> PathBuf {
    match env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".boxoffice").join("session.json"),
        Err(_) => PathBuf::from("session.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::default_session_file;

    #[test]
    fn default_session_file_is_under_home_when_set() {
        if std::env::var("HOME").is_ok() {
            let path = default_session_file();
            assert!(path.ends_with(".boxoffice/session.json"));
        }
    }
}
