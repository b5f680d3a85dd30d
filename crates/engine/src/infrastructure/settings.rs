//! Engine settings loaded from the process environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `SERVER_HOST` | `0.0.0.0` |
//! | `SERVER_PORT` / `PORT` | `5000` |
//! | `GAMES_DB` | `games.db` (empty disables persistence) |
//! | `DISCONNECT_GRACE_SECS` | `30` |
//! | `ALLOW_ANONYMOUS` | `false` |
//! | `CLIENT_DIR` | `./client` |

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_GRACE: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub server_host: String,
    pub server_port: u16,
    /// `None` runs without a finished-game archive
    pub games_db: Option<String>,
    pub disconnect_grace: Duration,
    /// Default a missing identity to `guest` instead of refusing the connection
    pub allow_anonymous: bool,
    pub client_dir: PathBuf,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: DEFAULT_PORT,
            games_db: Some("games.db".to_string()),
            disconnect_grace: DEFAULT_GRACE,
            allow_anonymous: false,
            client_dir: PathBuf::from("./client"),
        }
    }
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparseable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);

        let server_port = lookup("SERVER_PORT")
            .or_else(|| lookup("PORT"))
            .map(|raw| {
                raw.trim().parse().unwrap_or_else(|_| {
                    tracing::warn!(value = %raw, "Invalid SERVER_PORT, using default");
                    defaults.server_port
                })
            })
            .unwrap_or(defaults.server_port);

        let games_db = match lookup("GAMES_DB") {
            Some(path) if path.trim().is_empty() => None,
            Some(path) => Some(path.trim().to_string()),
            None => defaults.games_db,
        };

        let disconnect_grace = lookup("DISCONNECT_GRACE_SECS")
            .map(|raw| match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(value = %raw, "Invalid DISCONNECT_GRACE_SECS, using default");
                    defaults.disconnect_grace
                }
            })
            .unwrap_or(defaults.disconnect_grace);

        let allow_anonymous = lookup("ALLOW_ANONYMOUS")
            .map(|raw| parse_flag(&raw))
            .unwrap_or(defaults.allow_anonymous);

        let client_dir = lookup("CLIENT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.client_dir);

        Self {
            server_host,
            server_port,
            games_db,
            disconnect_grace,
            allow_anonymous,
            client_dir,
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
