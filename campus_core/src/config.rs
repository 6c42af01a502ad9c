use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "campus_next";
static CAMPUS_DB_NAME: &str = "campus_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

/// Full connection string override, e.g. for pointing at a shared Postgres
/// instead of the local SQLite file.
static DATABASE_URL_ENV: &str = "CAMPUS_DATABASE_URL";

// Directory layout:
// data_dir_path
// |- campus_next
//    |- campus_db.sqlite
//    |- config.json

#[derive(Serialize, Deserialize, Debug)]
pub struct CampusConfig {
    pub(crate) database_path: PathBuf,

    /// Set from the environment at load time, never persisted.
    #[serde(skip)]
    pub(crate) database_url: Option<String>,
}

impl CampusConfig {
    fn new(data_dir: PathBuf) -> Self {
        CampusConfig {
            database_path: data_dir.join(CAMPUS_DB_NAME),
            database_url: None,
        }
    }

    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.database_url {
            return url.clone();
        }
        format!("sqlite://{}?mode=rwc", self.database_path.display())
    }
}

/// Gets the existing config or initializes a new one if it doesn't exist
pub async fn get_or_init() -> Result<CampusConfig, Box<dyn std::error::Error>> {
    let data_dir = dirs::data_dir().ok_or("failed to find a data directory on this platform")?;

    let campus_dir = data_dir.join(DATA_DIR_NAME);
    let config_path = campus_dir.join(CONFIG_FILE_NAME);

    // Create the campus directory if it doesn't exist
    fs::create_dir_all(&campus_dir).await?;

    let mut config = if config_path.exists() {
        // Read and deserialize existing config
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        serde_json::from_str::<CampusConfig>(&contents)?
    } else {
        // Create new config
        let config = CampusConfig::new(campus_dir.clone());

        // Serialize and write to file
        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;

        config
    };

    config.database_url = std::env::var(DATABASE_URL_ENV).ok();

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_connection_string() {
        let config = CampusConfig::new(PathBuf::from("/tmp/campus_next"));
        assert_eq!(
            config.connection_string(),
            "sqlite:///tmp/campus_next/campus_db.sqlite?mode=rwc"
        );
    }

    #[test]
    fn test_url_override_wins() {
        let mut config = CampusConfig::new(PathBuf::from("/tmp/campus_next"));
        config.database_url = Some("postgres://campus@localhost/course_db".to_string());
        assert_eq!(
            config.connection_string(),
            "postgres://campus@localhost/course_db"
        );
    }
}
