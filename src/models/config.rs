use serde::Deserialize;

/// Configuration options for the Stockroom service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default)]
    pub media: MediaConfig,
}

/// Where uploaded media lands on disk and how it is exposed over HTTP.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_media_root")]
    pub root: String,
    #[serde(default = "default_media_public_path")]
    pub public_path: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: default_media_root(),
            public_path: default_media_public_path(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_database_url() -> String {
    "stockroom.db".to_string()
}

fn default_media_root() -> String {
    "./media".to_string()
}

fn default_media_public_path() -> String {
    "/media".to_string()
}
