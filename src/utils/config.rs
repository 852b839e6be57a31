use std::env;

#[derive(Debug)]
pub enum Error {
    Missing(&'static str),
    Invalid(&'static str, String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "{} not set", key),
            Self::Invalid(key, value) => write!(f, "Invalid {} value: {}", key, value),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_size: Option<usize>,
    pub destroy_orphaned_media: bool,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
}

#[derive(Clone, Debug)]
pub struct StagingConfig {
    pub upload_dir: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub staging: StagingConfig,
}

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_CLOUDINARY_API_URL: &str = "https://api.cloudinary.com/v1_1";

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(Error::Missing(key));

        let database_url = required("DATABASE_URL")?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| Error::Invalid("PORT", raw))?,
            None => DEFAULT_PORT,
        };
        let max_upload_size = match lookup("MAX_UPLOAD_SIZE") {
            Some(raw) => Some(
                raw.parse::<usize>()
                    .map_err(|_| Error::Invalid("MAX_UPLOAD_SIZE", raw))?,
            ),
            None => None,
        };
        let destroy_orphaned_media = match lookup("DESTROY_ORPHANED_MEDIA") {
            Some(raw) => match raw.to_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => return Err(Error::Invalid("DESTROY_ORPHANED_MEDIA", raw)),
            },
            None => false,
        };
        let cloud_name = required("CLOUD_NAME")?;
        let api_key = required("API_KEY")?;
        let api_secret = required("API_SECRET")?;
        let api_url = lookup("CLOUDINARY_API_URL")
            .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_URL.to_string());
        let upload_dir = lookup("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string());

        Ok(Config {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                port,
                max_upload_size,
                destroy_orphaned_media,
            },
            storage: StorageConfig {
                cloud_name,
                api_key,
                api_secret,
                api_url: api_url.trim_end_matches('/').to_string(),
            },
            staging: StagingConfig { upload_dir },
        })
    }
}
