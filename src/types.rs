pub use crate::utils::config::Config;
use crate::{
    modules::product::repository::{PgProductStore, ProductStore},
    utils::{
        database,
        staging::TempStorage,
        storage::{CloudinaryClient, MediaUploader},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppContext {
    pub host: String,
    pub port: u16,
    pub max_upload_size: Option<usize>,
    pub destroy_orphaned_media: bool,
}

#[derive(Clone, Debug)]
pub struct StorageContext {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_url: String,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub products: Arc<dyn ProductStore>,
    pub media: Arc<dyn MediaUploader>,
    pub staging: TempStorage,
}

#[derive(Debug)]
pub enum Error {
    DatabaseUnavailable(sqlx::Error),
    MigrationFailed(sqlx::migrate::MigrateError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseUnavailable(err) => write!(f, "Error connecting to database: {}", err),
            Self::MigrationFailed(err) => write!(f, "Failed to run database migrations: {}", err),
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> Result<Context, Error>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> Result<Context, Error> {
        let db_conn = database::connect(self.database.url.as_str())
            .await
            .map_err(Error::DatabaseUnavailable)?;
        database::migrate(&db_conn)
            .await
            .map_err(Error::MigrationFailed)?;

        let storage = StorageContext {
            cloud_name: self.storage.cloud_name,
            api_key: self.storage.api_key,
            api_secret: self.storage.api_secret,
            api_url: self.storage.api_url,
        };

        Ok(Context {
            app: AppContext {
                host: self.app.host,
                port: self.app.port,
                max_upload_size: self.app.max_upload_size,
                destroy_orphaned_media: self.app.destroy_orphaned_media,
            },
            products: Arc::new(PgProductStore::new(db_conn)),
            media: Arc::new(CloudinaryClient::new(storage)),
            staging: TempStorage::new(self.staging.upload_dir),
        })
    }
}
