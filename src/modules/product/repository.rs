use crate::utils::database::DatabaseConnection;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::PgExecutor;
use std::sync::Arc;
use tokio::sync::RwLock;
use ulid::Ulid;
use validator::Validate;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Validate, Clone, Debug, Default)]
pub struct CreateProductPayload {
    #[validate(length(max = 50))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
}

#[derive(Debug)]
pub enum Error {
    ValidationFailed,
    UnexpectedError,
}

fn validate(payload: &CreateProductPayload) -> Result<(), Error> {
    payload.validate().map_err(|err| {
        tracing::error!("Product failed validation: {}", err);
        Error::ValidationFailed
    })
}

pub async fn create<'e, E: PgExecutor<'e>>(
    e: E,
    payload: CreateProductPayload,
) -> Result<Product, Error> {
    validate(&payload)?;

    sqlx::query_as::<_, Product>(
        "
        INSERT INTO products
        (id, title, description, thumbnail_url, video_url)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, title, description, thumbnail_url, video_url
        ",
    )
    .bind(Ulid::new().to_string())
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.thumbnail_url)
    .bind(payload.video_url)
    .fetch_one(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to create a product: {}", err);
        Error::UnexpectedError
    })
}

pub async fn find_many<'e, E: PgExecutor<'e>>(e: E) -> Result<Vec<Product>, Error> {
    sqlx::query_as::<_, Product>(
        "SELECT id, title, description, thumbnail_url, video_url FROM products",
    )
    .fetch_all(e)
    .await
    .map_err(|err| {
        tracing::error!("Error occurred while trying to fetch many products: {}", err);
        Error::UnexpectedError
    })
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, payload: CreateProductPayload) -> Result<Product, Error>;

    async fn find_many(&self) -> Result<Vec<Product>, Error>;
}

#[derive(Clone)]
pub struct PgProductStore {
    db_conn: DatabaseConnection,
}

impl PgProductStore {
    pub fn new(db_conn: DatabaseConnection) -> Self {
        Self { db_conn }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, payload: CreateProductPayload) -> Result<Product, Error> {
        create(&self.db_conn.pool, payload).await
    }

    async fn find_many(&self) -> Result<Vec<Product>, Error> {
        find_many(&self.db_conn.pool).await
    }
}

/// Insertion-ordered store kept in process memory. Used as the test double for
/// `PgProductStore` by the router tests.
#[derive(Clone, Default)]
pub struct InMemoryProductStore {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, payload: CreateProductPayload) -> Result<Product, Error> {
        validate(&payload)?;

        let product = Product {
            id: Ulid::new().to_string(),
            title: payload.title,
            description: payload.description,
            thumbnail_url: payload.thumbnail_url,
            video_url: payload.video_url,
        };
        self.products.write().await.push(product.clone());

        Ok(product)
    }

    async fn find_many(&self) -> Result<Vec<Product>, Error> {
        Ok(self.products.read().await.clone())
    }
}
