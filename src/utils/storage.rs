use crate::types::StorageContext;
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, StatusCode,
};
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug)]
pub enum Error {
    UploadFailed,
    DestroyFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
        }
    }
}

#[derive(Clone, Debug)]
pub struct UploadedMedia {
    pub public_id: String,
    pub url: String,
    pub resource_type: ResourceType,
}

/// Remote media host that turns a local file into a public URL.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, path: &Path, resource_type: ResourceType)
        -> Result<UploadedMedia, Error>;

    async fn destroy(&self, media: &UploadedMedia) -> Result<(), Error>;
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

fn sign(data_to_sign: &str, api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", data_to_sign, api_secret));
    base16ct::lower::encode_string(&hasher.finalize())
}

#[derive(Clone)]
pub struct CloudinaryClient {
    cfg: StorageContext,
    http: Client,
}

impl CloudinaryClient {
    pub fn new(cfg: StorageContext) -> Self {
        Self {
            cfg,
            http: Client::new(),
        }
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.cfg.api_url,
            self.cfg.cloud_name,
            resource_type.as_str(),
            action
        )
    }
}

#[async_trait]
impl MediaUploader for CloudinaryClient {
    async fn upload(
        &self,
        path: &Path,
        resource_type: ResourceType,
    ) -> Result<UploadedMedia, Error> {
        let contents = tokio::fs::read(path).await.map_err(|err| {
            tracing::error!("Failed to read staged file {}: {:?}", path.display(), err);
            Error::UploadFailed
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| String::from("upload"));
        let part = Part::bytes(contents).file_name(file_name);

        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign(&format!("timestamp={}", timestamp), &self.cfg.api_secret);

        let form = Form::new()
            .text("api_key", self.cfg.api_key.clone())
            .text("timestamp", format!("{}", timestamp))
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .part("file", part);

        let res = self
            .http
            .post(self.endpoint(resource_type, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Error occurred while trying to upload a file: {:?}", err);
                Error::UploadFailed
            })?;

        let status = res.status();
        let data = res.text().await.map_err(|err| {
            tracing::error!("Error occurred while processing return data: {:?}", err);
            Error::UploadFailed
        })?;

        if status != StatusCode::OK {
            tracing::error!("Failed to upload file ({}): {}", status, data);
            return Err(Error::UploadFailed);
        }

        match serde_json::de::from_str::<UploadResponse>(data.as_ref()) {
            Ok(res) => Ok(UploadedMedia {
                public_id: res.public_id,
                url: res.secure_url,
                resource_type,
            }),
            Err(err) => {
                tracing::error!("Failed to deserialize cloudinary response: {:?}", err);
                Err(Error::UploadFailed)
            }
        }
    }

    async fn destroy(&self, media: &UploadedMedia) -> Result<(), Error> {
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign(
            &format!("public_id={}&timestamp={}", media.public_id, timestamp),
            &self.cfg.api_secret,
        );

        let body = json!({
            "public_id": media.public_id,
            "api_key": self.cfg.api_key,
            "signature": signature,
            "signature_algorithm": "sha256",
            "timestamp": timestamp,
        });

        let res = self
            .http
            .post(self.endpoint(media.resource_type, "destroy"))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to destroy media {}: {:?}", media.public_id, err);
                Error::DestroyFailed
            })?;

        let status = res.status();
        let data = res.text().await.map_err(|err| {
            tracing::error!(
                "Failed to process destroy response for {}: {:?}",
                media.public_id,
                err
            );
            Error::DestroyFailed
        })?;

        if status != StatusCode::OK {
            tracing::error!("Failed to destroy media ({}): {}", status, data);
            return Err(Error::DestroyFailed);
        }

        match serde_json::de::from_str::<DestroyResponse>(data.as_ref()) {
            Ok(res) if res.result == "ok" => {
                tracing::debug!("Destroyed media {}", media.public_id);
                Ok(())
            }
            Ok(res) => {
                tracing::error!("Media {} not destroyed: {}", media.public_id, res.result);
                Err(Error::DestroyFailed)
            }
            Err(err) => {
                tracing::error!("Failed to deserialize cloudinary response: {:?}", err);
                Err(Error::DestroyFailed)
            }
        }
    }
}
