use super::types::{request, response};
use crate::{
    modules::product::repository::CreateProductPayload,
    types::Context,
    utils::storage::{ResourceType, UploadedMedia},
};
use axum_typed_multipart::FieldData;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;

pub async fn service(ctx: Arc<Context>, body: request::Body) -> response::Response {
    let mut staged: Vec<PathBuf> = vec![];
    let mut uploaded: Vec<UploadedMedia> = vec![];

    let result = create_product(&ctx, body, &mut staged, &mut uploaded).await;

    if result.is_err() {
        handle_orphaned_media(&ctx, uploaded).await;
    }

    for path in staged {
        // failures are logged by the staging adapter
        let _ = ctx.staging.delete(&path).await;
    }

    result
}

async fn create_product(
    ctx: &Context,
    body: request::Body,
    staged: &mut Vec<PathBuf>,
    uploaded: &mut Vec<UploadedMedia>,
) -> response::Response {
    let thumbnail_path = stage(ctx, body.thumbnail, staged).await?;
    let video_path = stage(ctx, body.video, staged).await?;

    let thumbnail_url = match thumbnail_path {
        Some(path) => Some(upload(ctx, &path, ResourceType::Image, uploaded).await?),
        None => None,
    };

    let video_url = match video_path {
        Some(path) => Some(upload(ctx, &path, ResourceType::Video, uploaded).await?),
        None => None,
    };

    ctx.products
        .create(CreateProductPayload {
            title: body.title,
            description: body.description,
            thumbnail_url,
            video_url,
        })
        .await
        .map_err(|err| {
            tracing::error!("Error creating product: {:?}", err);
            response::Error::FailedToCreateProduct
        })
        .map(response::Success::ProductCreated)
}

async fn stage(
    ctx: &Context,
    field: Option<FieldData<NamedTempFile>>,
    staged: &mut Vec<PathBuf>,
) -> Result<Option<PathBuf>, response::Error> {
    let field = match field {
        Some(field) => field,
        None => return Ok(None),
    };

    let file_name = field
        .metadata
        .file_name
        .clone()
        .or_else(|| field.metadata.name.clone())
        .unwrap_or_default();

    let path = ctx
        .staging
        .write(&file_name, field.contents.path())
        .await
        .map_err(|err| {
            tracing::error!("Error creating product, staging {} failed: {:?}", file_name, err);
            response::Error::FailedToCreateProduct
        })?;

    staged.push(path.clone());

    Ok(Some(path))
}

async fn upload(
    ctx: &Context,
    path: &Path,
    resource_type: ResourceType,
    uploaded: &mut Vec<UploadedMedia>,
) -> Result<String, response::Error> {
    let media = ctx
        .media
        .upload(path, resource_type)
        .await
        .map_err(|err| {
            tracing::error!(
                "Error creating product, {} upload failed: {:?}",
                resource_type.as_str(),
                err
            );
            response::Error::FailedToCreateProduct
        })?;

    let url = media.url.clone();
    uploaded.push(media);

    Ok(url)
}

async fn handle_orphaned_media(ctx: &Context, uploaded: Vec<UploadedMedia>) {
    for media in uploaded {
        if !ctx.app.destroy_orphaned_media {
            tracing::warn!("Uploaded media {} left orphaned", media.public_id);
            continue;
        }

        if ctx.media.destroy(&media).await.is_err() {
            tracing::error!("Failed to destroy orphaned media {}", media.public_id);
        }
    }
}
