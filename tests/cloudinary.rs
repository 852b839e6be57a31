//! `CloudinaryClient` against a local stand-in for the Cloudinary REST API.
//!
//! The stand-in checks request signatures and answers per cloud name:
//! `down` replies 500, `garbled` replies 200 with a non-JSON body,
//! `missing` reports destroy targets as not found.

use axum::body::Body;
use axum::extract::{Json, Multipart, Path};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use http_body_util::BodyExt;
use productreel_backend_rs::{
    app,
    modules::product::repository::InMemoryProductStore,
    types::{AppContext, Context, StorageContext},
    utils::{
        staging::TempStorage,
        storage::{self, CloudinaryClient, MediaUploader, ResourceType, UploadedMedia},
    },
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt; // For oneshot()

const API_KEY: &str = "key";
const API_SECRET: &str = "secret";

fn signature_for(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}{}", data, API_SECRET));
    base16ct::lower::encode_string(&hasher.finalize())
}

async fn upload(
    Path((cloud, resource_type)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Response {
    let mut fields = HashMap::new();
    let mut file_name = None;

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            file_name = field.file_name().map(str::to_string);
            field.bytes().await.unwrap();
        } else {
            fields.insert(name, field.text().await.unwrap());
        }
    }

    match cloud.as_str() {
        "down" => (StatusCode::INTERNAL_SERVER_ERROR, "provider unavailable").into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => {
            let expected = fields
                .get("timestamp")
                .map(|timestamp| signature_for(&format!("timestamp={}", timestamp)));
            let signed = fields.get("api_key").map(String::as_str) == Some(API_KEY)
                && fields.get("signature_algorithm").map(String::as_str) == Some("sha256")
                && expected.is_some()
                && fields.get("signature") == expected.as_ref();

            if !signed {
                return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad signature" })))
                    .into_response();
            }

            Json(json!({
                "secure_url": format!(
                    "https://res.cloudinary.com/{}/{}/upload/{}",
                    cloud,
                    resource_type,
                    file_name.unwrap_or_default()
                ),
                "public_id": "sample",
            }))
            .into_response()
        }
    }
}

async fn destroy(
    Path((cloud, _resource_type)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let expected = signature_for(&format!(
        "public_id={}&timestamp={}",
        body["public_id"].as_str().unwrap_or_default(),
        body["timestamp"]
    ));
    if body["signature"] != expected.as_str() || body["api_key"] != API_KEY {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad signature" })))
            .into_response();
    }

    match cloud.as_str() {
        "down" => (StatusCode::INTERNAL_SERVER_ERROR, "provider unavailable").into_response(),
        "missing" => Json(json!({ "result": "not found" })).into_response(),
        _ => Json(json!({ "result": "ok" })).into_response(),
    }
}

async fn spawn_provider() -> String {
    let router = Router::new()
        .route("/:cloud/:resource_type/upload", post(upload))
        .route("/:cloud/:resource_type/destroy", post(destroy));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    format!("http://{}", addr)
}

fn client(api_url: &str, cloud_name: &str) -> CloudinaryClient {
    CloudinaryClient::new(StorageContext {
        cloud_name: cloud_name.to_string(),
        api_key: API_KEY.to_string(),
        api_secret: API_SECRET.to_string(),
        api_url: api_url.to_string(),
    })
}

fn media(resource_type: ResourceType) -> UploadedMedia {
    UploadedMedia {
        public_id: String::from("sample"),
        url: String::from("https://res.cloudinary.com/demo/image/upload/sample"),
        resource_type,
    }
}

#[tokio::test]
async fn test_upload_reads_secure_url_and_public_id() {
    let api_url = spawn_provider().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.png");
    std::fs::write(&path, b"png-bytes").unwrap();

    let uploaded = client(&api_url, "demo")
        .upload(&path, ResourceType::Image)
        .await
        .unwrap();

    assert_eq!(
        uploaded.url,
        "https://res.cloudinary.com/demo/image/upload/img.png"
    );
    assert_eq!(uploaded.public_id, "sample");
    assert_eq!(uploaded.resource_type, ResourceType::Image);
}

#[tokio::test]
async fn test_video_upload_uses_video_endpoint() {
    let api_url = spawn_provider().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, b"mp4-bytes").unwrap();

    let uploaded = client(&api_url, "demo")
        .upload(&path, ResourceType::Video)
        .await
        .unwrap();

    assert_eq!(
        uploaded.url,
        "https://res.cloudinary.com/demo/video/upload/clip.mp4"
    );
    assert_eq!(uploaded.resource_type, ResourceType::Video);
}

#[tokio::test]
async fn test_upload_error_status_fails() {
    let api_url = spawn_provider().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.png");
    std::fs::write(&path, b"png-bytes").unwrap();

    let result = client(&api_url, "down")
        .upload(&path, ResourceType::Image)
        .await;

    assert!(matches!(result, Err(storage::Error::UploadFailed)));
}

#[tokio::test]
async fn test_upload_malformed_reply_fails() {
    let api_url = spawn_provider().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.png");
    std::fs::write(&path, b"png-bytes").unwrap();

    let result = client(&api_url, "garbled")
        .upload(&path, ResourceType::Image)
        .await;

    assert!(matches!(result, Err(storage::Error::UploadFailed)));
}

#[tokio::test]
async fn test_upload_with_wrong_secret_fails() {
    let api_url = spawn_provider().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("img.png");
    std::fs::write(&path, b"png-bytes").unwrap();
    let client = CloudinaryClient::new(StorageContext {
        cloud_name: String::from("demo"),
        api_key: API_KEY.to_string(),
        api_secret: String::from("not-the-secret"),
        api_url,
    });

    let result = client.upload(&path, ResourceType::Image).await;

    assert!(matches!(result, Err(storage::Error::UploadFailed)));
}

#[tokio::test]
async fn test_destroy_succeeds_on_ok_result() {
    let api_url = spawn_provider().await;

    let result = client(&api_url, "demo")
        .destroy(&media(ResourceType::Video))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_destroy_fails_when_result_is_not_ok() {
    let api_url = spawn_provider().await;

    let result = client(&api_url, "missing")
        .destroy(&media(ResourceType::Image))
        .await;

    assert!(matches!(result, Err(storage::Error::DestroyFailed)));
}

#[tokio::test]
async fn test_destroy_error_status_fails() {
    let api_url = spawn_provider().await;

    let result = client(&api_url, "down")
        .destroy(&media(ResourceType::Image))
        .await;

    assert!(matches!(result, Err(storage::Error::DestroyFailed)));
}

#[tokio::test]
async fn test_provider_failure_returns_500_and_saves_nothing() {
    let api_url = spawn_provider().await;
    let staging_dir = tempfile::tempdir().unwrap();
    let ctx = Context {
        app: AppContext {
            host: String::from("127.0.0.1"),
            port: 0,
            max_upload_size: None,
            destroy_orphaned_media: false,
        },
        products: Arc::new(InMemoryProductStore::new()),
        media: Arc::new(client(&api_url, "down")),
        staging: TempStorage::new(staging_dir.path().join("uploads")),
    };
    let router = app::get_router(Arc::new(ctx));

    let boundary = "productreel-provider-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nDemo\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"thumbnail\"; filename=\"img.png\"\r\n\
         Content-Type: image/png\r\n\r\npng-bytes\r\n--{b}--\r\n",
        b = boundary
    );
    let request = Request::builder()
        .method("POST")
        .uri("/products")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let error: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(error, json!({ "error": "Error creating product" }));

    let request = Request::builder()
        .method("GET")
        .uri("/products")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let products: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(products, json!([]));

    let staged = std::fs::read_dir(staging_dir.path().join("uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(staged, 0);
}
