use super::{service::service, types::request};
use crate::types::Context;
use axum::{extract::State, response::IntoResponse};
use axum_typed_multipart::BaseMultipart;
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    BaseMultipart { data: body, .. }: BaseMultipart<request::Body, request::Rejection>,
) -> impl IntoResponse {
    service(ctx, body).await
}
