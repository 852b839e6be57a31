use super::types::response;
use crate::types::Context;
use std::sync::Arc;

pub async fn service(ctx: Arc<Context>) -> response::Response {
    ctx.products
        .find_many()
        .await
        .map_err(|err| {
            tracing::error!("Error fetching products: {:?}", err);
            response::Error::FailedToFetchProducts
        })
        .map(response::Success::Products)
}
