pub mod request {
    use async_trait::async_trait;
    use axum::{
        extract::{multipart::Field, Json, Multipart},
        response::IntoResponse,
    };
    use axum_typed_multipart::{FieldData, TryFromField, TryFromMultipart, TypedMultipartError};
    use serde_json::json;
    use tempfile::NamedTempFile;

    pub struct Body {
        pub title: Option<String>,
        pub description: Option<String>,
        pub thumbnail: Option<FieldData<NamedTempFile>>,
        pub video: Option<FieldData<NamedTempFile>>,
    }

    async fn file_once(
        slot: &mut Option<FieldData<NamedTempFile>>,
        field: Field<'_>,
        field_name: &str,
    ) -> Result<(), TypedMultipartError> {
        if slot.is_some() {
            return Err(TypedMultipartError::DuplicateField {
                field_name: field_name.to_string(),
            });
        }

        *slot = Some(FieldData::<NamedTempFile>::try_from_field(field, None).await?);
        Ok(())
    }

    // Text fields keep the last value; file fields accept a single part each.
    // Unknown fields are skipped.
    #[async_trait]
    impl TryFromMultipart for Body {
        async fn try_from_multipart(multipart: &mut Multipart) -> Result<Self, TypedMultipartError> {
            let mut body = Body {
                title: None,
                description: None,
                thumbnail: None,
                video: None,
            };

            while let Some(field) = multipart.next_field().await? {
                let field_name = match field.name() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => continue,
                };

                match field_name.as_str() {
                    "title" => body.title = Some(String::try_from_field(field, None).await?),
                    "description" => {
                        body.description = Some(String::try_from_field(field, None).await?)
                    }
                    "thumbnail" => file_once(&mut body.thumbnail, field, &field_name).await?,
                    "video" => file_once(&mut body.video, field, &field_name).await?,
                    _ => continue,
                }
            }

            Ok(body)
        }
    }

    pub struct Rejection(TypedMultipartError);

    impl From<TypedMultipartError> for Rejection {
        fn from(err: TypedMultipartError) -> Self {
            Self(err)
        }
    }

    impl IntoResponse for Rejection {
        fn into_response(self) -> axum::response::Response {
            tracing::error!("Error creating product, rejected form: {}", self.0);

            (self.0.get_status(), Json(json!({ "error": self.0.to_string() }))).into_response()
        }
    }
}

pub mod response {
    use crate::modules::product::repository::Product;
    use axum::{extract::Json, http::StatusCode, response::IntoResponse};
    use serde_json::json;

    pub enum Success {
        ProductCreated(Product),
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::ProductCreated(product) => {
                    (StatusCode::CREATED, Json(product)).into_response()
                }
            }
        }
    }

    pub enum Error {
        FailedToCreateProduct,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::FailedToCreateProduct => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Error creating product" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
