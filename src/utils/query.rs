use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// `Query` whose rejection is reported through `AppError`, so a bad filter
/// value gets the usual `{"error": ...}` body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Request, StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Generations {
        generations: Option<i32>,
    }

    async fn extract(uri: &str) -> Result<ApiQuery<Generations>, AppError> {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        ApiQuery::<Generations>::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn parses_valid_query() {
        let ApiQuery(query) = extract("/pedigree?generations=4").await.unwrap();
        assert_eq!(query.generations, Some(4));

        let ApiQuery(query) = extract("/pedigree").await.unwrap();
        assert_eq!(query.generations, None);
    }

    #[tokio::test]
    async fn bad_value_is_a_bad_request() {
        let err = extract("/pedigree?generations=abc").await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.message().contains("generations"), "{}", err.message());
    }
}
