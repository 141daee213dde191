//! `ValidJson` extractor: JSON body deserialization plus `validator` rules,
//! with every rejection reported as an `INVALID_REQUEST` error.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, OptionalFromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use moviez_core::error::AppError;

use crate::dto::request::validate_request;

/// A JSON request body that deserialized and passed validation.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

fn rejection_error(rejection: JsonRejection) -> AppError {
    AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
}

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        validate_request(&value)?;
        Ok(ValidJson(value))
    }
}

/// An absent body (no JSON content type) extracts as `None`.
impl<T, S> OptionalFromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let body = <Json<T> as OptionalFromRequest<S>>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        match body {
            Some(Json(value)) => {
                validate_request(&value)?;
                Ok(Some(ValidJson(value)))
            }
            None => Ok(None),
        }
    }
}
