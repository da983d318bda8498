use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts, Json, Path, Query, Request};
use axum::http::request::Parts;
use serde::de::{self, DeserializeOwned, Visitor};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::application::errors::{ApiError, AppError};
use crate::domain::listing::PageRequest;

pub const INVALID_BODY_MESSAGE: &str = "请求体格式错误";
pub const INVALID_PARAMS_MESSAGE: &str = "请求参数格式错误";

/// JSON body extractor whose rejection is rendered as the error envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send + 'static,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await.map_err(|err| {
            warn!(error = %err, "failed to parse JSON payload");
            ApiError::from(AppError::validation(INVALID_BODY_MESSAGE))
        })?;
        Ok(Self(payload))
    }
}

/// Path extractor with envelope-shaped rejections.
#[derive(Debug)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| {
                warn!(error = %err, "invalid path parameter");
                ApiError::from(AppError::validation(INVALID_PARAMS_MESSAGE))
            })?;
        Ok(Self(value))
    }
}

/// Query-string extractor with envelope-shaped rejections.
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|err| {
                warn!(error = %err, "invalid query string");
                ApiError::from(AppError::validation(INVALID_PARAMS_MESSAGE))
            })?;
        Ok(Self(value))
    }
}

/// `?page=&limit=` as sent by listing screens.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PageQuery {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub page: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn into_request(self, default_limit: u32) -> PageRequest {
        PageRequest::from_query(self.page, self.limit, default_limit)
    }
}

/// Deserialize an optional number, treating empty strings as `None`.
///
/// Query strings send `page=` for blank inputs, which `serde_urlencoded`
/// cannot parse as `Option<u32>`.
pub(crate) fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: de::Deserializer<'de>,
    T: FromStr,
    <T as FromStr>::Err: fmt::Display,
{
    struct EmptyStringVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for EmptyStringVisitor<T>
    where
        T: FromStr,
        <T as FromStr>::Err: fmt::Display,
    {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number, numeric string, or empty string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            let v = v.trim();
            if v.is_empty() {
                Ok(None)
            } else {
                v.parse::<T>().map(Some).map_err(E::custom)
            }
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            v.to_string().parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            v.to_string().parse::<T>().map(Some).map_err(E::custom)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: de::Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(EmptyStringVisitor(PhantomData))
}
