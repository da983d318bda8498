//! JSON wrappers shared by the server handlers and the API client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::domain::listing::Page;

pub const OK_MESSAGE: &str = "success";

/// `{code, msg, data}` for single payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub msg: String,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self::with_message(OK_MESSAGE, data)
    }

    pub fn with_message(msg: impl Into<String>, data: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            msg: msg.into(),
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

/// `{code, msg, items, pagination}` for paginated listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub code: u16,
    pub msg: String,
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = Pagination {
            current: page.page,
            limit: page.limit,
            total: page.total,
            pages: page.total_pages(),
        };
        Self {
            code: StatusCode::OK.as_u16(),
            msg: OK_MESSAGE.to_string(),
            items: page.items,
            pagination,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Reading-history page nested inside an [`Envelope`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> From<Page<T>> for HistoryPage<T> {
    fn from(page: Page<T>) -> Self {
        let total_pages = page.total_pages();
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.limit,
            total_pages,
        }
    }
}
