mod categories;
mod questions;
mod quizzes;

use std::collections::BTreeMap;

use axum::Json;
use serde::{Deserialize, Serialize};

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::quizzes_router;

use crate::db::Category;
use crate::server::deserializers::deserialize_lenient_i64;
use crate::server::error::ApiError;
use crate::server::pagination::Page;

pub type ApiResponse<T> = Result<Json<Success<T>>, ApiError>;

/// Success envelope: the payload's fields next to `"success": true`.
#[derive(Serialize)]
pub struct Success<T> {
    success: bool,
    #[serde(flatten)]
    body: T,
}

pub fn success<T>(body: T) -> ApiResponse<T> {
    Ok(Json(Success {
        success: true,
        body,
    }))
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    page: Option<i64>,
}

impl PageQuery {
    fn page(&self) -> Page {
        self.page.map(Page::new).unwrap_or_default()
    }
}

/// Category id to label, as sent to clients.
fn category_labels(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.kind)).collect()
}
