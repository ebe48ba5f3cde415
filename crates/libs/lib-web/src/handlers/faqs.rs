//! # FAQ Handlers
//!
//! Read-only access to the knowledge base.
//!
//! ## Endpoints
//!
//! - `GET /api/faqs?category={category}&search={text}` - List active entries

use axum::{
    extract::{Query, State},
    Json,
};
use lib_core::dto::{FaqDto, FaqQuery};
use lib_core::model::store::FaqRepository;
use lib_core::{AppError, DbPool};
use tracing::{debug, instrument};

/// List active FAQs, filtered by category and search text.
///
/// An unknown category is `400 Bad Request`.
#[instrument(skip(db))]
pub async fn list_faqs(
    State(db): State<DbPool>,
    Query(params): Query<FaqQuery>,
) -> Result<Json<Vec<FaqDto>>, AppError> {
    let category = params.category().map_err(AppError::InvalidInput)?;

    let faqs = FaqRepository::search(&db, category, params.search.as_deref()).await?;
    debug!(count = faqs.len(), "[FAQ] Listed");

    Ok(Json(faqs.into_iter().map(FaqDto::from).collect()))
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}
