use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct NewsItem {
    id: i64,
    title: String,
    description: Option<String>,
    link: String,
    image_url: Option<String>,
    published_at: DateTime<Utc>,
    category: Option<String>,
}

impl From<newsdb_db::NewsRow> for NewsItem {
    fn from(row: newsdb_db::NewsRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            link: row.link,
            image_url: row.image_url,
            published_at: row.published_at,
            category: row.category.filter(|c| !c.is_empty()),
        }
    }
}

type NewsListResponse = Result<Json<ApiResponse<Vec<NewsItem>>>, ApiError>;

fn list_response(
    rows: Vec<newsdb_db::NewsRow>,
    req_id: RequestId,
) -> Json<ApiResponse<Vec<NewsItem>>> {
    Json(ApiResponse {
        data: rows.into_iter().map(NewsItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    })
}

pub(super) async fn list_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> NewsListResponse {
    let rows = newsdb_db::list_news(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(list_response(rows, req_id))
}

pub(super) async fn list_news_by_category(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(category): Path<String>,
) -> NewsListResponse {
    let rows = newsdb_db::list_news_by_category(&state.pool, &category)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(list_response(rows, req_id))
}

pub(super) async fn search_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(keyword): Path<String>,
) -> NewsListResponse {
    let rows = newsdb_db::search_news(&state.pool, &keyword)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    Ok(list_response(rows, req_id))
}

pub(super) async fn get_news(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(raw_id): Path<String>,
) -> Result<Json<ApiResponse<NewsItem>>, ApiError> {
    let Ok(id) = raw_id.parse::<i64>() else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            format!("invalid news id: {raw_id}"),
        ));
    };

    let row = newsdb_db::get_news_by_id(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("news item {id} not found"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: NewsItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
