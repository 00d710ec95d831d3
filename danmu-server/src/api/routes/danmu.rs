//! Danmu aggregation route.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use danmaku::to_xml;

use crate::api::error::ApiResult;
use crate::api::models::{DanmuQuery, OutputFormat};
use crate::api::server::AppState;

/// Create the danmu router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_danmu))
}

/// `GET /api/danmu?mediaId=&title=&year=&episode=&format=json|xml`
async fn get_danmu(
    State(state): State<AppState>,
    Query(query): Query<DanmuQuery>,
) -> ApiResult<Response> {
    let format = OutputFormat::parse(query.format.as_deref())?;
    let response = state
        .danmu_service
        .aggregate(&query.to_media_query())
        .await?;

    Ok(match format {
        OutputFormat::Json => Json(response).into_response(),
        OutputFormat::Xml => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            to_xml(&response.danmu),
        )
            .into_response(),
    })
}
