use axum::{extract::Query, http::StatusCode, Json};
use contracts::dashboards::d101_collection_summary::{
    CollectionSummaryRequest, CollectionSummaryResponse,
};
use contracts::shared::date_range::DateRange;

use crate::dashboards::d101_collection_summary::service;
use crate::system::auth::extractor::CurrentSession;
use crate::upstream::client;

/// GET /api/d101/collection-summary?date_from=2025-08-01&date_to=2025-08-29
pub async fn get_collection_summary(
    CurrentSession(session): CurrentSession,
    Query(request): Query<CollectionSummaryRequest>,
) -> Result<Json<CollectionSummaryResponse>, StatusCode> {
    let range = DateRange::from_params(request.date_from.as_deref(), request.date_to.as_deref());
    tracing::info!(
        "D101 Dashboard: Getting collection summary for {} to {}",
        range.date_from,
        range.date_to
    );

    let token = Some(session.upstream_token.as_str());

    let metrics_payload = match client::get_client()
        .fetch_collection_metrics(token, &range)
        .await
    {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(
                "D101 Dashboard: Collection metrics unavailable, rendering zeros: {}",
                e
            );
            serde_json::Value::Null
        }
    };

    // The DPD breakdown needs the raw records; they too degrade to an
    // empty table instead of failing the page.
    let records = match client::get_client()
        .fetch_collection_records(token, &range)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("D101 Dashboard: Collection records unavailable: {}", e);
            Vec::new()
        }
    };

    let response = service::build_summary(metrics_payload, &records);

    tracing::info!(
        "D101 Dashboard: Returning metrics ({} collections) and {} DPD buckets",
        response.metrics.total_collection_count,
        response.dpd_buckets.len()
    );
    Ok(Json(response))
}
