use axum::{extract::RawQuery, http::StatusCode, Json};
use contracts::dashboards::d100_disbursal_summary::{
    DisbursalSummaryRequest, DisbursalSummaryResponse,
};
use contracts::dashboards::d101_collection_summary::CollectionMetrics;
use contracts::shared::date_range::DateRange;
use contracts::shared::records::RecordsResponse;

use crate::dashboards::d100_disbursal_summary::service;
use crate::dashboards::d101_collection_summary::service as collection_service;
use crate::dashboards::d101_collection_summary::service::CollectionCategory;
use crate::shared::query::QueryPairs;
use crate::system::auth::extractor::CurrentSession;
use crate::upstream::client;

/// Build the request from the raw query string. `state` and `city` are
/// repeatable (`?state=A&state=B`) and each value may itself carry a
/// comma-separated list.
fn disbursal_request(raw: Option<&str>) -> DisbursalSummaryRequest {
    let pairs = QueryPairs::parse(raw);
    DisbursalSummaryRequest {
        date_from: pairs.last("date_from"),
        date_to: pairs.last("date_to"),
        state: pairs.joined("state"),
        city: pairs.joined("city"),
    }
}

/// GET /api/d100/disbursal-summary?date_from=2025-08-01&date_to=2025-08-29
pub async fn get_disbursal_summary(
    CurrentSession(session): CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<DisbursalSummaryResponse>, StatusCode> {
    let request = disbursal_request(raw.as_deref());
    let range = DateRange::from_params(request.date_from.as_deref(), request.date_to.as_deref());
    tracing::info!(
        "D100 Dashboard: Getting disbursal summary for {} to {}",
        range.date_from,
        range.date_to
    );

    let token = Some(session.upstream_token.as_str());

    let records = match client::get_client().fetch_disbursals(token, &range).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("D100 Dashboard: Failed to fetch disbursals: {}", e);
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    // Collection metrics are decoration on this dashboard; a metrics
    // outage must not take the whole page down.
    let metrics = match client::get_client()
        .fetch_collection_metrics(token, &range)
        .await
    {
        Ok(payload) => collection_service::reconcile_metrics(payload),
        Err(e) => {
            tracing::warn!(
                "D100 Dashboard: Collection metrics unavailable, rendering zeros: {}",
                e
            );
            CollectionMetrics::default()
        }
    };

    let response = service::build_summary(
        records,
        &request.state_filters(),
        &request.city_filters(),
        metrics,
    );

    tracing::info!(
        "D100 Dashboard: Returning summary for {} records ({} states)",
        response.records.total,
        response.states.len()
    );
    Ok(Json(response))
}

/// GET /api/d100/disbursal-records
pub async fn get_disbursal_records(
    CurrentSession(session): CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<RecordsResponse>, StatusCode> {
    let request = disbursal_request(raw.as_deref());
    let range = DateRange::from_params(request.date_from.as_deref(), request.date_to.as_deref());
    let token = Some(session.upstream_token.as_str());

    match client::get_client().fetch_disbursals(token, &range).await {
        Ok(records) => {
            let records =
                service::filter_records(records, &request.state_filters(), &request.city_filters());
            tracing::info!("D100 Dashboard: Returning {} disbursal records", records.len());
            let count = records.len();
            Ok(Json(RecordsResponse { records, count }))
        }
        Err(e) => {
            tracing::error!("D100 Dashboard: Failed to fetch disbursal records: {}", e);
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

/// GET /api/d100/prepayment-records
pub async fn get_prepayment_records(
    session: CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<RecordsResponse>, StatusCode> {
    category_records(session, raw, CollectionCategory::Prepayment).await
}

/// GET /api/d100/on-time-records
pub async fn get_on_time_records(
    session: CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<RecordsResponse>, StatusCode> {
    category_records(session, raw, CollectionCategory::OnTime).await
}

/// GET /api/d100/overdue-records
pub async fn get_overdue_records(
    session: CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<RecordsResponse>, StatusCode> {
    category_records(session, raw, CollectionCategory::Overdue).await
}

/// Drill-down tables share one shape: fetch the collection records for
/// the range, keep the ones in the requested repayment category.
async fn category_records(
    CurrentSession(session): CurrentSession,
    raw: Option<String>,
    category: CollectionCategory,
) -> Result<Json<RecordsResponse>, StatusCode> {
    let request = disbursal_request(raw.as_deref());
    let range = DateRange::from_params(request.date_from.as_deref(), request.date_to.as_deref());
    let token = Some(session.upstream_token.as_str());

    match client::get_client()
        .fetch_collection_records(token, &range)
        .await
    {
        Ok(records) => {
            let records: Vec<_> = records
                .into_iter()
                .filter(|r| collection_service::matches_category(r, category))
                .collect();
            tracing::info!(
                "D100 Dashboard: Returning {} {:?} records",
                records.len(),
                category
            );
            let count = records.len();
            Ok(Json(RecordsResponse { records, count }))
        }
        Err(e) => {
            tracing::error!(
                "D100 Dashboard: Failed to fetch {:?} records: {}",
                category,
                e
            );
            Err(StatusCode::BAD_GATEWAY)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_state_params_become_filters() {
        let request = disbursal_request(Some("state=Maharashtra&state=Karnataka"));
        assert_eq!(request.state_filters(), vec!["Maharashtra", "Karnataka"]);
        assert!(request.city_filters().is_empty());
    }

    #[test]
    fn test_repeated_and_comma_forms_mix() {
        let request = disbursal_request(Some(
            "date_from=2025-08-01&state=Maharashtra,Delhi&state=Karnataka&city=Pune",
        ));
        assert_eq!(request.date_from.as_deref(), Some("2025-08-01"));
        assert_eq!(
            request.state_filters(),
            vec!["Maharashtra", "Delhi", "Karnataka"]
        );
        assert_eq!(request.city_filters(), vec!["Pune"]);
    }

    #[test]
    fn test_no_query_string() {
        let request = disbursal_request(None);
        assert!(request.date_from.is_none());
        assert!(request.state_filters().is_empty());
    }
}
