use axum::{extract::RawQuery, http::StatusCode, Json};
use chrono::NaiveDate;
use contracts::dashboards::d100_disbursal_summary::DisbursalSummaryRequest;
use contracts::dashboards::d102_aum_report::{AumReportRequest, AumReportResponse};
use contracts::shared::date_range::{today_ist, DateRange};

use crate::dashboards::d102_aum_report::service;
use crate::shared::query::QueryPairs;
use crate::system::auth::extractor::CurrentSession;
use crate::upstream::client;

/// `state` may repeat or carry a comma-separated list, same as the
/// disbursal endpoints.
fn aum_request(raw: Option<&str>) -> AumReportRequest {
    let pairs = QueryPairs::parse(raw);
    AumReportRequest {
        as_of: pairs.last("as_of"),
        state: pairs.joined("state"),
    }
}

/// GET /api/d102/aum-report?as_of=2025-08-29&state=Maharashtra
pub async fn get_aum_report(
    CurrentSession(session): CurrentSession,
    RawQuery(raw): RawQuery,
) -> Result<Json<AumReportResponse>, StatusCode> {
    let request = aum_request(raw.as_deref());
    let as_of = request
        .as_of
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .unwrap_or_else(today_ist);
    tracing::info!("D102 Dashboard: Getting AUM report as of {}", as_of);

    // The snapshot endpoint keys everything off a single date
    let range = DateRange::new(as_of, as_of);
    let token = Some(session.upstream_token.as_str());

    let records = match client::get_client().fetch_aum_snapshot(token, &range).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("D102 Dashboard: Failed to fetch AUM snapshot: {}", e);
            return Err(StatusCode::BAD_GATEWAY);
        }
    };

    let state_filters = DisbursalSummaryRequest::split_filter(&request.state);
    let response = service::build_report(records, as_of, &state_filters);

    tracing::info!(
        "D102 Dashboard: Returning {} loans across {} states",
        response.loans.total,
        response.by_state.len()
    );
    Ok(Json(response))
}
