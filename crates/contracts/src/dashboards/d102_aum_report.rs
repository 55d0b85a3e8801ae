use serde::{Deserialize, Serialize};

use crate::dashboards::d100_disbursal_summary::{KpiAmounts, KpiCounts};
use crate::dashboards::d101_collection_summary::DpdBucketRow;

/// Query for the AUM report. `as_of` is `YYYY-MM-DD`, defaults to today (IST).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AumReportRequest {
    pub as_of: Option<String>,
    pub state: Option<String>,
}

/// Outstanding book value aggregated per grouping label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AumGroupRow {
    pub label: String,
    pub outstanding: f64,
    pub count: u64,
}

/// Full payload for the AUM report page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AumReportResponse {
    pub as_of: String,
    /// Loan count in the book, split fresh/reloan
    pub loans: KpiCounts,
    /// Outstanding principal, split fresh/reloan
    pub outstanding: KpiAmounts,
    /// Book composition by delinquency bucket
    pub dpd_buckets: Vec<DpdBucketRow>,
    /// Top states by outstanding, descending
    pub by_state: Vec<AumGroupRow>,
    /// Outstanding per disbursal month ("YYYY-MM"), ascending
    pub by_month: Vec<AumGroupRow>,
    pub last_updated: String,
}
