use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::dashboards::d101_collection_summary::CollectionMetrics;

/// Query for the disbursal summary dashboard.
/// `state` and `city` accept comma-separated lists (multi-select filters).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisbursalSummaryRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl DisbursalSummaryRequest {
    /// Split a comma-separated filter value, dropping empties
    pub fn split_filter(raw: &Option<String>) -> Vec<String> {
        raw.as_deref()
            .map(|s| {
                s.split(',')
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn state_filters(&self) -> Vec<String> {
        Self::split_filter(&self.state)
    }

    pub fn city_filters(&self) -> Vec<String> {
        Self::split_filter(&self.city)
    }
}

/// Record count split by fresh/reloan classification
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KpiCounts {
    pub total: u64,
    pub fresh: u64,
    pub reloan: u64,
}

/// Monetary KPI split by fresh/reloan classification
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct KpiAmounts {
    pub total: f64,
    pub fresh: f64,
    pub reloan: f64,
}

/// Top-N chart series for one grouping dimension (state, city, lead source).
/// Parallel arrays, sorted by disbursal amount descending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupSeries {
    pub labels: Vec<String>,
    /// Disbursal amount per label (drives bar size)
    pub values: Vec<f64>,
    /// Sanctioned (loan) amount per label
    pub sanction: Vec<f64>,
    /// Net disbursal amount per label
    pub net_disbursal: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Full payload for the disbursal summary page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisbursalSummaryResponse {
    pub records: KpiCounts,
    pub loan_amount: KpiAmounts,
    pub disbursal_amount: KpiAmounts,
    pub processing_fee: KpiAmounts,
    pub interest_amount: KpiAmounts,
    pub repayment_amount: KpiAmounts,
    /// Average tenure in days, one decimal place, zero when no tenure data
    pub average_tenure: KpiAmounts,

    pub by_state: GroupSeries,
    pub by_city: GroupSeries,
    pub by_source: GroupSeries,

    /// All states present in the (unfiltered) record set, sorted
    pub states: Vec<String>,
    /// Cities for the city dropdown, restricted to selected states when filtered
    pub cities: Vec<String>,
    /// State -> sorted cities map for dynamic dropdown filtering
    pub cities_by_state: BTreeMap<String, Vec<String>>,

    pub collection_metrics: CollectionMetrics,
    pub last_updated: String,
}
