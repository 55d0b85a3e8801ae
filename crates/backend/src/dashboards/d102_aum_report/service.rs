use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde_json::Value;

use contracts::dashboards::d100_disbursal_summary::{KpiAmounts, KpiCounts};
use contracts::dashboards::d102_aum_report::{AumGroupRow, AumReportResponse};
use contracts::shared::date_range::ist_offset;

use crate::dashboards::d101_collection_summary::service::bin_dpd;
use crate::upstream::record::{bool_field, num_field, str_field};

/// Top states kept in the breakdown
const TOP_N: usize = 20;

/// Keys carrying a loan's outstanding principal in the AUM snapshot
const OUTSTANDING_KEYS: [&str; 6] = [
    "principal_outstanding",
    "outstanding_amount",
    "outstanding",
    "pos",
    "aum_amount",
    "aum",
];

/// Keys carrying the loan's disbursal date, for the month series
const DISBURSAL_DATE_KEYS: [&str; 4] = ["disbursal_date", "disbursed_on", "disbursal_dt", "date"];

/// Build the AUM report from snapshot records.
pub fn build_report(
    records: Vec<Value>,
    as_of: NaiveDate,
    state_filters: &[String],
) -> AumReportResponse {
    let records: Vec<Value> = records
        .into_iter()
        .filter(|r| r.is_object())
        .filter(|r| state_filters.is_empty() || state_filters.contains(&str_field(r, &["state"])))
        .collect();

    let mut loans = KpiCounts {
        total: records.len() as u64,
        ..Default::default()
    };
    let mut outstanding = KpiAmounts::default();
    let mut state_totals: HashMap<String, (f64, u64)> = HashMap::new();
    let mut month_totals: BTreeMap<String, (f64, u64)> = BTreeMap::new();

    for record in &records {
        let amount = num_field(record, &OUTSTANDING_KEYS);
        let is_reloan = bool_field(record, &["is_reloan_case"]);

        outstanding.total += amount;
        if is_reloan {
            loans.reloan += 1;
            outstanding.reloan += amount;
        } else {
            loans.fresh += 1;
            outstanding.fresh += amount;
        }

        let state = str_field(record, &["state"]);
        if !state.is_empty() {
            let entry = state_totals.entry(state).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;
        }

        if let Some(month) = disbursal_month(record) {
            let entry = month_totals.entry(month).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;
        }
    }

    // State breakdown: outstanding descending, top N
    let mut by_state: Vec<AumGroupRow> = state_totals
        .into_iter()
        .map(|(label, (outstanding, count))| AumGroupRow {
            label,
            outstanding,
            count,
        })
        .collect();
    by_state.sort_by(|a, b| {
        b.outstanding
            .partial_cmp(&a.outstanding)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    by_state.truncate(TOP_N);

    // Month series stays in chronological order (BTreeMap on "YYYY-MM")
    let by_month: Vec<AumGroupRow> = month_totals
        .into_iter()
        .map(|(label, (outstanding, count))| AumGroupRow {
            label,
            outstanding,
            count,
        })
        .collect();

    AumReportResponse {
        as_of: as_of.format("%Y-%m-%d").to_string(),
        loans,
        outstanding,
        dpd_buckets: bin_dpd_outstanding(&records),
        by_state,
        by_month,
        last_updated: chrono::Utc::now()
            .with_timezone(&ist_offset())
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

/// DPD composition of the book. Reuses the d101 binning but with the
/// outstanding-amount keys instead of the collection-amount keys.
fn bin_dpd_outstanding(
    records: &[Value],
) -> Vec<contracts::dashboards::d101_collection_summary::DpdBucketRow> {
    // Rewrite each record's amount under the key d101 bins on, leaving
    // the DPD keys untouched
    let reshaped: Vec<Value> = records
        .iter()
        .map(|r| {
            let days = num_field(r, &["dpd", "days_past_due", "dpd_days", "overdue_days"]);
            serde_json::json!({
                "dpd": days,
                "amount": num_field(r, &OUTSTANDING_KEYS),
            })
        })
        .collect();
    bin_dpd(&reshaped)
}

/// "YYYY-MM" from the record's disbursal date, tolerant of datetime strings
fn disbursal_month(record: &Value) -> Option<String> {
    let raw = str_field(record, &DISBURSAL_DATE_KEYS);
    let prefix = raw.get(..7)?;
    // YYYY-MM with numeric components
    let (year, month) = prefix.split_once('-')?;
    if year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && month.len() == 2
        && month.chars().all(|c| c.is_ascii_digit())
    {
        Some(prefix.to_string())
    } else {
        None
    }
}
