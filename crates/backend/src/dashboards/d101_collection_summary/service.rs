use std::collections::BTreeMap;

use serde_json::Value;

use contracts::dashboards::d101_collection_summary::{
    CollectionMetrics, CollectionSummaryResponse, DpdBucket, DpdBucketRow,
};
use contracts::shared::date_range::ist_offset;

use crate::upstream::record::{num_field, str_field};
use crate::upstream::{envelope, reconcile};

/// Keys the upstream uses for a record's days-past-due value
const DPD_KEYS: [&str; 4] = ["dpd", "days_past_due", "dpd_days", "overdue_days"];

/// Keys for the collected/collectible amount on a collection record
const AMOUNT_KEYS: [&str; 4] = [
    "collection_amount",
    "collected_amount",
    "repayment_amount",
    "amount",
];

/// Keys naming a collection record's category (prepayment/on-time/overdue)
const CATEGORY_KEYS: [&str; 4] = ["collection_type", "payment_type", "type", "category"];

/// Drill-down categories for the collection record tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionCategory {
    Prepayment,
    OnTime,
    Overdue,
}

/// Reconcile a raw collection-metrics payload into canonical metrics.
/// Any failure shape yields zeroed metrics, never an error.
pub fn reconcile_metrics(payload: Value) -> CollectionMetrics {
    let rows = envelope::extract_metric_rows(payload);
    if rows.is_empty() {
        return CollectionMetrics::default();
    }
    tracing::info!("Aggregating {} collection metric rows", rows.len());
    reconcile::aggregate_rows(&rows)
}

/// Build the collection summary page: canonical metrics plus a DPD aging
/// table binned from the raw collection records.
pub fn build_summary(metrics_payload: Value, records: &[Value]) -> CollectionSummaryResponse {
    CollectionSummaryResponse {
        metrics: reconcile_metrics(metrics_payload),
        dpd_buckets: bin_dpd(records),
        last_updated: chrono::Utc::now()
            .with_timezone(&ist_offset())
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
    }
}

/// Bin records into DPD aging buckets with per-bucket amount and count.
/// Every bucket is present in the output, empty ones included, so the
/// aging table always shows the full ladder.
pub fn bin_dpd(records: &[Value]) -> Vec<DpdBucketRow> {
    let mut bins: BTreeMap<DpdBucket, (f64, u64)> =
        DpdBucket::ALL.iter().map(|b| (*b, (0.0, 0))).collect();

    for record in records {
        if !record.is_object() {
            continue;
        }
        let days = num_field(record, &DPD_KEYS) as i64;
        let amount = num_field(record, &AMOUNT_KEYS);
        let entry = bins
            .get_mut(&DpdBucket::from_days(days))
            .expect("all buckets pre-seeded");
        entry.0 += amount;
        entry.1 += 1;
    }

    bins.into_iter()
        .map(|(bucket, (amount, count))| DpdBucketRow {
            bucket,
            label: bucket.label().to_string(),
            amount,
            count,
        })
        .collect()
}

/// Does a record belong to the given drill-down category?
/// The category field naming is as unstable as everything else upstream,
/// with the same overdue/on-time ambiguity as the metric keys.
pub fn matches_category(record: &Value, category: CollectionCategory) -> bool {
    let value = str_field(record, &CATEGORY_KEYS).to_lowercase();
    if value.is_empty() {
        return false;
    }
    let on_time = value.contains("on_time")
        || value.contains("ontime")
        || value.contains("on time")
        || value.contains("due_date")
        || value.contains("duedate")
        || value.contains("due date");
    match category {
        CollectionCategory::Prepayment => value.contains("prepay"),
        CollectionCategory::OnTime => on_time && !value.contains("overdue"),
        CollectionCategory::Overdue => value.contains("overdue") && !on_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reconcile_metrics_nested_rows() {
        let metrics = reconcile_metrics(json!({
            "success": true,
            "data": [
                {"total_collection_amount": 100.0, "overdueAmount": 40.0},
                {"total_collection_amount": 50.0, "onTimeCollection": 30.0}
            ]
        }));
        assert_eq!(metrics.total_collection_amount, 150.0);
        assert_eq!(metrics.overdue_amount, 40.0);
        assert_eq!(metrics.due_date_amount, 30.0);
    }

    #[test]
    fn test_reconcile_metrics_error_payload_is_zeroed() {
        let metrics = reconcile_metrics(json!({"message": "not authorised"}));
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_bin_dpd() {
        let records = vec![
            json!({"dpd": 0, "collection_amount": 100.0}),
            json!({"days_past_due": 15, "amount": 200.0}),
            json!({"dpd": 45, "collection_amount": 300.0}),
            json!({"dpd": 200, "collection_amount": 400.0}),
        ];
        let rows = bin_dpd(&records);
        assert_eq!(rows.len(), DpdBucket::ALL.len());

        let by_bucket = |b: DpdBucket| rows.iter().find(|r| r.bucket == b).unwrap();
        assert_eq!(by_bucket(DpdBucket::Current).amount, 100.0);
        assert_eq!(by_bucket(DpdBucket::Dpd1To30).amount, 200.0);
        assert_eq!(by_bucket(DpdBucket::Dpd31To60).amount, 300.0);
        assert_eq!(by_bucket(DpdBucket::Dpd180Plus).amount, 400.0);
        assert_eq!(by_bucket(DpdBucket::Dpd61To90).count, 0);
    }

    #[test]
    fn test_matches_category() {
        let prepay = json!({"collection_type": "Prepayment"});
        let on_time = json!({"payment_type": "on_time_collection"});
        let due_date = json!({"type": "Due Date"});
        let overdue = json!({"collection_type": "OVERDUE"});
        let unknown = json!({"something_else": 1});

        assert!(matches_category(&prepay, CollectionCategory::Prepayment));
        assert!(!matches_category(&prepay, CollectionCategory::Overdue));

        assert!(matches_category(&on_time, CollectionCategory::OnTime));
        assert!(matches_category(&due_date, CollectionCategory::OnTime));
        assert!(!matches_category(&on_time, CollectionCategory::Overdue));

        assert!(matches_category(&overdue, CollectionCategory::Overdue));
        assert!(!matches_category(&overdue, CollectionCategory::OnTime));

        assert!(!matches_category(&unknown, CollectionCategory::Prepayment));
        assert!(!matches_category(&unknown, CollectionCategory::OnTime));
        assert!(!matches_category(&unknown, CollectionCategory::Overdue));
    }
}
