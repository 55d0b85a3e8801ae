use serde::{Deserialize, Serialize};

/// Query parameters for the collection summary dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummaryRequest {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Canonical collection metrics after reconciling the upstream's
/// inconsistent field naming. Amounts are rupees, counts are loans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionMetrics {
    pub total_collection_amount: f64,
    pub fresh_collection_amount: f64,
    pub reloan_collection_amount: f64,
    pub prepayment_amount: f64,
    /// Collected on the due date (the upstream also calls this "on time")
    pub due_date_amount: f64,
    pub overdue_amount: f64,

    pub total_collection_count: i64,
    pub fresh_collection_count: i64,
    pub reloan_collection_count: i64,
    pub prepayment_count: i64,
    pub due_date_count: i64,
    pub overdue_count: i64,
}

impl CollectionMetrics {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Delinquency aging bucket (Days Past Due)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DpdBucket {
    Current,
    Dpd1To30,
    Dpd31To60,
    Dpd61To90,
    Dpd91To180,
    Dpd180Plus,
}

impl DpdBucket {
    pub const ALL: [DpdBucket; 6] = [
        DpdBucket::Current,
        DpdBucket::Dpd1To30,
        DpdBucket::Dpd31To60,
        DpdBucket::Dpd61To90,
        DpdBucket::Dpd91To180,
        DpdBucket::Dpd180Plus,
    ];

    /// Bin a DPD day count into its aging bucket
    pub fn from_days(days: i64) -> Self {
        match days {
            d if d <= 0 => DpdBucket::Current,
            1..=30 => DpdBucket::Dpd1To30,
            31..=60 => DpdBucket::Dpd31To60,
            61..=90 => DpdBucket::Dpd61To90,
            91..=180 => DpdBucket::Dpd91To180,
            _ => DpdBucket::Dpd180Plus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DpdBucket::Current => "Current",
            DpdBucket::Dpd1To30 => "1-30 DPD",
            DpdBucket::Dpd31To60 => "31-60 DPD",
            DpdBucket::Dpd61To90 => "61-90 DPD",
            DpdBucket::Dpd91To180 => "91-180 DPD",
            DpdBucket::Dpd180Plus => "180+ DPD",
        }
    }
}

/// One row of the DPD aging table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DpdBucketRow {
    pub bucket: DpdBucket,
    pub label: String,
    pub amount: f64,
    pub count: u64,
}

/// Full payload for the collection summary page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummaryResponse {
    pub metrics: CollectionMetrics,
    pub dpd_buckets: Vec<DpdBucketRow>,
    pub last_updated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dpd_bucket_boundaries() {
        assert_eq!(DpdBucket::from_days(0), DpdBucket::Current);
        assert_eq!(DpdBucket::from_days(-5), DpdBucket::Current);
        assert_eq!(DpdBucket::from_days(1), DpdBucket::Dpd1To30);
        assert_eq!(DpdBucket::from_days(30), DpdBucket::Dpd1To30);
        assert_eq!(DpdBucket::from_days(31), DpdBucket::Dpd31To60);
        assert_eq!(DpdBucket::from_days(60), DpdBucket::Dpd31To60);
        assert_eq!(DpdBucket::from_days(90), DpdBucket::Dpd61To90);
        assert_eq!(DpdBucket::from_days(91), DpdBucket::Dpd91To180);
        assert_eq!(DpdBucket::from_days(180), DpdBucket::Dpd91To180);
        assert_eq!(DpdBucket::from_days(181), DpdBucket::Dpd180Plus);
    }
}
