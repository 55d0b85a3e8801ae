use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde_json::Value;

use contracts::dashboards::d100_disbursal_summary::{
    DisbursalSummaryResponse, GroupSeries, KpiAmounts, KpiCounts,
};
use contracts::dashboards::d101_collection_summary::CollectionMetrics;
use contracts::shared::date_range::ist_offset;

use crate::upstream::record::{str_field, DisbursalRecord};

/// How many labels each chart series keeps
const TOP_N: usize = 20;

/// Running totals for one grouping label (state, city or lead source)
#[derive(Debug, Clone, Copy, Default)]
struct GroupTotals {
    disbursal: f64,
    sanction: f64,
    net_disbursal: f64,
    count: u64,
}

/// Apply state/city multi-select filters to raw upstream records.
/// Shared by the summary and the drill-down record endpoints.
pub fn filter_records(records: Vec<Value>, states: &[String], cities: &[String]) -> Vec<Value> {
    records
        .into_iter()
        .filter(|r| r.is_object())
        .filter(|r| states.is_empty() || states.contains(&str_field(r, &["state"])))
        .filter(|r| cities.is_empty() || cities.contains(&str_field(r, &["city"])))
        .collect()
}

/// Build the full disbursal summary payload from raw upstream records.
///
/// The city dropdown is computed from the unfiltered set (restricted to the
/// selected states), so picking a state never empties the city options.
pub fn build_summary(
    records: Vec<Value>,
    state_filters: &[String],
    city_filters: &[String],
    collection_metrics: CollectionMetrics,
) -> DisbursalSummaryResponse {
    // Dropdown data comes from the unfiltered record set
    let mut cities_by_state: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for record in &records {
        let state = str_field(record, &["state"]);
        let city = str_field(record, &["city"]);
        if !state.is_empty() && !city.is_empty() {
            cities_by_state.entry(state).or_default().insert(city);
        }
    }

    let records = filter_records(records, state_filters, city_filters);

    let mut response = DisbursalSummaryResponse {
        records: KpiCounts {
            total: records.len() as u64,
            ..Default::default()
        },
        ..Default::default()
    };

    let mut state_data: HashMap<String, GroupTotals> = HashMap::new();
    let mut city_data: HashMap<String, GroupTotals> = HashMap::new();
    let mut source_data: HashMap<String, GroupTotals> = HashMap::new();
    let mut all_states: BTreeSet<String> = BTreeSet::new();

    let mut tenure = TenureTotals::default();

    for raw in &records {
        let Some(record) = DisbursalRecord::from_value(raw) else {
            continue;
        };

        if record.is_reloan {
            response.records.reloan += 1;
        } else {
            response.records.fresh += 1;
        }

        add_split(&mut response.loan_amount, record.is_reloan, record.loan_amount);
        add_split(
            &mut response.disbursal_amount,
            record.is_reloan,
            record.disbursal_amount,
        );
        add_split(
            &mut response.processing_fee,
            record.is_reloan,
            record.processing_fee,
        );
        add_split(
            &mut response.interest_amount,
            record.is_reloan,
            record.interest_amount,
        );
        add_split(
            &mut response.repayment_amount,
            record.is_reloan,
            record.repayment_amount,
        );
        tenure.add(record.is_reloan, record.tenure_days);

        if !record.state.is_empty() {
            all_states.insert(record.state.clone());
            add_group(&mut state_data, &record.state, &record);
        }
        if !record.city.is_empty() {
            add_group(&mut city_data, &record.city, &record);
        }
        if !record.source.is_empty() {
            add_group(&mut source_data, &record.source, &record);
        }
    }

    response.average_tenure = tenure.averages();
    response.by_state = top_series(state_data);
    response.by_city = top_series(city_data);
    response.by_source = top_series(source_data);

    // City dropdown: only cities from the selected states when filtered
    let cities: BTreeSet<String> = if state_filters.is_empty() {
        cities_by_state.values().flatten().cloned().collect()
    } else {
        state_filters
            .iter()
            .filter_map(|s| cities_by_state.get(s))
            .flatten()
            .cloned()
            .collect()
    };

    response.states = all_states.into_iter().collect();
    response.cities = cities.into_iter().collect();
    response.cities_by_state = cities_by_state
        .into_iter()
        .map(|(state, cities)| (state, cities.into_iter().collect()))
        .collect();
    response.collection_metrics = collection_metrics;
    response.last_updated = chrono::Utc::now()
        .with_timezone(&ist_offset())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    response
}

fn add_split(split: &mut KpiAmounts, is_reloan: bool, amount: f64) {
    split.total += amount;
    if is_reloan {
        split.reloan += amount;
    } else {
        split.fresh += amount;
    }
}

fn add_group(data: &mut HashMap<String, GroupTotals>, label: &str, record: &DisbursalRecord) {
    let entry = data.entry(label.to_string()).or_default();
    entry.disbursal += record.disbursal_amount;
    entry.sanction += record.loan_amount;
    // Disbursal_Amt is already net of fees; kept as its own series for the
    // chart tooltips
    entry.net_disbursal += record.disbursal_amount;
    entry.count += 1;
}

/// Sort by disbursal amount descending and keep the top N as parallel arrays
fn top_series(data: HashMap<String, GroupTotals>) -> GroupSeries {
    let mut entries: Vec<(String, GroupTotals)> = data.into_iter().collect();
    entries.sort_by(|a, b| {
        b.1.disbursal
            .partial_cmp(&a.1.disbursal)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(TOP_N);

    let mut series = GroupSeries::default();
    for (label, totals) in entries {
        series.labels.push(label);
        series.values.push(totals.disbursal);
        series.sanction.push(totals.sanction);
        series.net_disbursal.push(totals.net_disbursal);
        series.counts.push(totals.count);
    }
    series
}

/// Tenure sums split fresh/reloan; only records with tenure > 0 count
/// towards the averages.
#[derive(Debug, Default)]
struct TenureTotals {
    total_sum: f64,
    total_count: u64,
    fresh_sum: f64,
    fresh_count: u64,
    reloan_sum: f64,
    reloan_count: u64,
}

impl TenureTotals {
    fn add(&mut self, is_reloan: bool, tenure_days: f64) {
        if tenure_days <= 0.0 {
            return;
        }
        self.total_sum += tenure_days;
        self.total_count += 1;
        if is_reloan {
            self.reloan_sum += tenure_days;
            self.reloan_count += 1;
        } else {
            self.fresh_sum += tenure_days;
            self.fresh_count += 1;
        }
    }

    fn averages(&self) -> KpiAmounts {
        KpiAmounts {
            total: round1(self.total_sum, self.total_count),
            fresh: round1(self.fresh_sum, self.fresh_count),
            reloan: round1(self.reloan_sum, self.reloan_count),
        }
    }
}

fn round1(sum: f64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        (sum / count as f64 * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_records() -> Vec<Value> {
        vec![
            json!({
                "loan_amount": 50000, "Disbursal_Amt": 45000, "processing_fee": 2500,
                "interest_amount": 7500, "repayment_amount": 57500, "tenure": 90,
                "state": "Maharashtra", "city": "Pune", "source": "Organic",
                "is_reloan_case": false
            }),
            json!({
                "loan_amount": 30000, "Disbursal_Amt": 27000, "processing_fee": 1500,
                "interest_amount": 4500, "repayment_amount": 34500, "tenure": 60,
                "state": "Maharashtra", "city": "Mumbai Suburban", "source": "Referral",
                "is_reloan_case": true
            }),
            json!({
                "loan_amount": 20000, "Disbursal_Amt": 18000, "processing_fee": 1000,
                "interest_amount": 3000, "repayment_amount": 23000, "tenure": 0,
                "state": "Karnataka", "city": "Bengaluru Urban", "source": "Organic",
                "is_reloan_case": true
            }),
        ]
    }

    #[test]
    fn test_kpi_splits() {
        let summary = build_summary(sample_records(), &[], &[], CollectionMetrics::default());

        assert_eq!(summary.records.total, 3);
        assert_eq!(summary.records.fresh, 1);
        assert_eq!(summary.records.reloan, 2);

        assert_eq!(summary.loan_amount.total, 100000.0);
        assert_eq!(summary.loan_amount.fresh, 50000.0);
        assert_eq!(summary.loan_amount.reloan, 50000.0);

        assert_eq!(summary.disbursal_amount.total, 90000.0);
        assert_eq!(summary.repayment_amount.total, 115000.0);
    }

    #[test]
    fn test_average_tenure_skips_zero() {
        let summary = build_summary(sample_records(), &[], &[], CollectionMetrics::default());
        // Record 3 has tenure 0 and is excluded: (90 + 60) / 2
        assert_eq!(summary.average_tenure.total, 75.0);
        assert_eq!(summary.average_tenure.fresh, 90.0);
        assert_eq!(summary.average_tenure.reloan, 60.0);
    }

    #[test]
    fn test_group_series_sorted_by_disbursal() {
        let summary = build_summary(sample_records(), &[], &[], CollectionMetrics::default());
        assert_eq!(summary.by_state.labels, vec!["Maharashtra", "Karnataka"]);
        assert_eq!(summary.by_state.values, vec![72000.0, 18000.0]);
        assert_eq!(summary.by_state.sanction, vec![80000.0, 20000.0]);
        assert_eq!(summary.by_state.counts, vec![2, 1]);

        assert_eq!(summary.by_source.labels, vec!["Organic", "Referral"]);
    }

    #[test]
    fn test_state_filter_applies_after_dropdown_collection() {
        let summary = build_summary(
            sample_records(),
            &["Karnataka".to_string()],
            &[],
            CollectionMetrics::default(),
        );

        assert_eq!(summary.records.total, 1);
        assert_eq!(summary.states, vec!["Karnataka"]);
        // City dropdown restricted to the selected state
        assert_eq!(summary.cities, vec!["Bengaluru Urban"]);
        // But the full state->city map is still available
        assert!(summary.cities_by_state.contains_key("Maharashtra"));
    }

    #[test]
    fn test_city_filter() {
        let filtered = filter_records(sample_records(), &[], &["Pune".to_string()]);
        assert_eq!(filtered.len(), 1);
        assert_eq!(str_field(&filtered[0], &["city"]), "Pune");
    }

    #[test]
    fn test_non_object_records_dropped_by_filter() {
        let mut records = sample_records();
        records.push(json!("garbage"));
        let filtered = filter_records(records, &[], &[]);
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_empty_records() {
        let summary = build_summary(Vec::new(), &[], &[], CollectionMetrics::default());
        assert_eq!(summary.records.total, 0);
        assert_eq!(summary.average_tenure.total, 0.0);
        assert!(summary.by_state.labels.is_empty());
        assert!(summary.states.is_empty());
    }
}
