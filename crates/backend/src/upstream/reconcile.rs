//! Field-name reconciliation for the collection metrics endpoint.
//!
//! The upstream has shipped the same metric under snake_case, camelCase and
//! several shortened spellings, and the set changes between deployments.
//! Each canonical field therefore carries an ordered list of known variants,
//! plus a last-resort substring scan for the on-time/overdue families.
//! Overdue fields are matched before due-date fields so the two families,
//! whose names overlap as substrings, can never capture each other's keys.

use serde_json::Value;

use contracts::dashboards::d101_collection_summary::CollectionMetrics;

use super::record::parse_number;

/// Which substring family a canonical field belongs to. The overdue and
/// due-date (on-time) families need cross-match guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Overdue,
    DueDate,
    Plain,
}

struct FieldSpec {
    is_count: bool,
    family: Family,
    /// Known upstream spellings, most specific first
    variants: &'static [&'static str],
    apply: fn(&mut CollectionMetrics, f64),
}

/// Canonical fields in match order: overdue before due-date, amounts and
/// counts interleaved the way the families require.
static FIELD_ORDER: &[FieldSpec] = &[
    FieldSpec {
        is_count: false,
        family: Family::Overdue,
        variants: &[
            "overdue_amount",
            "overdueAmount",
            "overdue_collection",
            "overdueCollection",
            "overdue_collection_amount",
            "overdueCollectionAmount",
        ],
        apply: |m, v| m.overdue_amount += v,
    },
    FieldSpec {
        is_count: true,
        family: Family::Overdue,
        variants: &["overdue_count", "overdueCount", "overdue"],
        apply: |m, v| m.overdue_count += v as i64,
    },
    FieldSpec {
        is_count: false,
        family: Family::DueDate,
        variants: &[
            "due_date_amount",
            "dueDateAmount",
            "on_time_collection",
            "onTimeCollection",
            "on_time_amount",
            "onTimeAmount",
            "ontime_amount",
            "ontimeAmount",
            "onTime_amount",
            "on_time_collection_amount",
            "onTimeCollectionAmount",
            "due_date_collection",
            "dueDateCollection",
            "on_time_amount_collection",
            "onTimeAmountCollection",
        ],
        apply: |m, v| m.due_date_amount += v,
    },
    FieldSpec {
        is_count: true,
        family: Family::DueDate,
        variants: &[
            "due_date_count",
            "dueDateCount",
            "on_time_count",
            "onTimeCount",
            "onTime",
            "ontime",
            "ontime_count",
            "onTime_count",
            "on_time_collection_count",
            "onTimeCollectionCount",
            "due_date_collection_count",
            "dueDateCollectionCount",
        ],
        apply: |m, v| m.due_date_count += v as i64,
    },
    FieldSpec {
        is_count: false,
        family: Family::Plain,
        variants: &[
            "total_collection_amount",
            "totalCollectionAmount",
            "total_amount",
            "collection_amount",
            "total",
        ],
        apply: |m, v| m.total_collection_amount += v,
    },
    FieldSpec {
        is_count: false,
        family: Family::Plain,
        variants: &[
            "fresh_collection_amount",
            "freshCollectionAmount",
            "fresh_amount",
            "fresh",
        ],
        apply: |m, v| m.fresh_collection_amount += v,
    },
    FieldSpec {
        is_count: false,
        family: Family::Plain,
        variants: &[
            "reloan_collection_amount",
            "reloanCollectionAmount",
            "reloan_amount",
            "reloan",
        ],
        apply: |m, v| m.reloan_collection_amount += v,
    },
    FieldSpec {
        is_count: false,
        family: Family::Plain,
        variants: &["prepayment_amount", "prepaymentAmount", "prepayment"],
        apply: |m, v| m.prepayment_amount += v,
    },
    FieldSpec {
        is_count: true,
        family: Family::Plain,
        variants: &[
            "total_collection_count",
            "totalCollectionCount",
            "total_count",
            "totalCount",
            "total",
        ],
        apply: |m, v| m.total_collection_count += v as i64,
    },
    FieldSpec {
        is_count: true,
        family: Family::Plain,
        variants: &[
            "fresh_collection_count",
            "freshCollectionCount",
            "fresh_count",
            "freshCount",
            "fresh",
        ],
        apply: |m, v| m.fresh_collection_count += v as i64,
    },
    FieldSpec {
        is_count: true,
        family: Family::Plain,
        variants: &[
            "reloan_collection_count",
            "reloanCollectionCount",
            "reloan_count",
            "reloanCount",
            "reloan",
        ],
        apply: |m, v| m.reloan_collection_count += v as i64,
    },
    FieldSpec {
        is_count: true,
        family: Family::Plain,
        variants: &["prepayment_count", "prepaymentCount", "prepayment"],
        apply: |m, v| m.prepayment_count += v as i64,
    },
];

fn is_due_date_key(key_lower: &str) -> bool {
    key_lower.contains("on_time")
        || key_lower.contains("ontime")
        || key_lower.contains("due_date")
        || key_lower.contains("duedate")
}

/// Sum collection metrics across all rows of the upstream payload.
pub fn aggregate_rows(rows: &[Value]) -> CollectionMetrics {
    let mut metrics = CollectionMetrics::default();
    for row in rows {
        if let Some(obj) = row.as_object() {
            apply_row(&mut metrics, obj);
        }
    }
    metrics
}

fn apply_row(metrics: &mut CollectionMetrics, row: &serde_json::Map<String, Value>) {
    // Case-insensitive key lookup for the second rung of the ladder
    let keys_lower: Vec<(String, &String)> =
        row.keys().map(|k| (k.to_lowercase(), k)).collect();

    for field in FIELD_ORDER {
        let mut found = false;

        for variation in field.variants {
            // Exact match first; the variant names themselves are unambiguous
            if let Some(value) = row.get(*variation) {
                if let Some(n) = parse_number(value) {
                    (field.apply)(metrics, n);
                    found = true;
                    break;
                }
                continue;
            }

            // Case-insensitive match, guarded so the overdue and on-time
            // families never take each other's keys
            let variation_lower = variation.to_lowercase();
            let Some((_, actual_key)) =
                keys_lower.iter().find(|(lower, _)| *lower == variation_lower)
            else {
                continue;
            };
            let key_lower = actual_key.to_lowercase();

            match field.family {
                Family::Overdue if is_due_date_key(&key_lower) => continue,
                Family::DueDate if key_lower.contains("overdue") => continue,
                _ => {}
            }

            if let Some(n) = row.get(*actual_key).and_then(parse_number) {
                (field.apply)(metrics, n);
                found = true;
                break;
            }
        }

        if found {
            continue;
        }

        // Last resort: substring scan, only for the two ambiguous families.
        // A count field additionally requires count/number in the key, an
        // amount field requires amount/amt/value.
        let family_match: fn(&str) -> bool = match field.family {
            Family::DueDate => |key| is_due_date_key(key) && !key.contains("overdue"),
            Family::Overdue => |key| key.contains("overdue") && !is_due_date_key(key),
            Family::Plain => continue,
        };

        for (key, value) in row {
            let key_lower = key.to_lowercase();
            if !family_match(&key_lower) {
                continue;
            }
            let Some(n) = parse_number(value) else {
                continue;
            };
            if field.is_count && (key_lower.contains("count") || key_lower.contains("number")) {
                (field.apply)(metrics, n);
                break;
            }
            if !field.is_count
                && (key_lower.contains("amount")
                    || key_lower.contains("amt")
                    || key_lower.contains("value"))
            {
                (field.apply)(metrics, n);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_names_pass_through() {
        let metrics = aggregate_rows(&[json!({
            "total_collection_amount": 1000.0,
            "fresh_collection_amount": 400.0,
            "reloan_collection_amount": 600.0,
            "prepayment_amount": 50.0,
            "due_date_amount": 700.0,
            "overdue_amount": 250.0,
            "total_collection_count": 10,
            "fresh_collection_count": 4,
            "reloan_collection_count": 6,
            "prepayment_count": 1,
            "due_date_count": 7,
            "overdue_count": 2
        })]);

        assert_eq!(metrics.total_collection_amount, 1000.0);
        assert_eq!(metrics.fresh_collection_amount, 400.0);
        assert_eq!(metrics.reloan_collection_amount, 600.0);
        assert_eq!(metrics.due_date_amount, 700.0);
        assert_eq!(metrics.overdue_amount, 250.0);
        assert_eq!(metrics.total_collection_count, 10);
        assert_eq!(metrics.overdue_count, 2);
    }

    #[test]
    fn test_camel_case_variants() {
        let metrics = aggregate_rows(&[json!({
            "totalCollectionAmount": 500.0,
            "onTimeCollection": 300.0,
            "overdueCollection": 200.0,
            "totalCollectionCount": 5,
            "onTimeCount": 3,
            "overdueCount": 2
        })]);

        assert_eq!(metrics.total_collection_amount, 500.0);
        assert_eq!(metrics.due_date_amount, 300.0);
        assert_eq!(metrics.overdue_amount, 200.0);
        assert_eq!(metrics.due_date_count, 3);
        assert_eq!(metrics.overdue_count, 2);
    }

    #[test]
    fn test_rows_are_summed() {
        let row = json!({"total_collection_amount": 100.0, "total_collection_count": 1});
        let metrics = aggregate_rows(&[row.clone(), row.clone(), row]);
        assert_eq!(metrics.total_collection_amount, 300.0);
        assert_eq!(metrics.total_collection_count, 3);
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let metrics = aggregate_rows(&[json!({
            "total_collection_amount": "1234.56",
            "overdue_count": "7"
        })]);
        assert_eq!(metrics.total_collection_amount, 1234.56);
        assert_eq!(metrics.overdue_count, 7);
    }

    #[test]
    fn test_overdue_never_matches_on_time_keys() {
        // Only on-time style keys present: overdue must stay zero
        let metrics = aggregate_rows(&[json!({
            "on_time_collection_amount": 900.0,
            "on_time_collection_count": 9
        })]);
        assert_eq!(metrics.due_date_amount, 900.0);
        assert_eq!(metrics.due_date_count, 9);
        assert_eq!(metrics.overdue_amount, 0.0);
        assert_eq!(metrics.overdue_count, 0);
    }

    #[test]
    fn test_due_date_never_matches_overdue_keys() {
        let metrics = aggregate_rows(&[json!({
            "overdue_collection_amount": 150.0,
            "overdue_loan_count": 3
        })]);
        assert_eq!(metrics.overdue_amount, 150.0);
        assert_eq!(metrics.overdue_count, 3);
        assert_eq!(metrics.due_date_amount, 0.0);
        assert_eq!(metrics.due_date_count, 0);
    }

    #[test]
    fn test_partial_match_requires_amount_or_count_marker() {
        // "dueDatePercentage" has the family substring but neither an
        // amount nor a count marker, so nothing is picked up
        let metrics = aggregate_rows(&[json!({"dueDatePercentage": 85.0})]);
        assert_eq!(metrics.due_date_amount, 0.0);
        assert_eq!(metrics.due_date_count, 0);
    }

    #[test]
    fn test_partial_match_unlisted_spelling() {
        // Spelling not in any variant list, resolved by the substring scan
        let metrics = aggregate_rows(&[json!({
            "on_time_total_amt": 420.0,
            "on_time_loan_number": 4
        })]);
        assert_eq!(metrics.due_date_amount, 420.0);
        assert_eq!(metrics.due_date_count, 4);
    }

    #[test]
    fn test_value_counted_once_per_field() {
        // Both a canonical and a camel spelling present: first variant wins,
        // the other spelling is not double counted
        let metrics = aggregate_rows(&[json!({
            "overdue_amount": 100.0,
            "overdueAmount": 100.0
        })]);
        assert_eq!(metrics.overdue_amount, 100.0);
    }

    #[test]
    fn test_unparseable_values_skipped() {
        let metrics = aggregate_rows(&[json!({
            "total_collection_amount": "n/a",
            "overdue_amount": null
        })]);
        assert_eq!(metrics.total_collection_amount, 0.0);
        assert_eq!(metrics.overdue_amount, 0.0);
    }

    #[test]
    fn test_counts_truncate_fractions() {
        let metrics = aggregate_rows(&[json!({"overdue_count": "2.9"})]);
        assert_eq!(metrics.overdue_count, 2);
    }

    #[test]
    fn test_non_object_rows_ignored() {
        let metrics = aggregate_rows(&[json!(42), json!("x"), json!(null)]);
        assert!(metrics.is_empty());
    }
}
