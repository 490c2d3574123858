//! Join-filter engine for the purchase and expense reports
//!
//! A record is kept iff every active filter accepts it. The engine never
//! fails: missing or malformed fields simply fail to match, and the one
//! deliberate exception is the date axis, where an undated record is always
//! considered in range.

use chrono::NaiveDate;

use crate::filters::FilterState;
use crate::lookup::LookupCache;
use crate::models::{parse_day, ExpenseRecord, PurchaseRecord};

/// Filter purchases against the current filter state.
///
/// With no active filter this is the identity: every record is returned in
/// fetch order.
pub fn apply(
    records: &[PurchaseRecord],
    filter: &FilterState,
    cache: &LookupCache,
) -> Vec<PurchaseRecord> {
    if filter.is_empty() {
        return records.to_vec();
    }

    let filtered: Vec<PurchaseRecord> = records
        .iter()
        .filter(|r| matches_purchase(r, filter, cache))
        .cloned()
        .collect();

    tracing::debug!(
        kept = filtered.len(),
        total = records.len(),
        "purchase filter applied"
    );
    filtered
}

/// Filter expenses; only the date axis applies to them
pub fn apply_expenses(records: &[ExpenseRecord], filter: &FilterState) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| in_date_range(r.date(), filter.date_from, filter.date_to))
        .cloned()
        .collect()
}

fn matches_purchase(record: &PurchaseRecord, filter: &FilterState, cache: &LookupCache) -> bool {
    matches_category(record, filter, cache)
        && matches_supplier(record, filter, cache)
        && matches_product(record, filter)
        && in_date_range(record.date(), filter.date_from, filter.date_to)
}

fn matches_category(record: &PurchaseRecord, filter: &FilterState, cache: &LookupCache) -> bool {
    let Some(category) = filter.category_id.as_deref() else {
        return true;
    };

    cache
        .resolve_supplier(record.supplier_id.as_ref(), record.supplier_label())
        .is_some_and(|s| s.category.trim() == category)
}

/// Matches by id, or by the name the cache resolves for the selected id
fn matches_supplier(record: &PurchaseRecord, filter: &FilterState, cache: &LookupCache) -> bool {
    let Some(wanted) = filter.supplier_id.as_ref() else {
        return true;
    };

    if record.supplier_id.as_ref() == Some(wanted) {
        return true;
    }

    match (cache.supplier(wanted), record.supplier_label()) {
        (Some(supplier), Some(name)) => {
            let known = supplier.name.trim();
            !known.is_empty() && known == name.trim()
        }
        _ => false,
    }
}

/// The product axis holds either a product id or a product name
fn matches_product(record: &PurchaseRecord, filter: &FilterState) -> bool {
    let Some(wanted) = filter.product_id.as_ref() else {
        return true;
    };

    record.product_label().is_some_and(|name| wanted == name)
        || record.product_id.as_ref() == Some(wanted)
}

/// Inclusive day-granularity range check.
///
/// Records without a usable date always pass.
pub fn in_date_range(raw: Option<&str>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    let Some(day) = raw.and_then(parse_day) else {
        return true;
    };

    from.is_none_or(|from| day >= from) && to.is_none_or(|to| day <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{on_filter_change, FilterEvent};
    use crate::lookup::tests::{sample_cache, supplier};
    use crate::models::RecordId;
    use crate::summary::summarize;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn purchase(supplier_id: &str, date: &str, total: f64) -> PurchaseRecord {
        PurchaseRecord {
            supplier_id: RecordId::parse_optional(supplier_id),
            purchase_date: Some(date.to_string()).filter(|d| !d.is_empty()),
            total_amount: total,
            ..Default::default()
        }
    }

    fn scenario_records() -> Vec<PurchaseRecord> {
        vec![
            purchase("S1", "2024-01-05", 100.0),
            purchase("S2", "2024-02-10", 50.0),
        ]
    }

    fn mixed_records() -> Vec<PurchaseRecord> {
        vec![
            PurchaseRecord {
                id: RecordId::from("1"),
                supplier_id: Some(RecordId::from("S1")),
                product_name: Some("Rice".into()),
                purchase_date: Some("2024-03-01".into()),
                total_amount: 10.0,
                ..Default::default()
            },
            PurchaseRecord {
                id: RecordId::from("2"),
                supplier_name: Some("Corner Mills".into()),
                product_id: Some(RecordId::from("P2")),
                purchase_date: Some("2024-03-15".into()),
                total_amount: 20.0,
                ..Default::default()
            },
            PurchaseRecord {
                id: RecordId::from("3"),
                supplier_id: Some(RecordId::from("S2")),
                product: Some("Nails".into()),
                total_amount: 30.0,
                ..Default::default()
            },
            PurchaseRecord {
                id: RecordId::from("4"),
                supplier_name: Some("Acme Grains".into()),
                product_name: Some("Flour".into()),
                purchase_date: Some("2024-04-02".into()),
                total_amount: 40.0,
                ..Default::default()
            },
        ]
    }

    fn ids(records: &[PurchaseRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let records = mixed_records();
        let cache = sample_cache();
        assert_eq!(apply(&records, &FilterState::default(), &cache), records);
        assert!(apply(&[], &FilterState::default(), &cache).is_empty());
    }

    #[test]
    fn test_scenario_january_window() {
        let filter = FilterState {
            date_from: Some(day(2024, 1, 1)),
            date_to: Some(day(2024, 1, 31)),
            ..Default::default()
        };
        let result = apply(&scenario_records(), &filter, &LookupCache::default());

        assert_eq!(result, vec![purchase("S1", "2024-01-05", 100.0)]);
        let summary = summarize(&result);
        assert_eq!(summary.total_amount, 100.0);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.distinct_suppliers, 1);
    }

    #[test]
    fn test_scenario_supplier_only_ignores_dates() {
        let filter = on_filter_change(&FilterState::default(), FilterEvent::SetSupplier("S2".into()));
        let result = apply(&scenario_records(), &filter, &LookupCache::default());
        assert_eq!(result, vec![purchase("S2", "2024-02-10", 50.0)]);
    }

    #[test]
    fn test_scenario_category_without_suppliers() {
        let filter = FilterState {
            category_id: Some("Toys".into()),
            ..Default::default()
        };
        let result = apply(&mixed_records(), &filter, &sample_cache());

        assert!(result.is_empty());
        let summary = summarize(&result);
        assert_eq!(summary.total_amount, 0.0);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.distinct_suppliers, 0);
    }

    #[test]
    fn test_category_resolves_by_id_then_name() {
        let filter = FilterState {
            category_id: Some("Grocery".into()),
            ..Default::default()
        };
        let result = apply(&mixed_records(), &filter, &sample_cache());
        assert_eq!(ids(&result), vec!["1", "2", "4"]);
    }

    #[test]
    fn test_category_excludes_unresolved_supplier() {
        let records = vec![purchase("S99", "2024-03-01", 5.0)];
        let filter = FilterState {
            category_id: Some("Grocery".into()),
            ..Default::default()
        };
        assert!(apply(&records, &filter, &sample_cache()).is_empty());
    }

    #[test]
    fn test_supplier_matches_id_or_resolved_name() {
        let cache = sample_cache();
        let filter = on_filter_change(&FilterState::default(), FilterEvent::SetSupplier("S1".into()));
        let result = apply(&mixed_records(), &filter, &cache);

        assert_eq!(ids(&result), vec!["1", "4"]);
        let wanted = cache.supplier(&RecordId::from("S1")).unwrap();
        assert!(result.iter().all(|r| {
            r.supplier_id.as_ref() == Some(&wanted.id) || r.supplier_label() == Some(wanted.name.as_str())
        }));
    }

    #[test]
    fn test_padded_supplier_names_still_match() {
        let cache = LookupCache::from_parts(
            vec![
                supplier("S1", "Acme Grains ", "Grocery"),
                supplier("S2", "  ", "Hardware"),
            ],
            Vec::new(),
            Vec::new(),
        );
        let records = vec![
            PurchaseRecord {
                id: RecordId::from("1"),
                supplier_name: Some(" Acme Grains".into()),
                ..Default::default()
            },
            PurchaseRecord {
                id: RecordId::from("2"),
                supplier_name: Some(" ".into()),
                ..Default::default()
            },
        ];

        let by_supplier = on_filter_change(&FilterState::default(), FilterEvent::SetSupplier("S1".into()));
        assert_eq!(ids(&apply(&records, &by_supplier, &cache)), vec!["1"]);

        let blank_name = on_filter_change(&FilterState::default(), FilterEvent::SetSupplier("S2".into()));
        assert!(apply(&records, &blank_name, &cache).is_empty());

        let by_category = on_filter_change(&FilterState::default(), FilterEvent::SetCategory("Grocery".into()));
        assert_eq!(ids(&apply(&records, &by_category, &cache)), vec!["1"]);
    }

    #[test]
    fn test_numeric_and_text_ids_compare_equal() {
        let records: Vec<PurchaseRecord> =
            serde_json::from_str(r#"[{"id": 1, "supplier_id": 7}, {"id": 2, "supplier_id": "8"}]"#).unwrap();
        let filter = on_filter_change(&FilterState::default(), FilterEvent::SetSupplier("7".into()));
        let result = apply(&records, &filter, &LookupCache::default());
        assert_eq!(ids(&result), vec!["1"]);
    }

    #[test]
    fn test_stale_supplier_under_new_category_is_empty() {
        let filter = FilterState {
            category_id: Some("Grocery".into()),
            supplier_id: Some(RecordId::from("S2")),
            ..Default::default()
        };
        assert!(apply(&mixed_records(), &filter, &sample_cache()).is_empty());
    }

    #[test]
    fn test_product_matches_name_or_id() {
        let cache = sample_cache();

        let by_name = on_filter_change(&FilterState::default(), FilterEvent::SetProduct("Nails".into()));
        assert_eq!(ids(&apply(&mixed_records(), &by_name, &cache)), vec!["3"]);

        let by_id = on_filter_change(&FilterState::default(), FilterEvent::SetProduct("P2".into()));
        assert_eq!(ids(&apply(&mixed_records(), &by_id, &cache)), vec!["2"]);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let filter = FilterState {
            date_from: Some(day(2024, 3, 1)),
            date_to: Some(day(2024, 3, 15)),
            ..Default::default()
        };
        let result = apply(&mixed_records(), &filter, &sample_cache());
        // 1 and 2 sit exactly on the bounds; 3 is undated
        assert_eq!(ids(&result), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_undated_record_always_in_range() {
        assert!(in_date_range(None, Some(day(2030, 1, 1)), Some(day(2030, 1, 2))));
        assert!(in_date_range(Some(""), Some(day(2030, 1, 1)), None));
        assert!(in_date_range(Some("garbage"), None, Some(day(2000, 1, 1))));
        assert!(!in_date_range(Some("2024-01-01"), Some(day(2024, 1, 2)), None));
        assert!(!in_date_range(Some("2024-01-03"), None, Some(day(2024, 1, 2))));
    }

    #[test]
    fn test_filters_combine_as_conjunction() {
        let filter = FilterState {
            category_id: Some("Grocery".into()),
            product_id: Some(RecordId::from("Flour")),
            date_from: Some(day(2024, 4, 1)),
            ..Default::default()
        };
        let result = apply(&mixed_records(), &filter, &sample_cache());
        assert_eq!(ids(&result), vec!["4"]);
    }

    #[test]
    fn test_expenses_filter_on_date_only() {
        let expenses: Vec<ExpenseRecord> = serde_json::from_str(
            r#"[{"id": 1, "expense_date": "2024-01-31", "amount": 5},
                {"id": 2, "date": "2024-02-01", "amount": 7},
                {"id": 3, "amount": 9}]"#,
        )
        .unwrap();
        let filter = FilterState {
            category_id: Some("Ignored".into()),
            date_to: Some(day(2024, 1, 31)),
            ..Default::default()
        };
        let kept: Vec<_> = apply_expenses(&expenses, &filter)
            .iter()
            .map(|e| e.id.as_str().to_string())
            .collect();
        assert_eq!(kept, vec!["1", "3"]);
    }
}
