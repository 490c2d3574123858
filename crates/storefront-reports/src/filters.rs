//! Report filter state and its transition function
//!
//! The filter axes are independent. Narrowing the category changes which
//! suppliers are offered but never clears a supplier that is already
//! selected; the engine simply returns nothing for a stale combination.

use chrono::{Duration, NaiveDate};

use crate::constants;
use crate::lookup::LookupCache;
use crate::models::{parse_day, ProductRecord, RecordId, SupplierRecord};

/// Current report filters; `None` means "no constraint on this axis"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category_id: Option<String>,
    pub supplier_id: Option<RecordId>,
    pub product_id: Option<RecordId>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// A single user edit to the filter panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterEvent {
    SetCategory(String),
    SetSupplier(String),
    SetProduct(String),
    SetDateFrom(String),
    SetDateTo(String),
    /// Clear every axis and restore the default date window
    Reset { today: NaiveDate },
}

/// Options the filter panel should offer under the current state
#[derive(Debug)]
pub struct FilterChoices<'a> {
    pub suppliers: Vec<&'a SupplierRecord>,
    pub products: Vec<&'a ProductRecord>,
}

impl FilterState {
    /// Filters for a fresh session: the last 30 days, inclusive
    pub fn new(today: NaiveDate) -> Self {
        Self::with_range_days(today, constants::DEFAULT_RANGE_DAYS)
    }

    /// Window of `days` before `today`; a window past the calendar's range
    /// leaves the lower bound open
    pub fn with_range_days(today: NaiveDate, days: i64) -> Self {
        Self {
            date_from: Duration::try_days(days).and_then(|span| today.checked_sub_signed(span)),
            date_to: Some(today),
            ..Self::default()
        }
    }

    /// True when no axis constrains the result
    pub fn is_empty(&self) -> bool {
        self.category_id.is_none()
            && self.supplier_id.is_none()
            && self.product_id.is_none()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// Supplier and product choices after category/supplier narrowing
    pub fn choices<'a>(&self, cache: &'a LookupCache) -> FilterChoices<'a> {
        FilterChoices {
            suppliers: cache.suppliers_by_category(self.category_id.as_deref()),
            products: cache.products_by_supplier(self.supplier_id.as_ref()),
        }
    }
}

/// Apply one edit and return the resulting state.
///
/// Blank values clear their axis. Dates that do not parse also clear the
/// axis, matching a browser date input that reports an empty value.
pub fn on_filter_change(state: &FilterState, event: FilterEvent) -> FilterState {
    let mut next = state.clone();
    match event {
        FilterEvent::SetCategory(category) => {
            let category = category.trim();
            next.category_id = (!category.is_empty()).then(|| category.to_string());
        }
        FilterEvent::SetSupplier(id) => next.supplier_id = RecordId::parse_optional(&id),
        FilterEvent::SetProduct(id) => next.product_id = RecordId::parse_optional(&id),
        FilterEvent::SetDateFrom(raw) => next.date_from = parse_day(&raw),
        FilterEvent::SetDateTo(raw) => next.date_to = parse_day(&raw),
        FilterEvent::Reset { today } => next = FilterState::new(today),
    }
    next
}
