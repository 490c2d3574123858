//! Records exchanged with the store backend
//!
//! The backend is loose about types: ids arrive as numbers or strings,
//! amounts as numbers or numeric strings, and dates either as `YYYY-MM-DD`
//! or as RFC 2822 timestamps. Everything is normalized while decoding so the
//! engine only ever compares normalized strings and plain `f64`s.

use chrono::{DateTime, NaiveDate};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// =============================================================================
// Identifiers
// =============================================================================

/// Record identifier, always compared as a trimmed string.
///
/// `RecordId::from(7_i64)` and `RecordId::from("7")` are equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse user input, treating blank input as "no id"
    pub fn parse_optional(raw: &str) -> Option<Self> {
        Some(Self::new(raw)).filter(|id| !id.is_empty())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for RecordId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl PartialEq<str> for RecordId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.trim()
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Any JSON scalar the backend might use for an id, name or amount
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Loose::Int(n) => n.to_string(),
            Loose::UInt(n) => n.to_string(),
            Loose::Float(f) => format_float(f),
            Loose::Text(s) => s,
            Loose::Other(_) => String::new(),
        }
    }

    fn into_amount(self) -> f64 {
        match self {
            Loose::Int(n) => n as f64,
            Loose::UInt(n) => n as f64,
            Loose::Float(f) => f,
            Loose::Text(s) => s.trim().parse().unwrap_or(0.0),
            Loose::Other(_) => 0.0,
        }
    }
}

/// Whole floats print without a fractional part so `3.0` and `"3"` match
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Loose>::deserialize(deserializer)?;
        Ok(Self::new(raw.map(Loose::into_text).unwrap_or_default()))
    }
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<RecordId>, D::Error> {
    let id = RecordId::deserialize(deserializer)?;
    Ok(Some(id).filter(|id| !id.is_empty()))
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let raw = Option::<Loose>::deserialize(deserializer)?;
    Ok(raw.map(Loose::into_text).unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = text(deserializer)?;
    Ok(Some(value).filter(|s| !s.trim().is_empty()))
}

fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<Loose>::deserialize(deserializer)?;
    Ok(raw.map(Loose::into_amount).unwrap_or(0.0))
}

fn amounts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    let raw = Option::<Vec<Loose>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(Loose::into_amount)
        .collect())
}

/// Parse a backend date into a calendar day.
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time) and the RFC 2822
/// form Flask uses when serializing date columns.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc2822(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

// =============================================================================
// Lookup Records
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub category: String,
    #[serde(default, deserialize_with = "text")]
    pub contact: String,
    #[serde(default, deserialize_with = "text")]
    pub phone: String,
    #[serde(default, deserialize_with = "text")]
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub email: String,
    #[serde(default, deserialize_with = "text")]
    pub phone: String,
    #[serde(default, deserialize_with = "text")]
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "optional_id")]
    pub supplier_id: Option<RecordId>,
}

/// Derived from supplier categories; id and name are both the category text
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Feeds
// =============================================================================

/// Purchase row as returned by `/api/purchases`.
///
/// Supplier and product may be referenced by id, by denormalized name, or
/// both. The report feed uses `supplier_name`/`product_name`, the purchase
/// screen feed uses `supplier`/`product`; both spellings are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PurchaseRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "optional_text")]
    pub purchase_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub invoice_no: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub bill_no: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub supplier_id: Option<RecordId>,
    #[serde(default, deserialize_with = "optional_text")]
    pub supplier_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub supplier: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub product_id: Option<RecordId>,
    #[serde(default, deserialize_with = "optional_text")]
    pub product_name: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "amount")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "amount")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "optional_text")]
    pub payment_status: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub delivery_status: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub notes: Option<String>,
}

impl PurchaseRecord {
    pub fn date(&self) -> Option<&str> {
        self.purchase_date.as_deref()
    }

    pub fn invoice(&self) -> &str {
        self.invoice_no
            .as_deref()
            .or(self.bill_no.as_deref())
            .unwrap_or("")
    }

    pub fn supplier_label(&self) -> Option<&str> {
        self.supplier_name.as_deref().or(self.supplier.as_deref())
    }

    pub fn product_label(&self) -> Option<&str> {
        self.product_name.as_deref().or(self.product.as_deref())
    }
}

/// Expense row; the report feed calls the date `expense_date`, the expense
/// screen calls it `date`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "optional_text")]
    pub expense_date: Option<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub category: String,
    #[serde(default, deserialize_with = "text")]
    pub description: String,
    #[serde(default, deserialize_with = "amount")]
    pub amount: f64,
}

impl ExpenseRecord {
    pub fn date(&self) -> Option<&str> {
        self.expense_date.as_deref().or(self.date.as_deref())
    }
}

/// Aggregated profit row from `/api/profit_of_sales`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfitRow {
    #[serde(default, deserialize_with = "text")]
    pub period: String,
    #[serde(default, deserialize_with = "amount")]
    pub total_sales: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_purchases: f64,
    #[serde(default, deserialize_with = "amount")]
    pub total_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub gross_profit: f64,
}

/// Monthly purchase totals from `/api/chart_data`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "amounts")]
    pub totals: Vec<f64>,
}

impl ChartData {
    /// Label/total pairs; extra entries on either side are dropped
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.totals.iter().copied())
    }
}

/// Home dashboard counters from `/api/dashboard-stats`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "amount")]
    pub customers: f64,
    #[serde(default, deserialize_with = "amount")]
    pub suppliers: f64,
    #[serde(default, deserialize_with = "amount")]
    pub categories: f64,
    #[serde(default, deserialize_with = "amount")]
    pub products: f64,
    #[serde(default, deserialize_with = "amount")]
    pub today_sales: f64,
    #[serde(default, deserialize_with = "amount")]
    pub today_expenses: f64,
    #[serde(default, deserialize_with = "amount")]
    pub week_profit: f64,
    #[serde(default, deserialize_with = "amount")]
    pub month_profit: f64,
}

/// `{success: bool}` acknowledgement returned by the purchase CRUD endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Ack {
    #[serde(default)]
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_compare_as_strings() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[7, "7", " 7 ", 7.0]"#).unwrap();
        assert!(ids.iter().all(|id| id == &RecordId::from(7_i64)));
        assert!(RecordId::from("S1") == *"S1");
    }

    #[test]
    fn test_blank_optional_id_is_none() {
        let p: ProductRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Rice", "supplier_id": ""}"#).unwrap();
        assert_eq!(p.supplier_id, None);

        let p: ProductRecord =
            serde_json::from_str(r#"{"id": 1, "name": "Rice", "supplier_id": null}"#).unwrap();
        assert_eq!(p.supplier_id, None);
    }

    #[test]
    fn test_purchase_tolerates_both_field_spellings() {
        let report: PurchaseRecord = serde_json::from_str(
            r#"{"id": 1, "purchase_date": "2024-01-05", "bill_no": "B-1",
                "supplier_id": 3, "supplier_name": "Acme", "product_name": "Rice",
                "total_amount": "150.50"}"#,
        )
        .unwrap();
        assert_eq!(report.invoice(), "B-1");
        assert_eq!(report.supplier_label(), Some("Acme"));
        assert_eq!(report.product_label(), Some("Rice"));
        assert_eq!(report.total_amount, 150.5);

        let screen: PurchaseRecord = serde_json::from_str(
            r#"{"id": 2, "invoice_no": "INV-2", "supplier": "Acme", "product": "Dal",
                "quantity": 2, "unit_price": 40, "total_amount": 80,
                "payment_status": "Paid", "delivery_status": "Delivered", "notes": null}"#,
        )
        .unwrap();
        assert_eq!(screen.invoice(), "INV-2");
        assert_eq!(screen.supplier_label(), Some("Acme"));
        assert_eq!(screen.notes, None);
    }

    #[test]
    fn test_malformed_amount_reads_as_zero() {
        let e: ExpenseRecord =
            serde_json::from_str(r#"{"id": 1, "amount": "n/a", "category": true}"#).unwrap();
        assert_eq!(e.amount, 0.0);
        assert_eq!(e.category, "");
    }

    #[test]
    fn test_expense_date_spellings() {
        let a: ExpenseRecord = serde_json::from_str(r#"{"expense_date": "2024-03-01"}"#).unwrap();
        let b: ExpenseRecord = serde_json::from_str(r#"{"date": "2024-03-02"}"#).unwrap();
        assert_eq!(a.date(), Some("2024-03-01"));
        assert_eq!(b.date(), Some("2024-03-02"));
    }

    #[test]
    fn test_parse_day_formats() {
        let jan5 = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(parse_day("2024-01-05"), Some(jan5));
        assert_eq!(parse_day("2024-01-05T13:45:00"), Some(jan5));
        assert_eq!(parse_day("Fri, 05 Jan 2024 00:00:00 GMT"), Some(jan5));
        assert_eq!(parse_day(""), None);
        assert_eq!(parse_day("yesterday"), None);
    }

    #[test]
    fn test_chart_points_zip() {
        let chart: ChartData =
            serde_json::from_str(r#"{"labels": ["2024-01", "2024-02", "2024-03"], "totals": [10, "20.5"]}"#)
                .unwrap();
        let points: Vec<_> = chart.points().collect();
        assert_eq!(points, vec![("2024-01", 10.0), ("2024-02", 20.5)]);
    }
}
