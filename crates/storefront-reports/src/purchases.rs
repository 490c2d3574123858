//! Purchase screen: list search/status filter and the add/edit form

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants;
use crate::error::ValidationError;
use crate::models::PurchaseRecord;

/// Search box and status dropdown of the purchase list
#[derive(Debug, Clone, Default)]
pub struct PurchaseQuery {
    pub search: Option<String>,
    pub status: Option<String>,
}

impl PurchaseQuery {
    /// Case-insensitive search over supplier, product and invoice number;
    /// the status filter accepts either the payment or the delivery status
    pub fn matches(&self, record: &PurchaseRecord) -> bool {
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let haystack = format!(
                "{} {} {}",
                record.supplier_label().unwrap_or(""),
                record.product_label().unwrap_or(""),
                record.invoice()
            )
            .to_lowercase();
            if !haystack.contains(&needle.to_lowercase()) {
                return false;
            }
        }

        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            let payment = record.payment_status.as_deref() == Some(status);
            let delivery = record.delivery_status.as_deref() == Some(status);
            if !payment && !delivery {
                return false;
            }
        }

        true
    }

    pub fn filter<'a>(&self, records: &'a [PurchaseRecord]) -> Vec<&'a PurchaseRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Raw purchase form input, as typed
#[derive(Debug, Clone)]
pub struct PurchaseForm {
    pub invoice_no: String,
    pub supplier: String,
    pub product: String,
    pub quantity: String,
    pub unit_price: String,
    pub purchase_date: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub notes: String,
}

impl PurchaseForm {
    /// A blank form: one unit at zero cost, dated today, pending, not delivered
    pub fn new(today: NaiveDate) -> Self {
        Self {
            invoice_no: String::new(),
            supplier: String::new(),
            product: String::new(),
            quantity: "1".to_string(),
            unit_price: "0".to_string(),
            purchase_date: today.format("%Y-%m-%d").to_string(),
            payment_status: constants::STATUS_PENDING.to_string(),
            delivery_status: constants::STATUS_NOT_DELIVERED.to_string(),
            notes: String::new(),
        }
    }

    /// Prefill the form from an existing purchase for editing
    pub fn from_record(record: &PurchaseRecord) -> Self {
        Self {
            invoice_no: record.invoice().to_string(),
            supplier: record.supplier_label().unwrap_or("").to_string(),
            product: record.product_label().unwrap_or("").to_string(),
            quantity: record.quantity.to_string(),
            unit_price: record.unit_price.to_string(),
            purchase_date: record.date().unwrap_or("").to_string(),
            payment_status: record.payment_status.clone().unwrap_or_default(),
            delivery_status: record.delivery_status.clone().unwrap_or_default(),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<PurchasePayload, ValidationError> {
        let supplier = required(&self.supplier, "supplier")?;
        let product = required(&self.product, "product")?;
        let quantity = numeric(&self.quantity, "quantity")?;
        let unit_price = numeric(&self.unit_price, "unit price")?;

        Ok(PurchasePayload {
            invoice_no: Some(self.invoice_no.trim().to_string()).filter(|s| !s.is_empty()),
            supplier,
            product,
            quantity,
            unit_price,
            purchase_date: self.purchase_date.trim().to_string(),
            payment_status: self.payment_status.trim().to_string(),
            delivery_status: self.delivery_status.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

/// JSON body for `/api/add_purchase` and `/api/update_purchase/{id}`.
///
/// A blank invoice number is omitted so the backend can assign one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchasePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_no: Option<String>,
    pub supplier: String,
    pub product: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub purchase_date: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub notes: String,
}

pub(crate) fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(value.to_string())
    }
}

pub(crate) fn numeric(value: &str, field: &'static str) -> Result<f64, ValidationError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(ValidationError::NotNumeric(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(supplier: &str, product: &str, invoice: &str, payment: &str, delivery: &str) -> PurchaseRecord {
        PurchaseRecord {
            supplier: Some(supplier.to_string()),
            product: Some(product.to_string()),
            invoice_no: Some(invoice.to_string()),
            payment_status: Some(payment.to_string()),
            delivery_status: Some(delivery.to_string()),
            ..Default::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn test_search_is_case_insensitive_across_fields() {
        let records = vec![
            record("Acme Grains", "Rice", "INV-001", "Paid", "Delivered"),
            record("Bolt Hardware", "Nails", "INV-002", "Pending", "Not Delivered"),
        ];

        let by_supplier = PurchaseQuery { search: Some("acme".into()), status: None };
        assert_eq!(by_supplier.filter(&records).len(), 1);

        let by_invoice = PurchaseQuery { search: Some("inv-002".into()), status: None };
        assert_eq!(by_invoice.filter(&records)[0].product_label(), Some("Nails"));

        let blank = PurchaseQuery { search: Some("  ".into()), status: None };
        assert_eq!(blank.filter(&records).len(), 2);
    }

    #[test]
    fn test_status_matches_payment_or_delivery() {
        let records = vec![
            record("A", "x", "1", "Paid", "Not Delivered"),
            record("B", "y", "2", "Pending", "Delivered"),
            record("C", "z", "3", "Pending", "Not Delivered"),
        ];

        let delivered = PurchaseQuery { search: None, status: Some("Delivered".into()) };
        assert_eq!(delivered.filter(&records).len(), 1);

        let paid = PurchaseQuery { search: None, status: Some("Paid".into()) };
        assert_eq!(paid.filter(&records).len(), 1);

        let not_delivered = PurchaseQuery { search: Some("a".into()), status: Some("Not Delivered".into()) };
        assert_eq!(not_delivered.filter(&records).len(), 1);
    }

    #[test]
    fn test_new_form_defaults() {
        let form = PurchaseForm::new(today());
        assert_eq!(form.quantity, "1");
        assert_eq!(form.unit_price, "0");
        assert_eq!(form.purchase_date, "2024-06-01");
        assert_eq!(form.payment_status, "Pending");
        assert_eq!(form.delivery_status, "Not Delivered");
    }

    #[test]
    fn test_supplier_and_product_required() {
        let mut form = PurchaseForm::new(today());
        form.product = "Rice".into();
        assert_eq!(form.validate(), Err(ValidationError::Missing("supplier")));

        form.supplier = "Acme".into();
        form.product = " ".into();
        assert_eq!(form.validate(), Err(ValidationError::Missing("product")));
    }

    #[test]
    fn test_numbers_must_parse() {
        let mut form = PurchaseForm::new(today());
        form.supplier = "Acme".into();
        form.product = "Rice".into();
        form.quantity = "two".into();
        assert_eq!(form.validate(), Err(ValidationError::NotNumeric("quantity")));
    }

    #[test]
    fn test_valid_form_builds_payload() {
        let mut form = PurchaseForm::new(today());
        form.supplier = " Acme ".into();
        form.product = "Rice".into();
        form.quantity = "3".into();
        form.unit_price = "12.5".into();

        let payload = form.validate().unwrap();
        assert_eq!(payload.supplier, "Acme");
        assert_eq!(payload.quantity, 3.0);
        assert_eq!(payload.unit_price, 12.5);
        assert_eq!(payload.invoice_no, None);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("invoice_no").is_none());
        assert_eq!(json["payment_status"], "Pending");
    }

    #[test]
    fn test_edit_form_roundtrips_record() {
        let mut existing = record("Acme", "Rice", "INV-9", "Paid", "Delivered");
        existing.quantity = 2.0;
        existing.unit_price = 40.0;
        existing.purchase_date = Some("2024-05-20".into());

        let payload = PurchaseForm::from_record(&existing).validate().unwrap();
        assert_eq!(payload.invoice_no.as_deref(), Some("INV-9"));
        assert_eq!(payload.quantity, 2.0);
        assert_eq!(payload.purchase_date, "2024-05-20");
    }
}
