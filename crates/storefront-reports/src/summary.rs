//! Totals and counts over the rows currently on screen
//!
//! Every function here works on exactly the slice it is given. Callers pass
//! the post-filter rows so displayed totals always agree with the table.

use chrono::Datelike;
use std::collections::HashSet;

use crate::constants;
use crate::models::{parse_day, ExpenseRecord, ProfitRow, PurchaseRecord};

/// Headline numbers for the purchase report
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReportSummary {
    pub total_amount: f64,
    pub count: usize,
    pub distinct_suppliers: usize,
}

pub fn summarize(records: &[PurchaseRecord]) -> ReportSummary {
    ReportSummary {
        total_amount: records.iter().map(|r| r.total_amount).sum(),
        count: records.len(),
        distinct_suppliers: distinct_suppliers(records),
    }
}

/// Suppliers are identified by id when present, otherwise by name.
/// Records with neither do not count.
fn distinct_suppliers(records: &[PurchaseRecord]) -> usize {
    records
        .iter()
        .filter_map(|r| match (&r.supplier_id, r.supplier_label()) {
            (Some(id), _) => Some(format!("id:{}", id)),
            (None, Some(name)) => Some(format!("name:{}", name.trim())),
            (None, None) => None,
        })
        .collect::<HashSet<_>>()
        .len()
}

/// Open vs. settled orders on the purchase screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub completed: usize,
}

pub fn purchase_status_counts(records: &[PurchaseRecord]) -> StatusCounts {
    let status_is = |r: &PurchaseRecord, wanted: &str| r.payment_status.as_deref() == Some(wanted);
    StatusCounts {
        pending: records
            .iter()
            .filter(|r| status_is(r, constants::STATUS_PENDING))
            .count(),
        completed: records
            .iter()
            .filter(|r| status_is(r, constants::STATUS_PAID))
            .count(),
    }
}

pub fn expense_total(expenses: &[ExpenseRecord]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Expense totals per calendar month (index 0 = January).
///
/// Months from every year are folded together; undated rows are skipped.
pub fn expenses_by_month(expenses: &[ExpenseRecord]) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for expense in expenses {
        if let Some(day) = expense.date().and_then(parse_day) {
            totals[day.month0() as usize] += expense.amount;
        }
    }
    totals
}

/// The most recently entered expenses, newest first
pub fn recent_expenses(expenses: &[ExpenseRecord]) -> Vec<&ExpenseRecord> {
    expenses
        .iter()
        .rev()
        .take(constants::RECENT_EXPENSES)
        .collect()
}

/// Column sums of the profit table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProfitTotals {
    pub sales: f64,
    pub purchases: f64,
    pub expenses: f64,
    pub gross_profit: f64,
}

pub fn profit_totals(rows: &[ProfitRow]) -> ProfitTotals {
    rows.iter().fold(ProfitTotals::default(), |acc, row| ProfitTotals {
        sales: acc.sales + row.total_sales,
        purchases: acc.purchases + row.total_purchases,
        expenses: acc.expenses + row.total_expenses,
        gross_profit: acc.gross_profit + row.gross_profit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;

    fn purchase(supplier_id: Option<&str>, name: Option<&str>, total: f64, status: &str) -> PurchaseRecord {
        PurchaseRecord {
            supplier_id: supplier_id.map(RecordId::from),
            supplier_name: name.map(str::to_string),
            total_amount: total,
            payment_status: Some(status.to_string()),
            ..Default::default()
        }
    }

    fn expense(date: Option<&str>, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            expense_date: date.map(str::to_string),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_summary_over_exact_slice() {
        let records = vec![
            purchase(Some("S1"), None, 100.0, "Paid"),
            purchase(Some("S1"), Some("Acme"), 25.5, "Pending"),
            purchase(None, Some("Bolt"), 10.0, "Pending"),
            purchase(None, None, 4.5, "Pending"),
        ];

        let all = summarize(&records);
        assert_eq!(all.total_amount, 140.0);
        assert_eq!(all.count, 4);
        assert_eq!(all.distinct_suppliers, 2);

        let head = summarize(&records[..1]);
        assert_eq!(head, ReportSummary { total_amount: 100.0, count: 1, distinct_suppliers: 1 });

        assert_eq!(summarize(&[]), ReportSummary::default());
    }

    #[test]
    fn test_status_counts() {
        let records = vec![
            purchase(Some("S1"), None, 1.0, "Paid"),
            purchase(Some("S2"), None, 1.0, "Pending"),
            purchase(Some("S3"), None, 1.0, "Pending"),
            purchase(Some("S4"), None, 1.0, "Cancelled"),
        ];
        assert_eq!(purchase_status_counts(&records), StatusCounts { pending: 2, completed: 1 });
    }

    #[test]
    fn test_expenses_by_month_folds_years() {
        let expenses = vec![
            expense(Some("2023-01-10"), 5.0),
            expense(Some("2024-01-20"), 7.0),
            expense(Some("2024-12-31"), 3.0),
            expense(None, 100.0),
        ];
        let months = expenses_by_month(&expenses);
        assert_eq!(months[0], 12.0);
        assert_eq!(months[11], 3.0);
        assert_eq!(months.iter().sum::<f64>(), 15.0);
        assert_eq!(expense_total(&expenses), 115.0);
    }

    #[test]
    fn test_recent_expenses_newest_first() {
        let expenses: Vec<_> = (1..=5).map(|i| expense(None, i as f64)).collect();
        let recent: Vec<f64> = recent_expenses(&expenses).iter().map(|e| e.amount).collect();
        assert_eq!(recent, vec![5.0, 4.0, 3.0]);
        assert!(recent_expenses(&[]).is_empty());
    }

    #[test]
    fn test_profit_totals() {
        let rows = vec![
            ProfitRow {
                period: "2024-01".into(),
                total_sales: 1000.0,
                total_purchases: 600.0,
                total_expenses: 100.0,
                gross_profit: 300.0,
            },
            ProfitRow {
                period: "2024-02".into(),
                total_sales: 500.0,
                total_purchases: 200.0,
                total_expenses: 50.0,
                gross_profit: 250.0,
            },
        ];
        let totals = profit_totals(&rows);
        assert_eq!(totals.sales, 1500.0);
        assert_eq!(totals.purchases, 800.0);
        assert_eq!(totals.expenses, 150.0);
        assert_eq!(totals.gross_profit, 550.0);
    }
}
