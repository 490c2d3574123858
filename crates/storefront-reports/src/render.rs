//! Table rendering (terminal grids and CSV outputs)

use anyhow::{bail, Result};
use csv::Writer;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::constants;
use crate::models::{
    parse_day, ChartData, CustomerRecord, DashboardStats, ExpenseRecord, ProductRecord, ProfitRow,
    PurchaseRecord, SupplierRecord,
};
use crate::sales::{SaleRecord, SalesSummary};
use crate::summary::{ProfitTotals, ReportSummary, StatusCounts};

// =============================================================================
// Sorting & Paging
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    Amount,
    Supplier,
    Invoice,
}

/// Column and direction for the purchase grid, parsed from `field` or `field:desc`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl FromStr for SortKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, direction) = s.split_once(':').unwrap_or((s, "asc"));
        let field = match name.trim().to_lowercase().as_str() {
            "date" => SortField::Date,
            "amount" | "total" => SortField::Amount,
            "supplier" => SortField::Supplier,
            "invoice" => SortField::Invoice,
            other => bail!("unknown sort column '{}'", other),
        };
        let descending = match direction.trim().to_lowercase().as_str() {
            "asc" => false,
            "desc" => true,
            other => bail!("unknown sort direction '{}'", other),
        };
        Ok(Self { field, descending })
    }
}

/// Stable sort of the purchase grid; undated or unlabeled rows sort first
pub fn sort_purchases(records: &mut [PurchaseRecord], key: SortKey) {
    records.sort_by(|a, b| {
        let ord = match key.field {
            SortField::Date => a.date().and_then(parse_day).cmp(&b.date().and_then(parse_day)),
            SortField::Amount => a
                .total_amount
                .partial_cmp(&b.total_amount)
                .unwrap_or(Ordering::Equal),
            SortField::Supplier => a
                .supplier_label()
                .map(str::to_lowercase)
                .cmp(&b.supplier_label().map(str::to_lowercase)),
            SortField::Invoice => a.invoice().cmp(b.invoice()),
        };
        if key.descending { ord.reverse() } else { ord }
    });
}

/// One page of a grid
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub rows: &'a [T],
    /// 1-based page number actually shown
    pub number: usize,
    pub total_pages: usize,
}

/// Slice out a 1-based page, clamping out-of-range requests to the last page
pub fn paginate<T>(rows: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = rows.len().div_ceil(page_size).max(1);
    let number = page.clamp(1, total_pages);
    let start = ((number - 1) * page_size).min(rows.len());
    let end = (start + page_size).min(rows.len());
    Page {
        rows: &rows[start..end],
        number,
        total_pages,
    }
}

// =============================================================================
// Grid Rows
// =============================================================================

fn money(amount: f64) -> String {
    format!("{}{:.2}", constants::CURRENCY_SYMBOL, amount)
}

/// Show backend dates as `YYYY-MM-DD` when they parse, verbatim otherwise
fn day_label(raw: Option<&str>) -> String {
    match raw.and_then(parse_day) {
        Some(day) => day.format("%Y-%m-%d").to_string(),
        None => or_dash(raw),
    }
}

fn or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("-")
        .to_string()
}

#[derive(Tabled)]
struct PurchaseRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Invoice")]
    invoice: String,
    #[tabled(rename = "Supplier")]
    supplier: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Payment")]
    payment: String,
    #[tabled(rename = "Delivery")]
    delivery: String,
}

impl From<&PurchaseRecord> for PurchaseRow {
    fn from(r: &PurchaseRecord) -> Self {
        Self {
            date: day_label(r.date()),
            invoice: or_dash(Some(r.invoice())),
            supplier: or_dash(r.supplier_label()),
            product: or_dash(r.product_label()),
            quantity: r.quantity.to_string(),
            total: money(r.total_amount),
            payment: or_dash(r.payment_status.as_deref()),
            delivery: or_dash(r.delivery_status.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

impl From<&ExpenseRecord> for ExpenseRow {
    fn from(r: &ExpenseRecord) -> Self {
        Self {
            date: day_label(r.date()),
            category: r.category.clone(),
            description: r.description.clone(),
            amount: money(r.amount),
        }
    }
}

#[derive(Tabled)]
struct ProfitLine {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Sales")]
    sales: String,
    #[tabled(rename = "Purchases")]
    purchases: String,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Gross Profit")]
    gross_profit: String,
}

impl From<&ProfitRow> for ProfitLine {
    fn from(r: &ProfitRow) -> Self {
        Self {
            period: r.period.clone(),
            sales: money(r.total_sales),
            purchases: money(r.total_purchases),
            expenses: money(r.total_expenses),
            gross_profit: money(r.gross_profit),
        }
    }
}

#[derive(Tabled)]
struct SupplierRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
}

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Supplier")]
    supplier_id: String,
}

#[derive(Tabled)]
struct SaleRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Points")]
    points: i64,
}

fn grid<R: Tabled>(rows: Vec<R>) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}

/// Accepts a slice or any iterator of borrowed records
pub fn purchases_table<'a>(records: impl IntoIterator<Item = &'a PurchaseRecord>) -> String {
    grid(records.into_iter().map(PurchaseRow::from).collect())
}

pub fn expenses_table<'a>(records: impl IntoIterator<Item = &'a ExpenseRecord>) -> String {
    grid(records.into_iter().map(ExpenseRow::from).collect())
}

pub fn profit_table(rows: &[ProfitRow]) -> String {
    grid(rows.iter().map(ProfitLine::from).collect())
}

pub fn suppliers_table(records: &[SupplierRecord]) -> String {
    grid(
        records
            .iter()
            .map(|s| SupplierRow {
                id: s.id.to_string(),
                name: s.name.clone(),
                category: or_dash(Some(&s.category)),
                phone: or_dash(Some(&s.phone)),
            })
            .collect(),
    )
}

pub fn customers_table(records: &[CustomerRecord]) -> String {
    grid(
        records
            .iter()
            .map(|c| CustomerRow {
                id: c.id.to_string(),
                name: c.name.clone(),
                email: or_dash(Some(&c.email)),
                phone: or_dash(Some(&c.phone)),
            })
            .collect(),
    )
}

pub fn products_table(records: &[ProductRecord]) -> String {
    grid(
        records
            .iter()
            .map(|p| ProductRow {
                id: p.id.to_string(),
                name: p.name.clone(),
                supplier_id: or_dash(p.supplier_id.as_ref().map(|id| id.as_str())),
            })
            .collect(),
    )
}

pub fn sales_table(sales: &[SaleRecord]) -> String {
    grid(
        sales
            .iter()
            .map(|s| SaleRow {
                id: s.id.clone(),
                date: s.date.clone(),
                customer: s.customer.clone(),
                product: s.product_name.clone(),
                quantity: s.quantity.to_string(),
                total: money(s.total_selling),
                points: s.points,
            })
            .collect(),
    )
}

// =============================================================================
// Console Summaries
// =============================================================================

pub fn print_report_summary(summary: &ReportSummary) {
    println!("Total Purchases:    {}", money(summary.total_amount));
    println!("Transactions:       {}", summary.count);
    println!("Unique Suppliers:   {}", summary.distinct_suppliers);
}

pub fn print_status_counts(counts: &StatusCounts) {
    println!("Pending: {}   Completed: {}", counts.pending, counts.completed);
}

pub fn print_profit_totals(totals: &ProfitTotals) {
    println!("Total Sales:        {}", money(totals.sales));
    println!("Total Purchases:    {}", money(totals.purchases));
    println!("Total Expenses:     {}", money(totals.expenses));
    println!("Gross Profit:       {}", money(totals.gross_profit));
}

pub fn print_sales_summary(summary: &SalesSummary) {
    println!("Total Sales:        {}", money(summary.total_sales));
    println!("Total Points:       {}", summary.total_points);
    println!("Orders:             {}", summary.orders);
}

pub fn dashboard_text(stats: &DashboardStats) -> String {
    [
        format!("Customers:        {}", stats.customers),
        format!("Suppliers:        {}", stats.suppliers),
        format!("Categories:       {}", stats.categories),
        format!("Products:         {}", stats.products),
        format!("Today's Sales:    {}", money(stats.today_sales)),
        format!("Today's Expenses: {}", money(stats.today_expenses)),
        format!("Week Profit:      {}", money(stats.week_profit)),
        format!("Month Profit:     {}", money(stats.month_profit)),
    ]
    .join("\n")
}

/// Horizontal bar chart, bars scaled to `width` columns against the largest total
pub fn bar_chart<'a>(points: impl IntoIterator<Item = (&'a str, f64)>, width: usize) -> String {
    let points: Vec<(&str, f64)> = points.into_iter().collect();
    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let label_width = points.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);

    points
        .iter()
        .map(|(label, value)| {
            let len = if max > 0.0 && *value > 0.0 {
                ((value / max) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<lw$} | {} {}",
                label,
                "#".repeat(len),
                money(*value),
                lw = label_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn purchase_chart(data: &ChartData, width: usize) -> String {
    bar_chart(data.points(), width)
}

/// Monthly expense chart, one bar per calendar month
pub fn expense_chart(by_month: &[f64; 12], width: usize) -> String {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    bar_chart(MONTHS.iter().copied().zip(by_month.iter().copied()), width)
}

// =============================================================================
// CSV Outputs
// =============================================================================

/// Generate purchases_report.csv from the filtered view
pub fn write_purchases_csv(output_dir: &Path, records: &[PurchaseRecord]) -> Result<PathBuf> {
    let path = output_dir.join(constants::PURCHASES_REPORT_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    // Header
    wtr.write_record([
        "Date",
        "Invoice_No",
        "Supplier_ID",
        "Supplier",
        "Product",
        "Quantity",
        "Unit_Price",
        "Total_Amount",
        "Payment_Status",
        "Delivery_Status",
    ])?;

    for r in records {
        wtr.write_record([
            r.date().unwrap_or(""),
            r.invoice(),
            r.supplier_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
            r.supplier_label().unwrap_or(""),
            r.product_label().unwrap_or(""),
            &r.quantity.to_string(),
            &format!("{:.2}", r.unit_price),
            &format!("{:.2}", r.total_amount),
            r.payment_status.as_deref().unwrap_or(""),
            r.delivery_status.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());
    Ok(path)
}

/// Generate expenses_report.csv from the filtered view
pub fn write_expenses_csv(output_dir: &Path, records: &[ExpenseRecord]) -> Result<PathBuf> {
    let path = output_dir.join(constants::EXPENSES_REPORT_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Date", "Category", "Description", "Amount"])?;

    for r in records {
        wtr.write_record([
            r.date().unwrap_or(""),
            &r.category,
            &r.description,
            &format!("{:.2}", r.amount),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());
    Ok(path)
}
