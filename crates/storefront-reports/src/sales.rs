//! Local sales ledger with loyalty points and printable bills
//!
//! Sales never go to the backend. They are kept in a SQLite file in the
//! data directory and survive restarts until explicitly cleared.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use sqlx::{FromRow, SqlitePool};
use std::fmt::Write as _;
use std::path::Path;

use crate::constants;
use crate::error::ValidationError;
use crate::purchases::{numeric, required};

/// One recorded sale
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub id: String,
    pub customer: String,
    pub product_name: String,
    pub quantity: f64,
    pub selling_price: f64,
    pub total_selling: f64,
    pub points: i64,
    pub date: String,
}

/// Loyalty points earned for a purchase amount: one per 100 units, rounded down
pub fn points_for(amount: f64) -> i64 {
    if amount.is_finite() && amount > 0.0 {
        (amount / constants::POINTS_UNIT).floor() as i64
    } else {
        0
    }
}

/// Raw sale form input
#[derive(Debug, Clone, Default)]
pub struct SaleForm {
    pub id: String,
    pub customer: String,
    pub product_name: String,
    pub quantity: String,
    pub selling_price: String,
}

impl SaleForm {
    /// Validate the form and price the sale at `now`
    pub fn into_sale(&self, now: NaiveDateTime) -> Result<SaleRecord, ValidationError> {
        let id = required(&self.id, "id")?;
        let customer = required(&self.customer, "customer")?;
        let product_name = required(&self.product_name, "product")?;
        let quantity = numeric(&self.quantity, "quantity")?;
        let selling_price = numeric(&self.selling_price, "selling price")?;

        let total_selling = quantity * selling_price;
        Ok(SaleRecord {
            id,
            customer,
            product_name,
            quantity,
            selling_price,
            total_selling,
            points: points_for(total_selling),
            date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

/// Totals shown above the sales table
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SalesSummary {
    pub total_sales: f64,
    pub total_points: i64,
    pub orders: usize,
}

pub fn sales_summary(sales: &[SaleRecord]) -> SalesSummary {
    SalesSummary {
        total_sales: sales.iter().map(|s| s.total_selling).sum(),
        total_points: sales.iter().map(|s| s.points).sum(),
        orders: sales.len(),
    }
}

/// Plain-text invoice for a single sale
pub fn render_bill(sale: &SaleRecord) -> String {
    let c = constants::CURRENCY_SYMBOL;
    let mut out = String::new();
    let _ = writeln!(out, "{:^40}", "SALES INVOICE");
    let _ = writeln!(out, "Invoice #: {}", sale.id);
    let _ = writeln!(out, "Date:      {}", sale.date);
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "Customer:  {}", sale.customer);
    let _ = writeln!(out, "Product:   {}", sale.product_name);
    let _ = writeln!(out, "Quantity:  {} kg", sale.quantity);
    let _ = writeln!(out, "Price/kg:  {}{:.2}", c, sale.selling_price);
    let _ = writeln!(out, "{}", "-".repeat(40));
    let _ = writeln!(out, "Total:     {}{:.2}", c, sale.total_selling);
    let _ = writeln!(out, "Points:    {}", sale.points);
    out
}

// =============================================================================
// Persistence
// =============================================================================

/// Row type for sales query
#[derive(FromRow)]
struct SaleRow {
    id: String,
    customer: String,
    product_name: String,
    quantity: f64,
    selling_price: f64,
    total_selling: f64,
    points: i64,
    date: String,
}

impl From<SaleRow> for SaleRecord {
    fn from(r: SaleRow) -> Self {
        Self {
            id: r.id,
            customer: r.customer,
            product_name: r.product_name,
            quantity: r.quantity,
            selling_price: r.selling_price,
            total_selling: r.total_selling,
            points: r.points,
            date: r.date,
        }
    }
}

/// Sales database wrapper
pub struct SalesStore {
    pool: SqlitePool,
}

impl SalesStore {
    /// Open or create the sales database
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // SQLx requires the file to exist for SQLite
        if !path.exists() {
            std::fs::File::create(path)?;
        }

        let url = format!("sqlite:{}", path.display());
        let pool = SqlitePool::connect(&url)
            .await
            .context("Failed to open sales database")?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::query("PRAGMA busy_timeout=5000")
            .execute(&pool)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            "
            -- Sales ledger (insertion order is rowid order)
            CREATE TABLE IF NOT EXISTS sales (
                id TEXT PRIMARY KEY,
                customer TEXT NOT NULL,
                product_name TEXT NOT NULL,
                quantity REAL NOT NULL,
                selling_price REAL NOT NULL,
                total_selling REAL NOT NULL,
                points INTEGER NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All sales in the order they were recorded
    pub async fn list_sales(&self) -> Result<Vec<SaleRecord>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            "SELECT id, customer, product_name, quantity, selling_price, total_selling, points, date
             FROM sales
             ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    pub async fn get_sale(&self, id: &str) -> Result<Option<SaleRecord>> {
        let row: Option<SaleRow> = sqlx::query_as(
            "SELECT id, customer, product_name, quantity, selling_price, total_selling, points, date
             FROM sales
             WHERE id = ?",
        )
        .bind(id.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleRecord::from))
    }

    /// Record a sale; a sale id can only be used once
    pub async fn add_sale(&self, sale: &SaleRecord) -> Result<()> {
        if self.get_sale(&sale.id).await?.is_some() {
            return Err(ValidationError::Duplicate(sale.id.clone()).into());
        }

        sqlx::query(
            "INSERT INTO sales (id, customer, product_name, quantity, selling_price, total_selling, points, date)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&sale.id)
        .bind(&sale.customer)
        .bind(&sale.product_name)
        .bind(sale.quantity)
        .bind(sale.selling_price)
        .bind(sale.total_selling)
        .bind(sale.points)
        .bind(&sale.date)
        .execute(&self.pool)
        .await?;

        tracing::info!(id = %sale.id, total = sale.total_selling, points = sale.points, "sale recorded");
        Ok(())
    }

    /// Delete a sale by id, returning whether it existed
    pub async fn delete_sale(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sales WHERE id = ?")
            .bind(id.trim())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every sale, returning how many were deleted
    pub async fn clear(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sales")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
