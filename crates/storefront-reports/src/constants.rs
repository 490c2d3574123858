//! Centralized constants for the store reporting client
//!
//! Endpoint paths are fixed by the backend. Deployment-specific values
//! (base URL, timeouts, page size) are loaded from config.toml.

// =============================================================================
// API Endpoints
// =============================================================================

/// Default backend base URL (the store backend's development server)
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

pub const SUPPLIERS_PATH: &str = "/api/suppliers";
pub const CUSTOMERS_PATH: &str = "/api/customers";
pub const PRODUCTS_PATH: &str = "/api/products";
pub const PURCHASES_PATH: &str = "/api/purchases";
pub const EXPENSES_PATH: &str = "/api/expenses";
pub const PROFIT_PATH: &str = "/api/profit_of_sales";
pub const ADD_PURCHASE_PATH: &str = "/api/add_purchase";
pub const CHART_DATA_PATH: &str = "/api/chart_data";
pub const EXPORT_CSV_PATH: &str = "/api/export_csv";
pub const DASHBOARD_STATS_PATH: &str = "/api/dashboard-stats";

/// Purchase update endpoint (append purchase id)
pub const UPDATE_PURCHASE_PREFIX: &str = "/api/update_purchase/";

/// Purchase delete endpoint (append purchase id)
pub const DELETE_PURCHASE_PREFIX: &str = "/api/delete_purchase/";

/// Request timeout when config.toml does not set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Reporting
// =============================================================================

/// Default report window: the last 30 days, both ends inclusive
pub const DEFAULT_RANGE_DAYS: i64 = 30;

/// Longest configurable report window (about ten years)
pub const MAX_RANGE_DAYS: i64 = 3650;

/// Rows per page in terminal tables
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Number of entries shown in the "recent expenses" list
pub const RECENT_EXPENSES: usize = 3;

/// Payment status counted as an open order
pub const STATUS_PENDING: &str = "Pending";

/// Payment status counted as a completed order
pub const STATUS_PAID: &str = "Paid";

/// Delivery status given to new purchases
pub const STATUS_NOT_DELIVERED: &str = "Not Delivered";

// =============================================================================
// Sales Ledger
// =============================================================================

/// One loyalty point is earned for every this many currency units spent
pub const POINTS_UNIT: f64 = 100.0;

/// Currency symbol used when printing amounts
pub const CURRENCY_SYMBOL: &str = "₹";

// =============================================================================
// File Names
// =============================================================================

/// Sales ledger database filename
pub const SALES_DB_FILENAME: &str = "sales.sqlite";

/// Filtered purchase report CSV filename
pub const PURCHASES_REPORT_FILENAME: &str = "purchases_report.csv";

/// Filtered expense report CSV filename
pub const EXPENSES_REPORT_FILENAME: &str = "expenses_report.csv";

/// Default filename for the backend's purchase export
pub const PURCHASE_EXPORT_FILENAME: &str = "purchases_export.csv";
