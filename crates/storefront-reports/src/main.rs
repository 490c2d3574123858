//! Storefront Reports CLI
//!
//! Terminal front end for the store backend: filtered purchase reports,
//! purchase and expense management, profit and dashboard views, and the
//! local sales ledger.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};

use storefront_reports::api::ApiClient;
use storefront_reports::config::{Config, FileConfig};
use storefront_reports::constants;
use storefront_reports::error::FetchError;
use storefront_reports::expenses::ExpenseForm;
use storefront_reports::filters::{on_filter_change, FilterEvent, FilterState};
use storefront_reports::lookup::LookupCache;
use storefront_reports::models::RecordId;
use storefront_reports::purchases::{PurchaseForm, PurchaseQuery};
use storefront_reports::render::{self, SortKey};
use storefront_reports::sales::{self, SaleForm, SalesStore};
use storefront_reports::screen::{ReportScreen, ScreenState};
use storefront_reports::summary;

/// Width of text bar charts, in columns
const CHART_WIDTH: usize = 40;

#[derive(Parser, Debug)]
#[command(name = "storefront-reports")]
#[command(about = "Reports and admin tasks for the store backend")]
struct Args {
    /// Config file path
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Backend base URL (overrides config.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Data directory for the sales ledger
    #[arg(short, long, default_value = "./data", global = true)]
    data_dir: PathBuf,

    /// Output directory for generated CSV reports
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered purchase report with summary totals
    Report(ReportArgs),

    /// Show suppliers, customers, products and categories
    Lookups,

    /// Manage purchases
    Purchases {
        #[command(subcommand)]
        action: PurchaseCommand,
    },

    /// Manage expenses
    Expenses {
        #[command(subcommand)]
        action: ExpenseCommand,
    },

    /// Profit of sales by period
    Profit,

    /// Home dashboard counters
    Dashboard,

    /// Local sales ledger
    Sales {
        #[command(subcommand)]
        action: SalesCommand,
    },
}

#[derive(ClapArgs, Debug)]
struct ReportArgs {
    /// Supplier category
    #[arg(long)]
    category: Option<String>,

    /// Supplier ID
    #[arg(long)]
    supplier: Option<String>,

    /// Product ID
    #[arg(long)]
    product: Option<String>,

    /// Start date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    from: Option<String>,

    /// End date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    to: Option<String>,

    /// Ignore the default date window
    #[arg(long)]
    all_dates: bool,

    /// Page of the purchase table to show (1-based)
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Sort column: date, amount, supplier or invoice, optionally suffixed with :desc
    #[arg(long)]
    sort: Option<String>,

    /// Also write the filtered rows to CSV in the output directory
    #[arg(long)]
    csv: bool,
}

#[derive(Subcommand, Debug)]
enum PurchaseCommand {
    /// List purchases
    List {
        /// Search supplier, product and invoice number
        #[arg(long)]
        search: Option<String>,

        /// Payment or delivery status (e.g. "Paid", "Delivered")
        #[arg(long)]
        status: Option<String>,
    },

    /// Add a new purchase
    Add(PurchaseFields),

    /// Update an existing purchase
    Update {
        /// Purchase ID
        id: String,

        #[command(flatten)]
        fields: PurchaseFields,
    },

    /// Delete a purchase by ID
    Delete {
        /// Purchase ID
        id: String,
    },

    /// Monthly purchase totals as a bar chart
    Chart,

    /// Save the backend's purchase CSV export
    Export {
        /// Path to output CSV file (default: <output-dir>/purchases_export.csv)
        file: Option<PathBuf>,
    },
}

/// Purchase form fields; omitted fields keep their current or default value
#[derive(ClapArgs, Debug)]
struct PurchaseFields {
    /// Invoice number (blank lets the backend assign one)
    #[arg(long)]
    invoice_no: Option<String>,

    /// Supplier name
    #[arg(long)]
    supplier: Option<String>,

    /// Product name
    #[arg(long)]
    product: Option<String>,

    /// Quantity
    #[arg(long)]
    quantity: Option<String>,

    /// Unit price
    #[arg(long)]
    unit_price: Option<String>,

    /// Purchase date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<String>,

    /// Payment status: Pending or Paid
    #[arg(long)]
    payment_status: Option<String>,

    /// Delivery status: Not Delivered or Delivered
    #[arg(long)]
    delivery_status: Option<String>,

    /// Notes
    #[arg(long)]
    notes: Option<String>,
}

impl PurchaseFields {
    fn apply_to(self, form: &mut PurchaseForm) {
        let fields = [
            (self.invoice_no, &mut form.invoice_no),
            (self.supplier, &mut form.supplier),
            (self.product, &mut form.product),
            (self.quantity, &mut form.quantity),
            (self.unit_price, &mut form.unit_price),
            (self.date, &mut form.purchase_date),
            (self.payment_status, &mut form.payment_status),
            (self.delivery_status, &mut form.delivery_status),
            (self.notes, &mut form.notes),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum ExpenseCommand {
    /// List expenses with monthly totals
    List,

    /// Add a new expense
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Category (e.g. Rent, Utilities)
        #[arg(long)]
        category: String,

        /// Description
        #[arg(long)]
        description: String,

        /// Amount
        #[arg(long)]
        amount: String,
    },
}

#[derive(Subcommand, Debug)]
enum SalesCommand {
    /// List recorded sales
    List,

    /// Record a sale and print its bill
    Add {
        /// Sale / bill ID
        #[arg(long)]
        id: String,

        /// Customer name
        #[arg(long)]
        customer: String,

        /// Product name
        #[arg(long)]
        product: String,

        /// Quantity (kg)
        #[arg(long)]
        quantity: String,

        /// Selling price per kg
        #[arg(long)]
        price: String,
    },

    /// Delete a sale by ID
    Delete {
        /// Sale ID
        id: String,
    },

    /// Delete every recorded sale
    Clear,

    /// Print the bill for a sale
    Bill {
        /// Sale ID
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    storefront_reports::init_tracing(args.verbose);

    let file_config = FileConfig::load_or_default(&args.config)?;
    let config = Config::from_file(&file_config, args.base_url.clone())?;
    tracing::debug!(base_url = %config.base_url, "configuration loaded");

    let client = ApiClient::from_config(&config)?;

    match args.command {
        Command::Report(report) => run_report(&config, &client, report, &args.output_dir).await,
        Command::Lookups => show_lookups(&client).await,
        Command::Purchases { action } => {
            handle_purchase_command(action, &client, &args.output_dir).await
        }
        Command::Expenses { action } => handle_expense_command(action, &client).await,
        Command::Profit => show_profit(&client).await,
        Command::Dashboard => show_dashboard(&client).await,
        Command::Sales { action } => {
            // Sales live locally and need no backend
            std::fs::create_dir_all(&args.data_dir)?;
            let store = SalesStore::open(&args.data_dir.join(constants::SALES_DB_FILENAME)).await?;
            handle_sales_command(action, &store).await
        }
    }
}

/// Degrade a failed fetch to a "no data" message
fn or_no_data<T>(result: Result<T, FetchError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("failed to fetch {}: {}", what, e);
            println!("No {} available (backend unreachable or returned an error).", what);
            None
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Translate report flags into filter edits on top of the default window
fn report_filter(config: &Config, report: &ReportArgs) -> FilterState {
    let today = Local::now().date_naive();
    let mut filter = FilterState::with_range_days(today, config.default_range_days);

    let mut events = Vec::new();
    if report.all_dates {
        events.push(FilterEvent::SetDateFrom(String::new()));
        events.push(FilterEvent::SetDateTo(String::new()));
    }
    if let Some(category) = &report.category {
        events.push(FilterEvent::SetCategory(category.clone()));
    }
    if let Some(supplier) = &report.supplier {
        events.push(FilterEvent::SetSupplier(supplier.clone()));
    }
    if let Some(product) = &report.product {
        events.push(FilterEvent::SetProduct(product.clone()));
    }
    if let Some(from) = &report.from {
        events.push(FilterEvent::SetDateFrom(from.clone()));
    }
    if let Some(to) = &report.to {
        events.push(FilterEvent::SetDateTo(to.clone()));
    }

    for event in events {
        filter = on_filter_change(&filter, event);
    }
    filter
}

fn describe_filter(filter: &FilterState) -> String {
    let day = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "any".to_string())
    };
    format!(
        "category={} supplier={} product={} from={} to={}",
        filter.category_id.as_deref().unwrap_or("any"),
        filter.supplier_id.as_ref().map(RecordId::as_str).unwrap_or("any"),
        filter.product_id.as_ref().map(RecordId::as_str).unwrap_or("any"),
        day(filter.date_from),
        day(filter.date_to),
    )
}

async fn run_report(
    config: &Config,
    client: &ApiClient,
    report: ReportArgs,
    output_dir: &Path,
) -> Result<()> {
    let sort = report.sort.as_deref().map(str::parse::<SortKey>).transpose()?;
    let filter = report_filter(config, &report);

    println!("Purchase report ({})\n", describe_filter(&filter));

    let mut screen = ReportScreen::new(filter);
    screen.refresh(client).await;

    let view = match screen.state() {
        ScreenState::Ready(view) => view,
        ScreenState::Error { message, .. } => {
            println!("No data: {}", message);
            return Ok(());
        }
        ScreenState::Uninitialized | ScreenState::Loading { .. } => {
            println!("No data.");
            return Ok(());
        }
    };

    let choices = screen.filter().choices(screen.cache());
    tracing::debug!(
        suppliers = choices.suppliers.len(),
        products = choices.products.len(),
        "filter choices under current selection"
    );

    let mut rows = view.purchases.clone();
    if let Some(key) = sort {
        render::sort_purchases(&mut rows, key);
    }

    if rows.is_empty() {
        println!("No purchases match the current filters.");
    } else {
        let page = render::paginate(&rows, report.page, config.page_size);
        println!("{}", render::purchases_table(page.rows));
        println!("Page {} of {}\n", page.number, page.total_pages);
    }

    println!("=============================================");
    println!("Summary:");
    println!("=============================================");
    render::print_report_summary(&view.summary);
    render::print_status_counts(&summary::purchase_status_counts(&view.purchases));
    println!(
        "Expenses in range:  {}{:.2} ({} entries)",
        constants::CURRENCY_SYMBOL,
        summary::expense_total(&view.expenses),
        view.expenses.len()
    );
    if !view.profit.is_empty() {
        println!();
        render::print_profit_totals(&summary::profit_totals(&view.profit));
    }

    if report.csv {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        println!("\nWriting reports to {}:", output_dir.display());
        render::write_purchases_csv(output_dir, &rows)?;
        render::write_expenses_csv(output_dir, &view.expenses)?;
    }

    Ok(())
}

// =============================================================================
// Lookups, Profit, Dashboard
// =============================================================================

async fn show_lookups(client: &ApiClient) -> Result<()> {
    let Some(cache) = or_no_data(LookupCache::load(client).await, "lookup lists") else {
        return Ok(());
    };

    println!("Suppliers ({}):", cache.suppliers().len());
    println!("{}\n", render::suppliers_table(cache.suppliers()));
    println!("Customers ({}):", cache.customers().len());
    println!("{}\n", render::customers_table(cache.customers()));
    println!("Products ({}):", cache.products().len());
    println!("{}\n", render::products_table(cache.products()));

    let names: Vec<&str> = cache.categories().iter().map(|c| c.name.as_str()).collect();
    println!("Categories: {}", names.join(", "));
    Ok(())
}

async fn show_profit(client: &ApiClient) -> Result<()> {
    let Some(rows) = or_no_data(client.fetch_profit_summary().await, "profit summary") else {
        return Ok(());
    };

    if rows.is_empty() {
        println!("No profit data recorded.");
        return Ok(());
    }

    println!("{}\n", render::profit_table(&rows));
    render::print_profit_totals(&summary::profit_totals(&rows));
    Ok(())
}

async fn show_dashboard(client: &ApiClient) -> Result<()> {
    if let Some(stats) = or_no_data(client.fetch_dashboard_stats().await, "dashboard stats") {
        println!("{}", render::dashboard_text(&stats));
    }
    Ok(())
}

// =============================================================================
// Purchases
// =============================================================================

async fn find_purchase(client: &ApiClient, id: &RecordId) -> Result<PurchaseForm> {
    let purchases = client.fetch_purchases().await?;
    let record = purchases
        .iter()
        .find(|p| &p.id == id)
        .with_context(|| format!("Purchase #{} not found", id))?;
    Ok(PurchaseForm::from_record(record))
}

async fn handle_purchase_command(
    action: PurchaseCommand,
    client: &ApiClient,
    output_dir: &Path,
) -> Result<()> {
    match action {
        PurchaseCommand::List { search, status } => {
            let Some(purchases) = or_no_data(client.fetch_purchases().await, "purchases") else {
                return Ok(());
            };

            let query = PurchaseQuery { search, status };
            let matched = query.filter(&purchases);
            if matched.is_empty() {
                println!("No purchases found.");
            } else {
                println!("{}", render::purchases_table(matched.iter().copied()));
            }

            let counts = summary::purchase_status_counts(&purchases);
            println!("\n{} of {} purchase(s)", matched.len(), purchases.len());
            render::print_status_counts(&counts);
            Ok(())
        }

        PurchaseCommand::Add(fields) => {
            let mut form = PurchaseForm::new(Local::now().date_naive());
            fields.apply_to(&mut form);
            let payload = form.validate()?;

            client.add_purchase(&payload).await?;
            println!(
                "Added purchase: {} x {} from {}",
                payload.quantity, payload.product, payload.supplier
            );
            Ok(())
        }

        PurchaseCommand::Update { id, fields } => {
            let id = RecordId::new(id);
            let mut form = find_purchase(client, &id).await?;
            fields.apply_to(&mut form);
            let payload = form.validate()?;

            client.update_purchase(&id, &payload).await?;
            println!("Updated purchase #{}", id);
            Ok(())
        }

        PurchaseCommand::Delete { id } => {
            let id = RecordId::new(id);
            client.delete_purchase(&id).await?;
            println!("Deleted purchase #{}", id);
            Ok(())
        }

        PurchaseCommand::Chart => {
            if let Some(data) = or_no_data(client.fetch_chart_data().await, "chart data") {
                if data.labels.is_empty() {
                    println!("No purchase history to chart.");
                } else {
                    println!("{}", render::purchase_chart(&data, CHART_WIDTH));
                }
            }
            Ok(())
        }

        PurchaseCommand::Export { file } => {
            let path = match file {
                Some(path) => path,
                None => {
                    std::fs::create_dir_all(output_dir)?;
                    output_dir.join(constants::PURCHASE_EXPORT_FILENAME)
                }
            };
            let bytes = client.export_csv(&path).await?;
            println!("  Generated: {} ({} bytes)", path.display(), bytes);
            Ok(())
        }
    }
}

// =============================================================================
// Expenses
// =============================================================================

async fn handle_expense_command(action: ExpenseCommand, client: &ApiClient) -> Result<()> {
    match action {
        ExpenseCommand::List => {
            let Some(expenses) = or_no_data(client.fetch_expenses().await, "expenses") else {
                return Ok(());
            };

            if expenses.is_empty() {
                println!("No expenses recorded.");
                println!("\nUse 'storefront-reports expenses add' to add expenses");
                return Ok(());
            }

            println!("{}", render::expenses_table(&expenses));
            println!(
                "\nTotal: {}{:.2} across {} expense(s)\n",
                constants::CURRENCY_SYMBOL,
                summary::expense_total(&expenses),
                expenses.len()
            );

            println!("By month:");
            println!(
                "{}\n",
                render::expense_chart(&summary::expenses_by_month(&expenses), CHART_WIDTH)
            );

            println!("Recent:");
            println!("{}", render::expenses_table(summary::recent_expenses(&expenses)));
            Ok(())
        }

        ExpenseCommand::Add {
            date,
            category,
            description,
            amount,
        } => {
            let form = ExpenseForm {
                date,
                category,
                description,
                amount,
            };
            let payload = form.validate()?;

            client.add_expense(&payload).await?;
            println!(
                "Added expense: {} - {}{:.2}",
                payload.description,
                constants::CURRENCY_SYMBOL,
                payload.amount
            );
            Ok(())
        }
    }
}

// =============================================================================
// Sales
// =============================================================================

async fn handle_sales_command(action: SalesCommand, store: &SalesStore) -> Result<()> {
    match action {
        SalesCommand::List => {
            let sales = store.list_sales().await?;
            if sales.is_empty() {
                println!("No sales recorded.");
                println!("\nUse 'storefront-reports sales add' to record a sale");
            } else {
                println!("{}\n", render::sales_table(&sales));
                render::print_sales_summary(&sales::sales_summary(&sales));
            }
            Ok(())
        }

        SalesCommand::Add {
            id,
            customer,
            product,
            quantity,
            price,
        } => {
            let form = SaleForm {
                id,
                customer,
                product_name: product,
                quantity,
                selling_price: price,
            };
            let sale = form.into_sale(Local::now().naive_local())?;

            store.add_sale(&sale).await?;
            println!("{}", sales::render_bill(&sale));
            Ok(())
        }

        SalesCommand::Delete { id } => {
            if store.delete_sale(&id).await? {
                println!("Deleted sale #{}", id);
            } else {
                println!("Sale #{} not found", id);
            }
            Ok(())
        }

        SalesCommand::Clear => {
            let count = store.clear().await?;
            println!("Cleared {} sale(s)", count);
            Ok(())
        }

        SalesCommand::Bill { id } => {
            match store.get_sale(&id).await? {
                Some(sale) => println!("{}", sales::render_bill(&sale)),
                None => println!("Sale #{} not found", id),
            }
            Ok(())
        }
    }
}
