//! Storefront Reports
//!
//! Admin client for a small retail/inventory store backend. The core is the
//! report engine: purchases, expenses and profit rows are fetched from the
//! backend, joined against a session lookup cache, narrowed by the user's
//! filters and reduced to summary figures.

pub mod api;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod expenses;
pub mod filters;
pub mod lookup;
pub mod models;
pub mod purchases;
pub mod render;
pub mod sales;
pub mod screen;
pub mod summary;

use std::sync::Once;

pub use api::ApiClient;
pub use config::{Config, FileConfig};
pub use error::{FetchError, ValidationError};
pub use filters::{on_filter_change, FilterEvent, FilterState};
pub use lookup::LookupCache;
pub use models::RecordId;
pub use screen::{FetchOutcome, ReportScreen, ScreenState};
pub use summary::{summarize, ReportSummary};

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info, or debug
/// with `verbose`.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let default = if verbose {
            "storefront_reports=debug"
        } else {
            "storefront_reports=info"
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    });
}
