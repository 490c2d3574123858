//! Reporting screen state machine
//!
//! `Uninitialized → Loading → Ready | Error`. Every fetch is issued under a
//! ticket carrying a sequence number and the filters it was requested with.
//! A completed fetch is only applied if its ticket is the newest one issued
//! and the filters have not changed since, so a slow older response can
//! never overwrite a newer view.

use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::engine;
use crate::error::FetchError;
use crate::filters::{on_filter_change, FilterEvent, FilterState};
use crate::lookup::LookupCache;
use crate::models::{ExpenseRecord, ProfitRow, PurchaseRecord};
use crate::summary::{summarize, ReportSummary};

/// Raw collections from one round of report fetches
#[derive(Debug, Clone, Default)]
pub struct RawFeed {
    pub purchases: Vec<PurchaseRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub profit: Vec<ProfitRow>,
}

impl RawFeed {
    /// Fetch all three report collections; any failure fails the round
    pub async fn fetch(client: &ApiClient) -> Result<Self, FetchError> {
        Ok(Self {
            purchases: client.fetch_purchases().await?,
            expenses: client.fetch_expenses().await?,
            profit: client.fetch_profit_summary().await?,
        })
    }
}

/// Filtered rows and the summary computed from them
#[derive(Debug, Clone, Default)]
pub struct ReportView {
    pub filter: FilterState,
    pub purchases: Vec<PurchaseRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub profit: Vec<ProfitRow>,
    pub summary: ReportSummary,
}

impl ReportView {
    pub fn build(feed: &RawFeed, filter: &FilterState, cache: &LookupCache) -> Self {
        let purchases = engine::apply(&feed.purchases, filter, cache);
        let summary = summarize(&purchases);
        Self {
            filter: filter.clone(),
            expenses: engine::apply_expenses(&feed.expenses, filter),
            profit: feed.profit.clone(),
            purchases,
            summary,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum ScreenState {
    #[default]
    Uninitialized,
    /// A fetch is in flight; the previous view stays on screen
    Loading { previous: Option<ReportView> },
    Ready(ReportView),
    Error {
        message: String,
        previous: Option<ReportView>,
    },
}

impl ScreenState {
    /// The view that should currently be displayed, if any
    pub fn view(&self) -> Option<&ReportView> {
        match self {
            ScreenState::Uninitialized => None,
            ScreenState::Loading { previous } | ScreenState::Error { previous, .. } => {
                previous.as_ref()
            }
            ScreenState::Ready(view) => Some(view),
        }
    }

    fn into_view(self) -> Option<ReportView> {
        match self {
            ScreenState::Uninitialized => None,
            ScreenState::Loading { previous } | ScreenState::Error { previous, .. } => previous,
            ScreenState::Ready(view) => Some(view),
        }
    }
}

/// Identifies one fetch and the filters it was requested under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    filter: FilterState,
}

impl FetchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Result of handing a completed fetch back to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// A newer fetch was issued or the filters changed; the response was dropped
    Stale,
}

#[derive(Debug, Default)]
pub struct ReportScreen {
    state: ScreenState,
    filter: FilterState,
    cache: LookupCache,
    cache_loaded: bool,
    issued: u64,
}

impl ReportScreen {
    pub fn new(filter: FilterState) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    pub fn set_cache(&mut self, cache: LookupCache) {
        self.cache = cache;
        self.cache_loaded = true;
    }

    /// Enter `Loading` and issue a ticket for the fetch about to start
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        let previous = std::mem::take(&mut self.state).into_view();
        self.state = ScreenState::Loading { previous };
        FetchTicket {
            seq: self.issued,
            filter: self.filter.clone(),
        }
    }

    /// Apply a filter edit; the caller must fetch under the returned ticket
    pub fn change_filter(&mut self, event: FilterEvent) -> FetchTicket {
        self.filter = on_filter_change(&self.filter, event);
        self.begin_fetch()
    }

    /// Leave `Error` by starting a new fetch
    pub fn retry(&mut self) -> FetchTicket {
        self.begin_fetch()
    }

    /// Hand back a finished fetch.
    ///
    /// Responses for superseded tickets are discarded without touching the
    /// state. Failures move the screen to `Error`, keeping the last view.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<RawFeed, FetchError>,
    ) -> FetchOutcome {
        if ticket.seq != self.issued || ticket.filter != self.filter {
            tracing::debug!(
                ticket = ticket.seq,
                latest = self.issued,
                "discarding stale report response"
            );
            return FetchOutcome::Stale;
        }

        let previous = std::mem::take(&mut self.state).into_view();
        match result {
            Ok(feed) => {
                let view = ReportView::build(&feed, &self.filter, &self.cache);
                if view.purchases.is_empty() && self.filter.supplier_id.is_some() {
                    tracing::debug!("selected supplier matches no purchases under current filters");
                }
                self.state = ScreenState::Ready(view);
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("report fetch failed: {}", e);
                self.state = ScreenState::Error {
                    message: e.to_string(),
                    previous,
                };
                FetchOutcome::Failed
            }
        }
    }

    /// Load the lookup cache if this is the first load, then fetch and apply.
    ///
    /// Lookup failures also land in `Error`.
    pub async fn refresh(&mut self, client: &ApiClient) -> FetchOutcome {
        let ticket = self.begin_fetch();

        if !self.cache_loaded {
            match LookupCache::load(client).await {
                Ok(cache) => self.set_cache(cache),
                Err(e) => return self.complete_fetch(&ticket, Err(e)),
            }
        }

        let result = RawFeed::fetch(client).await;
        self.complete_fetch(&ticket, result)
    }

    /// Drop the lookup cache and start over with default filters
    pub async fn reload(&mut self, client: &ApiClient, today: NaiveDate) -> FetchOutcome {
        self.filter = on_filter_change(&self.filter, FilterEvent::Reset { today });
        self.cache = LookupCache::default();
        self.cache_loaded = false;
        self.refresh(client).await
    }
}
