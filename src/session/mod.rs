// src/session/mod.rs
//
// State owned by whatever drives the pipeline (the CLI here): the current
// table, the query, and bookkeeping for refreshes. The pipeline functions
// themselves stay pure; everything mutable lives in `Session`.

pub mod debounce;

pub use debounce::Debouncer;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::error::{Result, TenderError};
use crate::export::export_csv;
use crate::process::{Record, Table};
use crate::query::{run_query, QueryState, SortSpec};
use crate::schema::LogicalField;

/// Generation number handed out when a fetch starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The result replaced the table.
    Installed { rows: usize },
    /// A newer fetch was started or installed; the result was dropped.
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    table: Table,
    query: QueryState,
    last_refreshed: Option<DateTime<Local>>,
    last_error: Option<String>,
    started: u64,
    installed: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(query: QueryState) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// Register a new fetch. Any ticket issued earlier becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.started += 1;
        debug!(generation = self.started, "fetch started");
        FetchTicket(self.started)
    }

    /// Hand the result of a fetch back to the session. Only the most recently
    /// started fetch may install a table; on failure the current table stays.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<String>,
    ) -> Result<FetchOutcome> {
        if ticket.0 < self.started || ticket.0 <= self.installed {
            debug!(
                generation = ticket.generation(),
                latest = self.started,
                "dropping superseded fetch result"
            );
            return Ok(FetchOutcome::Stale);
        }

        match fetched.and_then(|text| Table::from_csv(&text)) {
            Ok(table) => {
                let rows = table.len();
                self.install(ticket, table);
                Ok(FetchOutcome::Installed { rows })
            }
            Err(err) => {
                warn!(generation = ticket.generation(), error = %err, "refresh failed; keeping previous table");
                self.last_error = Some(user_message(&err));
                Err(err)
            }
        }
    }

    fn install(&mut self, ticket: FetchTicket, table: Table) {
        info!(generation = ticket.generation(), rows = table.len(), "table installed");
        self.table = table;
        self.installed = ticket.0;
        self.last_refreshed = Some(Local::now());
        self.last_error = None;
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub fn clear_search(&mut self) {
        self.query.clear_search();
    }

    pub fn toggle_sort(&mut self, field: LogicalField) -> Result<SortSpec> {
        self.query.toggle_sort(field)
    }

    pub fn clear_sort(&mut self) {
        self.query.clear_sort();
    }

    /// Sorted, filtered records for display.
    pub fn view(&self) -> Vec<&Record> {
        run_query(&self.table, &self.query)
    }

    /// Export of exactly what `view` shows.
    pub fn export(&self) -> String {
        export_csv(self.view())
    }
}

/// Text shown to the user for a failed refresh.
pub fn user_message(err: &TenderError) -> String {
    format!("Could not fetch CSV: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tracing_subscriber::EnvFilter;

    fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,tenderfeed=debug")),
            )
            .with_test_writer()
            .try_init();
    }

    const FEED_A: &str = "title-en,publicationDate\nBridge,2024-01-02\nAirport,2024-01-01\n";
    const FEED_B: &str = "title-en\nHarbour\n";

    fn net_err() -> TenderError {
        TenderError::Fetch {
            url: "http://feed".into(),
            message: "connection refused".into(),
        }
    }

    #[test]
    fn successful_fetch_installs_table() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        let t = s.begin_fetch();
        assert_eq!(
            s.complete_fetch(t, Ok(FEED_A.into()))?,
            FetchOutcome::Installed { rows: 2 }
        );
        assert_eq!(s.table().len(), 2);
        assert!(s.last_refreshed().is_some());
        assert!(s.last_error().is_none());
        Ok(())
    }

    #[test]
    fn failed_fetch_keeps_previous_table() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        let t = s.begin_fetch();
        s.complete_fetch(t, Ok(FEED_A.into()))?;
        let refreshed = s.last_refreshed();

        let t = s.begin_fetch();
        let err = s.complete_fetch(t, Err(net_err())).unwrap_err();
        assert!(err.is_fetch());
        assert_eq!(s.table().len(), 2);
        assert_eq!(s.last_refreshed(), refreshed);
        assert!(s
            .last_error()
            .is_some_and(|m| m.starts_with("Could not fetch CSV:")));

        // a later success clears the message
        let t = s.begin_fetch();
        s.complete_fetch(t, Ok(FEED_B.into()))?;
        assert!(s.last_error().is_none());
        Ok(())
    }

    #[test]
    fn unparsable_text_keeps_previous_table() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        let t = s.begin_fetch();
        s.complete_fetch(t, Ok(FEED_A.into()))?;

        let t = s.begin_fetch();
        let err = s.complete_fetch(t, Ok(String::new())).unwrap_err();
        assert!(matches!(err, TenderError::Parse(_)));
        assert_eq!(s.table().len(), 2);
        Ok(())
    }

    #[test]
    fn slow_older_fetch_is_dropped() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        let old = s.begin_fetch();
        let new = s.begin_fetch();

        assert_eq!(
            s.complete_fetch(new, Ok(FEED_B.into()))?,
            FetchOutcome::Installed { rows: 1 }
        );
        assert_eq!(s.complete_fetch(old, Ok(FEED_A.into()))?, FetchOutcome::Stale);
        assert_eq!(
            s.table().records()[0].get(LogicalField::Title),
            "Harbour"
        );
        Ok(())
    }

    #[test]
    fn superseded_fetch_dropped_even_if_it_finishes_first() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        let old = s.begin_fetch();
        let _pending = s.begin_fetch();
        assert_eq!(s.complete_fetch(old, Ok(FEED_A.into()))?, FetchOutcome::Stale);
        assert!(s.table().is_empty());
        Ok(())
    }

    #[test]
    fn query_survives_refresh() -> Result<()> {
        init_test_tracing();
        let mut s = Session::new();
        s.toggle_sort(LogicalField::Title)?;
        s.set_search("r");

        let t = s.begin_fetch();
        s.complete_fetch(t, Ok(FEED_A.into()))?;
        let titles: Vec<_> = s.view().iter().map(|r| r.get(LogicalField::Title)).collect();
        assert_eq!(titles, vec!["Airport", "Bridge"]);

        let t = s.begin_fetch();
        s.complete_fetch(t, Ok(FEED_B.into()))?;
        assert_eq!(s.query().search(), "r");
        assert_eq!(s.view().len(), 1);

        assert!(s.export().starts_with("Title,"));

        s.clear_sort();
        assert!(s.query().sort().is_none());
        assert_eq!(s.query().search(), "r");
        Ok(())
    }
}
