use crate::{MemoryConfig, MemoryRowSource, MemorySnapshot, source::Rows, statement::normalize};
use sluice_core::{Connection, Executor, Query, Relay, Result, Row, RowNames};
use std::{
    borrow::Cow,
    collections::HashMap,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Result of a statement: rows (`None` being an absence marker), then an optional failure
/// raised once they are all served.
#[derive(Debug, Clone)]
pub(crate) struct Canned {
    pub(crate) labels: RowNames,
    pub(crate) rows: Rows,
    pub(crate) failure: Option<String>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) config: MemoryConfig,
    pub(crate) registry: Mutex<HashMap<String, Canned>>,
    pub(crate) open_cursors: AtomicUsize,
    pub(crate) released_cursors: AtomicUsize,
    pub(crate) open_snapshots: AtomicUsize,
}

impl Shared {
    pub(crate) fn canned(&self, sql: &str) -> Option<Canned> {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&normalize(sql))
            .cloned()
    }
}

/// In-memory query execution service.
///
/// Every query runs on a fresh [`MemorySnapshot`], the returned source is that snapshot's
/// source wrapped in a [`Relay`] which also ends the snapshot when it is released.
#[derive(Debug, Clone)]
pub struct MemoryDatabase {
    pub(crate) shared: Arc<Shared>,
}

impl MemoryDatabase {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                registry: Default::default(),
                open_cursors: Default::default(),
                released_cursors: Default::default(),
                open_snapshots: Default::default(),
            }),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.shared.config
    }

    /// Open a read-only snapshot, it ends when dropped or on [`MemorySnapshot::end`].
    pub fn snapshot(&self) -> MemorySnapshot {
        MemorySnapshot::new(self.shared.clone())
    }

    /// Answer `sql` with `rows`, `None` entries are absence markers.
    pub fn register<L: Into<String>>(
        &self,
        sql: &str,
        labels: impl IntoIterator<Item = L>,
        rows: Vec<Option<Row>>,
    ) {
        self.insert(sql, labels, rows, None);
    }

    /// Answer `sql` with `rows` followed by an error carrying `message`.
    pub fn register_failure<L: Into<String>>(
        &self,
        sql: &str,
        labels: impl IntoIterator<Item = L>,
        rows: Vec<Option<Row>>,
        message: impl Into<String>,
    ) {
        self.insert(sql, labels, rows, Some(message.into()));
    }

    fn insert<L: Into<String>>(
        &self,
        sql: &str,
        labels: impl IntoIterator<Item = L>,
        rows: Vec<Option<Row>>,
        failure: Option<String>,
    ) {
        let canned = Canned {
            labels: labels.into_iter().map(Into::into).collect(),
            rows: Rows::listed(rows),
            failure,
        };
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(normalize(sql), canned);
    }

    /// Cursors handed out and not released yet.
    pub fn open_cursors(&self) -> usize {
        self.shared.open_cursors.load(Ordering::SeqCst)
    }

    pub fn released_cursors(&self) -> usize {
        self.shared.released_cursors.load(Ordering::SeqCst)
    }

    pub fn open_snapshots(&self) -> usize {
        self.shared.open_snapshots.load(Ordering::SeqCst)
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new(Default::default())
    }
}

impl Executor for MemoryDatabase {
    type Source = Relay<MemoryRowSource>;

    async fn execute(&mut self, query: Query) -> Result<Self::Source> {
        let mut snapshot = self.snapshot();
        let source = snapshot.execute(query).await?;
        Ok(Relay::with_closer(source, snapshot.into_closer()))
    }
}

impl Connection for MemoryDatabase {
    async fn connect(url: Cow<'static, str>) -> Result<Self> {
        let config = MemoryConfig::from_url(&url)?;
        log::debug!("Opened in-memory database `{}`", config.name);
        Ok(Self::new(config))
    }
}
