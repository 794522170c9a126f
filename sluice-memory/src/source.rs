use crate::database::{Canned, Shared};
use sluice_core::{Closer, Error, Pull, Result, Row, RowLabeled, RowNames, RowSource, Value};
use std::{
    ops::RangeInclusive,
    sync::{Arc, atomic::Ordering},
    vec,
};
use tokio::task::yield_now;

/// Items of a result, either stored or produced on demand.
#[derive(Debug, Clone)]
pub(crate) enum Rows {
    Listed(vec::IntoIter<Option<Row>>),
    /// Single `INT64` column counting through the range.
    Generated(RangeInclusive<i64>),
}

impl Rows {
    pub(crate) fn listed(rows: Vec<Option<Row>>) -> Self {
        Rows::Listed(rows.into_iter())
    }

    fn remaining(&self) -> usize {
        match self {
            Rows::Listed(rows) => rows.len(),
            Rows::Generated(range) if range.is_empty() => 0,
            Rows::Generated(range) => {
                let len = *range.end() as i128 - *range.start() as i128 + 1;
                usize::try_from(len).unwrap_or(usize::MAX)
            }
        }
    }
}

impl Iterator for Rows {
    type Item = Option<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Rows::Listed(rows) => rows.next(),
            Rows::Generated(range) => range
                .next()
                .map(|i| Some(Row::from(vec![Value::Int64(Some(i))]))),
        }
    }
}

/// Server side cursor over the rows of one query.
///
/// Rows are served in pages of `page_size`, the source yields to the scheduler between
/// pages. The cursor is released once, on close or drop, whichever comes first.
#[derive(Debug)]
pub struct MemoryRowSource {
    labels: RowNames,
    rows: Rows,
    failure: Option<String>,
    page_size: usize,
    served: usize,
    closer: Closer,
}

impl MemoryRowSource {
    pub(crate) fn new(shared: &Arc<Shared>, canned: Canned) -> Self {
        shared.open_cursors.fetch_add(1, Ordering::SeqCst);
        let closer = {
            let shared = shared.clone();
            Closer::new(move || {
                shared.open_cursors.fetch_sub(1, Ordering::SeqCst);
                shared.released_cursors.fetch_add(1, Ordering::SeqCst);
                log::debug!("Cursor released");
                Ok(())
            })
        };
        Self {
            labels: canned.labels,
            rows: canned.rows,
            failure: canned.failure,
            page_size: shared.config.page_size.max(1),
            served: 0,
            closer,
        }
    }

    /// Handle releasing this cursor, shared with the source itself.
    pub fn closer(&self) -> Closer {
        self.closer.clone()
    }

    /// Items not served yet.
    pub fn remaining(&self) -> usize {
        self.rows.remaining()
    }
}

impl RowSource for MemoryRowSource {
    async fn pull(&mut self) -> Result<Pull> {
        if self.closer.is_closed() {
            return Ok(Pull::End);
        }
        if self.served > 0 && self.served % self.page_size == 0 && self.rows.remaining() > 0 {
            yield_now().await;
        }
        match self.rows.next() {
            Some(row) => {
                self.served += 1;
                Ok(match row {
                    Some(values) => Pull::Row(RowLabeled::new(self.labels.clone(), values)),
                    None => Pull::Absent,
                })
            }
            None => match self.failure.take() {
                Some(message) => Err(Error::msg(message)),
                None => Ok(Pull::End),
            },
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closer.close()
    }
}

impl Drop for MemoryRowSource {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("{:#}", e);
        }
    }
}
