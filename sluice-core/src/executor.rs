use crate::{
    Query, Result, RowLabeled, RowSource, RowSourceExt,
    stream::{Stream, TryStreamExt},
};
use futures::TryFutureExt;
use std::future::Future;

/// Query execution service.
pub trait Executor: Send {
    type Source: RowSource;

    /// Submit the query and return the source of its rows.
    fn execute(&mut self, query: Query) -> impl Future<Output = Result<Self::Source>> + Send;

    /// Execute the query and stream its items through a [`crate::Relay`].
    ///
    /// `Ok(None)` items are absence markers and count as items. Dropping the stream early
    /// releases the source.
    fn run_stream(
        &mut self,
        query: Query,
    ) -> impl Stream<Item = Result<Option<RowLabeled>>> + Send {
        async move {
            let source = self.execute(query).await?;
            Ok::<_, crate::Error>(source.relay().into_stream())
        }
        .try_flatten_stream()
    }

    /// Execute the query and collect every item.
    fn run(
        &mut self,
        query: Query,
    ) -> impl Future<Output = Result<Vec<Option<RowLabeled>>>> + Send {
        self.run_stream(query).try_collect()
    }
}
