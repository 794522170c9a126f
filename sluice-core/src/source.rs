use crate::{Closer, Relay, Result, RowLabeled};
use async_stream::try_stream;
use futures::{Stream, StreamExt, stream::BoxStream};
use std::future::Future;

/// Outcome of one pull on a [`RowSource`].
///
/// `Absent` is an item of the sequence (a row slot with no payload), it is never the end.
#[derive(Debug, Clone, PartialEq)]
pub enum Pull {
    Row(RowLabeled),
    Absent,
    End,
}

impl Pull {
    pub fn is_end(&self) -> bool {
        matches!(self, Pull::End)
    }
    /// Item view: `None` at the end, `Some(None)` for an absence marker.
    pub fn into_item(self) -> Option<Option<RowLabeled>> {
        match self {
            Pull::Row(row) => Some(Some(row)),
            Pull::Absent => Some(None),
            Pull::End => None,
        }
    }
}

impl From<Option<RowLabeled>> for Pull {
    fn from(value: Option<RowLabeled>) -> Self {
        match value {
            Some(row) => Pull::Row(row),
            None => Pull::Absent,
        }
    }
}

/// Producer of query result rows, pulled one item at a time.
///
/// `close` releases the underlying resources (buffers, server side cursors). It must be
/// idempotent: the release happens at most once however many times it is called.
pub trait RowSource: Send {
    fn pull(&mut self) -> impl Future<Output = Result<Pull>> + Send;
    fn close(&mut self) -> Result<()>;
}

pub trait RowSourceExt: RowSource + Sized {
    /// Wrap in one more [`Relay`] layer.
    fn relay(self) -> Relay<Self> {
        Relay::new(self)
    }

    /// Consume the source as a stream of items, `Ok(None)` being an absence marker.
    ///
    /// The source is closed when it reports the end or an error. If the stream is dropped
    /// earlier, the source is dropped with it: wrap it in a [`Relay`] first to have it
    /// closed in that case too.
    fn into_stream(mut self) -> impl Stream<Item = Result<Option<RowLabeled>>> + Send {
        try_stream! {
            loop {
                let pulled = match self.pull().await {
                    Ok(pulled) => pulled,
                    Err(e) => {
                        if let Err(e) = self.close() {
                            log::error!("{:#}", e);
                        }
                        Err(e)?
                    }
                };
                match pulled {
                    Pull::Row(row) => yield Some(row),
                    Pull::Absent => yield None,
                    Pull::End => break,
                }
            }
            self.close()?;
        }
    }
}

impl<S: RowSource> RowSourceExt for S {}

/// [`RowSource`] reading from a stream of items, `Ok(None)` being an absence marker.
pub struct StreamSource {
    stream: Option<BoxStream<'static, Result<Option<RowLabeled>>>>,
    closer: Closer,
}

impl StreamSource {
    pub fn new(stream: impl Stream<Item = Result<Option<RowLabeled>>> + Send + 'static) -> Self {
        Self {
            stream: Some(stream.boxed()),
            closer: Default::default(),
        }
    }
    /// Release routine run when the source is closed.
    pub fn with_closer(mut self, closer: Closer) -> Self {
        self.closer = closer;
        self
    }
}

impl RowSource for StreamSource {
    async fn pull(&mut self) -> Result<Pull> {
        let Some(stream) = &mut self.stream else {
            return Ok(Pull::End);
        };
        let item = stream.next().await;
        match item {
            Some(item) => item.map(Into::into),
            None => {
                self.stream = None;
                Ok(Pull::End)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.stream = None;
        self.closer.close()
    }
}

impl Drop for StreamSource {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("{:#}", e);
        }
    }
}
