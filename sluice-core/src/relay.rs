use crate::{Closer, Pull, Result, RowSource};

/// [`RowSource`] forwarding another one unchanged.
///
/// Every item of the inner source reaches the consumer, in order, absence markers included:
/// only [`Pull::End`] ends the relay. Relays stack (`Relay<Relay<S>>`) without changing what
/// the consumer observes.
///
/// The relay owns its inner source. It closes it exactly once: when the end is reached,
/// when the inner source fails (after everything produced before the failure has been
/// forwarded), on [`RowSource::close`] and on drop. Its own optional [`Closer`] runs right
/// after the inner source is closed.
pub struct Relay<S: RowSource> {
    inner: S,
    closer: Closer,
    finished: bool,
    closed: bool,
}

impl<S: RowSource> Relay<S> {
    pub fn new(inner: S) -> Self {
        Self::with_closer(inner, Default::default())
    }

    /// Relay that additionally releases `closer` once the inner source is closed.
    pub fn with_closer(inner: S, closer: Closer) -> Self {
        Self {
            inner,
            closer,
            finished: false,
            closed: false,
        }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn release(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        log::debug!("Releasing the relayed row source");
        let inner = self.inner.close();
        let own = self.closer.close();
        match (inner, own) {
            (Err(e), Err(other)) => {
                log::error!("{:#}", other);
                Err(e)
            }
            (inner, own) => inner.and(own),
        }
    }
}

impl<S: RowSource> RowSource for Relay<S> {
    async fn pull(&mut self) -> Result<Pull> {
        if self.finished {
            return Ok(Pull::End);
        }
        match self.inner.pull().await {
            Ok(Pull::End) => {
                self.finished = true;
                self.release()?;
                Ok(Pull::End)
            }
            Ok(pulled) => Ok(pulled),
            Err(e) => {
                self.finished = true;
                if let Err(e) = self.release() {
                    log::error!("{:#}", e);
                }
                Err(e)
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.finished = true;
        self.release()
    }
}

impl<S: RowSource> Drop for Relay<S> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::error!("{:#}", e);
        }
    }
}

/// Wrap `inner` in a [`Relay`].
pub fn relay<S: RowSource>(inner: S) -> Relay<S> {
    Relay::new(inner)
}
