use crate::{Result, SluiceError};
use std::{
    fmt::{self, Debug, Formatter},
    sync::{Arc, Mutex, PoisonError},
};

type Release = Box<dyn FnOnce() -> Result<()> + Send>;

/// Handle releasing a resource exactly once.
///
/// Clones share the same resource. Whichever clone calls [`Closer::close`] first runs the
/// release routine, every other call (sequential or concurrent) returns `Ok(())` without
/// touching the resource again. A default `Closer` releases nothing but still goes from
/// open to closed.
#[derive(Clone)]
pub struct Closer {
    release: Arc<Mutex<Option<Release>>>,
}

impl Closer {
    pub fn new(release: impl FnOnce() -> Result<()> + Send + 'static) -> Self {
        Self {
            release: Arc::new(Mutex::new(Some(Box::new(release)))),
        }
    }

    /// Release the resource, a failure is reported as [`SluiceError::SourceDisposal`].
    pub fn close(&self) -> Result<()> {
        let release = self
            .release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match release {
            Some(release) => release().map_err(|e| SluiceError::SourceDisposal(e).into()),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.release
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl Default for Closer {
    fn default() -> Self {
        Self::new(|| Ok(()))
    }
}

impl Debug for Closer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closer")
            .field("closed", &self.is_closed())
            .finish()
    }
}
