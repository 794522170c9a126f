use crate::{Executor, Result};
use std::{borrow::Cow, future::Future};

pub trait Connection: Executor + Sized {
    /// Open the service described by `url`, configuration travels in its query string.
    fn connect(url: Cow<'static, str>) -> impl Future<Output = Result<Self>>;
}
