use sluice_core::{Error, ErrorContext, Result};
use url::Url;
use urlencoding::decode;

pub const SCHEME: &str = "memory";

/// Settings of a [`crate::MemoryDatabase`], read from its connection url:
/// `memory://<name>?page_size=<rows>&strict_types=<bool>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConfig {
    pub name: String,
    /// Rows served before the source yields to the scheduler.
    pub page_size: usize,
    /// Validate every binding against its wire type before running a query.
    pub strict_types: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            name: "default".into(),
            page_size: 16,
            strict_types: true,
        }
    }
}

impl MemoryConfig {
    pub fn from_url(url: &str) -> Result<Self> {
        let context = || format!("While trying to connect to `{}`", url);
        let decoded = decode(url).with_context(context)?;
        let prefix = format!("{}://", SCHEME);
        if !decoded.starts_with(&prefix) {
            let error = Error::msg(format!(
                "Memory connection url must start with `{}`",
                &prefix
            ))
            .context(context());
            log::error!("{:#}", error);
            return Err(error);
        }
        let url = Url::parse(&decoded).with_context(context)?;
        let mut config = MemoryConfig::default();
        if let Some(name) = url.host_str().filter(|v| !v.is_empty()) {
            config.name = name.into();
        }
        for (key, value) in url.query_pairs() {
            match &*key {
                "page_size" => {
                    config.page_size = value
                        .parse::<usize>()
                        .ok()
                        .filter(|v| *v > 0)
                        .ok_or_else(|| {
                            Error::msg(format!(
                                "`page_size` must be a positive integer, found `{value}`"
                            ))
                        })
                        .with_context(context)?;
                }
                "strict_types" => {
                    config.strict_types = value
                        .parse()
                        .map_err(|_| {
                            Error::msg(format!("`strict_types` must be a boolean, found `{value}`"))
                        })
                        .with_context(context)?;
                }
                _ => {
                    let error = Error::msg(format!("Unknown connection parameter `{key}`"))
                        .context(context());
                    log::error!("{:#}", error);
                    return Err(error);
                }
            }
        }
        Ok(config)
    }
}
