use crate::{
    MemoryRowSource,
    database::{Canned, Shared},
    source::Rows,
    statement::Statement,
};
use sluice_core::{BindingSet, Closer, Error, Executor, Query, Result, Row, Value};
use std::{
    mem,
    sync::{Arc, atomic::Ordering},
};

/// Read-only view of a [`crate::MemoryDatabase`], executing queries as bare sources.
#[derive(Debug)]
pub struct MemorySnapshot {
    shared: Arc<Shared>,
    closer: Closer,
}

impl MemorySnapshot {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        shared.open_snapshots.fetch_add(1, Ordering::SeqCst);
        let closer = {
            let shared = shared.clone();
            Closer::new(move || {
                shared.open_snapshots.fetch_sub(1, Ordering::SeqCst);
                log::debug!("Snapshot ended");
                Ok(())
            })
        };
        Self { shared, closer }
    }

    /// End the snapshot, further queries fail. Calling it again does nothing.
    pub fn end(&mut self) -> Result<()> {
        self.closer.close()
    }

    pub fn is_ended(&self) -> bool {
        self.closer.is_closed()
    }

    /// Hand the responsibility of ending the snapshot to the returned closer.
    pub(crate) fn into_closer(mut self) -> Closer {
        mem::take(&mut self.closer)
    }

    fn evaluate(&self, query: &Query) -> Result<Canned> {
        let strict = self.shared.config.strict_types;
        if strict {
            validate(&query.bindings)?;
        }
        if let Some(canned) = self.shared.canned(&query.sql) {
            return Ok(canned);
        }
        Ok(match Statement::parse(&query.sql)? {
            Statement::GenerateArray { column, start, end } => Canned {
                labels: vec![column].into(),
                rows: Rows::Generated(start..=end),
                failure: None,
            },
            Statement::Parameter {
                param,
                field,
                alias,
            } => {
                let binding = query.bindings.get(&param).ok_or_else(|| {
                    Error::msg(format!("No value bound for parameter `@{param}`"))
                })?;
                let value = if strict {
                    binding.encoded().decode_at(&param, binding.ty())?
                } else {
                    binding.value().clone()
                };
                let value = match field {
                    None => value,
                    Some(field) => {
                        let missing = || {
                            Error::msg(format!(
                                "`@{param}` of type {} has no field `{field}`",
                                binding.ty()
                            ))
                        };
                        match value {
                            Value::Struct(Some(record)) => {
                                record.get(&field).cloned().ok_or_else(missing)?
                            }
                            Value::Struct(None) => binding
                                .ty()
                                .field(&field)
                                .map(|f| f.ty.empty_value())
                                .ok_or_else(missing)?,
                            _ => return Err(missing()),
                        }
                    }
                };
                Canned {
                    labels: vec![alias].into(),
                    rows: Rows::listed(vec![Some(Row::from(vec![value]))]),
                    failure: None,
                }
            }
        })
    }
}

/// Read every binding back through its wire type, as the service would before planning.
fn validate(bindings: &BindingSet) -> Result<()> {
    for (name, binding) in bindings.iter() {
        binding.encoded().decode_at(name, binding.ty())?;
    }
    Ok(())
}

impl Executor for MemorySnapshot {
    type Source = MemoryRowSource;

    async fn execute(&mut self, query: Query) -> Result<Self::Source> {
        if self.is_ended() {
            let error = Error::msg("The snapshot has already ended");
            log::error!("{:#}", error);
            return Err(error);
        }
        log::debug!("Executing on `{}`: {}", self.shared.config.name, query);
        let canned = self.evaluate(&query).map_err(|e| {
            let e = e.context(format!("While running the query:\n{}", query));
            log::error!("{:#}", e);
            e
        })?;
        Ok(MemoryRowSource::new(&self.shared, canned))
    }
}

impl Drop for MemorySnapshot {
    fn drop(&mut self) {
        if let Err(e) = self.end() {
            log::error!("{:#}", e);
        }
    }
}
