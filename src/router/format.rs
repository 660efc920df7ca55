use crate::config::{Format, FormatTable};
use crate::error::{DispatchError, DispatchResult};
use tracing::debug;

/// Picks the response [`Format`] by name
#[derive(Debug, Clone, Copy)]
pub struct FormatNegotiator<'a> {
    table: &'a FormatTable,
}

impl<'a> FormatNegotiator<'a> {
    #[must_use]
    pub fn new(table: &'a FormatTable) -> Self {
        Self { table }
    }

    /// Exact match on `requested` when given, else on `default_format`.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Configuration`] when neither name is in the table.
    pub fn resolve(
        &self,
        requested: Option<&str>,
        default_format: &str,
    ) -> DispatchResult<&'a Format> {
        if let Some(format) = requested.and_then(|name| self.table.get(name)) {
            return Ok(format);
        }
        if let Some(name) = requested {
            debug!(requested = name, fallback = default_format, "format not declared, falling back");
        }
        self.table
            .get(default_format)
            .ok_or_else(|| DispatchError::configuration("default format matches no resolver"))
    }
}
