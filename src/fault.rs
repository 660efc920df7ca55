//! # Fault Module
//!
//! A [`Fault`] is the value the front controller reacts to: the error or panic
//! that escaped the host application. Routing keys on [`Fault::type_name`], so
//! the constructors take care to record the concrete runtime type of the error.
//!
//! ```rust
//! use faultroute::fault::Fault;
//!
//! #[derive(Debug)]
//! struct PathNotFound;
//! impl std::fmt::Display for PathNotFound {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "no such page")
//!     }
//! }
//! impl std::error::Error for PathNotFound {}
//!
//! let fault = Fault::from_error(PathNotFound);
//! assert!(fault.type_name().ends_with("PathNotFound"));
//! assert_eq!(fault.message(), "no such page");
//! ```

use crate::error::DispatchError;
use serde::{Serialize, Serializer};
use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::PanicHookInfo;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;

/// Correlates one fault across log lines, reporter output and error pages
///
/// A ULID, so ids sort by the time the fault was raised.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FaultId(Ulid);

impl FaultId {
    fn generate() -> Self {
        Self(Ulid::new())
    }

    /// Milliseconds since the Unix epoch when the fault was created.
    #[must_use]
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl fmt::Display for FaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for FaultId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

impl Serialize for FaultId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Source position a fault was raised at, when known
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

/// An uncaught error handed to an [`ErrorHandler`](crate::handler::ErrorHandler)
///
/// Cheap to clone: the optional source error is shared.
#[derive(Clone)]
pub struct Fault {
    id: FaultId,
    type_name: String,
    message: String,
    location: Option<Location>,
    source: Option<Arc<dyn Error + Send + Sync + 'static>>,
}

impl Fault {
    /// Type name given to faults produced from panics.
    pub const PANIC: &'static str = "panic";

    /// Create a fault from an explicit type name and message.
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: FaultId::generate(),
            type_name: type_name.into(),
            message: message.into(),
            location: None,
            source: None,
        }
    }

    /// Create a fault from a concrete error value.
    ///
    /// The type name is the fully qualified path of `E`, which is what route
    /// entries in the configuration document must declare.
    pub fn from_error<E>(err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            id: FaultId::generate(),
            type_name: std::any::type_name::<E>().to_string(),
            message: err.to_string(),
            location: None,
            source: Some(Arc::new(err)),
        }
    }

    /// Create a fault from a panic observed by a panic hook.
    #[must_use]
    pub fn from_panic(info: &PanicHookInfo<'_>) -> Self {
        let mut fault = Self::new(Self::PANIC, panic_message(info.payload()));
        if let Some(loc) = info.location() {
            fault.location = Some(Location {
                file: loc.file().to_string(),
                line: loc.line(),
            });
        }
        fault
    }

    /// Create a fault from a payload returned by `catch_unwind`.
    #[must_use]
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> Self {
        Self::new(Self::PANIC, panic_message(payload))
    }

    /// Attach the source location the fault was raised at.
    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some(Location {
            file: file.into(),
            line,
        });
        self
    }

    #[must_use]
    pub fn id(&self) -> FaultId {
        self.id
    }

    /// Runtime type name used for route lookup.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The wrapped error, if the fault was built from one.
    #[must_use]
    pub fn source(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }
}

impl From<DispatchError> for Fault {
    fn from(err: DispatchError) -> Self {
        let type_name = err.type_name();
        let message = err.to_string();
        Self {
            id: FaultId::generate(),
            type_name: type_name.to_string(),
            message,
            location: None,
            source: Some(Arc::new(err)),
        }
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("message", &self.message)
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " ({}:{})", loc.file, loc.line)?;
        }
        Ok(())
    }
}

/// Extract the human readable message carried by a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_error_records_concrete_type() {
        let fault = Fault::from_error(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(fault.type_name(), "std::io::error::Error");
        assert_eq!(fault.message(), "gone");
        assert!(fault.source().is_some());
    }

    #[test]
    fn test_from_dispatch_error_uses_taxonomy_name() {
        let fault = Fault::from(DispatchError::configuration("default route missing"));
        assert_eq!(fault.type_name(), "faultroute::ConfigurationError");
        assert!(fault.message().contains("default route missing"));
    }

    #[test]
    fn test_panic_payload_message() {
        let payload = std::panic::catch_unwind(|| {
            std::panic::panic_any(String::from("boom"));
        })
        .unwrap_err();
        let fault = Fault::from_panic_payload(payload.as_ref());
        assert_eq!(fault.type_name(), Fault::PANIC);
        assert_eq!(fault.message(), "boom");
    }

    #[test]
    fn test_fault_ids_are_unique_and_parse_back() {
        let first = Fault::new("a::B", "x").id();
        let second = Fault::new("a::B", "x").id();
        assert_ne!(first, second);
        assert!(first.timestamp_ms() <= second.timestamp_ms());
        assert_eq!(first.to_string().parse::<FaultId>().unwrap(), first);
        assert!("not-a-ulid".parse::<FaultId>().is_err());
        assert_eq!(
            serde_json::to_value(first).unwrap(),
            serde_json::Value::String(first.to_string())
        );
    }

    #[test]
    fn test_display_includes_location() {
        let fault = Fault::new("app::Oops", "bad").with_location("src/app.rs", 12);
        assert_eq!(fault.to_string(), "app::Oops: bad (src/app.rs:12)");
    }
}
