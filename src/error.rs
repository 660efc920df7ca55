use std::fmt;
use std::io;

/// Error raised while routing a fault and composing its response
///
/// Every variant is fatal to the dispatch that produced it: the front
/// controller hands it to whichever [`ErrorHandler`](crate::handler::ErrorHandler)
/// is installed at that moment (the emergency handler) and never retries.
#[derive(Debug)]
pub enum DispatchError {
    /// The configuration document is missing a mandatory attribute, declares
    /// an invalid value, or a default route/format could not be matched.
    Configuration(String),
    /// A configuration document could not be read or parsed.
    Document {
        /// Path of the document that failed
        path: String,
        /// Underlying I/O or parser message
        message: String,
    },
    /// No component unit with the bare name exists under the base directory.
    ComponentNotFound {
        /// Base directory searched
        base_dir: String,
        /// Bare (unqualified) unit name
        name: String,
    },
    /// The unit exists but does not provide the qualified type.
    TypeNotFound {
        /// Fully qualified type name as configured
        type_name: String,
    },
    /// A reporter, controller or view resolver returned an error.
    Component {
        /// Type name of the failing component
        type_name: String,
        /// Error returned by the component
        source: anyhow::Error,
    },
    /// One or more reporters failed. All reporters were still run.
    ReportersFailed(Vec<ReporterFailure>),
    /// A component panicked while the pipeline was running.
    Panic(String),
    /// The transport refused the committed response.
    Transport(io::Error),
}

/// A single failed reporter, kept so the emergency handler sees every failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterFailure {
    /// Configured type name of the reporter
    pub type_name: String,
    /// Rendered error chain
    pub message: String,
}

impl DispatchError {
    /// Shorthand for a [`DispatchError::Configuration`] error.
    pub fn configuration(message: impl Into<String>) -> Self {
        DispatchError::Configuration(message.into())
    }

    /// Stable type name used when this error is turned into a
    /// [`Fault`](crate::fault::Fault), so an emergency pipeline can route it.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            DispatchError::Configuration(_) | DispatchError::Document { .. } => {
                "faultroute::ConfigurationError"
            }
            DispatchError::ComponentNotFound { .. } => "faultroute::ComponentNotFoundError",
            DispatchError::TypeNotFound { .. } => "faultroute::TypeNotFoundError",
            DispatchError::Component { .. } => "faultroute::ComponentError",
            DispatchError::ReportersFailed(_) => "faultroute::ReporterError",
            DispatchError::Panic(_) => "faultroute::PanicError",
            DispatchError::Transport(_) => "faultroute::TransportError",
        }
    }

    /// Whether this error belongs to the configuration class of the taxonomy.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DispatchError::Configuration(_) | DispatchError::Document { .. }
        )
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Configuration(message) => {
                write!(f, "configuration error: {}", message)
            }
            DispatchError::Document { path, message } => {
                write!(f, "configuration error: cannot load '{}': {}", path, message)
            }
            DispatchError::ComponentNotFound { base_dir, name } => {
                write!(f, "component not found: '{}' under '{}'", name, base_dir)
            }
            DispatchError::TypeNotFound { type_name } => {
                write!(f, "type not found: {}", type_name)
            }
            DispatchError::Component { type_name, source } => {
                write!(f, "component '{}' failed: {:#}", type_name, source)
            }
            DispatchError::ReportersFailed(failures) => {
                write!(f, "{} reporter(s) failed", failures.len())?;
                for failure in failures {
                    write!(f, "; {}: {}", failure.type_name, failure.message)?;
                }
                Ok(())
            }
            DispatchError::Panic(message) => write!(f, "component panicked: {}", message),
            DispatchError::Transport(err) => write!(f, "response commit failed: {}", err),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Component { source, .. } => Some(source.as_ref()),
            DispatchError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DispatchError {
    fn from(err: io::Error) -> Self {
        DispatchError::Transport(err)
    }
}

/// Result alias used across the dispatch path.
pub type DispatchResult<T> = Result<T, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reporters_failed_lists_every_failure() {
        let err = DispatchError::ReportersFailed(vec![
            ReporterFailure {
                type_name: "a::File".to_string(),
                message: "disk full".to_string(),
            },
            ReporterFailure {
                type_name: "a::Mail".to_string(),
                message: "smtp down".to_string(),
            },
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 reporter(s) failed"));
        assert!(text.contains("a::File: disk full"));
        assert!(text.contains("a::Mail: smtp down"));
    }

    #[test]
    fn test_configuration_class() {
        assert!(DispatchError::configuration("x").is_configuration());
        assert!(DispatchError::Document {
            path: "a.yaml".into(),
            message: "missing".into()
        }
        .is_configuration());
        assert!(!DispatchError::TypeNotFound {
            type_name: "X".into()
        }
        .is_configuration());
    }
}
