use crate::config::{Application, ConfigNode};
use crate::request::RequestContext;
use crate::response::Response;
use std::fmt;
use std::sync::Arc;

/// Records a fault to some storage medium
///
/// Built from the request context and the reporter's own configuration
/// entry, then run once. Several reporters may run for one fault.
pub trait Reporter: Send {
    fn run(&mut self) -> anyhow::Result<()>;
}

/// Fault-specific logic run before the body is rendered
///
/// Built from the application and request context; receives the response
/// it may mutate. Setting a body here skips view resolution.
pub trait Controller: Send {
    fn run(&mut self, response: &mut Response) -> anyhow::Result<()>;
}

/// Turns the response's view reference into its body
///
/// Only invoked when the body is still unset after the controller ran.
pub trait ViewResolver: Send {
    fn run(&mut self, response: &mut Response) -> anyhow::Result<()>;
}

/// Builds a reporter for one dispatch.
pub type ReporterFactory = Arc<
    dyn Fn(&RequestContext, &ConfigNode) -> anyhow::Result<Box<dyn Reporter>> + Send + Sync,
>;

/// Builds a controller for one dispatch.
pub type ControllerFactory = Arc<
    dyn Fn(&Arc<Application>, &RequestContext) -> anyhow::Result<Box<dyn Controller>>
        + Send
        + Sync,
>;

/// Builds a view resolver for one dispatch.
pub type ViewResolverFactory =
    Arc<dyn Fn(&Arc<Application>) -> anyhow::Result<Box<dyn ViewResolver>> + Send + Sync>;

/// What a located component is able to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Reporter,
    Controller,
    ViewResolver,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Reporter => write!(f, "reporter"),
            Capability::Controller => write!(f, "controller"),
            Capability::ViewResolver => write!(f, "view resolver"),
        }
    }
}
