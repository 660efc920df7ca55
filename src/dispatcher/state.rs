use std::fmt;

/// Where a [`FrontController`](super::FrontController) is in handling a fault
///
/// States advance strictly in declaration order. `Committed` and `Failed`
/// are terminal for one fault; a committed controller re-arms itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Installed as the current handler, waiting for a fault
    Armed,
    /// A fault arrived; the emergency handler has been installed
    Triggered,
    /// Loading configuration and resolving the route
    Routing,
    /// Running the environment's reporters
    Reporting,
    /// Picking the response format
    Negotiating,
    /// Presetting status, content type and view
    Responding,
    /// Running the route's controller
    Controlling,
    /// Rendering the body with the format's view resolver
    Resolving,
    /// Response sent
    Committed,
    /// A step failed and the fault went to the emergency handler
    Failed,
}

impl PipelineState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Committed | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineState::Armed => "armed",
            PipelineState::Triggered => "triggered",
            PipelineState::Routing => "routing",
            PipelineState::Reporting => "reporting",
            PipelineState::Negotiating => "negotiating",
            PipelineState::Responding => "responding",
            PipelineState::Controlling => "controlling",
            PipelineState::Resolving => "resolving",
            PipelineState::Committed => "committed",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
