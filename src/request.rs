use crate::config::{Route, RouteTable};
use crate::error::DispatchResult;
use crate::fault::Fault;
use crate::router::RouteResolver;

/// The resolved route paired with the fault that triggered it
///
/// Built once per dispatch and owned by it; reporters and controllers receive
/// it by reference.
#[derive(Debug, Clone)]
pub struct RequestContext {
    route: Route,
    fault: Fault,
}

impl RequestContext {
    /// Pair an already defaulted route with its fault.
    #[must_use]
    pub fn new(route: Route, fault: Fault) -> Self {
        Self { route, fault }
    }

    /// Resolve `fault` against `routes` and default the unset route fields.
    pub fn resolve(
        routes: &RouteTable,
        fault: Fault,
        override_format: Option<&str>,
        default_format: &str,
    ) -> DispatchResult<Self> {
        let route = RouteResolver::new(routes).resolve_with_defaults(
            fault.type_name(),
            override_format,
            default_format,
        )?;
        Ok(Self::new(route, fault))
    }

    #[must_use]
    pub fn route(&self) -> &Route {
        &self.route
    }

    #[must_use]
    pub fn fault(&self) -> &Fault {
        &self.fault
    }
}
