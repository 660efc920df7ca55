use crate::config::{ErrorType, Route, RouteTable};
use crate::error::{DispatchError, DispatchResult};
use http::StatusCode;
use tracing::debug;

/// Maps a fault's runtime type name to its [`Route`]
///
/// Borrowed over a loaded [`RouteTable`]; the table itself is never mutated.
#[derive(Debug, Clone, Copy)]
pub struct RouteResolver<'a> {
    table: &'a RouteTable,
}

impl<'a> RouteResolver<'a> {
    #[must_use]
    pub fn new(table: &'a RouteTable) -> Self {
        Self { table }
    }

    /// Exact match on `type_name`, else the default route.
    ///
    /// # Errors
    ///
    /// [`DispatchError::Configuration`] when the type is unrouted and the
    /// table has no default route.
    pub fn resolve(&self, type_name: &str) -> DispatchResult<&'a Route> {
        if let Some(route) = self.table.get(type_name) {
            debug!(fault_type = type_name, "route matched");
            return Ok(route);
        }
        debug!(fault_type = type_name, "no route for fault type, using default");
        self.table
            .default_route()
            .ok_or_else(|| DispatchError::configuration("default route missing"))
    }

    /// Fill the fields a route may leave unset.
    ///
    /// Status becomes 500, the format becomes `override_format` or else
    /// `default_format`, and the error type becomes [`ErrorType::None`].
    /// Applying this twice yields the same route as applying it once.
    #[must_use]
    pub fn apply_defaults(
        mut route: Route,
        override_format: Option<&str>,
        default_format: &str,
    ) -> Route {
        if route.http_status.is_none() {
            route.http_status = Some(StatusCode::INTERNAL_SERVER_ERROR);
        }
        if route.format.is_none() {
            route.format = Some(override_format.unwrap_or(default_format).to_string());
        }
        if route.error_type.is_none() {
            route.error_type = Some(ErrorType::None);
        }
        route
    }

    /// [`resolve`](Self::resolve) followed by [`apply_defaults`](Self::apply_defaults)
    /// on an owned copy.
    pub fn resolve_with_defaults(
        &self,
        type_name: &str,
        override_format: Option<&str>,
        default_format: &str,
    ) -> DispatchResult<Route> {
        let route = self.resolve(type_name)?.clone();
        Ok(Self::apply_defaults(route, override_format, default_format))
    }
}
