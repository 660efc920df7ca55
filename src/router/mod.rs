//! # Router Module
//!
//! Turns a fault into the descriptors the front controller needs: the
//! [`Route`](crate::config::Route) that handles it and the
//! [`Format`](crate::config::Format) the response is written in.
//!
//! ## Matching Policy
//!
//! Both lookups are exact-match-else-default:
//!
//! - [`RouteResolver`] looks up the fault's runtime type name verbatim. Type
//!   hierarchies are not consulted, so a subtype of a routed error falls
//!   through to the default route unless it has its own entry.
//! - [`FormatNegotiator`] looks up the requested format name, then the
//!   configured default. It works on names, never on `Accept` headers.
//!
//! A missing default is a configuration error in both cases.
//!
//! ## Example
//!
//! ```rust
//! use faultroute::config::{Route, RouteTable};
//! use faultroute::router::RouteResolver;
//! use http::StatusCode;
//!
//! let table: RouteTable = vec![
//!     ("", Route::default()),
//!     ("app::NotFound", Route { http_status: Some(StatusCode::NOT_FOUND), ..Route::default() }),
//! ].into_iter().collect();
//!
//! let resolver = RouteResolver::new(&table);
//! let route = resolver.resolve_with_defaults("app::Other", None, "html").unwrap();
//! assert_eq!(route.http_status, Some(StatusCode::INTERNAL_SERVER_ERROR));
//! assert_eq!(route.format.as_deref(), Some("html"));
//! ```

mod core;
mod format;
#[cfg(test)]
mod tests;

pub use core::RouteResolver;
pub use format::FormatNegotiator;
