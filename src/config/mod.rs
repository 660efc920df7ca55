//! # Config Module
//!
//! Loads the error routing document and exposes it as a typed, read-only
//! [`Application`].
//!
//! ## Document Shape
//!
//! ```yaml
//! application:
//!   version: "1.0.0"
//!   default_format: html
//!   display_errors:
//!     local: true
//!   paths:
//!     controllers: app/controllers
//!     reporters: app/reporters
//!     views: app/views
//!     resolvers: app/resolvers
//! reporters:
//!   local:
//!     - class: faultroute::builtin::LogReporter
//! resolvers:
//!   - format: html
//!     content_type: text/html
//!     charset: UTF-8
//!     class: faultroute::builtin::HtmlResolver
//! exceptions:
//!   http_status: 500
//!   view: "500"
//!   routes:
//!     - class: app::errors::PathNotFound
//!       http_status: 404
//!       view: "404"
//! ```
//!
//! The `exceptions` block itself is the default route; every entry under
//! `routes` overlays one route keyed by its `class`.
//!
//! ## Indirection
//!
//! Any top-level section may be written as `{ ref: other.yaml }`. The named
//! document is loaded the first time the section is needed and its section of
//! the same name is used instead. Only one level is followed.
//!
//! ```rust
//! use faultroute::config::Application;
//!
//! let app = Application::parse(
//!     "application:\n  default_format: json\n",
//!     "local",
//!     ".",
//! ).unwrap();
//! assert_eq!(app.default_format(), "json");
//! assert!(!app.display_errors());
//! ```

mod application;
mod load;
mod node;
mod types;

pub use application::{
    build_formats, build_routes, Application, Paths, APPLICATION_SECTION, EXCEPTIONS_SECTION,
    REPORTERS_SECTION, RESOLVERS_SECTION,
};
pub use load::{load_document, parse_document, SectionResolver, REF_ATTR};
pub use node::ConfigNode;
pub use types::{
    parse_status, ErrorType, Format, FormatTable, ReporterDescriptor, Route, RouteTable,
};
