//! # Locator Module
//!
//! Resolves configured type names into reporters, controllers and view
//! resolvers.
//!
//! ## Addressing
//!
//! A type name may be bare (`NotFoundController`) or qualified
//! (`app::controllers::NotFoundController`). The *bare name* (the segment
//! after the last `::`) names a unit inside the base directory the
//! configuration assigns to that kind of component. The unit must exist,
//! and it must provide the exact type name asked for:
//!
//! | Situation                                    | Error                                   |
//! |----------------------------------------------|-----------------------------------------|
//! | No unit `base_dir/<bare>`                    | [`ComponentNotFound`](crate::DispatchError::ComponentNotFound) |
//! | Unit exists, qualified type not provided     | [`TypeNotFound`](crate::DispatchError::TypeNotFound) |
//! | Found, but a controller where a reporter is due | [`Configuration`](crate::DispatchError::Configuration) |
//!
//! ## Registration
//!
//! Hosts register factories once, at startup, before the front controller is
//! built:
//!
//! ```rust
//! use faultroute::locator::{ComponentRegistry, Reporter};
//!
//! struct Noop;
//! impl Reporter for Noop {
//!     fn run(&mut self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = ComponentRegistry::new();
//! registry.register_reporter("reporters", "app::reporters::Noop", |_ctx, _cfg| Ok(Noop));
//!
//! assert!(registry.locate_reporter("reporters", "app::reporters::Noop").is_ok());
//! assert!(registry.locate_reporter("reporters", "other::Noop").is_err());
//! ```

mod core;
mod traits;


pub use core::{bare_name, Component, ComponentRegistry};
pub use traits::{
    Capability, Controller, ControllerFactory, Reporter, ReporterFactory, ViewResolver,
    ViewResolverFactory,
};
