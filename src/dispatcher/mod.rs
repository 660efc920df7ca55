//! # Dispatcher Module
//!
//! The [`FrontController`]: the error handler that turns an uncaught
//! [`Fault`](crate::fault::Fault) into a committed response.
//!
//! ## Request Flow
//!
//! 1. **Armed** - installed in the [`HandlerRegistry`](crate::handler::HandlerRegistry)
//! 2. **Triggered** - a fault arrives; the emergency handler is installed
//!    before anything else runs
//! 3. **Routing** - configuration is loaded (once) and the fault's type name
//!    is matched against the route table, falling back to the default route
//! 4. **Reporting** - every reporter of the active environment runs, in
//!    declaration order
//! 5. **Negotiating** - the response format is chosen: forced display format,
//!    else the route's format, else the configured default
//! 6. **Responding** - status, `Content-Type` and view are preset
//! 7. **Controlling** - the route's controller runs, if it declares one
//! 8. **Resolving** - the format's view resolver renders the body, unless
//!    the controller set one or redirected
//! 9. **Committed** - the response is sent and the controller re-arms
//!
//! ## Error Handling
//!
//! Nothing is retried. A configuration error, a missing component, a
//! failing reporter, controller or resolver, a panic inside any of them,
//! or a transport error moves the controller to `Failed` and hands an
//! internal fault describing the failure to the emergency handler. The
//! partially built response is dropped; the emergency handler sends its own.
//!
//! ```rust
//! use std::sync::Arc;
//! use faultroute::config::Application;
//! use faultroute::dispatcher::FrontController;
//! use faultroute::fault::Fault;
//! use faultroute::handler::{ErrorHandler, HandlerRegistry};
//! use faultroute::locator::ComponentRegistry;
//! use faultroute::response::{BufferTransport, Transport};
//!
//! let app = Application::parse(
//!     "application:\n  default_format: json\n\
//!      resolvers:\n  - format: json\n    content_type: application/json\n    class: faultroute::builtin::JsonResolver\n\
//!      exceptions:\n  http_status: 503\n",
//!     "local",
//!     ".",
//! ).unwrap();
//!
//! let mut components = ComponentRegistry::new();
//! faultroute::builtin::register(&mut components, "reporters", "resolvers", "controllers");
//!
//! let transport = Arc::new(BufferTransport::new());
//! let registry = HandlerRegistry::new();
//! let controller = FrontController::builder(registry.clone(), Arc::clone(&transport) as Arc<dyn Transport>)
//!     .application(Arc::new(app))
//!     .components(Arc::new(components))
//!     .arm();
//!
//! registry.dispatch(Fault::new("app::Maintenance", "down for maintenance"));
//! let sent = transport.last().unwrap();
//! assert_eq!(sent.status.as_u16(), 503);
//! assert_eq!(sent.header("Content-Type"), Some("application/json"));
//! assert!(registry.is_current(&(controller as Arc<dyn ErrorHandler>)));
//! ```

mod core;
mod state;

pub use core::{FrontController, FrontControllerBuilder};
pub use state::PipelineState;
