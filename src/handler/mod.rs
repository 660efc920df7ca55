//! # Handler Module
//!
//! The process-wide "current error handler" slot and the emergency handler
//! installed in it while a fault is being routed.
//!
//! ## Hand-off
//!
//! Exactly one [`ErrorHandler`] is active at a time. A
//! [`FrontController`](crate::dispatcher::FrontController) is installed while
//! armed; the moment it is triggered it installs its [`EmergencyHandler`]
//! instead, and only re-installs itself after the response was committed.
//! Anything that goes wrong in between lands in the emergency handler.
//!
//! ```rust
//! use std::sync::Arc;
//! use faultroute::fault::Fault;
//! use faultroute::handler::{EmergencyHandler, ErrorHandler, HandlerRegistry};
//! use faultroute::response::{BufferTransport, Transport};
//!
//! let transport = Arc::new(BufferTransport::new());
//! let emergency = Arc::new(EmergencyHandler::new(Arc::clone(&transport) as Arc<dyn Transport>));
//!
//! let registry = HandlerRegistry::new();
//! registry.install(Arc::clone(&emergency) as Arc<dyn ErrorHandler>);
//! registry.dispatch(Fault::new("app::Oops", "something broke"));
//!
//! assert_eq!(emergency.handled(), 1);
//! assert_eq!(transport.last().unwrap().status.as_u16(), 500);
//! ```

mod emergency;
mod registry;

pub use emergency::EmergencyHandler;
pub(crate) use registry::CatchGuard;
pub use registry::{ErrorHandler, HandlerRegistry};
