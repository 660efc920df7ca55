//! # faultroute
//!
//! **faultroute** turns uncaught errors into well-formed error responses, driven entirely by a
//! routing document that maps fault types to status codes, controllers, views and formats.
//!
//! ## Overview
//!
//! A host process arms a [`FrontController`](dispatcher::FrontController) as its error handler.
//! When a fault escapes, the controller hands error handling to an emergency handler, looks the
//! fault's type name up in the configured routes, runs the environment's reporters, picks a
//! response format, lets an optional controller shape the response, renders the body with the
//! format's view resolver and commits the result exactly once.
//!
//! ## Architecture
//!
//! - **[`config`]** - Routing document loading (`ref` indirection, per-environment branches)
//! - **[`router`]** - Exact-match route resolution and name-based format negotiation
//! - **[`locator`]** - Typed component registry resolving configured type names
//! - **[`request`]** - The route/fault pair handed to components
//! - **[`response`]** - Response state, views and transports with commit-once semantics
//! - **[`dispatcher`]** - The front controller state machine
//! - **[`handler`]** - The single "current error handler" slot and the emergency handler
//! - **[`builtin`]** - Log/file reporters, HTML/JSON resolvers, a fault details controller
//! - **[`logging`]** / **[`runtime_config`]** - Environment-driven host setup
//!
//! ### Fault Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Registry as HandlerRegistry
//!     participant FC as FrontController
//!     participant EH as EmergencyHandler
//!     participant Comp as Reporters/Controller/Resolver
//!     participant T as Transport
//!
//!     Host->>Registry: dispatch(fault)
//!     Registry->>FC: handle(fault)
//!     FC->>Registry: install(emergency)
//!     FC->>Comp: report, control, resolve
//!     alt success
//!         FC->>T: commit()
//!         FC->>Registry: install(self)
//!     else failure
//!         FC->>Registry: dispatch(internal fault)
//!         Registry->>EH: handle(internal fault)
//!         EH->>T: commit 500
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faultroute::dispatcher::FrontController;
//! use faultroute::fault::Fault;
//! use faultroute::handler::HandlerRegistry;
//! use faultroute::locator::ComponentRegistry;
//! use faultroute::response::{Transport, WriterTransport};
//! use faultroute::runtime_config::RuntimeConfig;
//!
//! let mut components = ComponentRegistry::new();
//! faultroute::builtin::register(&mut components, "reporters", "resolvers", "controllers");
//!
//! let registry = HandlerRegistry::new();
//! let transport: Arc<dyn Transport> = Arc::new(WriterTransport::stdout());
//! let _controller = FrontController::builder(registry.clone(), transport)
//!     .runtime(RuntimeConfig::new("app/errors.yaml", "live"))
//!     .components(Arc::new(components))
//!     .arm();
//! registry.install_panic_hook();
//!
//! // anywhere in the host:
//! registry.dispatch(Fault::new("app::errors::PathNotFound", "/missing"));
//! ```
//!
//! ## Routing Rules
//!
//! Routes match the fault's runtime type name exactly. Subtypes are not considered: a fault
//! whose type has no route of its own falls through to the default route (the `exceptions`
//! block itself). Use [`Fault::from_error`](fault::Fault::from_error) to key faults on the
//! fully qualified Rust type path of the error value.

pub mod builtin;
pub mod cli;
pub mod config;
pub mod dispatcher;
mod error;
pub mod fault;
pub mod handler;
pub mod locator;
pub mod logging;
pub mod request;
pub mod response;
pub mod router;
pub mod runtime_config;

pub use error::{DispatchError, DispatchResult, ReporterFailure};
pub use fault::{Fault, FaultId};
