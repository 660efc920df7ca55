//! # Response Module
//!
//! The response a dispatch builds and commits, and the transports it can be
//! committed to.
//!
//! ## Lifecycle
//!
//! 1. The front controller creates a body-less [`Response`] from the route's
//!    status and the negotiated format's `Content-Type`, pointing its [`View`]
//!    at `views_path/route.view` when the route declares a view.
//! 2. The controller (if any) mutates it freely: status, headers, view data,
//!    a complete body, or a [`redirect`](Response::redirect).
//! 3. The view resolver fills the body if it is still unset.
//! 4. [`Response::commit`] writes it out. Commit is idempotent so every exit
//!    path may call it.
//!
//! ## Transports
//!
//! - [`WriterTransport`] - HTTP/1.1 text onto any `io::Write` (stdout by default)
//! - [`BufferTransport`] - in-memory capture for tests and embedding hosts
//!
//! ```rust
//! use std::sync::Arc;
//! use faultroute::response::{BufferTransport, Response, Transport};
//!
//! let transport = Arc::new(BufferTransport::new());
//! let mut response = Response::new(Arc::clone(&transport) as Arc<dyn Transport>);
//! response.set_body("oops");
//! response.commit().unwrap();
//! response.commit().unwrap();
//! assert_eq!(transport.count(), 1);
//! ```

mod core;
mod transport;
mod view;

pub use core::{HeaderVec, Response, MAX_INLINE_HEADERS};
pub use transport::{BufferTransport, SentResponse, Transport, WriterTransport};
pub use view::View;
