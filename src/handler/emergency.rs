use super::registry::ErrorHandler;
use crate::fault::Fault;
use crate::response::{Response, Transport};
use http::StatusCode;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::error;

/// Last-resort handler for failures of the routing machinery itself
///
/// Always logs the fault and writes it to stderr, then commits a bare
/// `500 text/plain` response of its own. Fault details go into the body only
/// when `display_errors` is on. With an exit code configured the process
/// terminates afterwards.
///
/// The flag is shared: a front controller that loads its configuration
/// lazily switches it to the active environment's setting once loaded.
pub struct EmergencyHandler {
    transport: Arc<dyn Transport>,
    display_errors: Arc<AtomicBool>,
    exit_code: Option<i32>,
    handled: AtomicUsize,
}

impl EmergencyHandler {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            display_errors: Arc::new(AtomicBool::new(false)),
            exit_code: None,
            handled: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_display_errors(self, display_errors: bool) -> Self {
        self.display_errors.store(display_errors, Ordering::Relaxed);
        self
    }

    #[must_use]
    pub fn displays_errors(&self) -> bool {
        self.display_errors.load(Ordering::Relaxed)
    }

    /// Handle on the `display_errors` flag, for whoever learns the setting
    /// after this handler was built.
    pub(crate) fn display_switch(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.display_errors)
    }

    /// Terminate the process with `code` after handling a fault.
    #[must_use]
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// Number of faults handled so far.
    #[must_use]
    pub fn handled(&self) -> usize {
        self.handled.load(Ordering::Relaxed)
    }

    fn body(&self, fault: &Fault) -> String {
        if !self.displays_errors() {
            return String::new();
        }
        let mut body = format!("{}\nfault id: {}\n", fault, fault.id());
        let mut source = fault.source().and_then(|s| s.source());
        while let Some(cause) = source {
            body.push_str(&format!("caused by: {}\n", cause));
            source = cause.source();
        }
        body
    }
}

impl ErrorHandler for EmergencyHandler {
    fn handle(&self, fault: Fault) {
        self.handled.fetch_add(1, Ordering::Relaxed);
        error!(
            fault_id = %fault.id(),
            fault_type = %fault.type_name(),
            message = %fault.message(),
            location = ?fault.location(),
            "emergency handler invoked"
        );
        eprintln!("{}", fault);

        let mut response = Response::new(Arc::clone(&self.transport));
        response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        response.set_header("Content-Type", "text/plain; charset=UTF-8");
        response.set_body(self.body(&fault));
        if let Err(err) = response.commit() {
            error!(fault_id = %fault.id(), error = %err, "emergency response could not be sent");
        }

        if let Some(code) = self.exit_code {
            std::process::exit(code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::BufferTransport;

    fn handler(display_errors: bool) -> (Arc<BufferTransport>, EmergencyHandler) {
        let transport = Arc::new(BufferTransport::new());
        let handler = EmergencyHandler::new(Arc::clone(&transport) as Arc<dyn Transport>)
            .with_display_errors(display_errors);
        (transport, handler)
    }

    #[test]
    fn test_hides_details_by_default() {
        let (transport, handler) = handler(false);
        handler.handle(Fault::new("app::Secret", "db password rejected"));
        let sent = transport.last().unwrap();
        assert_eq!(sent.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sent.header("content-type"), Some("text/plain; charset=UTF-8"));
        assert_eq!(sent.body_str(), "");
        assert_eq!(handler.handled(), 1);
    }

    #[test]
    fn test_displays_details_when_enabled() {
        let (transport, handler) = handler(true);
        let fault = Fault::new("app::Broken", "disk full").with_location("src/io.rs", 12);
        let id = fault.id();
        handler.handle(fault);
        let body = transport.last().unwrap().body_str();
        assert!(body.contains("app::Broken: disk full (src/io.rs:12)"));
        assert!(body.contains(&id.to_string()));
    }

    #[test]
    fn test_display_switch_applies_to_later_faults() {
        let (transport, handler) = handler(false);
        handler.display_switch().store(true, Ordering::Relaxed);
        assert!(handler.displays_errors());
        handler.handle(Fault::new("app::Late", "switched on"));
        assert!(transport.last().unwrap().body_str().contains("app::Late: switched on"));
    }

    #[test]
    fn test_respects_started_transport() {
        let (transport, handler) = handler(true);
        transport.mark_started();
        handler.handle(Fault::new("x::Y", "late"));
        assert_eq!(transport.count(), 0);
        assert_eq!(handler.handled(), 1);
    }
}
