use crate::fault::Fault;
use std::cell::Cell;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::{debug, error};

/// Receives faults nothing else handled
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, fault: Fault);
}

impl<F> ErrorHandler for F
where
    F: Fn(Fault) + Send + Sync,
{
    fn handle(&self, fault: Fault) {
        self(fault)
    }
}

thread_local! {
    static CATCH_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as running inside a `catch_unwind` that will
/// dispatch the panic itself. The panic hook stays quiet while one is alive.
pub(crate) struct CatchGuard;

impl CatchGuard {
    pub(crate) fn enter() -> Self {
        CATCH_DEPTH.with(|d| d.set(d.get() + 1));
        CatchGuard
    }
}

impl Drop for CatchGuard {
    fn drop(&mut self) {
        CATCH_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

fn is_catching() -> bool {
    CATCH_DEPTH.with(|d| d.get() > 0)
}

type Slot = Option<Arc<dyn ErrorHandler>>;

/// The single "current error handler" slot
///
/// Cloning yields another handle to the same slot. The front controller
/// swaps itself out for the emergency handler through [`install`](Self::install)
/// before running any component, so a failure while handling a fault never
/// re-enters the handler that is already handling one.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    slot: Arc<RwLock<Slot>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, returning the one it replaced.
    pub fn install(&self, handler: Arc<dyn ErrorHandler>) -> Option<Arc<dyn ErrorHandler>> {
        let mut slot = self.slot.write().unwrap_or_else(|p| p.into_inner());
        slot.replace(handler)
    }

    /// Currently installed handler, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn ErrorHandler>> {
        self.slot
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .as_ref()
            .map(Arc::clone)
    }

    /// Whether `handler` is the installed handler (pointer identity).
    #[must_use]
    pub fn is_current(&self, handler: &Arc<dyn ErrorHandler>) -> bool {
        self.current()
            .is_some_and(|current| std::ptr::addr_eq(Arc::as_ptr(&current), Arc::as_ptr(handler)))
    }

    /// Hand `fault` to the installed handler.
    ///
    /// The slot lock is released before the handler runs, so the handler may
    /// itself call [`install`](Self::install).
    pub fn dispatch(&self, fault: Fault) {
        match self.current() {
            Some(handler) => {
                debug!(fault_id = %fault.id(), fault_type = %fault.type_name(), "dispatching fault");
                handler.handle(fault);
            }
            None => {
                error!(
                    fault_id = %fault.id(),
                    fault_type = %fault.type_name(),
                    message = %fault.message(),
                    "no error handler installed"
                );
                eprintln!("{}", fault);
            }
        }
    }

    /// Route panics of this process through [`dispatch`](Self::dispatch).
    ///
    /// Replaces the standard panic hook. Panics raised inside a front
    /// controller run are left to the front controller, which catches them
    /// and dispatches them itself.
    pub fn install_panic_hook(&self) {
        let registry = self.clone();
        std::panic::set_hook(Box::new(move |info| {
            if is_catching() {
                debug!(panic = %info, "panic will be dispatched by the catching front controller");
                return;
            }
            registry.dispatch(Fault::from_panic(info));
        }));
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("installed", &self.current().is_some())
            .finish()
    }
}
