use super::state::PipelineState;
use crate::config::{Application, Format};
use crate::error::{DispatchError, DispatchResult, ReporterFailure};
use crate::fault::{panic_message, Fault};
use crate::handler::{CatchGuard, EmergencyHandler, ErrorHandler, HandlerRegistry};
use crate::locator::{ComponentRegistry, Reporter};
use crate::request::RequestContext;
use crate::response::{Response, Transport};
use crate::router::FormatNegotiator;
use crate::runtime_config::RuntimeConfig;
use once_cell::sync::OnceCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, error, info, warn};

/// Routes faults to reporters, a controller and a view resolver, then
/// commits the response
///
/// While armed it is the installed [`ErrorHandler`]. Each fault runs the
/// fixed sequence of [`PipelineState`]s. The emergency handler is installed
/// before any configuration is read or any component runs; every failure
/// after that point goes to it. After a successful commit the controller
/// resets its per-fault state and re-installs itself. After a failure it
/// stays spent, with the emergency handler installed, until
/// [`rearm`](Self::rearm) is called.
pub struct FrontController {
    runtime: RuntimeConfig,
    components: Arc<ComponentRegistry>,
    transport: Arc<dyn Transport>,
    emergency: Arc<dyn ErrorHandler>,
    /// `display_errors` of the default emergency handler, set on lazy load
    display_switch: Option<Arc<AtomicBool>>,
    registry: HandlerRegistry,
    application: OnceCell<Arc<Application>>,
    state: Mutex<PipelineState>,
    this: Weak<FrontController>,
}

impl FrontController {
    /// Start building a controller that will be installed into `registry`.
    pub fn builder(registry: HandlerRegistry, transport: Arc<dyn Transport>) -> FrontControllerBuilder {
        FrontControllerBuilder {
            registry,
            transport,
            runtime: RuntimeConfig::default(),
            components: None,
            emergency: None,
            application: None,
            display_errors: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        *self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    #[must_use]
    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    /// The configuration, loaded from the runtime document on first use.
    ///
    /// Loading also hands the environment's `display_errors` setting to the
    /// default emergency handler.
    pub fn application(&self) -> DispatchResult<Arc<Application>> {
        self.application
            .get_or_try_init(|| {
                let mut app = Application::load(&self.runtime.document, &self.runtime.environment)?;
                if let Some(include_path) = &self.runtime.include_path {
                    app = app.with_include_path(include_path);
                }
                if let Some(switch) = &self.display_switch {
                    switch.store(app.display_errors(), Ordering::Relaxed);
                }
                Ok(Arc::new(app))
            })
            .map(Arc::clone)
    }

    /// Reset a spent controller and install it as the current handler again.
    ///
    /// Returns `false` while a fault is still being handled.
    pub fn rearm(&self) -> bool {
        {
            let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
            if !matches!(*state, PipelineState::Armed) && !state.is_terminal() {
                return false;
            }
            *state = PipelineState::Armed;
        }
        if let Some(this) = self.this.upgrade() {
            self.registry.install(this as Arc<dyn ErrorHandler>);
        }
        debug!("front controller armed");
        true
    }

    fn transition(&self, fault: &Fault, next: PipelineState) {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        let from = *state;
        debug!(fault_id = %fault.id(), from = %from, to = %next, "pipeline state");
        *state = next;
    }

    /// Claim the controller for `fault`; `false` when it is not armed.
    fn trigger(&self, fault: &Fault) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if *state != PipelineState::Armed {
            return false;
        }
        debug!(fault_id = %fault.id(), from = %PipelineState::Armed, to = %PipelineState::Triggered, "pipeline state");
        *state = PipelineState::Triggered;
        true
    }

    fn run(&self, fault: &Fault) -> DispatchResult<()> {
        self.transition(fault, PipelineState::Routing);
        let app = self.application()?;
        let ctx = RequestContext::resolve(
            app.routes()?,
            fault.clone(),
            self.runtime.display_format.as_deref(),
            app.default_format(),
        )?;

        self.transition(fault, PipelineState::Reporting);
        self.report(&app, &ctx)?;

        self.transition(fault, PipelineState::Negotiating);
        let requested = self
            .runtime
            .display_format
            .as_deref()
            .or(ctx.route().format.as_deref());
        let format = FormatNegotiator::new(app.formats()?).resolve(requested, app.default_format())?;

        self.transition(fault, PipelineState::Responding);
        let mut response = Response::for_route(
            Arc::clone(&self.transport),
            ctx.route(),
            format,
            app.views_path(),
        );

        if let Some(controller) = ctx.route().controller.as_deref() {
            self.transition(fault, PipelineState::Controlling);
            let factory = self
                .components
                .locate_controller(app.controllers_path(), controller)?;
            let mut instance =
                factory(&app, &ctx).map_err(|source| component_error(controller, source))?;
            instance
                .run(&mut response)
                .map_err(|source| component_error(controller, source))?;
        }

        if response.is_redirect() {
            debug!(fault_id = %fault.id(), location = ?response.header("Location"), "redirect, skipping view resolution");
        } else if !response.has_body() {
            self.transition(fault, PipelineState::Resolving);
            self.resolve_body(&app, format, &mut response)?;
        }

        response.commit().map_err(DispatchError::Transport)?;
        info!(
            fault_id = %fault.id(),
            fault_type = %fault.type_name(),
            status = response.status().as_u16(),
            format = %format.name,
            "fault response committed"
        );
        Ok(())
    }

    /// Run every reporter of the active environment.
    ///
    /// All reporters are located before any runs, so a misconfigured one
    /// stops the dispatch before anything is recorded. Once running, a
    /// failing reporter does not stop the others; failures are collected and
    /// returned together.
    fn report(&self, app: &Arc<Application>, ctx: &RequestContext) -> DispatchResult<()> {
        let mut reporters: Vec<(&str, Box<dyn Reporter>)> = Vec::with_capacity(app.reporters().len());
        for descriptor in app.reporters() {
            let factory = self
                .components
                .locate_reporter(app.reporters_path(), &descriptor.type_name)?;
            let reporter = factory(ctx, &descriptor.config)
                .map_err(|source| component_error(&descriptor.type_name, source))?;
            reporters.push((descriptor.type_name.as_str(), reporter));
        }

        let mut failures = Vec::new();
        for (type_name, mut reporter) in reporters {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| reporter.run()));
            let message = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{:#}", err),
                Err(payload) => format!("panicked: {}", panic_message(&*payload)),
            };
            warn!(
                fault_id = %ctx.fault().id(),
                reporter = type_name,
                error = %message,
                "reporter failed"
            );
            failures.push(ReporterFailure {
                type_name: type_name.to_string(),
                message,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError::ReportersFailed(failures))
        }
    }

    fn resolve_body(
        &self,
        app: &Arc<Application>,
        format: &Format,
        response: &mut Response,
    ) -> DispatchResult<()> {
        let factory = self
            .components
            .locate_view_resolver(app.resolvers_path(), &format.resolver)?;
        let mut resolver = factory(app).map_err(|source| component_error(&format.resolver, source))?;
        resolver
            .run(response)
            .map_err(|source| component_error(&format.resolver, source))
    }
}

fn component_error(type_name: &str, source: anyhow::Error) -> DispatchError {
    DispatchError::Component {
        type_name: type_name.to_string(),
        source,
    }
}

impl ErrorHandler for FrontController {
    fn handle(&self, fault: Fault) {
        if !self.trigger(&fault) {
            warn!(
                fault_id = %fault.id(),
                state = %self.state(),
                "front controller not armed, passing fault to emergency handler"
            );
            self.emergency.handle(fault);
            return;
        }
        self.registry.install(Arc::clone(&self.emergency));

        let outcome = {
            let _guard = CatchGuard::enter();
            panic::catch_unwind(AssertUnwindSafe(|| self.run(&fault)))
        };
        let err = match outcome {
            Ok(Ok(())) => {
                self.transition(&fault, PipelineState::Committed);
                self.rearm();
                return;
            }
            Ok(Err(err)) => err,
            Err(payload) => DispatchError::Panic(panic_message(&*payload)),
        };

        self.transition(&fault, PipelineState::Failed);
        error!(
            fault_id = %fault.id(),
            fault_type = %fault.type_name(),
            error = %err,
            "fault routing failed, handing off to emergency handler"
        );
        let internal = Fault::from(err);
        self.registry.dispatch(internal);
    }
}

impl fmt::Debug for FrontController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrontController")
            .field("runtime", &self.runtime)
            .field("state", &self.state())
            .field("components", &self.components)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FrontController`]
pub struct FrontControllerBuilder {
    registry: HandlerRegistry,
    transport: Arc<dyn Transport>,
    runtime: RuntimeConfig,
    components: Option<Arc<ComponentRegistry>>,
    emergency: Option<Arc<dyn ErrorHandler>>,
    application: Option<Arc<Application>>,
    display_errors: Option<bool>,
}

impl FrontControllerBuilder {
    #[must_use]
    pub fn runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.runtime = runtime;
        self
    }

    #[must_use]
    pub fn components(mut self, components: Arc<ComponentRegistry>) -> Self {
        self.components = Some(components);
        self
    }

    /// Handler installed while a fault is routed. Defaults to an
    /// [`EmergencyHandler`] on the same transport.
    #[must_use]
    pub fn emergency(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.emergency = Some(handler);
        self
    }

    /// Use an already loaded configuration instead of reading the runtime
    /// document.
    #[must_use]
    pub fn application(mut self, application: Arc<Application>) -> Self {
        self.application = Some(application);
        self
    }

    /// Whether the default emergency handler shows fault details. Defaults to
    /// the application's setting: the preloaded one, or the runtime document
    /// once it is loaded. Off until then.
    #[must_use]
    pub fn display_errors(mut self, display_errors: bool) -> Self {
        self.display_errors = Some(display_errors);
        self
    }

    /// Build the controller and install it as the current handler.
    pub fn arm(self) -> Arc<FrontController> {
        let mut display_switch = None;
        let emergency = match self.emergency {
            Some(emergency) => emergency,
            None => {
                let display_errors = self
                    .display_errors
                    .or_else(|| self.application.as_ref().map(|app| app.display_errors()))
                    .unwrap_or(false);
                let handler = EmergencyHandler::new(Arc::clone(&self.transport))
                    .with_display_errors(display_errors);
                if self.display_errors.is_none() && self.application.is_none() {
                    display_switch = Some(handler.display_switch());
                }
                Arc::new(handler) as Arc<dyn ErrorHandler>
            }
        };
        let application = self
            .application
            .map(OnceCell::with_value)
            .unwrap_or_default();

        let controller = Arc::new_cyclic(|this| FrontController {
            runtime: self.runtime,
            components: self.components.unwrap_or_default(),
            transport: self.transport,
            emergency,
            display_switch,
            registry: self.registry,
            application,
            state: Mutex::new(PipelineState::Armed),
            this: Weak::clone(this),
        });
        controller.rearm();
        info!(
            document = %controller.runtime.document.display(),
            environment = %controller.runtime.environment,
            "front controller armed"
        );
        controller
    }
}
