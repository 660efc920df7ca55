use crate::builtin;
use crate::config::{Application, RouteTable};
use crate::dispatcher::FrontController;
use crate::fault::Fault;
use crate::handler::HandlerRegistry;
use crate::locator::ComponentRegistry;
use crate::response::{Transport, WriterTransport};
use crate::router::FormatNegotiator;
use crate::runtime_config::{RuntimeConfig, DEFAULT_DOCUMENT, DEFAULT_ENVIRONMENT};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for faultroute
///
/// Validates error routing documents and replays faults through them.
#[derive(Parser)]
#[command(name = "faultroute")]
#[command(about = "Fault routing and error response composition", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Which document and environment a command works on
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Path to the routing document (YAML, or JSON with a .json extension)
    #[arg(short, long, env = "FAULTROUTE_CONFIG", default_value = DEFAULT_DOCUMENT)]
    pub config: PathBuf,

    /// Environment selecting display_errors and the reporter list
    #[arg(short, long, env = "FAULTROUTE_ENV", default_value = DEFAULT_ENVIRONMENT)]
    pub env: String,

    /// Root for view files (default: the document's directory)
    #[arg(long, env = "FAULTROUTE_INCLUDE_PATH")]
    pub include_path: Option<PathBuf>,

    /// Format forced for every response
    #[arg(long, env = "FAULTROUTE_DISPLAY_FORMAT")]
    pub display_format: Option<String>,
}

impl TargetArgs {
    #[must_use]
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            document: self.config.clone(),
            environment: self.env.clone(),
            include_path: self.include_path.clone(),
            display_format: self.display_format.clone(),
        }
    }
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Validate a routing document against the built-in components
    Check {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Arm a front controller and trigger it with one fault
    ///
    /// The committed response is written to stdout as HTTP/1.1 text.
    Simulate {
        #[command(flatten)]
        target: TargetArgs,

        /// Fault type name, matched against the routes
        #[arg(long)]
        fault: String,

        /// Fault message
        #[arg(long, default_value = "simulated fault")]
        message: String,
    },
}

/// What `check` found
#[derive(Debug, Default)]
pub struct CheckReport {
    pub routes: usize,
    pub formats: usize,
    pub reporters: usize,
    pub problems: Vec<String>,
}

impl CheckReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.problems.is_empty()
    }
}

fn load_application(runtime: &RuntimeConfig) -> Result<Application> {
    let mut app = Application::load(&runtime.document, &runtime.environment)
        .with_context(|| format!("cannot load {}", runtime.document.display()))?;
    if let Some(include_path) = &runtime.include_path {
        app = app.with_include_path(include_path);
    }
    Ok(app)
}

/// Registry holding the built-ins under the application's paths.
#[must_use]
pub fn builtin_registry(app: &Application) -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    builtin::register_for(&mut registry, app.paths());
    registry
}

/// Resolve every route, format and reporter the document declares.
pub fn check(app: &Application, components: &ComponentRegistry) -> CheckReport {
    let mut report = CheckReport {
        reporters: app.reporters().len(),
        ..CheckReport::default()
    };

    for reporter in app.reporters() {
        if let Err(err) = components.locate_reporter(app.reporters_path(), &reporter.type_name) {
            report.problems.push(format!("reporter {}: {}", reporter.type_name, err));
        }
    }

    match app.formats() {
        Ok(formats) => {
            report.formats = formats.len();
            if let Err(err) = FormatNegotiator::new(formats).resolve(None, app.default_format()) {
                report.problems.push(format!("default format '{}': {}", app.default_format(), err));
            }
            for format in formats.iter() {
                if let Err(err) = components.locate_view_resolver(app.resolvers_path(), &format.resolver) {
                    report.problems.push(format!("format {}: {}", format.name, err));
                }
            }
        }
        Err(err) => report.problems.push(err.to_string()),
    }

    match app.routes() {
        Ok(routes) => {
            report.routes = routes.len();
            if routes.default_route().is_none() {
                report.problems.push("default route missing".to_string());
            }
            for (type_name, route) in routes.iter() {
                let label = if type_name == RouteTable::DEFAULT_KEY {
                    "<default>"
                } else {
                    type_name
                };
                if let Some(controller) = &route.controller {
                    if let Err(err) = components.locate_controller(app.controllers_path(), controller) {
                        report.problems.push(format!("route {}: {}", label, err));
                    }
                }
                if let (Some(format), Ok(formats)) = (&route.format, app.formats()) {
                    if formats.get(format).is_none() {
                        report
                            .problems
                            .push(format!("route {}: unknown format '{}'", label, format));
                    }
                }
            }
        }
        Err(err) => report.problems.push(err.to_string()),
    }

    report
}

/// Arm a controller with the built-ins on `transport`, install it into
/// `registry` and route one fault through it.
///
/// Process-wide state is left alone; callers that want panics routed as well
/// install the panic hook themselves.
pub fn simulate(
    registry: &HandlerRegistry,
    runtime: RuntimeConfig,
    fault: Fault,
    transport: Arc<dyn Transport>,
) -> Result<Arc<FrontController>> {
    let app = Arc::new(load_application(&runtime)?);
    let components = Arc::new(builtin_registry(&app));
    let controller = FrontController::builder(registry.clone(), transport)
        .runtime(runtime)
        .application(app)
        .components(components)
        .arm();
    info!(fault_id = %fault.id(), fault_type = %fault.type_name(), "simulating fault");
    registry.dispatch(fault);
    Ok(controller)
}

/// Run the CLI
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check { target } => {
            let runtime = target.runtime();
            let app = load_application(&runtime)?;
            let report = check(&app, &builtin_registry(&app));
            println!(
                "{} (environment '{}'): {} route(s), {} format(s), {} reporter(s)",
                runtime.document.display(),
                runtime.environment,
                report.routes,
                report.formats,
                report.reporters
            );
            for problem in &report.problems {
                println!("  ✗ {}", problem);
            }
            if !report.is_ok() {
                bail!("{} problem(s) found", report.problems.len());
            }
            println!("  ✓ ok");
            Ok(())
        }
        Commands::Simulate {
            target,
            fault,
            message,
        } => {
            let transport: Arc<dyn Transport> = Arc::new(WriterTransport::stdout());
            let registry = HandlerRegistry::new();
            registry.install_panic_hook();
            let controller = simulate(
                &registry,
                target.runtime(),
                Fault::new(fault, message),
                transport,
            )?;
            eprintln!("\nfront controller state: {}", controller.state());
            Ok(())
        }
    }
}
