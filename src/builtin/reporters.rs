use crate::config::ConfigNode;
use crate::fault::Fault;
use crate::locator::Reporter;
use crate::request::RequestContext;
use anyhow::{anyhow, bail, Context};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Line layout used when a file reporter declares no `format`.
pub const DEFAULT_LINE_FORMAT: &str = "%d %e %f %l %m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Error,
    Warn,
    Info,
}

/// Emits the fault as one structured `tracing` event
///
/// The `level` attribute picks `error` (default), `warn` or `info`.
#[derive(Debug)]
pub struct LogReporter {
    fault: Fault,
    status: u16,
    error_type: String,
    level: Level,
}

impl LogReporter {
    pub fn new(ctx: &RequestContext, config: &ConfigNode) -> anyhow::Result<Self> {
        let level = match config.attr("level").map(|l| l.to_ascii_lowercase()).as_deref() {
            None | Some("error") => Level::Error,
            Some("warn") | Some("warning") => Level::Warn,
            Some("info") => Level::Info,
            Some(other) => bail!("unsupported log level '{}'", other),
        };
        Ok(Self {
            fault: ctx.fault().clone(),
            status: ctx.route().status().as_u16(),
            error_type: ctx
                .route()
                .error_type
                .map(|t| t.to_string())
                .unwrap_or_default(),
            level,
        })
    }
}

impl Reporter for LogReporter {
    fn run(&mut self) -> anyhow::Result<()> {
        let fault = &self.fault;
        let location = fault
            .location()
            .map(|l| format!("{}:{}", l.file, l.line))
            .unwrap_or_default();
        match self.level {
            Level::Error => error!(
                fault_id = %fault.id(),
                fault_type = %fault.type_name(),
                status = self.status,
                error_type = %self.error_type,
                location = %location,
                "{}",
                fault.message()
            ),
            Level::Warn => warn!(
                fault_id = %fault.id(),
                fault_type = %fault.type_name(),
                status = self.status,
                error_type = %self.error_type,
                location = %location,
                "{}",
                fault.message()
            ),
            Level::Info => info!(
                fault_id = %fault.id(),
                fault_type = %fault.type_name(),
                status = self.status,
                error_type = %self.error_type,
                location = %location,
                "{}",
                fault.message()
            ),
        }
        Ok(())
    }
}

/// Appends one formatted line per fault to `<path>.log`
///
/// Placeholders in `format`: `%d` local time, `%e` fault type, `%f` file,
/// `%l` line, `%m` message, `%i` fault id.
#[derive(Debug)]
pub struct FileReporter {
    fault: Fault,
    path: PathBuf,
    format: String,
}

impl FileReporter {
    pub fn new(ctx: &RequestContext, config: &ConfigNode) -> anyhow::Result<Self> {
        let path = config
            .attr("path")
            .ok_or_else(|| anyhow!("file reporter requires a 'path' attribute"))?;
        Ok(Self {
            fault: ctx.fault().clone(),
            path: PathBuf::from(format!("{}.log", path)),
            format: config
                .attr("format")
                .unwrap_or_else(|| DEFAULT_LINE_FORMAT.to_string()),
        })
    }

    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// The line written for this fault, without the trailing newline.
    #[must_use]
    pub fn render_line(&self) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        render_line(&self.format, &self.fault, &timestamp)
    }
}

fn render_line(format: &str, fault: &Fault, timestamp: &str) -> String {
    let (file, line) = fault
        .location()
        .map(|l| (l.file.clone(), l.line.to_string()))
        .unwrap_or_default();
    let mut out = String::with_capacity(format.len() + fault.message().len());
    let mut chars = format.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('d') => out.push_str(timestamp),
            Some('e') => out.push_str(fault.type_name()),
            Some('f') => out.push_str(&file),
            Some('l') => out.push_str(&line),
            Some('m') => out.push_str(fault.message()),
            Some('i') => out.push_str(&fault.id().to_string()),
            _ => {
                out.push('%');
                continue;
            }
        }
        chars.next();
    }
    out
}

impl Reporter for FileReporter {
    fn run(&mut self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create log directory {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("cannot open {}", self.path.display()))?;
        writeln!(file, "{}", self.render_line())
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        Ok(())
    }
}
