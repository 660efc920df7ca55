use http::StatusCode;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Sink a committed response is written to
///
/// Implementations must tolerate being asked whether they have started from
/// several cleanup paths; [`Response::commit`](super::Response::commit) only
/// calls [`send`](Transport::send) when [`is_started`](Transport::is_started)
/// is false.
pub trait Transport: Send + Sync {
    /// Whether a response has already begun on this transport.
    fn is_started(&self) -> bool;

    /// Emit status line, headers in order, then the body.
    fn send(&self, status: StatusCode, headers: &[(Arc<str>, String)], body: &[u8])
        -> io::Result<()>;
}

/// Writes HTTP/1.1 formatted responses onto any [`Write`]
///
/// Counts as started after its first send, the way a CGI-style process can
/// only emit one status line.
pub struct WriterTransport<W: Write + Send> {
    out: Mutex<W>,
    started: AtomicBool,
}

impl<W: Write + Send> WriterTransport<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            started: AtomicBool::new(false),
        }
    }

    /// Consume the transport and return the writer.
    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl WriterTransport<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> Transport for WriterTransport<W> {
    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn send(
        &self,
        status: StatusCode,
        headers: &[(Arc<str>, String)],
        body: &[u8],
    ) -> io::Result<()> {
        self.started.store(true, Ordering::SeqCst);
        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("transport writer poisoned"))?;
        write!(
            out,
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )?;
        for (name, value) in headers {
            write!(out, "{}: {}\r\n", name, value)?;
        }
        out.write_all(b"\r\n")?;
        out.write_all(body)?;
        out.flush()
    }
}

/// One response captured by a [`BufferTransport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl SentResponse {
    /// Header value by name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Records every committed response in memory
///
/// Never reports itself started unless [`mark_started`](Self::mark_started)
/// is called, so one buffer can observe several dispatches.
#[derive(Debug, Default)]
pub struct BufferTransport {
    sent: Mutex<Vec<SentResponse>>,
    started: AtomicBool,
}

impl BufferTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a host that already began its own response.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn sent(&self) -> Vec<SentResponse> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn last(&self) -> Option<SentResponse> {
        self.sent.lock().ok().and_then(|s| s.last().cloned())
    }
}

impl Transport for BufferTransport {
    fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn send(
        &self,
        status: StatusCode,
        headers: &[(Arc<str>, String)],
        body: &[u8],
    ) -> io::Result<()> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| io::Error::other("buffer transport poisoned"))?;
        sent.push(SentResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body: body.to_vec(),
        });
        Ok(())
    }
}
