use super::transport::Transport;
use super::view::View;
use crate::config::{Format, Route};
use http::StatusCode;
use smallvec::SmallVec;
use std::fmt;
use std::io;
use std::sync::Arc;
use tracing::debug;

/// Maximum inline headers before heap allocation.
/// Error responses rarely carry more than content type, location and the
/// three cache headers.
pub const MAX_INLINE_HEADERS: usize = 8;

/// Ordered header storage; insertion order is send order.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Mutable response state built during one dispatch
///
/// Controllers and view resolvers mutate it; [`commit`](Response::commit)
/// writes it to the [`Transport`] at most once.
pub struct Response {
    status: StatusCode,
    headers: HeaderVec,
    body: Option<Vec<u8>>,
    view: View,
    redirected: bool,
    committed: bool,
    transport: Arc<dyn Transport>,
}

impl Response {
    /// Empty `500` response bound to `transport`.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            headers: HeaderVec::new(),
            body: None,
            view: View::default(),
            redirected: false,
            committed: false,
            transport,
        }
    }

    /// Body-less response preset from a defaulted route and its format.
    ///
    /// The view reference is `views_path/route.view` when the route declares
    /// a view.
    pub fn for_route(
        transport: Arc<dyn Transport>,
        route: &Route,
        format: &Format,
        views_path: &str,
    ) -> Self {
        let mut response = Self::new(transport);
        response.set_status(route.status());
        response.set_header("Content-Type", format.content_type_header());
        if let Some(view) = &route.view {
            response
                .view
                .set_file(format!("{}/{}", views_path.trim_end_matches('/'), view));
        }
        response
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Header value by name (case-insensitive per RFC 7230).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn headers(&self) -> &[(Arc<str>, String)] {
        &self.headers
    }

    /// Set a header. Rewriting an existing name replaces its value in place.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((Arc::from(name), value)),
        }
    }

    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = Some(body.into());
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// Point the response at another view file.
    pub fn set_view(&mut self, path: impl Into<String>) {
        self.view.set_file(path);
    }

    /// Turn the response into a redirect.
    ///
    /// The front controller commits a redirected response as soon as the
    /// controller returns, skipping view resolution.
    pub fn redirect(&mut self, location: &str, permanent: bool, prevent_caching: bool) {
        if prevent_caching {
            self.set_header("Cache-Control", "no-cache, no-store, must-revalidate");
            self.set_header("Pragma", "no-cache");
            self.set_header("Expires", "0");
        }
        self.set_header("Location", location);
        self.status = if permanent {
            StatusCode::MOVED_PERMANENTLY
        } else {
            StatusCode::FOUND
        };
        self.redirected = true;
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.redirected
    }

    #[must_use]
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Send status, headers and body, once.
    ///
    /// Returns `Ok(true)` when this call emitted the response. Later calls,
    /// and calls made after the transport already started a response, do
    /// nothing and return `Ok(false)`.
    pub fn commit(&mut self) -> io::Result<bool> {
        if self.committed {
            return Ok(false);
        }
        self.committed = true;
        if self.transport.is_started() {
            debug!(status = self.status.as_u16(), "transport already started, response dropped");
            return Ok(false);
        }
        let body = self.body.as_deref().unwrap_or_default();
        self.transport.send(self.status, &self.headers, body)?;
        debug!(
            status = self.status.as_u16(),
            headers = self.headers.len(),
            body_len = body.len(),
            "response committed"
        );
        Ok(true)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("view", &self.view)
            .field("redirected", &self.redirected)
            .field("committed", &self.committed)
            .finish_non_exhaustive()
    }
}
