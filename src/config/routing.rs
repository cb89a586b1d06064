use {crate::Result, serde::Deserialize};

///
/// Dispatch policies applied when a request does not land on a registered
/// handler, plus optional request tracing. The three dispatch policies are
/// enabled by default.
///
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Redirect to the same path with the trailing slash added or removed
    /// when only that variant is registered. GET gets a 301 Moved
    /// Permanently, every other method a 308 Permanent Redirect so the body
    /// and method are kept.
    pub redirect_trailing_slash: bool,

    /// Reply 405 Method Not Allowed with an `Allow` header when the path is
    /// registered but not for the request's method. When disabled such
    /// requests get the not-found response.
    pub handle_method_not_allowed: bool,

    /// Answer `OPTIONS` requests on registered paths that have no explicit
    /// `OPTIONS` handler with 200 OK and an `Allow` header.
    pub handle_options: bool,

    /// Wrap the whole router in a request tracing span (method, URI and the
    /// matched route pattern). Disabled by default.
    pub trace_requests: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            redirect_trailing_slash: true,
            handle_method_not_allowed: true,
            handle_options: true,
            trace_requests: false,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> Result<()> {
        Ok(())
    }
}
