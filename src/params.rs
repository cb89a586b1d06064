//! Path parameters carried in request extensions.
//!
//! When the router dispatches a request to a route it builds a [`PathParams`]
//! map from the values the path engine extracted and inserts it into the
//! request's extensions, next to the [`MatchedRoute`]. Handlers read it back in
//! one of three ways:
//!
//! - as an extractor argument: `async fn show(params: PathParams)`
//! - through [`PathParamExt::path_param`] on the request or its parts
//! - through the free function [`path_param`] on raw extensions
//!
//! A missing map and a missing key are indistinguishable: both read as `""`.

use {
    axum::extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Extensions, Request, request::Parts},
    percent_encoding::percent_decode_str,
    std::{borrow::Cow, collections::HashMap, convert::Infallible, fmt, sync::Arc},
};

/// Named values extracted from the matched URL path.
///
/// The map is shared behind an `Arc` and exposes no mutation, so once the
/// router attached it to a request it stays as it was for the rest of that
/// request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PathParams(Arc<HashMap<String, String>>);

impl PathParams {
    /// Builds the map by inserting the pairs in order; a repeated name keeps
    /// the last value.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = HashMap::new();
        for (key, value) in pairs {
            map.insert(key.into(), value.into());
        }
        Self(Arc::new(map))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the value for `key`, or `""` when it was not captured.
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Debug for PathParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

/// Absent parameters extract as an empty map.
impl<S> FromRequestParts<S> for PathParams
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<PathParams>().cloned().unwrap_or_default())
    }
}

/// The registered pattern (prefix included) that a request was dispatched to,
/// in `{name}` syntax.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedRoute(pub(crate) Arc<str>);

impl MatchedRoute {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracted as `Option<MatchedRoute>`; `None` outside route dispatch.
impl<S> OptionalFromRequestParts<S> for MatchedRoute
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<MatchedRoute>().cloned())
    }
}

/// Looks up a path parameter in request extensions.
///
/// Returns `""` when no parameters were attached (the request never went
/// through route dispatch) or when `key` is not among them.
///
/// ```rust
/// use axum_routegroup::{PathParams, path_param};
///
/// let mut extensions = http::Extensions::new();
/// assert_eq!(path_param(&extensions, "id"), "");
///
/// extensions.insert(PathParams::from_pairs([("id", "42")]));
/// assert_eq!(path_param(&extensions, "id"), "42");
/// assert_eq!(path_param(&extensions, "name"), "");
/// ```
pub fn path_param<'a>(extensions: &'a Extensions, key: &str) -> &'a str {
    extensions
        .get::<PathParams>()
        .map(|params| params.value(key))
        .unwrap_or_default()
}

/// Parameter lookup on anything that carries request extensions.
pub trait PathParamExt {
    /// See [`path_param`].
    fn path_param(&self, key: &str) -> &str;
}

impl<B> PathParamExt for Request<B> {
    fn path_param(&self, key: &str) -> &str {
        path_param(self.extensions(), key)
    }
}

impl PathParamExt for Parts {
    fn path_param(&self, key: &str) -> &str {
        path_param(&self.extensions, key)
    }
}

/// Attaches the parameters captured for `pattern` to `request`.
///
/// Values arrive as they appear in the request path and are percent-decoded
/// here.
pub(crate) fn inject<'p, B>(
    request: &mut Request<B>,
    pattern: &Arc<str>,
    params: impl IntoIterator<Item = (&'p str, &'p str)>,
) {
    let params = PathParams::from_pairs(params.into_iter().map(|(k, v)| (k, decode(v))));
    let extensions = request.extensions_mut();
    extensions.insert(params);
    extensions.insert(MatchedRoute(pattern.clone()));
}

/// Percent-decodes a captured value. A value that does not decode to UTF-8
/// is kept as it appeared in the path.
fn decode(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}
