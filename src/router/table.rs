//! The route table: one path tree per method.
//!
//! Routing of different methods is independent. `GET /users/{id}` and
//! `DELETE /users/{name}` live in separate trees and never conflict; only a
//! second registration of the same method and pattern does, or a pattern the
//! method's tree rejects as overlapping.

use {
    super::syntax,
    crate::{Error, Handler, Result},
    http::{HeaderValue, Method},
    std::sync::Arc,
};

/// A registered route as stored in its method's tree.
pub(crate) struct Route {
    pub(crate) pattern: Arc<str>,
    pub(crate) handler: Handler,
}

#[derive(Default)]
pub(crate) struct RouteTable {
    /// Trees in the order their method was first registered.
    trees: Vec<(Method, matchit::Router<Route>)>,
    registered: Vec<(Method, Arc<str>)>,
}

impl RouteTable {
    /// Registers `handler` for `method` on `pattern`.
    ///
    /// Fails with [`ErrorKind::RouteConflict`](crate::ErrorKind::RouteConflict)
    /// when the method is already registered on the pattern or its tree
    /// rejects an overlapping pattern, and with
    /// [`ErrorKind::InvalidRoute`](crate::ErrorKind::InvalidRoute) for malformed
    /// patterns.
    pub(crate) fn insert(&mut self, method: Method, pattern: &str, handler: Handler) -> Result<()> {
        let normalized = syntax::normalize(pattern)?;

        if self
            .registered
            .iter()
            .any(|(m, p)| *m == method && **p == *normalized)
        {
            return Err(Error::route_conflict(format!(
                "{method} {pattern} is already registered"
            )));
        }

        let position = match self.trees.iter().position(|(m, _)| *m == method) {
            Some(position) => position,
            None => {
                self.trees.push((method.clone(), matchit::Router::new()));
                self.trees.len() - 1
            }
        };

        let pattern_arc: Arc<str> = Arc::from(normalized.as_str());
        self.trees[position]
            .1
            .insert(
                normalized.as_str(),
                Route {
                    pattern: pattern_arc.clone(),
                    handler,
                },
            )
            .map_err(|err| {
                let err = Error::from(err);
                Error::new(err.kind(), format!("{method} {pattern}: {err}"))
            })?;

        self.registered.push((method, pattern_arc));
        Ok(())
    }

    fn tree(&self, method: &Method) -> Option<&matchit::Router<Route>> {
        self.trees
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, tree)| tree)
    }

    /// Matches `path` in the tree of `method`.
    pub(crate) fn find<'m, 'p>(
        &'m self,
        method: &Method,
        path: &'p str,
    ) -> Option<(&'m Route, matchit::Params<'m, 'p>)> {
        let matched = self.tree(method)?.at(path).ok()?;
        Some((matched.value, matched.params))
    }

    /// Comma separated `Allow` value listing every method whose tree matches
    /// `path`, or `None` when no tree does. `OPTIONS` is appended when
    /// `with_options` is set and not registered explicitly.
    pub(crate) fn allow(&self, path: &str, with_options: bool) -> Option<HeaderValue> {
        let mut allowed: Vec<&str> = self
            .trees
            .iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(method, _)| method.as_str())
            .collect();
        if allowed.is_empty() {
            return None;
        }
        if with_options && !allowed.contains(&Method::OPTIONS.as_str()) {
            allowed.push(Method::OPTIONS.as_str());
        }
        // Method names are always valid header characters.
        HeaderValue::from_str(&allowed.join(", ")).ok()
    }

    /// `(method, pattern)` pairs in registration order.
    pub(crate) fn registered(&self) -> &[(Method, Arc<str>)] {
        &self.registered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn ok() -> Handler {
        Handler::from_handler(|| async { "ok" })
    }

    #[test]
    fn test_methods_share_a_pattern() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/items", ok()).unwrap();
        table.insert(Method::POST, "/items", ok()).unwrap();

        assert!(table.find(&Method::GET, "/items").is_some());
        assert!(table.find(&Method::POST, "/items").is_some());
        assert!(table.find(&Method::PUT, "/items").is_none());
        assert_eq!(table.allow("/items", false).unwrap(), "GET, POST");
        assert_eq!(table.allow("/items", true).unwrap(), "GET, POST, OPTIONS");
        assert!(table.allow("/nothing", true).is_none());
    }

    #[test]
    fn test_duplicate_method_and_pattern_conflicts() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/items", ok()).unwrap();
        let err = table.insert(Method::GET, "/items", ok()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouteConflict);
        assert!(err.to_string().contains("GET /items"));
    }

    #[test]
    fn test_colon_and_brace_forms_are_the_same_pattern() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/users/:id", ok()).unwrap();
        let err = table.insert(Method::GET, "/users/{id}", ok()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouteConflict);
    }

    #[test]
    fn test_methods_route_independently() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/users/:id", ok()).unwrap();
        table.insert(Method::DELETE, "/users/:name", ok()).unwrap();

        let (route, params) = table.find(&Method::GET, "/users/7").unwrap();
        assert_eq!(&*route.pattern, "/users/{id}");
        assert_eq!(params.get("id"), Some("7"));

        let (route, params) = table.find(&Method::DELETE, "/users/ann").unwrap();
        assert_eq!(&*route.pattern, "/users/{name}");
        assert_eq!(params.get("name"), Some("ann"));

        assert_eq!(table.allow("/users/7", false).unwrap(), "GET, DELETE");
    }

    #[test]
    fn test_overlapping_parameters_conflict_within_a_method() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/users/{id}", ok()).unwrap();
        let err = table.insert(Method::GET, "/users/{name}", ok()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouteConflict);
    }

    #[test]
    fn test_malformed_pattern_is_invalid() {
        let mut table = RouteTable::default();
        let err = table
            .insert(Method::GET, "/files/{*rest}/tail", ok())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRoute);
    }

    #[test]
    fn test_params_come_from_engine() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/foo/:param", ok()).unwrap();
        let (route, params) = table.find(&Method::GET, "/foo/bar").unwrap();
        assert_eq!(&*route.pattern, "/foo/{param}");
        assert_eq!(params.get("param"), Some("bar"));
        assert!(table.find(&Method::GET, "/foo").is_none());
    }

    #[test]
    fn test_catch_all_needs_a_non_empty_tail() {
        let mut table = RouteTable::default();
        table.insert(Method::GET, "/files/*path", ok()).unwrap();
        assert!(table.find(&Method::GET, "/files/").is_none());
        let (_, params) = table.find(&Method::GET, "/files/a/b").unwrap();
        assert_eq!(params.get("path"), Some("a/b"));
    }

    #[test]
    fn test_registered_keeps_order() {
        let mut table = RouteTable::default();
        table.insert(Method::POST, "/b", ok()).unwrap();
        table.insert(Method::GET, "/a", ok()).unwrap();
        table.insert(Method::GET, "/b", ok()).unwrap();
        let registered: Vec<_> = table
            .registered()
            .iter()
            .map(|(m, p)| format!("{m} {p}"))
            .collect();
        assert_eq!(registered, vec!["POST /b", "GET /a", "GET /b"]);
    }
}
