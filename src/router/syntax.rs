//! Route pattern syntax.
//!
//! The path engine understands `{name}` and `{*name}` segments. Route groups
//! may also use the colon/star forms `:name` and `*name`, which are
//! translated segment by segment before insertion. Only whole segments are
//! translated, so a literal `:` or `*` inside a segment is left alone.
//!
//! Both forms follow the engine's matching rules. A catch-all needs at least
//! one character after its slash, so `/files/*path` does not match `/files/`.
//! The captured value has no leading `/`: `/files/a/b` gives `path = "a/b"`.
//! Register `/files/` separately to serve the bare directory.

use crate::{Error, Result};

/// Converts `pattern` to engine syntax, rejecting patterns that do not start
/// with `/`.
pub(crate) fn normalize(pattern: &str) -> Result<String> {
    if !pattern.starts_with('/') {
        return Err(Error::invalid_route(format!(
            "route pattern {pattern:?} must begin with '/'"
        )));
    }

    let mut out = String::with_capacity(pattern.len() + 4);
    for (i, segment) in pattern.split('/').enumerate() {
        if i > 0 {
            out.push('/');
        }
        match (segment.strip_prefix(':'), segment.strip_prefix('*')) {
            (Some(name), _) if !name.is_empty() => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            (_, Some(name)) if !name.is_empty() => {
                out.push_str("{*");
                out.push_str(name);
                out.push('}');
            }
            _ => out.push_str(segment),
        }
    }
    Ok(out)
}
