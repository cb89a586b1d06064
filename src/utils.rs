//!
//! Small helpers shared by the configuration loaders.
//!

use {
    regex::{Captures, Regex},
    std::{env, sync::LazyLock},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace around the variable name.
/// Names follow the usual environment convention: uppercase letters, digits, underscores.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").expect("valid regex"));

/// Substitutes every `{{ VAR }}` placeholder with the value of the environment
/// variable of the same name.
///
/// Missing variables are replaced by an empty string and reported with a warning,
/// so a bind address such as `"{{ BIND_ADDR }}"` fails later in
/// [`Config::validate`](crate::Config::validate) instead of at parse time.
///
/// ```
/// use axum_routegroup::replace_handlebars_with_env;
///
/// let text = replace_handlebars_with_env("port = {{ AXUM_ROUTEGROUP_UNSET_VAR }}");
/// assert_eq!(text, "port = ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .into_owned()
}
