//! Environment variable interpolation for config files.
//!
//! Supports `$VAR`, `${VAR}`, `${VAR:-default}` (default used when the
//! variable is unset or empty), and `$$` as an escape for a literal `$`.

use regex::Regex;
use std::env;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \$\$                                          # escape sequence $$
        |
        \$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}  # ${VAR} / ${VAR:-default}
        |
        \$([A-Za-z_][A-Za-z0-9_]*)                    # unbraced $VAR
        ",
    )
    .expect("invalid interpolation pattern")
});

/// Result of interpolating a config document.
#[derive(Debug)]
pub struct InterpolationResult {
    /// The interpolated text.
    pub text: String,
    /// Any errors encountered during interpolation.
    pub errors: Vec<String>,
}

impl InterpolationResult {
    /// Returns true if there were no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Substitute environment variable references in `input`.
///
/// Errors are accumulated rather than short-circuited so a single pass
/// reports every missing variable.
pub fn interpolate(input: &str) -> InterpolationResult {
    let mut errors = Vec::new();

    let text = ENV_VAR_PATTERN
        .replace_all(input, |caps: &regex::Captures| {
            let full_match = caps.get(0).unwrap().as_str();
            if full_match == "$$" {
                return "$".to_string();
            }

            let var_name = caps
                .get(1)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            let default_value = caps.get(2).map(|m| m.as_str());

            match (env::var(var_name), default_value) {
                (Ok(value), Some(default)) if value.is_empty() => default.to_string(),
                (Ok(value), _) => value,
                (Err(_), Some(default)) => default.to_string(),
                (Err(_), None) => {
                    errors.push(format!("environment variable '{var_name}' is not set"));
                    full_match.to_string()
                }
            }
        })
        .to_string();

    InterpolationResult { text, errors }
}
