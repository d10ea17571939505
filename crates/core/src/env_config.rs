//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - Unset, empty, or whitespace-only: returns `default` silently (an
///   empty value in a deployment manifest means "not configured", same
///   as unset).
/// - Set but unparseable after trimming: logs a warning and returns
///   `default`.
///
/// This replaces the pattern `env::var("X").ok().and_then(|v| v.parse().ok()).unwrap_or(default)`
/// which silently swallows parse failures.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    let Ok(raw) = std::env::var(var) else {
        return default;
    };
    let value = raw.trim();
    if value.is_empty() {
        return default;
    }
    match value.parse() {
        Ok(parsed) => parsed,
        Err(_) => {
            tracing::warn!(
                var,
                value,
                default = %default,
                "invalid env var value, using default"
            );
            default
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "COURIER_TEST_ENV_VALID_4187";
        unsafe { std::env::set_var(var_name, "42") };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "COURIER_TEST_ENV_INVALID_4188";
        unsafe { std::env::set_var(var_name, "banana") };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "COURIER_TEST_ENV_MISSING_4189";
        unsafe { std::env::remove_var(var_name) };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_parse_empty_value() {
        let var_name = "COURIER_TEST_ENV_EMPTY_4190";
        unsafe { std::env::set_var(var_name, "") };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_whitespace_value_counts_as_unset() {
        let var_name = "COURIER_TEST_ENV_BLANK_4191";
        unsafe { std::env::set_var(var_name, "   ") };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unsafe { std::env::remove_var(var_name) };
    }

    #[test]
    fn test_env_parse_trims_before_parsing() {
        let var_name = "COURIER_TEST_ENV_PADDED_4192";
        unsafe { std::env::set_var(var_name, "  42  ") };
        let result: u64 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unsafe { std::env::remove_var(var_name) };
    }
}
