//! Error types for rule construction.

use serde_json::Value;
use thiserror::Error;

/// Errors raised while building a route rule from its configuration.
///
/// Lookup and URL generation never produce these: a rule that does not apply
/// simply returns `None`.
#[derive(Debug, Error)]
pub enum RouteRuleError {
    /// The rule has no pattern (or an empty one).
    #[error("rule object must have a pattern property")]
    MissingPattern {
        /// The offending rule configuration.
        config: Value,
    },

    /// The rule pattern is not a string.
    #[error("rule.pattern must be a string")]
    PatternNotString {
        /// The offending rule configuration.
        config: Value,
    },

    /// The rule has no route (or an empty one).
    #[error("rule object must have a route property")]
    MissingRoute {
        /// The offending rule configuration.
        config: Value,
    },

    /// The rule route is not a string.
    #[error("rule.route must be a string")]
    RouteNotString {
        /// The offending rule configuration.
        config: Value,
    },

    /// The method is neither a known method name nor a list of them.
    #[error("rule.method must be a method name or a list of method names: {reason}")]
    InvalidMethod {
        /// The offending rule configuration.
        config: Value,
        /// What was wrong with it.
        reason: String,
    },

    /// The pattern template does not contain the route it maps to.
    #[error("invalid route rule: template `{template}` does not contain route `{route}`")]
    InvalidRule {
        /// The offending rule configuration.
        config: Value,
        /// Normalized pattern template.
        template: String,
        /// Normalized route.
        route: String,
    },

    /// A compiled regular expression was rejected by the regex engine.
    #[error("invalid regular expression `{pattern}`: {error}")]
    InvalidRegex {
        /// The rule configuration being built, `null` outside a rule.
        config: Value,
        /// The regex source that failed to compile.
        pattern: String,
        /// Engine error.
        #[source]
        error: regex::Error,
    },
}

impl RouteRuleError {
    /// Kind code shared by every construction error (server-side
    /// configuration failure).
    pub const STATUS: u16 = 500;

    /// Returns the kind code of this error.
    #[must_use]
    pub const fn status(&self) -> u16 {
        Self::STATUS
    }

    /// Returns the configuration object that caused the error, if any.
    #[must_use]
    pub const fn context(&self) -> Option<&Value> {
        match self {
            Self::MissingPattern { config }
            | Self::PatternNotString { config }
            | Self::MissingRoute { config }
            | Self::RouteNotString { config }
            | Self::InvalidMethod { config, .. }
            | Self::InvalidRule { config, .. } => Some(config),
            Self::InvalidRegex {
                config: Value::Null,
                ..
            } => None,
            Self::InvalidRegex { config, .. } => Some(config),
        }
    }

    /// Attaches the rule configuration to an error that has none yet.
    #[must_use]
    pub fn with_config(self, context: Value) -> Self {
        match self {
            Self::InvalidRegex {
                config: Value::Null,
                pattern,
                error,
            } => Self::InvalidRegex {
                config: context,
                pattern,
                error,
            },
            other => other,
        }
    }
}

/// Result type alias for rule construction.
pub type Result<T> = std::result::Result<T, RouteRuleError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_is_fixed() {
        let err = RouteRuleError::MissingRoute {
            config: json!({"pattern": "/a"}),
        };
        assert_eq!(err.status(), 500);
        assert_eq!(err.context(), Some(&json!({"pattern": "/a"})));
    }

    #[test]
    fn test_regex_error_context() {
        let error = regex::Regex::new("(").unwrap_err();
        let err = RouteRuleError::InvalidRegex {
            config: Value::Null,
            pattern: "(".to_string(),
            error,
        };
        assert!(err.context().is_none());
        assert!(err.to_string().starts_with("invalid regular expression `(`"));

        let err = err.with_config(json!({"pattern": "/(", "route": "a"}));
        assert_eq!(err.context(), Some(&json!({"pattern": "/(", "route": "a"})));
    }

    #[test]
    fn test_with_config_keeps_existing_context() {
        let err = RouteRuleError::MissingRoute {
            config: json!({"pattern": "/a"}),
        }
        .with_config(json!({"other": true}));
        assert_eq!(err.context(), Some(&json!({"pattern": "/a"})));
    }
}
