//! Rule configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RouteRuleError};
use crate::request::Method;

/// Allowed methods for a rule: one method name or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MethodSpec {
    /// A single method name.
    One(String),
    /// Several method names.
    Many(Vec<String>),
}

/// Configuration of one route rule.
///
/// ```json
/// { "pattern": "/user/<id:\\d+>", "route": "user", "method": ["GET", "POST"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// URL pattern with `<name>` / `<name:regex>` tokens.
    pub pattern: String,
    /// Route name, may contain bare `<name>` tokens.
    pub route: String,
    /// Allowed methods; `GET` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<MethodSpec>,
}

impl RuleConfig {
    /// Creates a configuration allowing `GET` only.
    pub fn new(pattern: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            route: route.into(),
            method: None,
        }
    }

    /// Restricts the rule to a single method.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(MethodSpec::One(method.into()));
        self
    }

    /// Restricts the rule to a set of methods.
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method = Some(MethodSpec::Many(
            methods.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Reads a rule from an untyped JSON object, reporting the first
    /// missing or mistyped field.
    pub fn from_value(value: &Value) -> Result<Self> {
        let pattern = match value.get("pattern") {
            Some(v) if is_falsy(v) => None,
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(RouteRuleError::PatternNotString {
                    config: value.clone(),
                })
            }
        };
        let Some(pattern) = pattern else {
            return Err(RouteRuleError::MissingPattern {
                config: value.clone(),
            });
        };

        let route = match value.get("route") {
            Some(v) if is_falsy(v) => None,
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                return Err(RouteRuleError::RouteNotString {
                    config: value.clone(),
                })
            }
        };
        let Some(route) = route else {
            return Err(RouteRuleError::MissingRoute {
                config: value.clone(),
            });
        };

        let method = match value.get("method") {
            Some(v) if is_falsy(v) => None,
            None => None,
            Some(Value::String(s)) => Some(MethodSpec::One(s.clone())),
            Some(Value::Array(items)) => {
                let names = items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| RouteRuleError::InvalidMethod {
                        config: value.clone(),
                        reason: "method list must contain only strings".to_string(),
                    })?;
                Some(MethodSpec::Many(names))
            }
            Some(_) => {
                return Err(RouteRuleError::InvalidMethod {
                    config: value.clone(),
                    reason: "expected a string or an array of strings".to_string(),
                })
            }
        };

        Ok(Self {
            pattern,
            route,
            method,
        })
    }

    /// Reads a list of rules: a JSON array of rule objects, an object with a
    /// `rules` array, or a single rule object.
    pub fn list_from_value(value: &Value) -> Result<Vec<Self>> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(map) => match map.get("rules") {
                Some(Value::Array(items)) => items,
                _ => return Ok(vec![Self::from_value(value)?]),
            },
            _ => return Ok(vec![Self::from_value(value)?]),
        };
        items.iter().map(Self::from_value).collect()
    }

    /// Resolves the allowed methods, defaulting to `GET`.
    pub(crate) fn parse_methods(&self) -> std::result::Result<Vec<Method>, String> {
        match &self.method {
            None => Ok(vec![Method::Get]),
            Some(MethodSpec::One(name)) if name.is_empty() => Ok(vec![Method::Get]),
            Some(MethodSpec::One(name)) => Ok(vec![name.parse()?]),
            Some(MethodSpec::Many(names)) => {
                let mut methods: Vec<Method> = Vec::with_capacity(names.len());
                for name in names {
                    let method: Method = name.parse()?;
                    if !methods.contains(&method) {
                        methods.push(method);
                    }
                }
                Ok(methods)
            }
        }
    }

    /// The configuration as a JSON value, attached to construction errors.
    pub(crate) fn context(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Values a rule object treats as "not set".
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value() {
        let config = RuleConfig::from_value(&json!({
            "pattern": "/user/<id:\\d+>",
            "route": "user",
            "method": ["GET", "post"]
        }))
        .unwrap();
        assert_eq!(config.pattern, "/user/<id:\\d+>");
        assert_eq!(config.route, "user");
        assert_eq!(
            config.parse_methods(),
            Ok(vec![Method::Get, Method::Post])
        );
    }

    #[test]
    fn test_default_method() {
        let config = RuleConfig::from_value(&json!({"pattern": "/a", "route": "a"})).unwrap();
        assert_eq!(config.method, None);
        assert_eq!(config.parse_methods(), Ok(vec![Method::Get]));
    }

    #[test]
    fn test_missing_pattern() {
        let err = RuleConfig::from_value(&json!({"route": "a"})).unwrap_err();
        assert!(matches!(err, RouteRuleError::MissingPattern { .. }));
        assert_eq!(err.context(), Some(&json!({"route": "a"})));

        let err = RuleConfig::from_value(&json!({"pattern": "", "route": "a"})).unwrap_err();
        assert!(matches!(err, RouteRuleError::MissingPattern { .. }));
    }

    #[test]
    fn test_pattern_not_string() {
        let err = RuleConfig::from_value(&json!({"pattern": 5, "route": "a"})).unwrap_err();
        assert!(matches!(err, RouteRuleError::PatternNotString { .. }));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn test_missing_route() {
        let err = RuleConfig::from_value(&json!({"pattern": "/a"})).unwrap_err();
        assert!(matches!(err, RouteRuleError::MissingRoute { .. }));

        let err = RuleConfig::from_value(&json!({"pattern": "/a", "route": ["a"]})).unwrap_err();
        assert!(matches!(err, RouteRuleError::RouteNotString { .. }));
    }

    #[test]
    fn test_invalid_method_shape() {
        let err = RuleConfig::from_value(&json!({"pattern": "/a", "route": "a", "method": 3}))
            .unwrap_err();
        assert!(matches!(err, RouteRuleError::InvalidMethod { .. }));

        let err =
            RuleConfig::from_value(&json!({"pattern": "/a", "route": "a", "method": ["GET", 1]}))
                .unwrap_err();
        assert!(matches!(err, RouteRuleError::InvalidMethod { .. }));
    }

    #[test]
    fn test_unknown_method_name() {
        let config = RuleConfig::new("/a", "a").method("FETCH");
        assert!(config.parse_methods().is_err());
    }

    #[test]
    fn test_list_from_value() {
        let rules = json!({
            "rules": [
                {"pattern": "/a", "route": "a"},
                {"pattern": "/b", "route": "b", "method": "POST"}
            ]
        });
        let configs = RuleConfig::list_from_value(&rules).unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[1], RuleConfig::new("/b", "b").method("POST"));

        let configs = RuleConfig::list_from_value(&json!([{"pattern": "/a", "route": "a"}]))
            .unwrap();
        assert_eq!(configs, vec![RuleConfig::new("/a", "a")]);

        let err = RuleConfig::list_from_value(&json!([{"route": "a"}])).unwrap_err();
        assert!(matches!(err, RouteRuleError::MissingPattern { .. }));
    }

    #[test]
    fn test_serialize_and_deserialize() {
        let config = RuleConfig::new("/a", "a").methods(["GET", "PUT"]);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({"pattern": "/a", "route": "a", "method": ["GET", "PUT"]})
        );
        let back: RuleConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
