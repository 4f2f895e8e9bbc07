//! Route rules: pattern compilation, request matching and URL generation.

use tracing::{debug, trace};

use crate::config::RuleConfig;
use crate::error::{Result, RouteRuleError};
use crate::group::{to_regex, CompiledPattern, GroupMatch};
use crate::request::{Method, Params, Url};
use crate::strings::{escape, trim, Substitution};
use crate::token::{scan_pattern, scan_route, Segment};

/// Regex used for a token without an inline pattern: one path segment.
pub const DEFAULT_TOKEN_PATTERN: &str = "([^/]+)";

const SEPARATOR: char = '/';

/// Value constraint of a pattern parameter.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Anything up to the next separator.
    Any,
    /// The anchored inline regex of the token.
    Pattern(CompiledPattern),
}

impl Constraint {
    /// Returns true if `value` satisfies the constraint.
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Pattern(pattern) => pattern.is_match(value),
        }
    }
}

/// A pattern parameter that is filled from the request, not the route.
#[derive(Debug, Clone)]
pub struct ParamRule {
    /// Parameter name.
    pub name: String,
    /// Constraint checked when generating URLs.
    pub constraint: Constraint,
}

/// A token embedded in the route itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParam {
    /// Parameter name.
    pub key: String,
    /// The token text, `<key>`.
    pub token: String,
}

/// A compiled mapping between a URL pattern and a route.
///
/// Immutable once built; matching and URL generation only read it, so a
/// rule can be shared freely between threads.
///
/// # Example
///
/// ```
/// use route_rule::{Params, RouteRule, RuleConfig, Method, Url};
///
/// let rule = RouteRule::new(&RuleConfig::new(r"/user/<id:\d+>", "user")).unwrap();
///
/// let (route, params) = rule.parse_request(Method::Get, &Url::parse("/user/42")).unwrap();
/// assert_eq!(route, "user");
/// assert_eq!(params.get("id"), Some("42"));
///
/// let params: Params = [("id", "42"), ("tab", "posts")].into_iter().collect();
/// assert_eq!(rule.create_url("user", &params), Some("user/42?tab=posts".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct RouteRule {
    route: String,
    route_params: Vec<RouteParam>,
    template: String,
    pattern: CompiledPattern,
    param_rules: Vec<ParamRule>,
    route_rule: Option<CompiledPattern>,
    methods: Vec<Method>,
}

impl RouteRule {
    /// Compiles a rule from its configuration.
    pub fn new(config: &RuleConfig) -> Result<Self> {
        if config.pattern.is_empty() {
            return Err(RouteRuleError::MissingPattern {
                config: config.context(),
            });
        }
        if config.route.is_empty() {
            return Err(RouteRuleError::MissingRoute {
                config: config.context(),
            });
        }
        let with_config = |err: RouteRuleError| err.with_config(config.context());
        let methods = config
            .parse_methods()
            .map_err(|reason| RouteRuleError::InvalidMethod {
                config: config.context(),
                reason,
            })?;

        let pattern = trim(&config.pattern, SEPARATOR);
        let route = trim(&config.route, SEPARATOR).to_string();

        let route_params: Vec<RouteParam> = scan_route(&route)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Token { name, .. } => Some(RouteParam {
                    key: name.to_string(),
                    token: format!("<{name}>"),
                }),
                Segment::Literal(_) => None,
            })
            .collect();

        let mut template = String::with_capacity(pattern.len());
        let mut escaped = String::with_capacity(pattern.len());
        let mut escape_rule: Vec<Substitution> = Vec::new();
        let mut param_rules: Vec<ParamRule> = Vec::new();

        for segment in scan_pattern(pattern) {
            match segment {
                Segment::Literal(text) => {
                    template.push_str(text);
                    escaped.push_str(text);
                }
                Segment::Token {
                    name,
                    pattern: inline,
                } => {
                    let token_pattern = inline.unwrap_or(DEFAULT_TOKEN_PATTERN);
                    let group = format!("(?P<{name}>{token_pattern})");
                    template.push('<');
                    template.push_str(name);
                    template.push('>');
                    escaped.push_str(&group);

                    if route_params.iter().any(|p| p.key == name) {
                        escape_rule.push(Substitution::token(name, group));
                    } else {
                        let constraint = if token_pattern == DEFAULT_TOKEN_PATTERN {
                            Constraint::Any
                        } else {
                            Constraint::Pattern(
                                to_regex(&format!("^{token_pattern}$")).map_err(with_config)?,
                            )
                        };
                        param_rules.push(ParamRule {
                            name: name.to_string(),
                            constraint,
                        });
                    }
                }
            }
        }

        let compiled =
            to_regex(&format!("^{}$", trim(&escaped, SEPARATOR))).map_err(with_config)?;

        let route_rule = if route_params.is_empty() {
            None
        } else {
            Some(to_regex(&format!("^{}$", escape(&route, &escape_rule))).map_err(with_config)?)
        };

        if template.contains('<') && route.contains('<') && !template.contains(&route) {
            return Err(RouteRuleError::InvalidRule {
                config: config.context(),
                template,
                route,
            });
        }

        debug!(
            template = %template,
            escaped = %escaped,
            pattern = %compiled.as_str(),
            route = %route,
            route_rule = ?route_rule.as_ref().map(CompiledPattern::as_str),
            route_params = ?route_params.iter().map(|p| p.key.as_str()).collect::<Vec<_>>(),
            param_rules = ?param_rules.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            methods = ?methods,
            "Compiled route rule"
        );

        Ok(Self {
            route,
            route_params,
            template,
            pattern: compiled,
            param_rules,
            route_rule,
            methods,
        })
    }

    /// Returns the normalized route.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Returns the pattern with every token in bare `<name>` form.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the compiled matching pattern.
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Returns the tokens embedded in the route, in order of appearance.
    #[must_use]
    pub fn route_params(&self) -> &[RouteParam] {
        &self.route_params
    }

    /// Returns the request-filled parameters in declaration order.
    #[must_use]
    pub fn param_rules(&self) -> &[ParamRule] {
        &self.param_rules
    }

    /// Returns the pattern that parses a concrete route back into its
    /// tokens, present when the route has tokens.
    #[must_use]
    pub const fn route_rule(&self) -> Option<&CompiledPattern> {
        self.route_rule.as_ref()
    }

    /// Returns the allowed methods.
    #[must_use]
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    /// Returns true if `method` is allowed.
    #[must_use]
    pub fn allows(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    fn is_route_param(&self, key: &str) -> bool {
        self.route_params.iter().any(|p| p.key == key)
    }

    fn is_param_rule(&self, key: &str) -> bool {
        self.param_rules.iter().any(|r| r.name == key)
    }

    /// Matches a request against this rule.
    ///
    /// Returns the route name, with route tokens filled in, and the request
    /// parameters: query parameters merged with path captures. A non-empty
    /// path capture wins over a query parameter of the same name; an empty
    /// one does not. Route tokens are not part of the returned parameters.
    #[must_use]
    pub fn parse_request(&self, method: Method, url: &Url) -> Option<(String, Params)> {
        let path = trim(&url.pathname, SEPARATOR);
        let Some(mut matches) = self.pattern.captures(path) else {
            trace!(path = %path, pattern = %self.pattern.as_str(), "Path does not match");
            return None;
        };
        if !self.allows(method) {
            trace!(method = %method, route = %self.route, "Method not allowed");
            return None;
        }

        let mut params = url.query.clone();

        for (key, value) in url.query.iter() {
            let overridable = find_match(&matches, key).is_none_or(|m| m.value.is_empty());
            if overridable {
                matches.push(GroupMatch {
                    key: Some(key.to_string()),
                    index: matches.len(),
                    value: value.to_string(),
                });
            }
        }

        for item in &matches {
            let Some(key) = item.key.as_deref() else {
                continue;
            };
            if !self.is_route_param(key) && self.is_param_rule(key) {
                params.insert(key, item.value.clone());
            }
        }

        // the last value of a key wins, as for the parameters above
        let mut substitutions: Vec<Substitution> = Vec::new();
        for param in &self.route_params {
            if let Some(item) = find_match(&matches, &param.key) {
                substitutions.push(Substitution::new(&param.token, item.value.clone()));
                params.remove(&param.key);
            }
        }

        let route = if self.route_params.is_empty() {
            self.route.clone()
        } else {
            escape(&self.route, &substitutions)
        };

        Some((route, params))
    }

    /// Builds the URL of `route` with `params`.
    ///
    /// Parameters consumed by the pattern are substituted into it; the rest
    /// are appended as a query string. Returns `None` if a required
    /// parameter is missing or rejected by its constraint, if `route`
    /// cannot be produced by this rule, or if the result would not match
    /// the rule's own pattern.
    #[must_use]
    pub fn create_url(&self, route: &str, params: &Params) -> Option<String> {
        let mut params = params.clone();
        let mut substitutions: Vec<Substitution> = Vec::new();

        let route = trim(route, SEPARATOR);
        if route != self.route {
            let Some(route_rule) = &self.route_rule else {
                trace!(route = %route, expected = %self.route, "Route differs and has no tokens");
                return None;
            };
            let Some(matches) = route_rule.captures(route) else {
                trace!(route = %route, route_rule = %route_rule.as_str(), "Route does not match");
                return None;
            };
            substitutions.extend(
                matches
                    .into_iter()
                    .filter_map(|m| m.key.map(|key| Substitution::token(&key, m.value))),
            );
        }

        let mut consumed: Vec<(&str, String)> = Vec::new();
        for rule in &self.param_rules {
            if let Some(value) = params.get(&rule.name) {
                if !rule.constraint.accepts(value) {
                    trace!(param = %rule.name, value = %value, "Parameter rejected by constraint");
                    return None;
                }
                let value = value.to_string();
                params.remove(&rule.name);
                substitutions.push(Substitution::token(&rule.name, value.clone()));
                consumed.push((rule.name.as_str(), value));
            } else if let Some((_, value)) = consumed.iter().find(|(name, _)| *name == rule.name) {
                // repeated token
                substitutions.push(Substitution::token(&rule.name, value.clone()));
            } else {
                trace!(param = %rule.name, "Missing parameter");
                return None;
            }
        }

        let mut url = trim(&escape(&self.template, &substitutions), SEPARATOR).to_string();

        if !self.pattern.is_match(&url) {
            trace!(url = %url, pattern = %self.pattern.as_str(), "Generated URL does not match");
            return None;
        }

        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }
        Some(url)
    }
}

/// Returns the last match with the given key.
fn find_match<'a>(matches: &'a [GroupMatch], key: &str) -> Option<&'a GroupMatch> {
    matches
        .iter()
        .rev()
        .find(|m| m.key.as_deref() == Some(key))
}
