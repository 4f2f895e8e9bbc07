//! Ordered rule sets.

use std::fmt;

use serde_json::Value;
use tracing::debug;

use crate::config::RuleConfig;
use crate::error::Result;
use crate::request::{Method, Params, Url};
use crate::rule::RouteRule;

/// The operations a URL rule provides.
///
/// `None` means "this rule does not apply"; callers move on to the next rule.
pub trait UrlRule: Send + Sync + fmt::Debug {
    /// Matches a request, returning the route name and its parameters.
    fn parse_request(&self, method: Method, url: &Url) -> Option<(String, Params)>;

    /// Builds the URL of `route` with `params`.
    fn create_url(&self, route: &str, params: &Params) -> Option<String>;
}

impl UrlRule for RouteRule {
    fn parse_request(&self, method: Method, url: &Url) -> Option<(String, Params)> {
        Self::parse_request(self, method, url)
    }

    fn create_url(&self, route: &str, params: &Params) -> Option<String> {
        Self::create_url(self, route, params)
    }
}

/// An ordered list of rules; the first rule that applies wins.
///
/// Built once, then only read: lookups need no locking.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn UrlRule>>,
}

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles every configuration, in order.
    pub fn from_configs(configs: &[RuleConfig]) -> Result<Self> {
        let mut set = Self::new();
        for config in configs {
            let rule = RouteRule::new(config)?;
            debug!(
                pattern = %config.pattern,
                route = %rule.route(),
                index = set.rules.len(),
                "Registered route rule"
            );
            set.rules.push(Box::new(rule));
        }
        Ok(set)
    }

    /// Compiles the rules of an untyped JSON document.
    ///
    /// See [`RuleConfig::list_from_value`] for the accepted shapes.
    pub fn from_json(value: &Value) -> Result<Self> {
        Self::from_configs(&RuleConfig::list_from_value(value)?)
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, rule: impl UrlRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns an iterator over the rules in order.
    pub fn rules(&self) -> impl Iterator<Item = &(dyn UrlRule + 'static)> {
        self.rules.iter().map(|rule| &**rule)
    }

    /// Returns the result of the first rule matching the request.
    #[must_use]
    pub fn parse_request(&self, method: Method, url: &Url) -> Option<(String, Params)> {
        self.rules
            .iter()
            .find_map(|rule| rule.parse_request(method, url))
    }

    /// Returns the URL built by the first rule able to render `route`.
    #[must_use]
    pub fn create_url(&self, route: &str, params: &Params) -> Option<String> {
        self.rules
            .iter()
            .find_map(|rule| rule.create_url(route, params))
    }
}
