//! # route-rule
//!
//! Route pattern compilation, request matching and reverse URL generation.
//!
//! This crate provides:
//! - Patterns with `<name>` and `<name:regex>` tokens
//! - Request matching with query string merging and method checks
//! - URL generation with constraint checks and query string output
//! - Route names with tokens (`<lang>/home`) resolved in both directions
//! - Ordered rule sets where the first applicable rule wins
//!
//! ## Quick Start
//!
//! ```
//! use route_rule::{Method, Params, RuleConfig, RuleSet, Url};
//!
//! let rules = RuleSet::from_configs(&[
//!     RuleConfig::new(r"/user/<id:\d+>", "user/view"),
//!     RuleConfig::new("/<lang:en|fr>/home", "<lang>/home"),
//! ])
//! .unwrap();
//!
//! let (route, params) = rules
//!     .parse_request(Method::Get, &Url::parse("/user/42?tab=posts"))
//!     .unwrap();
//! assert_eq!(route, "user/view");
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(params.get("tab"), Some("posts"));
//!
//! let (route, _) = rules.parse_request(Method::Get, &Url::parse("/fr/home")).unwrap();
//! assert_eq!(route, "fr/home");
//!
//! let params: Params = [("id", "7")].into_iter().collect();
//! assert_eq!(rules.create_url("user/view", &params), Some("user/7".to_string()));
//! assert_eq!(rules.create_url("en/home", &Params::new()), Some("en/home".to_string()));
//! ```
//!
//! ## Pattern Syntax
//!
//! - `<name>` matches one path segment (`([^/]+)`)
//! - `<name:regex>` matches `regex`, which is also checked when generating
//!   URLs
//! - Text outside tokens is used as regex source as is
//! - Leading and trailing `/` are ignored on patterns, routes and paths
//!
//! ## Route Tokens
//!
//! A route may embed bare tokens that also appear in the pattern:
//!
//! ```
//! use route_rule::{Params, RouteRule, RuleConfig};
//!
//! let rule = RouteRule::new(&RuleConfig::new("/<lang:en|fr>/home", "<lang>/home")).unwrap();
//! assert_eq!(rule.create_url("fr/home", &Params::new()), Some("fr/home".to_string()));
//! assert_eq!(rule.create_url("de/home", &Params::new()), None);
//! ```

pub mod config;
mod error;
pub mod group;
mod request;
mod router;
mod rule;
pub mod strings;
mod token;

pub use config::{MethodSpec, RuleConfig};
pub use error::{Result, RouteRuleError};
pub use group::{CaptureGroup, CompiledPattern, GroupMatch};
pub use request::{Method, Params, Url};
pub use router::{RuleSet, UrlRule};
pub use rule::{Constraint, ParamRule, RouteParam, RouteRule, DEFAULT_TOKEN_PATTERN};
