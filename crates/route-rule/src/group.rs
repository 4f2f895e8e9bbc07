//! Capture group indexing.
//!
//! A regex source is scanned once: every capturing group is recorded in
//! opening order together with its name (for `(?P<name>...)` and
//! `(?<name>...)`), and named groups are rewritten to plain groups. Names
//! therefore live only in the metadata, which lets a source repeat a name.

use regex::Regex;
use tracing::warn;

use crate::error::{Result, RouteRuleError};

/// A capturing group discovered in a regex source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureGroup {
    /// Group name, `None` for positional groups.
    pub key: Option<String>,
    /// Zero-based ordinal among all capturing groups.
    pub index: usize,
    /// The group body, always parenthesized.
    pub pattern: String,
}

impl CaptureGroup {
    /// Returns true if the group was declared with a name.
    #[must_use]
    pub const fn is_named(&self) -> bool {
        self.key.is_some()
    }
}

/// The value one group captured in a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMatch {
    /// Group name, `None` for positional groups.
    pub key: Option<String>,
    /// Zero-based ordinal of the group.
    pub index: usize,
    /// Captured text; empty when the group did not participate.
    pub value: String,
}

/// A compiled regex plus its ordered capture group metadata.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    groups: Vec<CaptureGroup>,
}

impl CompiledPattern {
    /// Returns the compiled regex.
    #[must_use]
    pub const fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Returns the regex source after named groups were rewritten.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Returns the capture groups in left-to-right order.
    #[must_use]
    pub fn groups(&self) -> &[CaptureGroup] {
        &self.groups
    }

    /// Returns true if the source had at least one capturing group.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Returns true if `text` matches.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches `text` and returns one entry per capture group.
    ///
    /// Returns `None` if `text` does not match. A source without groups
    /// yields an empty list on success.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<GroupMatch>> {
        let caps = self.regex.captures(text)?;
        let matches = self
            .groups
            .iter()
            .map(|group| GroupMatch {
                key: group.key.clone(),
                index: group.index,
                value: caps
                    .get(group.index + 1)
                    .map_or_else(String::new, |m| m.as_str().to_string()),
            })
            .collect();
        Some(matches)
    }
}

/// Indexes the capture groups of `source` and compiles it.
///
/// # Example
///
/// ```
/// use route_rule::group::to_regex;
///
/// let compiled = to_regex(r"^user/(?P<id>\d+)/(\w+)$").unwrap();
/// assert_eq!(compiled.as_str(), r"^user/(\d+)/(\w+)$");
/// assert_eq!(compiled.groups()[0].key.as_deref(), Some("id"));
/// assert_eq!(compiled.groups()[1].key, None);
/// ```
pub fn to_regex(source: &str) -> Result<CompiledPattern> {
    let (rewritten, groups) = GroupScanner::new(source).scan();
    let regex = Regex::new(&rewritten).map_err(|error| RouteRuleError::InvalidRegex {
        config: serde_json::Value::Null,
        pattern: rewritten.clone(),
        error,
    })?;
    if regex.captures_len() != groups.len() + 1 {
        warn!(
            source = %source,
            indexed = groups.len(),
            compiled = regex.captures_len() - 1,
            "Capture group count differs from the compiled regex"
        );
    }
    Ok(CompiledPattern { regex, groups })
}

struct Frame {
    group: Option<usize>,
    start: usize,
}

/// Single pass scanner over a regex source.
struct GroupScanner<'a> {
    input: &'a str,
    pos: usize,
    out: String,
}

impl<'a> GroupScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            out: String::with_capacity(input.len()),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Copies an escape sequence: the backslash was already consumed.
    fn copy_escaped(&mut self) {
        self.out.push('\\');
        if let Some(c) = self.advance() {
            self.out.push(c);
        }
    }

    /// Copies a character class: the opening bracket was already consumed.
    fn copy_class(&mut self) {
        self.out.push('[');
        if self.peek() == Some('^') {
            self.advance();
            self.out.push('^');
        }
        // A leading `]` is literal.
        if self.peek() == Some(']') {
            self.advance();
            self.out.push(']');
        }

        let mut depth = 1usize;
        while let Some(c) = self.advance() {
            match c {
                '\\' => self.copy_escaped(),
                '[' => {
                    depth += 1;
                    self.out.push(c);
                }
                ']' => {
                    self.out.push(c);
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => self.out.push(c),
            }
        }
    }

    /// Consumes `?P<name>` or `?<name>` and returns the name.
    ///
    /// Leaves the position untouched for any other `(?` construct.
    fn group_name(&mut self) -> Option<String> {
        let rest = &self.input[self.pos..];
        let after = rest.strip_prefix("?P<").or_else(|| rest.strip_prefix("?<"))?;
        let len = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(after.len());
        if len == 0 || !after[len..].starts_with('>') {
            return None;
        }
        let name = after[..len].to_string();
        self.pos += rest.len() - after.len() + len + 1;
        Some(name)
    }

    fn scan(mut self) -> (String, Vec<CaptureGroup>) {
        let mut groups: Vec<CaptureGroup> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        while let Some(c) = self.advance() {
            match c {
                '\\' => self.copy_escaped(),
                '[' => self.copy_class(),
                '(' => {
                    self.out.push('(');
                    let key = if self.peek() == Some('?') {
                        match self.group_name() {
                            Some(name) => Some(name),
                            None => {
                                // (?:...), flags and the like
                                stack.push(Frame {
                                    group: None,
                                    start: self.out.len(),
                                });
                                continue;
                            }
                        }
                    } else {
                        None
                    };
                    stack.push(Frame {
                        group: Some(groups.len()),
                        start: self.out.len(),
                    });
                    groups.push(CaptureGroup {
                        key,
                        index: groups.len(),
                        pattern: String::new(),
                    });
                }
                ')' => {
                    if let Some(Frame {
                        group: Some(i),
                        start,
                    }) = stack.pop()
                    {
                        groups[i].pattern = parenthesize(&self.out[start..]);
                    }
                    self.out.push(')');
                }
                _ => self.out.push(c),
            }
        }

        (self.out, groups)
    }
}

/// Wraps `inner` in parentheses unless it already is one simple group.
fn parenthesize(inner: &str) -> String {
    let simple_group = inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .is_some_and(|body| !body.is_empty() && !body.contains(')'));
    if simple_group {
        inner.to_string()
    } else {
        format!("({inner})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_and_positional() {
        let compiled = to_regex(r"^(?P<lang>en|fr)/(\d+)/(?<slug>[^/]+)$").unwrap();
        let groups = compiled.groups();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].key.as_deref(), Some("lang"));
        assert_eq!(groups[0].pattern, "(en|fr)");
        assert!(groups[0].is_named());
        assert_eq!(groups[1].key, None);
        assert_eq!(groups[1].index, 1);
        assert_eq!(groups[2].key.as_deref(), Some("slug"));
        assert_eq!(compiled.as_str(), r"^(en|fr)/(\d+)/([^/]+)$");
    }

    #[test]
    fn test_nested_group_keeps_order() {
        let compiled = to_regex(r"^(?P<id>([^/]+))$").unwrap();
        let groups = compiled.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.as_deref(), Some("id"));
        assert_eq!(groups[0].pattern, "([^/]+)");
        assert_eq!(groups[1].key, None);
        assert_eq!(groups[1].pattern, "([^/]+)");
    }

    #[test]
    fn test_ignores_escapes_classes_and_non_capturing() {
        let compiled = to_regex(r"^\(a\)[()](?:x|y)(?i)(z)$").unwrap();
        assert_eq!(compiled.groups().len(), 1);
        assert_eq!(compiled.groups()[0].pattern, "(z)");
        assert!(compiled.is_match("(a))xZ"));
    }

    #[test]
    fn test_no_groups() {
        let compiled = to_regex("^search$").unwrap();
        assert!(!compiled.has_groups());
        assert_eq!(compiled.captures("search"), Some(Vec::new()));
        assert_eq!(compiled.captures("other"), None);
    }

    #[test]
    fn test_captures_values() {
        let compiled = to_regex(r"^user/(?P<id>\d+)(/(?P<tab>\w+))?$").unwrap();
        let matches = compiled.captures("user/42").unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0].key.as_deref(), Some("id"));
        assert_eq!(matches[0].value, "42");
        assert_eq!(matches[2].key.as_deref(), Some("tab"));
        assert_eq!(matches[2].value, "");

        let matches = compiled.captures("user/42/posts").unwrap();
        assert_eq!(matches[2].value, "posts");
    }

    #[test]
    fn test_repeated_names_are_allowed() {
        let compiled = to_regex(r"^(?P<id>\d+)/(?P<id>\d+)$").unwrap();
        let matches = compiled.captures("1/2").unwrap();
        assert_eq!(matches[0].value, "1");
        assert_eq!(matches[1].value, "2");
    }

    #[test]
    fn test_deterministic() {
        let a = to_regex(r"^(?P<a>\w+)/(b)$").unwrap();
        let b = to_regex(r"^(?P<a>\w+)/(b)$").unwrap();
        assert_eq!(a.groups(), b.groups());
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_invalid_regex() {
        let err = to_regex("^(unclosed$").unwrap_err();
        assert!(matches!(err, RouteRuleError::InvalidRegex { .. }));
        assert!(err.context().is_none());
    }
}
