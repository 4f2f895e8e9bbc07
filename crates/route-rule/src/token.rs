//! Token scanning for patterns and routes.
//!
//! Patterns accept `<name>` and `<name:regex>`; routes accept only the bare
//! `<name>` form. Names are ASCII word characters. Anything that does not
//! form a token is literal text.

/// A piece of a scanned pattern or route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text.
    Literal(&'a str),
    /// A token with its optional inline regex.
    Token {
        /// Parameter name.
        name: &'a str,
        /// Inline regex source, `None` when the token is bare.
        pattern: Option<&'a str>,
    },
}

/// Scans a pattern for `<name>` and `<name:regex>` tokens.
#[must_use]
pub fn scan_pattern(input: &str) -> Vec<Segment<'_>> {
    scan(input, true)
}

/// Scans a route for bare `<name>` tokens.
#[must_use]
pub fn scan_route(input: &str) -> Vec<Segment<'_>> {
    scan(input, false)
}

fn scan(input: &str, inline: bool) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(offset) = input[pos..].find('<') {
        let open = pos + offset;
        if let Some((segment, end)) = token_at(input, open, inline) {
            if literal_start < open {
                segments.push(Segment::Literal(&input[literal_start..open]));
            }
            segments.push(segment);
            pos = end;
            literal_start = end;
        } else {
            pos = open + 1;
        }
    }

    if literal_start < input.len() {
        segments.push(Segment::Literal(&input[literal_start..]));
    }
    segments
}

/// Reads a token starting at the `<` at `open`; returns it with its end
/// offset.
fn token_at(input: &str, open: usize, inline: bool) -> Option<(Segment<'_>, usize)> {
    let body = &input[open + 1..];
    let name_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    if name_len == 0 {
        return None;
    }
    let name = &body[..name_len];
    let rest = &body[name_len..];

    if inline {
        let close = rest.find('>')?;
        let raw = &rest[..close];
        let raw = raw.strip_prefix(':').unwrap_or(raw);
        let pattern = if raw.is_empty() { None } else { Some(raw) };
        Some((Segment::Token { name, pattern }, open + 1 + name_len + close + 1))
    } else if rest.starts_with('>') {
        Some((
            Segment::Token {
                name,
                pattern: None,
            },
            open + name_len + 2,
        ))
    } else {
        None
    }
}
