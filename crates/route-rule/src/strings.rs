//! Separator trimming and literal substitution.

/// A literal `key` to `value` replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Text to look for.
    pub key: String,
    /// Replacement text.
    pub value: String,
}

impl Substitution {
    /// Creates a new substitution.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a substitution for the bare token `<name>`.
    pub fn token(name: &str, value: impl Into<String>) -> Self {
        Self::new(format!("<{name}>"), value)
    }
}

/// Trims surrounding whitespace, then one leading and one trailing `strip`.
///
/// A string that is exactly `strip` is returned as is, so `"/"` stays `"/"`.
///
/// # Example
///
/// ```
/// use route_rule::strings::trim;
///
/// assert_eq!(trim(" /user/42/ ", '/'), "user/42");
/// assert_eq!(trim("/", '/'), "/");
/// ```
#[must_use]
pub fn trim(s: &str, strip: char) -> &str {
    let s = s.trim();
    if s.len() == strip.len_utf8() && s.starts_with(strip) {
        return s;
    }
    let s = s.strip_prefix(strip).unwrap_or(s);
    s.strip_suffix(strip).unwrap_or(s)
}

#[derive(Debug)]
struct Piece {
    text: String,
    substituted: bool,
}

impl Piece {
    const fn source(text: String) -> Self {
        Self {
            text,
            substituted: false,
        }
    }

    const fn value(text: String) -> Self {
        Self {
            text,
            substituted: true,
        }
    }
}

/// Applies `substitutions` in order, each replacing the first occurrence of
/// its key.
///
/// Only text from `input` is searched: a value inserted by one substitution
/// is never matched by a later key.
///
/// # Example
///
/// ```
/// use route_rule::strings::{escape, Substitution};
///
/// let subs = [Substitution::token("id", "<id>7"), Substitution::token("id", "8")];
/// assert_eq!(escape("a/<id>/b/<id>", &subs), "a/<id>7/b/8");
/// ```
#[must_use]
pub fn escape(input: &str, substitutions: &[Substitution]) -> String {
    let mut pieces = vec![Piece::source(input.to_string())];

    for sub in substitutions {
        if sub.key.is_empty() {
            continue;
        }
        let found = pieces.iter().enumerate().find_map(|(i, piece)| {
            if piece.substituted {
                None
            } else {
                piece.text.find(&sub.key).map(|at| (i, at))
            }
        });
        if let Some((i, at)) = found {
            let text = std::mem::take(&mut pieces[i].text);
            let before = text[..at].to_string();
            let after = text[at + sub.key.len()..].to_string();
            pieces.splice(
                i..=i,
                [
                    Piece::source(before),
                    Piece::value(sub.value.clone()),
                    Piece::source(after),
                ],
            );
        }
    }

    pieces.into_iter().map(|piece| piece.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_separators() {
        assert_eq!(trim("/user/42/", '/'), "user/42");
        assert_eq!(trim("user", '/'), "user");
        assert_eq!(trim("  /blog  ", '/'), "blog");
    }

    #[test]
    fn test_trim_only_one_occurrence() {
        assert_eq!(trim("//a//", '/'), "/a/");
        assert_eq!(trim("//", '/'), "");
    }

    #[test]
    fn test_trim_exact_strip_is_kept() {
        assert_eq!(trim("/", '/'), "/");
        assert_eq!(trim(" / ", '/'), "/");
        assert_eq!(trim("", '/'), "");
    }

    #[test]
    fn test_escape_in_order() {
        let subs = [
            Substitution::token("lang", "fr"),
            Substitution::token("id", "42"),
        ];
        assert_eq!(escape("<lang>/user/<id>", &subs), "fr/user/42");
    }

    #[test]
    fn test_escape_first_occurrence_only() {
        let subs = [Substitution::token("id", "1")];
        assert_eq!(escape("<id>/<id>", &subs), "1/<id>");
    }

    #[test]
    fn test_escape_missing_key_is_noop() {
        let subs = [Substitution::token("slug", "x")];
        assert_eq!(escape("user/<id>", &subs), "user/<id>");
        assert_eq!(escape("user", &[]), "user");
    }

    #[test]
    fn test_escape_does_not_rescan_values() {
        let subs = [
            Substitution::token("a", "<b>"),
            Substitution::token("b", "2"),
        ];
        assert_eq!(escape("<a>/<b>", &subs), "<b>/2");
    }
}
