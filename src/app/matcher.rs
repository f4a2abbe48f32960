//! Path patterns for selecting which requests the interceptor sees.
//!
//! Patterns are `/`-separated segments. A segment is either a literal or a
//! named parameter with an optional modifier:
//!
//! ```text
//! /about        literal
//! /:id          exactly one segment
//! /:id?         zero or one segment
//! /:rest*       zero or more segments (final position only)
//! /:rest+       one or more segments (final position only)
//! ```
//!
//! `/:path*` matches every path, including `/`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    One,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(Modifier),
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern.
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let rest = pattern
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(pattern.to_string()))?;

        let raw: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (i, seg) in raw.iter().enumerate() {
            let Some(param) = seg.strip_prefix(':') else {
                segments.push(Segment::Literal(seg.to_string()));
                continue;
            };

            let (name, modifier) = match param.as_bytes().last() {
                Some(b'?') => (&param[..param.len() - 1], Modifier::Optional),
                Some(b'*') => (&param[..param.len() - 1], Modifier::ZeroOrMore),
                Some(b'+') => (&param[..param.len() - 1], Modifier::OneOrMore),
                _ => (param, Modifier::One),
            };

            if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(PatternError::InvalidParameter(seg.to_string()));
            }

            let repeated = matches!(modifier, Modifier::ZeroOrMore | Modifier::OneOrMore);
            if repeated && i + 1 != raw.len() {
                return Err(PatternError::RepeatNotLast(seg.to_string()));
            }

            segments.push(Segment::Param(modifier));
        }

        Ok(PathPattern {
            source: pattern.to_string(),
            segments,
        })
    }

    /// Whether `path` (without query string) matches the pattern.
    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(segments: &[Segment], parts: &[&str]) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return parts.is_empty();
    };

    match segment {
        Segment::Literal(literal) => {
            parts.first() == Some(&literal.as_str()) && match_segments(rest, &parts[1..])
        }
        Segment::Param(modifier) => match modifier {
            Modifier::One => !parts.is_empty() && match_segments(rest, &parts[1..]),
            Modifier::Optional => {
                match_segments(rest, parts)
                    || (!parts.is_empty() && match_segments(rest, &parts[1..]))
            }
            // Repeated parameters are always last
            Modifier::ZeroOrMore => true,
            Modifier::OneOrMore => !parts.is_empty(),
        },
    }
}

/// Pattern compilation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    MissingLeadingSlash(String),
    InvalidParameter(String),
    RepeatNotLast(String),
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::MissingLeadingSlash(p) => {
                write!(f, "pattern '{p}' must start with '/'")
            }
            PatternError::InvalidParameter(s) => write!(f, "invalid parameter segment '{s}'"),
            PatternError::RepeatNotLast(s) => {
                write!(f, "repeated parameter '{s}' must be the last segment")
            }
        }
    }
}

impl std::error::Error for PatternError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_all() {
        let pattern = PathPattern::parse("/:path*").unwrap();
        for path in ["/", "", "/a", "/a/b/c", "/set-cookie", "/a/"] {
            assert!(pattern.matches(path), "{path}");
        }
    }

    #[test]
    fn test_literal() {
        let pattern = PathPattern::parse("/set-cookie").unwrap();
        assert!(pattern.matches("/set-cookie"));
        assert!(pattern.matches("/set-cookie/"));
        assert!(!pattern.matches("/"));
        assert!(!pattern.matches("/set-cookie/x"));
        assert!(!pattern.matches("/other"));
    }

    #[test]
    fn test_root() {
        let pattern = PathPattern::parse("/").unwrap();
        assert!(pattern.matches("/"));
        assert!(!pattern.matches("/a"));
    }

    #[test]
    fn test_params() {
        let one = PathPattern::parse("/users/:id").unwrap();
        assert!(one.matches("/users/7"));
        assert!(!one.matches("/users"));
        assert!(!one.matches("/users/7/posts"));

        let optional = PathPattern::parse("/users/:id?").unwrap();
        assert!(optional.matches("/users"));
        assert!(optional.matches("/users/7"));
        assert!(!optional.matches("/users/7/posts"));

        let plus = PathPattern::parse("/api/:rest+").unwrap();
        assert!(!plus.matches("/api"));
        assert!(plus.matches("/api/v1"));
        assert!(plus.matches("/api/v1/items"));
        assert!(!plus.matches("/other/v1"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            PathPattern::parse("path"),
            Err(PatternError::MissingLeadingSlash("path".to_string()))
        );
        assert_eq!(
            PathPattern::parse("/:"),
            Err(PatternError::InvalidParameter(":".to_string()))
        );
        assert_eq!(
            PathPattern::parse("/:a-b"),
            Err(PatternError::InvalidParameter(":a-b".to_string()))
        );
        assert_eq!(
            PathPattern::parse("/:rest*/tail"),
            Err(PatternError::RepeatNotLast(":rest*".to_string()))
        );
    }

    #[test]
    fn test_display() {
        let pattern = PathPattern::parse("/:path*").unwrap();
        assert_eq!(pattern.to_string(), "/:path*");
    }
}
