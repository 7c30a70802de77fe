use std::fmt;

use percent_encoding::percent_decode_str;

use super::error::PatternError;

/// One segment of a compiled path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `:name` - exactly one non-empty segment
    Param,
    /// `:name*` - zero or more trailing segments
    ZeroOrMore,
    /// `:name+` - one or more trailing segments
    OneOrMore,
}

/// A precompiled path matcher such as `/bureaux/:path*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        if !pattern.starts_with('/') {
            return Err(PatternError::NotAbsolute(pattern.to_string()));
        }

        let raw: Vec<&str> = split_segments(pattern).collect();
        let mut segments = Vec::with_capacity(raw.len());

        for (idx, part) in raw.iter().enumerate() {
            let is_last = idx + 1 == raw.len();
            let segment = match part.strip_prefix(':') {
                None => Segment::Literal((*part).to_string()),
                Some(param) => {
                    let (name, segment) = if let Some(name) = param.strip_suffix('*') {
                        (name, Segment::ZeroOrMore)
                    } else if let Some(name) = param.strip_suffix('+') {
                        (name, Segment::OneOrMore)
                    } else {
                        (param, Segment::Param)
                    };

                    if name.is_empty() {
                        return Err(PatternError::EmptyParam(pattern.to_string()));
                    }
                    if !is_last && segment != Segment::Param {
                        return Err(PatternError::WildcardNotLast(pattern.to_string()));
                    }
                    segment
                }
            };
            segments.push(segment);
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, path: &str) -> bool {
        let parts: Vec<&str> = split_segments(path).collect();
        let mut i = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i) != Some(&lit.as_str()) {
                        return false;
                    }
                    i += 1;
                }
                Segment::Param => {
                    if i >= parts.len() {
                        return false;
                    }
                    i += 1;
                }
                Segment::ZeroOrMore => return true,
                Segment::OneOrMore => return i < parts.len(),
            }
        }

        i == parts.len()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Request path as a file server resolves it: percent-decoded, empty and `.`
/// segments dropped, `..` popping its parent. A trailing slash is kept.
pub fn normalize_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut path = format!("/{}", segments.join("/"));
    if !segments.is_empty() && decoded.ends_with('/') {
        path.push('/');
    }
    path
}

/// Split a path into non-empty segments, so `/a//b/` yields `a`, `b`
fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
