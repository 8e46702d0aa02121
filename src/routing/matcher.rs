//! Route matching logic.
//!
//! # Responsibilities
//! - Parse path templates such as `/tradition/:tradition/:manuscript`
//! - Match a concrete path against a template
//! - Extract named path parameters
//!
//! # Design Decisions
//! - Literal segments compare ASCII case-insensitively
//! - Parameter values are percent-decoded on match and encoded on render;
//!   a value that is not valid UTF-8 once decoded is kept as written
//! - A parameter matches exactly one non-empty segment
//! - One trailing slash is tolerated; query string and fragment are ignored
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::routing::RouteError;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Trait for matching paths against a route condition.
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns the extracted parameters if the path matches.
    fn match_path(&self, path: &str) -> Option<RouteParams>;
}

/// Path parameters in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    entries: Vec<(String, String)>,
}

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing an existing value of the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = RouteParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl fmt::Display for RouteParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A parsed path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parse and validate a template.
    pub fn parse(template: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if !template.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let parsed = Self::from_static(template);
        let mut seen: Vec<&str> = Vec::new();
        for segment in &parsed.segments {
            match segment {
                Segment::Param(name) if name.is_empty() => {
                    return Err(invalid("parameter without a name"));
                }
                Segment::Param(name) if seen.contains(&name.as_str()) => {
                    return Err(invalid("duplicate parameter name"));
                }
                Segment::Param(name) => seen.push(name),
                Segment::Literal(literal) if literal.is_empty() => {
                    return Err(invalid("empty segment"));
                }
                Segment::Literal(_) => {}
            }
        }
        Ok(parsed)
    }

    /// Split a template known to be well formed.
    pub(crate) fn from_static(template: &str) -> Self {
        let segments = split_path(template)
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self {
            source: template.to_string(),
            segments,
        }
    }

    /// The template as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parameter names in order of appearance.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Build a concrete path from parameter values, percent-encoding each value.
    pub fn render(&self, params: &RouteParams) -> Result<String, RouteError> {
        if self.segments.is_empty() {
            return Ok("/".to_string());
        }

        let mut path = String::new();
        for segment in &self.segments {
            path.push('/');
            match segment {
                Segment::Literal(literal) => path.push_str(literal),
                Segment::Param(name) => match params.get(name) {
                    Some(value) if !value.is_empty() => path.extend(utf8_percent_encode(value, SEGMENT)),
                    _ => {
                        return Err(RouteError::MissingParam {
                            route: self.source.clone(),
                            param: name.clone(),
                        })
                    }
                },
            }
        }
        Ok(path)
    }
}

impl Matcher for PathTemplate {
    fn match_path(&self, path: &str) -> Option<RouteParams> {
        let path = normalize(path)?;
        let mut params = RouteParams::new();
        let mut actual = split_path(path);

        for segment in &self.segments {
            let value = actual.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if !literal.eq_ignore_ascii_case(value) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if value.is_empty() {
                        return None;
                    }
                    params.insert(name.as_str(), decode_segment(value));
                }
            }
        }

        // Exact segment count
        if actual.next().is_some() {
            return None;
        }
        Some(params)
    }
}

/// Drop query string, fragment and one trailing slash. `None` for relative paths.
pub(crate) fn normalize(path: &str) -> Option<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = &path[..end];
    if !path.starts_with('/') {
        return None;
    }
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => Some(trimmed),
        _ => Some(path),
    }
}

fn decode_segment(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8().unwrap_or(Cow::Borrowed(raw))
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    // "/" has no segments at all
    let rest = if trimmed.is_empty() { None } else { Some(trimmed) };
    rest.into_iter().flat_map(|r| r.split('/'))
}
