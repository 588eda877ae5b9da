//! Dot-addressed paths over price component documents
//!
//! A path is a sequence of segments separated by `.`. A segment is either a
//! bare identifier (`Counters`) or a bracket-quoted literal
//! (`['Basic:Non Call Services']`) so keys may contain spaces and colons.
//! A bracket segment may also follow the previous segment directly
//! (`Tab['Basic:Non Call Services']`).

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::errors::EditError;
use crate::models::NodeMap;
use crate::EditResult;

/// One key of a parsed path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub key: String,
    /// Written in bracket form in the source text
    pub quoted: bool,
}

impl Segment {
    pub fn bare(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            quoted: false,
        }
    }
}

/// Parsed document path; the empty path addresses the document root
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPath {
    pub segments: Vec<Segment>,
}

/// Parse a path string into segments
///
/// # Examples
/// ```
/// # use pricecomp_core::path::parse_path;
/// let path = parse_path("['Basic:Non Call Services'].Param39").unwrap();
/// assert_eq!(path.segments.len(), 2);
/// assert_eq!(path.name(), Some("Param39"));
/// ```
pub fn parse_path(path: &str) -> EditResult<ParsedPath> {
    let mut segments = Vec::new();
    if path.is_empty() {
        return Ok(ParsedPath { segments });
    }

    let mut rest = path;
    loop {
        let (segment, remainder) = if let Some(bracketed) = rest.strip_prefix('[') {
            let quote = bracketed
                .chars()
                .next()
                .filter(|c| *c == '\'' || *c == '"')
                .ok_or_else(|| EditError::invalid_path(path, "bracket segment must be quoted"))?;
            let body = &bracketed[1..];
            let close = body
                .find(&format!("{}]", quote))
                .ok_or_else(|| EditError::invalid_path(path, "unterminated bracket segment"))?;
            let segment = Segment {
                key: body[..close].to_string(),
                quoted: true,
            };
            (segment, &body[close + 2..])
        } else {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            if end == 0 {
                return Err(EditError::invalid_path(path, "empty segment"));
            }
            (Segment::bare(&rest[..end]), &rest[end..])
        };
        segments.push(segment);

        if remainder.is_empty() {
            break;
        }
        rest = if let Some(next) = remainder.strip_prefix('.') {
            if next.is_empty() {
                return Err(EditError::invalid_path(path, "trailing dot"));
            }
            next
        } else if remainder.starts_with('[') {
            remainder
        } else {
            return Err(EditError::invalid_path(
                path,
                format!("unexpected text after bracket segment: {}", remainder),
            ));
        };
    }

    Ok(ParsedPath { segments })
}

/// Everything before the last segment, rendered back to text
pub fn parent(path: &str) -> EditResult<String> {
    Ok(parse_path(path)?.parent().to_string())
}

/// The unquoted key of the last segment, empty for the root path
pub fn name(path: &str) -> EditResult<String> {
    Ok(parse_path(path)?.name().unwrap_or_default().to_string())
}

impl ParsedPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Key of the last segment
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.key.as_str())
    }

    /// Path without its last segment; the parent of the root is the root
    pub fn parent(&self) -> ParsedPath {
        let keep = self.segments.len().saturating_sub(1);
        ParsedPath {
            segments: self.segments[..keep].to_vec(),
        }
    }

    pub fn child(&self, key: impl Into<String>) -> ParsedPath {
        let mut segments = self.segments.clone();
        segments.push(Segment::bare(key));
        ParsedPath { segments }
    }

    /// Replace the last segment with the given keys
    pub fn with_name_replaced(&self, keys: &[&str]) -> ParsedPath {
        let mut path = self.parent();
        path.segments.extend(keys.iter().map(|k| Segment::bare(*k)));
        path
    }

    pub fn keys_eq(&self, keys: &[&str]) -> bool {
        self.segments.iter().map(|s| s.key.as_str()).eq(keys.iter().copied())
    }

    /// Structural suffix test.
    ///
    /// The first pattern key is matched as a string suffix of its segment,
    /// the remaining keys exactly, so `ExtDynamicPrice.Thresholds` ends with
    /// `["DynamicPrice", "Thresholds"]`.
    pub fn ends_with(&self, pattern: &[&str]) -> bool {
        if pattern.is_empty() || pattern.len() > self.segments.len() {
            return false;
        }
        let tail = &self.segments[self.segments.len() - pattern.len()..];
        matches_window(tail, pattern)
    }

    /// Same matching rule as [`ParsedPath::ends_with`], anywhere in the path
    pub fn contains(&self, pattern: &[&str]) -> bool {
        if pattern.is_empty() {
            return false;
        }
        self.segments
            .windows(pattern.len())
            .any(|window| matches_window(window, pattern))
    }

    /// True when `key` is the last segment and has a parent segment
    pub fn ends_with_child(&self, key: &str) -> bool {
        self.segments.len() >= 2 && self.name() == Some(key)
    }

    /// Substring test over segment keys
    pub fn mentions(&self, fragment: &str) -> bool {
        self.segments.iter().any(|s| s.key.contains(fragment))
    }

    /// True when the segment before the last one was bracket-quoted
    pub fn parent_is_quoted(&self) -> bool {
        let n = self.segments.len();
        n >= 2 && self.segments[n - 2].quoted
    }
}

fn matches_window(window: &[Segment], pattern: &[&str]) -> bool {
    window
        .iter()
        .zip(pattern)
        .enumerate()
        .all(|(i, (segment, key))| {
            if i == 0 {
                segment.key.ends_with(key)
            } else {
                segment.key == *key
            }
        })
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '_')
}

impl fmt::Display for ParsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            if is_bare_key(&segment.key) {
                f.write_str(&segment.key)?;
            } else if segment.key.contains('\'') {
                write!(f, "[\"{}\"]", segment.key)?;
            } else {
                write!(f, "['{}']", segment.key)?;
            }
        }
        Ok(())
    }
}

impl FromStr for ParsedPath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}

/// Evaluate `path` against `root`.
///
/// Missing keys and non-object intermediates yield `None`. When the
/// addressed value is an array its first element is returned instead.
pub fn resolve<'a>(root: &'a Value, path: &ParsedPath) -> Option<&'a Value> {
    let mut current = root;
    for segment in &path.segments {
        current = current.as_object()?.get(&segment.key)?;
    }
    match current {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

pub fn resolve_mut<'a>(root: &'a mut Value, path: &ParsedPath) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in &path.segments {
        current = current.as_object_mut()?.get_mut(&segment.key)?;
    }
    match current {
        Value::Array(items) => items.first_mut(),
        other => Some(other),
    }
}

/// Resolve `path` as an object; the root path yields the root itself
pub fn get<'a>(root: &'a Value, path: &ParsedPath) -> Option<&'a NodeMap> {
    if path.is_root() {
        return root.as_object();
    }
    resolve(root, path)?.as_object()
}

pub fn get_mut<'a>(root: &'a mut Value, path: &ParsedPath) -> Option<&'a mut NodeMap> {
    if path.is_root() {
        return root.as_object_mut();
    }
    resolve_mut(root, path)?.as_object_mut()
}

/// Read the array stored under the last segment of `path` in its parent object
pub fn get_array<'a>(root: &'a Value, path: &ParsedPath) -> Option<&'a Vec<Value>> {
    let name = path.name()?;
    get(root, &path.parent())?.get(name)?.as_array()
}

pub fn get_array_mut<'a>(root: &'a mut Value, path: &ParsedPath) -> Option<&'a mut Vec<Value>> {
    let name = path.name()?;
    get_mut(root, &path.parent())?.get_mut(name)?.as_array_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(path: &str) -> ParsedPath {
        parse_path(path).unwrap()
    }

    // === Parsing ===

    #[test]
    fn test_parse_dotted_path() {
        let path = p("Tab1.Counters.Counters");
        let keys: Vec<_> = path.segments.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["Tab1", "Counters", "Counters"]);
        assert!(path.segments.iter().all(|s| !s.quoted));
    }

    #[test]
    fn test_parse_bracket_segments() {
        let path = p("['Basic:Non Call Services'].UseQuantity");
        assert_eq!(path.segments[0].key, "Basic:Non Call Services");
        assert!(path.segments[0].quoted);
        assert_eq!(path.name(), Some("UseQuantity"));

        let direct = p("Tab[\"a.b\"].Unit");
        assert_eq!(direct.segments.len(), 3);
        assert_eq!(direct.segments[1].key, "a.b");
        assert!(direct.parent_is_quoted());
    }

    #[test]
    fn test_parse_root_path() {
        assert!(p("").is_root());
    }

    #[test]
    fn test_parse_invalid_paths() {
        assert!(parse_path("a..b").is_err());
        assert!(parse_path("a.").is_err());
        assert!(parse_path("['open").is_err());
        assert!(parse_path("[open]").is_err());
        assert!(parse_path("['a']b").is_err());
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent("a.b.c").unwrap(), "a.b");
        assert_eq!(name("a.b.c").unwrap(), "c");
        assert_eq!(parent("single").unwrap(), "");
        assert_eq!(name("single").unwrap(), "single");
        assert_eq!(
            parent("['Basic:Non Call Services'].Param39").unwrap(),
            "['Basic:Non Call Services']"
        );
        assert_eq!(name("x.['Basic:Non Call Services']").unwrap(), "Basic:Non Call Services");
    }

    #[test]
    fn test_display_round_trips_quoted_keys() {
        let path = p("Tab.['FF:Non Call Services'].Param39");
        assert_eq!(path.to_string(), "Tab.['FF:Non Call Services'].Param39");
        assert_eq!(p(&path.to_string()), path);
    }

    // === Suffix matching ===

    #[test]
    fn test_ends_with_suffix_semantics() {
        let path = p("Tab.ExtDynamicPrice.Thresholds");
        assert!(path.ends_with(&["DynamicPrice", "Thresholds"]));
        assert!(!path.ends_with(&["StepPrice", "Thresholds"]));
        assert!(!path.ends_with(&["Tab", "X", "DynamicPrice", "Thresholds"]));
        assert!(p("a.Counters").ends_with_child("Counters"));
        assert!(!p("Counters").ends_with_child("Counters"));
    }

    #[test]
    fn test_contains_window() {
        let path = p("Tab.Counters.Counters.Extra");
        assert!(path.contains(&["Counters", "Counters"]));
        assert!(!path.contains(&["Discounts", "Discounts"]));
        assert!(p("Tab.ExtendedPrice.X").mentions("ExtendedPrice"));
    }

    // === Resolution ===

    #[test]
    fn test_resolve_unwraps_arrays() {
        let doc = json!({"a": {"list": [{"x": 1}, {"x": 2}], "empty": []}});
        assert_eq!(resolve(&doc, &p("a.list")), Some(&json!({"x": 1})));
        assert_eq!(resolve(&doc, &p("a.empty")), None);
        assert_eq!(resolve(&doc, &p("a.missing")), None);
        assert_eq!(resolve(&doc, &p("a.list.x")), None);
    }

    #[test]
    fn test_get_requires_object() {
        let doc = json!({"a": {"b": 3}, "Basic:Non Call Services": {"UseQuantity": true}});
        assert!(get(&doc, &ParsedPath::root()).is_some());
        assert!(get(&doc, &p("a")).is_some());
        assert!(get(&doc, &p("a.b")).is_none());
        let slot = get(&doc, &p("['Basic:Non Call Services']")).unwrap();
        assert_eq!(slot.get("UseQuantity"), Some(&json!(true)));
    }

    #[test]
    fn test_get_array() {
        let mut doc = json!({"Tab": {"Thresholds": [1, 2], "Scalar": 5}});
        assert_eq!(get_array(&doc, &p("Tab.Thresholds")).map(Vec::len), Some(2));
        assert!(get_array(&doc, &p("Tab.Scalar")).is_none());
        assert!(get_array(&doc, &p("Missing.Thresholds")).is_none());

        get_array_mut(&mut doc, &p("Tab.Thresholds")).unwrap().push(json!(3));
        assert_eq!(doc["Tab"]["Thresholds"], json!([1, 2, 3]));
    }
}
