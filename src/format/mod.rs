//! Param and director text formats.
//!
//! Both dialects map onto the same ordered [`Config`]:
//!
//! ```text
//! # param dialect
//! dKpcUnit = 4.84813681109536e-09   # 1 AU
//! achOutName = snapshot
//!
//! # director dialect
//! #sigma_max 0.0025
//! size 1000 1000
//! eye 0 0 40.0
//! ```
//!
//! Comment lines of the form `#key value...` (no space after the marker)
//! are kept as annotations, separate from ordinary entries. Any other
//! comment line is kept verbatim. Trailing `# ...` text on a param line is
//! kept as that entry's unit comment.

mod value;

pub use value::Value;

use indexmap::IndexMap;
use std::fmt;
use std::path::Path;

use crate::error::{ParamError, ParamResult};

/// Comment marker shared by both dialects.
pub const COMMENT_MARKER: char = '#';

/// Text dialect of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// `key = value  # comment`
    Param,
    /// `key value value ...`
    Director,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Param => write!(f, "param"),
            Self::Director => write!(f, "director"),
        }
    }
}

/// An ordered parameter mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    entries: IndexMap<String, Value>,
    annotations: IndexMap<String, Value>,
    unit_comments: IndexMap<String, String>,
    comments: Vec<String>,
}

/// Split the body of a `key = value` / `key value` line.
fn split_entry(body: &str, dialect: Dialect) -> Option<(&str, Vec<&str>)> {
    match dialect {
        Dialect::Param => {
            let (key, value) = body.split_once('=')?;
            Some((key.trim(), value.split_whitespace().collect()))
        }
        Dialect::Director => {
            let mut tokens = body.split_whitespace();
            let key = tokens.next()?;
            Some((key, tokens.collect()))
        }
    }
}

fn valid_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(|c: char| c.is_whitespace() || c == '=')
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Parse`] for a line that is neither blank, a
    /// comment, nor a well-formed entry of the dialect.
    pub fn parse(text: &str, dialect: Dialect) -> ParamResult<Self> {
        let mut config = Self::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(body) = line.strip_prefix(COMMENT_MARKER) {
                config.parse_comment(body);
                continue;
            }

            let (body, unit_comment) = match dialect {
                Dialect::Param => match line.split_once(COMMENT_MARKER) {
                    Some((body, comment)) => (body, Some(comment.trim())),
                    None => (line, None),
                },
                Dialect::Director => (line, None),
            };

            let expected = match dialect {
                Dialect::Param => "expected 'key = value'",
                Dialect::Director => "expected 'key value [value ...]'",
            };
            let (key, tokens) = split_entry(body, dialect)
                .ok_or_else(|| ParamError::parse(index + 1, raw, expected))?;
            if !valid_key(key) {
                return Err(ParamError::parse(index + 1, raw, "invalid key"));
            }
            let value = Value::from_tokens(&tokens)
                .ok_or_else(|| ParamError::parse(index + 1, raw, "missing value"))?;

            if let Some(comment) = unit_comment.filter(|c| !c.is_empty()) {
                config
                    .unit_comments
                    .insert(key.to_string(), comment.to_string());
            }
            config.entries.insert(key.to_string(), value);
        }

        Ok(config)
    }

    /// `#key value` becomes an annotation; anything else is a plain comment.
    fn parse_comment(&mut self, body: &str) {
        let starts_with_key = body.chars().next().is_some_and(|c| !c.is_whitespace());
        if starts_with_key {
            // `#key = a=b` splits on the first '='; `#key a=b` has no valid
            // key before it and is read director-style.
            let entry = body
                .contains('=')
                .then(|| split_entry(body, Dialect::Param))
                .flatten()
                .filter(|(key, _)| valid_key(key))
                .or_else(|| split_entry(body, Dialect::Director).filter(|(key, _)| valid_key(key)));
            if let Some((key, tokens)) = entry {
                if let Some(value) = Value::from_tokens(&tokens) {
                    self.annotations.insert(key.to_string(), value);
                    return;
                }
            }
        }
        self.comments.push(body.to_string());
    }

    /// Read and parse a file.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Io`] if the file cannot be read, or
    /// [`ParamError::Parse`] if it is malformed.
    pub fn load<P: AsRef<Path>>(path: P, dialect: Dialect) -> ParamResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::debug!("parsing {} as {dialect}", path.as_ref().display());
        Self::parse(&text, dialect)
    }

    /// Render in the given dialect. Comments come first, then annotations,
    /// then entries in insertion order.
    #[must_use]
    pub fn to_text(&self, dialect: Dialect) -> String {
        let mut out = String::new();

        for comment in &self.comments {
            out.push(COMMENT_MARKER);
            out.push_str(comment);
            out.push('\n');
        }

        for (key, value) in &self.annotations {
            let value = value.to_string();
            let line = match dialect {
                Dialect::Director if !value.contains('=') => {
                    format!("{COMMENT_MARKER}{key} {value}")
                }
                _ => format!("{COMMENT_MARKER}{key} = {value}"),
            };
            out.push_str(&line);
            out.push('\n');
        }

        for (key, value) in &self.entries {
            let line = match dialect {
                Dialect::Param => match self.unit_comments.get(key) {
                    Some(comment) => format!("{key} = {value}  {COMMENT_MARKER} {comment}"),
                    None => format!("{key} = {value}"),
                },
                Dialect::Director => format!("{key} {value}"),
            };
            out.push_str(&line);
            out.push('\n');
        }

        out
    }

    /// Check that [`Config::to_text`] would parse back to this config.
    ///
    /// Keys must be single tokens without `=`. Text values must be single
    /// tokens that do not read back as numbers, and param text may not hold
    /// the comment marker.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Validation`] naming the first offending key.
    pub fn check_writable(&self, dialect: Dialect) -> ParamResult<()> {
        let all = self.entries.iter().chain(&self.annotations);
        for (key, value) in all {
            if !valid_key(key) || key.contains(COMMENT_MARKER) {
                return Err(ParamError::validation(format!("cannot write key '{key}'")));
            }
            let marker_ok = dialect == Dialect::Director || !value.to_string().contains(COMMENT_MARKER);
            if !value.round_trips() || !marker_ok {
                return Err(ParamError::validation(format!(
                    "value of '{key}' would not read back from {dialect} text: '{value}'"
                )));
            }
        }
        Ok(())
    }

    /// Write to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::Validation`] if the config cannot be written
    /// faithfully (see [`Config::check_writable`]), or [`ParamError::Io`] if
    /// the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P, dialect: Dialect) -> ParamResult<()> {
        self.check_writable(dialect)?;
        std::fs::write(path.as_ref(), self.to_text(dialect))?;
        log::debug!("wrote {} ({dialect})", path.as_ref().display());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace; a replaced key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.unit_comments.shift_remove(key);
        self.entries.shift_remove(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Annotation `#key`, looked up without the marker.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn remove_annotation(&mut self, key: &str) -> Option<Value> {
        self.annotations.shift_remove(key)
    }

    /// Trailing comment of a param entry (usually its unit).
    #[must_use]
    pub fn unit_comment(&self, key: &str) -> Option<&str> {
        self.unit_comments.get(key).map(String::as_str)
    }

    /// Free-text comment lines, without the marker.
    #[must_use]
    pub fn comments(&self) -> &[String] {
        &self.comments
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Line {
        Entry(String, Vec<String>, Option<String>),
        Annotation(String, Vec<String>, bool),
        Comment(String),
    }

    fn token() -> impl Strategy<Value = String> {
        prop_oneof![
            any::<i32>().prop_map(|i| i.to_string()),
            (-1e12f64..1e12).prop_map(|x| format!("{x:?}")),
            "[a-z][a-z0-9_.=]{0,8}",
            "=[a-z0-9]{0,4}",
        ]
    }

    fn key() -> impl Strategy<Value = String> {
        "[a-zA-Z][a-zA-Z0-9_]{0,10}"
    }

    fn lines() -> impl Strategy<Value = Vec<Line>> {
        let tokens = || prop::collection::vec(token(), 1..4);
        let entry = (key(), tokens(), proptest::option::of("[a-zA-Z0-9 ]{1,12}"))
            .prop_map(|(k, v, c)| Line::Entry(k, v, c));
        let annotation =
            (key(), tokens(), any::<bool>()).prop_map(|(k, v, eq)| Line::Annotation(k, v, eq));
        let comment = " [a-z =#]{0,20}".prop_map(Line::Comment);
        prop::collection::vec(prop_oneof![3 => entry, 1 => annotation, 1 => comment], 0..16)
    }

    fn build(lines: &[Line], dialect: Dialect) -> String {
        lines
            .iter()
            .map(|line| match (line, dialect) {
                (Line::Entry(k, v, Some(c)), Dialect::Param) => {
                    format!("{k} = {}  # {c}\n", v.join(" "))
                }
                (Line::Entry(k, v, _), Dialect::Param) => format!("{k} = {}\n", v.join(" ")),
                (Line::Entry(k, v, _), Dialect::Director) => format!("{k} {}\n", v.join(" ")),
                (Line::Annotation(k, v, true), _) => format!("#{k} = {}\n", v.join(" ")),
                (Line::Annotation(k, v, false), _) => format!("#{k} {}\n", v.join(" ")),
                (Line::Comment(c), _) => format!("#{c}\n"),
            })
            .collect()
    }

    proptest! {
        /// Serializing then re-parsing yields the same mapping.
        #[test]
        fn prop_param_round_trip(lines in lines()) {
            let config = Config::parse(&build(&lines, Dialect::Param), Dialect::Param).unwrap();
            prop_assert!(config.check_writable(Dialect::Param).is_ok());
            let again = Config::parse(&config.to_text(Dialect::Param), Dialect::Param).unwrap();
            prop_assert_eq!(config, again);
        }

        #[test]
        fn prop_director_round_trip(lines in lines()) {
            let text = build(&lines, Dialect::Director);
            let config = Config::parse(&text, Dialect::Director).unwrap();
            prop_assert!(config.check_writable(Dialect::Director).is_ok());
            let again = Config::parse(&config.to_text(Dialect::Director), Dialect::Director).unwrap();
            prop_assert_eq!(config, again);
        }
    }
}
