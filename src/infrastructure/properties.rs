//! Property resource loader
//!
//! Resolves dotted or slashed resource names against a list of search roots
//! and parses the `.ccf`/`.properties` key/value format.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::CacheError;

const SUFFIX_CCF: &str = ".ccf";
const SUFFIX_PROPERTIES: &str = ".properties";
const REGION_PREFIX: &str = "jcs.region.";

/// Maps a resource name to a relative path
///
/// A leading `/` and a `.ccf` suffix are optional and `.` or `/` may
/// separate segments, so `some.pkg.Resource`, `some/pkg/Resource.ccf` and
/// `/some/pkg/Resource` all resolve to `some/pkg/Resource.ccf`. A
/// `.properties` suffix selects that extension instead.
pub fn resolve_resource_name(name: &str) -> String {
    let mut name = name.strip_prefix('/').unwrap_or(name);
    let mut suffix = SUFFIX_CCF;

    if let Some(stripped) = name.strip_suffix(SUFFIX_CCF) {
        name = stripped;
    }

    if let Some(stripped) = name.strip_suffix(SUFFIX_PROPERTIES) {
        name = stripped;
        suffix = SUFFIX_PROPERTIES;
    }

    format!("{}{}", name.replace('.', "/"), suffix)
}

/// Parsed key/value pairs of a property resource
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries under `prefix`, with the prefix stripped from their keys
    pub fn with_prefix(&self, prefix: &str) -> Properties {
        let entries = self
            .entries
            .iter()
            .filter_map(|(k, v)| k.strip_prefix(prefix).map(|rest| (rest.to_string(), v.clone())))
            .collect();

        Properties { entries }
    }

    /// Names of the cache regions declared by `jcs.region.<name>` keys
    pub fn cache_regions(&self) -> Vec<String> {
        self.with_prefix(REGION_PREFIX)
            .entries
            .into_keys()
            .filter(|name| !name.is_empty() && !name.contains('.'))
            .collect()
    }

    /// Parses property text; `resource` only labels errors
    pub fn parse(resource: &str, text: &str) -> Result<Self, CacheError> {
        let mut entries = BTreeMap::new();

        for line in logical_lines(text) {
            let (key, value) = split_key_value(&line);
            let key = unescape(resource, key)?;
            let value = unescape(resource, value)?;
            entries.insert(key, value);
        }

        Ok(Self { entries })
    }
}

// Only space, tab and form feed separate or indent; other Unicode whitespace is key text.
fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{0c}')
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Joins continued lines and drops blanks and comments
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches(is_blank);

        let line = match current.take() {
            Some(mut pending) => {
                pending.push_str(trimmed);
                pending
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };

        if ends_with_continuation(&line) {
            let mut pending = line;
            pending.pop();
            current = Some(pending);
        } else {
            lines.push(line);
        }
    }

    if let Some(pending) = current {
        lines.push(pending);
    }

    lines
}

/// Splits at the first unescaped `=`, `:` or whitespace
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = i;
            break;
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches(is_blank);

    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches(is_blank);
    }

    (key, rest)
}

fn unescape(resource: &str, raw: &str) -> Result<String, CacheError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{0c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4)
                    .and_then(char::from_u32)
                    .ok_or_else(|| {
                        CacheError::properties(resource, format!("malformed \\u escape '{}'", hex))
                    })?;
                out.push(decoded);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Loads property resources from an ordered list of search roots
#[derive(Debug, Clone)]
pub struct PropertyLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for PropertyLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from(".")])
    }
}

impl PropertyLoader {
    pub fn new(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Finds the first root holding the resource
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        let relative = resolve_resource_name(name);

        self.search_paths
            .iter()
            .map(|root| root.join(&relative))
            .find(|path| path.is_file())
    }

    /// Loads and parses the named resource
    ///
    /// A resource missing from every root is an error.
    pub fn load(&self, name: &str) -> Result<Properties, CacheError> {
        let resource = resolve_resource_name(name);
        let path = self
            .locate(name)
            .ok_or_else(|| CacheError::properties_not_found(&resource))?;

        let properties = load_file(&resource, &path)?;
        debug!(
            resource = %resource,
            path = %path.display(),
            entries = properties.len(),
            "Loaded properties"
        );

        Ok(properties)
    }
}

fn load_file(resource: &str, path: &Path) -> Result<Properties, CacheError> {
    let bytes = std::fs::read(path)
        .map_err(|e| CacheError::properties(resource, format!("read failed: {}", e)))?;

    Properties::parse(resource, &decode(bytes))
}

/// UTF-8 when the bytes are valid UTF-8, ISO-8859-1 otherwise
fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
