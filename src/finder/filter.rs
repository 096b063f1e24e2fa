//! Entry matching
//!
//! This module provides [`Matcher`], a closed predicate over [`Elem`], the
//! built-in matchers, the combinators used to compose them, and
//! [`MultiMatcher`] (a guard plus an AND-list).

use std::fmt;
use std::ops::Not;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use glob::{MatchOptions, Pattern};
use regex::Regex;

use super::elem::Elem;
use crate::errors::{FindError, FindResult};

type Predicate = dyn Fn(&Elem) -> bool + Send + Sync;

/// A pure predicate deciding whether an entry matches
///
/// Cloning is cheap, the predicate is shared.
#[derive(Clone)]
pub struct Matcher {
    description: String,
    predicate: Arc<Predicate>,
}

impl Matcher {
    /// Create a matcher from a description and a predicate
    pub fn new<F>(description: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Elem) -> bool + Send + Sync + 'static,
    {
        Self {
            description: description.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Check if the entry matches
    pub fn matches(&self, elem: &Elem) -> bool {
        (self.predicate)(elem)
    }

    /// Get the matcher description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Both matchers must match, `other` is not evaluated if `self` fails
    pub fn and(self, other: Matcher) -> Matcher {
        let description = format!("({} and {})", self.description, other.description);
        Matcher::new(description, move |e| self.matches(e) && other.matches(e))
    }

    /// Either matcher may match
    pub fn or(self, other: Matcher) -> Matcher {
        let description = format!("({} or {})", self.description, other.description);
        Matcher::new(description, move |e| self.matches(e) || other.matches(e))
    }

    /// All matchers must match. An empty list matches everything.
    pub fn all(matchers: Vec<Matcher>) -> Matcher {
        let description = join_descriptions("all of", &matchers);
        Matcher::new(description, move |e| matchers.iter().all(|m| m.matches(e)))
    }

    /// Any matcher may match. An empty list matches nothing.
    pub fn any(matchers: Vec<Matcher>) -> Matcher {
        let description = join_descriptions("any of", &matchers);
        Matcher::new(description, move |e| matchers.iter().any(|m| m.matches(e)))
    }

    /// Matches every entry
    pub fn always() -> Matcher {
        Matcher::new("always", |_| true)
    }

    /// Matches regular (non-directory) entries
    pub fn file() -> Matcher {
        Matcher::new("is a file", |e| !e.is_dir())
    }

    /// Matches directories
    pub fn dir() -> Matcher {
        Matcher::new("is a directory", Elem::is_dir)
    }

    /// Exact base name match
    pub fn name(name: impl Into<String>) -> Matcher {
        let name = name.into();
        Matcher::new(format!("name is '{}'", name), move |e| e.name() == name)
    }

    /// Base name equals any of the given names
    pub fn names<I, S>(names: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Matcher::any(names.into_iter().map(Matcher::name).collect())
    }

    /// Glob match against the base name
    pub fn glob(pattern: &str) -> FindResult<Matcher> {
        Self::glob_with(pattern, MatchOptions::new(), false)
    }

    /// Case-insensitive glob match against the base name
    pub fn glob_ignore_case(pattern: &str) -> FindResult<Matcher> {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        Self::glob_with(pattern, options, false)
    }

    /// Glob match against the full path
    pub fn glob_path(pattern: &str) -> FindResult<Matcher> {
        Self::glob_with(pattern, MatchOptions::new(), true)
    }

    fn glob_with(pattern: &str, options: MatchOptions, full_path: bool) -> FindResult<Matcher> {
        let compiled = Pattern::new(pattern).map_err(|e| FindError::PatternError {
            message: format!("Invalid pattern '{}': {}", pattern, e),
        })?;

        let description = if full_path {
            format!("path matches '{}'", pattern)
        } else if options.case_sensitive {
            format!("name matches '{}'", pattern)
        } else {
            format!("name (ignore case) matches '{}'", pattern)
        };

        Ok(Matcher::new(description, move |e| {
            if full_path {
                compiled.matches_path_with(e.path(), options)
            } else {
                compiled.matches_with(e.name(), options)
            }
        }))
    }

    /// Exact match, or a glob match when the rule contains `*`, `?` or `[`
    pub fn name_rule(rule: &str) -> FindResult<Matcher> {
        if rule.contains(['*', '?', '[']) {
            Self::glob(rule)
        } else {
            Ok(Self::name(rule))
        }
    }

    /// Extension match, with or without the leading dot
    ///
    /// Multi-part extensions such as `tar.gz` are supported. A dot file whose
    /// whole name is the extension (`.go`) does not match.
    pub fn ext(ext: &str) -> Matcher {
        let ext = ext.trim_start_matches('.').to_string();
        let suffix = format!(".{}", ext);
        Matcher::new(format!("extension is '{}'", ext), move |e| {
            let name = e.name();
            name.len() > suffix.len() && name.ends_with(&suffix)
        })
    }

    /// Extension equals any of the given extensions
    pub fn exts<I, S>(exts: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Matcher::any(exts.into_iter().map(|e| Matcher::ext(e.as_ref())).collect())
    }

    /// Base name starts with `prefix`
    pub fn prefix(prefix: impl Into<String>) -> Matcher {
        let prefix = prefix.into();
        Matcher::new(format!("name starts with '{}'", prefix), move |e| {
            e.name().starts_with(&prefix)
        })
    }

    /// Base name ends with `suffix`
    pub fn suffix(suffix: impl Into<String>) -> Matcher {
        let suffix = suffix.into();
        Matcher::new(format!("name ends with '{}'", suffix), move |e| {
            e.name().ends_with(&suffix)
        })
    }

    /// Full path starts with `prefix`
    pub fn path_prefix(prefix: impl Into<String>) -> Matcher {
        let prefix = prefix.into();
        Matcher::new(format!("path starts with '{}'", prefix), move |e| {
            e.path().to_string_lossy().starts_with(&prefix)
        })
    }

    /// Full path ends with `suffix`
    pub fn path_suffix(suffix: impl Into<String>) -> Matcher {
        let suffix = suffix.into();
        Matcher::new(format!("path ends with '{}'", suffix), move |e| {
            e.path().to_string_lossy().ends_with(&suffix)
        })
    }

    /// Full path contains `sub`
    pub fn path(sub: impl Into<String>) -> Matcher {
        let sub = sub.into();
        Matcher::new(format!("path contains '{}'", sub), move |e| {
            e.path().to_string_lossy().contains(&sub)
        })
    }

    /// Full path contains any of the given substrings
    pub fn paths<I, S>(subs: I) -> Matcher
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Matcher::any(subs.into_iter().map(Matcher::path).collect())
    }

    /// Regex match against the base name
    pub fn regex(pattern: &str) -> FindResult<Matcher> {
        let re = Regex::new(pattern)?;
        Ok(Matcher::new(format!("name matches /{}/", pattern), move |e| {
            re.is_match(e.name())
        }))
    }

    /// Regex match against the full path
    pub fn path_regex(pattern: &str) -> FindResult<Matcher> {
        let re = Regex::new(pattern)?;
        Ok(Matcher::new(format!("path matches /{}/", pattern), move |e| {
            re.is_match(&e.path().to_string_lossy())
        }))
    }

    /// Modification time within `[start, end]`
    ///
    /// A `None` bound is open. Entries whose stat fails never match.
    pub fn mtime_range(start: Option<SystemTime>, end: Option<SystemTime>) -> Matcher {
        Matcher::new("mtime in range", move |e| match e.info() {
            Ok(stat) => {
                let after_start = start.map_or(true, |s| stat.modified >= s);
                after_start && end.map_or(true, |t| stat.modified <= t)
            }
            Err(_) => false,
        })
    }

    /// Modified within the last `window`, measured from when the matcher is built
    pub fn mtime_within(window: Duration) -> Matcher {
        let start = SystemTime::now().checked_sub(window);
        Matcher::mtime_range(start, None).described(format!("modified within {:?}", window))
    }

    /// File size within `[min, max]` bytes, `0` leaves a bound open
    ///
    /// Directories never match, nor do entries whose stat fails.
    pub fn size_range(min: u64, max: u64) -> Matcher {
        Matcher::new(format!("size in [{}, {}]", min, max), move |e| {
            if e.is_dir() {
                return false;
            }
            match e.info() {
                Ok(stat) => (min == 0 || stat.size >= min) && (max == 0 || stat.size <= max),
                Err(_) => false,
            }
        })
    }

    /// Size range with human-readable bounds such as `"1K"` and `"10MB"`
    ///
    /// An empty bound is open.
    pub fn human_size_range(min: &str, max: &str) -> FindResult<Matcher> {
        let parse = |s: &str| if s.trim().is_empty() { Ok(0) } else { parse_human_size(s) };
        Ok(Matcher::size_range(parse(min)?, parse(max)?))
    }

    /// Files whose name starts with `.`
    pub fn dot_file() -> Matcher {
        Matcher::new("is a dot file", |e| !e.is_dir() && e.is_dot())
    }

    /// Directories whose name starts with `.`
    pub fn dot_dir() -> Matcher {
        Matcher::new("is a dot directory", |e| e.is_dir() && e.is_dot())
    }

    fn described(mut self, description: String) -> Matcher {
        self.description = description;
        self
    }
}

impl Not for Matcher {
    type Output = Matcher;

    fn not(self) -> Matcher {
        let description = format!("not {}", self.description);
        Matcher::new(description, move |e| !self.matches(e))
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Matcher").field(&self.description).finish()
    }
}

fn join_descriptions(logic: &str, matchers: &[Matcher]) -> String {
    let parts: Vec<&str> = matchers.iter().map(|m| m.description()).collect();
    format!("{} [{}]", logic, parts.join(", "))
}

/// A guard matcher followed by an ordered AND-list
///
/// The guard is evaluated first. When it fails the list is skipped.
#[derive(Debug, Clone, Default)]
pub struct MultiMatcher {
    guard: Option<Matcher>,
    matchers: Vec<Matcher>,
}

impl MultiMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MultiMatcher guarded by `guard`
    pub fn guarded(guard: Matcher) -> Self {
        Self {
            guard: Some(guard),
            matchers: Vec::new(),
        }
    }

    /// Append a matcher to the AND-list
    pub fn add(&mut self, matcher: Matcher) {
        self.matchers.push(matcher);
    }

    /// Builder form of [`MultiMatcher::add`]
    pub fn with(mut self, matcher: Matcher) -> Self {
        self.add(matcher);
        self
    }

    pub fn guard(&self) -> Option<&Matcher> {
        self.guard.as_ref()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    pub fn matches(&self, elem: &Elem) -> bool {
        if let Some(guard) = &self.guard {
            if !guard.matches(elem) {
                return false;
            }
        }
        self.matchers.iter().all(|m| m.matches(elem))
    }

    pub fn description(&self) -> String {
        let list = join_descriptions("all of", &self.matchers);
        match &self.guard {
            Some(guard) => format!("{} then {}", guard.description(), list),
            None => list,
        }
    }
}

impl From<MultiMatcher> for Matcher {
    fn from(multi: MultiMatcher) -> Self {
        let description = multi.description();
        Matcher::new(description, move |e| multi.matches(e))
    }
}

/// Parse a human-readable size such as `512`, `1K`, `1.5MB` or `2g`
///
/// Units are binary (1K = 1024 bytes).
pub fn parse_human_size(input: &str) -> FindResult<u64> {
    let s = input.trim();
    let split = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    let (number, unit) = s.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| FindError::InvalidSize(input.to_string()))?;

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1 << 10,
        "M" | "MB" => 1 << 20,
        "G" | "GB" => 1 << 30,
        "T" | "TB" => 1 << 40,
        _ => return Err(FindError::InvalidSize(input.to_string())),
    };

    Ok((value * multiplier as f64) as u64)
}
