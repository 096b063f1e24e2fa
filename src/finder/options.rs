//! Options for file finding
//!
//! This module provides [`FindOptions`], the builder that accumulates scan
//! roots and rules, and [`compile`], which turns those rules into the
//! matchers the walker applies.

use std::path::PathBuf;

use super::filter::{Matcher, MultiMatcher};
use crate::errors::FindResult;

/// Which kinds of entries are emitted as results
///
/// Only affects emission. Directories are always descended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindFlags(u8);

impl FindFlags {
    pub const FILE: FindFlags = FindFlags(0b01);
    pub const DIR: FindFlags = FindFlags(0b10);
    pub const BOTH: FindFlags = FindFlags(0b11);

    pub fn contains(self, other: FindFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether an entry of this kind is emitted
    pub fn accepts(self, is_dir: bool) -> bool {
        if is_dir {
            self.contains(FindFlags::DIR)
        } else {
            self.contains(FindFlags::FILE)
        }
    }

    /// Guard matcher for this flag set, `None` when both kinds pass
    fn guard(self) -> Option<Matcher> {
        match (self.contains(FindFlags::FILE), self.contains(FindFlags::DIR)) {
            (true, true) => None,
            (false, true) => Some(Matcher::dir()),
            _ => Some(Matcher::file()),
        }
    }
}

impl Default for FindFlags {
    fn default() -> Self {
        FindFlags::FILE
    }
}

impl std::ops::BitOr for FindFlags {
    type Output = FindFlags;

    fn bitor(self, rhs: FindFlags) -> FindFlags {
        FindFlags(self.0 | rhs.0)
    }
}

/// Include and exclude lists for one rule category
///
/// Entries within a list are OR-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl RuleSet {
    fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

/// Options for configuring the file finding process
///
/// Every rule setter appends, so repeated calls accumulate.
#[derive(Debug, Clone)]
pub struct FindOptions {
    /// Scan roots, walked in order. Duplicates are kept.
    pub scan_dirs: Vec<PathBuf>,

    /// Kinds of entries emitted
    pub find_flags: FindFlags,

    /// Maximum depth below each root. `None` or `Some(0)` is unlimited.
    pub max_depth: Option<usize>,

    /// Make result paths absolute
    pub use_abs_path: bool,

    /// Keep the results of the first walk and reuse them
    pub cache_result: bool,

    /// Neither emit nor descend into directories starting with `.`
    pub exclude_dot_dir: bool,

    /// Do not emit files starting with `.`
    pub exclude_dot_file: bool,

    /// Worker pool size. `0` and `1` walk sequentially.
    pub concurrency: usize,

    /// Base name rules (files and directories); globs allowed
    pub names: RuleSet,

    /// Extension rules (files only)
    pub exts: RuleSet,

    /// Path substring rules (files and directories)
    pub paths: RuleSet,

    /// Directory name rules; excluded directories are not descended
    pub dirs: RuleSet,

    /// File name rules (files only); globs allowed
    pub files: RuleSet,

    /// Explicit include matchers
    pub includes: Vec<Matcher>,

    /// Explicit exclude matchers
    pub excludes: Vec<Matcher>,
}

impl FindOptions {
    /// Create a new FindOptions with default values
    pub fn new() -> Self {
        Self {
            scan_dirs: Vec::new(),
            find_flags: FindFlags::default(),
            max_depth: None,
            use_abs_path: false,
            cache_result: false,
            exclude_dot_dir: false,
            exclude_dot_file: false,
            concurrency: 0,
            names: RuleSet::default(),
            exts: RuleSet::default(),
            paths: RuleSet::default(),
            dirs: RuleSet::default(),
            files: RuleSet::default(),
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    /// Add scan roots
    pub fn scan_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.scan_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add one scan root
    pub fn scan_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scan_dirs.push(dir.into());
        self
    }

    pub fn with_flags(mut self, flags: FindFlags) -> Self {
        self.find_flags = flags;
        self
    }

    /// Emit only directories
    pub fn only_dirs(self) -> Self {
        self.with_flags(FindFlags::DIR)
    }

    /// Emit files and directories
    pub fn files_and_dirs(self) -> Self {
        self.with_flags(FindFlags::BOTH)
    }

    /// Set the maximum depth to search
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_abs_path(mut self, on: bool) -> Self {
        self.use_abs_path = on;
        self
    }

    pub fn with_cache_result(mut self, on: bool) -> Self {
        self.cache_result = on;
        self
    }

    pub fn exclude_dot_dir(mut self, on: bool) -> Self {
        self.exclude_dot_dir = on;
        self
    }

    pub fn exclude_dot_file(mut self, on: bool) -> Self {
        self.exclude_dot_file = on;
        self
    }

    /// Set the worker pool size
    pub fn with_concurrency(mut self, workers: usize) -> Self {
        self.concurrency = workers;
        self
    }

    /// Use one worker per logical CPU
    pub fn with_auto_concurrency(self) -> Self {
        self.with_concurrency(num_cpus::get())
    }

    pub fn include_name(mut self, name: impl Into<String>) -> Self {
        self.names.include.push(name.into());
        self
    }

    pub fn exclude_name(mut self, name: impl Into<String>) -> Self {
        self.names.exclude.push(name.into());
        self
    }

    pub fn include_ext(mut self, ext: impl Into<String>) -> Self {
        self.exts.include.push(ext.into());
        self
    }

    pub fn exclude_ext(mut self, ext: impl Into<String>) -> Self {
        self.exts.exclude.push(ext.into());
        self
    }

    pub fn include_path(mut self, sub: impl Into<String>) -> Self {
        self.paths.include.push(sub.into());
        self
    }

    pub fn exclude_path(mut self, sub: impl Into<String>) -> Self {
        self.paths.exclude.push(sub.into());
        self
    }

    pub fn include_dir(mut self, name: impl Into<String>) -> Self {
        self.dirs.include.push(name.into());
        self
    }

    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.dirs.exclude.push(name.into());
        self
    }

    pub fn include_file(mut self, name: impl Into<String>) -> Self {
        self.files.include.push(name.into());
        self
    }

    pub fn exclude_file(mut self, name: impl Into<String>) -> Self {
        self.files.exclude.push(name.into());
        self
    }

    /// Add an explicit include matcher
    pub fn include(mut self, matcher: Matcher) -> Self {
        self.includes.push(matcher);
        self
    }

    /// Add an explicit exclude matcher
    pub fn exclude(mut self, matcher: Matcher) -> Self {
        self.excludes.push(matcher);
        self
    }

    /// Effective depth limit, `None` when unlimited
    pub fn depth_limit(&self) -> Option<usize> {
        self.max_depth.filter(|&d| d > 0)
    }

    /// Whether any simple rule list is set
    pub fn has_rules(&self) -> bool {
        [&self.names, &self.exts, &self.paths, &self.dirs, &self.files]
            .iter()
            .any(|r| !r.is_empty())
    }
}

impl Default for FindOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Matchers compiled from [`FindOptions`]
#[derive(Debug, Clone)]
pub struct Rules {
    /// Kind guard, category includes and explicit includes, all required
    pub include: MultiMatcher,
    /// Any match excludes the entry
    pub exclude: Vec<Matcher>,
    /// Any match stops descent into a directory
    pub prune: Vec<Matcher>,
}

impl Rules {
    /// Whether the entry should be emitted
    pub fn accepts(&self, elem: &super::Elem) -> bool {
        self.include.matches(elem) && !self.exclude.iter().any(|m| m.matches(elem))
    }

    /// Whether descent into the directory is blocked
    pub fn prunes(&self, elem: &super::Elem) -> bool {
        self.prune.iter().any(|m| m.matches(elem))
    }
}

/// Compile the simple rule lists and explicit matchers
///
/// File-only categories (ext, file name) let directories pass on the
/// include side and never exclude them; the dir-name category does the
/// same for files.
pub fn compile(options: &FindOptions) -> FindResult<Rules> {
    let mut include = match options.find_flags.guard() {
        Some(guard) => MultiMatcher::guarded(guard),
        None => MultiMatcher::new(),
    };
    let mut exclude = Vec::new();
    let mut prune = Vec::new();

    // files and directories
    if !options.names.include.is_empty() {
        include.add(any_name_rule(&options.names.include)?);
    }
    if !options.names.exclude.is_empty() {
        exclude.push(any_name_rule(&options.names.exclude)?);
    }
    if !options.paths.include.is_empty() {
        include.add(Matcher::paths(options.paths.include.iter().cloned()));
    }
    if !options.paths.exclude.is_empty() {
        exclude.push(Matcher::paths(options.paths.exclude.iter().cloned()));
    }

    // files only
    if !options.exts.include.is_empty() {
        include.add(Matcher::dir().or(Matcher::exts(&options.exts.include)));
    }
    if !options.exts.exclude.is_empty() {
        let rule = Matcher::exts(&options.exts.exclude);
        exclude.push(MultiMatcher::guarded(Matcher::file()).with(rule).into());
    }
    if !options.files.include.is_empty() {
        include.add(Matcher::dir().or(any_name_rule(&options.files.include)?));
    }
    if !options.files.exclude.is_empty() {
        let rule = any_name_rule(&options.files.exclude)?;
        exclude.push(MultiMatcher::guarded(Matcher::file()).with(rule).into());
    }

    // directories only
    if !options.dirs.include.is_empty() {
        include.add(Matcher::file().or(any_name_rule(&options.dirs.include)?));
    }
    if !options.dirs.exclude.is_empty() {
        let rule: Matcher = MultiMatcher::guarded(Matcher::dir())
            .with(any_name_rule(&options.dirs.exclude)?)
            .into();
        exclude.push(rule.clone());
        prune.push(rule);
    }

    for matcher in &options.includes {
        include.add(matcher.clone());
    }
    exclude.extend(options.excludes.iter().cloned());

    Ok(Rules {
        include,
        exclude,
        prune,
    })
}

fn any_name_rule(rules: &[String]) -> FindResult<Matcher> {
    let matchers = rules
        .iter()
        .map(|r| Matcher::name_rule(r))
        .collect::<FindResult<Vec<_>>>()?;
    Ok(Matcher::any(matchers))
}
