//! Command Token Substitution
//!
//! Commands and working directories may contain bracket-delimited tokens such
//! as `[file]` or `[lineNumber]`. A [`SubstitutionResolver`] turns the current
//! editing context into a [`SubstitutionMap`] once per trigger; the map is then
//! shared read-only by every definition run in that trigger.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([A-Za-z]+)\]").expect("token pattern is valid"));

/// Token names understood by [`ContextResolver`]
pub const TOKENS: [&str; 10] = [
    "workspaceFolder",
    "workspaceFolderBasename",
    "file",
    "relativeFile",
    "fileBasename",
    "fileBasenameNoExtension",
    "fileDirname",
    "fileExtname",
    "cwd",
    "lineNumber",
];

/// Token name to replacement text, immutable once resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionMap {
    values: BTreeMap<String, String>,
}

impl SubstitutionMap {
    /// An empty map; `apply` leaves text untouched
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a token value
    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// Number of known tokens
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no token is known
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every known `[token]` in `text`
    ///
    /// Bracketed text that does not name a known token is kept verbatim.
    pub fn apply(&self, text: &str) -> String {
        if self.values.is_empty() {
            return text.to_string();
        }

        TOKEN_PATTERN
            .replace_all(text, |caps: &Captures| match self.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

impl<K, V> FromIterator<(K, V)> for SubstitutionMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Produces the substitution map for a trigger
pub trait SubstitutionResolver: Send + Sync {
    /// Resolve token values for the given workspace root
    fn resolve(&self, root: Option<&Path>) -> SubstitutionMap;
}

/// Editing context the tokens are derived from
#[derive(Debug, Clone, Default)]
pub struct SubstitutionContext {
    /// Active file, absolute or relative to `cwd`
    pub file: Option<PathBuf>,
    /// 1-based line of the cursor in `file`
    pub line_number: Option<u32>,
    /// Current working directory
    pub cwd: Option<PathBuf>,
}

/// Resolver backed by a fixed [`SubstitutionContext`]
#[derive(Debug, Clone, Default)]
pub struct ContextResolver {
    context: SubstitutionContext,
}

impl ContextResolver {
    /// Create a resolver for `context`
    pub fn new(context: SubstitutionContext) -> Self {
        Self { context }
    }

    fn active_file(&self) -> Option<PathBuf> {
        let file = self.context.file.as_ref()?;
        match &self.context.cwd {
            Some(cwd) if file.is_relative() => Some(cwd.join(file)),
            _ => Some(file.clone()),
        }
    }
}

impl SubstitutionResolver for ContextResolver {
    fn resolve(&self, root: Option<&Path>) -> SubstitutionMap {
        let display = |path: Option<&Path>| {
            path.map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        let os_display = |name: Option<&std::ffi::OsStr>| {
            name.map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let file = self.active_file();
        let file = file.as_deref();
        let relative_file = match (file, root) {
            (Some(file), Some(root)) => file.strip_prefix(root).ok().or(Some(file)),
            (file, _) => file,
        };
        let extension = file
            .and_then(Path::extension)
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let cwd = self.context.cwd.as_deref().or(root);

        let map: SubstitutionMap = [
            ("workspaceFolder", display(root)),
            (
                "workspaceFolderBasename",
                os_display(root.and_then(Path::file_name)),
            ),
            ("file", display(file)),
            ("relativeFile", display(relative_file)),
            ("fileBasename", os_display(file.and_then(Path::file_name))),
            (
                "fileBasenameNoExtension",
                os_display(file.and_then(Path::file_stem)),
            ),
            ("fileDirname", display(file.and_then(Path::parent))),
            ("fileExtname", extension),
            ("cwd", display(cwd)),
            (
                "lineNumber",
                self.context
                    .line_number
                    .map(|line| line.to_string())
                    .unwrap_or_default(),
            ),
        ]
        .into_iter()
        .collect();

        trace!("Resolved {} substitution tokens", map.len());
        map
    }
}
