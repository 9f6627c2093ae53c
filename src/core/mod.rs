pub mod errors;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub use errors::{Error, Result};

/// Canonical identity of an item, e.g. `crate::handlers::Audited`.
///
/// Equality is over the full segment sequence. Two items that share a
/// simple name but live in different modules are different paths.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ItemPath {
    segments: Vec<String>,
}

impl ItemPath {
    pub const CRATE: &'static str = "crate";

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// The crate root module, `crate`
    pub fn crate_root() -> Self {
        Self::new([Self::CRATE])
    }

    /// Parse a `::`-separated path such as `functions_worker::function`.
    ///
    /// Returns `None` unless every segment is a non-empty identifier.
    pub fn parse(text: &str) -> Option<Self> {
        let path = syn::parse_str::<syn::Path>(text.trim()).ok()?;
        if path.segments.iter().any(|s| !s.arguments.is_none()) {
            return None;
        }
        Some(Self::new(path.segments.iter().map(|s| s.ident.to_string())))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Unqualified name: the last segment
    pub fn simple_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_crate_local(&self) -> bool {
        self.segments.first().is_some_and(|s| s == Self::CRATE)
    }

    pub fn join(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn extend<I, S>(&self, rest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments = self.segments.clone();
        segments.extend(rest.into_iter().map(Into::into));
        Self { segments }
    }

    /// Parent module, or `None` at the crate root (or for a single segment)
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() <= 1 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("::"))
    }
}

impl From<ItemPath> for String {
    fn from(path: ItemPath) -> Self {
        path.to_string()
    }
}

impl TryFrom<String> for ItemPath {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("`{value}` is not a Rust path"))
    }
}

/// Where a resolved path points
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// An item of the scanned crate
    Local,
    /// An item of another crate
    External,
    /// A bare name with nothing in scope (prelude or built-in attribute)
    Unscoped,
}

/// Result of resolving a written path inside a module
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub path: ItemPath,
    pub origin: Origin,
}

impl Resolution {
    pub fn local(path: ItemPath) -> Self {
        Self {
            path,
            origin: Origin::Local,
        }
    }

    pub fn external(path: ItemPath) -> Self {
        Self {
            path,
            origin: Origin::External,
        }
    }

    pub fn unscoped(path: ItemPath) -> Self {
        Self {
            path,
            origin: Origin::Unscoped,
        }
    }
}

/// A function that carries at least one attribute
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration {
    /// Module the function is declared in
    pub module: ItemPath,
    /// Enclosing impl self type (`<Type as Trait>` for trait impls) or trait,
    /// rendered from its tokens
    pub owner: Option<String>,
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
    /// Resolved attribute identities, in attachment order, without repeats
    pub markers: Vec<ItemPath>,
    /// Literal argument of the registration marker, if well-formed
    pub registration_name: Option<String>,
}

impl MethodDeclaration {
    /// Display name, e.g. `crate::api::Handlers::list`
    pub fn qualified_name(&self) -> String {
        match &self.owner {
            Some(owner) => format!("{}::{}::{}", self.module, owner, self.name),
            None => format!("{}::{}", self.module, self.name),
        }
    }

    pub fn carries(&self, marker: &ItemPath) -> bool {
        self.markers.iter().any(|m| m == marker)
    }
}

/// A marker identity requested for tracking by a directive
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grouping {
    pub marker: ItemPath,
}

impl Grouping {
    pub fn new(marker: ItemPath) -> Self {
        Self { marker }
    }

    /// Name of the generated binding
    pub fn binding_name(&self) -> &str {
        self.marker.simple_name()
    }
}

/// Registration names collected for one grouping
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub grouping: Grouping,
    pub names: Vec<String>,
}

/// Output of the classification pass, one entry per grouping in discovery order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub entries: Vec<GroupEntry>,
}

impl ClassificationResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names_for(&self, marker: &ItemPath) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| &e.grouping.marker == marker)
            .map(|e| e.names.as_slice())
    }
}
