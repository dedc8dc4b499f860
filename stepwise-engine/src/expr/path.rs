use crate::error::{Error, MalformedPath};
use std::{fmt, str::FromStr};

/// The root a [`Path`] starts from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathRoot {
    /// The main expression, written `.`.
    Main,

    /// The starting expression of a task, written `#<id>`.
    Task(String),
}

/// The address of a node inside an expression: a root followed by a sequence of child indices.
///
/// Paths are written `.` for the root of the main expression, `./0/1` for the second child of
/// its first child, and `#2/0` for the first child of the expression task `#2` starts from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Path {
    root: PathRoot,
    indices: Vec<usize>,
}

impl Path {
    /// The root of the main expression.
    pub fn root() -> Self {
        Self { root: PathRoot::Main, indices: Vec::new() }
    }

    /// The root of the starting expression of the task with the given identifier (without the
    /// leading `#`).
    pub fn task(id: impl Into<String>) -> Self {
        Self { root: PathRoot::Task(id.into()), indices: Vec::new() }
    }

    /// A path from the root of the main expression through the given indices.
    pub fn from_indices(indices: impl Into<Vec<usize>>) -> Self {
        Self { root: PathRoot::Main, indices: indices.into() }
    }

    /// The root the path starts from.
    pub fn path_root(&self) -> &PathRoot {
        &self.root
    }

    /// The child indices of the path.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// The number of child indices in the path.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the path addresses a root.
    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }

    /// The path of the `index`th child of the node at this path.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self { root: self.root.clone(), indices }
    }

    /// The path of the parent node, or `None` for a root.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.indices.split_last()?;
        Some(Self { root: self.root.clone(), indices: rest.to_vec() })
    }

    /// The last child index of the path, or `None` for a root.
    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// The ancestor of this path with `len` indices. Returns the path unchanged if it is already
    /// shorter.
    pub fn truncate(&self, len: usize) -> Self {
        Self {
            root: self.root.clone(),
            indices: self.indices[..len.min(self.indices.len())].to_vec(),
        }
    }

    /// Returns true if `ancestor` is this path or one of its ancestors.
    pub fn has_ancestor(&self, ancestor: &Path) -> bool {
        self.root == ancestor.root && self.indices.starts_with(&ancestor.indices)
    }

    /// Re-expresses this path relative to `base`.
    ///
    /// A path below `base` becomes a path from the main root with the common prefix removed.
    /// Relative to the main root, and for paths outside `base`, the path is returned unchanged.
    pub fn relative_to(&self, base: &Path) -> Self {
        if base.root == PathRoot::Main && base.is_root() {
            return self.clone();
        }
        if self.has_ancestor(base) {
            return Self::from_indices(&self.indices[base.indices.len()..]);
        }
        self.clone()
    }

    /// Moves this path from below `from` to below `to`. Returns `None` if this path does not lie
    /// below `from`.
    pub fn rebase(&self, from: &Path, to: &Path) -> Option<Self> {
        if !self.has_ancestor(from) {
            return None;
        }
        let mut indices = to.indices.clone();
        indices.extend_from_slice(&self.indices[from.indices.len()..]);
        Some(Self { root: to.root.clone(), indices })
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Main => write!(f, ".")?,
            PathRoot::Task(id) => write!(f, "#{}", id)?,
        }
        for index in &self.indices {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// Parses a single child index. Signs and leading zeros are rejected so that every index has
/// exactly one spelling.
fn parse_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::from(MalformedPath { input: s.to_string() });

        let mut segments = s.split('/');
        let root = match segments.next() {
            Some(".") => PathRoot::Main,
            Some(task) if task.len() > 1 && task.starts_with('#') => {
                PathRoot::Task(task[1..].to_string())
            },
            _ => return Err(malformed()),
        };

        let indices = segments
            .map(parse_index)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?;
        Ok(Self { root, indices })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Path {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = <String as serde::Deserialize>::deserialize(deserializer)?;
        input.parse().map_err(serde::de::Error::custom)
    }
}
