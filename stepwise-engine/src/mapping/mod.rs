//! Provenance: typed edges linking parts of a rewritten expression back to the parts of the
//! original expression they came from.
//!
//! Result builders never write edges by hand. Every construction primitive returns a
//! [`MappedExpression`], whose [`PathMappingTree`] mirrors the shape of the expression it was
//! built with. Edges are only materialized, relative to a chosen root, by
//! [`MappedExpression::merged_path_mappings`].

pub mod mapped;
pub mod tree;

pub use mapped::MappedExpression;
pub use tree::PathMappingTree;

use crate::expr::Path;
use std::fmt;

/// How a part of the output expression relates to the input paths it lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathMappingType {
    /// Copied unchanged.
    Move,

    /// Replaced by something computed from it.
    Transform,

    /// New material. Introduced parts may list the parts that motivated them.
    Introduce,

    /// Removed entirely.
    Cancel,

    /// Several parts merged into one, such as two integers evaluated into their sum.
    Combine,

    /// A common part pulled out of several places.
    Factor,

    /// One part copied into several places.
    Distribute,

    /// Related to the output without a more precise description.
    Relate,

    /// Moved to another position.
    Shift,
}

/// A single provenance edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathMapping {
    /// The input paths the output parts came from.
    pub from_paths: Vec<Path>,

    /// The relation between the input and output parts.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: PathMappingType,

    /// The output paths. Empty for [`PathMappingType::Cancel`].
    pub to_paths: Vec<Path>,
}

impl PathMapping {
    /// Creates an edge.
    pub fn new(from_paths: Vec<Path>, kind: PathMappingType, to_paths: Vec<Path>) -> Self {
        Self { from_paths, kind, to_paths }
    }

    /// Re-expresses the source paths relative to `from_root` and the target paths relative to
    /// `to_root`.
    pub fn relative_to(&self, from_root: &Path, to_root: &Path) -> Self {
        Self {
            from_paths: self.from_paths.iter().map(|p| p.relative_to(from_root)).collect(),
            kind: self.kind,
            to_paths: self.to_paths.iter().map(|p| p.relative_to(to_root)).collect(),
        }
    }

    fn can_merge_with(&self, other: &PathMapping) -> bool {
        if self == other {
            return true;
        }
        if self.kind != other.kind || self.from_paths != other.from_paths {
            return false;
        }
        match self.kind {
            PathMappingType::Distribute => true,
            PathMappingType::Introduce => !self.from_paths.is_empty(),
            _ => false,
        }
    }

    fn merge_with(&mut self, other: PathMapping) {
        for path in other.to_paths {
            if !self.to_paths.contains(&path) {
                self.to_paths.push(path);
            }
        }
    }
}

impl fmt::Display for PathMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |paths: &[Path]| {
            paths.iter().map(Path::to_string).collect::<Vec<_>>().join(", ")
        };
        write!(f, "[{}] {:?} [{}]", join(&self.from_paths), self.kind, join(&self.to_paths))
    }
}

/// Collapses equal edges, and unions the targets of `Distribute` edges (and `Introduce` edges
/// with sources) that share their type and sources. The first occurrence of each merged edge
/// keeps its position.
pub fn merge_path_mappings(mappings: impl IntoIterator<Item = PathMapping>) -> Vec<PathMapping> {
    let mut merged: Vec<PathMapping> = Vec::new();
    for mapping in mappings {
        match merged.iter_mut().find(|existing| existing.can_merge_with(&mapping)) {
            Some(existing) => existing.merge_with(mapping),
            None => merged.push(mapping),
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use super::*;

    fn path(s: &str) -> Path {
        s.parse().unwrap()
    }

    #[test]
    fn merge_distribute() {
        let merged = merge_path_mappings(vec![
            PathMapping::new(vec![path("./0")], PathMappingType::Distribute, vec![path("./0/0")]),
            PathMapping::new(vec![path("./1")], PathMappingType::Move, vec![path("./1")]),
            PathMapping::new(vec![path("./0")], PathMappingType::Distribute, vec![path("./2/0")]),
        ]);
        assert_eq!(merged, vec![
            PathMapping::new(
                vec![path("./0")],
                PathMappingType::Distribute,
                vec![path("./0/0"), path("./2/0")],
            ),
            PathMapping::new(vec![path("./1")], PathMappingType::Move, vec![path("./1")]),
        ]);
    }

    #[test]
    fn equal_edges_collapse() {
        let edge = PathMapping::new(vec![path("./0")], PathMappingType::Combine, vec![path(".")]);
        assert_eq!(merge_path_mappings(vec![edge.clone(), edge.clone()]), vec![edge]);
    }

    #[test]
    fn introductions_without_sources_stay_apart() {
        let edges = vec![
            PathMapping::new(vec![], PathMappingType::Introduce, vec![path("./0/1")]),
            PathMapping::new(vec![], PathMappingType::Introduce, vec![path("./1/1")]),
        ];
        assert_eq!(merge_path_mappings(edges.clone()), edges);

        let sourced = merge_path_mappings(vec![
            PathMapping::new(vec![path("./1")], PathMappingType::Introduce, vec![path("./0/1")]),
            PathMapping::new(vec![path("./1")], PathMappingType::Introduce, vec![path("./0/0")]),
        ]);
        assert_eq!(sourced.len(), 1);
        assert_eq!(sourced[0].to_paths, vec![path("./0/1"), path("./0/0")]);
    }

    #[test]
    fn rebase_edges() {
        let edge = PathMapping::new(
            vec![path("./1/0"), path("./1/1")],
            PathMappingType::Combine,
            vec![path("#1/0")],
        );
        assert_eq!(
            edge.relative_to(&path("./1"), &Path::task("1")),
            PathMapping::new(vec![path("./0"), path("./1")], PathMappingType::Combine, vec![path("./0")]),
        );
        assert_eq!(edge.to_string(), "[./1/0, ./1/1] Combine [#1/0]");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_shape() {
        let edge = PathMapping::new(vec![path("./0"), path("./1")], PathMappingType::Combine, vec![path("#1/0")]);
        let json = serde_json::to_string(&edge).unwrap();
        assert_eq!(json, r#"{"from_paths":["./0","./1"],"type":"Combine","to_paths":["#1/0"]}"#);
        assert_eq!(serde_json::from_str::<PathMapping>(&json).unwrap(), edge);
    }
}
