use super::{PathMapping, PathMappingType};
use crate::expr::Path;

/// The provenance of an expression, shaped like the expression itself.
///
/// A [`PathMappingTree::Leaf`] describes a whole subtree with one edge; a
/// [`PathMappingTree::Parent`] holds one tree per child of the node it describes. Asking a leaf
/// for its children yields leaves of the same kind over the corresponding child paths, so a
/// moved subtree can be taken apart without losing track of where each piece came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMappingTree {
    /// The whole node came from `paths` through `kind`.
    Leaf {
        /// The source paths.
        paths: Vec<Path>,

        /// The relation to the sources.
        kind: PathMappingType,
    },

    /// One tree per child of the node.
    Parent(Vec<PathMappingTree>),

    /// The node is described by `inner`, and building it removed the parts at `paths`.
    Cancel {
        /// The provenance of the node itself.
        inner: Box<PathMappingTree>,

        /// The removed source paths.
        paths: Vec<Path>,
    },
}

impl PathMappingTree {
    /// A leaf tree.
    pub fn leaf(paths: Vec<Path>, kind: PathMappingType) -> Self {
        Self::Leaf { paths, kind }
    }

    /// New material with no source.
    pub fn introduced() -> Self {
        Self::leaf(Vec::new(), PathMappingType::Introduce)
    }

    /// Records that the parts at `paths` were removed while building the node `self` describes.
    pub fn cancelling(self, paths: Vec<Path>) -> Self {
        if paths.is_empty() {
            return self;
        }
        Self::Cancel { inner: Box::new(self), paths }
    }

    /// The provenance of the `index`th child of the described node.
    pub fn nth_child(&self, index: usize) -> Self {
        match self {
            Self::Leaf { paths, kind } => Self::Leaf {
                paths: paths.iter().map(|path| path.child(index)).collect(),
                kind: *kind,
            },
            Self::Parent(children) => children.get(index).cloned().unwrap_or_else(Self::introduced),
            Self::Cancel { inner, .. } => inner.nth_child(index),
        }
    }

    /// The provenance of the first `count` children of the described node.
    pub fn child_list(&self, count: usize) -> Vec<Self> {
        (0..count).map(|index| self.nth_child(index)).collect()
    }

    /// Every source path mentioned in the tree, in order, without duplicates.
    pub fn from_paths(&self) -> Vec<Path> {
        let mut paths = Vec::new();
        self.collect_from_paths(&mut paths);
        paths
    }

    fn collect_from_paths(&self, out: &mut Vec<Path>) {
        fn push(paths: &[Path], out: &mut Vec<Path>) {
            for path in paths {
                if !out.contains(path) {
                    out.push(path.clone());
                }
            }
        }

        match self {
            Self::Leaf { paths, .. } => push(paths, out),
            Self::Parent(children) => children.iter().for_each(|child| child.collect_from_paths(out)),
            Self::Cancel { inner, paths } => {
                inner.collect_from_paths(out);
                push(paths, out);
            },
        }
    }

    /// Collapses several trees into one leaf of the given kind over all their sources.
    pub fn combine(kind: PathMappingType, trees: &[PathMappingTree]) -> Self {
        let mut paths = Vec::new();
        for tree in trees {
            tree.collect_from_paths(&mut paths);
        }
        Self::leaf(paths, kind)
    }

    /// Materializes the edges of the tree, with the described node placed at `root`.
    pub fn path_mappings(&self, root: &Path) -> Vec<PathMapping> {
        let mut out = Vec::new();
        self.collect_path_mappings(root, &mut out);
        out
    }

    fn collect_path_mappings(&self, root: &Path, out: &mut Vec<PathMapping>) {
        match self {
            Self::Leaf { paths, kind } => {
                out.push(PathMapping::new(paths.clone(), *kind, vec![root.clone()]));
            },
            Self::Parent(children) => {
                for (index, child) in children.iter().enumerate() {
                    child.collect_path_mappings(&root.child(index), out);
                }
            },
            Self::Cancel { inner, paths } => {
                inner.collect_path_mappings(root, out);
                out.push(PathMapping::new(paths.clone(), PathMappingType::Cancel, Vec::new()));
            },
        }
    }
}
