//! Reconstruction of a resource-control tree from a flat list of node identifiers

use std::collections::HashMap;

use log::debug;

/// Separates the components of a node identifier
pub const SEPARATOR: char = '/';

/// One entry of a resource-control hierarchy
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Node {
    identifier: String,
    depth: usize,
    parent: Option<String>,
}

impl Node {
    /// Returns the path-like string identifying the node within its tree
    pub fn identifier(&self) -> &str {
        self.identifier.as_str()
    }

    /// Returns the depth of the node, relative to the root of its tree (0 for the root itself)
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the identifier of the immediate ancestor of this node, if it has one
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns the last component of the identifier
    pub fn name(&self) -> &str {
        self.identifier
            .rsplit(SEPARATOR)
            .find(|c| !c.is_empty())
            .unwrap_or(self.identifier.as_str())
    }
}

/// Parent to children relationships between the nodes of a tree
///
/// Every node has its own children entry, possibly empty.
#[derive(Debug, Default)]
pub struct Hierarchy {
    nodes: Vec<Node>,
    children: HashMap<String, Vec<String>>,
}

impl Hierarchy {
    /// Builds the hierarchy from the identifiers of its nodes.
    ///
    /// The identifiers must be sorted in ascending order, so that the parent of a node is always
    /// registered before the node itself. Input which does not respect this is not rejected, but
    /// produces an incomplete tree.
    ///
    /// # Arguments
    ///  * `identifiers`: The sorted identifiers of all nodes of the tree
    ///  * `root_depth_offset`: The number of identifier components of the root of the tree, so
    ///    that the root has a depth of 0
    pub fn build<I, S>(identifiers: I, root_depth_offset: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut hierarchy = Hierarchy::default();

        for identifier in identifiers.into_iter().map(Into::into) {
            if hierarchy.children.contains_key(&identifier) {
                debug!("Ignoring duplicate node '{}'", identifier);
                continue;
            }

            let depth = component_count(&identifier).saturating_sub(root_depth_offset);
            let mut parent = None;

            for existing in hierarchy.nodes.iter() {
                if existing.depth + 1 == depth && is_direct_extension(&identifier, &existing.identifier) {
                    if let Some(siblings) = hierarchy.children.get_mut(&existing.identifier) {
                        siblings.push(identifier.clone());
                    }
                    parent.get_or_insert_with(|| existing.identifier.clone());
                }
            }

            hierarchy.children.insert(identifier.clone(), vec![]);
            hierarchy.nodes.push(Node {
                identifier,
                depth,
                parent,
            });
        }

        hierarchy
    }

    /// Returns all the nodes, in the order in which they were registered
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the identifiers of the direct children of a node
    ///
    /// An unknown node has no children.
    pub fn children(&self, identifier: &str) -> &[String] {
        self.children.get(identifier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the nodes which have no parent
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.parent.is_none())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the nodes in ascending depth order, nodes of equal depth keeping their registration order
    pub fn by_depth(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.iter().collect();
        nodes.sort_by_key(|n| n.depth);
        nodes
    }

    /// Returns the nodes so that each node is directly followed by its descendants
    pub fn pre_order(&self) -> Vec<&Node> {
        let index: HashMap<&str, &Node> = self.nodes.iter().map(|n| (n.identifier.as_str(), n)).collect();

        let mut ordered = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<&Node> = self.roots().collect();
        stack.reverse();

        while let Some(node) = stack.pop() {
            ordered.push(node);

            self.children(node.identifier())
                .iter()
                .rev()
                .filter_map(|c| index.get(c.as_str()).copied())
                .for_each(|c| stack.push(c));
        }

        ordered
    }
}

/// Counts the non-empty components of an identifier
pub fn component_count(identifier: &str) -> usize {
    identifier.split(SEPARATOR).filter(|c| !c.is_empty()).count()
}

/// Indicates if `candidate` is `ancestor` followed by at least one more component
fn is_direct_extension(candidate: &str, ancestor: &str) -> bool {
    match candidate.strip_prefix(ancestor) {
        Some(rest) if !rest.is_empty() => ancestor.ends_with(SEPARATOR) || rest.starts_with(SEPARATOR),
        _ => false,
    }
}

#[cfg(test)]
mod test_hierarchy {
    use rstest::*;

    use crate::core::hierarchy::{component_count, is_direct_extension, Hierarchy};

    fn build_sample() -> Hierarchy {
        Hierarchy::build(vec!["/cg", "/cg/a", "/cg/a/x", "/cg/b"], 1)
    }

    #[test]
    fn test_should_link_children_to_their_parent() {
        let hierarchy = build_sample();

        assert_eq!(hierarchy.children("/cg"), &["/cg/a", "/cg/b"]);
        assert_eq!(hierarchy.children("/cg/a"), &["/cg/a/x"]);
        assert!(hierarchy.children("/cg/b").is_empty());
        assert!(hierarchy.children("/cg/a/x").is_empty());
    }

    #[test]
    fn test_should_compute_depth_relative_to_root() {
        let hierarchy = build_sample();

        let depths: Vec<usize> = hierarchy.nodes().iter().map(|n| n.depth()).collect();

        assert_eq!(depths, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_should_register_one_key_per_identifier() {
        let hierarchy = build_sample();

        assert_eq!(hierarchy.len(), 4);
    }

    #[test]
    fn test_every_non_root_node_should_be_the_child_of_exactly_one_node() {
        let identifiers = vec![
            "/sys/fs/cgroup",
            "/sys/fs/cgroup/init.scope",
            "/sys/fs/cgroup/system.slice",
            "/sys/fs/cgroup/system.slice/cron.service",
            "/sys/fs/cgroup/system.slice/ssh.service",
            "/sys/fs/cgroup/user.slice",
            "/sys/fs/cgroup/user.slice/user-1000.slice",
        ];
        let hierarchy = Hierarchy::build(identifiers.clone(), 3);

        let children_count: usize = identifiers.iter().map(|i| hierarchy.children(i).len()).sum();

        assert_eq!(children_count, identifiers.len() - 1);
        assert_eq!(hierarchy.roots().count(), 1);
    }

    #[test]
    fn test_should_record_parent_of_each_node() {
        let hierarchy = build_sample();

        let parents: Vec<Option<&str>> = hierarchy.nodes().iter().map(|n| n.parent()).collect();

        assert_eq!(parents, vec![None, Some("/cg"), Some("/cg/a"), Some("/cg")]);
    }

    #[test]
    fn test_should_not_take_name_prefix_for_parent() {
        let hierarchy = Hierarchy::build(vec!["/cg", "/cg/a", "/cg/ab", "/cg/ab/x"], 1);

        assert!(hierarchy.children("/cg/a").is_empty());
        assert_eq!(hierarchy.children("/cg/ab"), &["/cg/ab/x"]);
    }

    #[test]
    fn test_unsorted_input_should_produce_disconnected_tree() {
        let hierarchy = Hierarchy::build(vec!["/cg/a/x", "/cg", "/cg/a"], 1);

        assert!(hierarchy.children("/cg/a").is_empty());
        assert_eq!(hierarchy.len(), 3);
        assert_eq!(hierarchy.roots().count(), 2);
    }

    #[test]
    fn test_should_ignore_duplicate_identifiers() {
        let hierarchy = Hierarchy::build(vec!["/cg", "/cg/a", "/cg/a"], 1);

        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.children("/cg"), &["/cg/a"]);
    }

    #[test]
    fn test_by_depth_should_order_nodes_by_ascending_depth() {
        let hierarchy = build_sample();

        let ids: Vec<&str> = hierarchy.by_depth().iter().map(|n| n.identifier()).collect();

        assert_eq!(ids, vec!["/cg", "/cg/a", "/cg/b", "/cg/a/x"]);
    }

    #[test]
    fn test_pre_order_should_place_descendants_after_their_parent() {
        let hierarchy = Hierarchy::build(vec!["/cg", "/cg/a", "/cg/a-b", "/cg/a/x"], 1);

        let ids: Vec<&str> = hierarchy.pre_order().iter().map(|n| n.identifier()).collect();

        assert_eq!(ids, vec!["/cg", "/cg/a", "/cg/a/x", "/cg/a-b"]);
    }

    #[rstest]
    #[case("/cg/a/x", "x")]
    #[case("/cg/", "cg")]
    #[case("/", "/")]
    fn test_node_name_should_be_last_component(#[case] identifier: &str, #[case] expected: &str) {
        let hierarchy = Hierarchy::build(vec![identifier], 0);

        assert_eq!(hierarchy.nodes()[0].name(), expected);
    }

    #[rstest]
    #[case("/", 0)]
    #[case("/cg", 1)]
    #[case("/sys/fs/cgroup/", 3)]
    fn test_component_count(#[case] identifier: &str, #[case] expected: usize) {
        assert_eq!(component_count(identifier), expected);
    }

    #[rstest]
    #[case("/cg/a", "/cg", true)]
    #[case("/a", "/", true)]
    #[case("/cg", "/cg", false)]
    #[case("/cgx", "/cg", false)]
    #[case("/cg/a", "/cg/b", false)]
    fn test_direct_extension(#[case] candidate: &str, #[case] ancestor: &str, #[case] expected: bool) {
        assert_eq!(is_direct_extension(candidate, ancestor), expected);
    }
}
