//! Route tree nodes
//!
//! All nodes live in one arena owned by [`NodeTree`] and refer to each other by
//! [`NodeId`]. Children keep registration order, which is the match priority
//! among siblings.

use crate::segment::{Constraint, Segment};
use std::collections::{BTreeMap, HashMap};

/// Longest run of nodes a single skippable path may cover. Longer runs are
/// crossed with several jumps.
pub const MAX_SKIPPABLE_SEGMENTS: usize = 8;

/// Index of a node inside its [`NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a node accepts for the request component it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Root,
    /// Empty component
    Blank,
    Literal(String),
    Pattern(Constraint),
    /// Any non-empty component
    Wildcard,
}

impl NodeKind {
    fn from_segment(segment: &Segment) -> Self {
        match segment {
            Segment::Separator => NodeKind::Blank,
            Segment::Literal(text) => NodeKind::Literal(text.clone()),
            Segment::Named {
                constraint: None, ..
            } => NodeKind::Wildcard,
            Segment::Named {
                constraint: Some(constraint),
                ..
            } => NodeKind::Pattern(constraint.clone()),
        }
    }

    /// Whether a request component is accepted by this node
    pub fn matches(&self, component: &str) -> bool {
        match self {
            NodeKind::Root => false,
            NodeKind::Blank => component.is_empty(),
            NodeKind::Literal(text) => text == component,
            NodeKind::Pattern(constraint) => constraint.is_match(component),
            NodeKind::Wildcard => !component.is_empty(),
        }
    }

    /// Whether a pattern segment is represented by this node.
    ///
    /// Constraints are compared by regex text, so two different expressions
    /// accepting the same language are still different siblings.
    fn represents(&self, segment: &Segment) -> bool {
        match (self, segment) {
            (NodeKind::Blank, Segment::Separator) => true,
            (NodeKind::Literal(text), Segment::Literal(other)) => text == other,
            (NodeKind::Wildcard, Segment::Named { constraint: None, .. }) => true,
            (
                NodeKind::Pattern(constraint),
                Segment::Named {
                    constraint: Some(other),
                    ..
                },
            ) => constraint == other,
            _ => false,
        }
    }

    /// Fixed component text for nodes that accept exactly one component
    fn fixed_text(&self) -> Option<&str> {
        match self {
            NodeKind::Blank => Some(""),
            NodeKind::Literal(text) => Some(text),
            _ => None,
        }
    }
}

/// Route bound to a terminal node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Terminal {
    /// Index of the route in the router's route list
    pub route: usize,
    /// Segment index to parameter name, one entry per named segment
    pub params: BTreeMap<usize, String>,
}

#[derive(Debug, Clone)]
pub struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    terminal: Option<Terminal>,
    skippable: HashMap<String, NodeId>,
    /// Distinct key lengths of `skippable`, longest first
    skippable_lengths: Vec<usize>,
}

impl Node {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            terminal: None,
            skippable: HashMap::new(),
            skippable_lengths: Vec::new(),
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn terminal(&self) -> Option<&Terminal> {
        self.terminal.as_ref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn skippable_paths(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.skippable.iter().map(|(path, id)| (path.as_str(), *id))
    }
}

/// Arena holding every node of a route tree
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Root, None)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Child of `parent` that represents `segment`, if already created
    pub fn find_child(&self, parent: NodeId, segment: &Segment) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.node(child).kind.represents(segment))
    }

    /// Child of `parent` representing `segment`, created if missing
    pub fn find_or_insert_child(&mut self, parent: NodeId, segment: &Segment) -> NodeId {
        match self.find_child(parent, segment) {
            Some(child) => child,
            None => self.push_child(parent, NodeKind::from_segment(segment)),
        }
    }

    fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind, Some(parent)));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Bind a route to a node. On conflict the already bound route index is
    /// returned and the node is left untouched.
    pub fn mark_terminal(&mut self, id: NodeId, terminal: Terminal) -> Result<(), usize> {
        let node = &mut self.nodes[id.0];
        match &node.terminal {
            Some(existing) if existing.route != terminal.route => Err(existing.route),
            Some(_) => Ok(()),
            None => {
                node.terminal = Some(terminal);
                Ok(())
            }
        }
    }

    /// Children of `id` accepting `component`, in registration order
    pub fn matched_children<'a>(
        &'a self,
        id: NodeId,
        component: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(move |&child| self.node(child).kind.matches(component))
    }

    /// Descendants reachable from `id` by a skippable path that prefixes
    /// `remaining`, longest first, with the path left after the jump.
    ///
    /// `remaining` starts with a slash. A skippable path only matches on a
    /// component boundary.
    pub fn matched_skippable_paths<'a, 'p>(
        &'a self,
        id: NodeId,
        remaining: &'p str,
    ) -> impl Iterator<Item = (NodeId, Option<&'p str>)> + 'a
    where
        'p: 'a,
    {
        let node = self.node(id);
        node.skippable_lengths.iter().filter_map(move |&length| {
            let head = remaining.get(..length)?;
            let tail = &remaining[length..];
            if !tail.is_empty() && !tail.starts_with('/') {
                return None;
            }
            let target = node.skippable.get(head)?;
            Some((*target, if tail.is_empty() { None } else { Some(tail) }))
        })
    }

    /// Precompute the skippable paths of the whole tree and return how many
    /// were recorded.
    ///
    /// A run of blank/literal nodes can be skipped in one comparison only if
    /// none of its nodes has an earlier sibling accepting the same component;
    /// otherwise per-segment descent would try that sibling first and the jump
    /// could return a different route.
    ///
    /// Runs are recorded up to [`MAX_SKIPPABLE_SEGMENTS`] nodes long, so a deep
    /// chain keeps a bounded number of keys per node.
    pub fn index_skippable_paths(&mut self) -> usize {
        for node in &mut self.nodes {
            node.skippable.clear();
            node.skippable_lengths.clear();
        }

        let mut found = Vec::new();
        for index in 1..self.nodes.len() {
            let target = NodeId(index);
            let Some(text) = self.chain_text(target) else {
                continue;
            };

            let mut path = format!("/{}", text);
            let mut link = target;
            let mut depth = 1;
            while let Some(parent) = self.node(link).parent {
                if depth >= 2 {
                    found.push((parent, path.clone(), target));
                }
                if depth == MAX_SKIPPABLE_SEGMENTS {
                    break;
                }
                let Some(text) = self.chain_text(parent) else {
                    break;
                };
                path = format!("/{}{}", text, path);
                link = parent;
                depth += 1;
            }
        }

        let count = found.len();
        for (owner, path, target) in found {
            let node = &mut self.nodes[owner.0];
            let length = path.len();
            node.skippable.insert(path, target);
            if !node.skippable_lengths.contains(&length) {
                node.skippable_lengths.push(length);
            }
        }
        for node in &mut self.nodes {
            node.skippable_lengths.sort_unstable_by(|a, b| b.cmp(a));
        }

        count
    }

    pub fn skippable_path_count(&self) -> usize {
        self.nodes.iter().map(|node| node.skippable.len()).sum()
    }

    /// Component text of a node usable inside a skippable path
    fn chain_text(&self, id: NodeId) -> Option<&str> {
        let node = self.node(id);
        let text = node.kind.fixed_text()?;
        let parent = node.parent?;
        let shadowed = self
            .node(parent)
            .children
            .iter()
            .take_while(|&&sibling| sibling != id)
            .any(|&sibling| self.node(sibling).kind.matches(text));
        if shadowed {
            None
        } else {
            Some(text)
        }
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}
