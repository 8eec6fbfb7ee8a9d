use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Operator type enum for operator nodes in a [`ProcessTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperatorType {
    /// Sequence operator
    Sequence,
    /// Exclusive choice operator
    ExclusiveChoice,
    /// Concurrency operator
    Concurrency,
    /// Loop operator: first child is the loop body, the remaining children are redo parts
    Loop,
}

impl OperatorType {
    /// Symbol of the operator in process tree notation
    pub fn symbol(&self) -> &'static str {
        match self {
            OperatorType::Sequence => "->",
            OperatorType::ExclusiveChoice => "X",
            OperatorType::Concurrency => "+",
            OperatorType::Loop => "*",
        }
    }
}

/// Kind of a node in a [`ProcessTree`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// Operator node with ordered children
    Operator(OperatorType),
    /// Non-silent activity leaf
    Activity(String),
    /// Silent leaf
    Tau,
}

/// Node in a [`ProcessTree`] arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// The node ID
    pub uuid: Uuid,
    /// The kind of the node
    pub node_type: NodeType,
    /// Indices of the children in the arena, in execution order
    pub children: Vec<usize>,
}

/// Process tree backed by a node arena
///
/// Nodes live in [`ProcessTree::nodes`] with children referenced by index; children always
/// precede their parent, and the root is the last node. Trees are built bottom-up and never
/// mutated afterwards. Equality is structural: node [`Uuid`]s identify nodes but do not
/// participate in comparisons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessTree {
    /// All nodes of the tree
    pub nodes: Vec<TreeNode>,
    /// Index of the root node
    pub root: usize,
}

impl ProcessTree {
    /// Create a tree consisting of a single activity leaf
    pub fn new_leaf<S: Into<String>>(label: S) -> Self {
        Self {
            nodes: vec![TreeNode {
                uuid: Uuid::new_v4(),
                node_type: NodeType::Activity(label.into()),
                children: Vec::new(),
            }],
            root: 0,
        }
    }

    /// Create a tree consisting of a single silent leaf
    pub fn new_tau() -> Self {
        Self {
            nodes: vec![TreeNode {
                uuid: Uuid::new_v4(),
                node_type: NodeType::Tau,
                children: Vec::new(),
            }],
            root: 0,
        }
    }

    /// Create an operator tree from child trees
    ///
    /// The child arenas are grafted into the new arena in order, with their node indices
    /// shifted; the operator node is appended last and becomes the root.
    pub fn new_operator(operator: OperatorType, children: Vec<ProcessTree>) -> Self {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut child_roots: Vec<usize> = Vec::with_capacity(children.len());
        for child in children {
            let offset = nodes.len();
            child_roots.push(child.root + offset);
            nodes.extend(child.nodes.into_iter().map(|mut node| {
                for c in &mut node.children {
                    *c += offset;
                }
                node
            }));
        }
        let root = nodes.len();
        nodes.push(TreeNode {
            uuid: Uuid::new_v4(),
            node_type: NodeType::Operator(operator),
            children: child_roots,
        });
        Self { nodes, root }
    }

    /// The root node of the tree
    pub fn root_node(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    /// Node at the given arena index
    pub fn node(&self, id: usize) -> &TreeNode {
        &self.nodes[id]
    }

    /// Children indices of a node, in execution order
    pub fn children_of(&self, id: usize) -> &[usize] {
        &self.nodes[id].children
    }

    /// Labels of all non-silent leaves, in depth-first execution order
    pub fn find_all_leaf_labels(&self) -> Vec<&str> {
        let mut result = Vec::new();
        self.collect_leaf_labels(self.root, &mut result);
        result
    }

    fn collect_leaf_labels<'a>(&'a self, id: usize, result: &mut Vec<&'a str>) {
        match &self.nodes[id].node_type {
            NodeType::Activity(label) => result.push(label),
            NodeType::Tau => {}
            NodeType::Operator(_) => {
                for &child in &self.nodes[id].children {
                    self.collect_leaf_labels(child, result);
                }
            }
        }
    }

    /// Returns `true` if the tree satisfies the structural invariants:
    /// children precede their parent in the arena, every node except the root is the child
    /// of exactly one parent, leaves have no children, sequence/choice/concurrency nodes
    /// have at least two children, and loop nodes have one body child plus at least one
    /// redo child.
    pub fn is_valid(&self) -> bool {
        if self.root >= self.nodes.len() {
            return false;
        }
        let mut referenced = vec![0_usize; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            let arity_ok = match &node.node_type {
                NodeType::Activity(_) | NodeType::Tau => node.children.is_empty(),
                NodeType::Operator(_) => node.children.len() >= 2,
            };
            if !arity_ok {
                return false;
            }
            for &child in &node.children {
                if child >= id {
                    return false;
                }
                referenced[child] += 1;
            }
        }
        referenced
            .iter()
            .enumerate()
            .all(|(id, &count)| if id == self.root { count == 0 } else { count == 1 })
    }

    fn subtree_eq(&self, id: usize, other: &Self, other_id: usize) -> bool {
        let a = &self.nodes[id];
        let b = &other.nodes[other_id];
        a.node_type == b.node_type
            && a.children.len() == b.children.len()
            && a.children
                .iter()
                .zip(b.children.iter())
                .all(|(&ca, &cb)| self.subtree_eq(ca, other, cb))
    }

    fn fmt_subtree(&self, id: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.nodes[id].node_type {
            NodeType::Activity(label) => write!(f, "'{label}'"),
            NodeType::Tau => write!(f, "tau"),
            NodeType::Operator(op) => {
                write!(f, "{}( ", op.symbol())?;
                for (i, &child) in self.nodes[id].children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    self.fmt_subtree(child, f)?;
                }
                write!(f, " )")
            }
        }
    }
}

impl PartialEq for ProcessTree {
    fn eq(&self, other: &Self) -> bool {
        self.subtree_eq(self.root, other, other.root)
    }
}

impl Eq for ProcessTree {}

impl fmt::Display for ProcessTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(self.root, f)
    }
}
