//! Index-arena AST.
//!
//! Nodes are stored in pre-order, so a node's [`NodeId`] is also its
//! position in a depth-first traversal and every subtree occupies a
//! contiguous id range. Parent, child and sibling links are indices into
//! the same arena. The tree is read-only once the parser returns it.

mod node_type;

pub use node_type::NodeType;

use serde::Serialize;
use std::fmt::Write as _;
use std::ops::Range;

/// Index of a node in its [`Ast`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Returns the arena index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }
}

/// Stored data of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Node type.
    pub kind: NodeType,
    /// Source text for leaves and operators (identifier, literal, operator).
    pub text: Option<String>,
    /// Line of the node's first token (1-indexed).
    pub line: usize,
    /// Tab-expanded column of the node's first token (1-indexed).
    pub column: usize,
    /// Raw byte span covering all tokens of the subtree.
    pub span: Range<usize>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    subtree_end: u32,
}

/// Comment flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

/// A comment kept beside the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Comment flavour.
    pub kind: CommentKind,
    /// Raw comment text including delimiters.
    pub text: String,
    /// Line of the comment start (1-indexed).
    pub line: usize,
    /// Tab-expanded column of the comment start (1-indexed).
    pub column: usize,
    /// Raw byte span.
    pub span: Range<usize>,
    /// First node starting after the comment, if any.
    pub attached_to: Option<NodeId>,
}

impl Comment {
    /// Comment body without delimiters.
    #[must_use]
    pub fn body(&self) -> &str {
        match self.kind {
            CommentKind::Line => self.text.strip_prefix("//").unwrap_or(&self.text),
            CommentKind::Block => {
                let inner = self.text.strip_prefix("/*").unwrap_or(&self.text);
                inner.strip_suffix("*/").unwrap_or(inner)
            }
        }
    }

    /// Line of the last character of the comment.
    #[must_use]
    pub fn end_line(&self) -> usize {
        let breaks = self.text.matches('\n').count();
        let lone_cr = self.text.matches('\r').count() - self.text.matches("\r\n").count();
        self.line + breaks + lone_cr
    }
}

/// Node under construction, produced by the parser before flattening.
#[derive(Debug, Clone)]
pub(crate) struct PendingNode {
    pub(crate) kind: NodeType,
    pub(crate) text: Option<String>,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) span: Range<usize>,
    pub(crate) children: Vec<PendingNode>,
}

impl PendingNode {
    pub(crate) fn new(kind: NodeType, line: usize, column: usize, span: Range<usize>) -> Self {
        Self {
            kind,
            text: None,
            line,
            column,
            span,
            children: Vec::new(),
        }
    }

    pub(crate) fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub(crate) fn with_child(mut self, child: PendingNode) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn push(&mut self, child: PendingNode) {
        self.children.push(child);
    }

    /// Copy of this subtree with every node moved to an empty span at
    /// `offset`.
    pub(crate) fn relocated(&self, line: usize, column: usize, offset: usize) -> Self {
        Self {
            kind: self.kind,
            text: self.text.clone(),
            line,
            column,
            span: offset..offset,
            children: self
                .children
                .iter()
                .map(|child| child.relocated(line, column, offset))
                .collect(),
        }
    }
}

/// Parsed syntax tree of one file.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<NodeData>,
    comments: Vec<Comment>,
}

impl Ast {
    /// Flattens a pending tree into pre-order arena storage.
    pub(crate) fn from_pending(root: PendingNode) -> Self {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack = vec![(root, None::<NodeId>)];
        // Nodes whose subtree is still open, innermost last.
        let mut open: Vec<NodeId> = Vec::new();

        while let Some((pending, parent)) = stack.pop() {
            let id = NodeId::from_index(nodes.len());
            while let Some(&top) = open.last() {
                if Some(top) == parent {
                    break;
                }
                close(&mut nodes, top);
                open.pop();
            }

            // Siblings are materialized in order, so the parent's current
            // last child is this node's previous sibling.
            let prev = parent.and_then(|p| nodes[p.index()].last_child);
            nodes.push(NodeData {
                kind: pending.kind,
                text: pending.text,
                line: pending.line,
                column: pending.column,
                span: pending.span,
                parent,
                first_child: None,
                last_child: None,
                next_sibling: None,
                prev_sibling: prev,
                subtree_end: 0,
            });
            if let Some(p) = parent {
                let data = &mut nodes[p.index()];
                if data.first_child.is_none() {
                    data.first_child = Some(id);
                }
                data.last_child = Some(id);
            }
            if let Some(prev) = prev {
                nodes[prev.index()].next_sibling = Some(id);
            }
            open.push(id);

            for child in pending.children.into_iter().rev() {
                stack.push((child, Some(id)));
            }
        }
        while let Some(top) = open.pop() {
            close(&mut nodes, top);
        }

        Self {
            nodes,
            comments: Vec::new(),
        }
    }

    /// Attaches comments to the first node (in pre-order) starting at or
    /// after the comment's end.
    pub(crate) fn attach_comments(&mut self, mut comments: Vec<Comment>) {
        for comment in &mut comments {
            let index = self
                .nodes
                .partition_point(|node| node.span.start < comment.span.end);
            comment.attached_to = (index < self.nodes.len()).then(|| NodeId::from_index(index));
        }
        self.comments = comments;
    }

    /// Root node (`COMPILATION_UNIT`).
    #[must_use]
    pub fn root(&self) -> NodeRef<'_> {
        self.node(NodeId(0))
    }

    /// Navigable handle for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.index() < self.nodes.len(), "node id out of range");
        NodeRef { ast: self, id }
    }

    /// Raw data for `id`.
    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes (never true for a parsed file).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        (0..self.nodes.len()).map(move |i| NodeRef {
            ast: self,
            id: NodeId::from_index(i),
        })
    }

    /// Comments in source order.
    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Renders the tree one node per line as `NAME -> text [line:column]`.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.nodes.is_empty() {
            return out;
        }
        let mut stack: Vec<(NodeId, String, bool, bool)> = vec![(NodeId(0), String::new(), true, true)];
        while let Some((id, prefix, last, is_root)) = stack.pop() {
            let data = &self.nodes[id.index()];
            let branch = match (is_root, last) {
                (true, _) => "",
                (false, true) => "`--",
                (false, false) => "|--",
            };
            let _ = writeln!(
                out,
                "{prefix}{branch}{} -> {} [{}:{}]",
                data.kind,
                data.text.as_deref().unwrap_or(data.kind.name()),
                data.line,
                data.column
            );
            let child_prefix = match (is_root, last) {
                (true, _) => String::new(),
                (false, true) => format!("{prefix}    "),
                (false, false) => format!("{prefix}|   "),
            };
            let children: Vec<NodeId> = self.node(id).children().map(|c| c.id()).collect();
            for (i, child) in children.iter().enumerate().rev() {
                stack.push((*child, child_prefix.clone(), i + 1 == children.len(), false));
            }
        }
        out
    }
}

fn close(nodes: &mut [NodeData], id: NodeId) {
    let end = u32::try_from(nodes.len()).unwrap_or(u32::MAX);
    let last_end = nodes[id.index()]
        .last_child
        .map(|c| nodes[c.index()].span.end);
    let data = &mut nodes[id.index()];
    data.subtree_end = end;
    if let Some(child_end) = last_end {
        data.span.end = data.span.end.max(child_end);
    }
}

/// Borrowed, copyable handle to a node.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    ast: &'a Ast,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ast, other.ast) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.ast.nodes[self.id.index()]
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<NodeRef<'a>> {
        id.map(|id| NodeRef { ast: self.ast, id })
    }

    /// Arena id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Tree this node belongs to.
    #[must_use]
    pub fn ast(&self) -> &'a Ast {
        self.ast
    }

    /// Node type.
    #[must_use]
    pub fn kind(&self) -> NodeType {
        self.data().kind
    }

    /// Whether the node has the given type.
    #[must_use]
    pub fn is(&self, kind: NodeType) -> bool {
        self.kind() == kind
    }

    /// Source text, for leaves and operators.
    #[must_use]
    pub fn text(&self) -> Option<&'a str> {
        self.data().text.as_deref()
    }

    /// Line (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.data().line
    }

    /// Tab-expanded column (1-indexed).
    #[must_use]
    pub fn column(&self) -> usize {
        self.data().column
    }

    /// Raw byte span of the subtree.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.data().span.clone()
    }

    /// Parent node; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.wrap(self.data().parent)
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self) -> Option<NodeRef<'a>> {
        self.wrap(self.data().first_child)
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self) -> Option<NodeRef<'a>> {
        self.wrap(self.data().last_child)
    }

    /// Next sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.wrap(self.data().next_sibling)
    }

    /// Previous sibling.
    #[must_use]
    pub fn previous_sibling(&self) -> Option<NodeRef<'a>> {
        self.wrap(self.data().prev_sibling)
    }

    /// Children in source order.
    pub fn children(&self) -> Children<'a> {
        Children {
            next: self.first_child(),
        }
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// First child of the given type.
    #[must_use]
    pub fn find_child(&self, kind: NodeType) -> Option<NodeRef<'a>> {
        self.children().find(|c| c.is(kind))
    }

    /// Whether a direct child of the given type exists.
    #[must_use]
    pub fn has_child(&self, kind: NodeType) -> bool {
        self.find_child(kind).is_some()
    }

    /// This node and all of its descendants in pre-order.
    pub fn subtree(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let ast = self.ast;
        let range = self.id.index()..self.data().subtree_end as usize;
        range.map(move |i| NodeRef {
            ast,
            id: NodeId::from_index(i),
        })
    }

    /// Whether `other` lies in this node's subtree (itself included).
    #[must_use]
    pub fn contains(&self, other: NodeId) -> bool {
        (self.id.index()..self.data().subtree_end as usize).contains(&other.index())
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), NodeRef::parent)
    }

    /// Comments attached to this node.
    pub fn comments(&self) -> impl Iterator<Item = &'a Comment> + 'a {
        let id = self.id;
        self.ast
            .comments
            .iter()
            .filter(move |c| c.attached_to == Some(id))
    }
}

/// Iterator over a node's children.
#[derive(Debug, Clone)]
pub struct Children<'a> {
    next: Option<NodeRef<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_sibling();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(kind: NodeType, text: &str, column: usize, start: usize) -> PendingNode {
        PendingNode::new(kind, 1, column, start..start + text.len()).with_text(text)
    }

    // a + b * c
    fn sample() -> Ast {
        let product = PendingNode::new(NodeType::Star, 1, 5, 4..5)
            .with_text("*")
            .with_child(leaf(NodeType::Ident, "b", 5, 4))
            .with_child(leaf(NodeType::Ident, "c", 9, 8));
        let sum = PendingNode::new(NodeType::Plus, 1, 1, 0..1)
            .with_text("+")
            .with_child(leaf(NodeType::Ident, "a", 1, 0))
            .with_child(product);
        let root = PendingNode::new(NodeType::CompilationUnit, 1, 1, 0..9).with_child(sum);
        Ast::from_pending(root)
    }

    #[test]
    fn test_ids_follow_pre_order() {
        let ast = sample();
        let kinds: Vec<NodeType> = ast.iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeType::CompilationUnit,
                NodeType::Plus,
                NodeType::Ident,
                NodeType::Star,
                NodeType::Ident,
                NodeType::Ident,
            ]
        );
    }

    #[test]
    fn test_navigation_links_are_consistent() {
        let ast = sample();
        let plus = ast.root().first_child().unwrap();
        let a = plus.first_child().unwrap();
        let star = a.next_sibling().unwrap();
        assert_eq!(star.previous_sibling(), Some(a));
        assert_eq!(plus.last_child(), Some(star));
        assert_eq!(star.parent(), Some(plus));
        assert_eq!(star.child_count(), 2);
        assert_eq!(star.next_sibling(), None);
        assert_eq!(ast.root().parent(), None);
        assert_eq!(star.ancestors().count(), 2);
    }

    #[test]
    fn test_subtree_is_contiguous_and_span_covers_children() {
        let ast = sample();
        let plus = ast.root().first_child().unwrap();
        assert_eq!(plus.subtree().count(), 5);
        assert_eq!(plus.span(), 0..9);
        let star = plus.last_child().unwrap();
        assert!(plus.contains(star.id()));
        assert!(!star.contains(plus.id()));
        assert_eq!(star.span(), 4..9);
    }

    #[test]
    fn test_comments_attach_to_following_node() {
        let mut ast = sample();
        let comment = Comment {
            kind: CommentKind::Block,
            text: "/*x*/".to_string(),
            line: 1,
            column: 1,
            span: 2..4,
            attached_to: None,
        };
        ast.attach_comments(vec![comment]);
        let star = ast.root().first_child().unwrap().last_child().unwrap();
        assert_eq!(ast.comments()[0].attached_to, Some(star.id()));
        assert_eq!(star.comments().count(), 1);
        assert_eq!(ast.comments()[0].body(), "x");
    }

    #[test]
    fn test_dump_draws_tree() {
        let dump = sample().dump();
        let expected = "\
COMPILATION_UNIT -> COMPILATION_UNIT [1:1]
`--PLUS -> + [1:1]
    |--IDENT -> a [1:1]
    `--STAR -> * [1:5]
        |--IDENT -> b [1:5]
        `--IDENT -> c [1:9]
";
        assert_eq!(dump, expected);
    }
}
