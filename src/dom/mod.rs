//! Minimal arena-backed document tree: elements, text nodes and ticker markers.

pub mod html;

pub use html::escape_html;

pub const MARKER_CLASS: &str = "hoverquote-ticker";
pub const MARKER_TAG: &str = "span";
pub const MARKER_DATA_ATTR: &str = "data-ticker";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Structural tag carried by marker elements; its presence is what makes an element a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerMarker {
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub marker: Option<TickerMarker>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Owned document. Replaced nodes are detached but stay allocated until the document drops.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        document.root = document.create_element("body");
        document
    }

    /// Body with one `<p>` per line of `text`.
    pub fn from_paragraphs(text: &str) -> Self {
        let mut document = Document::new();
        let root = document.root();
        for line in text.lines() {
            let paragraph = document.create_element("p");
            let content = document.create_text(line);
            document.append_child(paragraph, content);
            document.append_child(root, paragraph);
        }
        document
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            marker: None,
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeKind::Text(text.to_string()))
    }

    /// `<span class="hoverquote-ticker" data-ticker="SYM">SYM</span>` carrying the marker slot.
    pub fn create_marker(&mut self, symbol: &str) -> NodeId {
        let marker = self.alloc(NodeKind::Element(ElementData {
            tag: MARKER_TAG.to_string(),
            attributes: vec![
                ("class".to_string(), MARKER_CLASS.to_string()),
                (MARKER_DATA_ATTR.to_string(), symbol.to_string()),
            ],
            marker: Some(TickerMarker {
                symbol: symbol.to_string(),
            }),
        }));
        let label = self.create_text(symbol);
        self.append_child(marker, label);
        marker
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Swap `old` for `replacements` at the same position under its parent.
    /// Returns `false` when `old` is detached.
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) -> bool {
        let Some(parent) = self.nodes[old.0].parent else {
            return false;
        };
        let Some(position) = self.nodes[parent.0]
            .children
            .iter()
            .position(|child| *child == old)
        else {
            return false;
        };

        for replacement in replacements {
            self.detach(*replacement);
            self.nodes[replacement.0].parent = Some(parent);
        }
        self.nodes[parent.0]
            .children
            .splice(position..=position, replacements.iter().copied());
        self.nodes[old.0].parent = None;
        true
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
    }

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element(_) => None,
        }
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Text(_) => None,
        }
    }

    pub fn marker(&self, node: NodeId) -> Option<&TickerMarker> {
        self.element(node).and_then(|element| element.marker.as_ref())
    }

    /// Symbol of the marker containing `node` (or `node` itself), for hover dispatch.
    pub fn marker_at(&self, node: NodeId) -> Option<&str> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if let Some(marker) = self.marker(current) {
                return Some(&marker.symbol);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Pre-order walk of `node` and everything attached below it.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        order
    }

    pub fn node_count(&self, node: NodeId) -> usize {
        self.descendants(node).len()
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// `(marker node, symbol)` for every marker under `node`, in document order.
    pub fn markers(&self, node: NodeId) -> Vec<(NodeId, &str)> {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.marker(id).map(|marker| (id, marker.symbol.as_str())))
            .collect()
    }

    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        html::write_node(self, node, &mut out);
        out
    }
}
