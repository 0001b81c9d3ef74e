//! Document tree, navigation and mutation.

use std::iter;

use ego_tree::{NodeId, NodeMut, NodeRef, Tree};
use html5ever::serialize::{serialize, Serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::StrTendril as ParserTendril;
use html5ever::{namespace_url, ns, Attribute, LocalName, QualName};
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node, StrTendril};

use crate::error::DomError;
use crate::selector::Selector;

/// Elements whose content never contributes to visible text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Elements that start a new line in visible text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// An HTML document.
///
/// Detached nodes keep their ids until [`compact`](Self::compact) drops
/// them.
#[derive(Debug, Clone)]
pub struct Document {
    html: Html,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node.
    pub fn new() -> Self {
        Self {
            html: Html::new_document(),
        }
    }

    /// Parse a complete HTML document.
    ///
    /// Parsing never fails: malformed markup is repaired the way browsers
    /// repair it, so `<html>`, `<head>` and `<body>` always exist.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    pub fn root(&self) -> NodeId {
        self.html.tree.root().id()
    }

    /// Number of nodes held, detached ones included.
    pub fn len(&self) -> usize {
        self.html.tree.nodes().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.html.tree.root().has_children()
    }

    fn node(&self, id: NodeId) -> Option<NodeRef<'_, Node>> {
        self.html.tree.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<NodeMut<'_, Node>, DomError> {
        self.html.tree.get_mut(id).ok_or(DomError::Unknown(id))
    }

    // ===== Navigation =====

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.value().as_element()
    }

    fn element_of(&self, id: NodeId) -> Result<&Element, DomError> {
        let node = self.node(id).ok_or(DomError::Unknown(id))?;
        node.value().as_element().ok_or(DomError::NotAnElement(id))
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent().map(|parent| parent.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    /// Ancestors from the parent up to the document node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.ancestors())
            .map(|ancestor| ancestor.id())
    }

    /// Descendants in document order, excluding `id` itself.
    fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeRef<'_, Node>> + '_ {
        self.node(id)
            .into_iter()
            .flat_map(|node| node.descendants().skip(1))
    }

    /// Whether the node is reachable from the document root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.root();
        self.node(id).is_some() && (id == root || self.ancestors(id).any(|node| node == root))
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.html
            .tree
            .root()
            .children()
            .find(|child| child.value().is_element())
            .map(|child| child.id())
    }

    pub fn head(&self) -> Option<NodeId> {
        self.child_element_named(self.document_element()?, "head")
    }

    pub fn body(&self) -> Option<NodeId> {
        self.child_element_named(self.document_element()?, "body")
    }

    fn child_element_named(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children()
            .find(|child| child.value().as_element().map(Element::name) == Some(name))
            .map(|child| child.id())
    }

    // ===== Attributes =====

    /// Value of an attribute without a namespace.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.rebuild_element(id, |attrs| {
            let value = ParserTendril::from(value);
            match attrs
                .iter_mut()
                .find(|attr| attr.name.ns == ns!() && &*attr.name.local == name)
            {
                Some(attr) => attr.value = value,
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(name)),
                    value,
                }),
            }
        })
    }

    /// Add a class to the element's class list if it is not already there.
    pub fn add_class(&mut self, id: NodeId, class: &str) -> Result<(), DomError> {
        let element = self.element_of(id)?;
        if element.has_class(class, CaseSensitivity::CaseSensitive) {
            return Ok(());
        }
        let classes = match element.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &classes)
    }

    /// `scraper` caches the id and class list of an element on first use,
    /// so attribute edits rebuild the element rather than touching `attrs`.
    fn rebuild_element(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Vec<Attribute>),
    ) -> Result<(), DomError> {
        let mut node = self.node_mut(id)?;
        let Node::Element(element) = node.value() else {
            return Err(DomError::NotAnElement(id));
        };
        let mut attrs: Vec<Attribute> = element
            .attrs
            .iter()
            .map(|(name, value)| Attribute {
                name: name.clone(),
                value: ParserTendril::from(&**value),
            })
            .collect();
        edit(&mut attrs);
        *element = Element::new(element.name.clone(), attrs);
        Ok(())
    }

    // ===== Text =====

    /// Concatenated text of the node and its descendants, like DOM
    /// `textContent`.
    pub fn text_content(&self, id: NodeId) -> String {
        self.node(id)
            .map(|node| {
                node.descendants()
                    .filter_map(|n| n.value().as_text())
                    .map(|text| &**text)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Approximation of rendered text, like DOM `innerText`.
    ///
    /// Hidden elements are skipped, block elements sit on their own lines and
    /// runs of whitespace inside a line collapse to one space.
    pub fn inner_text(&self, id: NodeId) -> String {
        let mut raw = String::new();
        if let Some(node) = self.node(id) {
            collect_visible_text(node, &mut raw);
        }
        raw.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ===== Serialization =====

    /// The whole document as HTML.
    pub fn html(&self) -> String {
        to_markup(&self.html, TraversalScope::IncludeNode)
    }

    /// Markup of an element including its own tags. Empty for other nodes.
    pub fn outer_html(&self, id: NodeId) -> String {
        self.node(id)
            .and_then(ElementRef::wrap)
            .map(|element| to_markup(&element, TraversalScope::IncludeNode))
            .unwrap_or_default()
    }

    /// Markup of the children of an element, or of the whole document for
    /// the root.
    pub fn inner_html(&self, id: NodeId) -> String {
        if id == self.root() {
            return self.html();
        }
        self.node(id)
            .and_then(ElementRef::wrap)
            .map(|element| to_markup(&element, TraversalScope::ChildrenOnly(None)))
            .unwrap_or_default()
    }

    // ===== Queries =====

    /// Elements under `scope` matching `selector`, in document order.
    ///
    /// `scope` itself is never part of the result, but ancestors outside the
    /// scope may satisfy descendant combinators.
    pub fn select(&self, selector: &Selector, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .filter_map(ElementRef::wrap)
            .filter(|element| selector.matches(element))
            .map(|element| element.id())
            .collect()
    }

    pub fn select_first(&self, selector: &Selector, scope: NodeId) -> Option<NodeId> {
        self.descendants(scope)
            .filter_map(ElementRef::wrap)
            .find(|element| selector.matches(element))
            .map(|element| element.id())
    }

    /// The node itself or its nearest ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        iter::once(id).chain(self.ancestors(id)).find(|&node| {
            self.node(node)
                .and_then(ElementRef::wrap)
                .is_some_and(|element| selector.matches(&element))
        })
    }

    /// Find an attached element by its `id` attribute.
    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|node| node.value().as_element().and_then(Element::id) == Some(element_id))
            .map(|node| node.id())
    }

    // ===== Construction and mutation =====

    /// Create a detached element in the HTML namespace.
    pub fn create_element(&mut self, name: &str) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(name.to_ascii_lowercase()));
        self.html
            .tree
            .orphan(Node::Element(Element::new(name, Vec::new())))
            .id()
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.html
            .tree
            .orphan(Node::Text(Text {
                text: StrTendril::from(text),
            }))
            .id()
    }

    /// Parse an HTML fragment in body context into detached nodes owned by
    /// this document.
    pub fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let fragment = Html::parse_fragment(html);
        let mut nodes = Vec::new();
        for child in fragment.root_element().children() {
            let copy = self.html.tree.orphan(child.value().clone());
            nodes.push(copy.id());
            copy_children(child, copy);
        }
        nodes
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(child).ok_or(DomError::Unknown(child))?;
        self.check_cycle(parent, child)?;
        self.node_mut(parent)?.append_id(child);
        Ok(())
    }

    /// Put `new` in the tree position of `old`; `old` becomes detached.
    pub fn replace_node(&mut self, old: NodeId, new: NodeId) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::Detached(old))?;
        if old == new {
            return Ok(());
        }
        self.node(new).ok_or(DomError::Unknown(new))?;
        self.check_cycle(parent, new)?;

        self.node_mut(new)?.detach();
        let mut old_node = self.node_mut(old)?;
        old_node.insert_id_before(new);
        old_node.detach();
        Ok(())
    }

    /// Remove the node from its parent. Detached nodes are left alone.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Detach every child of the node.
    pub fn clear_children(&mut self, id: NodeId) {
        for child in self.children(id) {
            self.detach(child);
        }
    }

    /// Replace the node's children with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        let text = self.create_text(text);
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.append_id(text);
        }
    }

    /// Replace the node's children with the parsed fragment.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        let nodes = self.parse_fragment(html);
        if let Some(mut node) = self.html.tree.get_mut(id) {
            for child in nodes {
                node.append_id(child);
            }
        }
    }

    /// Drop every node that is no longer reachable from the root.
    ///
    /// Ids taken before compaction are invalid afterwards. Returns the
    /// number of nodes dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.len();
        let old = &self.html.tree;
        let attached = old.root().descendants().count();
        let mut tree = Tree::with_capacity(old.root().value().clone(), attached);
        copy_children(old.root(), tree.root_mut());
        self.html.tree = tree;
        before - self.len()
    }

    fn check_cycle(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if parent == child || self.ancestors(parent).any(|node| node == child) {
            return Err(DomError::Cycle(child));
        }
        Ok(())
    }
}

/// Deep-copy the children of `from` under `to`.
fn copy_children(from: NodeRef<'_, Node>, mut to: NodeMut<'_, Node>) {
    for child in from.children() {
        let copy = to.append(child.value().clone());
        copy_children(child, copy);
    }
}

fn collect_visible_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(&text.replace('\n', " ")),
        Node::Element(element) => {
            let name = element.name();
            if HIDDEN_ELEMENTS.contains(&name) {
                return;
            }
            if name == "br" {
                out.push('\n');
                return;
            }
            let block = BLOCK_ELEMENTS.contains(&name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_visible_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        Node::Document | Node::Fragment => {
            for child in node.children() {
                collect_visible_text(child, out);
            }
        }
        _ => {}
    }
}

/// Serialize with scripting enabled, matching how pages are parsed, so
/// `<noscript>` content is written back as raw text.
fn to_markup<T: Serialize>(node: &T, scope: TraversalScope) -> String {
    let opts = SerializeOpts {
        scripting_enabled: true,
        traversal_scope: scope,
        create_missing_parent: false,
    };
    let mut buf = Vec::new();
    match serialize(&mut buf, node, opts) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
