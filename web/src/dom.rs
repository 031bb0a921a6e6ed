// Rendering surface.
//
// Components never touch a browser directly. They talk to a [`Document`], which a
// host implements over its real DOM; [`MemoryDocument`] is the headless
// implementation used by the tests and the preview binary.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::UiError;

/// Opaque handle to an element owned by a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Element lookup, class toggling, text and markup injection.
///
/// All methods take `&self`; implementations synchronise internally so the surface can
/// be shared with timer callbacks.
pub trait Document: Send + Sync {
    fn body(&self) -> NodeId;
    /// Connected element whose `id` attribute equals `id`.
    fn get_element_by_id(&self, id: &str) -> Option<NodeId>;
    fn create_element(&self, tag: &str) -> NodeId;
    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), UiError>;
    /// Detaches `node` from its parent.
    fn remove(&self, node: NodeId) -> Result<(), UiError>;
    fn is_connected(&self, node: NodeId) -> bool;
    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> Option<String>;
    /// Descendants of `root` in document order, `root` excluded.
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;
    fn add_class(&self, node: NodeId, class: &str) -> Result<(), UiError>;
    fn remove_class(&self, node: NodeId, class: &str) -> Result<(), UiError>;
    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), UiError>;
    /// Current value of a form control; `None` for other elements.
    fn value(&self, node: NodeId) -> Option<String>;
    fn set_value(&self, node: NodeId, value: &str) -> Result<(), UiError>;
    fn text_content(&self, node: NodeId) -> String;
    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), UiError>;
    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), UiError>;
    fn inner_html(&self, node: NodeId) -> String;
}

/// Descendants of `root` whose tag is one of `tags`.
pub fn elements_by_tag(document: &dyn Document, root: NodeId, tags: &[&str]) -> Vec<NodeId> {
    document
        .descendants(root)
        .into_iter()
        .filter(|node| {
            document
                .tag_name(*node)
                .is_some_and(|tag| tags.contains(&tag.as_str()))
        })
        .collect()
}

/// Descendants of `root` carrying any of `classes`, in document order.
pub fn elements_by_class<S: AsRef<str>>(
    document: &dyn Document,
    root: NodeId,
    classes: &[S],
) -> Vec<NodeId> {
    document
        .descendants(root)
        .into_iter()
        .filter(|node| classes.iter().any(|c| document.has_class(*node, c.as_ref())))
        .collect()
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const FORM_CONTROLS: [&str; 3] = ["input", "select", "textarea"];
const VOID_ELEMENTS: [&str; 4] = ["input", "br", "hr", "img"];

#[derive(Debug, Default)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    text: String,
    value: Option<String>,
    markup: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
}

impl Tree {
    fn node(&self, id: NodeId) -> Result<&Node, UiError> {
        self.nodes.get(id.0).ok_or(UiError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, UiError> {
        self.nodes.get_mut(id.0).ok_or(UiError::UnknownNode(id))
    }

    fn push(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_ascii_lowercase(),
            ..Node::default()
        });
        id
    }

    fn detach(&mut self, id: NodeId) -> Result<(), UiError> {
        if let Some(parent) = self.node_mut(id)?.parent.take() {
            self.node_mut(parent)?.children.retain(|c| *c != id);
        }
        Ok(())
    }

    /// Drops children, text and stored markup of `id`.
    fn clear_content(&mut self, id: NodeId) -> Result<(), UiError> {
        let children = std::mem::take(&mut self.node_mut(id)?.children);
        for child in children {
            self.node_mut(child)?.parent = None;
        }
        let node = self.node_mut(id)?;
        node.text.clear();
        node.markup = None;
        Ok(())
    }

    fn walk(&self, root: NodeId, out: &mut Vec<NodeId>) {
        if let Ok(node) = self.node(root) {
            for child in &node.children {
                out.push(*child);
                self.walk(*child, out);
            }
        }
    }

    fn text_of(&self, id: NodeId, out: &mut String) {
        if let Ok(node) = self.node(id) {
            out.push_str(&node.text);
            for child in &node.children {
                self.text_of(*child, out);
            }
        }
    }

    fn serialize_children(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };
        if let Some(markup) = &node.markup {
            out.push_str(markup);
            return;
        }
        out.push_str(&escape_html(&node.text));
        for child in &node.children {
            self.serialize(*child, out);
        }
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        let Ok(node) = self.node(id) else { return };
        let _ = write!(out, "<{}", node.tag);
        for (name, value) in &node.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
        }
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_html(&node.classes.join(" ")));
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&node.tag.as_str()) {
            return;
        }
        self.serialize_children(id, out);
        let _ = write!(out, "</{}>", node.tag);
    }
}

/// Headless [`Document`]: an element tree with no markup parser.
///
/// Markup given to `set_inner_html` is stored verbatim and returned by `inner_html`; it
/// does not create child elements.
#[derive(Debug)]
pub struct MemoryDocument {
    tree: Mutex<Tree>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        let mut tree = Tree {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
        };
        let root = tree.push("html");
        let body = tree.push("body");
        tree.nodes[body.0].parent = Some(root);
        tree.nodes[root.0].children.push(body);
        tree.root = root;
        tree.body = body;
        Self {
            tree: Mutex::new(tree),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates `<tag id=...>` and appends it to `parent`.
    pub fn append_element(
        &self,
        parent: NodeId,
        tag: &str,
        id: Option<&str>,
    ) -> Result<NodeId, UiError> {
        let node = self.create_element(tag);
        if let Some(id) = id {
            self.set_attribute(node, "id", id)?;
        }
        self.append_child(parent, node)?;
        Ok(node)
    }
}

impl Document for MemoryDocument {
    fn body(&self) -> NodeId {
        self.tree().body
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree();
        let mut connected = Vec::new();
        tree.walk(tree.root, &mut connected);
        connected.into_iter().find(|node| {
            tree.node(*node)
                .is_ok_and(|n| n.attributes.get("id").map(String::as_str) == Some(id))
        })
    }

    fn create_element(&self, tag: &str) -> NodeId {
        self.tree().push(tag)
    }

    fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        let mut tree = self.tree();
        tree.node(parent)?;
        // Refuse cycles: the child may not be an ancestor of the parent.
        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == child {
                return Err(UiError::DomError("cannot append a node inside itself".to_string()));
            }
            cursor = tree.node(current)?.parent;
        }
        tree.detach(child)?;
        tree.node_mut(child)?.parent = Some(parent);
        let parent_node = tree.node_mut(parent)?;
        parent_node.markup = None;
        parent_node.children.push(child);
        Ok(())
    }

    fn remove(&self, node: NodeId) -> Result<(), UiError> {
        self.tree().detach(node)
    }

    fn is_connected(&self, node: NodeId) -> bool {
        let tree = self.tree();
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == tree.root {
                return true;
            }
            cursor = tree.node(current).ok().and_then(|n| n.parent);
        }
        false
    }

    fn tag_name(&self, node: NodeId) -> Option<String> {
        self.tree().node(node).ok().map(|n| n.tag.clone())
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.tree().walk(root, &mut out);
        out
    }

    fn add_class(&self, node: NodeId, class: &str) -> Result<(), UiError> {
        let mut tree = self.tree();
        let node = tree.node_mut(node)?;
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&self, node: NodeId, class: &str) -> Result<(), UiError> {
        self.tree().node_mut(node)?.classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree()
            .node(node)
            .is_ok_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree();
        let n = tree.node(node).ok()?;
        if name == "class" {
            return (!n.classes.is_empty()).then(|| n.classes.join(" "));
        }
        n.attributes.get(name).cloned()
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), UiError> {
        let mut tree = self.tree();
        let n = tree.node_mut(node)?;
        if name == "class" {
            n.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            n.attributes.insert(name.to_string(), value.to_string());
        }
        Ok(())
    }

    fn value(&self, node: NodeId) -> Option<String> {
        let tree = self.tree();
        let n = tree.node(node).ok()?;
        if !FORM_CONTROLS.contains(&n.tag.as_str()) {
            return None;
        }
        let value = match &n.value {
            Some(v) => v.clone(),
            None if n.tag == "textarea" => n.text.clone(),
            None => n.attributes.get("value").cloned().unwrap_or_default(),
        };
        Some(value)
    }

    fn set_value(&self, node: NodeId, value: &str) -> Result<(), UiError> {
        let mut tree = self.tree();
        let n = tree.node_mut(node)?;
        if !FORM_CONTROLS.contains(&n.tag.as_str()) {
            return Err(UiError::DomError(format!("<{}> has no value", n.tag)));
        }
        n.value = Some(value.to_string());
        Ok(())
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.tree().text_of(node, &mut out);
        out
    }

    fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), UiError> {
        let mut tree = self.tree();
        tree.clear_content(node)?;
        tree.node_mut(node)?.text = text.to_string();
        Ok(())
    }

    fn set_inner_html(&self, node: NodeId, markup: &str) -> Result<(), UiError> {
        let mut tree = self.tree();
        tree.clear_content(node)?;
        tree.node_mut(node)?.markup = Some(markup.to_string());
        Ok(())
    }

    fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.tree().serialize_children(node, &mut out);
        out
    }
}
