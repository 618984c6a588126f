use std::cell::RefCell;
use std::rc::{Rc, Weak};

use trellis_core::{Object, Value};

pub const ELEMENT_NODE: u16 = 1;
pub const TEXT_NODE: u16 = 3;
pub const COMMENT_NODE: u16 = 8;
pub const DOCUMENT_FRAGMENT_NODE: u16 = 11;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element { tag: String },
    Text,
    Comment,
    Fragment,
}

impl NodeKind {
    pub fn node_type(&self) -> u16 {
        match self {
            NodeKind::Element { .. } => ELEMENT_NODE,
            NodeKind::Text => TEXT_NODE,
            NodeKind::Comment => COMMENT_NODE,
            NodeKind::Fragment => DOCUMENT_FRAGMENT_NODE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

/// Host event delivered to listeners. `value` is the target's current form
/// value at dispatch time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: String,
    pub value: String,
}

impl Event {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }

    /// Plain (non-reactive) `{ type, value }` object handed to scope
    /// methods.
    pub fn to_value(&self) -> Value {
        Value::Object(
            Object::new()
                .with("type", self.kind.as_str())
                .with("value", self.value.as_str()),
        )
    }
}

pub type Listener = Rc<dyn Fn(&Event) -> trellis_core::Result<()>>;

/// Shared handle to a node of the in-memory render tree.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

struct NodeInner {
    kind: NodeKind,
    text: RefCell<String>,
    value: RefCell<String>,
    attrs: RefCell<Vec<Attr>>,
    children: RefCell<Vec<Node>>,
    parent: RefCell<Weak<NodeInner>>,
    listeners: RefCell<Vec<(String, Listener)>>,
}

impl Node {
    fn new(kind: NodeKind, text: String) -> Self {
        Node(Rc::new(NodeInner {
            kind,
            text: RefCell::new(text),
            value: RefCell::new(String::new()),
            attrs: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(NodeKind::Element { tag: tag.into() }, String::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text, text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Comment, text.into())
    }

    pub fn fragment() -> Self {
        Self::new(NodeKind::Fragment, String::new())
    }

    /// Builder: sets (or replaces) an attribute.
    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: appends `kids` in order.
    pub fn with_children(self, kids: Vec<Node>) -> Self {
        for kid in &kids {
            self.append_child(kid);
        }
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn node_type(&self) -> u16 {
        self.0.kind.node_type()
    }

    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == ELEMENT_NODE
    }

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    /// Snapshot of the current children.
    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.children.borrow().clone()
    }

    pub fn has_child_nodes(&self) -> bool {
        !self.0.children.borrow().is_empty()
    }

    /// Moves `child` under this node. Appending a fragment moves the
    /// fragment's children instead, leaving it empty.
    pub fn append_child(&self, child: &Node) {
        if child.0.kind == NodeKind::Fragment {
            for grandchild in child.child_nodes() {
                self.append_child(&grandchild);
            }
            return;
        }
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    pub fn remove_child(&self, child: &Node) {
        let is_ours = child
            .parent()
            .is_some_and(|parent| parent.ptr_eq(self));
        if is_ours {
            child.detach();
        }
    }

    fn detach(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent
            .0
            .children
            .borrow_mut()
            .retain(|c| !Rc::ptr_eq(&c.0, &self.0));
        *self.0.parent.borrow_mut() = Weak::new();
    }

    pub fn attributes(&self) -> Vec<Attr> {
        self.0.attrs.borrow().clone()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.0
            .attrs
            .borrow()
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.clone())
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut attrs = self.0.attrs.borrow_mut();
        match attrs.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => attrs.push(Attr { name, value }),
        }
    }

    /// Text of a text/comment node, or the concatenated text of every
    /// descendant text node.
    pub fn text_content(&self) -> String {
        match self.0.kind {
            NodeKind::Text | NodeKind::Comment => self.0.text.borrow().clone(),
            NodeKind::Element { .. } | NodeKind::Fragment => {
                let mut out = String::new();
                self.collect_text(&mut out);
                out
            }
        }
    }

    fn collect_text(&self, out: &mut String) {
        for child in self.0.children.borrow().iter() {
            match child.0.kind {
                NodeKind::Text => out.push_str(&child.0.text.borrow()),
                NodeKind::Comment => {}
                _ => child.collect_text(out),
            }
        }
    }

    /// On elements and fragments, replaces all children with a single text
    /// node (or none, for an empty string).
    pub fn set_text_content(&self, text: impl Into<String>) {
        let text = text.into();
        match self.0.kind {
            NodeKind::Text | NodeKind::Comment => *self.0.text.borrow_mut() = text,
            NodeKind::Element { .. } | NodeKind::Fragment => {
                for child in self.child_nodes() {
                    child.detach();
                }
                if !text.is_empty() {
                    self.append_child(&Node::text(text));
                }
            }
        }
    }

    /// Form value (what an input shows). Independent from text content.
    pub fn value(&self) -> String {
        self.0.value.borrow().clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.0.value.borrow_mut() = value.into();
    }

    pub fn add_event_listener(
        &self,
        kind: impl Into<String>,
        listener: impl Fn(&Event) -> trellis_core::Result<()> + 'static,
    ) {
        self.0
            .listeners
            .borrow_mut()
            .push((kind.into(), Rc::new(listener)));
    }

    pub fn listener_count(&self, kind: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| k == kind)
            .count()
    }

    /// Runs the listeners registered for `event.kind` in order. The first
    /// failure stops dispatch and is returned.
    pub fn dispatch_event(&self, event: &Event) -> trellis_core::Result<()> {
        let listeners: Vec<Listener> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(k, _)| *k == event.kind)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(event)?;
        }
        Ok(())
    }

    /// Simulates the user typing `value`: updates the form value, then
    /// fires an `input` event.
    pub fn input(&self, value: impl Into<String>) -> trellis_core::Result<()> {
        let value = value.into();
        self.set_value(value.clone());
        self.dispatch_event(&Event::new("input", value))
    }

    /// Fires a bare event of `kind` carrying the current form value.
    pub fn fire(&self, kind: &str) -> trellis_core::Result<()> {
        self.dispatch_event(&Event::new(kind, self.value()))
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.kind {
            NodeKind::Element { tag } => f
                .debug_struct("Element")
                .field("tag", tag)
                .field("attributes", &self.0.attrs.borrow())
                .field("children", &self.0.children.borrow())
                .finish(),
            NodeKind::Text => f.debug_tuple("Text").field(&self.0.text.borrow()).finish(),
            NodeKind::Comment => f
                .debug_tuple("Comment")
                .field(&self.0.text.borrow())
                .finish(),
            NodeKind::Fragment => f
                .debug_struct("Fragment")
                .field("children", &self.0.children.borrow())
                .finish(),
        }
    }
}
