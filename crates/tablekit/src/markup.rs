//! In-memory markup tree.
//!
//! The render core never writes HTML strings directly: it builds [`Element`]
//! trees inside a [`Container`] so incremental updates can remove and insert
//! individual row nodes while leaving the header (and anything plugins hung
//! on it) untouched. Trees serialize to HTML with [`Element::to_html`].
//!
//! # Example
//!
//! ```rust
//! use tablekit::markup::Element;
//!
//! let cell = Element::new("div")
//!     .class("cell")
//!     .attr("data-column", "name")
//!     .text("Tom & Jerry");
//!
//! assert_eq!(
//!     cell.to_html(),
//!     r#"<div class="cell" data-column="name">Tom &amp; Jerry</div>"#
//! );
//! ```

use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Tags that never have children or a closing tag.
const VOID_TAGS: [&str; 4] = ["input", "img", "br", "hr"];

/// A node in the markup tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),
    /// A text node; escaped on serialization.
    Text(String),
}

impl Node {
    /// Returns the element if this node is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// Returns the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(el) => el.write_html(out),
            Self::Text(text) => out.push_str(&escape(text)),
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Element(el) => {
                for child in &el.children {
                    child.collect_text(out);
                }
            }
            Self::Text(text) => out.push_str(text),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// An element: tag, attributes, classes and child nodes.
///
/// Attributes are kept sorted so serialization is deterministic. The `class`
/// attribute is managed separately through [`Element::class`] and friends.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Tag name.
    pub tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Adds a class (builder pattern).
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Sets an attribute (builder pattern).
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Appends a text child (builder pattern).
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Appends an element child (builder pattern).
    #[must_use]
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Appends several element children (builder pattern).
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Returns all attributes (without `class`).
    #[must_use]
    pub fn attrs(&self) -> &BTreeMap<String, String> {
        &self.attrs
    }

    /// Sets an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Removes an attribute.
    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.remove(name);
    }

    /// Returns the element's classes.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns whether the element carries `class`.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if not already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    /// Removes a class.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Adds or removes a class.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Returns the element's `id` attribute.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_attr("id")
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Iterates the direct element children.
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Finds the first descendant (or self) matching `pred`, depth first.
    pub fn find(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if pred(self) {
            return Some(self);
        }
        self.element_children().find_map(|child| child.find(pred))
    }

    /// Mutable variant of [`Element::find`].
    pub fn find_mut(&mut self, pred: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if pred(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find_map(|child| child.find_mut(pred))
    }

    /// Collects every descendant (or self) matching `pred`, in document order.
    pub fn find_all(&self, pred: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_matching(pred, &mut out);
        out
    }

    fn collect_matching<'a>(&'a self, pred: &dyn Fn(&Element) -> bool, out: &mut Vec<&'a Element>) {
        if pred(self) {
            out.push(self);
        }
        for child in self.element_children() {
            child.collect_matching(pred, out);
        }
    }

    /// Applies `f` to every descendant (or self) matching `pred`.
    ///
    /// Returns how many elements were visited.
    pub fn for_each_mut(
        &mut self,
        pred: &dyn Fn(&Element) -> bool,
        f: &mut dyn FnMut(&mut Element),
    ) -> usize {
        let mut count = 0;
        if pred(self) {
            f(self);
            count += 1;
        }
        for child in self.children.iter_mut().filter_map(Node::as_element_mut) {
            count += child.for_each_mut(pred, f);
        }
        count
    }

    /// Serializes the element to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

/// Escapes text for HTML element content and attribute values.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// A shared, mutable mount point for rendered markup.
///
/// Cloning a container clones the handle, not the tree: a [`Document`], a
/// table core and a pagination charm can all hold the same container.
#[derive(Debug, Clone)]
pub struct Container(Rc<RefCell<Element>>);

impl Container {
    /// Creates a container `<div id="...">`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_element(Element::new("div").attr("id", id))
    }

    /// Wraps an existing element.
    #[must_use]
    pub fn from_element(element: Element) -> Self {
        Self(Rc::new(RefCell::new(element)))
    }

    /// Returns the container's `id` attribute (empty when missing).
    #[must_use]
    pub fn id(&self) -> String {
        self.0.borrow().id().unwrap_or_default().to_string()
    }

    /// Borrows the root element.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Element> {
        self.0.borrow()
    }

    /// Mutably borrows the root element.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Element> {
        self.0.borrow_mut()
    }

    /// Returns whether two handles point at the same container.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Serializes the container to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        self.0.borrow().to_html()
    }
}

/// How a caller points a component at its container.
#[derive(Debug, Clone)]
pub enum ContainerRef {
    /// An already-resolved container.
    Element(Container),
    /// An id to resolve against a [`Document`].
    Id(String),
}

impl From<Container> for ContainerRef {
    fn from(container: Container) -> Self {
        Self::Element(container)
    }
}

impl From<&Container> for ContainerRef {
    fn from(container: &Container) -> Self {
        Self::Element(container.clone())
    }
}

impl From<&str> for ContainerRef {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl ContainerRef {
    /// Resolves the reference to a container.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContainerNotFound`] when an id has no mount point in
    /// `doc`, or when no document was given to resolve it against.
    pub fn resolve(self, doc: Option<&Document>) -> Result<Container> {
        match self {
            Self::Element(container) => Ok(container),
            Self::Id(id) => doc
                .and_then(|d| d.get(&id))
                .ok_or(Error::ContainerNotFound(id)),
        }
    }
}

/// Registry of named mount points, standing in for a page.
#[derive(Debug, Clone, Default)]
pub struct Document {
    mounts: BTreeMap<String, Container>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the container mounted under `id`, creating it if needed.
    pub fn mount(&mut self, id: &str) -> Container {
        self.mounts
            .entry(id.to_string())
            .or_insert_with(|| Container::new(id))
            .clone()
    }

    /// Mounts a prepared element under its `id` attribute.
    pub fn insert(&mut self, element: Element) -> Container {
        let id = element.id().unwrap_or_default().to_string();
        let container = Container::from_element(element);
        self.mounts.insert(id, container.clone());
        container
    }

    /// Looks up a mount point.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Container> {
        self.mounts.get(id).cloned()
    }

    /// Removes a mount point.
    pub fn remove(&mut self, id: &str) -> Option<Container> {
        self.mounts.remove(id)
    }

    /// Iterates mount points in id order.
    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.mounts.values()
    }
}
