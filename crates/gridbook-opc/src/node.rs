//! Tagged-variant markup tree
//!
//! A plain element/text tree with no schema binding and no parent pointers.
//! Codecs build these trees from markup and read them back; the document
//! model only ever sees [`Node`] values at its boundary.

/// A node in a markup tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with a name, attributes, and children
    Element(Element),
    /// A text run
    Text(String),
}

impl Node {
    /// Get the element payload, if this node is an element
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Mutable element payload, if this node is an element
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    /// Get the text payload, if this node is a text run
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Element(_) => None,
            Node::Text(t) => Some(t),
        }
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Node::Element(el)
    }
}

/// An element: qualified name, ordered attributes, ordered children
///
/// Attributes keep their insertion order so a round-tripping codec can write
/// them back the way they arrived. Lookup is linear; elements in this format
/// carry a handful of attributes at most.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: add a child node
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: add a text child
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// The element's qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Attributes ===

    /// Look up an attribute value
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Check whether an attribute is present
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    /// Set an attribute, replacing an existing one of the same name
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Remove an attribute, returning its value if it was present
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(n, _)| n == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// Iterate attributes in insertion order
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Attribute parsed as u32
    pub fn attribute_u32(&self, name: &str) -> Option<u32> {
        self.attribute(name)?.parse().ok()
    }

    /// Attribute parsed as f64
    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name)?.parse().ok()
    }

    /// Attribute parsed as a boolean ("1"/"true" are true, "0"/"false" false)
    pub fn attribute_bool(&self, name: &str) -> Option<bool> {
        match self.attribute(name)? {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    /// Set a boolean attribute in the format's "1"/"0" encoding
    pub fn set_attribute_bool(&mut self, name: impl Into<String>, value: bool) {
        self.set_attribute(name, if value { "1" } else { "0" });
    }

    // === Children ===

    /// All children in document order
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to the child list
    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    /// Append a child node
    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Iterate child elements, skipping text runs
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element with the given name
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|el| el.name == name)
    }

    /// Mutable first child element with the given name
    pub fn find_child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.children
            .iter_mut()
            .filter_map(Node::as_element_mut)
            .find(|el| el.name == name)
    }

    /// All child elements with the given name
    pub fn find_children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.child_elements().filter(move |el| el.name == name)
    }

    /// Remove every child element with the given name, returning the count
    pub fn remove_children(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| match child {
            Node::Element(el) => el.name != name,
            Node::Text(_) => true,
        });
        before - self.children.len()
    }

    /// Concatenated text of direct text children
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                out.push_str(t);
            }
        }
        out
    }
}
