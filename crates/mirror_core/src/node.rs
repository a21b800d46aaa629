use std::collections::BTreeMap;

/// Closed vocabulary of rich-text node kinds the converter knows how to emit.
///
/// Anything outside the vocabulary is kept as [`Tag::Unrecognized`] with its
/// element name, so renderers can still look inside it (`pre`, `noscript`,
/// `img`) while the dispatchers treat it as a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Paragraph,
    Heading2,
    Heading3,
    Blockquote,
    UnorderedList,
    ListItem,
    Anchor,
    Bold,
    InlineCode,
    CodeBlockContainer,
    Figure,
    Text,
    Unrecognized(String),
}

/// Class token that marks a `div` as a highlighted code block.
pub const CODE_BLOCK_CLASS: &str = "highlight";

impl Tag {
    /// Classify an HTML element by name and attributes.
    pub fn classify(name: &str, attributes: &BTreeMap<String, String>) -> Self {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "p" => Tag::Paragraph,
            "h2" => Tag::Heading2,
            "h3" => Tag::Heading3,
            "blockquote" => Tag::Blockquote,
            "ul" => Tag::UnorderedList,
            "li" => Tag::ListItem,
            "a" => Tag::Anchor,
            "b" | "strong" => Tag::Bold,
            "code" => Tag::InlineCode,
            "figure" => Tag::Figure,
            "div" if first_class(attributes) == Some(CODE_BLOCK_CLASS) => Tag::CodeBlockContainer,
            _ => Tag::Unrecognized(name),
        }
    }

    /// HTML element name this tag was classified from. Empty for text.
    pub fn element_name(&self) -> &str {
        match self {
            Tag::Paragraph => "p",
            Tag::Heading2 => "h2",
            Tag::Heading3 => "h3",
            Tag::Blockquote => "blockquote",
            Tag::UnorderedList => "ul",
            Tag::ListItem => "li",
            Tag::Anchor => "a",
            Tag::Bold => "b",
            Tag::InlineCode => "code",
            Tag::CodeBlockContainer => "div",
            Tag::Figure => "figure",
            Tag::Text => "",
            Tag::Unrecognized(name) => name,
        }
    }
}

fn first_class(attributes: &BTreeMap<String, String>) -> Option<&str> {
    attributes
        .get("class")
        .and_then(|class| class.split_whitespace().next())
}

/// A node of the source rich-text tree. Never mutated by the converter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentNode {
    pub tag: Tag,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: Tag::Text,
            attributes: BTreeMap::new(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Build an element node, classifying `name` against the vocabulary.
    pub fn element<K, V>(name: &str, attributes: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let attributes: BTreeMap<String, String> = attributes
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            tag: Tag::classify(name, &attributes),
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// Element without attributes.
    pub fn bare(name: &str) -> Self {
        Self::element(name, std::iter::empty::<(String, String)>())
    }

    pub fn with_child(mut self, child: DocumentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = DocumentNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn push_child(&mut self, child: DocumentNode) {
        self.children.push(child);
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whitespace-separated tokens of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn is_element(&self, name: &str) -> bool {
        self.tag != Tag::Text && self.tag.element_name().eq_ignore_ascii_case(name)
    }

    /// Concatenated text of this node and all of its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if self.tag == Tag::Text {
            out.push_str(&self.text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// First descendant (depth-first, document order) with the given element name.
    pub fn find(&self, name: &str) -> Option<&DocumentNode> {
        self.children.iter().find_map(|child| {
            if child.is_element(name) {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// All descendants with the given element name, in document order.
    pub fn find_all<'a>(&'a self, name: &str) -> Vec<&'a DocumentNode> {
        let mut found = Vec::new();
        self.collect_named(name, &mut found);
        found
    }

    fn collect_named<'a>(&'a self, name: &str, found: &mut Vec<&'a DocumentNode>) {
        for child in &self.children {
            if child.is_element(name) {
                found.push(child);
            }
            child.collect_named(name, found);
        }
    }
}
