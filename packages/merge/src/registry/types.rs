//! Types for the tag registry.

/// How the identity key of an element is derived from its content.
///
/// The identity key is only used to match elements of the same tag across
/// two descriptors during a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityRule {
    /// Element cannot be identified; it never matches anything.
    Unidentified,

    /// At most one such element per parent; all instances match each other.
    Singleton,

    /// Trimmed text of the child at a slash-separated path (e.g. `"filter-name"`).
    ChildText(String),

    /// Value of an attribute (e.g. `"name"` on a Tomcat `<Resource>`).
    Attribute(String),

    /// Trimmed text of the element itself (e.g. `<welcome-file>`).
    Text,

    /// Which of the listed children is present, first match wins.
    ///
    /// Used to tell a URL-based mapping from a servlet-name based one
    /// without making the mapped value part of the identity.
    ChildPresence(Vec<String>),

    /// Which of the listed attributes is present, first match wins.
    ///
    /// The attribute counterpart of `ChildPresence`; both report the bare
    /// name, so the two forms of one element produce the same key.
    AttributePresence(Vec<String>),

    /// First alternative that yields a key.
    AnyOf(Vec<IdentityRule>),

    /// All parts must yield a key; the identity is their concatenation.
    AllOf(Vec<IdentityRule>),
}

impl IdentityRule {
    /// Identity from the text of a child element.
    #[must_use]
    pub fn child(path: impl Into<String>) -> Self {
        Self::ChildText(path.into())
    }

    /// Identity from an attribute.
    #[must_use]
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::Attribute(name.into())
    }

    /// Identity from whichever listed child is present.
    #[must_use]
    pub fn presence(tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::ChildPresence(tags.into_iter().map(Into::into).collect())
    }

    /// Identity from whichever listed attribute is present.
    #[must_use]
    pub fn attribute_presence(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::AttributePresence(names.into_iter().map(Into::into).collect())
    }
}

/// Declarative specification of one element kind in a dialect.
#[derive(Debug, Clone)]
pub struct Tag {
    /// Local name, case-sensitive. The namespace comes from the dialect.
    pub name: String,

    /// Whether the element may repeat under its parent.
    pub multiple: bool,

    /// Index in the dialect's top-level order; `None` for nested tags.
    pub position: Option<usize>,

    /// How to compute the identity key during merges.
    pub identity: IdentityRule,

    /// Required order of this element's own children, when the schema fixes one.
    pub child_order: Vec<String>,
}

impl Tag {
    /// Create a non-repeatable tag with no identity.
    ///
    /// Non-repeatable tags behave as singletons when merged.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: false,
            position: None,
            identity: IdentityRule::Singleton,
            child_order: Vec::new(),
        }
    }

    /// Create a repeatable tag identified by `identity`.
    #[must_use]
    pub fn repeatable(name: impl Into<String>, identity: IdentityRule) -> Self {
        Self {
            multiple: true,
            identity,
            ..Self::new(name)
        }
    }

    /// Set the order of child elements.
    #[must_use]
    pub fn with_child_order(mut self, order: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.child_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this tag is a top-level section of its dialect.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.position.is_some()
    }
}
