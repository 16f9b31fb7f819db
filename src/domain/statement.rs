/// A single clause in a control's statement outline.
///
/// Statements form an ownership tree: each node owns its sub-clauses
/// outright, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statement {
    /// The clause number as found in the source (e.g. `AC-2a.1`).
    ///
    /// Empty for an unnumbered continuation clause.
    pub number: String,

    /// The clause's prose.
    pub text: String,

    /// Nested sub-clauses, in source order.
    pub children: Vec<Self>,
}

impl Statement {
    /// Creates a numbered statement with no children.
    pub fn numbered(number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Creates an unnumbered (continuation) statement with no children.
    pub fn unnumbered(text: impl Into<String>) -> Self {
        Self::numbered(String::new(), text)
    }

    /// Replaces the children of this statement.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Whether this statement carries a clause number.
    #[must_use]
    pub fn is_numbered(&self) -> bool {
        !self.number.is_empty()
    }
}
