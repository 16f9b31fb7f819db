use regex::Regex;

use crate::domain::Statement;

/// Renders statement trees into indented, numbered outline text.
///
/// An `Outline` is bound to a single family code. Every numbered statement it
/// renders must begin with `<code>-<digits>` (the owning control's catalog
/// number); that prefix is stripped and the remaining local label is used for
/// the outline line.
///
/// # Examples
///
/// ```
/// use control_catalog::{Outline, Statement};
///
/// let outline = Outline::new("AC").unwrap();
/// let statements = vec![
///     Statement::unnumbered("The organization:"),
///     Statement::numbered("AC-2a.", "Identifies accounts;"),
/// ];
///
/// assert_eq!(
///     outline.render(&statements).unwrap(),
///     "The organization:\n  a.  Identifies accounts;\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Outline {
    family: String,
    prefix: Regex,
}

impl Outline {
    /// Creates an outline renderer for the given family code.
    ///
    /// An empty family code is accepted; it can only render unnumbered
    /// statements.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Pattern`] if the prefix pattern cannot be
    /// compiled.
    pub fn new(family: &str) -> Result<Self, RenderError> {
        let prefix = Regex::new(&format!("^{}-[0-9]+", regex::escape(family)))?;
        Ok(Self {
            family: family.to_string(),
            prefix,
        })
    }

    /// The family code this outline strips from statement numbers.
    #[must_use]
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Renders statements depth-first, each node's line(s) immediately
    /// followed by its children.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::NumberingMismatch`] if any numbered statement
    /// does not start with this outline's family prefix.
    pub fn render(&self, statements: &[Statement]) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_into(statements, &mut out)?;
        Ok(out)
    }

    /// Renders statements into a record description: the outline with one
    /// trailing newline removed, wrapped in double quotes.
    ///
    /// # Errors
    ///
    /// See [`Outline::render`].
    pub fn describe(&self, statements: &[Statement]) -> Result<String, RenderError> {
        let rendered = self.render(statements)?;
        let body = rendered.strip_suffix('\n').unwrap_or(&rendered);
        Ok(format!("\"{body}\""))
    }

    fn render_into(&self, statements: &[Statement], out: &mut String) -> Result<(), RenderError> {
        for statement in statements {
            let text = &statement.text;
            let local = if statement.is_numbered() {
                self.local_number(&statement.number)?
            } else {
                ""
            };

            if local.is_empty() {
                out.push_str(&format!("{text}\n"));
            } else {
                let mut labels = local.split('.');
                let first = labels.next().unwrap_or_default();
                let rest: Vec<&str> = labels.collect();

                if rest.is_empty() {
                    out.push_str(&format!("  {first}.  {text}\n"));
                } else {
                    // A compound number repeats the clause under each trailing label.
                    for label in rest {
                        out.push_str(&format!("    {label}.  {text}\n"));
                    }
                }
            }

            self.render_into(&statement.children, out)?;
        }
        Ok(())
    }

    /// Strips the `<family>-<digits>` prefix and one trailing period.
    fn local_number<'a>(&self, number: &'a str) -> Result<&'a str, RenderError> {
        let prefix = self
            .prefix
            .find(number)
            .ok_or_else(|| RenderError::NumberingMismatch {
                number: number.to_string(),
                family: self.family.clone(),
            })?;
        let local = &number[prefix.end()..];
        Ok(local.strip_suffix('.').unwrap_or(local))
    }
}

/// Renders `statements` for the given family code.
///
/// Convenience wrapper around [`Outline::new`] and [`Outline::render`].
///
/// # Errors
///
/// See [`Outline::render`].
pub fn render(family: &str, statements: &[Statement]) -> Result<String, RenderError> {
    Outline::new(family)?.render(statements)
}

/// Renders `statements` for the given family code as a record description.
///
/// Convenience wrapper around [`Outline::new`] and [`Outline::describe`].
///
/// # Errors
///
/// See [`Outline::render`].
pub fn describe(family: &str, statements: &[Statement]) -> Result<String, RenderError> {
    Outline::new(family)?.describe(statements)
}

/// Errors that can occur while rendering an outline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A statement number does not begin with the expected catalog prefix.
    #[error("statement number '{number}' does not start with '{family}-<number>'")]
    NumberingMismatch {
        /// The offending statement number.
        number: String,
        /// The family code the number was expected to carry.
        family: String,
    },

    /// The prefix pattern could not be compiled.
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}
