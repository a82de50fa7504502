//! Non-fatal schema diagnostics.
//!
//! A rejected layer entry or an unknown group never aborts a compile. The
//! entry is skipped, a [`Diagnostic`] is recorded, and the rest of the tree is
//! built as usual. Each diagnostic is also logged at `warn` level.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("`{task}.{group}` is not related to any argument group")]
    UnknownGroup { task: String, group: String },

    #[error("`{path}` is not an existing argument")]
    UnknownPath { path: String },

    #[error("`{value}` ({new_kind:?}) and `{path}` ({old_kind:?}) are in different types")]
    TypeMismatch {
        path: String,
        value: Value,
        new_kind: crate::literal::LiteralKind,
        old_kind: crate::literal::LiteralKind,
    },

    #[error("`{value}` is not an option of argument `{path}`")]
    NotAnOption { path: String, value: Value },
}

/// Ordered sink of diagnostics produced by one compile run.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}
