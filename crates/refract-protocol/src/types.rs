//! Types engine responses decode into.

use serde::{Deserialize, Serialize};

/// A file or directory node within the project tree, as reported by
/// the engine.
///
/// Resources are fetched on demand and never cached across calls:
/// every fetch is the current truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Absolute or project-root-relative path.
    pub path: String,
    pub kind: ResourceKind,
}

/// Whether a resource is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    File,
    Directory,
}

/// One entry in the engine's undo or redo stack.
///
/// The index is derived solely from response order (0 = most recent)
/// and is volatile: it must be re-fetched before acting on it, and
/// never cached across a mutating call.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub index: usize,
    /// Opaque structured description supplied by the engine.
    pub description: serde_json::Value,
}

impl HistoryEntry {
    /// Decode a history stack from a raw result array, assigning
    /// indices from position.
    pub fn stack_from_result(result: serde_json::Value) -> Result<Vec<Self>, serde_json::Error> {
        let items: Vec<serde_json::Value> = serde_json::from_value(result)?;
        Ok(items
            .into_iter()
            .enumerate()
            .map(|(index, description)| HistoryEntry { index, description })
            .collect())
    }
}

/// One code-assist proposal row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionProposal {
    pub name: String,
    #[serde(default)]
    pub documentation: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// The proposal's kind as reported by the engine ("function",
    /// "variable", ...). Wire field name is `type`.
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}
