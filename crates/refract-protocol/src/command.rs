//! The closed command catalog.
//!
//! Every operation the engine understands is one variant here. Each
//! variant fixes the RPC method name, the positional argument order
//! and arity, whether the command mutates server state, and which
//! file the command primarily targets. There is no free-form
//! string-to-method path: a `Command` is the only way to name an
//! engine operation.

use serde_json::Value;

/// One logical engine operation with a fixed argument shape.
///
/// Immutable once constructed; the positional encoding is derived,
/// never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Fetch the full resource tree rooted at the project directory.
    GetAllResources,
    /// Fetch the direct children of one directory resource.
    GetChildren { path: String },
    /// Apply the most recent undoable change in reverse.
    Undo,
    /// Re-apply the most recently undone change.
    Redo,
    /// Fetch the undo stack, most recent first.
    UndoHistory,
    /// Fetch the redo stack, most recent first.
    RedoHistory,
    /// Rename the identifier at `offset` within `path`, or the
    /// file/module itself when `offset` is `None`. The two cases
    /// dispatch different arities (2 vs 3 positional args).
    Rename {
        new_name: String,
        path: String,
        offset: Option<u64>,
    },
    /// Extract the `begin..end` region of `path` into a new method.
    ExtractMethod {
        name: String,
        path: String,
        begin: u64,
        end: u64,
    },
    /// Extract the `begin..end` region of `path` into a new variable.
    ExtractVariable {
        name: String,
        path: String,
        begin: u64,
        end: u64,
    },
    /// Request completion proposals at `position` within `path`,
    /// given the full (possibly unsaved) buffer text.
    CodeAssist {
        source: String,
        position: u64,
        path: String,
    },
}

impl Command {
    /// The RPC method name for this command.
    pub fn method(&self) -> &'static str {
        match self {
            Command::GetAllResources => "get_all_resources",
            Command::GetChildren { .. } => "get_children",
            Command::Undo => "undo",
            Command::Redo => "redo",
            Command::UndoHistory => "undo_history",
            Command::RedoHistory => "redo_history",
            Command::Rename { .. } => "rename",
            Command::ExtractMethod { .. } => "extract_method",
            Command::ExtractVariable { .. } => "extract_variable",
            Command::CodeAssist { .. } => "code_assist",
        }
    }

    /// The positional argument list, in catalog order.
    pub fn params(&self) -> Vec<Value> {
        match self {
            Command::GetAllResources
            | Command::Undo
            | Command::Redo
            | Command::UndoHistory
            | Command::RedoHistory => vec![],
            Command::GetChildren { path } => vec![Value::from(path.as_str())],
            Command::Rename {
                new_name,
                path,
                offset,
            } => {
                let mut params = vec![Value::from(new_name.as_str()), Value::from(path.as_str())];
                if let Some(offset) = offset {
                    params.push(Value::from(*offset));
                }
                params
            }
            Command::ExtractMethod {
                name,
                path,
                begin,
                end,
            }
            | Command::ExtractVariable {
                name,
                path,
                begin,
                end,
            } => vec![
                Value::from(name.as_str()),
                Value::from(path.as_str()),
                Value::from(*begin),
                Value::from(*end),
            ],
            Command::CodeAssist {
                source,
                position,
                path,
            } => vec![
                Value::from(source.as_str()),
                Value::from(*position),
                Value::from(path.as_str()),
            ],
        }
    }

    /// Whether a successful dispatch may have changed files on disk.
    ///
    /// Mutating commands trigger buffer reconciliation; queries never
    /// do.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Undo
                | Command::Redo
                | Command::Rename { .. }
                | Command::ExtractMethod { .. }
                | Command::ExtractVariable { .. }
        )
    }

    /// The file this command primarily targets, when it has one.
    ///
    /// Undo and redo may touch arbitrarily many files the client
    /// cannot name, so they have no primary target.
    pub fn primary_target(&self) -> Option<&str> {
        match self {
            Command::Rename { path, .. }
            | Command::ExtractMethod { path, .. }
            | Command::ExtractVariable { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names_match_catalog() {
        assert_eq!(Command::GetAllResources.method(), "get_all_resources");
        assert_eq!(Command::Undo.method(), "undo");
        assert_eq!(Command::RedoHistory.method(), "redo_history");
        assert_eq!(
            Command::CodeAssist {
                source: String::new(),
                position: 0,
                path: "/proj/a.py".into(),
            }
            .method(),
            "code_assist"
        );
    }

    #[test]
    fn test_rename_without_offset_has_two_params() {
        let cmd = Command::Rename {
            new_name: "foo".into(),
            path: "/proj/a.py".into(),
            offset: None,
        };
        let params = cmd.params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], Value::from("foo"));
        assert_eq!(params[1], Value::from("/proj/a.py"));
    }

    #[test]
    fn test_rename_with_offset_has_three_params() {
        let cmd = Command::Rename {
            new_name: "foo".into(),
            path: "/proj/a.py".into(),
            offset: Some(120),
        };
        let params = cmd.params();
        assert_eq!(params.len(), 3);
        assert_eq!(params[2], Value::from(120u64));
    }

    #[test]
    fn test_extract_params_order() {
        let cmd = Command::ExtractMethod {
            name: "helper".into(),
            path: "/proj/a.py".into(),
            begin: 10,
            end: 40,
        };
        assert_eq!(
            cmd.params(),
            vec![
                Value::from("helper"),
                Value::from("/proj/a.py"),
                Value::from(10u64),
                Value::from(40u64),
            ]
        );
    }

    #[test]
    fn test_code_assist_params_order() {
        let cmd = Command::CodeAssist {
            source: "import os\n".into(),
            position: 9,
            path: "/proj/a.py".into(),
        };
        let params = cmd.params();
        assert_eq!(params[0], Value::from("import os\n"));
        assert_eq!(params[1], Value::from(9u64));
        assert_eq!(params[2], Value::from("/proj/a.py"));
    }

    #[test]
    fn test_mutating_flags() {
        assert!(Command::Undo.is_mutating());
        assert!(Command::Redo.is_mutating());
        assert!(Command::Rename {
            new_name: "x".into(),
            path: "/p".into(),
            offset: None,
        }
        .is_mutating());
        assert!(!Command::GetAllResources.is_mutating());
        assert!(!Command::UndoHistory.is_mutating());
        assert!(!Command::CodeAssist {
            source: String::new(),
            position: 0,
            path: "/p".into(),
        }
        .is_mutating());
    }

    #[test]
    fn test_primary_targets() {
        let rename = Command::Rename {
            new_name: "x".into(),
            path: "/proj/a.py".into(),
            offset: Some(3),
        };
        assert_eq!(rename.primary_target(), Some("/proj/a.py"));
        assert_eq!(Command::Undo.primary_target(), None);
        assert_eq!(Command::GetAllResources.primary_target(), None);
    }
}
