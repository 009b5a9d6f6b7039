//! The engine façade: session lifecycle plus typed operations.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::rpc::RpcClient;
use crate::session::{SessionManager, SessionState};
use crate::sync::{BufferSync, NoopSync};
use refract_protocol::{Command, CompletionProposal, HistoryEntry, Resource};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One editor's binding to a remote refactoring engine.
///
/// Owns the engine process (via [`SessionManager`]), the transport,
/// and the buffer synchronizer. All operations go through
/// [`Engine::dispatch`], which enforces the session precondition and
/// the post-dispatch sync hook.
///
/// # Example
///
/// ```rust,ignore
/// use refract_client::{Engine, EngineConfig};
///
/// #[tokio::main]
/// async fn main() -> refract_client::Result<()> {
///     let mut engine = Engine::new(EngineConfig::default());
///     engine.open("/proj")?;
///
///     engine.rename("walk_tree", "/proj/a.py", Some(120)).await?;
///     for entry in engine.undo_history().await? {
///         println!("{}: {}", entry.index, entry.description);
///     }
///
///     engine.close();
///     Ok(())
/// }
/// ```
pub struct Engine {
    config: EngineConfig,
    session: SessionManager,
    rpc: RpcClient,
    sync: Arc<dyn BufferSync>,
}

impl Engine {
    /// Create an engine binding with no buffer synchronizer.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_buffer_sync(config, Arc::new(NoopSync))
    }

    /// Create an engine binding with an editor-supplied synchronizer.
    pub fn with_buffer_sync(config: EngineConfig, sync: Arc<dyn BufferSync>) -> Self {
        let rpc = RpcClient::new(config.base_url(), config.request_timeout());
        let session = SessionManager::new(config.clone());
        Self {
            config,
            session,
            rpc,
            sync,
        }
    }

    /// Spawn the engine for `directory`, closing any prior session
    /// first. Returns once the process is launched; the engine may
    /// not yet accept requests.
    pub fn open(&mut self, directory: impl AsRef<Path>) -> Result<()> {
        self.session.open(directory.as_ref())
    }

    /// Terminate the engine process. No-op when already closed. This
    /// is also the only cancellation primitive: a stuck request is
    /// abandoned by closing and reopening the session.
    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn is_running(&mut self) -> bool {
        self.session.is_running()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Issue one command against the current session and return the
    /// decoded result unchanged.
    ///
    /// Fails fast with [`EngineError::NotRunning`] before touching the
    /// transport when no session is running. Exactly one request goes
    /// out per call (no retry: refactorings are not idempotent). On a
    /// successful mutating command the buffer synchronizer runs once,
    /// gated by the `auto_revert` flag; queries never trigger it.
    pub async fn dispatch(&mut self, command: &Command) -> Result<Value> {
        let method = command.method();
        if !self.session.is_running() {
            return Err(EngineError::NotRunning {
                method: method.to_string(),
            });
        }

        let result = self.rpc.call(method, command.params()).await?;

        if command.is_mutating() {
            self.maybe_sync(command).await;
        }
        Ok(result)
    }

    /// Decode a result value, attaching the originating method name
    /// so decode failures stay correlatable with the command that
    /// produced them.
    fn decode<T: DeserializeOwned>(method: &str, result: Value) -> Result<T> {
        serde_json::from_value(result).map_err(|e| EngineError::Decode {
            method: method.to_string(),
            source: e,
        })
    }

    async fn maybe_sync(&self, command: &Command) {
        if !self.config.auto_revert {
            return;
        }
        let affected: Vec<PathBuf> = command
            .primary_target()
            .map(PathBuf::from)
            .into_iter()
            .collect();
        debug!("reconciling buffers after {}", command.method());
        self.sync.reload(&affected).await;
    }

    /// Fetch the full resource tree rooted at the project directory.
    pub async fn get_all_resources(&mut self) -> Result<Vec<Resource>> {
        let command = Command::GetAllResources;
        let result = self.dispatch(&command).await?;
        Self::decode(command.method(), result)
    }

    /// Fetch the direct children of one directory resource.
    pub async fn get_children(&mut self, path: impl Into<String>) -> Result<Vec<Resource>> {
        let command = Command::GetChildren { path: path.into() };
        let result = self.dispatch(&command).await?;
        Self::decode(command.method(), result)
    }

    /// Undo the most recent change on the engine's stack.
    pub async fn undo(&mut self) -> Result<()> {
        self.dispatch(&Command::Undo).await?;
        Ok(())
    }

    /// Redo the most recently undone change.
    pub async fn redo(&mut self) -> Result<()> {
        self.dispatch(&Command::Redo).await?;
        Ok(())
    }

    /// Fetch the undo stack, most recent first.
    ///
    /// The engine is the sole source of truth for history: the stack
    /// is re-fetched on every call and indices are derived from
    /// response order, never cached.
    pub async fn undo_history(&mut self) -> Result<Vec<HistoryEntry>> {
        let command = Command::UndoHistory;
        let result = self.dispatch(&command).await?;
        HistoryEntry::stack_from_result(result).map_err(|e| EngineError::Decode {
            method: command.method().to_string(),
            source: e,
        })
    }

    /// Fetch the redo stack, most recent first.
    pub async fn redo_history(&mut self) -> Result<Vec<HistoryEntry>> {
        let command = Command::RedoHistory;
        let result = self.dispatch(&command).await?;
        HistoryEntry::stack_from_result(result).map_err(|e| EngineError::Decode {
            method: command.method().to_string(),
            source: e,
        })
    }

    /// Rename a target within the project.
    ///
    /// With `offset` present the target is the identifier at that
    /// offset within `path` (a character offset from the start of the
    /// file, the same convention as [`Engine::code_assist`]); the call
    /// dispatches three positional arguments. Without it the target is
    /// the file/module itself and the call dispatches two. Callers
    /// renaming the file they are currently editing must update their
    /// own file identity (close the old handle, open the new) after
    /// success — that is editor glue layered above this crate.
    pub async fn rename(
        &mut self,
        new_name: impl Into<String>,
        path: impl Into<String>,
        offset: Option<u64>,
    ) -> Result<()> {
        self.dispatch(&Command::Rename {
            new_name: new_name.into(),
            path: path.into(),
            offset,
        })
        .await?;
        Ok(())
    }

    /// Extract the `begin..end` region of `path` into a new method.
    pub async fn extract_method(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        begin: u64,
        end: u64,
    ) -> Result<()> {
        self.dispatch(&Command::ExtractMethod {
            name: name.into(),
            path: path.into(),
            begin,
            end,
        })
        .await?;
        Ok(())
    }

    /// Extract the `begin..end` region of `path` into a new variable.
    pub async fn extract_variable(
        &mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        begin: u64,
        end: u64,
    ) -> Result<()> {
        self.dispatch(&Command::ExtractVariable {
            name: name.into(),
            path: path.into(),
            begin,
            end,
        })
        .await?;
        Ok(())
    }

    /// Request completion proposals at `position` (character offset)
    /// within `path`, given the full buffer text, which may be
    /// unsaved.
    pub async fn code_assist(
        &mut self,
        source: impl Into<String>,
        position: u64,
        path: impl Into<String>,
    ) -> Result<Vec<CompletionProposal>> {
        let command = Command::CodeAssist {
            source: source.into(),
            position,
            path: path.into(),
        };
        let result = self.dispatch(&command).await?;
        Self::decode(command.method(), result)
    }
}
