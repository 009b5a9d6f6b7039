//! Buffer reconciliation after server-side file mutations.

use async_trait::async_trait;
use std::path::PathBuf;

/// Editor-side seam for reconciling in-memory buffers with on-disk
/// content after the engine rewrites files.
///
/// `affected` lists the files the client knows the prior command
/// touched. The dispatcher only knows the command's primary target,
/// so the list is best-effort: the engine may have rewritten files
/// not named here, and undo/redo pass an empty list because their
/// touched set is unknown to the client. An implementation wanting
/// complete coverage can ask the engine for an explicit change-set
/// and reconcile all of it.
#[async_trait]
pub trait BufferSync: Send + Sync {
    /// Reconcile editor buffers with on-disk content, without
    /// prompting the user.
    async fn reload(&self, affected: &[PathBuf]);
}

/// Default synchronizer that leaves buffers alone.
pub struct NoopSync;

#[async_trait]
impl BufferSync for NoopSync {
    async fn reload(&self, _affected: &[PathBuf]) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_noop_sync_is_object_safe() {
        let sync: Arc<dyn BufferSync> = Arc::new(NoopSync);
        sync.reload(&[PathBuf::from("/proj/a.py")]).await;
    }
}
