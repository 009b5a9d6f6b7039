//! Engine process lifecycle.
//!
//! Exactly one session exists per [`SessionManager`] at a time:
//! opening a session while one is running closes the prior one first
//! (last-writer-wins). Spawn and termination here are the only
//! OS-level side effects in this crate.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tracing::{info, warn};

/// Lifecycle state of the engine session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Starting,
    Running,
}

/// The client's binding to one running engine process for one project
/// directory.
#[derive(Debug)]
pub struct Session {
    pub host: String,
    pub port: u16,
    project: PathBuf,
    child: Child,
}

impl Session {
    pub fn project(&self) -> &Path {
        &self.project
    }

    pub fn pid(&self) -> u32 {
        self.child.id()
    }
}

/// Owns the lifecycle of the engine process bound to a project
/// directory.
pub struct SessionManager {
    config: EngineConfig,
    state: SessionState,
    session: Option<Session>,
}

impl SessionManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            state: SessionState::Closed,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The currently bound session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Close any existing session, then spawn the engine bound to
    /// `directory`.
    ///
    /// Spawning is fire-and-forget: this returns once the process is
    /// launched, not once the engine is ready to accept requests, so
    /// callers must tolerate transport failures on early requests. On
    /// spawn failure the session remains `Closed`.
    pub fn open(&mut self, directory: &Path) -> Result<()> {
        if self.session.is_some() {
            info!("closing previous engine session before reopening");
            self.close();
        }
        self.state = SessionState::Starting;

        let (program, leading_args) = match self.config.server_program.split() {
            Some(split) => split,
            None => {
                self.state = SessionState::Closed;
                return Err(EngineError::Config {
                    message: "server_program is an empty argument list".to_string(),
                });
            }
        };

        let mut cmd = Command::new(program);
        cmd.args(leading_args);
        cmd.arg("-V").arg(directory);
        // The spawn is scoped to the project only through the -V
        // argument; the working directory is the user's home.
        cmd.current_dir(dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")));
        cmd.stdin(Stdio::null());

        if let Some(ref log_file) = self.config.log_file {
            if let Some(parent) = log_file.parent() {
                fs::create_dir_all(parent).ok();
            }
            let log = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .map_err(|e| EngineError::Io {
                    message: "open engine log file".to_string(),
                    path: Some(log_file.clone()),
                    source: Some(e),
                })?;
            let stderr_log = log.try_clone().map_err(|e| EngineError::Io {
                message: "clone engine log file handle".to_string(),
                path: Some(log_file.clone()),
                source: Some(e),
            })?;
            cmd.stdout(Stdio::from(log));
            cmd.stderr(Stdio::from(stderr_log));
        } else {
            cmd.stdout(Stdio::null());
            cmd.stderr(Stdio::null());
        }

        match cmd.spawn() {
            Ok(child) => {
                info!(
                    "launched engine (pid {}) for {}",
                    child.id(),
                    directory.display()
                );
                self.session = Some(Session {
                    host: self.config.host.clone(),
                    port: self.config.port,
                    project: directory.to_path_buf(),
                    child,
                });
                self.state = SessionState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Closed;
                Err(EngineError::Spawn {
                    program: self.config.server_program.display(),
                    message: e.to_string(),
                    source: Some(e),
                })
            }
        }
    }

    /// Terminate the engine process and transition to `Closed`.
    /// No-op when already closed.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            info!("terminating engine (pid {})", session.pid());
            if let Err(e) = session.child.kill() {
                warn!("failed to kill engine process: {}", e);
            }
            // Reap so the child doesn't linger as a zombie.
            let _ = session.child.wait();
        }
        self.state = SessionState::Closed;
    }

    /// True iff a process handle is registered and believed alive.
    ///
    /// A child that exited on its own is reaped here and the state
    /// falls back to `Closed`.
    pub fn is_running(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) => match session.child.try_wait() {
                Ok(None) => true,
                Ok(Some(status)) => {
                    warn!("engine process exited on its own: {}", status);
                    self.session = None;
                    self.state = SessionState::Closed;
                    false
                }
                Err(e) => {
                    warn!("could not poll engine process: {}", e);
                    true
                }
            },
            None => false,
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::ProgramSpec;
    use tempfile::TempDir;

    /// `kill -0` liveness probe. Closed sessions are reaped
    /// synchronously, so a terminated child's pid reports dead
    /// immediately.
    fn pid_alive(pid: u32) -> bool {
        std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn sleeper_config() -> EngineConfig {
        EngineConfig {
            server_program: ProgramSpec::Argv(vec![
                "sh".to_string(),
                "-c".to_string(),
                "sleep 30".to_string(),
            ]),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_transitions_to_running() {
        let project = TempDir::new().unwrap();
        let mut manager = SessionManager::new(sleeper_config());

        assert_eq!(manager.state(), SessionState::Closed);
        manager.open(project.path()).unwrap();
        assert_eq!(manager.state(), SessionState::Running);
        assert!(manager.is_running());
        assert_eq!(manager.session().unwrap().project(), project.path());

        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_close_is_a_noop_when_closed() {
        let mut manager = SessionManager::new(sleeper_config());
        manager.close();
        manager.close();
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn test_reopen_replaces_the_session() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let mut manager = SessionManager::new(sleeper_config());

        manager.open(first.path()).unwrap();
        let first_pid = manager.session().unwrap().pid();
        assert!(pid_alive(first_pid));

        manager.open(second.path()).unwrap();
        let session = manager.session().unwrap();
        assert_ne!(session.pid(), first_pid);
        assert_eq!(session.project(), second.path());
        assert!(manager.is_running());
        // Reopening must have terminated the first engine, not
        // orphaned it.
        assert!(!pid_alive(first_pid));

        manager.close();
    }

    #[test]
    fn test_spawn_failure_leaves_state_closed() {
        let project = TempDir::new().unwrap();
        let config = EngineConfig {
            server_program: ProgramSpec::Exec("refract-no-such-binary".to_string()),
            ..Default::default()
        };
        let mut manager = SessionManager::new(config);

        let err = manager.open(project.path()).unwrap_err();
        match err {
            EngineError::Spawn { program, .. } => {
                assert_eq!(program, "refract-no-such-binary");
            }
            other => panic!("expected Spawn, got: {other:?}"),
        }
        assert_eq!(manager.state(), SessionState::Closed);
        assert!(!manager.is_running());
    }

    #[test]
    fn test_empty_argv_is_a_config_error() {
        let project = TempDir::new().unwrap();
        let config = EngineConfig {
            server_program: ProgramSpec::Argv(vec![]),
            ..Default::default()
        };
        let mut manager = SessionManager::new(config);

        assert!(matches!(
            manager.open(project.path()),
            Err(EngineError::Config { .. })
        ));
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn test_exited_child_is_detected_and_reaped() {
        let project = TempDir::new().unwrap();
        let config = EngineConfig {
            server_program: ProgramSpec::Argv(vec![
                "sh".to_string(),
                "-c".to_string(),
                "exit 0".to_string(),
            ]),
            ..Default::default()
        };
        let mut manager = SessionManager::new(config);

        // Fire-and-forget: open succeeds even though the child exits
        // immediately.
        manager.open(project.path()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(200));

        assert!(!manager.is_running());
        assert_eq!(manager.state(), SessionState::Closed);
    }

    #[test]
    fn test_engine_output_goes_to_log_file() {
        let project = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let log_file = scratch.path().join("engine.log");
        let config = EngineConfig {
            server_program: ProgramSpec::Argv(vec![
                "sh".to_string(),
                "-c".to_string(),
                "echo engine-says-hello".to_string(),
            ]),
            log_file: Some(log_file.clone()),
            ..Default::default()
        };
        let mut manager = SessionManager::new(config);

        manager.open(project.path()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(200));
        manager.close();

        let contents = std::fs::read_to_string(&log_file).unwrap();
        assert!(contents.contains("engine-says-hello"));
    }
}
