//! Process lifecycle: termination signals, fatal panics and graceful drain.
//!
//! [`ServerLifecycle`] owns the server handle. It stops the server once a
//! termination signal arrives or a worker panics, waits for in-flight
//! requests to drain, and reports why it stopped so the binary can pick an
//! exit status.

use std::io;
use std::process::ExitCode;

use actix_web::dev::{Server, ServerHandle};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Why the server stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Ctrl-C or SIGTERM.
    Signal,
    /// A panic or other fatal report.
    Fatal(String),
    /// The server future finished without being asked to stop.
    Exited,
}

impl StopReason {
    /// Status the process should exit with: `1` after a fatal failure.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        match self {
            Self::Fatal(_) => 1,
            Self::Signal | Self::Exited => 0,
        }
    }

    /// [`Self::exit_status`] as a process exit code.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Cloneable handle for reporting a fatal failure to a [`ServerLifecycle`].
#[derive(Debug, Clone)]
pub struct FatalReporter {
    tx: mpsc::UnboundedSender<String>,
}

impl FatalReporter {
    /// Ask the server to drain and stop because of `reason`.
    pub fn report(&self, reason: impl Into<String>) {
        if self.tx.send(reason.into()).is_err() {
            warn!("fatal report after the lifecycle finished");
        }
    }
}

/// Owner of the running server's handle.
pub struct ServerLifecycle {
    handle: ServerHandle,
    fatal_tx: mpsc::UnboundedSender<String>,
    fatal_rx: mpsc::UnboundedReceiver<String>,
}

impl std::fmt::Debug for ServerLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerLifecycle").finish_non_exhaustive()
    }
}

impl ServerLifecycle {
    /// Take charge of `server`'s handle.
    #[must_use]
    pub fn new(server: &Server) -> Self {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();
        Self {
            handle: server.handle(),
            fatal_tx,
            fatal_rx,
        }
    }

    /// Reporter feeding this lifecycle's fatal channel.
    #[must_use]
    pub fn reporter(&self) -> FatalReporter {
        FatalReporter {
            tx: self.fatal_tx.clone(),
        }
    }

    /// Replace the process panic hook with one that logs the panic and
    /// reports it as fatal.
    pub fn install_panic_hook(&self) {
        let reporter = self.reporter();
        std::panic::set_hook(Box::new(move |panic| {
            let message = panic.to_string();
            error!(panic = %message, "worker panicked");
            reporter.report(message);
        }));
    }

    /// Drive `server` until it is asked to stop, then drain it.
    ///
    /// # Errors
    /// Propagates I/O failures from the server and failures joining its
    /// task.
    pub async fn run(mut self, server: Server) -> io::Result<StopReason> {
        let mut task = actix_web::rt::spawn(server);
        let reason = tokio::select! {
            reason = wait_for_stop(&mut self.fatal_rx) => reason,
            joined = &mut task => {
                joined.map_err(io::Error::other)??;
                return Ok(StopReason::Exited);
            }
        };

        match &reason {
            StopReason::Fatal(message) => error!(reason = %message, "stopping after fatal failure"),
            StopReason::Signal => info!("stopping on signal"),
            StopReason::Exited => {}
        }
        self.handle.stop(true).await;
        task.await.map_err(io::Error::other)??;
        info!("server drained");
        Ok(reason)
    }
}

async fn wait_for_stop(fatal_rx: &mut mpsc::UnboundedReceiver<String>) -> StopReason {
    tokio::select! {
        () = ctrl_c() => StopReason::Signal,
        () = terminate() => StopReason::Signal,
        Some(message) = fatal_rx.recv() => StopReason::Fatal(message),
    }
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(err) => {
            warn!(error = %err, "cannot listen for SIGTERM");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::auth::BasicCredentials;
    use crate::inbound::http::state::HttpState;
    use crate::server::{ServerConfig, create_server};
    use crate::settings::Environment;
    use rstest::rstest;

    fn local_server() -> Server {
        let state = HttpState::new(BasicCredentials::new("admin", "password"), Environment::Test);
        create_server(ServerConfig::new(state, "127.0.0.1", 0)).expect("bind loopback")
    }

    #[rstest]
    #[case(StopReason::Signal, 0)]
    #[case(StopReason::Exited, 0)]
    #[case(StopReason::Fatal("boom".to_owned()), 1)]
    fn exit_status_follows_the_stop_reason(#[case] reason: StopReason, #[case] expected: u8) {
        assert_eq!(reason.exit_status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn fatal_reports_drain_the_server() {
        let server = local_server();
        let lifecycle = ServerLifecycle::new(&server);
        lifecycle.reporter().report("worker panicked");

        let reason = lifecycle.run(server).await.expect("server drains");
        assert_eq!(reason, StopReason::Fatal("worker panicked".to_owned()));
    }

    #[rstest]
    #[actix_web::test]
    async fn reporters_outliving_the_lifecycle_do_not_panic() {
        let server = local_server();
        let lifecycle = ServerLifecycle::new(&server);
        let reporter = lifecycle.reporter();
        reporter.report("first");
        lifecycle.run(server).await.expect("server drains");
        reporter.report("late");
    }
}
