//! Service lifecycle: starting, running, terminated.
//!
//! ```text
//! STARTING ──(probe spawned + listener bound)──▶ RUNNING ──(probe stdout closed)──▶ TERMINATED
//!                                                   │
//!                                                   └──(shutdown signal)──────────▶ TERMINATED
//! ```

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Settings;
use crate::data::{FilterPolicy, SensorResolver, SensorTable};
use crate::error::ServiceError;
use crate::report::{Renderer, ReportServer};
use crate::source::{IngestLoop, MeasurementProcess};

/// Lifecycle phase, used in log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Running,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Starting => "starting",
            Phase::Running => "running",
            Phase::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Why a running service stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The shutdown future completed.
    Shutdown,
}

/// Startup entry point.
#[derive(Debug)]
pub struct Service;

impl Service {
    /// Spawn the probe and bind the report listener concurrently.
    ///
    /// Both must succeed before the service can run.
    pub async fn start(settings: &Settings) -> Result<RunningService, ServiceError> {
        info!(phase = %Phase::Starting, "tempd starting");

        let table = SensorTable::new(settings.flow.history_size);
        let renderer = Renderer::from_settings(table.clone(), settings);
        let addr = settings.listen.addr();

        let (mut process, server) = tokio::try_join!(
            async { MeasurementProcess::spawn(&settings.process) },
            ReportServer::bind(&addr, renderer, settings.listen.write_timeout()),
        )?;

        let stdout = process.take_stdout().ok_or(ServiceError::MissingStdout)?;
        let local_addr = server
            .local_addr()
            .map_err(|source| ServiceError::Bind { addr, source })?;
        info!(addr = %local_addr, "report listener bound");

        let resolver = SensorResolver::from_config(&settings.sensors, settings.default_name.as_deref());
        let ingest = IngestLoop::new(
            table.clone(),
            Arc::new(resolver),
            FilterPolicy::from_config(&settings.filter),
        );

        Ok(RunningService {
            process,
            stdout,
            server,
            ingest,
            table,
            local_addr,
        })
    }
}

/// A started service, ready to ingest and serve reports.
#[derive(Debug)]
pub struct RunningService {
    process: MeasurementProcess,
    stdout: tokio::process::ChildStdout,
    server: ReportServer,
    ingest: IngestLoop,
    table: SensorTable,
    local_addr: SocketAddr,
}

impl RunningService {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn table(&self) -> &SensorTable {
        &self.table
    }

    /// Ingest until the probe dies or `shutdown` completes.
    ///
    /// Probe death is returned as [`ServiceError::ProcessDied`]. Either way
    /// the listener is stopped and the probe reaped before returning.
    pub async fn run<F>(self, shutdown: F) -> Result<Termination, ServiceError>
    where
        F: Future<Output = ()>,
    {
        let RunningService {
            process,
            stdout,
            server,
            ingest,
            ..
        } = self;

        info!(phase = %Phase::Running, pid = process.id(), "tempd running");
        let server_task = tokio::spawn(server.serve());

        let result = tokio::select! {
            ingested = ingest.run(stdout) => match ingested {
                Ok(summary) => {
                    error!(?summary, "measurement process has died, exiting");
                    Err(ServiceError::ProcessDied)
                }
                Err(e) => {
                    error!(error = %e, "measurement stream failed, exiting");
                    Err(e)
                }
            },
            () = shutdown => {
                info!("shutdown requested");
                Ok(Termination::Shutdown)
            }
        };

        server_task.abort();
        process.shutdown().await;
        info!(phase = %Phase::Terminated, "tempd terminated");

        result
    }
}
