//! TCP server answering each connection with one report.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use super::render::Renderer;
use crate::error::{ReportError, ServiceError};

/// Accepts collector connections and writes a full report to each.
///
/// No request is read: connecting is the request. The report is taken
/// (and the windows reset) as soon as the connection is accepted, then
/// written in a task of its own so a slow peer holds up nothing else.
#[derive(Debug)]
pub struct ReportServer {
    listener: TcpListener,
    renderer: Arc<Renderer>,
    write_timeout: Duration,
}

impl ReportServer {
    /// Bind the listener on `addr` (e.g. "127.0.0.1:31338").
    pub async fn bind(
        addr: &str,
        renderer: Renderer,
        write_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServiceError::Bind {
                addr: addr.to_string(),
                source,
            })?;

        Ok(Self {
            listener,
            renderer: Arc::new(renderer),
            write_timeout,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until the task is aborted.
    ///
    /// Accept errors are logged and the loop carries on.
    pub async fn serve(self) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!(error = %e, "failed to accept report connection");
                    continue;
                }
            };

            let report = self.renderer.take_report();
            let sensors = report.len();
            let body = report.to_text();
            let write_timeout = self.write_timeout;

            tokio::spawn(async move {
                match send_report(stream, body.as_bytes(), write_timeout).await {
                    Ok(()) => info!(%peer, sensors, "served report"),
                    Err(e) => warn!(%peer, error = %e, "report connection failed"),
                }
            });
        }
    }
}

/// Write `body` and close the connection, giving up after `write_timeout`.
async fn send_report<W>(
    mut stream: W,
    body: &[u8],
    write_timeout: Duration,
) -> Result<(), ReportError>
where
    W: AsyncWrite + Unpin,
{
    let write = async {
        stream.write_all(body).await?;
        stream.shutdown().await?;
        Ok::<_, std::io::Error>(())
    };

    match tokio::time::timeout(write_timeout, write).await {
        Ok(result) => {
            result?;
            debug!(bytes = body.len(), "report written");
            Ok(())
        }
        Err(_) => Err(ReportError::Timeout(write_timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FlowEstimator, MedianFilter, SensorTable, Verdict};
    use tokio::io::AsyncReadExt;

    async fn start(table: &SensorTable) -> SocketAddr {
        let renderer = Renderer::new(
            table.clone(),
            MedianFilter::pass_through(),
            FlowEstimator::default(),
        );
        let server = ReportServer::bind("127.0.0.1:0", renderer, Duration::from_secs(1))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.serve());
        addr
    }

    async fn fetch(addr: SocketAddr) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let mut body = String::new();
        stream.read_to_string(&mut body).await.unwrap();
        body
    }

    #[tokio::test]
    async fn each_connection_gets_a_report() {
        let table = SensorTable::new(2);
        table.record("wohnzimmer", Verdict::Accept(21.5));
        let addr = start(&table).await;

        let body = fetch(addr).await;
        assert!(body.starts_with("multigraph sensors_wohnzimmer\nwohnzimmer.value 21.5\n"));
        assert!(body.ends_with("multigraph sensors_flow\nwohnzimmer-flow.value NaN\n"));
    }

    #[tokio::test]
    async fn consecutive_connections_see_fresh_windows() {
        let table = SensorTable::new(2);
        table.record("wohnzimmer", Verdict::Accept(20.0));
        let addr = start(&table).await;

        let first = fetch(addr).await;
        assert!(first.contains("wohnzimmer.value 20.0\n"));

        let second = fetch(addr).await;
        assert!(second.contains("wohnzimmer.value NaN\n"));

        table.record("wohnzimmer", Verdict::Accept(22.0));
        let third = fetch(addr).await;
        assert!(third.contains("wohnzimmer.value 22.0\n"));
        assert!(third.contains("wohnzimmer-flow.value 24.0\n"));
    }

    #[tokio::test]
    async fn bind_failure_names_the_address() {
        let table = SensorTable::new(2);
        let renderer = Renderer::new(table, MedianFilter::pass_through(), FlowEstimator::default());

        let err = ReportServer::bind("not-an-address", renderer, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Bind { ref addr, .. } if addr == "not-an-address"));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_writer_times_out() {
        let body = vec![b'x'; 4096];
        let (writer, _reader) = tokio::io::duplex(64);

        let err = send_report(writer, &body, Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Timeout(t) if t == Duration::from_secs(5)));

        // the next connection is unaffected
        let (writer, mut reader) = tokio::io::duplex(64);
        let drain = tokio::spawn(async move {
            let mut received = Vec::new();
            reader.read_to_end(&mut received).await.unwrap();
            received
        });
        send_report(writer, &body, Duration::from_secs(5)).await.unwrap();
        assert_eq!(drain.await.unwrap(), body);
    }

    #[tokio::test]
    async fn idle_peer_does_not_block_the_next_report() {
        let table = SensorTable::new(2);
        table.record("wohnzimmer", Verdict::Accept(20.0));
        let addr = start(&table).await;

        // connected but never reads
        let _idle = TcpStream::connect(addr).await.unwrap();

        table.record("wohnzimmer", Verdict::Accept(21.0));
        let body = fetch(addr).await;
        assert!(body.contains("multigraph sensors_wohnzimmer\n"));
    }

    #[tokio::test]
    async fn dropped_peer_does_not_stop_the_server() {
        let table = SensorTable::new(2);
        table.record("wohnzimmer", Verdict::Accept(20.0));
        let addr = start(&table).await;

        drop(TcpStream::connect(addr).await.unwrap());

        table.record("wohnzimmer", Verdict::Accept(21.0));
        let body = fetch(addr).await;
        assert!(body.contains("multigraph sensors_wohnzimmer\n"));
    }
}
