//! Reachability probes for a deployed app.
//!
//! Every deployment is probed over three channels at once. Two run on the
//! server over ssh (curl inside the app's container and curl against the
//! published port) and one is a plain HTTP request from this machine.

use std::time::Duration;

use crate::config::{AppEntry, ServerEntry};
use crate::remote::{CommandRunner, RemoteError};
use crate::status::severity::Severity;

const LOCAL_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Verdict of a single probe channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStatus {
    pub reachable: bool,
    pub severity: Severity,
}

impl From<bool> for ChannelStatus {
    fn from(reachable: bool) -> Self {
        let severity = if reachable {
            Severity::Normal
        } else {
            Severity::Critical
        };
        Self {
            reachable,
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityReport {
    /// Reached from inside the app's own container.
    pub in_container: ChannelStatus,
    /// Reached from the server the container runs on.
    pub on_host: ChannelStatus,
    /// Reached from the machine running this tool.
    pub local: ChannelStatus,
}

/// Probe the app on `server` over all three channels.
///
/// Unreachable channels are ordinary results. `Err` is reserved for the ssh
/// transport itself going down.
pub async fn probe_reachability(
    runner: &dyn CommandRunner,
    server: &ServerEntry,
    app: &AppEntry,
) -> Result<ReachabilityReport, RemoteError> {
    let in_container_cmd = format!(
        "docker exec {} curl http://localhost:{}",
        app.name, app.image_port
    );
    let on_host_cmd = format!("curl 127.0.0.1:{}", app.port);

    // All three probes run to completion before any verdict is made; a dead
    // channel must not cut the others short.
    let (in_container, on_host, local) = tokio::join!(
        runner.run(server, &in_container_cmd),
        runner.run(server, &on_host_cmd),
        probe_local(server, app),
    );

    let report = ReachabilityReport {
        in_container: in_container?.success().into(),
        on_host: on_host?.success().into(),
        local: local.into(),
    };
    log::debug!(
        "{}: in container {}, on host {}, local {}",
        server.host,
        report.in_container.reachable,
        report.on_host.reachable,
        report.local.reachable
    );
    Ok(report)
}

/// Any HTTP response counts as reachable, matching the curl probes on the
/// other channels.
async fn probe_local(server: &ServerEntry, app: &AppEntry) -> bool {
    let url = format!("http://{}:{}", server.host, app.port);
    match reqwest::Client::new()
        .head(&url)
        .timeout(LOCAL_PROBE_TIMEOUT)
        .send()
        .await
    {
        Ok(_) => true,
        Err(e) => {
            log::debug!("local probe of {url} failed: {e}");
            false
        }
    }
}
