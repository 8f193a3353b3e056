//! Status synthesis for one app on one server: inspect the container, probe
//! reachability, and shape the answers into a display section.

pub mod inspect;
pub mod probe;
pub mod report;
pub mod severity;

use crate::config::{AppEntry, ServerEntry};
use crate::remote::{CommandRunner, RemoteError};
use inspect::{ContainerStatus, parse_status};
use probe::{ReachabilityReport, probe_reachability};

/// Everything learned about the app on one server.
#[derive(Debug, Clone)]
pub struct ServerReport {
    pub status: ContainerStatus,
    pub reachability: ReachabilityReport,
}

fn inspect_command(app: &AppEntry) -> String {
    format!("docker inspect {} --format \"{{{{json .}}}}\"", app.name)
}

/// Inspect the app's container on `server`, then probe it on every channel.
///
/// Whatever the inspection prints is fed to the parser as is, whatever its
/// exit code. `Err` means ssh itself failed.
pub async fn check_server(
    runner: &dyn CommandRunner,
    server: &ServerEntry,
    app: &AppEntry,
) -> Result<ServerReport, RemoteError> {
    let inspection = runner.run(server, &inspect_command(app)).await?;
    let status = parse_status(&inspection.host, &inspection.output);
    let reachability = probe_reachability(runner, server, app).await?;
    Ok(ServerReport {
        status,
        reachability,
    })
}
