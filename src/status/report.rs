//! Builds the status display tree for one server.

use crate::display::DisplayLine;
use crate::status::ServerReport;
use crate::status::inspect::ContainerStatus;
use crate::status::probe::ReachabilityReport;

/// Add the `host: status` section line with the per-container details under
/// it, and hand the section back so further report parts can nest there.
pub fn format_overview<'a>(
    status: &ContainerStatus,
    sink: &'a mut DisplayLine,
) -> &'a mut DisplayLine {
    let section = sink.add_colored_line(
        format!("{}: {}", status.host, status.status),
        status.severity,
    );
    if let Some(created) = &status.created {
        section.add_line(format!("Created: {created}"));
    }
    if let (Some(count), Some(severity)) = (status.restart_count, status.restart_severity) {
        section.add_colored_line(format!("Restarts: {count}"), severity);
    }
    if !status.env.is_empty() {
        let env_section = section.add_line("Environment:");
        for entry in &status.env {
            env_section.add_line(format!("- {entry}"));
        }
    }
    section
}

/// Describe how the app answered on each reachability channel.
///
/// Without a published port there is nothing for the server or a local
/// machine to dial directly (traffic arrives through a proxy), so only the
/// in-container verdict is shown.
pub fn format_availability(
    status: &ContainerStatus,
    reachability: &ReachabilityReport,
    sink: &mut DisplayLine,
) {
    match status.published_ports.first() {
        Some(first) => {
            let host_port = first.split("=>").nth(1).map(str::trim).unwrap_or_default();
            let section = sink.add_line(format!(
                "App running at http://{}:{}",
                status.host, host_port
            ));
            section.add_colored_line(
                format!(
                    "- Available in app's docker container: {}",
                    reachability.in_container.reachable
                ),
                reachability.in_container.severity,
            );
            section.add_colored_line(
                format!("- Available on server: {}", reachability.on_host.reachable),
                reachability.on_host.severity,
            );
            section.add_colored_line(
                format!(
                    "- Available on local computer: {}",
                    reachability.local.reachable
                ),
                reachability.local.severity,
            );
        }
        None => {
            let section = sink.add_line("App available through reverse proxy");
            section.add_colored_line(
                format!(
                    "- Available in app's docker container: {}",
                    reachability.in_container.reachable
                ),
                reachability.in_container.severity,
            );
        }
    }
}

/// List declared ports, exposed first, skipping empty sections.
pub fn format_port_sections(exposed: &[String], published: &[String], sink: &mut DisplayLine) {
    if !exposed.is_empty() {
        let section = sink.add_line("Exposed Ports:");
        for port in exposed {
            section.add_line(format!("- {port}"));
        }
    }
    if !published.is_empty() {
        let section = sink.add_line("Published Ports:");
        for port in published {
            section.add_line(format!("- {port}"));
        }
    }
}

/// Everything known about one server, as one display section.
pub fn format_server_report(report: &ServerReport, sink: &mut DisplayLine) {
    let section = format_overview(&report.status, sink);
    format_availability(&report.status, &report.reachability, section);
    format_port_sections(
        &report.status.exposed_ports,
        &report.status.published_ports,
        section,
    );
}
