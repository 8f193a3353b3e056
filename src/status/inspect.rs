//! Parser for `docker inspect` output captured on a remote host.
//!
//! The runtime sometimes prints warnings ahead of the JSON document, and the
//! container may be gone entirely. Anything that is not a well-formed
//! inspection payload collapses into a fixed "Stopped" record instead of an
//! error: a removed container is a normal answer, not a failure.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::status::severity::Severity;

/// Normalized view of one container, as reported by one server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub host: String,
    /// Creation timestamp exactly as the runtime reported it.
    pub created: Option<String>,
    /// Short phase string ("running", "exited", ...), or "Stopped" when the
    /// runtime had nothing to say about the container.
    pub status: String,
    pub severity: Severity,
    /// Deduplicated `KEY=VALUE` entries, first-seen key order.
    pub env: Vec<String>,
    pub restart_count: Option<u32>,
    pub restart_severity: Option<Severity>,
    /// `"<port>/<proto> => <host port>"` for every port bound on the host.
    pub published_ports: Vec<String>,
    /// Ports declared by the image but not bound anywhere.
    pub exposed_ports: Vec<String>,
}

impl ContainerStatus {
    /// Fixed record for a container the runtime no longer knows about.
    pub fn stopped(host: &str) -> Self {
        Self {
            host: host.to_string(),
            created: None,
            status: "Stopped".to_string(),
            severity: Severity::Critical,
            env: Vec::new(),
            restart_count: None,
            restart_severity: None,
            published_ports: Vec::new(),
            exposed_ports: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectDocument {
    created: Option<String>,
    state: Option<InspectState>,
    restart_count: Option<u32>,
    network_settings: Option<NetworkSettings>,
    config: Option<InspectConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectState {
    status: Option<String>,
    #[serde(default)]
    running: bool,
    #[serde(default)]
    restarting: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct NetworkSettings {
    // Binding entries are left untyped: a port maps to null, to an empty
    // list, or to a list of objects, and none of those shapes may take the
    // whole record down.
    ports: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    env: Option<Vec<String>>,
}

/// Turn raw inspection output into a [`ContainerStatus`].
///
/// The payload is everything from the first `{` onward; whatever precedes it
/// (runtime warnings, ssh banners) is skipped. A payload that cannot be
/// decoded, or that has no `State` section, yields the stopped record for
/// `host` — never a partial one.
pub fn parse_status(host: &str, raw: &str) -> ContainerStatus {
    let Some(start) = raw.find('{') else {
        log::debug!("no inspection payload from {host}, reporting the container as stopped");
        return ContainerStatus::stopped(host);
    };

    let document: InspectDocument = match serde_json::from_str(raw[start..].trim()) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("unreadable inspection payload from {host}: {e}");
            return ContainerStatus::stopped(host);
        }
    };

    let Some(state) = document.state else {
        log::debug!("inspection payload from {host} has no state section");
        return ContainerStatus::stopped(host);
    };

    let (published_ports, exposed_ports) = document
        .network_settings
        .and_then(|settings| settings.ports)
        .map(|ports| classify_ports(&ports))
        .unwrap_or_default();

    let env = document
        .config
        .and_then(|config| config.env)
        .map(|entries| dedup_env(&entries))
        .unwrap_or_default();

    ContainerStatus {
        host: host.to_string(),
        created: document.created,
        status: state.status.clone().unwrap_or_else(|| "unknown".to_string()),
        severity: state_severity(&state),
        env,
        restart_count: document.restart_count,
        restart_severity: document.restart_count.map(restart_severity),
        published_ports,
        exposed_ports,
    }
}

fn state_severity(state: &InspectState) -> Severity {
    // A restarting container is transitioning, not simply down, so the
    // restarting flag outranks the running flag.
    if state.restarting {
        Severity::Warning
    } else if !state.running {
        Severity::Critical
    } else {
        Severity::Normal
    }
}

fn restart_severity(count: u32) -> Severity {
    match count {
        0 => Severity::Normal,
        1..=2 => Severity::Warning,
        _ => Severity::Critical,
    }
}

/// Split declared ports into published (`"<port> => <host port>"`) and
/// exposed listings, preserving document order. Only the first binding of a
/// port is displayed.
fn classify_ports(ports: &Map<String, Value>) -> (Vec<String>, Vec<String>) {
    let mut published = Vec::new();
    let mut exposed = Vec::new();
    for (port, bindings) in ports {
        match first_host_port(bindings) {
            Some(host_port) => published.push(format!("{port} => {host_port}")),
            None => exposed.push(port.clone()),
        }
    }
    (published, exposed)
}

fn first_host_port(bindings: &Value) -> Option<String> {
    match bindings.as_array()?.first()?.get("HostPort")? {
        Value::String(port) => Some(port.clone()),
        Value::Number(port) => Some(port.to_string()),
        _ => None,
    }
}

/// Deduplicate `KEY=VALUE` entries by key: the last value wins, the key
/// keeps its first-seen position.
fn dedup_env(entries: &[String]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut values: HashMap<String, String> = HashMap::new();
    for entry in entries {
        let key = entry.split_once('=').map_or(entry.as_str(), |(key, _)| key);
        if values.insert(key.to_string(), entry.clone()).is_none() {
            order.push(key.to_string());
        }
    }
    order.iter().map(|key| values[key].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    const HOST: &str = "10.10.0.2";

    const RUNNING: &str = r#"{
        "Created": "2024-11-02T09:30:00.000000000Z",
        "RestartCount": 0,
        "State": {"Status": "running", "Running": true, "Restarting": false},
        "NetworkSettings": {"Ports": {
            "80/tcp": [{"HostIp": "0.0.0.0", "HostPort": "8080"}],
            "443/tcp": null
        }},
        "Config": {"Env": ["PORT=80", "NODE_ENV=production"]}
    }"#;

    #[test]
    fn parses_a_running_container() {
        let status = parse_status(HOST, RUNNING);
        assert_eq!(status.host, HOST);
        assert_eq!(status.created.as_deref(), Some("2024-11-02T09:30:00.000000000Z"));
        assert_eq!(status.status, "running");
        assert_eq!(status.severity, Severity::Normal);
        assert_eq!(status.env, vec!["PORT=80", "NODE_ENV=production"]);
        assert_eq!(status.restart_count, Some(0));
        assert_eq!(status.restart_severity, Some(Severity::Normal));
        assert_eq!(status.published_ports, vec!["80/tcp => 8080"]);
        assert_eq!(status.exposed_ports, vec!["443/tcp"]);
    }

    #[test]
    fn warnings_before_the_payload_are_skipped() {
        let noisy = format!(
            "WARNING: No swap limit support\nWARNING: bridge-nf-call-iptables is disabled\n{RUNNING}"
        );
        assert_eq!(parse_status(HOST, &noisy), parse_status(HOST, RUNNING));
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let padded = format!("  \n{RUNNING}\n\n  ");
        assert_eq!(parse_status(HOST, &padded), parse_status(HOST, RUNNING));
    }

    #[test]
    fn missing_payload_degenerates_to_stopped() {
        let status = parse_status(HOST, "Error: No such object: myapp\n");
        assert_eq!(status, ContainerStatus::stopped(HOST));
        assert_eq!(status.status, "Stopped");
        assert_eq!(status.severity, Severity::Critical);
    }

    #[test]
    fn unreadable_payload_degenerates_to_stopped() {
        let status = parse_status(HOST, "{\"State\": {\"Running\": tru");
        assert_eq!(status, ContainerStatus::stopped(HOST));
    }

    #[test]
    fn payload_without_state_degenerates_to_stopped() {
        let status = parse_status(HOST, r#"{"Created": "yesterday", "RestartCount": 4}"#);
        assert_eq!(status, ContainerStatus::stopped(HOST));
        assert_eq!(status.restart_count, None);
    }

    #[test]
    fn restarting_outranks_not_running() {
        let raw = r#"{"State": {"Status": "restarting", "Running": false, "Restarting": true}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.status, "restarting");
        assert_eq!(status.severity, Severity::Warning);
    }

    #[test]
    fn exited_container_is_critical() {
        let raw = r#"{"State": {"Status": "exited", "Running": false, "Restarting": false}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.status, "exited");
        assert_eq!(status.severity, Severity::Critical);
    }

    #[test]
    fn state_without_a_status_string_reads_unknown() {
        let raw = r#"{"State": {"Running": true}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.status, "unknown");
        assert_eq!(status.severity, Severity::Normal);
    }

    #[test]
    fn restart_ladder_has_three_tiers() {
        for (count, expected) in [
            (0, Severity::Normal),
            (1, Severity::Warning),
            (2, Severity::Warning),
            (3, Severity::Critical),
            (12, Severity::Critical),
        ] {
            let raw = format!(r#"{{"RestartCount": {count}, "State": {{"Running": true}}}}"#);
            let status = parse_status(HOST, &raw);
            assert_eq!(status.restart_count, Some(count));
            assert_eq!(status.restart_severity, Some(expected), "count {count}");
        }
    }

    #[test]
    fn absent_restart_count_stays_absent() {
        let status = parse_status(HOST, r#"{"State": {"Running": true}}"#);
        assert_eq!(status.restart_count, None);
        assert_eq!(status.restart_severity, None);
    }

    #[test]
    fn env_keeps_last_value_at_first_position() {
        let raw = r#"{"State": {"Running": true}, "Config": {"Env": ["A=1", "B=2", "A=3"]}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.env, vec!["A=3", "B=2"]);
    }

    #[test]
    fn env_splits_on_the_first_equals_only() {
        let raw = r#"{"State": {"Running": true}, "Config": {"Env": ["URL=http://x?a=b", "URL=http://y?c=d"]}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.env, vec!["URL=http://y?c=d"]);
    }

    #[test]
    fn only_the_first_binding_of_a_port_is_shown() {
        let raw = r#"{"State": {"Running": true}, "NetworkSettings": {"Ports": {
            "80/tcp": [{"HostPort": "8080"}, {"HostPort": "9090"}]
        }}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.published_ports, vec!["80/tcp => 8080"]);
        assert!(status.exposed_ports.is_empty());
    }

    #[test]
    fn unusable_bindings_count_as_exposed() {
        let raw = r#"{"State": {"Running": true}, "NetworkSettings": {"Ports": {
            "3000/tcp": [],
            "4000/tcp": [{"HostIp": "0.0.0.0"}],
            "5000/udp": null
        }}}"#;
        let status = parse_status(HOST, raw);
        assert!(status.published_ports.is_empty());
        assert_eq!(status.exposed_ports, vec!["3000/tcp", "4000/tcp", "5000/udp"]);
    }

    #[test]
    fn port_listings_follow_document_order() {
        let raw = r#"{"State": {"Running": true}, "NetworkSettings": {"Ports": {
            "9000/tcp": [{"HostPort": "1"}],
            "80/tcp": [{"HostPort": "2"}],
            "443/tcp": [{"HostPort": "3"}]
        }}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(
            status.published_ports,
            vec!["9000/tcp => 1", "80/tcp => 2", "443/tcp => 3"]
        );
    }

    #[test]
    fn numeric_host_ports_are_stringified() {
        let raw = r#"{"State": {"Running": true}, "NetworkSettings": {"Ports": {
            "80/tcp": [{"HostPort": 8080}]
        }}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.published_ports, vec!["80/tcp => 8080"]);
    }

    #[test]
    fn created_passes_through_untouched() {
        let raw = r#"{"Created": "not-even-a-timestamp", "State": {"Running": true}}"#;
        let status = parse_status(HOST, raw);
        assert_eq!(status.created.as_deref(), Some("not-even-a-timestamp"));
    }

    #[quickcheck]
    fn leading_noise_never_changes_the_outcome(noise: String) -> bool {
        let noise: String = noise.chars().filter(|c| *c != '{').collect();
        let raw = format!("{noise}{RUNNING}");
        parse_status(HOST, &raw) == parse_status(HOST, RUNNING)
    }

    #[quickcheck]
    fn restart_ladder_is_monotonic(count: u32) -> bool {
        count == u32::MAX || restart_severity(count) <= restart_severity(count + 1)
    }
}
