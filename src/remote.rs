//! Remote command execution over ssh.

use std::process::Stdio;

use async_trait::async_trait;

use crate::config::ServerEntry;

const SSH_CONNECT_TIMEOUT_SECS: u32 = 10;

/// What a remote command said, once it ran at all.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub host: String,
    pub code: i32,
    /// Combined stderr and stdout, stderr first. Runtimes print warnings on
    /// stderr ahead of the payload, and callers want both in one stream.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

#[derive(Debug, thiserror::Error)]
#[error("ssh to {host} failed: {source}")]
pub struct RemoteError {
    pub host: String,
    #[source]
    pub source: std::io::Error,
}

/// Runs one shell command on one server.
///
/// Exit codes are data, not errors: a command that ran and failed still
/// yields `Ok`. `Err` means the command could not be carried out at all.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, server: &ServerEntry, command: &str) -> Result<CommandOutput, RemoteError>;
}

/// [`CommandRunner`] backed by the system `ssh` binary.
#[derive(Debug, Clone, Default)]
pub struct SshRunner;

impl SshRunner {
    fn ssh_args(server: &ServerEntry, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={SSH_CONNECT_TIMEOUT_SECS}"),
        ];
        if let Some(port) = server.port {
            args.push("-p".to_string());
            args.push(port.to_string());
        }
        if let Some(identity_file) = &server.identity_file {
            args.push("-i".to_string());
            args.push(identity_file.display().to_string());
        }
        match &server.user {
            Some(user) => args.push(format!("{}@{}", user, server.host)),
            None => args.push(server.host.clone()),
        }
        args.push(command.to_string());
        args
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    async fn run(&self, server: &ServerEntry, command: &str) -> Result<CommandOutput, RemoteError> {
        log::debug!("running on {}: {}", server.host, command);
        let result = tokio::process::Command::new("ssh")
            .args(Self::ssh_args(server, command))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| RemoteError {
                host: server.host.clone(),
                source,
            })?;

        let mut output = String::from_utf8_lossy(&result.stderr).into_owned();
        output.push_str(&String::from_utf8_lossy(&result.stdout));
        let code = result.status.code().unwrap_or(-1);
        log::debug!("{} exited {} on {}", command, code, server.host);

        Ok(CommandOutput {
            host: server.host.clone(),
            code,
            output,
        })
    }
}
