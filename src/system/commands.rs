use crate::zfs::{ZfsError, ZfsResult};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command as TokioCommand;
use tokio::time;

/// Abstraction for command execution to enable testing without real commands
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, command: &str, args: &[&str]) -> ZfsResult<String>;
    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        timeout_duration: Duration,
    ) -> ZfsResult<String>;
}

/// Real command executor using tokio::process::Command
pub struct RealCommandExecutor;

#[async_trait]
impl CommandExecutor for RealCommandExecutor {
    async fn execute(&self, command: &str, args: &[&str]) -> ZfsResult<String> {
        let output = TokioCommand::new(command)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ZfsError::command_error(command, args, &e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ZfsError::command_error(command, args, stderr.trim()))
        }
    }

    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        timeout_duration: Duration,
    ) -> ZfsResult<String> {
        match time::timeout(timeout_duration, self.execute(command, args)).await {
            Ok(output) => output,
            Err(_) => Err(ZfsError::timeout_error(command, timeout_duration)),
        }
    }
}

/// Command executor that returns canned responses
#[cfg(test)]
#[derive(Default)]
pub struct FakeCommandExecutor {
    responses: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl FakeCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, command: &str, args: &[&str], output: &str) -> Self {
        self.responses
            .insert(Self::key(command, args), output.to_string());
        self
    }

    fn key(command: &str, args: &[&str]) -> String {
        format!("{} {}", command, args.join(" "))
    }
}

#[cfg(test)]
#[async_trait]
impl CommandExecutor for FakeCommandExecutor {
    async fn execute(&self, command: &str, args: &[&str]) -> ZfsResult<String> {
        self.responses
            .get(&Self::key(command, args))
            .cloned()
            .ok_or_else(|| ZfsError::command_error(command, args, "Fake: command not mocked"))
    }

    async fn execute_with_timeout(
        &self,
        command: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> ZfsResult<String> {
        self.execute(command, args).await
    }
}
