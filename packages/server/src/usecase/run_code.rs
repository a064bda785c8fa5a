//! UseCase: コードの実行（リモート実行サービスへの転送）
//!
//! 実行サービスの失敗はエラーとして返さず、`exit_code = 1` と `error` を持つ
//! 結果に変換する。

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{CodeRunner, CodeRunnerError, ExecutionOutput, ExecutionRequest};

/// 実行結果（失敗時は `error` が設定される）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunCodeOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<ExecutionOutput> for RunCodeOutcome {
    fn from(output: ExecutionOutput) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
            error: None,
        }
    }
}

impl From<CodeRunnerError> for RunCodeOutcome {
    fn from(error: CodeRunnerError) -> Self {
        let stderr = match &error {
            CodeRunnerError::Timeout => "Code execution timed out".to_string(),
            CodeRunnerError::Status(status) => format!("Piston API error: {}", status),
            CodeRunnerError::Transport(message) => format!("Execution error: {}", message),
        };
        Self {
            stdout: String::new(),
            stderr,
            exit_code: 1,
            error: Some(error.to_string()),
        }
    }
}

pub struct RunCodeUseCase {
    runner: Arc<dyn CodeRunner>,
}

impl RunCodeUseCase {
    pub fn new(runner: Arc<dyn CodeRunner>) -> Self {
        Self { runner }
    }

    pub async fn execute(&self, request: ExecutionRequest) -> RunCodeOutcome {
        tracing::info!(
            "Code execution request - Language: {}, Code length: {} chars",
            request.language,
            request.code.len()
        );

        match self.runner.execute(request).await {
            Ok(output) => {
                tracing::info!("Code execution completed - exit_code: {}", output.exit_code);
                output.into()
            }
            Err(e) => {
                tracing::error!("Error executing code: {}", e);
                e.into()
            }
        }
    }
}
