//! CodeRunner trait 定義（リモート実行サービスの協調者）

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::CodeRunnerError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExecutionRequest {
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub stdin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutput, CodeRunnerError>;
}
