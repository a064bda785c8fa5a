//! Piston 互換 API を使った CodeRunner 実装
//!
//! コアはこの実装に依存しません。`/api/run-code` から呼ばれるだけの薄いプロキシです。

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{CodeRunner, CodeRunnerError, ExecutionOutput, ExecutionRequest};

pub const DEFAULT_PISTON_URL: &str = "https://emkc.org/api/v2/piston/execute";

#[derive(Debug, Serialize)]
struct PistonFile<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct PistonRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<PistonFile<'a>>,
    stdin: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct PistonRun {
    #[serde(default)]
    stdout: String,
    #[serde(default)]
    stderr: String,
    #[serde(default)]
    code: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct PistonResponse {
    #[serde(default)]
    run: PistonRun,
}

/// エディタの言語名を Piston の言語名に変換する
pub fn piston_language(language: &str) -> &str {
    match language {
        "javascript" | "js" => "javascript",
        "python" | "py" => "python",
        "cpp" | "c++" => "cpp",
        "typescript" | "ts" => "typescript",
        other => other,
    }
}

pub struct PistonCodeRunner {
    client: reqwest::Client,
    endpoint: String,
}

impl PistonCodeRunner {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, CodeRunnerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CodeRunnerError::Transport(e.to_string()))?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl CodeRunner for PistonCodeRunner {
    async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionOutput, CodeRunnerError> {
        let language = piston_language(&request.language);
        tracing::debug!("Using Piston language: {}", language);

        let body = PistonRequest {
            language,
            version: "*",
            files: vec![PistonFile {
                content: &request.code,
            }],
            stdin: request.stdin.as_deref().unwrap_or_default(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CodeRunnerError::Timeout
                } else {
                    CodeRunnerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("Piston API error: {}", status);
            return Err(CodeRunnerError::Status(status.as_u16()));
        }

        let result: PistonResponse = response
            .json()
            .await
            .map_err(|e| CodeRunnerError::Transport(e.to_string()))?;

        let output = ExecutionOutput {
            stdout: result.run.stdout,
            stderr: result.run.stderr,
            exit_code: result.run.code.unwrap_or(0),
        };
        tracing::info!(
            "Code execution completed - stdout length: {}, stderr length: {}, exit_code: {}",
            output.stdout.len(),
            output.stderr.len(),
            output.exit_code
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_aliases() {
        // テスト項目: エディタの言語名が Piston の言語名に変換される
        assert_eq!(piston_language("js"), "javascript");
        assert_eq!(piston_language("c++"), "cpp");
        assert_eq!(piston_language("rust"), "rust");
    }

    #[test]
    fn test_response_without_run_defaults() {
        // テスト項目: run が無いレスポンスは空の出力として扱われる
        // when (操作):
        let response: PistonResponse = serde_json::from_str(r#"{"language":"python"}"#).unwrap();

        // then (期待する結果):
        assert_eq!(response.run.stdout, "");
        assert_eq!(response.run.code, None);
    }
}
