use std::process::{Command, Output, Stdio};

use super::{parse_search_page, FetchError, ImageSearch, SearchPage, SearchRequest};
use crate::config::Credential;

/// Binary used for HTTP requests
const CURL_BIN: &str = "curl";

/// Separates the response body from the status code curl appends
const STATUS_SEPARATOR: u8 = b'\n';

/// Search client backed by the system `curl`
///
/// The request is written to curl's stdin as a config file (`--config -`), so
/// the access key never shows up in the process list.
#[derive(Debug, Clone)]
pub struct CurlClient {
    api_url: String,
    credential: Option<Credential>,
}

impl CurlClient {
    pub fn new(api_url: impl Into<String>, credential: Option<Credential>) -> Self {
        Self {
            api_url: api_url.into(),
            credential,
        }
    }
}

impl ImageSearch for CurlClient {
    async fn search(&self, request: SearchRequest) -> Result<SearchPage, FetchError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(FetchError::MissingCredential)?;

        tracing::debug!(
            query = %request.query,
            page = request.page,
            "Requesting image search page"
        );

        let config = render_config(&self.api_url, &request, credential);
        let output = run_curl_with_stdin(config).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::Transport(format!(
                "curl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        interpret_response(&output.stdout)
    }
}

/// Run curl reading its configuration from stdin
async fn run_curl_with_stdin(config: String) -> Result<Output, FetchError> {
    run_with_stdin(CURL_BIN, &["--config", "-"], config).await
}

/// Spawn `program`, feed `input` to its stdin and collect its output.
/// The child is always waited on, even when writing stdin fails.
async fn run_with_stdin(
    program: &'static str,
    args: &'static [&'static str],
    input: String,
) -> Result<Output, FetchError> {
    let result = tokio::task::spawn_blocking(move || {
        use std::io::Write;

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Dropping stdin after the write closes the pipe
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(input.as_bytes()),
            None => Ok(()),
        };

        let output = child.wait_with_output()?;
        written?;
        Ok::<_, std::io::Error>(output)
    })
    .await;

    match result {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(FetchError::Transport(format!("failed to run {}: {}", program, e))),
        Err(e) => Err(FetchError::Transport(format!("task failed: {}", e))),
    }
}

/// Build the curl config file for one search request
fn render_config(api_url: &str, request: &SearchRequest, credential: &Credential) -> String {
    let lines = [
        format!("url = \"{}\"", quote(api_url)),
        "get".to_string(),
        "silent".to_string(),
        "show-error".to_string(),
        format!("data-urlencode = \"query={}\"", quote(&request.query)),
        format!("data = \"page={}\"", request.page),
        format!("data = \"per_page={}\"", request.per_page),
        format!("data-urlencode = \"client_id={}\"", quote(credential.expose())),
        "write-out = \"\\n%{http_code}\"".to_string(),
    ];

    let mut config = lines.join("\n");
    config.push('\n');
    config
}

/// Escape a value for a double-quoted curl config string
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

/// Split curl's stdout into body and status code, then decode the body
fn interpret_response(stdout: &[u8]) -> Result<SearchPage, FetchError> {
    let split = stdout
        .iter()
        .rposition(|&b| b == STATUS_SEPARATOR)
        .ok_or_else(|| FetchError::Transport("response is missing a status code".to_string()))?;

    let (body, status) = stdout.split_at(split);
    let status = String::from_utf8_lossy(&status[1..]);
    let code: u16 = status
        .trim()
        .parse()
        .map_err(|_| FetchError::Transport(format!("unreadable status code {:?}", status.trim())))?;

    // curl reports 000 when no response was received
    if code == 0 {
        return Err(FetchError::Transport("no response received".to_string()));
    }
    if !(200..300).contains(&code) {
        return Err(FetchError::Status(code));
    }

    parse_search_page(body)
}
