#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::{Command, Output, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

/// Helper struct to run nearby commands in an isolated temp directory
pub struct NearbyTest {
    pub temp_dir: TempDir,
    binary_path: String,
    envs: Vec<(String, String)>,
}

impl NearbyTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");

        NearbyTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_nearby").to_string(),
            envs: Vec::new(),
        }
    }

    /// Point the binary at a mock API
    pub fn with_api(mut self, api: &MockApi) -> Self {
        self.envs
            .push(("NEARBY_API_URL".to_string(), api.base_url.clone()));
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_string(), value.to_string()));
        self
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary_path);
        cmd.args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("NEARBY_ROOT")
            .env_remove("NEARBY_ACCESS_TOKEN")
            .env_remove("NEARBY_API_URL")
            .env_remove("NEARBY_LOG")
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args)
            .output()
            .expect("Failed to execute nearby command")
    }

    /// Run with `input` written to stdin, then stdin closed
    pub fn run_with_stdin(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn nearby command");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write stdin");
        child
            .wait_with_output()
            .expect("Failed to wait for nearby command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert_success(args, &output);
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.temp_dir.path().join(".nearby");
        fs::create_dir_all(&dir).expect("Failed to create .nearby directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> Option<String> {
        fs::read_to_string(self.temp_dir.path().join(".nearby").join("config.yaml")).ok()
    }
}

pub fn assert_success(args: &[&str], output: &Output) {
    if !output.status.success() {
        panic!(
            "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
            args,
            output.status,
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// A request received by [`MockApi`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Path and query, e.g. `/api/brands?page=1&pageSize=10`
    pub target: String,
    /// Header lines, lowercased names
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<String> {
        query_param(&self.target, name)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Value of a query parameter in a request target
pub fn query_param(target: &str, name: &str) -> Option<String> {
    let (_, query) = target.split_once('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}

type Handler = dyn Fn(&RecordedRequest) -> (u16, String) + Send + Sync;

/// Minimal HTTP/1.1 server on a background thread that answers every
/// request with the handler's `(status, json body)` and records it.
pub struct MockApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&RecordedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("mock API has an address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handler: Box<Handler> = Box::new(handler);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let Ok(reader_stream) = stream.try_clone() else {
                    continue;
                };
                let mut reader = BufReader::new(reader_stream);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                let target = request_line
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();

                let mut headers = Vec::new();
                loop {
                    let mut line = String::new();
                    match reader.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if line == "\r\n" => break,
                        Ok(_) => {
                            if let Some((k, v)) = line.trim_end().split_once(':') {
                                headers.push((k.trim().to_lowercase(), v.trim().to_string()));
                            }
                        }
                    }
                }

                let request = RecordedRequest { target, headers };
                let (status, body) = handler(&request);
                recorded.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    if status < 400 { "OK" } else { "Error" },
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        MockApi {
            base_url: format!("http://{addr}/api/"),
            requests,
        }
    }

    /// Serve `page_sizes.len()` pages of `{ "id", "name" }` objects under
    /// `items_field`; item names encode the search text and page.
    pub fn paged(items_field: &'static str, page_sizes: &'static [usize]) -> Self {
        Self::start(move |request| {
            let page: usize = request
                .param("page")
                .and_then(|p| p.parse().ok())
                .unwrap_or(1);
            let search = request.param("search").unwrap_or_default();
            let count = page_sizes.get(page.wrapping_sub(1)).copied().unwrap_or(0);
            let items: Vec<serde_json::Value> = (0..count)
                .map(|i| {
                    serde_json::json!({
                        "id": page * 100 + i,
                        "name": format!("{search}{page}-{i}"),
                    })
                })
                .collect();
            let mut body = serde_json::json!({
                "pagination": { "totalPages": page_sizes.len(), "currentPage": page },
            });
            body[items_field] = serde_json::Value::Array(items);
            (200, body.to_string())
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
