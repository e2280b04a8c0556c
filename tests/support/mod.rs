#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const PROXY_VARS: [&str; 6] = [
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

/// A binary invocation isolated from the caller's OpenAI and logging env,
/// running in its own temp directory so no stray `.env` is picked up.
pub fn command(bin: &str, workdir: &Path) -> Command {
    let mut cmd = Command::new(bin);
    cmd.current_dir(workdir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("OPENAI_BASE_URL")
        .env_remove("OPENAI_MODEL")
        .env_remove("OPENAI_TIMEOUT_SECS")
        .env_remove("TYPING_INDICATOR")
        .env_remove("LOG_OUTPUT")
        .env_remove("LOG_FORMAT")
        .env_remove("LOG_FILE_PATH")
        .env_remove("RUST_LOG");
    for var in PROXY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

pub fn run_with_stdin(mut cmd: Command, stdin: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn binary");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin.as_bytes())
        .expect("failed to write stdin");
    child.wait_with_output().expect("failed to wait for binary")
}

pub fn unique_temp_dir(suffix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock should be after unix epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "yosh-{suffix}-{stamp}-{}",
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).expect("failed to create temp directory");
    dir
}

#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// One-connection-per-response HTTP stub that records what it was sent.
pub struct StubServer {
    pub base_url: String,
    handle: JoinHandle<Vec<CapturedRequest>>,
}

impl StubServer {
    /// Serves each `(status, body)` pair to one incoming connection, in order.
    pub fn serve(responses: Vec<(u16, String)>) -> Self {
        Self::serve_after(Duration::ZERO, responses)
    }

    /// Like [`StubServer::serve`], but holds each response for `delay` after
    /// the request has been read.
    pub fn serve_after(delay: Duration, responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let handle = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().expect("accept should succeed");
                    let captured = read_request(&stream);
                    thread::sleep(delay);
                    write_response(stream, status, &body);
                    captured
                })
                .collect()
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    pub fn finish(self) -> Vec<CapturedRequest> {
        self.handle.join().expect("stub server thread should join")
    }
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    let mut reader = BufReader::new(stream);
    let mut head = String::new();
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).expect("request head should read");
        if read == 0 || line == "\r\n" {
            break;
        }
        head.push_str(&line);
    }

    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    let mut raw = vec![0; content_length];
    reader.read_exact(&mut raw).expect("request body should read");

    CapturedRequest {
        head,
        body: String::from_utf8(raw).expect("request body should be utf-8"),
    }
}

fn write_response(mut stream: TcpStream, status: u16, body: &str) {
    let reason = if status == 200 { "OK" } else { "Error" };
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    )
    .expect("response should write");
    stream.flush().expect("response should flush");
}
