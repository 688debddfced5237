//! Minimal in-process stand-in for a Seq ingestion endpoint.
//!
//! Each accepted connection serves exactly one request and is closed after
//! the scripted response is written.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

#[derive(Debug)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Look up a header by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.trim_end()).expect("request body is JSON")
    }
}

/// Scripted reply for one request.
#[derive(Clone, Debug)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
    /// Advertised length; defaults to the real body length.
    pub content_length: Option<usize>,
}

impl MockResponse {
    pub fn created() -> Self {
        Self::with_body(201, "")
    }

    pub fn with_body(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
            content_length: None,
        }
    }

    /// Advertise more bytes than are sent, then hang up.
    pub fn truncated(status: u16, body: &str, advertised: usize) -> Self {
        Self {
            content_length: Some(advertised),
            ..Self::with_body(status, body)
        }
    }
}

fn read_request(stream: &TcpStream) -> CapturedRequest {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("set read timeout");
    let mut reader = BufReader::new(stream);
    let mut head = reader.by_ref().lines().map(|line| line.expect("request head"));

    let start = head.next().unwrap_or_default();
    let mut words = start.split_whitespace();
    let method = words.next().unwrap_or_default().to_owned();
    let path = words.next().unwrap_or_default().to_owned();

    let headers: Vec<(String, String)> = head
        .take_while(|line| !line.is_empty())
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_owned()))
        })
        .collect();
    let length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0);

    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).expect("request body");
    CapturedRequest {
        method,
        path,
        headers,
        body: String::from_utf8(body).expect("UTF-8 body"),
    }
}

fn write_response(mut stream: &TcpStream, response: &MockResponse) {
    let length = response.content_length.unwrap_or(response.body.len());
    let head = format!(
        "HTTP/1.1 {} Mock\r\nContent-Length: {length}\r\nConnection: close\r\n\r\n",
        response.status
    );
    // The client may hang up first on truncated replies.
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&response.body);
}

/// Spawn a server on `listener` that answers successive requests with
/// `responses`, stopping once they are exhausted.
pub fn spawn_seq_server<I>(
    listener: TcpListener,
    responses: I,
) -> (SocketAddr, mpsc::Receiver<CapturedRequest>)
where
    I: IntoIterator<Item = MockResponse>,
    I::IntoIter: Send + 'static,
{
    let addr = listener.local_addr().expect("local address");
    let responses = responses.into_iter();
    let (captured_tx, captured_rx) = mpsc::channel();

    thread::spawn(move || {
        for response in responses {
            let Ok((stream, _)) = listener.accept() else {
                break;
            };
            let captured = read_request(&stream);
            write_response(&stream, &response);
            if captured_tx.send(captured).is_err() {
                break;
            }
        }
    });

    (addr, captured_rx)
}
