//! Optional real-trace feed.
//!
//! When real mode is on and an endpoint is configured, hop lines come from
//! `GET <base>/api/trace?city=<key>&real=1`, which answers
//! `{ "hops": ["...", ...] }`. Every failure falls back to the synthetic
//! generator without surfacing anything to the user.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

use hackertrace_types::Mode;
use hackertrace_types::error::{HackerError, Result};

use crate::cities::City;
use crate::generator::generate_traceroute;

/// Largest hop-list body accepted from the endpoint.
const MAX_HOP_BODY_BYTES: usize = 64 * 1024;
/// Largest raw reply read off the socket: the body plus room for headers.
const MAX_REPLY_BYTES: usize = MAX_HOP_BODY_BYTES + 16 * 1024;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of real hop lines.
pub trait TraceFeed {
    /// Fetch hop lines for a catalog city key.
    fn fetch(&self, city_key: &str) -> Result<Vec<String>>;
}

/// Body shape of the trace endpoint.
#[derive(Debug, Deserialize)]
struct TraceResponse {
    hops: Vec<String>,
}

/// Plain-HTTP client for the trace endpoint.
#[derive(Debug, Clone)]
pub struct HttpTraceFeed {
    host: String,
    port: u16,
    base_path: String,
}

impl HttpTraceFeed {
    /// Build from a base URL such as `http://localhost:3000` or
    /// `http://example.net:8080/prefix`.
    pub fn new(base_url: &str) -> Result<Self> {
        let rest = base_url.strip_prefix("http://").ok_or_else(|| {
            HackerError::Config(format!("trace endpoint must be http://: {base_url}"))
        })?;
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, ""),
        };
        if authority.is_empty() {
            return Err(HackerError::Config(format!(
                "trace endpoint has no host: {base_url}"
            )));
        }
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => {
                let port = p
                    .parse()
                    .map_err(|_| HackerError::Config(format!("bad port in {base_url}")))?;
                (h.to_string(), port)
            },
            None => (authority.to_string(), 80),
        };
        Ok(Self {
            host,
            port,
            base_path: path.trim_end_matches('/').to_string(),
        })
    }

    /// Request path for a city key.
    pub fn request_path(&self, city_key: &str) -> String {
        format!(
            "{}/api/trace?city={}&real=1",
            self.base_path,
            percent_encode(city_key)
        )
    }

    fn connect(&self) -> Result<TcpStream> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| HackerError::Network(format!("DNS resolution failed: {e}")))?
            .next()
            .ok_or_else(|| {
                HackerError::Network(format!("no addresses for {}:{}", self.host, self.port))
            })?;
        let stream = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT)
            .map_err(|e| HackerError::Network(format!("TCP connect failed: {e}")))?;
        stream.set_read_timeout(Some(READ_TIMEOUT))?;
        Ok(stream)
    }
}

impl TraceFeed for HttpTraceFeed {
    fn fetch(&self, city_key: &str) -> Result<Vec<String>> {
        let mut stream = self.connect()?;
        let host_header = if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        };
        let request = format!(
            "GET {} HTTP/1.1\r\n\
             Host: {host_header}\r\n\
             User-Agent: hackertrace/0.1\r\n\
             Accept: application/json\r\n\
             Connection: close\r\n\
             \r\n",
            self.request_path(city_key)
        );
        stream
            .write_all(request.as_bytes())
            .map_err(|e| HackerError::Network(format!("send request: {e}")))?;

        let reply = parse_reply(&read_reply(&mut stream)?)?;
        log::debug!(
            "Trace endpoint answered {} ({})",
            reply.status,
            header(&reply.headers, "content-type").unwrap_or("no content-type")
        );
        if !(200..300).contains(&reply.status) {
            return Err(HackerError::Network(format!(
                "trace endpoint returned {}",
                reply.status
            )));
        }
        parse_hops(&reply.body)
    }
}

/// Pick hop lines for a trace to `city`.
///
/// Uses `feed` only when `mode.real` is set; any feed failure or an empty
/// result yields synthetic hops instead.
pub fn resolve_hops<R: Rng + ?Sized>(
    mode: Mode,
    feed: Option<&dyn TraceFeed>,
    city: &City,
    rng: &mut R,
) -> Vec<String> {
    if mode.real
        && let Some(feed) = feed
    {
        match feed.fetch(city.name) {
            Ok(hops) if !hops.is_empty() => return hops,
            Ok(_) => log::warn!("Trace feed returned no hops for {}; using synthetic", city.name),
            Err(e) => log::warn!("Trace feed failed for {}: {e}; using synthetic", city.name),
        }
    }
    generate_traceroute(city.label, rng)
}

/// Decode the endpoint body.
pub fn parse_hops(body: &[u8]) -> Result<Vec<String>> {
    let parsed: TraceResponse = serde_json::from_slice(body)?;
    Ok(parsed.hops)
}

fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for b in input.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

// -------------------------------------------------------------------
// HTTP reply handling
// -------------------------------------------------------------------

/// Status, lowercased headers and decoded body of an endpoint reply.
#[derive(Debug)]
pub(crate) struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

fn read_reply(stream: &mut impl Read) -> Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(4096);
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                if raw.len() + n > MAX_REPLY_BYTES {
                    return Err(HackerError::Network("trace reply too large".to_string()));
                }
                raw.extend_from_slice(&buf[..n]);
            },
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock || e.kind() == io::ErrorKind::TimedOut =>
            {
                break;
            },
            Err(e) => return Err(HackerError::Network(format!("read reply: {e}"))),
        }
    }
    Ok(raw)
}

pub(crate) fn parse_reply(raw: &[u8]) -> Result<Reply> {
    let head_len = find_bytes(raw, b"\r\n\r\n")
        .ok_or_else(|| HackerError::Network("trace reply has no header block".to_string()))?;
    let head = std::str::from_utf8(&raw[..head_len])
        .map_err(|_| HackerError::Network("trace reply headers are not UTF-8".to_string()))?;
    let (status_line, header_lines) = head.split_once("\r\n").unwrap_or((head, ""));

    let status = status_line
        .split(' ')
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| HackerError::Network(format!("bad status line: {status_line}")))?;

    let headers: Vec<(String, String)> = header_lines
        .split("\r\n")
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let rest = &raw[head_len + 4..];
    let chunked = header(&headers, "transfer-encoding").is_some_and(|v| v.contains("chunked"));
    let body = if chunked {
        dechunk(rest)?
    } else {
        let declared = match header(&headers, "content-length") {
            Some(len) => len
                .parse::<usize>()
                .map_err(|_| HackerError::Network("bad Content-Length".to_string()))?,
            None => rest.len(),
        };
        if declared > MAX_HOP_BODY_BYTES {
            return Err(too_large());
        }
        rest[..rest.len().min(declared)].to_vec()
    };

    Ok(Reply {
        status,
        headers,
        body,
    })
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn too_large() -> HackerError {
    HackerError::Network(format!("hop list exceeds {MAX_HOP_BODY_BYTES} bytes"))
}

/// Reassemble a chunked body. A missing final `0` chunk is tolerated; a chunk
/// that claims more bytes than were received is not.
fn dechunk(mut rest: &[u8]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(line_len) = find_bytes(rest, b"\r\n") {
        let size = std::str::from_utf8(&rest[..line_len])
            .ok()
            .and_then(|line| line.split(';').next())
            .and_then(|hex| usize::from_str_radix(hex.trim(), 16).ok())
            .ok_or_else(|| HackerError::Network("bad chunk size".to_string()))?;
        if size == 0 {
            break;
        }
        let data = &rest[line_len + 2..];
        if size > data.len() {
            return Err(HackerError::Network(format!(
                "chunk of {size} bytes but only {} received",
                data.len()
            )));
        }
        if size > MAX_HOP_BODY_BYTES - body.len() {
            return Err(too_large());
        }
        body.extend_from_slice(&data[..size]);
        rest = data.get(size + 2..).unwrap_or_default();
    }
    Ok(body)
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
