//! Synthetic traceroute generator.
//!
//! Produces a plausible-looking hop sequence for display. Nothing here
//! reflects real network state.

use std::collections::BTreeSet;
use std::fmt;
use std::net::Ipv4Addr;

use rand::Rng;

/// Fewest hops a trace will have.
pub const MIN_HOPS: usize = 8;
/// Most hops a trace will have.
pub const MAX_HOPS: usize = 16;
/// Ceiling on the running latency baseline, before jitter.
pub const LATENCY_CAP_MS: u32 = 200;
/// Probability that a trace contains timeout hops at all.
pub const TIMEOUT_PROBABILITY: f64 = 0.7;

pub const FINAL_HANDSHAKE: &str = "FINAL HANDSHAKE... OK";
pub const TRACE_COMPLETE: &str = "TRACE COMPLETE.";

/// One generated hop. Indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    Reply {
        index: usize,
        addr: Ipv4Addr,
        /// Running baseline after this hop, capped at [`LATENCY_CAP_MS`].
        baseline_ms: u32,
        /// Displayed latency: baseline plus jitter.
        latency_ms: u32,
    },
    Timeout {
        index: usize,
    },
}

impl Hop {
    pub fn index(&self) -> usize {
        match self {
            Self::Reply { index, .. } | Self::Timeout { index } => *index,
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply {
                index,
                addr,
                latency_ms,
                ..
            } => write!(f, "HOP {index}: {addr} -> {latency_ms}ms"),
            Self::Timeout { index } => write!(f, "HOP {index}: * * * Request timed out"),
        }
    }
}

/// Random address from 10/8 or one of the documentation ranges.
fn random_addr<R: Rng + ?Sized>(rng: &mut R) -> Ipv4Addr {
    let range = rng.gen_range(0..4);
    let mut octet = || rng.gen_range(1..=254u8);
    match range {
        0 => Ipv4Addr::new(10, octet(), octet(), octet()),
        1 => Ipv4Addr::new(192, 0, 2, octet()),
        2 => Ipv4Addr::new(198, 51, 100, octet()),
        _ => Ipv4Addr::new(203, 0, 113, octet()),
    }
}

/// Generate the hop sequence (without the trailing fixed lines).
pub fn generate_hops<R: Rng + ?Sized>(rng: &mut R) -> Vec<Hop> {
    let hop_count = rng.gen_range(MIN_HOPS..=MAX_HOPS);

    // One or two timeouts, never on the first or last hop.
    let mut timeouts = BTreeSet::new();
    if rng.gen_bool(TIMEOUT_PROBABILITY) {
        let wanted = rng.gen_range(1..=2);
        while timeouts.len() < wanted {
            timeouts.insert(rng.gen_range(2..hop_count));
        }
    }

    let mut latency: u32 = rng.gen_range(5..=20);
    let mut hops = Vec::with_capacity(hop_count);
    for index in 1..=hop_count {
        if timeouts.contains(&index) {
            hops.push(Hop::Timeout { index });
            latency += rng.gen_range(5..=20);
            continue;
        }
        latency = (latency + rng.gen_range(5..=15)).min(LATENCY_CAP_MS);
        let latency_ms = latency + rng.gen_range(0..=9);
        hops.push(Hop::Reply {
            index,
            addr: random_addr(rng),
            baseline_ms: latency,
            latency_ms,
        });
    }
    hops
}

/// Generate display lines for a trace to `dest_label`: the hops followed by
/// the handshake and completion lines.
pub fn generate_traceroute<R: Rng + ?Sized>(dest_label: &str, rng: &mut R) -> Vec<String> {
    let hops = generate_hops(rng);
    log::debug!("Synthetic trace to {dest_label}: {} hops", hops.len());
    let mut lines: Vec<String> = hops.iter().map(ToString::to_string).collect();
    lines.push(FINAL_HANDSHAKE.to_string());
    lines.push(TRACE_COMPLETE.to_string());
    lines
}
