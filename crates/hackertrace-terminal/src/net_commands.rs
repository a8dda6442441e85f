//! Network theatre: trace-route, scan, ping.

use hackertrace_trace::{resolve_city, resolve_hops};
use hackertrace_types::error::{HackerError, Result};
use rand::Rng;

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Ports `scan` reports on.
pub const SCAN_PORTS: [u16; 5] = [22, 53, 80, 123, 443];

/// Chance each scanned port shows as open.
pub const PORT_OPEN_PROBABILITY: f64 = 0.7;

/// Chance a ping run reports one lost packet.
pub const PING_LOSS_PROBABILITY: f64 = 0.2;

const PING_COUNT: u32 = 4;

// ---------------------------------------------------------------------------
// trace-route
// ---------------------------------------------------------------------------

struct TraceRouteCmd;
impl Command for TraceRouteCmd {
    fn name(&self) -> &str {
        "trace-route"
    }
    fn aliases(&self) -> &[&str] {
        &["traceroute"]
    }
    fn description(&self) -> &str {
        "Trace a route to a city"
    }
    fn usage(&self) -> &str {
        "trace-route <city>"
    }
    fn category(&self) -> &str {
        "trace"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let destination = resolve_city(args.first().copied().unwrap_or(""))?;
        log::debug!("Tracing {} -> {}", env.source.name, destination.name);

        let mut lines = vec![
            format!("RESOLVING {}...", destination.name.to_uppercase()),
            "ESTABLISHING SECURE CHANNEL... OK".to_string(),
            "INITIATING GEO-TRACE SEQUENCE...".to_string(),
            format!("SOURCE: {}", env.source.label),
            format!("DESTINATION: {}", destination.label),
        ];
        lines.extend(resolve_hops(*env.mode, env.feed, destination, &mut *env.rng));
        Ok(CommandOutput::Trace { destination, lines })
    }
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

struct ScanCmd;
impl Command for ScanCmd {
    fn name(&self) -> &str {
        "scan"
    }
    fn description(&self) -> &str {
        "Fake port scan results"
    }
    fn usage(&self) -> &str {
        "scan <city>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args
            .first()
            .ok_or_else(|| HackerError::usage(self.usage()))?;
        let mut lines = vec![format!("SCANNING {}...", target.to_uppercase())];
        for port in SCAN_PORTS {
            if env.rng.gen_bool(PORT_OPEN_PROBABILITY) {
                lines.push(format!("PORT {port}/tcp open"));
            }
        }
        lines.push("SCAN COMPLETE.".to_string());
        Ok(CommandOutput::Lines(lines))
    }
}

// ---------------------------------------------------------------------------
// ping
// ---------------------------------------------------------------------------

struct PingCmd;
impl Command for PingCmd {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Simulate ping"
    }
    fn usage(&self) -> &str {
        "ping <city>"
    }
    fn category(&self) -> &str {
        "network"
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let target = args
            .first()
            .ok_or_else(|| HackerError::usage(self.usage()))?;
        let lost = u32::from(env.rng.gen_bool(PING_LOSS_PROBABILITY));

        let mut lines = vec![format!("PING {target} with 32 bytes of data:")];
        for _ in 0..PING_COUNT {
            let ms: u32 = env.rng.gen_range(20..200);
            let ttl: u32 = env.rng.gen_range(64..128);
            lines.push(format!("Reply from {target}: time={ms}ms TTL={ttl}"));
        }
        lines.push(format!(
            "Packets: Sent = {PING_COUNT}, Received = {}, Lost = {lost} ({}% loss)",
            PING_COUNT - lost,
            lost * 100 / PING_COUNT
        ));
        Ok(CommandOutput::Lines(lines))
    }
}

/// Register trace-route, scan and ping.
pub fn register_net_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(TraceRouteCmd));
    reg.register(Box::new(ScanCmd));
    reg.register(Box::new(PingCmd));
}
