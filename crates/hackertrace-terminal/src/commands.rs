//! General commands: help, cities, whoami, mode, ascii, and the easter eggs.

use hackertrace_trace::city_names;
use hackertrace_types::Plan;
use hackertrace_types::error::{HackerError, Result};

use crate::interpreter::{Command, CommandOutput, CommandRegistry, Environment};

/// Longest word `ascii` renders.
pub const ASCII_MAX_CHARS: usize = 12;

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

struct HelpCmd;
impl Command for HelpCmd {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "List commands"
    }
    fn usage(&self) -> &str {
        "help"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::lines([
            "Commands:",
            "  help, cities, clear, trace-route <city>",
            "  whoami, scan <city>, ping <city>, ascii <word>",
            "  mode real|fake|3d",
            "  save, sessions, replay <id>, export <id> (json|txt)",
        ]))
    }
}

// ---------------------------------------------------------------------------
// cities
// ---------------------------------------------------------------------------

struct CitiesCmd;
impl Command for CitiesCmd {
    fn name(&self) -> &str {
        "cities"
    }
    fn description(&self) -> &str {
        "List available cities"
    }
    fn usage(&self) -> &str {
        "cities"
    }
    fn category(&self) -> &str {
        "trace"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::lines([format!("CITIES: {}", city_names())]))
    }
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn name(&self) -> &str {
        "whoami"
    }
    fn description(&self) -> &str {
        "Show profile card"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let Some(p) = env.profile else {
            return Ok(CommandOutput::lines([
                "anonymous@net",
                "plan: free",
                "achievements: none",
            ]));
        };
        let achievements = if p.achievements.is_empty() {
            "none".to_string()
        } else {
            p.achievements.join(", ")
        };
        Ok(CommandOutput::lines([
            format!("{} @ hackertrace", p.name),
            format!("plan: {}", p.plan),
            format!("achievements: {achievements}"),
        ]))
    }
}

// ---------------------------------------------------------------------------
// mode
// ---------------------------------------------------------------------------

struct ModeCmd;
impl Command for ModeCmd {
    fn name(&self) -> &str {
        "mode"
    }
    fn description(&self) -> &str {
        "Switch mode: real|fake|3d"
    }
    fn usage(&self) -> &str {
        "mode real|fake|3d|2d"
    }
    fn category(&self) -> &str {
        "config"
    }
    fn required_plan(&self, args: &[&str]) -> Option<Plan> {
        (args.first() == Some(&"real")).then_some(Plan::Pro)
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<CommandOutput> {
        let line = match args.first().copied() {
            Some("real") => {
                env.mode.real = true;
                "MODE: REAL (uses external IP APIs)"
            },
            Some("fake") => {
                env.mode.real = false;
                "MODE: CINEMATIC"
            },
            Some("3d") => {
                env.mode.map3d = true;
                "MAP: 3D globe"
            },
            Some("2d") => {
                env.mode.map3d = false;
                "MAP: 2D flat"
            },
            _ => return Err(HackerError::usage(self.usage())),
        };
        log::debug!("Mode now {:?}", env.mode);
        Ok(CommandOutput::lines([line]))
    }
}

// ---------------------------------------------------------------------------
// ascii
// ---------------------------------------------------------------------------

struct AsciiCmd;
impl Command for AsciiCmd {
    fn name(&self) -> &str {
        "ascii"
    }
    fn description(&self) -> &str {
        "Render ASCII art word"
    }
    fn usage(&self) -> &str {
        "ascii <word>"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        let word: String = args
            .first()
            .map(|w| w.chars().take(ASCII_MAX_CHARS).collect())
            .unwrap_or_default();
        if word.is_empty() {
            return Err(HackerError::usage(self.usage()));
        }
        Ok(CommandOutput::lines([format!(
            "==== {} ====",
            word.to_uppercase()
        )]))
    }
}

// ---------------------------------------------------------------------------
// sudo
// ---------------------------------------------------------------------------

struct SudoCmd;
impl Command for SudoCmd {
    fn name(&self) -> &str {
        "sudo"
    }
    fn description(&self) -> &str {
        "Try superuser"
    }
    fn usage(&self) -> &str {
        "sudo"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, _args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        Ok(CommandOutput::lines(["sudo: permission denied. nice try."]))
    }
}

// ---------------------------------------------------------------------------
// hack
// ---------------------------------------------------------------------------

struct HackCmd;
impl Command for HackCmd {
    fn name(&self) -> &str {
        "hack"
    }
    fn aliases(&self) -> &[&str] {
        &["hack-pentagon"]
    }
    fn description(&self) -> &str {
        "Easter egg"
    }
    fn usage(&self) -> &str {
        "hack pentagon"
    }
    fn category(&self) -> &str {
        "fun"
    }
    fn execute(&self, args: &[&str], _env: &mut Environment<'_>) -> Result<CommandOutput> {
        if args.first() != Some(&"pentagon") {
            return Err(HackerError::usage(self.usage()));
        }
        Ok(CommandOutput::lines([
            "ACCESSING PENTAGON...",
            "ELEVATING PERMISSIONS...",
            "ACCESS DENIED.",
            "THIS INCIDENT HAS BEEN REPORTED.",
        ]))
    }
}

/// Register the general commands.
pub fn register_general_commands(reg: &mut CommandRegistry) {
    reg.register(Box::new(HelpCmd));
    reg.register(Box::new(CitiesCmd));
    reg.register(Box::new(WhoamiCmd));
    reg.register(Box::new(ModeCmd));
    reg.register(Box::new(AsciiCmd));
    reg.register(Box::new(SudoCmd));
    reg.register(Box::new(HackCmd));
}

/// Register every builtin command.
pub fn register_builtins(reg: &mut CommandRegistry) {
    register_general_commands(reg);
    crate::net_commands::register_net_commands(reg);
    crate::session_commands::register_session_commands(reg);
}

/// A registry holding every builtin command.
pub fn builtin_registry() -> CommandRegistry {
    let mut reg = CommandRegistry::new();
    register_builtins(&mut reg);
    reg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::testing::Fixture;
    use hackertrace_types::Profile;

    fn reg() -> CommandRegistry {
        let mut reg = CommandRegistry::new();
        register_general_commands(&mut reg);
        reg
    }

    #[test]
    fn help_overview() {
        let mut f = Fixture::new();
        let out = f.lines(&reg(), "help");
        assert_eq!(out[0], "Commands:");
        assert_eq!(out.len(), 5);
        assert!(out[1].contains("trace-route <city>"));
    }

    #[test]
    fn cities_lists_catalog() {
        let mut f = Fixture::new();
        assert_eq!(
            f.lines(&reg(), "cities"),
            vec!["CITIES: delhi, paris, tokyo, nyc, london, sydney"]
        );
    }

    #[test]
    fn whoami_anonymous() {
        let mut f = Fixture::new();
        assert_eq!(
            f.lines(&reg(), "whoami"),
            vec!["anonymous@net", "plan: free", "achievements: none"]
        );
    }

    #[test]
    fn whoami_profile_card() {
        let mut f = Fixture::new();
        f.profile = Some(Profile {
            id: "u1".into(),
            name: "trinity".into(),
            plan: Plan::Pro,
            achievements: vec!["first-trace".into(), "night-owl".into()],
        });
        assert_eq!(
            f.lines(&reg(), "WHOAMI"),
            vec![
                "trinity @ hackertrace",
                "plan: pro",
                "achievements: first-trace, night-owl",
            ]
        );
    }

    #[test]
    fn mode_real_needs_pro() {
        let reg = reg();
        let mut f = Fixture::new();
        assert_eq!(
            f.lines(&reg, "mode real"),
            vec!["MODE real is a Pro feature. Upgrade to enable."]
        );
        assert!(!f.mode.real);

        let mut f = Fixture::with_plan(Plan::Pro);
        assert_eq!(
            f.lines(&reg, "mode real"),
            vec!["MODE: REAL (uses external IP APIs)"]
        );
        assert!(f.mode.real);
        assert_eq!(f.lines(&reg, "mode fake"), vec!["MODE: CINEMATIC"]);
        assert!(!f.mode.real);
    }

    #[test]
    fn mode_map_toggles_are_free() {
        let reg = reg();
        let mut f = Fixture::new();
        assert_eq!(f.lines(&reg, "mode 3d"), vec!["MAP: 3D globe"]);
        assert!(f.mode.map3d);
        assert_eq!(f.lines(&reg, "mode 2d"), vec!["MAP: 2D flat"]);
        assert!(!f.mode.map3d);
    }

    #[test]
    fn mode_bad_argument() {
        let mut f = Fixture::new();
        let err = f.run(&reg(), "mode warp").unwrap_err();
        assert_eq!(err.to_string(), "usage: mode real|fake|3d|2d");
        let err = f.run(&reg(), "mode").unwrap_err();
        assert!(matches!(err, HackerError::Usage(_)));
    }

    #[test]
    fn ascii_banner() {
        let mut f = Fixture::new();
        assert_eq!(f.lines(&reg(), "ascii neon"), vec!["==== NEON ===="]);
        assert_eq!(
            f.lines(&reg(), "ascii supercalifragilistic"),
            vec!["==== SUPERCALIFRA ===="]
        );
        assert!(f.run(&reg(), "ascii").is_err());
    }

    #[test]
    fn sudo_denied() {
        let mut f = Fixture::new();
        assert_eq!(
            f.lines(&reg(), "sudo rm -rf /"),
            vec!["sudo: permission denied. nice try."]
        );
    }

    #[test]
    fn hack_pentagon_and_alias() {
        let mut f = Fixture::new();
        let a = f.lines(&reg(), "hack pentagon");
        let b = f.lines(&reg(), "hack-pentagon pentagon");
        assert_eq!(a, b);
        assert_eq!(a.last().unwrap(), "THIS INCIDENT HAS BEEN REPORTED.");
        let err = f.run(&reg(), "hack nasa").unwrap_err();
        assert_eq!(err.to_string(), "usage: hack pentagon");
    }

    #[test]
    fn builtins_resolve_every_alias() {
        let reg = builtin_registry();
        for (name, _) in reg.list_commands() {
            let cmd = reg.find(name).unwrap();
            for alias in cmd.aliases() {
                assert_eq!(reg.find(alias).unwrap().name(), name);
            }
        }
        assert_eq!(reg.find("traceroute").unwrap().name(), "trace-route");
    }
}
