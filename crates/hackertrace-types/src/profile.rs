//! Display mode flags, subscription plans, and user profiles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HackerError;

/// Terminal display toggles.
///
/// `real` switches the trace pathway to the external feed; `map3d` selects
/// the globe projection for whatever renders the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub real: bool,
    pub map3d: bool,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

impl FromStr for Plan {
    type Err = HackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(HackerError::Config(format!("unknown plan: {other}"))),
        }
    }
}

/// A user profile. Read-only from the interpreter's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub plan: Plan,
    #[serde(default)]
    pub achievements: Vec<String>,
}

/// Plan of an optional profile; no profile means the free tier.
pub fn effective_plan(profile: Option<&Profile>) -> Plan {
    profile.map_or(Plan::Free, |p| p.plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(plan: Plan) -> Profile {
        Profile {
            id: "demo".into(),
            name: "neo".into(),
            plan,
            achievements: Vec::new(),
        }
    }

    #[test]
    fn default_mode_is_cinematic_flat() {
        let m = Mode::default();
        assert!(!m.real);
        assert!(!m.map3d);
    }

    #[test]
    fn plan_ordering() {
        assert!(Plan::Pro > Plan::Free);
        assert!(effective_plan(Some(&profile(Plan::Pro))) >= Plan::Pro);
        assert!(effective_plan(Some(&profile(Plan::Free))) < Plan::Pro);
        assert_eq!(effective_plan(None), Plan::Free);
    }

    #[test]
    fn plan_parse_case_insensitive() {
        assert_eq!("PRO".parse::<Plan>().unwrap(), Plan::Pro);
        assert_eq!("free".parse::<Plan>().unwrap(), Plan::Free);
        assert!("gold".parse::<Plan>().is_err());
    }

    #[test]
    fn plan_display_roundtrip() {
        for plan in [Plan::Free, Plan::Pro] {
            assert_eq!(plan.to_string().parse::<Plan>().unwrap(), plan);
        }
    }

    #[test]
    fn missing_profile_is_free() {
        assert_eq!(effective_plan(None), Plan::Free);
        assert_eq!(effective_plan(Some(&profile(Plan::Pro))), Plan::Pro);
    }

    #[test]
    fn plan_serializes_lowercase() {
        let json = serde_json::to_string(&profile(Plan::Pro)).unwrap();
        assert!(json.contains("\"plan\":\"pro\""));
    }
}
