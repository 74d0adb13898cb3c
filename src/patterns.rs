//! Closed set of pattern labels emitted by the detectors (spec §3, §4.6).
//!
//! Detectors work with the typed `Pattern` enum internally; the wire/display
//! string only gets built at the edge (output builder, suppression removal
//! sets), mirroring the teacher's `FraudFlagType`/`RedFlagType` split between
//! a typed flag and a human-readable label.

use std::fmt;

/// One family per detector category, used for ring `pattern_type`
/// classification (spec §4.8) and suppression scope (smurfing only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Cycle,
    Smurfing,
    Shell,
    Velocity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// `cycle_length_{3,4,5}`
    CycleLength(u8),
    SmurfingFanIn,
    SmurfingFanOut,
    ShellSource,
    ShellIntermediary,
    BurstActivity,
    HighVelocity,
    VelocitySpike,
    DormancyBreak,
}

impl Pattern {
    pub fn family(self) -> Family {
        match self {
            Pattern::CycleLength(_) => Family::Cycle,
            Pattern::SmurfingFanIn | Pattern::SmurfingFanOut => Family::Smurfing,
            Pattern::ShellSource | Pattern::ShellIntermediary => Family::Shell,
            Pattern::BurstActivity
            | Pattern::HighVelocity
            | Pattern::VelocitySpike
            | Pattern::DormancyBreak => Family::Velocity,
        }
    }

    /// The wire label spec.md names, e.g. `"cycle_length_3"`.
    pub fn as_str(self) -> std::borrow::Cow<'static, str> {
        match self {
            Pattern::CycleLength(len) => format!("cycle_length_{len}").into(),
            Pattern::SmurfingFanIn => "smurfing_fan_in".into(),
            Pattern::SmurfingFanOut => "smurfing_fan_out".into(),
            Pattern::ShellSource => "shell_source".into(),
            Pattern::ShellIntermediary => "shell_intermediary".into(),
            Pattern::BurstActivity => "burst_activity".into(),
            Pattern::HighVelocity => "high_velocity".into(),
            Pattern::VelocitySpike => "velocity_spike".into(),
            Pattern::DormancyBreak => "dormancy_break".into(),
        }
    }

    /// Parse a wire label back into a `Pattern`. Used by the suppression
    /// layer's removal sets, which are keyed by label string.
    pub fn parse(label: &str) -> Option<Pattern> {
        if let Some(rest) = label.strip_prefix("cycle_length_") {
            return rest.parse::<u8>().ok().map(Pattern::CycleLength);
        }
        match label {
            "smurfing_fan_in" => Some(Pattern::SmurfingFanIn),
            "smurfing_fan_out" => Some(Pattern::SmurfingFanOut),
            "shell_source" => Some(Pattern::ShellSource),
            "shell_intermediary" => Some(Pattern::ShellIntermediary),
            "burst_activity" => Some(Pattern::BurstActivity),
            "high_velocity" => Some(Pattern::HighVelocity),
            "velocity_spike" => Some(Pattern::VelocitySpike),
            "dormancy_break" => Some(Pattern::DormancyBreak),
            _ => None,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Prefix-family classification over wire labels, used by the ring merger
/// (spec §4.8) which only ever sees post-suppression label strings.
pub fn family_of_label(label: &str) -> Option<Family> {
    Pattern::parse(label).map(Pattern::family)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_length_round_trips() {
        let p = Pattern::CycleLength(3);
        assert_eq!(p.as_str(), "cycle_length_3");
        assert_eq!(Pattern::parse("cycle_length_3"), Some(p));
    }

    #[test]
    fn families_match_prefixes() {
        assert_eq!(Pattern::SmurfingFanIn.family(), Family::Smurfing);
        assert_eq!(Pattern::ShellIntermediary.family(), Family::Shell);
        assert_eq!(Pattern::DormancyBreak.family(), Family::Velocity);
    }

    #[test]
    fn unknown_label_parses_to_none() {
        assert_eq!(Pattern::parse("not_a_pattern"), None);
    }
}
