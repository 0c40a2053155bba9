//! Lifecycle topic naming.
//!
//! Framework components hook each other's lifecycle through topics
//! built from the component name, a verb, and a phase:
//!
//! ```text
//! <component>.init.pre
//! <component>.init.post
//! <component>.<verb>.pre | .post | .error
//! ```
//!
//! Collaborators outside the kernel (routing, caching, templating,
//! session) bind to these names verbatim, so they are part of the public
//! contract.

use crate::EventError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The verb used for one-time component initialization.
pub const INIT_VERB: &str = "init";

/// Position of a lifecycle event relative to the operation it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Before the operation runs.
    Pre,
    /// After the operation succeeded.
    Post,
    /// After the operation failed.
    Error,
}

impl Phase {
    /// Returns the topic segment for this phase.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
            Self::Error => "error",
        }
    }
}

impl FromStr for Phase {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pre" => Ok(Self::Pre),
            "post" => Ok(Self::Post),
            "error" => Ok(Self::Error),
            _ => Err(EventError::InvalidTopic(s.to_string())),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds `<component>.<verb>.<phase>`.
///
/// ```
/// use weft_event::{lifecycle_topic, Phase};
///
/// assert_eq!(lifecycle_topic("view", "render", Phase::Post), "view.render.post");
/// ```
#[must_use]
pub fn lifecycle_topic(component: &str, verb: &str, phase: Phase) -> String {
    format!("{component}.{verb}.{phase}")
}

/// Builds `<component>.init.<phase>`.
///
/// ```
/// use weft_event::{init_topic, Phase};
///
/// assert_eq!(init_topic("session", Phase::Pre), "session.init.pre");
/// ```
#[must_use]
pub fn init_topic(component: &str, phase: Phase) -> String {
    lifecycle_topic(component, INIT_VERB, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Topic;

    const ALL_PHASES: &[Phase] = &[Phase::Pre, Phase::Post, Phase::Error];

    #[test]
    fn from_str_roundtrip_all() {
        for &phase in ALL_PHASES {
            let parsed: Phase = phase.to_string().parse().expect("roundtrip");
            assert_eq!(parsed, phase);
        }
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("POST".parse::<Phase>().unwrap(), Phase::Post);
    }

    #[test]
    fn from_str_unknown() {
        assert!("during".parse::<Phase>().is_err());
        assert!("".parse::<Phase>().is_err());
    }

    #[test]
    fn lifecycle_topics_canonicalize_under_component() {
        let component = Topic::parse("router").unwrap();
        for &phase in ALL_PHASES {
            let topic = Topic::parse(&lifecycle_topic("Router", "dispatch", phase)).unwrap();
            assert!(topic.segments().starts_with(component.segments()));
            assert_eq!(topic.to_string(), format!("router/dispatch/{phase}"));
        }
    }

    #[test]
    fn init_topics() {
        assert_eq!(init_topic("config", Phase::Pre), "config.init.pre");
        assert_eq!(init_topic("config", Phase::Post), "config.init.post");
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&Phase::Error).expect("serialize");
        assert_eq!(json, "\"error\"");
        let parsed: Phase = serde_json::from_str("\"pre\"").expect("deserialize");
        assert_eq!(parsed, Phase::Pre);
    }
}
