//! Candidate profile selection
//!
//! A profile is picked once when a session is created and never changes
//! afterwards. Every value travels over the wire as its display label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),
    #[error("Unknown domain: {0}")]
    UnknownDomain(String),
    #[error("Unknown level: {0}")]
    UnknownLevel(String),
}

/// Job role the candidate is interviewing for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Web Developer")]
    WebDeveloper,
    #[serde(rename = "Frontend Developer")]
    FrontendDeveloper,
    #[serde(rename = "Backend Developer")]
    BackendDeveloper,
    #[serde(rename = "AI/ML Engineer")]
    AiMlEngineer,
    #[serde(rename = "Data Scientist")]
    DataScientist,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SoftwareEngineer,
        Role::WebDeveloper,
        Role::FrontendDeveloper,
        Role::BackendDeveloper,
        Role::AiMlEngineer,
        Role::DataScientist,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "Software Engineer",
            Role::WebDeveloper => "Web Developer",
            Role::FrontendDeveloper => "Frontend Developer",
            Role::BackendDeveloper => "Backend Developer",
            Role::AiMlEngineer => "AI/ML Engineer",
            Role::DataScientist => "Data Scientist",
        }
    }
}

/// Technical domain the questions are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    #[serde(rename = "SDE")]
    Sde,
    #[serde(rename = "Web Development")]
    WebDevelopment,
    #[serde(rename = "Frontend")]
    Frontend,
    #[serde(rename = "Backend")]
    Backend,
    #[serde(rename = "AI/ML")]
    AiMl,
    #[serde(rename = "Data Science")]
    DataScience,
}

impl Domain {
    pub const ALL: [Domain; 6] = [
        Domain::Sde,
        Domain::WebDevelopment,
        Domain::Frontend,
        Domain::Backend,
        Domain::AiMl,
        Domain::DataScience,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Domain::Sde => "SDE",
            Domain::WebDevelopment => "Web Development",
            Domain::Frontend => "Frontend",
            Domain::Backend => "Backend",
            Domain::AiMl => "AI/ML",
            Domain::DataScience => "Data Science",
        }
    }
}

/// Seniority of the position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[serde(rename = "Entry Level")]
    Entry,
    #[serde(rename = "Mid Level")]
    Mid,
    #[serde(rename = "Senior Level")]
    Senior,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Entry, Level::Mid, Level::Senior];

    pub fn label(self) -> &'static str {
        match self {
            Level::Entry => "Entry Level",
            Level::Mid => "Mid Level",
            Level::Senior => "Senior Level",
        }
    }
}

macro_rules! label_impls {
    ($ty:ident, $err:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $ty {
            type Err = ProfileError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $ty::ALL
                    .into_iter()
                    .find(|v| v.label().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| ProfileError::$err(s.to_string()))
            }
        }
    };
}

label_impls!(Role, UnknownRole);
label_impls!(Domain, UnknownDomain);
label_impls!(Level, UnknownLevel);

/// The immutable {role, domain, level} selection for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Profile {
    pub role: Role,
    pub domain: Domain,
    pub level: Level,
}

impl Profile {
    pub fn new(role: Role, domain: Domain, level: Level) -> Self {
        Self {
            role,
            domain,
            level,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.role, self.domain, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.label().parse::<Role>(), Ok(role));
        }
        for domain in Domain::ALL {
            assert_eq!(domain.label().parse::<Domain>(), Ok(domain));
        }
        for level in Level::ALL {
            assert_eq!(level.label().parse::<Level>(), Ok(level));
        }
    }

    #[test]
    fn test_from_str_is_case_insensitive_and_trims() {
        assert_eq!(" backend developer ".parse::<Role>(), Ok(Role::BackendDeveloper));
        assert_eq!("ai/ml".parse::<Domain>(), Ok(Domain::AiMl));
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        assert_eq!(
            "Astronaut".parse::<Role>(),
            Err(ProfileError::UnknownRole("Astronaut".to_string()))
        );
        assert!("Principal".parse::<Level>().is_err());
    }

    #[test]
    fn test_profile_uses_labels_on_the_wire() {
        let profile = Profile::new(Role::BackendDeveloper, Domain::Backend, Level::Entry);
        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "Backend Developer",
                "domain": "Backend",
                "level": "Entry Level"
            })
        );

        let back: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(back, profile);
    }

    #[test]
    fn test_unknown_label_fails_to_deserialize() {
        let result: Result<Profile, _> = serde_json::from_value(serde_json::json!({
            "role": "Backend Developer",
            "domain": "Quantum",
            "level": "Entry Level"
        }));
        assert!(result.is_err());
    }
}
