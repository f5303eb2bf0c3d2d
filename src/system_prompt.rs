//! Interviewer system prompt
//!
//! The prompt is a fixed template parameterized only by the candidate's
//! profile, so the same profile always yields byte-identical text.

use crate::profile::Profile;

/// Behavioural instructions appended after the profile header
const INTERVIEWER_GUIDELINES: &str = "\
Greet the candidate only on the very first turn and make them comfortable.
Your job is to ask relevant interview questions for this role, domain and level, \
give hints, and share model answers when the candidate asks for them.
Keep it interactive, professional, and focused on interview preparation.
When the candidate has answered a question well enough, move on to the next question.";

/// Build the system prompt for an interview with the given profile
pub fn build_system_prompt(profile: &Profile) -> String {
    format!(
        "You are an Interview Bot for a {role} candidate.\n\
         Domain: {domain}\n\
         Level: {level}\n\
         {INTERVIEWER_GUIDELINES}",
        role = profile.role,
        domain = profile.domain,
        level = profile.level,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Domain, Level, Role};

    #[test]
    fn test_prompt_mentions_profile() {
        let profile = Profile::new(Role::DataScientist, Domain::DataScience, Level::Senior);
        let prompt = build_system_prompt(&profile);

        assert!(prompt.starts_with("You are an Interview Bot for a Data Scientist candidate.\n"));
        assert!(prompt.contains("Domain: Data Science\n"));
        assert!(prompt.contains("Level: Senior Level\n"));
        assert!(prompt.contains("only on the very first turn"));
        assert!(prompt.contains("hints"));
        assert!(prompt.contains("next question"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let profile = Profile::new(Role::WebDeveloper, Domain::Frontend, Level::Mid);
        assert_eq!(build_system_prompt(&profile), build_system_prompt(&profile));
    }

    #[test]
    fn test_prompt_differs_per_profile() {
        let a = Profile::new(Role::WebDeveloper, Domain::Frontend, Level::Mid);
        let b = Profile::new(Role::WebDeveloper, Domain::Frontend, Level::Entry);
        assert_ne!(build_system_prompt(&a), build_system_prompt(&b));
    }
}
