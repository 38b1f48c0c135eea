//! User interest profile and the registration sequence that fills it.
//!
//! Registration asks for a fixed, ordered list of fields. [`RegistrationFlow`]
//! walks that list as a state machine: each accepted answer moves to the next
//! field until the profile is complete. The finished profile supplies the
//! interest text for [`crate::interest::match_events`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A field collected during registration, in asking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Country,
    City,
    Interests,
    LanguageLevel,
}

impl ProfileField {
    /// All fields in the order they are asked.
    pub const ORDER: [ProfileField; 5] = [
        Self::Name,
        Self::Country,
        Self::City,
        Self::Interests,
        Self::LanguageLevel,
    ];

    /// Returns the first field of the sequence.
    pub fn first() -> Self {
        Self::ORDER[0]
    }

    /// Returns the field asked after this one.
    pub fn next(self) -> Option<Self> {
        let idx = Self::ORDER.iter().position(|f| *f == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Returns the config key for this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Country => "country",
            Self::City => "city",
            Self::Interests => "interests",
            Self::LanguageLevel => "language_level",
        }
    }

    /// Returns the question shown to the user.
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::Name => "What's your name?",
            Self::Country => "What country are you from?",
            Self::City => "Which city do you live in?",
            Self::Interests => "What are your interests? (e.g. music, sports, culture)",
            Self::LanguageLevel => "What is your language level? (e.g. A1, B2, C1)",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while filling a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// The answer was blank.
    #[error("answer for {field} must not be empty")]
    EmptyAnswer { field: ProfileField },

    /// Every field has already been answered.
    #[error("registration is already complete")]
    AlreadyComplete,
}

/// Free-text profile supplied by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserInterestProfile {
    pub name: String,
    pub country: String,
    pub city: String,
    /// Comma-separated interests, e.g. `"music, art"`.
    pub interests: String,
    pub language_level: String,
}

impl UserInterestProfile {
    /// Returns the text used for interest matching.
    pub fn interest_text(&self) -> &str {
        &self.interests
    }

    /// Returns the value stored for `field`.
    pub fn get(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Country => &self.country,
            ProfileField::City => &self.city,
            ProfileField::Interests => &self.interests,
            ProfileField::LanguageLevel => &self.language_level,
        }
    }

    fn set(&mut self, field: ProfileField, value: String) {
        let slot = match field {
            ProfileField::Name => &mut self.name,
            ProfileField::Country => &mut self.country,
            ProfileField::City => &mut self.city,
            ProfileField::Interests => &mut self.interests,
            ProfileField::LanguageLevel => &mut self.language_level,
        };
        *slot = value;
    }

    /// Returns the first field that still has no value.
    pub fn first_missing(&self) -> Option<ProfileField> {
        ProfileField::ORDER
            .into_iter()
            .find(|f| self.get(*f).trim().is_empty())
    }

    /// Returns true when every field has a value.
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }
}

/// Where the registration sequence currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationState {
    /// Waiting for an answer to this field.
    Awaiting(ProfileField),
    /// All fields answered.
    Complete,
}

/// State machine over [`ProfileField::ORDER`].
#[derive(Debug, Clone)]
pub struct RegistrationFlow {
    state: RegistrationState,
    profile: UserInterestProfile,
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationFlow {
    /// Starts a registration from scratch.
    pub fn new() -> Self {
        Self {
            state: RegistrationState::Awaiting(ProfileField::first()),
            profile: UserInterestProfile::default(),
        }
    }

    /// Resumes a partially filled profile at its first missing field.
    pub fn resume(profile: UserInterestProfile) -> Self {
        let state = match profile.first_missing() {
            Some(field) => RegistrationState::Awaiting(field),
            None => RegistrationState::Complete,
        };
        Self { state, profile }
    }

    /// Returns the current state.
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Returns the field awaiting an answer, if any.
    pub fn current_field(&self) -> Option<ProfileField> {
        match self.state {
            RegistrationState::Awaiting(field) => Some(field),
            RegistrationState::Complete => None,
        }
    }

    /// Returns true once every field is answered.
    pub fn is_complete(&self) -> bool {
        self.state == RegistrationState::Complete
    }

    /// Records an answer for the current field and advances.
    ///
    /// Already-filled fields after the current one are skipped, so a resumed
    /// flow only asks for what is missing.
    pub fn submit(&mut self, answer: &str) -> Result<RegistrationState, ProfileError> {
        let field = self.current_field().ok_or(ProfileError::AlreadyComplete)?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(ProfileError::EmptyAnswer { field });
        }
        self.profile.set(field, answer.to_string());

        let mut next = field.next();
        while let Some(candidate) = next {
            if self.profile.get(candidate).trim().is_empty() {
                break;
            }
            next = candidate.next();
        }

        self.state = match next {
            Some(field) => RegistrationState::Awaiting(field),
            None => RegistrationState::Complete,
        };
        Ok(self.state)
    }

    /// Returns the profile collected so far.
    pub fn profile(&self) -> &UserInterestProfile {
        &self.profile
    }

    /// Returns the profile if registration is complete.
    pub fn finish(self) -> Option<UserInterestProfile> {
        self.is_complete().then_some(self.profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_order_is_fixed() {
        assert_eq!(ProfileField::first(), ProfileField::Name);
        assert_eq!(ProfileField::Name.next(), Some(ProfileField::Country));
        assert_eq!(ProfileField::City.next(), Some(ProfileField::Interests));
        assert_eq!(ProfileField::LanguageLevel.next(), None);
    }

    #[test]
    fn flow_walks_every_field() {
        let mut flow = RegistrationFlow::new();
        let answers = ["Ana", "Spain", "Ekaterinburg", "music, art", "B1"];

        for (i, answer) in answers.iter().enumerate() {
            assert_eq!(flow.current_field(), Some(ProfileField::ORDER[i]));
            flow.submit(answer).unwrap();
        }

        assert!(flow.is_complete());
        let profile = flow.finish().unwrap();
        assert_eq!(profile.interest_text(), "music, art");
        assert_eq!(profile.language_level, "B1");
    }

    #[test]
    fn blank_answer_keeps_state() {
        let mut flow = RegistrationFlow::new();
        let err = flow.submit("  ").unwrap_err();
        assert_eq!(
            err,
            ProfileError::EmptyAnswer {
                field: ProfileField::Name
            }
        );
        assert_eq!(flow.current_field(), Some(ProfileField::Name));
    }

    #[test]
    fn submit_after_complete_fails() {
        let mut flow = RegistrationFlow::resume(UserInterestProfile {
            name: "Li".into(),
            country: "China".into(),
            city: "Moscow".into(),
            interests: "tour".into(),
            language_level: "A2".into(),
        });
        assert!(flow.is_complete());
        assert_eq!(flow.submit("x"), Err(ProfileError::AlreadyComplete));
    }

    #[test]
    fn resume_skips_answered_fields() {
        let mut flow = RegistrationFlow::resume(UserInterestProfile {
            name: "Li".into(),
            city: "Moscow".into(),
            ..Default::default()
        });
        assert_eq!(flow.current_field(), Some(ProfileField::Country));

        let state = flow.submit("China").unwrap();
        assert_eq!(state, RegistrationState::Awaiting(ProfileField::Interests));
    }

    #[test]
    fn unfinished_flow_has_no_profile() {
        let mut flow = RegistrationFlow::new();
        flow.submit("Ana").unwrap();
        assert_eq!(flow.profile().name, "Ana");
        assert!(flow.finish().is_none());
    }
}
