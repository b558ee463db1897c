use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::blank_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeRange {
    #[serde(rename = "18-24")]
    From18To24,
    #[serde(rename = "25-34")]
    From25To34,
    #[serde(rename = "35-44")]
    From35To44,
    #[serde(rename = "45-54")]
    From45To54,
    #[serde(rename = "55+")]
    Over55,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    Single,
    Dating,
    Relationship,
    Married,
    Complicated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingGoal {
    Improve,
    Solve,
    Understand,
    Find,
}

impl CoachingGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachingGoal::Improve => "improve",
            CoachingGoal::Solve => "solve",
            CoachingGoal::Understand => "understand",
            CoachingGoal::Find => "find",
        }
    }
}

/// The single local user. Persisted under `userData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub user_name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_age: Option<AgeRange>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub user_gender: Option<Gender>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub relationship_status: Option<RelationshipStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub coaching_goal: Option<CoachingGoal>,
    /// Fixed on first launch, never changed afterwards.
    #[serde(default = "Utc::now")]
    pub registration_date: DateTime<Utc>,
}

impl Profile {
    pub fn empty(registration_date: DateTime<Utc>) -> Self {
        Self {
            user_name: String::new(),
            user_age: None,
            user_gender: None,
            relationship_status: None,
            coaching_goal: None,
            registration_date,
        }
    }

    pub fn has_user_name(&self) -> bool {
        !self.user_name.trim().is_empty()
    }

    pub fn has_personal_info(&self) -> bool {
        self.user_age.is_some()
            && self.user_gender.is_some()
            && self.relationship_status.is_some()
            && self.coaching_goal.is_some()
    }
}

/// Fields the profile-edit flow may change. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub user_age: Option<AgeRange>,
    pub user_gender: Option<Gender>,
    pub relationship_status: Option<RelationshipStatus>,
    pub coaching_goal: Option<CoachingGoal>,
}

impl ProfileUpdate {
    pub fn apply_to(&self, profile: &mut Profile) {
        if let Some(name) = &self.user_name {
            profile.user_name = name.trim().to_string();
        }
        if let Some(age) = self.user_age {
            profile.user_age = Some(age);
        }
        if let Some(gender) = self.user_gender {
            profile.user_gender = Some(gender);
        }
        if let Some(status) = self.relationship_status {
            profile.relationship_status = Some(status);
        }
        if let Some(goal) = self.coaching_goal {
            profile.coaching_goal = Some(goal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_blank_fields_read_as_unset() {
        let raw = r#"{
            "userName": "Deniz",
            "userAge": "",
            "userGender": "female",
            "relationshipStatus": "",
            "coachingGoal": "improve",
            "registrationDate": "2024-05-01T10:00:00Z"
        }"#;
        let profile: Profile = serde_json::from_str(raw).unwrap();
        assert_eq!(profile.user_age, None);
        assert_eq!(profile.user_gender, Some(Gender::Female));
        assert_eq!(profile.coaching_goal, Some(CoachingGoal::Improve));
        assert!(!profile.has_personal_info());
    }

    #[test]
    fn test_age_range_wire_names() {
        assert_eq!(serde_json::to_string(&AgeRange::Over55).unwrap(), "\"55+\"");
        let parsed: AgeRange = serde_json::from_str("\"25-34\"").unwrap();
        assert_eq!(parsed, AgeRange::From25To34);
    }

    #[test]
    fn test_update_leaves_unset_fields_alone() {
        let mut profile = Profile::empty(Utc::now());
        profile.user_name = "Ada".into();
        profile.coaching_goal = Some(CoachingGoal::Find);

        ProfileUpdate {
            user_name: Some("  Ada L. ".into()),
            user_age: Some(AgeRange::From35To44),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.user_name, "Ada L.");
        assert_eq!(profile.user_age, Some(AgeRange::From35To44));
        assert_eq!(profile.coaching_goal, Some(CoachingGoal::Find));
    }
}
