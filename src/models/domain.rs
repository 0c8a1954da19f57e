use serde::{Deserialize, Serialize};

/// Self-declared proficiency on a skill entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

/// One entry in a user's teach or learn list.
///
/// Names are compared case-insensitively; categories are compared as exact
/// strings. Duplicate names may coexist within a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub proficiency: Proficiency,
}

impl SkillEntry {
    pub fn new(name: &str, category: Option<&str>, proficiency: Proficiency) -> Self {
        Self {
            name: name.to_string(),
            category: category.map(str::to_string),
            proficiency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityType {
    Introvert,
    Extrovert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyRhythm {
    EarlyBird,
    NightOwl,
}

/// User profile as stored in the `users` table.
///
/// Mutated by profile-update operations elsewhere; the matching engine
/// treats it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "teachSkills", default)]
    pub teach_skills: Vec<SkillEntry>,
    #[serde(rename = "learnSkills", default)]
    pub learn_skills: Vec<SkillEntry>,
    #[serde(rename = "personalityType", default)]
    pub personality_type: Option<PersonalityType>,
    #[serde(rename = "dailyRhythm", default)]
    pub daily_rhythm: Option<DailyRhythm>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Qualitative profile scores from the external analyzer.
///
/// Derived and ephemeral; lives only in the analysis cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileAnalysis {
    pub teaching_expertise: f64,
    pub learning_clarity: f64,
    pub profile_quality: f64,
    #[serde(default)]
    pub reciprocal_potential: Vec<String>,
}

/// Which side of the pairing teaches a mutual skill, relative to the
/// requesting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillDirection {
    YouTeach,
    TheyTeach,
}

/// A skill that one side teaches and the other wants to learn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutualSkill {
    pub skill: String,
    pub teacher: String,
    pub learner: String,
    pub direction: SkillDirection,
    #[serde(rename = "teacherId")]
    pub teacher_id: String,
    #[serde(rename = "learnerId")]
    pub learner_id: String,
}

/// Score breakdown for a scored pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PairScores {
    #[serde(rename = "aToB")]
    pub a_to_b: f64,
    #[serde(rename = "bToA")]
    pub b_to_a: f64,
    pub personality: f64,
    #[serde(rename = "final")]
    pub final_score: f64,
}

/// One scored candidate pairing, transient per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub scores: PairScores,
    #[serde(rename = "mutualSkills")]
    pub mutual_skills: Vec<MutualSkill>,
}

impl MatchCandidate {
    pub fn has_mutual_skills(&self) -> bool {
        !self.mutual_skills.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Active,
    Completed,
}

/// Persisted match record from the `matches` table.
///
/// Status transitions happen outside this crate; records are never
/// auto-deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    #[serde(rename = "userAId")]
    pub user_a_id: String,
    #[serde(rename = "userBId")]
    pub user_b_id: String,
    pub score: f64,
    #[serde(rename = "mutualSkills", default)]
    pub mutual_skills: Vec<MutualSkill>,
    pub status: MatchStatus,
    #[serde(rename = "chatEnabled")]
    pub chat_enabled: bool,
    #[serde(rename = "conversationId", default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Match {
    /// The endpoint of this match that is not `user_id`.
    pub fn other_user<'a>(&'a self, user_id: &str) -> &'a str {
        if self.user_a_id == user_id {
            &self.user_b_id
        } else {
            &self.user_a_id
        }
    }

    pub fn touches(&self, user_id: &str) -> bool {
        self.user_a_id == user_id || self.user_b_id == user_id
    }

    /// Unordered-pair key for this match's endpoints.
    pub fn pair_key(&self) -> String {
        pair_key(&self.user_a_id, &self.user_b_id)
    }
}

/// Order-independent key for a user pair. Both orientations of the same
/// pair map to the same key.
pub fn pair_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{}:{}", lo, hi)
}

/// One edge of the connection graph, annotated with the BFS depth at which
/// it was first discovered (1 = direct connection of the start user).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionEdge {
    #[serde(rename = "connectionId")]
    pub connection_id: String,
    #[serde(rename = "userAId")]
    pub user_a_id: String,
    #[serde(rename = "userBId")]
    pub user_b_id: String,
    #[serde(rename = "userAName")]
    pub user_a_name: String,
    #[serde(rename = "userBName")]
    pub user_b_name: String,
    pub depth: u32,
}

/// Weights for the composite match score.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub skills: f64,
    pub personality: f64,
    pub qualitative: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            skills: 0.5,
            personality: 0.2,
            qualitative: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
        assert_eq!(pair_key("alice", "bob"), "alice:bob");
    }

    #[test]
    fn test_match_other_user() {
        let record = Match {
            id: "m1".to_string(),
            user_a_id: "alice".to_string(),
            user_b_id: "bob".to_string(),
            score: 0.5,
            mutual_skills: vec![],
            status: MatchStatus::Pending,
            chat_enabled: true,
            conversation_id: None,
            created_at: None,
        };

        assert_eq!(record.other_user("alice"), "bob");
        assert_eq!(record.other_user("bob"), "alice");
        assert!(record.touches("alice"));
        assert!(!record.touches("carol"));
    }

    #[test]
    fn test_user_deserializes_with_defaults() {
        let user: User = serde_json::from_str(r#"{"userId": "u1", "name": "U1"}"#).unwrap();
        assert!(user.bio.is_empty());
        assert!(user.teach_skills.is_empty());
        assert!(user.personality_type.is_none());
    }

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert_eq!(weights.skills, 0.5);
        assert_eq!(weights.personality, 0.2);
        assert_eq!(weights.qualitative, 0.3);
    }
}
