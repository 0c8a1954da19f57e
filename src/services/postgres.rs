use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::models::{
    DailyRhythm, Match, MatchStatus, MutualSkill, PersonalityType, SkillEntry, User,
};
use crate::services::store::{Store, StoreError};

/// PostgreSQL store backend
///
/// Owns the `users`, `matches`, and `conversations` tables. Skill lists
/// and mutual-skill payloads live in JSONB columns; pair lookups run both
/// orientations in one OR filter.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run pending migrations.
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Unavailable(format!("migration failed: {}", e)))?;

        Ok(Self { pool })
    }

    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        _acquire_timeout_secs: Option<u64>,
        _idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

const USER_COLUMNS: &str =
    "id, name, bio, teach_skills, learn_skills, personality_type, daily_rhythm, created_at";

const MATCH_COLUMNS: &str =
    "id, user_a_id, user_b_id, score, mutual_skills, status, chat_enabled, conversation_id, created_at";

#[async_trait]
impl Store for PostgresStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn list_candidates(&self, user_id: &str) -> Result<Vec<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE id <> $1 ORDER BY id",
            USER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        let candidates: Result<Vec<User>, StoreError> =
            rows.iter().map(row_to_user).collect();
        let candidates = candidates?;

        tracing::debug!("loaded {} candidates for {}", candidates.len(), user_id);

        Ok(candidates)
    }

    async fn find_match_between(
        &self,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<Option<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches \
             WHERE (user_a_id = $1 AND user_b_id = $2) \
                OR (user_a_id = $2 AND user_b_id = $1) \
             LIMIT 1",
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_a_id)
            .bind(user_b_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| row_to_match(&r)).transpose()
    }

    async fn insert_match(&self, record: &Match) -> Result<(), StoreError> {
        let mutual = serde_json::to_value(&record.mutual_skills)?;

        sqlx::query(
            r#"
            INSERT INTO matches
                (id, user_a_id, user_b_id, score, mutual_skills, status, chat_enabled, conversation_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            "#,
        )
        .bind(&record.id)
        .bind(&record.user_a_id)
        .bind(&record.user_b_id)
        .bind(record.score)
        .bind(mutual)
        .bind(status_text(record.status))
        .bind(record.chat_enabled)
        .bind(&record.conversation_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            "inserted match {} ({} / {})",
            record.id,
            record.user_a_id,
            record.user_b_id
        );

        Ok(())
    }

    async fn matches_for_user(&self, user_id: &str) -> Result<Vec<Match>, StoreError> {
        let query = format!(
            "SELECT {} FROM matches \
             WHERE user_a_id = $1 OR user_b_id = $1 \
             ORDER BY created_at DESC",
            MATCH_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_match).collect()
    }

    async fn create_conversation(
        &self,
        conversation_id: &str,
        user_a_id: &str,
        user_b_id: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id, user_a_id, user_b_id, created_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(conversation_id)
        .bind(user_a_id)
        .bind(user_b_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<User, StoreError> {
    let teach: Value = row.get("teach_skills");
    let learn: Value = row.get("learn_skills");
    let teach_skills: Vec<SkillEntry> = serde_json::from_value(teach)?;
    let learn_skills: Vec<SkillEntry> = serde_json::from_value(learn)?;

    Ok(User {
        user_id: row.get("id"),
        name: row.get("name"),
        bio: row.get("bio"),
        teach_skills,
        learn_skills,
        personality_type: parse_variant::<PersonalityType>(row.get("personality_type")),
        daily_rhythm: parse_variant::<DailyRhythm>(row.get("daily_rhythm")),
        created_at: row.get("created_at"),
    })
}

fn row_to_match(row: &PgRow) -> Result<Match, StoreError> {
    let mutual: Value = row.get("mutual_skills");
    let mutual_skills: Vec<MutualSkill> = serde_json::from_value(mutual)?;

    Ok(Match {
        id: row.get("id"),
        user_a_id: row.get("user_a_id"),
        user_b_id: row.get("user_b_id"),
        score: row.get("score"),
        mutual_skills,
        status: parse_variant::<MatchStatus>(Some(row.get("status")))
            .unwrap_or(MatchStatus::Pending),
        chat_enabled: row.get("chat_enabled"),
        conversation_id: row.get("conversation_id"),
        created_at: row.get("created_at"),
    })
}

/// Decode a TEXT column holding a serde-renamed enum variant. Unknown or
/// null values decode to `None`.
fn parse_variant<T: serde::de::DeserializeOwned>(text: Option<String>) -> Option<T> {
    text.and_then(|value| serde_json::from_value(Value::String(value)).ok())
}

fn status_text(status: MatchStatus) -> &'static str {
    match status {
        MatchStatus::Pending => "pending",
        MatchStatus::Active => "active",
        MatchStatus::Completed => "completed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variant_roundtrip() {
        assert_eq!(
            parse_variant::<PersonalityType>(Some("introvert".to_string())),
            Some(PersonalityType::Introvert)
        );
        assert_eq!(
            parse_variant::<DailyRhythm>(Some("early_bird".to_string())),
            Some(DailyRhythm::EarlyBird)
        );
        assert_eq!(parse_variant::<PersonalityType>(None), None);
        assert_eq!(
            parse_variant::<PersonalityType>(Some("ambivert".to_string())),
            None
        );
    }

    #[test]
    fn test_status_text_matches_serde_rename() {
        for status in [MatchStatus::Pending, MatchStatus::Active, MatchStatus::Completed] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json.as_str().unwrap(), status_text(status));
        }
    }
}
