//! `LearnerProfile` repository: one row per user, the aggregate view the
//! progress endpoint reads.

use sqlx::{Pool, Sqlite};
use wall_e_learning::LearnerProfile;
use wall_e_types::UserId;

use crate::error::StorageError;

pub struct ProfileRepository<'a> {
    pool: &'a Pool<Sqlite>,
}

impl<'a> ProfileRepository<'a> {
    pub fn new(pool: &'a Pool<Sqlite>) -> Self {
        ProfileRepository { pool }
    }

    pub async fn get_or_default(&self, user_id: UserId) -> Result<LearnerProfile, StorageError> {
        let row: Option<Row> = sqlx::query_as(
            "SELECT games_played, tactical_rating, positional_rating, endgame_rating,
                    opening_rating, improvement_rate, strengths, weaknesses, play_style, milestones
             FROM learner_profiles WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Row::into_model).unwrap_or_default())
    }

    pub async fn upsert(&self, user_id: UserId, profile: &LearnerProfile) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO learner_profiles (
                user_id, games_played, tactical_rating, positional_rating, endgame_rating,
                opening_rating, improvement_rate, strengths, weaknesses, play_style, milestones
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                games_played = excluded.games_played,
                tactical_rating = excluded.tactical_rating,
                positional_rating = excluded.positional_rating,
                endgame_rating = excluded.endgame_rating,
                opening_rating = excluded.opening_rating,
                improvement_rate = excluded.improvement_rate,
                strengths = excluded.strengths,
                weaknesses = excluded.weaknesses,
                play_style = excluded.play_style,
                milestones = excluded.milestones",
        )
        .bind(user_id.to_string())
        .bind(profile.games_played as i64)
        .bind(profile.tactical_rating)
        .bind(profile.positional_rating)
        .bind(profile.endgame_rating)
        .bind(profile.opening_rating)
        .bind(profile.improvement_rate)
        .bind(serde_json::to_string(&profile.strengths).unwrap_or_default())
        .bind(serde_json::to_string(&profile.weaknesses).unwrap_or_default())
        .bind(&profile.play_style)
        .bind(serde_json::to_string(&profile.milestones).unwrap_or_default())
        .execute(self.pool)
        .await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct Row {
    games_played: i64,
    tactical_rating: f64,
    positional_rating: f64,
    endgame_rating: f64,
    opening_rating: f64,
    improvement_rate: f64,
    strengths: String,
    weaknesses: String,
    play_style: String,
    milestones: String,
}

impl Row {
    fn into_model(self) -> LearnerProfile {
        LearnerProfile {
            games_played: self.games_played as u32,
            tactical_rating: self.tactical_rating,
            positional_rating: self.positional_rating,
            endgame_rating: self.endgame_rating,
            opening_rating: self.opening_rating,
            improvement_rate: self.improvement_rate,
            strengths: serde_json::from_str(&self.strengths).unwrap_or_default(),
            weaknesses: serde_json::from_str(&self.weaknesses).unwrap_or_default(),
            play_style: self.play_style,
            milestones: serde_json::from_str(&self.milestones).unwrap_or_default(),
        }
    }
}
