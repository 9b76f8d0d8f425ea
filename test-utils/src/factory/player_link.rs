//! Player link factory for creating test player/Discord user links.

use crate::factory::helpers::next_snowflake;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection, DbErr};

/// Factory for creating player links with customizable fields.
///
/// # Example
///
/// ```rust,ignore
/// use test_utils::factory::player_link::PlayerLinkFactory;
///
/// let link = PlayerLinkFactory::new(&db, "#LQ2").user_id("123").build().await?;
/// ```
pub struct PlayerLinkFactory<'a> {
    db: &'a DatabaseConnection,
    player_tag: String,
    user_id: String,
}

impl<'a> PlayerLinkFactory<'a> {
    /// Creates a new PlayerLinkFactory linking `player_tag` to a unique user ID.
    pub fn new(db: &'a DatabaseConnection, player_tag: impl Into<String>) -> Self {
        Self {
            db,
            player_tag: player_tag.into(),
            user_id: next_snowflake(),
        }
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Builds and inserts the player link entity into the database.
    ///
    /// # Returns
    /// - `Ok(entity::player_link::Model)` - Created link entity
    /// - `Err(DbErr)` - Database error during insert
    pub async fn build(self) -> Result<entity::player_link::Model, DbErr> {
        entity::player_link::ActiveModel {
            player_tag: ActiveValue::Set(self.player_tag),
            user_id: ActiveValue::Set(self.user_id),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(self.db)
        .await
    }
}

/// Links a player tag to the given Discord user.
pub async fn create_player_link(
    db: &DatabaseConnection,
    player_tag: &str,
    user_id: &str,
) -> Result<entity::player_link::Model, DbErr> {
    PlayerLinkFactory::new(db, player_tag)
        .user_id(user_id)
        .build()
        .await
}
