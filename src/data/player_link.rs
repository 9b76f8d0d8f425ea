use std::collections::HashMap;

use chrono::Utc;
use migration::OnConflict;
use sea_orm::{ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::{error::AppError, model::player_link::PlayerLink, util::parse::parse_u64_from_string};

pub struct PlayerLinkRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> PlayerLinkRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Links a player account to a Discord user, replacing any previous link
    ///
    /// # Arguments
    /// - `player_tag`: Normalized player tag
    /// - `user_id`: Discord user ID
    pub async fn upsert(&self, player_tag: &str, user_id: u64) -> Result<PlayerLink, AppError> {
        let model = entity::prelude::PlayerLink::insert(entity::player_link::ActiveModel {
            player_tag: ActiveValue::Set(player_tag.to_string()),
            user_id: ActiveValue::Set(user_id.to_string()),
            created_at: ActiveValue::Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(entity::player_link::Column::PlayerTag)
                .update_columns([
                    entity::player_link::Column::UserId,
                    entity::player_link::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec_with_returning(self.db)
        .await?;

        PlayerLink::from_entity(model)
    }

    /// Removes the link of a player account
    ///
    /// # Returns
    /// - `Ok(true)`: A link was removed
    /// - `Ok(false)`: The player was not linked
    pub async fn delete(&self, player_tag: &str) -> Result<bool, DbErr> {
        let result = entity::prelude::PlayerLink::delete_by_id(player_tag.to_string())
            .exec(self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Looks up the Discord users linked to the given player tags
    ///
    /// # Returns
    /// - `Ok(HashMap)`: Player tag to Discord user ID, unlinked tags absent
    /// - `Err(AppError)`: Database error or unparsable stored user ID
    pub async fn get_user_ids_by_player_tags(
        &self,
        player_tags: &[String],
    ) -> Result<HashMap<String, u64>, AppError> {
        if player_tags.is_empty() {
            return Ok(HashMap::new());
        }

        let models = entity::prelude::PlayerLink::find()
            .filter(entity::player_link::Column::PlayerTag.is_in(player_tags.iter().cloned()))
            .all(self.db)
            .await?;

        models
            .into_iter()
            .map(|model| Ok((model.player_tag, parse_u64_from_string(model.user_id)?)))
            .collect()
    }
}
