use chrono::{DateTime, Utc};

use crate::{error::AppError, util::parse::parse_u64_from_string};

/// A player account linked to a Discord user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLink {
    pub player_tag: String,
    pub user_id: u64,
    pub created_at: DateTime<Utc>,
}

impl PlayerLink {
    pub fn from_entity(entity: entity::player_link::Model) -> Result<Self, AppError> {
        Ok(Self {
            player_tag: entity.player_tag,
            user_id: parse_u64_from_string(entity.user_id)?,
            created_at: entity.created_at,
        })
    }
}
