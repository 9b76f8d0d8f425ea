use crate::{data::player_link::PlayerLinkRepository, error::AppError};
use test_utils::{builder::TestBuilder, factory};

mod get_user_ids_by_player_tags;
mod upsert;
