//! Game-data collaborator consumed by the reminder engine.

use async_trait::async_trait;

use crate::{
    error::game_api::GameApiError,
    model::clan::{Clan, ClanWar, RaidSeason},
};

/// Read access to live clan state.
///
/// Implemented by [`crate::service::clash_api::ClashApiClient`] in production and
/// mocked in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameDataClient: Send + Sync {
    /// Current regular war of a clan.
    ///
    /// # Returns
    /// - `Ok(Some(ClanWar))`: The clan's current war, in any state
    /// - `Ok(None)`: Clan not found
    /// - `Err(GameApiError::PrivateWarLog)`: The clan hides its war log
    async fn current_war(&self, clan_tag: &str) -> Result<Option<ClanWar>, GameApiError>;

    /// Most recent capital raid season of a clan, ongoing or ended.
    async fn current_raid_season(&self, clan_tag: &str)
        -> Result<Option<RaidSeason>, GameApiError>;

    /// Clan profile with its member list.
    async fn clan(&self, clan_tag: &str) -> Result<Option<Clan>, GameApiError>;
}
