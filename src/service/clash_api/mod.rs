//! HTTP client for the Clash of Clans API.

pub mod response;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    error::game_api::GameApiError,
    model::clan::{Clan, ClanWar, RaidSeason},
    service::{
        clash_api::response::{ClanResponse, RaidSeasonListResponse, WarResponse},
        game_data::GameDataClient,
    },
};

/// Game API client authenticated with a developer token.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its connection pool.
#[derive(Clone)]
pub struct ClashApiClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ClashApiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// - `client`: Shared HTTP client
    /// - `base_url`: API root such as `https://api.clashofclans.com/v1`
    /// - `token`: Developer API token sent as a bearer token
    pub fn new(client: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Performs a GET request and decodes the JSON body.
    ///
    /// # Returns
    /// - `Ok(Some(T))`: Decoded body
    /// - `Ok(None)`: 404, the clan does not exist
    /// - `Err(GameApiError::Maintenance)`: 503
    /// - `Err(GameApiError::Status)`: Any other non-success status
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>, GameApiError> {
        tracing::debug!("Clash API request {}", path);

        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json::<T>().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            StatusCode::SERVICE_UNAVAILABLE => Err(GameApiError::Maintenance),
            status => Err(GameApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }),
        }
    }
}

/// Builds the path segment for a clan tag, percent-encoding the leading `#`.
fn clan_path(clan_tag: &str, suffix: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(clan_tag.as_bytes()).collect();
    format!("/clans/{}{}", encoded, suffix)
}

#[async_trait]
impl GameDataClient for ClashApiClient {
    async fn current_war(&self, clan_tag: &str) -> Result<Option<ClanWar>, GameApiError> {
        let path = clan_path(clan_tag, "/currentwar");

        match self.get::<WarResponse>(&path, &[]).await {
            Ok(Some(war)) => war.into_war(clan_tag).map(Some),
            Ok(None) => Ok(None),
            Err(GameApiError::Status { status: 403, .. }) => {
                Err(GameApiError::PrivateWarLog(clan_tag.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn current_raid_season(
        &self,
        clan_tag: &str,
    ) -> Result<Option<RaidSeason>, GameApiError> {
        let path = clan_path(clan_tag, "/capitalraidseasons");

        let Some(list) = self
            .get::<RaidSeasonListResponse>(&path, &[("limit", "1")])
            .await?
        else {
            return Ok(None);
        };

        list.items
            .into_iter()
            .next()
            .map(|season| season.into_season())
            .transpose()
    }

    async fn clan(&self, clan_tag: &str) -> Result<Option<Clan>, GameApiError> {
        let path = clan_path(clan_tag, "");
        Ok(self
            .get::<ClanResponse>(&path, &[])
            .await?
            .map(Clan::from))
    }
}
