//! Wire types returned by the game API.
//!
//! Only the fields the engine reads are declared; everything else is ignored.

use serde::Deserialize;

use crate::{
    error::game_api::GameApiError,
    model::clan::{
        Clan, ClanMember, ClanRole, ClanWar, RaidMember, RaidSeason, RaidState, WarMember,
        WarState,
    },
    util::time::parse_clash_timestamp,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarResponse {
    pub state: String,
    #[serde(default)]
    pub preparation_start_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub attacks_per_member: Option<i32>,
    #[serde(default)]
    pub clan: Option<WarClanResponse>,
    #[serde(default)]
    pub opponent: Option<WarClanResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarClanResponse {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub members: Vec<WarMemberResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarMemberResponse {
    pub tag: String,
    pub name: String,
    pub townhall_level: i32,
    #[serde(default)]
    pub attacks: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RaidSeasonListResponse {
    #[serde(default)]
    pub items: Vec<RaidSeasonResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidSeasonResponse {
    pub state: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub members: Vec<RaidMemberResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidMemberResponse {
    pub tag: String,
    pub name: String,
    pub attacks: i32,
    pub attack_limit: i32,
    pub bonus_attack_limit: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanResponse {
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub member_list: Vec<ClanMemberResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanMemberResponse {
    pub tag: String,
    pub name: String,
    pub role: ClanRole,
    pub town_hall_level: i32,
}

impl WarResponse {
    /// Converts the wire response into a domain war.
    ///
    /// A `notInWar` response carries no times; it is returned with every time set
    /// to the Unix epoch so callers only need to look at the state.
    pub fn into_war(self, clan_tag: &str) -> Result<ClanWar, GameApiError> {
        let state = match self.state.as_str() {
            "preparation" => WarState::Preparation,
            "inWar" => WarState::InWar,
            "warEnded" => WarState::WarEnded,
            _ => WarState::NotInWar,
        };

        let parse = |value: Option<String>| match value {
            Some(v) => parse_clash_timestamp(&v),
            None if state == WarState::NotInWar => Ok(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH),
            None => Err(GameApiError::InvalidTimestamp(String::new())),
        };

        let clan = self.clan.unwrap_or_else(WarClanResponse::empty);
        let opponent = self.opponent.unwrap_or_else(WarClanResponse::empty);

        Ok(ClanWar {
            state,
            clan_tag: clan.tag.unwrap_or_else(|| clan_tag.to_string()),
            clan_name: clan.name.unwrap_or_default(),
            opponent_tag: opponent.tag.unwrap_or_default(),
            opponent_name: opponent.name.unwrap_or_default(),
            preparation_start_time: parse(self.preparation_start_time)?,
            start_time: parse(self.start_time)?,
            end_time: parse(self.end_time)?,
            attacks_per_member: self.attacks_per_member.unwrap_or(2),
            members: clan
                .members
                .into_iter()
                .map(|m| WarMember {
                    tag: m.tag,
                    name: m.name,
                    town_hall_level: m.townhall_level,
                    attacks_used: m.attacks.len() as i32,
                })
                .collect(),
        })
    }
}

impl WarClanResponse {
    fn empty() -> Self {
        Self {
            tag: None,
            name: None,
            members: Vec::new(),
        }
    }
}

impl RaidSeasonResponse {
    pub fn into_season(self) -> Result<RaidSeason, GameApiError> {
        Ok(RaidSeason {
            state: if self.state == "ongoing" {
                RaidState::Ongoing
            } else {
                RaidState::Ended
            },
            start_time: parse_clash_timestamp(&self.start_time)?,
            end_time: parse_clash_timestamp(&self.end_time)?,
            members: self
                .members
                .into_iter()
                .map(|m| RaidMember {
                    tag: m.tag,
                    name: m.name,
                    attacks: m.attacks,
                    attack_limit: m.attack_limit,
                    bonus_attack_limit: m.bonus_attack_limit,
                })
                .collect(),
        })
    }
}

impl From<ClanResponse> for Clan {
    fn from(response: ClanResponse) -> Self {
        Self {
            tag: response.tag,
            name: response.name,
            members: response
                .member_list
                .into_iter()
                .map(|m| ClanMember {
                    tag: m.tag,
                    name: m.name,
                    role: m.role,
                    town_hall_level: m.town_hall_level,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_war_in_progress() {
        let body = r##"{
            "state": "inWar",
            "teamSize": 15,
            "attacksPerMember": 2,
            "preparationStartTime": "20261015T120000.000Z",
            "startTime": "20261016T110000.000Z",
            "endTime": "20261017T110000.000Z",
            "clan": {
                "tag": "#2PP",
                "name": "Reddit Zulu",
                "members": [
                    {"tag": "#LQ2", "name": "Alice", "townhallLevel": 15, "attacks": [{"stars": 3}]},
                    {"tag": "#PY8", "name": "Bob", "townhallLevel": 13}
                ]
            },
            "opponent": {"tag": "#8QU", "name": "Rival", "members": []}
        }"##;

        let war = serde_json::from_str::<WarResponse>(body)
            .unwrap()
            .into_war("#2PP")
            .unwrap();

        assert_eq!(war.state, WarState::InWar);
        assert_eq!(war.opponent_name, "Rival");
        assert_eq!(war.members.len(), 2);
        assert_eq!(war.members[0].attacks_used, 1);
        assert_eq!(war.members[1].attacks_used, 0);
        assert_eq!(
            war.end_time,
            parse_clash_timestamp("20261017T110000.000Z").unwrap()
        );
    }

    #[test]
    fn decodes_not_in_war_without_times() {
        let war = serde_json::from_str::<WarResponse>(r#"{"state": "notInWar"}"#)
            .unwrap()
            .into_war("#2PP")
            .unwrap();

        assert_eq!(war.state, WarState::NotInWar);
        assert_eq!(war.clan_tag, "#2PP");
    }

    #[test]
    fn decodes_clan_roles() {
        let body = r##"{
            "tag": "#2PP",
            "name": "Reddit Zulu",
            "memberList": [
                {"tag": "#LQ2", "name": "Alice", "role": "admin", "townHallLevel": 15},
                {"tag": "#PY8", "name": "Bob", "role": "coLeader", "townHallLevel": 14}
            ]
        }"##;

        let clan: Clan = serde_json::from_str::<ClanResponse>(body).unwrap().into();

        assert_eq!(clan.members[0].role, ClanRole::Elder);
        assert_eq!(clan.member("#PY8").unwrap().role, ClanRole::CoLeader);
    }
}
