//! Live clan state returned by the game-data collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clan role as reported by the game API.
///
/// The API calls elders `admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClanRole {
    #[serde(rename = "member")]
    Member,
    #[serde(rename = "admin")]
    Elder,
    #[serde(rename = "coLeader")]
    CoLeader,
    #[serde(rename = "leader")]
    Leader,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanMember {
    pub tag: String,
    pub name: String,
    pub role: ClanRole,
    pub town_hall_level: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clan {
    pub tag: String,
    pub name: String,
    pub members: Vec<ClanMember>,
}

impl Clan {
    pub fn member(&self, tag: &str) -> Option<&ClanMember> {
        self.members.iter().find(|m| m.tag == tag)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarState {
    NotInWar,
    Preparation,
    InWar,
    WarEnded,
}

impl WarState {
    pub fn is_active(&self) -> bool {
        matches!(self, WarState::Preparation | WarState::InWar)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarMember {
    pub tag: String,
    pub name: String,
    pub town_hall_level: i32,
    pub attacks_used: i32,
}

/// The clan's current war from its own side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClanWar {
    pub state: WarState,
    pub clan_tag: String,
    pub clan_name: String,
    pub opponent_tag: String,
    pub opponent_name: String,
    pub preparation_start_time: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attacks_per_member: i32,
    pub members: Vec<WarMember>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaidState {
    Ongoing,
    Ended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidMember {
    pub tag: String,
    pub name: String,
    pub attacks: i32,
    pub attack_limit: i32,
    pub bonus_attack_limit: i32,
}

impl RaidMember {
    pub fn remaining_attacks(&self) -> i32 {
        (self.attack_limit + self.bonus_attack_limit - self.attacks).max(0)
    }
}

/// The clan's most recent capital raid season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidSeason {
    pub state: RaidState,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Only members who raided at least once appear here
    pub members: Vec<RaidMember>,
}
