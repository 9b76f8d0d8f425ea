use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reminder_rule")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    /// One of `war`, `raid`, `clan_games`
    pub kind: String,
    /// JSON array of normalized clan tags
    pub clan_tags: Json,
    /// JSON array of lead times in seconds, in display order
    pub lead_times: Json,
    pub channel_id: String,
    pub webhook_id: Option<String>,
    pub webhook_token: Option<String>,
    pub thread_id: Option<String>,
    pub town_hall_min: Option<i32>,
    pub town_hall_max: Option<i32>,
    pub linked_only: bool,
    /// JSON array of clan roles allowed to be reminded, empty means all
    pub roles: Json,
    pub min_remaining_attacks: Option<i32>,
    #[sea_orm(column_type = "Text")]
    pub message_template: String,
    pub disabled: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::rule_health::Entity")]
    RuleHealth,
}

impl Related<super::rule_health::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RuleHealth.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
