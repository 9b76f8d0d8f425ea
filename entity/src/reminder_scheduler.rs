use sea_orm::entity::prelude::*;

/// One-shot trigger for a single (rule, clan, event instance, lead time).
///
/// Rows are never deleted by the engine. `triggered` flips from `false` to
/// `true` exactly once through a conditional update.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reminder_scheduler")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub guild_id: String,
    pub rule_id: i32,
    pub clan_tag: String,
    pub instance_key: String,
    pub kind: String,
    pub lead_time_secs: i64,
    pub end_time: DateTimeUtc,
    pub fire_at: DateTimeUtc,
    pub triggered: bool,
    pub triggered_at: Option<DateTimeUtc>,
    pub skipped: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
