use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rule_health")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub rule_id: i32,
    /// One of `failing`, `broken`
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub last_error: String,
    pub consecutive_failures: i32,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::reminder_rule::Entity",
        from = "Column::RuleId",
        to = "super::reminder_rule::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    ReminderRule,
}

impl Related<super::reminder_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReminderRule.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
