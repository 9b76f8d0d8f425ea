use sea_orm::entity::prelude::*;

/// Player account linked to a Discord user by the command layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "player_link")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_tag: String,
    pub user_id: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
