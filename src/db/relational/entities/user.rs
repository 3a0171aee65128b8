use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "app_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub notifications_enabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tracked_product::Entity")]
    TrackedProduct,
}

impl Related<super::tracked_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackedProduct.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
