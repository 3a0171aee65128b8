pub mod entities;

use crate::data_models::Currency;
use crate::db::errors::DBError;
use crate::db::product::TrackedProduct;
use crate::db::user::User;
use entities::{prelude::*, *};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Schema, Set,
};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RelationalDB {
    pub connection: DatabaseConnection,
}

impl RelationalDB {
    pub fn init(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Creates the tables when they are missing. Safe to call on every start.
    pub async fn create_schema(&self) -> Result<(), DBError> {
        let backend = self.connection.get_database_backend();
        let schema = Schema::new(backend);
        let users_table = schema
            .create_table_from_entity(Users)
            .if_not_exists()
            .to_owned();
        let products_table = schema
            .create_table_from_entity(TrackedProducts)
            .if_not_exists()
            .to_owned();
        self.connection.execute(backend.build(&users_table)).await?;
        self.connection
            .execute(backend.build(&products_table))
            .await?;
        Ok(())
    }

    pub async fn all_users(&self) -> Result<Vec<User>, DBError> {
        let users = Users::find()
            .order_by_asc(user::Column::Name)
            .all(&self.connection)
            .await?;
        users.into_iter().map(User::try_from).collect()
    }

    pub async fn get_user_by(&self, id: Uuid) -> Result<User, DBError> {
        let user = Users::find_by_id(id.to_string())
            .one(&self.connection)
            .await?;
        match user {
            None => Err(DBError::UnknownUser),
            Some(user) => User::try_from(user),
        }
    }

    pub async fn save_user(&self, user: &User) -> Result<(), DBError> {
        let model = user::ActiveModel::from(user);
        let stored = Users::find_by_id(user.id.to_string())
            .one(&self.connection)
            .await?;
        match stored {
            Some(_) => model.update(&self.connection).await?,
            None => model.insert(&self.connection).await?,
        };
        Ok(())
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), DBError> {
        TrackedProducts::delete_many()
            .filter(tracked_product::Column::UserId.eq(id.to_string()))
            .exec(&self.connection)
            .await?;
        let result = Users::delete_by_id(id.to_string())
            .exec(&self.connection)
            .await?;
        if result.rows_affected == 0 {
            return Err(DBError::UnknownUser);
        }
        Ok(())
    }

    pub async fn all_products(&self) -> Result<Vec<TrackedProduct>, DBError> {
        let products = TrackedProducts::find()
            .order_by_asc(tracked_product::Column::Name)
            .all(&self.connection)
            .await?;
        products.into_iter().map(TrackedProduct::try_from).collect()
    }

    pub async fn products_for(&self, user_id: Uuid) -> Result<Vec<TrackedProduct>, DBError> {
        let products = TrackedProducts::find()
            .filter(tracked_product::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(tracked_product::Column::Name)
            .all(&self.connection)
            .await?;
        products.into_iter().map(TrackedProduct::try_from).collect()
    }

    pub async fn get_product_by(&self, id: Uuid) -> Result<TrackedProduct, DBError> {
        let product = TrackedProducts::find_by_id(id.to_string())
            .one(&self.connection)
            .await?;
        match product {
            None => Err(DBError::UnknownProduct),
            Some(product) => TrackedProduct::try_from(product),
        }
    }

    pub async fn save_product(&self, product: &TrackedProduct) -> Result<(), DBError> {
        let owner = Users::find_by_id(product.user_id.to_string())
            .one(&self.connection)
            .await?;
        if owner.is_none() {
            return Err(DBError::UnknownUser);
        }
        let model = tracked_product::ActiveModel::from(product);
        let stored = TrackedProducts::find_by_id(product.id.to_string())
            .one(&self.connection)
            .await?;
        match stored {
            Some(_) => model.update(&self.connection).await?,
            None => model.insert(&self.connection).await?,
        };
        Ok(())
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), DBError> {
        let result = TrackedProducts::delete_by_id(id.to_string())
            .exec(&self.connection)
            .await?;
        if result.rows_affected == 0 {
            return Err(DBError::UnknownProduct);
        }
        Ok(())
    }
}

impl From<&User> for user::ActiveModel {
    fn from(value: &User) -> Self {
        Self {
            id: Set(value.id.to_string()),
            name: Set(value.name.to_string()),
            email: Set(value.email.clone()),
            notifications_enabled: Set(value.notifications_enabled),
        }
    }
}

impl TryFrom<user::Model> for User {
    type Error = DBError;

    fn try_from(value: user::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            name: value.name,
            email: value.email,
            notifications_enabled: value.notifications_enabled,
        })
    }
}

impl From<&TrackedProduct> for tracked_product::ActiveModel {
    fn from(value: &TrackedProduct) -> Self {
        Self {
            id: Set(value.id.to_string()),
            user_id: Set(value.user_id.to_string()),
            name: Set(value.name.to_string()),
            url: Set(value.url.to_string()),
            threshold: Set(value.threshold.to_string()),
            currency: Set(value.currency.to_string()),
            last_price: Set(value.last_price.map(|price| price.to_string())),
            last_checked: Set(value.last_checked),
            alert_armed: Set(value.alert_armed),
        }
    }
}

impl TryFrom<tracked_product::Model> for TrackedProduct {
    type Error = DBError;

    fn try_from(value: tracked_product::Model) -> Result<Self, Self::Error> {
        let currency = Currency::from_str(&value.currency)
            .map_err(|e| DBError::CorruptRecord(e.to_string()))?;
        let last_price = value
            .last_price
            .as_deref()
            .map(Decimal::from_str)
            .transpose()?;
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            user_id: Uuid::parse_str(&value.user_id)?,
            name: value.name,
            url: value.url,
            threshold: Decimal::from_str(&value.threshold)?,
            currency,
            last_price,
            last_checked: value.last_checked,
            alert_armed: value.alert_armed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_product_converts_back() {
        let product = TrackedProduct::dummy(
            Uuid::new_v4(),
            "https://example.com",
            Decimal::new(4000, 2),
        );
        let model = tracked_product::Model {
            id: product.id.to_string(),
            user_id: product.user_id.to_string(),
            name: product.name.to_string(),
            url: product.url.to_string(),
            threshold: "40.00".to_string(),
            currency: "£".to_string(),
            last_price: Some("39.99".to_string()),
            last_checked: None,
            alert_armed: false,
        };
        let result = TrackedProduct::try_from(model).expect("Failed to convert");
        assert_eq!(result.threshold, product.threshold);
        assert_eq!(result.last_price, Some(Decimal::new(3999, 2)));
        assert!(!result.alert_armed);
    }

    #[test]
    fn corrupt_stored_price_is_reported() {
        let model = tracked_product::Model {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            name: "Kettle".to_string(),
            url: "https://example.com".to_string(),
            threshold: "forty".to_string(),
            currency: "£".to_string(),
            last_price: None,
            last_checked: None,
            alert_armed: true,
        };
        let result = TrackedProduct::try_from(model);
        assert!(matches!(result, Err(DBError::NotADecimal(_))));
    }

    #[test]
    fn corrupt_stored_id_is_reported() {
        let model = user::Model {
            id: "not-an-id".to_string(),
            name: "Georgia".to_string(),
            email: None,
            notifications_enabled: false,
        };
        assert!(matches!(User::try_from(model), Err(DBError::NotAnId(_))));
    }
}
