use crate::configuration::{DatabaseSettings, DatabaseType};
use crate::db::errors::DBError;
use crate::db::in_memory::InMemoryDB;
use crate::db::product::TrackedProduct;
use crate::db::relational::RelationalDB;
use crate::db::user::User;
use crate::errors::AppErrors;
use sea_orm::Database as SeaOrmDB;
use uuid::Uuid;

/// Product registry. Every caller goes through this, never through a backend directly.
#[derive(Debug)]
pub enum Database {
    InMemory(Box<InMemoryDB>),
    Relational(RelationalDB),
}

impl Database {
    pub async fn try_from(settings: &DatabaseSettings) -> Result<Self, AppErrors> {
        settings.check_if_valid()?;
        match settings.db_type {
            DatabaseType::InMemory => match &settings.file_path {
                Some(file_path) => {
                    let db = InMemoryDB::try_from(file_path.to_string())?;
                    Ok(Self::InMemory(Box::new(db)))
                }
                None => Ok(Self::in_memory()),
            },
            DatabaseType::Relational => {
                let connection_settings = settings.url.clone().unwrap_or_default();
                let connection = SeaOrmDB::connect(connection_settings)
                    .await
                    .map_err(|e| AppErrors::DatabaseError(DBError::Relational(e)))?;
                let db = RelationalDB::init(connection);
                db.create_schema().await?;
                Ok(Self::Relational(db))
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::InMemory(Box::default())
    }

    pub async fn all_users(&self) -> Result<Vec<User>, DBError> {
        match self {
            Database::InMemory(db) => db.all_users(),
            Database::Relational(db) => db.all_users().await,
        }
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DBError> {
        match self {
            Database::InMemory(db) => db.get_user_by(id),
            Database::Relational(db) => db.get_user_by(id).await,
        }
    }

    pub async fn save_user(&self, user: &User) -> Result<(), DBError> {
        match self {
            Database::InMemory(db) => db.save_user(user),
            Database::Relational(db) => db.save_user(user).await,
        }
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), DBError> {
        match self {
            Database::InMemory(db) => db.delete_user(id),
            Database::Relational(db) => db.delete_user(id).await,
        }
    }

    pub async fn all_products(&self) -> Result<Vec<TrackedProduct>, DBError> {
        let products = match self {
            Database::InMemory(db) => db.all_products()?,
            Database::Relational(db) => db.all_products().await?,
        };
        Ok(sorted(products))
    }

    pub async fn products_for(&self, user_id: Uuid) -> Result<Vec<TrackedProduct>, DBError> {
        let products = match self {
            Database::InMemory(db) => db.products_for(user_id)?,
            Database::Relational(db) => db.products_for(user_id).await?,
        };
        Ok(sorted(products))
    }

    /// Products whose owner currently wants email alerts.
    pub async fn monitored_products(&self) -> Result<Vec<(User, TrackedProduct)>, DBError> {
        let mut monitored = vec![];
        for user in self.all_users().await? {
            if !user.notifications_enabled {
                continue;
            }
            for product in self.products_for(user.id).await? {
                monitored.push((user.clone(), product));
            }
        }
        Ok(monitored)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<TrackedProduct, DBError> {
        match self {
            Database::InMemory(db) => db.get_product_by(id),
            Database::Relational(db) => db.get_product_by(id).await,
        }
    }

    pub async fn save_product(&self, product: &TrackedProduct) -> Result<(), DBError> {
        match self {
            Database::InMemory(db) => db.save_product(product),
            Database::Relational(db) => db.save_product(product).await,
        }
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), DBError> {
        match self {
            Database::InMemory(db) => db.delete_product(id),
            Database::Relational(db) => db.delete_product(id).await,
        }
    }
}

fn sorted(mut products: Vec<TrackedProduct>) -> Vec<TrackedProduct> {
    products.sort_by_key(|product| product.name.to_lowercase());
    products
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn products_are_listed_by_name() {
        let db = Database::in_memory();
        let user = User::new("Georgia");
        db.save_user(&user).await.expect("Failed to save user");
        let mut zebra = TrackedProduct::dummy(user.id, "https://example.com/z", Decimal::TEN);
        zebra.name = "Zebra lamp".to_string();
        let mut apple = TrackedProduct::dummy(user.id, "https://example.com/a", Decimal::TEN);
        apple.name = "apple peeler".to_string();
        db.save_product(&zebra).await.expect("Failed to save product");
        db.save_product(&apple).await.expect("Failed to save product");
        let names: Vec<String> = db
            .products_for(user.id)
            .await
            .expect("Failed to list products")
            .into_iter()
            .map(|product| product.name)
            .collect();
        assert_eq!(names, vec!["apple peeler", "Zebra lamp"]);
    }

    #[tokio::test]
    async fn only_users_with_notifications_are_monitored() {
        let db = Database::in_memory();
        let quiet = User::new("Quiet");
        let mut loud = User::new("Loud");
        loud.set_email("loud@example.com").expect("Failed to set email");
        loud.enable_notifications().expect("Failed to enable");
        db.save_user(&quiet).await.expect("Failed to save user");
        db.save_user(&loud).await.expect("Failed to save user");
        let quiet_product = TrackedProduct::dummy(quiet.id, "https://example.com/q", Decimal::TEN);
        let loud_product = TrackedProduct::dummy(loud.id, "https://example.com/l", Decimal::TEN);
        db.save_product(&quiet_product).await.expect("Failed to save product");
        db.save_product(&loud_product).await.expect("Failed to save product");

        let monitored = db.monitored_products().await.expect("Failed to load");
        assert_eq!(monitored.len(), 1);
        assert_eq!(monitored[0].0.id, loud.id);
        assert_eq!(monitored[0].1.id, loud_product.id);
    }

    #[tokio::test]
    async fn missing_relational_url_is_rejected() {
        let settings = DatabaseSettings {
            db_type: DatabaseType::Relational,
            file_path: None,
            url: None,
        };
        let result = Database::try_from(&settings).await;
        assert!(matches!(result, Err(AppErrors::ConfigurationError(_))));
    }
}
