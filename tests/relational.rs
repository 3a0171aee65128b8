use chrono::{TimeZone, Utc};
use price_tracker::db::relational::RelationalDB;
use price_tracker::db::{Database, DatabaseError, TrackedProduct, User};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database as SeaOrmDB};
use uuid::Uuid;

async fn create_db() -> Database {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1).min_connections(1);
    let connection = SeaOrmDB::connect(options)
        .await
        .expect("Failed to connect to sqlite");
    let db = RelationalDB::init(connection);
    db.create_schema().await.expect("Failed to create schema");
    db.create_schema().await.expect("Schema creation is not repeatable");
    Database::Relational(db)
}

async fn saved_user(db: &Database, name: &str) -> User {
    let user = User::new(name);
    db.save_user(&user).await.expect("Failed to save user");
    user
}

#[tokio::test]
async fn user_round_trip_works() {
    let db = create_db().await;
    let mut user = saved_user(&db, "Georgia").await;

    user.set_email("georgia@example.com").expect("Failed to set email");
    user.enable_notifications().expect("Failed to enable");
    db.save_user(&user).await.expect("Failed to update user");

    let stored = db.get_user(user.id).await.expect("Failed to get user");
    assert_eq!(stored, user);
    assert_eq!(db.all_users().await.expect("Failed to list").len(), 1);
}

#[tokio::test]
async fn unknown_user_fails() {
    let db = create_db().await;
    assert!(matches!(
        db.get_user(Uuid::new_v4()).await,
        Err(DatabaseError::UnknownUser)
    ));
}

#[tokio::test]
async fn product_round_trip_keeps_prices_exact() {
    let db = create_db().await;
    let user = saved_user(&db, "Georgia").await;
    let mut product =
        TrackedProduct::dummy(user.id, "https://shop.example.com/kettle", Decimal::new(4000, 2));
    db.save_product(&product).await.expect("Failed to save product");

    let checked = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    product.record_price(Decimal::new(3999, 2), checked);
    product.alert_armed = false;
    db.save_product(&product).await.expect("Failed to update product");

    let stored = db.get_product(product.id).await.expect("Failed to get product");
    assert_eq!(stored, product);
    assert_eq!(stored.threshold.to_string(), "40.00");
    assert_eq!(db.all_products().await.expect("Failed to list").len(), 1);
}

#[tokio::test]
async fn products_are_listed_per_user() {
    let db = create_db().await;
    let georgia = saved_user(&db, "Georgia").await;
    let shaira = saved_user(&db, "Shaira").await;
    let mut lamp = TrackedProduct::dummy(georgia.id, "https://shop.example.com/lamp", Decimal::TEN);
    lamp.name = "Lamp".to_string();
    let mut desk = TrackedProduct::dummy(georgia.id, "https://shop.example.com/desk", Decimal::TEN);
    desk.name = "Desk".to_string();
    let chair = TrackedProduct::dummy(shaira.id, "https://shop.example.com/chair", Decimal::TEN);
    for product in [&lamp, &desk, &chair] {
        db.save_product(product).await.expect("Failed to save product");
    }

    let names: Vec<String> = db
        .products_for(georgia.id)
        .await
        .expect("Failed to list")
        .into_iter()
        .map(|product| product.name)
        .collect();

    assert_eq!(names, vec!["Desk", "Lamp"]);
}

#[tokio::test]
async fn product_of_unknown_user_is_rejected() {
    let db = create_db().await;
    let product = TrackedProduct::dummy(Uuid::new_v4(), "https://shop.example.com", Decimal::TEN);
    assert!(matches!(
        db.save_product(&product).await,
        Err(DatabaseError::UnknownUser)
    ));
}

#[tokio::test]
async fn deleting_works() {
    let db = create_db().await;
    let user = saved_user(&db, "Georgia").await;
    let kept = TrackedProduct::dummy(user.id, "https://shop.example.com/a", Decimal::TEN);
    let removed = TrackedProduct::dummy(user.id, "https://shop.example.com/b", Decimal::TEN);
    db.save_product(&kept).await.expect("Failed to save product");
    db.save_product(&removed).await.expect("Failed to save product");

    db.delete_product(removed.id).await.expect("Failed to delete product");
    assert!(matches!(
        db.delete_product(removed.id).await,
        Err(DatabaseError::UnknownProduct)
    ));
    assert_eq!(db.all_products().await.expect("Failed to list").len(), 1);

    db.delete_user(user.id).await.expect("Failed to delete user");
    assert!(db.all_products().await.expect("Failed to list").is_empty());
    assert!(db.all_users().await.expect("Failed to list").is_empty());
}

#[tokio::test]
async fn monitored_products_follow_notification_setting() {
    let db = create_db().await;
    let mut user = saved_user(&db, "Georgia").await;
    let product = TrackedProduct::dummy(user.id, "https://shop.example.com/a", Decimal::TEN);
    db.save_product(&product).await.expect("Failed to save product");
    assert!(db.monitored_products().await.expect("Failed to load").is_empty());

    user.set_email("georgia@example.com").expect("Failed to set email");
    user.enable_notifications().expect("Failed to enable");
    db.save_user(&user).await.expect("Failed to save user");

    let monitored = db.monitored_products().await.expect("Failed to load");
    assert_eq!(monitored.len(), 1);
    assert_eq!(monitored[0].1.id, product.id);
}
