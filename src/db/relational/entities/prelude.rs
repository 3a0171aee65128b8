pub use super::tracked_product::Entity as TrackedProducts;
pub use super::user::Entity as Users;
