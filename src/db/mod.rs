mod database;
mod errors;
pub mod in_memory;
mod product;
pub mod relational;
mod user;

pub use database::Database;
pub use errors::DBError as DatabaseError;
pub use errors::InMemoryError;
pub use product::{NewProduct, TrackedProduct};
pub use user::User;
