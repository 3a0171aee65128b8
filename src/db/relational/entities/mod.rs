pub mod prelude;

pub mod tracked_product;
pub mod user;
