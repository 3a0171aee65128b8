pub mod errors;
mod price_parser;
mod traits;

pub use errors::FetchError;
pub use price_parser::{clean_price, PriceParser, PriceSource, SourceRules};
pub use traits::Parser;
