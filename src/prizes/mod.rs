pub mod cache;
pub mod resolver;

pub use resolver::{PrizeOutcome, PrizeResolver};
