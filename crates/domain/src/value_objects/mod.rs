pub mod delta;
pub mod price;

pub use delta::TokenDelta;
pub use price::Price;
