mod price;

pub mod helpers;
mod secret;

pub use price::Price;
pub use secret::Secret;
