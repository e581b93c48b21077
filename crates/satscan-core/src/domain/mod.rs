pub mod balance;
pub mod identity;
pub mod timestamp;

pub use balance::Balance;
pub use identity::{Identity, IdentityGenerator, SecretMaterial, WatchlistGenerator};
pub use timestamp::UtcDateTime;
