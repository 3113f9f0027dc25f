pub mod arith;
pub mod coerce;
pub mod config;
pub mod error;
pub mod format;
pub mod time_value;
pub mod types;

#[cfg(feature = "inventory")]
pub mod inventory;

#[cfg(feature = "abatement")]
pub mod abatement;

#[cfg(feature = "projects")]
pub mod projects;

#[cfg(feature = "tracking")]
pub mod tracking;

#[cfg(feature = "strategy")]
pub mod strategy;

#[cfg(feature = "store")]
pub mod store;

pub use config::EngineConfig;
pub use error::DecarbError;
pub use types::*;

/// Standard result type for fallible decarb operations (store, config, IO)
pub type DecarbResult<T> = Result<T, DecarbError>;
