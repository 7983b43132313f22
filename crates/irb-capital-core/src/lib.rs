pub mod adjustments;
pub mod counterparty;
pub mod error;
pub mod irb;
pub mod ratings;
pub mod types;
pub mod validation;

#[cfg(feature = "portfolio")]
pub mod portfolio;

pub use counterparty::Counterparty;
pub use error::IrbError;
pub use irb::rwa::{calculate_rwa, RwaResult};
pub use irb::ttc::{calculate_ttc_pd, TtcPdInput};
pub use types::*;
pub use validation::ValidationPolicy;

/// Standard result type for all IRB operations
pub type IrbResult<T> = Result<T, IrbError>;
