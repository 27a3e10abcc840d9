//! Error types for `subtrack-core`.

use thiserror::Error;

/// A field of a subscription failed validation, or a month could not be parsed.
///
/// Every variant is user-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("service name must be between 2 and 100 characters")]
  InvalidServiceName,

  #[error("price must be positive")]
  InvalidPrice,

  #[error("user id must be 36 characters long")]
  InvalidUserId,

  #[error("end date must not be before start date")]
  InvalidDateRange,

  #[error("invalid month {0:?}, use MM-YYYY")]
  InvalidMonth(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
