//! Data-access core for the Seogwipean guesthouse: room bookings, surf
//! lessons and coupons.
//!
//! Every repository operation opens its own connection and returns an
//! [`Outcome`]: `Success`, `Fail` with a user-facing reason, or a
//! reason-less `Exception` whose details only reach the log.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::CoreConfig;
pub use db::{ConnectionFactory, SqliteConnectionFactory};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::booking::{Booking, BookingUpdateError, BookingViewModel};
pub use model::codes::{BookingStatus, CouponStatus, StatusChangeError};
pub use model::coupon::{Coupon, CouponDb, CouponDbViewModel, CouponViewModel, KakaoViewModel};
pub use model::surf::{Surf, SurfViewModel};
pub use model::validation::ValidationError;
pub use repo::booking_repo::{BookingRepository, SqliteBookingRepository};
pub use repo::coupon_repo::{CouponRepository, SqliteCouponRepository};
pub use repo::surf_repo::{SqliteSurfRepository, SurfRepository};
pub use repo::{Outcome, RepoError, RepoResult, ResultCode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
