//! Status codes persisted as stable text values.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Lifecycle state shared by room and surf bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Default state for every newly created booking.
    Booked,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Booked => "booked",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "booked" => Some(Self::Booked),
            "confirmed" => Some(Self::Confirmed),
            "cancelled" => Some(Self::Cancelled),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    /// Only bookings that have not been settled may be cancelled.
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Booked | Self::Confirmed)
    }

    /// Settled states (`Cancelled`, `Completed`) are terminal; keeping the
    /// current status is always allowed.
    pub fn check_transition(self, next: Self) -> Result<(), StatusChangeError> {
        if self == next {
            return Ok(());
        }
        if next == Self::Cancelled && !self.is_cancellable() {
            return Err(StatusChangeError::NotCancellable);
        }
        if matches!(self, Self::Cancelled | Self::Completed) {
            return Err(StatusChangeError::Settled { from: self });
        }
        Ok(())
    }
}

impl Display for BookingStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Booked => "Booked",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
            Self::Completed => "Completed",
        };
        f.write_str(label)
    }
}

/// Rejected booking status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChangeError {
    NotCancellable,
    Settled { from: BookingStatus },
}

impl Display for StatusChangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCancellable => f.write_str("취소할 수 없는 예약입니다."),
            Self::Settled { from } => write!(f, "{from} 상태의 예약은 변경할 수 없습니다."),
        }
    }
}

impl std::error::Error for StatusChangeError {}

/// Lifecycle state of an issued coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Issued,
    Used,
    Expired,
}

impl CouponStatus {
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Issued => "issued",
            Self::Used => "used",
            Self::Expired => "expired",
        }
    }

    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "issued" => Some(Self::Issued),
            "used" => Some(Self::Used),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingStatus, CouponStatus, StatusChangeError};

    #[test]
    fn booking_status_db_text_is_stable() {
        for status in [
            BookingStatus::Booked,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::from_db_str(status.as_db_str()), Some(status));
        }
        assert_eq!(BookingStatus::from_db_str("Booked"), None);
    }

    #[test]
    fn only_open_bookings_are_cancellable() {
        assert!(BookingStatus::Booked.is_cancellable());
        assert!(BookingStatus::Confirmed.is_cancellable());
        assert!(!BookingStatus::Cancelled.is_cancellable());
        assert!(!BookingStatus::Completed.is_cancellable());
    }

    #[test]
    fn settled_bookings_keep_their_status() {
        assert_eq!(
            BookingStatus::Completed.check_transition(BookingStatus::Cancelled),
            Err(StatusChangeError::NotCancellable)
        );
        assert_eq!(
            BookingStatus::Cancelled.check_transition(BookingStatus::Booked),
            Err(StatusChangeError::Settled {
                from: BookingStatus::Cancelled
            })
        );
        assert_eq!(
            BookingStatus::Completed.check_transition(BookingStatus::Confirmed),
            Err(StatusChangeError::Settled {
                from: BookingStatus::Completed
            })
        );
        assert_eq!(
            BookingStatus::Cancelled.check_transition(BookingStatus::Cancelled),
            Ok(())
        );
    }

    #[test]
    fn open_bookings_move_freely() {
        assert_eq!(
            BookingStatus::Booked.check_transition(BookingStatus::Confirmed),
            Ok(())
        );
        assert_eq!(
            BookingStatus::Confirmed.check_transition(BookingStatus::Cancelled),
            Ok(())
        );
        assert_eq!(
            BookingStatus::Confirmed.check_transition(BookingStatus::Completed),
            Ok(())
        );
    }

    #[test]
    fn coupon_status_rejects_unknown_text() {
        assert_eq!(CouponStatus::from_db_str("used"), Some(CouponStatus::Used));
        assert_eq!(CouponStatus::from_db_str("void"), None);
    }
}
