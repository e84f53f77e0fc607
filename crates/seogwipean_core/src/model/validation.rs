//! Caller-correctable input errors raised before any write.
//!
//! `Display` renders the reason shown to end users, so messages stay in the
//! application's display language.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    MissingId,
    MissingUserName,
    MissingHeadCount,
    MissingStartDate,
    MissingPhone,
    MissingCheckIn,
    MissingCheckOut,
    CheckOutNotAfterCheckIn,
    MissingCouponTitle,
    MissingCouponQuantity,
    MissingValidDays,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::MissingId => "데이터가 존재하지 않습니다.",
            Self::MissingUserName => "예약자명이 존재하지 않습니다.",
            Self::MissingHeadCount => "인원수가 존재하지 않습니다.",
            Self::MissingStartDate => "예약일이 존재하지 않습니다.",
            Self::MissingPhone => "연락처가 존재하지 않습니다.",
            Self::MissingCheckIn => "체크인 날짜가 존재하지 않습니다.",
            Self::MissingCheckOut => "체크아웃 날짜가 존재하지 않습니다.",
            Self::CheckOutNotAfterCheckIn => "체크아웃 날짜는 체크인 이후여야 합니다.",
            Self::MissingCouponTitle => "쿠폰명이 존재하지 않습니다.",
            Self::MissingCouponQuantity => "쿠폰 수량이 존재하지 않습니다.",
            Self::MissingValidDays => "쿠폰 사용 기간이 존재하지 않습니다.",
        };
        f.write_str(message)
    }
}

impl Error for ValidationError {}
