//! Coupon campaign and issued coupon models.
//!
//! # Responsibility
//! - Describe coupon campaigns (`CouponDb`) and the coupons issued from them.
//! - Resolve the phone number carried by a Kakao chatbot request.
//!
//! # Invariants
//! - Stored phone numbers contain digits only.
//! - Coupon codes are 16 uppercase hex characters; the `coupon.code` unique
//!   index rejects the rare collision and issuance retries with a new code.

use crate::model::codes::CouponStatus;
use crate::model::presence::{
    normalize_phone, present_count, present_date, present_phone, present_text,
};
use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const COUPON_CODE_LEN: usize = 16;

static MOBILE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"01[016789][\s.-]?\d{3,4}[\s.-]?\d{4}").expect("valid mobile number regex")
});

/// Coupon campaign: template and remaining issuance count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDb {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Discount in percent; `0` means the description carries the benefit.
    pub discount_rate: i32,
    pub remaining: i32,
    /// Days a coupon stays usable after it is issued.
    pub valid_days: i32,
    pub create_date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponDbViewModel {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount_rate: Option<i32>,
    pub remaining: Option<i32>,
    pub valid_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCouponDb {
    pub title: String,
    pub description: Option<String>,
    pub discount_rate: i32,
    pub remaining: i32,
    pub valid_days: i32,
}

/// Coupon issued to one guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub coupon_db_id: Option<i64>,
    pub code: String,
    pub title: Option<String>,
    pub user_name: String,
    pub phone: String,
    pub status: CouponStatus,
    pub create_date: NaiveDateTime,
    pub expire_date: Option<NaiveDate>,
    pub use_date: Option<NaiveDateTime>,
}

/// Transfer shape for coupon calls.
///
/// List filters: `phone`, `user_name` and `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouponViewModel {
    pub id: Option<i64>,
    pub coupon_db_id: Option<i64>,
    pub code: Option<String>,
    pub title: Option<String>,
    pub user_name: Option<String>,
    pub phone: Option<String>,
    pub status: Option<CouponStatus>,
    pub create_date: Option<NaiveDateTime>,
    pub expire_date: Option<NaiveDate>,
    pub use_date: Option<NaiveDateTime>,
}

/// Request forwarded from the Kakao chatbot skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KakaoViewModel {
    pub user_key: Option<String>,
    /// Raw text the user typed; may contain a phone number.
    pub utterance: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCoupon {
    pub coupon_db_id: Option<i64>,
    pub user_name: String,
    pub phone: String,
    pub expire_date: Option<NaiveDate>,
}

impl CouponDbViewModel {
    pub fn validate_new(&self) -> Result<NewCouponDb, ValidationError> {
        let title = present_text(&self.title).ok_or(ValidationError::MissingCouponTitle)?;
        let remaining =
            present_count(self.remaining).ok_or(ValidationError::MissingCouponQuantity)?;
        let valid_days =
            present_count(self.valid_days).ok_or(ValidationError::MissingValidDays)?;

        Ok(NewCouponDb {
            title: title.to_string(),
            description: present_text(&self.description).map(str::to_string),
            discount_rate: present_count(self.discount_rate).unwrap_or(0),
            remaining,
            valid_days,
        })
    }
}

impl NewCouponDb {
    pub fn into_coupon_db(self, id: i64, create_date: NaiveDateTime) -> CouponDb {
        CouponDb {
            id,
            title: self.title,
            description: self.description,
            discount_rate: self.discount_rate,
            remaining: self.remaining,
            valid_days: self.valid_days,
            create_date,
        }
    }
}

impl CouponDb {
    pub fn apply_update(&mut self, input: &CouponDbViewModel) {
        if let Some(title) = present_text(&input.title) {
            self.title = title.to_string();
        }
        if let Some(description) = present_text(&input.description) {
            self.description = Some(description.to_string());
        }
        if let Some(discount_rate) = present_count(input.discount_rate) {
            self.discount_rate = discount_rate;
        }
        if let Some(remaining) = present_count(input.remaining) {
            self.remaining = remaining;
        }
        if let Some(valid_days) = present_count(input.valid_days) {
            self.valid_days = valid_days;
        }
    }
}

impl CouponViewModel {
    pub fn validate_new(&self) -> Result<NewCoupon, ValidationError> {
        let user_name = present_text(&self.user_name).ok_or(ValidationError::MissingUserName)?;
        let phone = present_phone(&self.phone).ok_or(ValidationError::MissingPhone)?;

        Ok(NewCoupon {
            coupon_db_id: self.coupon_db_id.filter(|id| *id > 0),
            user_name: user_name.to_string(),
            phone,
            expire_date: present_date(self.expire_date),
        })
    }
}

impl Coupon {
    pub fn to_view_model(&self) -> CouponViewModel {
        CouponViewModel {
            id: Some(self.id),
            coupon_db_id: self.coupon_db_id,
            code: Some(self.code.clone()),
            title: self.title.clone(),
            user_name: Some(self.user_name.clone()),
            phone: Some(self.phone.clone()),
            status: Some(self.status),
            create_date: Some(self.create_date),
            expire_date: self.expire_date,
            use_date: self.use_date,
        }
    }
}

impl KakaoViewModel {
    /// Explicit phone field first, otherwise the first mobile number in the
    /// utterance. Returned value is digits only.
    pub fn resolve_phone(&self) -> Option<String> {
        if let Some(digits) = present_phone(&self.phone) {
            return Some(digits);
        }

        let utterance = present_text(&self.utterance)?;
        MOBILE_NUMBER_RE
            .find(utterance)
            .map(|found| normalize_phone(found.as_str()))
    }
}

/// Generates a new uppercase coupon code from a random v4 UUID.
pub fn generate_coupon_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(COUPON_CODE_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}
