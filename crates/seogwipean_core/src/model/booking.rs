//! Room booking model.
//!
//! # Invariants
//! - `check_out` is strictly after `check_in` for every stored booking.
//! - `head_count >= 1` and a contact phone are always present.
//! - The phone is stored digits-only, the same form coupons use.
//! - `Cancelled` and `Completed` bookings never change status again.

use crate::model::codes::{BookingStatus, StatusChangeError};
use crate::model::presence::{present_count, present_date, present_phone, present_text};
use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub phone: String,
    /// Room name or type label, if the guest picked one.
    pub room: Option<String>,
    pub head_count: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub request: Option<String>,
    pub status: BookingStatus,
    pub create_date: NaiveDateTime,
}

/// Transfer shape for room booking calls.
///
/// List filters: `user_name`, `phone`, `check_in` (lower bound) and `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingViewModel {
    pub id: Option<i64>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub room: Option<String>,
    pub head_count: Option<i32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub request: Option<String>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub user_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub room: Option<String>,
    pub head_count: i32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub request: Option<String>,
}

impl BookingViewModel {
    pub fn validate_new(&self) -> Result<NewBooking, ValidationError> {
        let user_name = present_text(&self.user_name).ok_or(ValidationError::MissingUserName)?;
        let phone = present_phone(&self.phone).ok_or(ValidationError::MissingPhone)?;
        let head_count =
            present_count(self.head_count).ok_or(ValidationError::MissingHeadCount)?;
        let check_in = present_date(self.check_in).ok_or(ValidationError::MissingCheckIn)?;
        let check_out = present_date(self.check_out).ok_or(ValidationError::MissingCheckOut)?;
        ensure_stay_order(check_in, check_out)?;

        Ok(NewBooking {
            user_name: user_name.to_string(),
            email: present_text(&self.email).map(str::to_string),
            phone,
            room: present_text(&self.room).map(str::to_string),
            head_count,
            check_in,
            check_out,
            request: present_text(&self.request).map(str::to_string),
        })
    }
}

impl NewBooking {
    pub fn into_booking(self, id: i64, create_date: NaiveDateTime) -> Booking {
        Booking {
            id,
            user_name: self.user_name,
            email: self.email,
            phone: self.phone,
            room: self.room,
            head_count: self.head_count,
            check_in: self.check_in,
            check_out: self.check_out,
            request: self.request,
            status: BookingStatus::Booked,
            create_date,
        }
    }
}

/// Why a partial booking update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingUpdateError {
    Invalid(ValidationError),
    Status(StatusChangeError),
}

impl Display for BookingUpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::Status(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BookingUpdateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Status(err) => Some(err),
        }
    }
}

impl From<ValidationError> for BookingUpdateError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<StatusChangeError> for BookingUpdateError {
    fn from(value: StatusChangeError) -> Self {
        Self::Status(value)
    }
}

impl Booking {
    /// Checks the status change, applies present fields, then re-checks the
    /// stay range on the result.
    ///
    /// On error `self` may already hold merged values; callers must not persist it.
    pub fn apply_update(&mut self, input: &BookingViewModel) -> Result<(), BookingUpdateError> {
        if let Some(status) = input.status {
            self.status.check_transition(status)?;
            self.status = status;
        }
        if let Some(user_name) = present_text(&input.user_name) {
            self.user_name = user_name.to_string();
        }
        if let Some(email) = present_text(&input.email) {
            self.email = Some(email.to_string());
        }
        if let Some(phone) = present_phone(&input.phone) {
            self.phone = phone;
        }
        if let Some(room) = present_text(&input.room) {
            self.room = Some(room.to_string());
        }
        if let Some(head_count) = present_count(input.head_count) {
            self.head_count = head_count;
        }
        if let Some(check_in) = present_date(input.check_in) {
            self.check_in = check_in;
        }
        if let Some(check_out) = present_date(input.check_out) {
            self.check_out = check_out;
        }
        if let Some(request) = present_text(&input.request) {
            self.request = Some(request.to_string());
        }
        ensure_stay_order(self.check_in, self.check_out)?;
        Ok(())
    }

    pub fn to_view_model(&self) -> BookingViewModel {
        BookingViewModel {
            id: Some(self.id),
            user_name: Some(self.user_name.clone()),
            email: self.email.clone(),
            phone: Some(self.phone.clone()),
            room: self.room.clone(),
            head_count: Some(self.head_count),
            check_in: Some(self.check_in),
            check_out: Some(self.check_out),
            request: self.request.clone(),
            status: Some(self.status),
        }
    }
}

fn ensure_stay_order(check_in: NaiveDate, check_out: NaiveDate) -> Result<(), ValidationError> {
    if check_out <= check_in {
        return Err(ValidationError::CheckOutNotAfterCheckIn);
    }
    Ok(())
}
