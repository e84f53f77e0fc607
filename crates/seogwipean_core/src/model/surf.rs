//! Surf lesson booking model.
//!
//! # Invariants
//! - A stored surf booking always has a user name, `head_count >= 1` and a
//!   start date.
//! - Partial updates only touch fields that are present in the input.

use crate::model::codes::BookingStatus;
use crate::model::presence::{present_count, present_date, present_text};
use crate::model::validation::ValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Stored surf lesson booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surf {
    pub id: i64,
    pub user_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub head_count: i32,
    /// Free-text request from the guest.
    pub request: Option<String>,
    /// Age bracket code chosen at booking time (for example `20` for 20s).
    pub age_range: Option<i32>,
    pub start_date: NaiveDate,
    /// Lesson slot, `HHMM` or hour of day; `0` when unassigned.
    pub start_time: i32,
    pub status: BookingStatus,
    pub create_date: NaiveDateTime,
}

/// Transfer shape for surf create/update/list calls.
///
/// For list calls only `user_name` and `start_date` act as filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfViewModel {
    pub id: Option<i64>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub head_count: Option<i32>,
    pub request: Option<String>,
    pub age_range: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<i32>,
    pub status: Option<BookingStatus>,
}

/// Validated input for inserting a surf booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurf {
    pub user_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub head_count: i32,
    pub request: Option<String>,
    pub age_range: Option<i32>,
    pub start_date: NaiveDate,
    pub start_time: i32,
}

impl SurfViewModel {
    /// Checks required fields for a new booking in display order:
    /// user name, head count, start date.
    pub fn validate_new(&self) -> Result<NewSurf, ValidationError> {
        let user_name = present_text(&self.user_name).ok_or(ValidationError::MissingUserName)?;
        let head_count =
            present_count(self.head_count).ok_or(ValidationError::MissingHeadCount)?;
        let start_date =
            present_date(self.start_date).ok_or(ValidationError::MissingStartDate)?;

        Ok(NewSurf {
            user_name: user_name.to_string(),
            email: present_text(&self.email).map(str::to_string),
            phone: present_text(&self.phone).map(str::to_string),
            head_count,
            request: present_text(&self.request).map(str::to_string),
            age_range: present_count(self.age_range),
            start_date,
            start_time: present_count(self.start_time).unwrap_or(0),
        })
    }
}

impl NewSurf {
    pub fn into_surf(self, id: i64, create_date: NaiveDateTime) -> Surf {
        Surf {
            id,
            user_name: self.user_name,
            email: self.email,
            phone: self.phone,
            head_count: self.head_count,
            request: self.request,
            age_range: self.age_range,
            start_date: self.start_date,
            start_time: self.start_time,
            status: BookingStatus::Booked,
            create_date,
        }
    }
}

impl Surf {
    /// Applies every present field of `input`; absent fields keep their value.
    pub fn apply_update(&mut self, input: &SurfViewModel) {
        if let Some(user_name) = present_text(&input.user_name) {
            self.user_name = user_name.to_string();
        }
        if let Some(email) = present_text(&input.email) {
            self.email = Some(email.to_string());
        }
        if let Some(phone) = present_text(&input.phone) {
            self.phone = Some(phone.to_string());
        }
        if let Some(start_date) = present_date(input.start_date) {
            self.start_date = start_date;
        }
        if let Some(start_time) = present_count(input.start_time) {
            self.start_time = start_time;
        }
        if let Some(request) = present_text(&input.request) {
            self.request = Some(request.to_string());
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(head_count) = present_count(input.head_count) {
            self.head_count = head_count;
        }
        if let Some(age_range) = present_count(input.age_range) {
            self.age_range = Some(age_range);
        }
    }

    pub fn to_view_model(&self) -> SurfViewModel {
        SurfViewModel {
            id: Some(self.id),
            user_name: Some(self.user_name.clone()),
            email: self.email.clone(),
            phone: self.phone.clone(),
            head_count: Some(self.head_count),
            request: self.request.clone(),
            age_range: self.age_range,
            start_date: Some(self.start_date),
            start_time: Some(self.start_time),
            status: Some(self.status),
        }
    }
}
