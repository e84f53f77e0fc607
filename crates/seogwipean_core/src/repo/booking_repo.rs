//! Room booking repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Lists are ordered by `check_in ASC, check_out ASC, id ASC`.
//! - Cancellation is only allowed from `Booked` or `Confirmed`, whether it
//!   comes from `cancel_booking` or a status change in `update_booking`.
//! - Phone filters match the digits-only stored form.

use super::scope::run_scoped;
use super::{invalid_status, Outcome, RepoError, RepoResult};
use crate::db::ConnectionFactory;
use crate::model::booking::{Booking, BookingViewModel};
use crate::model::codes::{BookingStatus, StatusChangeError};
use crate::model::presence::{present_date, present_phone, present_text};
use crate::model::validation::ValidationError;
use chrono::Local;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const BOOKING_NOT_FOUND: &str = "예약 정보가 존재하지 않습니다.";

const BOOKING_SELECT_SQL: &str = "SELECT
    id,
    user_name,
    email,
    phone,
    room,
    head_count,
    check_in,
    check_out,
    request,
    status,
    create_date
FROM booking";

pub trait BookingRepository {
    fn get_booking(&self, id: i64) -> Outcome<Option<Booking>>;
    fn get_booking_list(&self, filter: &BookingViewModel) -> Outcome<Vec<Booking>>;
    fn add_booking(&self, input: &BookingViewModel) -> Outcome<BookingViewModel>;
    fn update_booking(&self, input: &BookingViewModel) -> Outcome<BookingViewModel>;
    fn cancel_booking(&self, id: i64) -> Outcome<BookingViewModel>;
}

#[derive(Debug, Clone)]
pub struct SqliteBookingRepository<F> {
    factory: F,
}

impl<F: ConnectionFactory> SqliteBookingRepository<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: ConnectionFactory> BookingRepository for SqliteBookingRepository<F> {
    fn get_booking(&self, id: i64) -> Outcome<Option<Booking>> {
        run_scoped(&self.factory, "get_booking", |conn| find_booking(conn, id))
    }

    fn get_booking_list(&self, filter: &BookingViewModel) -> Outcome<Vec<Booking>> {
        run_scoped(&self.factory, "get_booking_list", |conn| {
            let mut sql = format!("{BOOKING_SELECT_SQL} WHERE 1 = 1");
            let mut bind_values: Vec<Value> = Vec::new();

            if let Some(user_name) = present_text(&filter.user_name) {
                sql.push_str(" AND user_name = ?");
                bind_values.push(Value::Text(user_name.to_string()));
            }
            if let Some(phone) = present_phone(&filter.phone) {
                sql.push_str(" AND phone = ?");
                bind_values.push(Value::Text(phone));
            }
            if let Some(check_in) = present_date(filter.check_in) {
                sql.push_str(" AND check_in >= ?");
                bind_values.push(Value::Text(check_in.format("%Y-%m-%d").to_string()));
            }
            if let Some(status) = filter.status {
                sql.push_str(" AND status = ?");
                bind_values.push(Value::Text(status.as_db_str().to_string()));
            }

            sql.push_str(" ORDER BY check_in ASC, check_out ASC, id ASC");

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_booking_row(row)?);
            }
            Ok(items)
        })
    }

    fn add_booking(&self, input: &BookingViewModel) -> Outcome<BookingViewModel> {
        run_scoped(&self.factory, "add_booking", |conn| {
            let draft = input.validate_new()?;
            let create_date = Local::now().naive_local();

            conn.execute(
                "INSERT INTO booking (
                    user_name,
                    email,
                    phone,
                    room,
                    head_count,
                    check_in,
                    check_out,
                    request,
                    status,
                    create_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    draft.user_name.as_str(),
                    draft.email.as_deref(),
                    draft.phone.as_str(),
                    draft.room.as_deref(),
                    draft.head_count,
                    draft.check_in,
                    draft.check_out,
                    draft.request.as_deref(),
                    BookingStatus::Booked.as_db_str(),
                    create_date,
                ],
            )?;

            let booking = draft.into_booking(conn.last_insert_rowid(), create_date);
            info!(
                "event=booking_add module=repo status=ok id={} check_in={} check_out={}",
                booking.id, booking.check_in, booking.check_out
            );
            Ok(booking.to_view_model())
        })
    }

    fn update_booking(&self, input: &BookingViewModel) -> Outcome<BookingViewModel> {
        run_scoped(&self.factory, "update_booking", |conn| {
            let id = input
                .id
                .filter(|id| *id > 0)
                .ok_or(ValidationError::MissingId)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut booking = find_booking(&tx, id)?
                .ok_or_else(|| RepoError::Domain(BOOKING_NOT_FOUND.to_string()))?;
            booking.apply_update(input)?;
            write_booking(&tx, &booking)?;
            tx.commit()?;

            info!(
                "event=booking_update module=repo status=ok id={} booking_status={}",
                booking.id,
                booking.status.as_db_str()
            );
            Ok(booking.to_view_model())
        })
    }

    fn cancel_booking(&self, id: i64) -> Outcome<BookingViewModel> {
        run_scoped(&self.factory, "cancel_booking", |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut booking = find_booking(&tx, id)?
                .ok_or_else(|| RepoError::Domain(BOOKING_NOT_FOUND.to_string()))?;
            if !booking.status.is_cancellable() {
                return Err(StatusChangeError::NotCancellable.into());
            }

            booking.status = BookingStatus::Cancelled;
            write_booking(&tx, &booking)?;
            tx.commit()?;

            info!("event=booking_cancel module=repo status=ok id={}", booking.id);
            Ok(booking.to_view_model())
        })
    }
}

fn find_booking(conn: &Connection, id: i64) -> RepoResult<Option<Booking>> {
    conn.query_row(
        &format!("{BOOKING_SELECT_SQL} WHERE id = ?1;"),
        [id],
        |row| Ok(parse_booking_row(row)),
    )
    .optional()?
    .transpose()
}

fn write_booking(conn: &Connection, booking: &Booking) -> RepoResult<()> {
    conn.execute(
        "UPDATE booking
         SET
            user_name = ?2,
            email = ?3,
            phone = ?4,
            room = ?5,
            head_count = ?6,
            check_in = ?7,
            check_out = ?8,
            request = ?9,
            status = ?10
         WHERE id = ?1;",
        params![
            booking.id,
            booking.user_name.as_str(),
            booking.email.as_deref(),
            booking.phone.as_str(),
            booking.room.as_deref(),
            booking.head_count,
            booking.check_in,
            booking.check_out,
            booking.request.as_deref(),
            booking.status.as_db_str(),
        ],
    )?;
    Ok(())
}

fn parse_booking_row(row: &Row<'_>) -> RepoResult<Booking> {
    let status_text: String = row.get("status")?;
    let status = BookingStatus::from_db_str(&status_text)
        .ok_or_else(|| invalid_status("booking", &status_text))?;

    Ok(Booking {
        id: row.get("id")?,
        user_name: row.get("user_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        room: row.get("room")?,
        head_count: row.get("head_count")?,
        check_in: row.get("check_in")?,
        check_out: row.get("check_out")?,
        request: row.get("request")?,
        status,
        create_date: row.get("create_date")?,
    })
}
