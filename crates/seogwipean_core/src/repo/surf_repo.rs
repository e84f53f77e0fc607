//! Surf lesson repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, update, look up and list surf bookings.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - New bookings always start as `BookingStatus::Booked`.
//! - Lists are ordered by `start_date ASC, start_time ASC, id ASC`.
//! - Updates to a missing id are rejected without writing.

use super::scope::run_scoped;
use super::{invalid_status, Outcome, RepoError, RepoResult};
use crate::db::ConnectionFactory;
use crate::model::codes::BookingStatus;
use crate::model::presence::{present_date, present_text};
use crate::model::surf::{Surf, SurfViewModel};
use crate::model::validation::ValidationError;
use chrono::Local;
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};

const SURF_NOT_FOUND: &str = "예약 정보가 존재하지 않습니다.";

const SURF_SELECT_SQL: &str = "SELECT
    id,
    user_name,
    email,
    phone,
    head_count,
    request,
    age_range,
    start_date,
    start_time,
    status,
    create_date
FROM surf";

/// Repository interface for surf lesson bookings.
pub trait SurfRepository {
    fn get_surf(&self, id: i64) -> Outcome<Option<Surf>>;
    fn get_surf_list(&self, filter: &SurfViewModel) -> Outcome<Vec<Surf>>;
    fn add_surf(&self, input: &SurfViewModel) -> Outcome<SurfViewModel>;
    fn update_surf(&self, input: &SurfViewModel) -> Outcome<SurfViewModel>;
}

/// SQLite-backed surf repository; opens one connection per call.
#[derive(Debug, Clone)]
pub struct SqliteSurfRepository<F> {
    factory: F,
}

impl<F: ConnectionFactory> SqliteSurfRepository<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: ConnectionFactory> SurfRepository for SqliteSurfRepository<F> {
    fn get_surf(&self, id: i64) -> Outcome<Option<Surf>> {
        run_scoped(&self.factory, "get_surf", |conn| find_surf(conn, id))
    }

    fn get_surf_list(&self, filter: &SurfViewModel) -> Outcome<Vec<Surf>> {
        run_scoped(&self.factory, "get_surf_list", |conn| {
            let mut sql = format!("{SURF_SELECT_SQL} WHERE 1 = 1");
            let mut bind_values: Vec<Value> = Vec::new();

            if let Some(user_name) = present_text(&filter.user_name) {
                sql.push_str(" AND user_name = ?");
                bind_values.push(Value::Text(user_name.to_string()));
            }
            if let Some(start_date) = present_date(filter.start_date) {
                sql.push_str(" AND start_date >= ?");
                bind_values.push(Value::Text(start_date.format("%Y-%m-%d").to_string()));
            }

            sql.push_str(" ORDER BY start_date ASC, start_time ASC, id ASC");

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_surf_row(row)?);
            }
            Ok(items)
        })
    }

    fn add_surf(&self, input: &SurfViewModel) -> Outcome<SurfViewModel> {
        run_scoped(&self.factory, "add_surf", |conn| {
            let draft = input.validate_new()?;
            let create_date = Local::now().naive_local();

            conn.execute(
                "INSERT INTO surf (
                    user_name,
                    email,
                    phone,
                    head_count,
                    request,
                    age_range,
                    start_date,
                    start_time,
                    status,
                    create_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    draft.user_name.as_str(),
                    draft.email.as_deref(),
                    draft.phone.as_deref(),
                    draft.head_count,
                    draft.request.as_deref(),
                    draft.age_range,
                    draft.start_date,
                    draft.start_time,
                    BookingStatus::Booked.as_db_str(),
                    create_date,
                ],
            )?;

            let surf = draft.into_surf(conn.last_insert_rowid(), create_date);
            info!(
                "event=surf_add module=repo status=ok id={} start_date={} head_count={}",
                surf.id, surf.start_date, surf.head_count
            );
            Ok(surf.to_view_model())
        })
    }

    fn update_surf(&self, input: &SurfViewModel) -> Outcome<SurfViewModel> {
        run_scoped(&self.factory, "update_surf", |conn| {
            let id = input
                .id
                .filter(|id| *id > 0)
                .ok_or(ValidationError::MissingId)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut surf =
                find_surf(&tx, id)?.ok_or_else(|| RepoError::Domain(SURF_NOT_FOUND.to_string()))?;
            surf.apply_update(input);

            tx.execute(
                "UPDATE surf
                 SET
                    user_name = ?2,
                    email = ?3,
                    phone = ?4,
                    head_count = ?5,
                    request = ?6,
                    age_range = ?7,
                    start_date = ?8,
                    start_time = ?9,
                    status = ?10
                 WHERE id = ?1;",
                params![
                    surf.id,
                    surf.user_name.as_str(),
                    surf.email.as_deref(),
                    surf.phone.as_deref(),
                    surf.head_count,
                    surf.request.as_deref(),
                    surf.age_range,
                    surf.start_date,
                    surf.start_time,
                    surf.status.as_db_str(),
                ],
            )?;
            tx.commit()?;

            info!(
                "event=surf_update module=repo status=ok id={} booking_status={}",
                surf.id,
                surf.status.as_db_str()
            );
            Ok(surf.to_view_model())
        })
    }
}

fn find_surf(conn: &Connection, id: i64) -> RepoResult<Option<Surf>> {
    conn.query_row(&format!("{SURF_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
        Ok(parse_surf_row(row))
    })
    .optional()?
    .transpose()
}

fn parse_surf_row(row: &Row<'_>) -> RepoResult<Surf> {
    let status_text: String = row.get("status")?;
    let status = BookingStatus::from_db_str(&status_text)
        .ok_or_else(|| invalid_status("surf", &status_text))?;

    Ok(Surf {
        id: row.get("id")?,
        user_name: row.get("user_name")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        head_count: row.get("head_count")?,
        request: row.get("request")?,
        age_range: row.get("age_range")?,
        start_date: row.get("start_date")?,
        start_time: row.get("start_time")?,
        status,
        create_date: row.get("create_date")?,
    })
}
