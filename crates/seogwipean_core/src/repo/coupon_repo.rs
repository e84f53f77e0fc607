//! Coupon and coupon campaign repository.
//!
//! # Responsibility
//! - Issue coupons (optionally from a campaign with a limited quantity).
//! - Redeem coupons by phone number and expire stale ones on the way.
//! - Maintain coupon campaigns (`coupon_db`).
//!
//! # Invariants
//! - Issuing from a campaign decrements `remaining` in the same transaction
//!   as the coupon insert.
//! - A phone holds at most one `issued` coupon per campaign.
//! - Phone numbers are compared in digits-only form.
//! - A coupon code collision draws a fresh code; the insert is retried a
//!   bounded number of times inside the issuing transaction.

use super::scope::run_scoped;
use super::{invalid_status, Outcome, RepoError, RepoResult};
use crate::db::ConnectionFactory;
use crate::model::codes::CouponStatus;
use crate::model::coupon::{
    generate_coupon_code, Coupon, CouponDb, CouponDbViewModel, CouponViewModel, KakaoViewModel,
    NewCoupon,
};
use crate::model::presence::{normalize_phone, present_phone, present_text};
use crate::model::validation::ValidationError;
use chrono::{Days, Local, NaiveDate, NaiveDateTime};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{
    ffi, params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior,
};

const COUPON_DB_NOT_FOUND: &str = "쿠폰 정보가 존재하지 않습니다.";
const COUPON_SOLD_OUT: &str = "쿠폰이 모두 소진되었습니다.";
const COUPON_ALREADY_ISSUED: &str = "이미 발급된 쿠폰이 있습니다.";
const COUPON_NOT_USABLE: &str = "사용 가능한 쿠폰이 존재하지 않습니다.";
const COUPON_EXPIRED: &str = "쿠폰 사용 기간이 만료되었습니다.";

const CODE_ATTEMPTS: usize = 5;

const COUPON_SELECT_SQL: &str = "SELECT
    id,
    coupon_db_id,
    code,
    title,
    user_name,
    phone,
    status,
    create_date,
    expire_date,
    use_date
FROM coupon";

const COUPON_DB_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    discount_rate,
    remaining,
    valid_days,
    create_date
FROM coupon_db";

/// Repository interface for coupons and coupon campaigns.
pub trait CouponRepository {
    fn get_coupon(&self, id: i64) -> Outcome<Option<Coupon>>;
    fn get_coupon_model(&self, id: i64) -> Outcome<Option<CouponViewModel>>;
    fn get_coupon_list(&self, filter: &CouponViewModel) -> Outcome<Vec<Coupon>>;
    fn create_coupon(&self, input: &CouponViewModel) -> Outcome<CouponViewModel>;
    fn use_coupon(&self, phone: &str) -> Outcome<CouponViewModel>;
    /// Latest coupon for the phone number carried by a chatbot request.
    fn get_coupon_kakao(&self, input: &KakaoViewModel) -> Outcome<Option<CouponViewModel>>;
    fn get_coupon_db(&self, id: i64) -> Outcome<Option<CouponDb>>;
    fn create_coupon_db(&self, input: &CouponDbViewModel) -> Outcome<CouponDb>;
    fn update_coupon_db(&self, input: &CouponDbViewModel) -> Outcome<CouponDb>;
}

#[derive(Debug, Clone)]
pub struct SqliteCouponRepository<F> {
    factory: F,
}

impl<F: ConnectionFactory> SqliteCouponRepository<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: ConnectionFactory> CouponRepository for SqliteCouponRepository<F> {
    fn get_coupon(&self, id: i64) -> Outcome<Option<Coupon>> {
        run_scoped(&self.factory, "get_coupon", |conn| find_coupon(conn, id))
    }

    fn get_coupon_model(&self, id: i64) -> Outcome<Option<CouponViewModel>> {
        run_scoped(&self.factory, "get_coupon_model", |conn| {
            Ok(find_coupon(conn, id)?.map(|coupon| coupon.to_view_model()))
        })
    }

    fn get_coupon_list(&self, filter: &CouponViewModel) -> Outcome<Vec<Coupon>> {
        run_scoped(&self.factory, "get_coupon_list", |conn| {
            let mut sql = format!("{COUPON_SELECT_SQL} WHERE 1 = 1");
            let mut bind_values: Vec<Value> = Vec::new();

            if let Some(phone) = present_phone(&filter.phone) {
                sql.push_str(" AND phone = ?");
                bind_values.push(Value::Text(phone));
            }
            if let Some(user_name) = present_text(&filter.user_name) {
                sql.push_str(" AND user_name = ?");
                bind_values.push(Value::Text(user_name.to_string()));
            }
            if let Some(status) = filter.status {
                sql.push_str(" AND status = ?");
                bind_values.push(Value::Text(status.as_db_str().to_string()));
            }

            sql.push_str(" ORDER BY create_date ASC, id ASC");

            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(bind_values))?;
            let mut items = Vec::new();
            while let Some(row) = rows.next()? {
                items.push(parse_coupon_row(row)?);
            }
            Ok(items)
        })
    }

    fn create_coupon(&self, input: &CouponViewModel) -> Outcome<CouponViewModel> {
        run_scoped(&self.factory, "create_coupon", |conn| {
            let draft = input.validate_new()?;
            let now = Local::now().naive_local();

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let (title, expire_date) = match draft.coupon_db_id {
                Some(coupon_db_id) => {
                    let campaign = find_coupon_db(&tx, coupon_db_id)?
                        .ok_or_else(|| RepoError::Domain(COUPON_DB_NOT_FOUND.to_string()))?;
                    if campaign.remaining <= 0 {
                        return Err(RepoError::Domain(COUPON_SOLD_OUT.to_string()));
                    }
                    if has_issued_coupon(&tx, &draft.phone, coupon_db_id)? {
                        return Err(RepoError::Domain(COUPON_ALREADY_ISSUED.to_string()));
                    }
                    tx.execute(
                        "UPDATE coupon_db SET remaining = remaining - 1 WHERE id = ?1;",
                        [coupon_db_id],
                    )?;
                    let expire_date = now
                        .date()
                        .checked_add_days(Days::new(u64::from(campaign.valid_days.unsigned_abs())))
                        .ok_or_else(|| {
                            RepoError::InvalidData(format!(
                                "coupon_db.valid_days `{}` overflows the calendar",
                                campaign.valid_days
                            ))
                        })?;
                    (Some(campaign.title), Some(expire_date))
                }
                None => (None, draft.expire_date),
            };

            let (id, code) = insert_issued_coupon(
                &tx,
                generate_coupon_code,
                &draft,
                title.as_deref(),
                expire_date,
                now,
            )?;
            tx.commit()?;

            let coupon = Coupon {
                id,
                coupon_db_id: draft.coupon_db_id,
                code,
                title,
                user_name: draft.user_name,
                phone: draft.phone,
                status: CouponStatus::Issued,
                create_date: now,
                expire_date,
                use_date: None,
            };
            info!(
                "event=coupon_create module=repo status=ok id={} coupon_db_id={:?}",
                coupon.id, coupon.coupon_db_id
            );
            Ok(coupon.to_view_model())
        })
    }

    fn use_coupon(&self, phone: &str) -> Outcome<CouponViewModel> {
        run_scoped(&self.factory, "use_coupon", |conn| {
            let phone = normalize_phone(phone);
            if phone.is_empty() {
                return Err(ValidationError::MissingPhone.into());
            }
            let now = Local::now().naive_local();

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let expired = expire_stale_coupons(&tx, &phone, now.date())?;
            let candidate = tx
                .query_row(
                    &format!(
                        "{COUPON_SELECT_SQL}
                         WHERE phone = ?1 AND status = ?2
                         ORDER BY create_date ASC, id ASC
                         LIMIT 1;"
                    ),
                    params![phone.as_str(), CouponStatus::Issued.as_db_str()],
                    |row| Ok(parse_coupon_row(row)),
                )
                .optional()?
                .transpose()?;

            let Some(mut coupon) = candidate else {
                // Persist the expiry sweep even though the request fails.
                tx.commit()?;
                let reason = if expired > 0 {
                    COUPON_EXPIRED
                } else {
                    COUPON_NOT_USABLE
                };
                return Err(RepoError::Domain(reason.to_string()));
            };

            tx.execute(
                "UPDATE coupon SET status = ?2, use_date = ?3 WHERE id = ?1;",
                params![coupon.id, CouponStatus::Used.as_db_str(), now],
            )?;
            tx.commit()?;

            coupon.status = CouponStatus::Used;
            coupon.use_date = Some(now);
            info!(
                "event=coupon_use module=repo status=ok id={} expired_swept={expired}",
                coupon.id
            );
            Ok(coupon.to_view_model())
        })
    }

    fn get_coupon_kakao(&self, input: &KakaoViewModel) -> Outcome<Option<CouponViewModel>> {
        run_scoped(&self.factory, "get_coupon_kakao", |conn| {
            let Some(phone) = input.resolve_phone() else {
                return Ok(None);
            };

            let coupon = conn
                .query_row(
                    &format!(
                        "{COUPON_SELECT_SQL}
                         WHERE phone = ?1
                         ORDER BY create_date DESC, id DESC
                         LIMIT 1;"
                    ),
                    [phone.as_str()],
                    |row| Ok(parse_coupon_row(row)),
                )
                .optional()?
                .transpose()?;
            Ok(coupon.map(|coupon| coupon.to_view_model()))
        })
    }

    fn get_coupon_db(&self, id: i64) -> Outcome<Option<CouponDb>> {
        run_scoped(&self.factory, "get_coupon_db", |conn| find_coupon_db(conn, id))
    }

    fn create_coupon_db(&self, input: &CouponDbViewModel) -> Outcome<CouponDb> {
        run_scoped(&self.factory, "create_coupon_db", |conn| {
            let draft = input.validate_new()?;
            let create_date = Local::now().naive_local();

            conn.execute(
                "INSERT INTO coupon_db (
                    title,
                    description,
                    discount_rate,
                    remaining,
                    valid_days,
                    create_date
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    draft.discount_rate,
                    draft.remaining,
                    draft.valid_days,
                    create_date,
                ],
            )?;

            let campaign = draft.into_coupon_db(conn.last_insert_rowid(), create_date);
            info!(
                "event=coupon_db_create module=repo status=ok id={} remaining={}",
                campaign.id, campaign.remaining
            );
            Ok(campaign)
        })
    }

    fn update_coupon_db(&self, input: &CouponDbViewModel) -> Outcome<CouponDb> {
        run_scoped(&self.factory, "update_coupon_db", |conn| {
            let id = input
                .id
                .filter(|id| *id > 0)
                .ok_or(ValidationError::MissingId)?;

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let mut campaign = find_coupon_db(&tx, id)?
                .ok_or_else(|| RepoError::Domain(COUPON_DB_NOT_FOUND.to_string()))?;
            campaign.apply_update(input);

            tx.execute(
                "UPDATE coupon_db
                 SET
                    title = ?2,
                    description = ?3,
                    discount_rate = ?4,
                    remaining = ?5,
                    valid_days = ?6
                 WHERE id = ?1;",
                params![
                    campaign.id,
                    campaign.title.as_str(),
                    campaign.description.as_deref(),
                    campaign.discount_rate,
                    campaign.remaining,
                    campaign.valid_days,
                ],
            )?;
            tx.commit()?;

            info!(
                "event=coupon_db_update module=repo status=ok id={} remaining={}",
                campaign.id, campaign.remaining
            );
            Ok(campaign)
        })
    }
}

/// Inserts an `issued` coupon row and returns its id and code.
///
/// `next_code` is asked again whenever the unique index on `coupon.code`
/// rejects the previous code, up to `CODE_ATTEMPTS` codes in total.
fn insert_issued_coupon(
    conn: &Connection,
    mut next_code: impl FnMut() -> String,
    draft: &NewCoupon,
    title: Option<&str>,
    expire_date: Option<NaiveDate>,
    now: NaiveDateTime,
) -> RepoResult<(i64, String)> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let code = next_code();
        let inserted = conn.execute(
            "INSERT INTO coupon (
                coupon_db_id,
                code,
                title,
                user_name,
                phone,
                status,
                create_date,
                expire_date,
                use_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL);",
            params![
                draft.coupon_db_id,
                code.as_str(),
                title,
                draft.user_name.as_str(),
                draft.phone.as_str(),
                CouponStatus::Issued.as_db_str(),
                now,
                expire_date,
            ],
        );
        match inserted {
            Ok(_) => return Ok((conn.last_insert_rowid(), code)),
            Err(err) if attempt < CODE_ATTEMPTS && is_unique_violation(&err) => {
                warn!("event=coupon_code_collision module=repo status=retry attempt={attempt}");
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn find_coupon(conn: &Connection, id: i64) -> RepoResult<Option<Coupon>> {
    conn.query_row(&format!("{COUPON_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
        Ok(parse_coupon_row(row))
    })
    .optional()?
    .transpose()
}

fn find_coupon_db(conn: &Connection, id: i64) -> RepoResult<Option<CouponDb>> {
    let campaign = conn
        .query_row(
            &format!("{COUPON_DB_SELECT_SQL} WHERE id = ?1;"),
            [id],
            |row| {
                Ok(CouponDb {
                    id: row.get("id")?,
                    title: row.get("title")?,
                    description: row.get("description")?,
                    discount_rate: row.get("discount_rate")?,
                    remaining: row.get("remaining")?,
                    valid_days: row.get("valid_days")?,
                    create_date: row.get("create_date")?,
                })
            },
        )
        .optional()?;
    Ok(campaign)
}

fn has_issued_coupon(conn: &Connection, phone: &str, coupon_db_id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM coupon
            WHERE phone = ?1 AND coupon_db_id = ?2 AND status = ?3
        );",
        params![phone, coupon_db_id, CouponStatus::Issued.as_db_str()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Marks issued coupons past their expire date as expired; returns how many.
fn expire_stale_coupons(conn: &Connection, phone: &str, today: NaiveDate) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE coupon
         SET status = ?3
         WHERE phone = ?1
           AND status = ?2
           AND expire_date IS NOT NULL
           AND expire_date < ?4;",
        params![
            phone,
            CouponStatus::Issued.as_db_str(),
            CouponStatus::Expired.as_db_str(),
            today,
        ],
    )?;
    Ok(changed)
}

fn parse_coupon_row(row: &Row<'_>) -> RepoResult<Coupon> {
    let status_text: String = row.get("status")?;
    let status = CouponStatus::from_db_str(&status_text)
        .ok_or_else(|| invalid_status("coupon", &status_text))?;

    Ok(Coupon {
        id: row.get("id")?,
        coupon_db_id: row.get("coupon_db_id")?,
        code: row.get("code")?,
        title: row.get("title")?,
        user_name: row.get("user_name")?,
        phone: row.get("phone")?,
        status,
        create_date: row.get("create_date")?,
        expire_date: row.get("expire_date")?,
        use_date: row.get("use_date")?,
    })
}
