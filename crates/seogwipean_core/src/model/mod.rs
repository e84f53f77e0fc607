//! Entities and view models for rooms, surf lessons and coupons.
//!
//! # Responsibility
//! - Define the stored record shapes and the transfer shapes callers use.
//! - Own input validation and the per-field partial-update policy.
//!
//! # Invariants
//! - Entities are identified by a database-assigned `i64` id.
//! - View model fields are all optional; "present" is decided by [`presence`].

pub mod booking;
pub mod codes;
pub mod coupon;
pub mod presence;
pub mod surf;
pub mod validation;
