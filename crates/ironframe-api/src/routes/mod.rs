//! # API Route Modules
//!
//! - `risk` — stateless classification and scoring.
//! - `tenants` — tenant-guarded exposure, score, and vendor views, plus
//!   the portfolio score.
//! - `vendors` — vendor registration.
//! - `cadence` — evaluation trigger, outbound log, read receipts, and
//!   unresponsive vendor requests.
//! - `audit` — hash-chained audit log.

pub mod audit;
pub mod cadence;
pub mod risk;
pub mod tenants;
pub mod vendors;
