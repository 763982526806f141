#![deny(missing_docs)]

//! # ironframe-core — Foundational Types for Ironframe
//!
//! This crate defines the types every other crate in the workspace depends
//! on. It has no internal crate dependencies — only `serde`, `serde_json`,
//! `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Tenants come from a closed enumeration.** A [`TenantContext`] can only
//!    be built from a [`TenantKey`]; there is no path from free text to an
//!    authorized tenant.
//!
//! 2. **Money is integer cents.** [`Cents`] wraps a `u64`. No floats, no
//!    decimals — classification boundaries are exact.
//!
//! 3. **[`IronframeError`] hierarchy.** Structured errors with `thiserror`.
//!    Tenant isolation failures are a distinct variant so callers can tell
//!    them apart from an ordinary miss.

pub mod error;
pub mod grade;
pub mod money;
pub mod temporal;
pub mod tenant;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{IronframeError, ValidationError};
pub use grade::LetterGrade;
pub use money::{BasisPoints, Cents};
pub use temporal::{parse_instant, DAY_MILLIS};
pub use tenant::{
    assert_tenant_access, detect_tenant_from_path, require_tenant_access, TenantContext,
    TenantId, TenantKey,
};
