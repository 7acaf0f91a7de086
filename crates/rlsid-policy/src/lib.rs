//! # rlsid-policy — The Trusted Side
//!
//! - [`evaluator`]: fail-closed decoding of an encoded identity into a
//!   [`RowPredicate`] and per-row [`AccessDecision`]s.
//! - [`boundary`]: the [`RenderBoundary`], which verifies an embed
//!   credential (signature, expiry, report and schema binding) before
//!   filtering rows.
//!
//! Nothing in this crate returns an error to its caller. Every failure is
//! "no rows".

pub mod boundary;
pub mod evaluator;

pub use boundary::{DenyReason, RenderBoundary, RenderOutcome};
pub use evaluator::{evaluate, AccessDecision, ColumnTest, PolicyEvaluator, RowPredicate};
