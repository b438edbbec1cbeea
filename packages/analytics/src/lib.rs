#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for entomological surveillance indicators.
//!
//! Single-pass fold over a record collection producing a
//! [`larvascan_analytics_models::SurveyStats`] snapshot: positivity
//! counts, per-species totals, frequency tables over positive findings,
//! and the Building Infestation Index (IIP) computed against the fixed
//! municipal reference population in [`reference`].
//!
//! Every function here is pure and infallible: unknown neighborhoods
//! degrade the IIP to zero, empty inputs produce an all-zero snapshot,
//! and repeated calls over the same inputs return identical results.

pub mod ranking;
pub mod reference;
pub mod stats;

pub use stats::compute_stats;
