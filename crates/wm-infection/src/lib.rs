//! The infection registry (spec's C6).
//!
//! Tracks `infectious <domain> type N<V, S> = @value C<V> | @effect D<S>`
//! declarations and arbitrates whether a function boundary may let a live
//! effect row escape (spec §4.6). The row-discharge *mechanics* (does this
//! match's arm list cover every label reachable at the scrutinee?) live in
//! `wm-coverage`; this crate only knows the per-domain boundary rule that
//! runs once discharge has been computed.

mod boundary;
mod registry;

pub use boundary::{check_function_boundary, BoundaryVerdict};
pub use registry::{InfectionDomain, InfectionRegistry, InfectiousTypeInfo};
