//! Core numerics: segments, exact values, the ε-grid, smoothed valuations,
//! cut searches, and slices.

pub mod grid;
pub mod search;
pub mod segment;
pub mod slice;
pub mod valuation;
pub mod value;
