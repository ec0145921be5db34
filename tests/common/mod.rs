//! Shared helpers for integration tests

#![allow(dead_code)]

use line_percolation::{ProjectivePlane, SeedSet};

/// Prime orders small enough for exhaustive checks
pub const SMALL_PRIMES: [usize; 5] = [2, 3, 5, 7, 11];

/// Build a plane, panicking on invalid orders
pub fn plane(order: usize) -> ProjectivePlane {
    ProjectivePlane::new(order).unwrap_or_else(|err| panic!("plane of order {order}: {err}"))
}

/// Collect point indices into a seed set
pub fn seed(points: &[usize]) -> SeedSet {
    points.iter().copied().collect()
}

/// Every point of the plane
pub fn all_points(plane: &ProjectivePlane) -> SeedSet {
    (0..plane.size()).collect()
}

/// Points on line `line`
pub fn line(plane: &ProjectivePlane, line: usize) -> SeedSet {
    plane.incident(line).iter().copied().collect()
}
