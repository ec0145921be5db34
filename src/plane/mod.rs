//! Projective plane incidence structure
//!
//! Points and lines of PG(2,q) share one index space `0..q²+q+1`; an index
//! names a point or, through duality, a line. Two indices are incident when
//! the dot product of their coordinate triples vanishes mod `q`.
//!
//! The order is not checked for primality. A composite order produces a
//! structure that is not a projective plane; callers that care should test
//! [`is_prime`] first.

mod triple;

pub use triple::{index_to_triple, Triple};

use std::time::Instant;

use crate::PercolationError;

/// Incidence structure of PG(2,q)
///
/// Immutable after construction, so one plane can be shared by any number
/// of percolation runs.
#[derive(Debug, Clone)]
pub struct ProjectivePlane {
    /// Order q
    order: usize,

    /// Number of points (= number of lines) q² + q + 1
    size: usize,

    /// incidences[i] = indices incident to i, ascending
    incidences: Vec<Vec<usize>>,
}

impl ProjectivePlane {
    /// Build the plane of the given order.
    ///
    /// Every pair `(i, j)` with `j ≤ i` is tested once; this quadratic scan
    /// is the dominant construction cost.
    pub fn new(order: usize) -> Result<Self, PercolationError> {
        let size = plane_size(order)?;
        let started = Instant::now();
        let triples: Vec<Triple> = (0..size).map(|i| index_to_triple(order, i)).collect();

        let mut incidences: Vec<Vec<usize>> = vec![Vec::with_capacity(order + 1); size];
        for i in 0..size {
            for j in 0..=i {
                if triples[i].dot_mod(&triples[j], order) == 0 {
                    incidences[i].push(j);
                    if i != j {
                        incidences[j].push(i);
                    }
                }
            }
        }

        tracing::debug!(
            order,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built projective plane"
        );

        Ok(Self {
            order,
            size,
            incidences,
        })
    }

    /// Order q
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of points, which is also the number of lines
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of points on each line (q + 1 for prime q)
    pub fn line_size(&self) -> usize {
        self.order + 1
    }

    /// Coordinate triple of an index
    pub fn triple(&self, index: usize) -> Triple {
        index_to_triple(self.order, index)
    }

    /// Whether indices `a` and `b` are incident
    pub fn are_incident(&self, a: usize, b: usize) -> bool {
        self.triple(a).dot_mod(&self.triple(b), self.order) == 0
    }

    /// Indices incident to `index`: the lines through a point, or the points
    /// on a line
    pub fn incident(&self, index: usize) -> &[usize] {
        &self.incidences[index]
    }

    /// Reject point indices outside the plane
    pub fn check_point(&self, index: usize) -> Result<(), PercolationError> {
        if index < self.size {
            Ok(())
        } else {
            Err(PercolationError::PointIndexOutOfRange {
                index,
                size: self.size,
            })
        }
    }
}

/// Number of points of PG(2,q), `q² + q + 1`.
///
/// Fails for order 0 and for orders whose size does not fit in `usize`.
pub fn plane_size(order: usize) -> Result<usize, PercolationError> {
    if order == 0 {
        return Err(PercolationError::InvalidOrder(order));
    }
    order
        .checked_mul(order)
        .and_then(|square| square.checked_add(order))
        .and_then(|sum| sum.checked_add(1))
        .ok_or(PercolationError::InvalidOrder(order))
}

/// Check if a number is prime
///
/// Only prime orders give a projective plane with this construction.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut divisor = 3;
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fano_plane() {
        let plane = ProjectivePlane::new(2).unwrap();
        assert_eq!(plane.size(), 7);

        for index in 0..7 {
            assert_eq!(plane.incident(index).len(), 3);
        }

        assert_eq!(plane.incident(0), &[4, 5, 6]);
        assert_eq!(plane.incident(4), &[0, 2, 6]);
        assert_eq!(plane.incident(6), &[0, 1, 4]);
    }

    #[test]
    fn test_self_incidence_preserved() {
        let plane = ProjectivePlane::new(2).unwrap();
        // (0,1,1)·(0,1,1) = 2 ≡ 0 mod 2
        assert!(plane.incident(1).contains(&1));
        // (0,0,1)·(0,0,1) = 1
        assert!(!plane.incident(0).contains(&0));
    }

    #[test]
    fn test_neighbour_lists_sorted() {
        let plane = ProjectivePlane::new(5).unwrap();
        for index in 0..plane.size() {
            assert!(plane.incident(index).windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_order_7_plane() {
        let plane = ProjectivePlane::new(7).unwrap();
        assert_eq!(plane.size(), 57);
        assert_eq!(plane.line_size(), 8);

        for index in 0..57 {
            assert_eq!(plane.incident(index).len(), 8);
        }
    }

    #[test]
    fn test_are_incident_matches_lists() {
        let plane = ProjectivePlane::new(3).unwrap();
        for a in 0..plane.size() {
            for b in 0..plane.size() {
                assert_eq!(plane.are_incident(a, b), plane.incident(a).contains(&b));
            }
        }
    }

    #[test]
    fn test_zero_order_rejected() {
        assert!(matches!(
            ProjectivePlane::new(0),
            Err(PercolationError::InvalidOrder(0))
        ));
    }

    #[test]
    fn test_composite_order_is_not_validated() {
        // Order 4 builds, but is not a projective plane
        let plane = ProjectivePlane::new(4).unwrap();
        assert_eq!(plane.size(), 21);
        assert!((0..plane.size()).any(|i| plane.incident(i).len() != 5));
    }

    #[test]
    fn test_oversized_order_rejected() {
        assert_eq!(plane_size(7).unwrap(), 57);
        assert!(matches!(
            ProjectivePlane::new(1 << 32),
            Err(PercolationError::InvalidOrder(order)) if order == 1 << 32
        ));
        assert!(matches!(
            plane_size(usize::MAX),
            Err(PercolationError::InvalidOrder(_))
        ));
    }

    #[test]
    fn test_check_point() {
        let plane = ProjectivePlane::new(2).unwrap();
        assert!(plane.check_point(6).is_ok());
        assert!(matches!(
            plane.check_point(7),
            Err(PercolationError::PointIndexOutOfRange { index: 7, size: 7 })
        ));
    }

    #[test]
    fn test_valid_orders() {
        assert!(is_prime(2));
        assert!(is_prime(3));
        assert!(is_prime(5));
        assert!(is_prime(7));
        assert!(is_prime(101));
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(4));
        assert!(!is_prime(9));
        assert!(!is_prime(25));
        assert!(is_prime(1_000_000_007));
        assert!(!is_prime(usize::MAX));
    }
}
