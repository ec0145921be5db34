use std::fmt;

/// Homogeneous coordinates `(x, y, z)` over the integers mod `q`
///
/// The same triple names a point and, under duality, the line with
/// equation `x·X + y·Y + z·Z = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triple {
    /// First coordinate
    pub x: usize,
    /// Second coordinate
    pub y: usize,
    /// Third coordinate
    pub z: usize,
}

impl Triple {
    /// Create a triple from raw coordinates
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Dot product reduced mod `order`
    pub fn dot_mod(&self, other: &Triple, order: usize) -> usize {
        let dot = (self.x as u64) * (other.x as u64)
            + (self.y as u64) * (other.y as u64)
            + (self.z as u64) * (other.z as u64);
        (dot % order as u64) as usize
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.x, self.y, self.z)
    }
}

/// Map an index in `0..q²+q+1` to its coordinate triple.
///
/// Indices `0..q²` are the affine points `(i / q, i % q, 1)`, the next `q`
/// indices are `(i - q², 1, 0)` and the last index is `(1, 0, 0)`. Any index
/// past the affine and ideal ranges maps to `(1, 0, 0)`.
pub fn index_to_triple(order: usize, index: usize) -> Triple {
    let affine = order.saturating_mul(order);
    if index < affine {
        Triple::new(index / order, index % order, 1)
    } else if index < affine.saturating_add(order) {
        Triple::new(index - affine, 1, 0)
    } else {
        Triple::new(1, 0, 0)
    }
}
