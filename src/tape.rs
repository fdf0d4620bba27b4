//! Sparse memory tape.
//!
//! Positions are signed so an unbounded tape can extend to the left of its
//! starting cell. Cells that were never written read as 0 and take no storage.

use std::collections::HashMap;

/// Exclusive upper bound of a cell value: one past the last Unicode code point.
pub const CELL_MODULUS: u64 = 0x110000;

/// Bounds `n` to `[0, boundary)`.
///
/// Returns `n` modulo `boundary` (always non-negative) when `boundary` is
/// larger than 0, and `n` unchanged when `boundary` equals 0.
///
/// Boundaries above `i64::MAX` are treated as `i64::MAX`: a head moving one
/// cell per step never gets that far from where it started.
pub fn bound_value(n: i64, boundary: u64) -> i64 {
    if boundary == 0 {
        n
    } else {
        n.rem_euclid(i64::try_from(boundary).unwrap_or(i64::MAX))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tape {
    cells: HashMap<i64, u32>,
    size: u64,
}

impl Tape {
    /// A tape with `size` cells arranged in a circle, or unbounded when `size` is 0.
    pub fn new(size: usize) -> Self {
        Self {
            cells: HashMap::new(),
            size: size as u64,
        }
    }

    /// Normalize a head position into the tape's bounds.
    pub fn wrap(&self, position: i64) -> i64 {
        bound_value(position, self.size)
    }

    pub fn get(&self, position: i64) -> u32 {
        self.cells.get(&position).copied().unwrap_or(0)
    }

    /// Store `value` at `position`, reduced into the cell range.
    pub fn set(&mut self, position: i64, value: i64) {
        debug_assert_eq!(position, self.wrap(position), "unnormalized head {position}");
        let value = bound_value(value, CELL_MODULUS) as u32;
        if value == 0 {
            self.cells.remove(&position);
        } else {
            self.cells.insert(position, value);
        }
    }

    pub fn add(&mut self, position: i64, delta: i64) -> u32 {
        let next = i64::from(self.get(position)) + delta;
        self.set(position, next);
        self.get(position)
    }

    /// Number of cells currently holding a nonzero value.
    pub fn materialized(&self) -> usize {
        self.cells.len()
    }
}
