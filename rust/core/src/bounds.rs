// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned plan bounds
//!
//! Used for door bounding boxes and for the padded world extent a grid is
//! laid over.

use floorgrid_geometry::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point2,
    pub max: Point2,
}

impl Aabb {
    /// Bounds spanning `min`..`max`
    pub const fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Create new bounds initialized to invalid state
    pub fn empty() -> Self {
        Self {
            min: Point2::new(f64::MAX, f64::MAX),
            max: Point2::new(f64::MIN, f64::MIN),
        }
    }

    /// Smallest bounds containing every point; invalid if the iterator is empty
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand(*p);
        }
        bounds
    }

    /// Check if bounds are valid (at least one point added)
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Expand bounds to include a point
    #[inline]
    pub fn expand(&mut self, p: Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Expand bounds to include another box
    #[inline]
    pub fn union(&mut self, other: &Aabb) {
        if other.is_valid() {
            self.expand(other.min);
            self.expand(other.max);
        }
    }

    /// Copy grown by `pad` on every side
    #[inline]
    pub fn padded(&self, pad: f64) -> Self {
        Self {
            min: Point2::new(self.min.x - pad, self.min.y - pad),
            max: Point2::new(self.max.x + pad, self.max.y + pad),
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Point2 {
        self.min.midpoint(&self.max)
    }

    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
