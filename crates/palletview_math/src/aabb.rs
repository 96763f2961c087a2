//! Axis-aligned bounding boxes

use serde::{Serialize, Deserialize};

use crate::mat4::{self, Mat4};
use crate::Vec3;

/// Axis-aligned bounding box
///
/// An empty box has `min > max` on every axis; expanding it by a point
/// produces a degenerate box containing just that point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// The empty box (identity for [`Aabb::union`])
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Box spanning two corner points (in any order)
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min_components(b),
            max: a.max_components(b),
        }
    }

    /// Box centered at `center` with the given full size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box containing all points
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.expand_to_include(p);
        }
        aabb
    }

    /// True if the box contains no points
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Grow the box to include `p`
    pub fn expand_to_include(&mut self, p: Vec3) {
        self.min = self.min.min_components(p);
        self.max = self.max.max_components(p);
    }

    /// Smallest box containing both boxes
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    /// Center point (zero for an empty box)
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis (zero for an empty box)
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::ZERO;
        }
        self.max - self.min
    }

    /// Largest of the three extents
    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// The eight corners
    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    /// Axis-aligned box enclosing this box after an affine transform
    pub fn transformed(&self, m: &Mat4) -> Self {
        if self.is_empty() {
            return Self::EMPTY;
        }
        Self::from_points(self.corners().map(|c| mat4::transform_point(m, c)))
    }

    /// True if `p` lies inside or on the boundary
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_box() {
        let aabb = Aabb::EMPTY;
        assert!(aabb.is_empty());
        assert_eq!(aabb.center(), Vec3::ZERO);
        assert_eq!(aabb.max_extent(), 0.0);
    }

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 4.0, 3.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, 1.5));
        assert_eq!(aabb.max_extent(), 6.0);
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(a.union(&Aabb::EMPTY), a);
        assert_eq!(Aabb::EMPTY.union(&a), a);
    }

    #[test]
    fn test_transformed_by_translation() {
        let a = Aabb::from_center_size(Vec3::ZERO, Vec3::new(2.0, 2.0, 2.0));
        let m = mat4::translation(Vec3::new(10.0, 0.0, 0.0));
        let t = a.transformed(&m);
        assert_eq!(t.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(t.max, Vec3::new(11.0, 1.0, 1.0));
    }

    #[test]
    fn test_contains_point() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert!(a.contains_point(Vec3::splat(0.5)));
        assert!(a.contains_point(Vec3::ONE));
        assert!(!a.contains_point(Vec3::new(1.5, 0.5, 0.5)));
    }
}
