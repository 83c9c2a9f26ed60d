// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Exact rational coordinates and orientation predicates
//!
//! Every sidedness decision in the boolean pipeline is made here, on
//! arbitrary precision rationals. Floating point values only ever flow out
//! of this module (for metrics and export), never back into a decision.

use nalgebra::Point3;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;

/// Exact point in 3D.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point3Q {
    pub x: BigRational,
    pub y: BigRational,
    pub z: BigRational,
}

/// Exact vector in 3D.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Vector3Q {
    pub x: BigRational,
    pub y: BigRational,
    pub z: BigRational,
}

impl Point3Q {
    pub fn new(x: BigRational, y: BigRational, z: BigRational) -> Self {
        Self { x, y, z }
    }

    pub fn origin() -> Self {
        Self::new(BigRational::zero(), BigRational::zero(), BigRational::zero())
    }

    /// Point with integer coordinates.
    pub fn from_ints(x: i64, y: i64, z: i64) -> Self {
        Self::new(int(x), int(y), int(z))
    }

    /// Exact conversion of a finite float triple; `None` if any component is NaN or infinite.
    pub fn from_f64(co: [f64; 3]) -> Option<Self> {
        Some(Self::new(
            BigRational::from_float(co[0])?,
            BigRational::from_float(co[1])?,
            BigRational::from_float(co[2])?,
        ))
    }

    /// Float approximation, for metrics and export only.
    pub fn to_f64(&self) -> Point3<f64> {
        Point3::new(ratio_to_f64(&self.x), ratio_to_f64(&self.y), ratio_to_f64(&self.z))
    }

    /// Coordinate along `axis` (0 = x, 1 = y, 2 = z).
    pub fn coord(&self, axis: usize) -> &BigRational {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    pub fn from_axes(coords: [BigRational; 3]) -> Self {
        let [x, y, z] = coords;
        Self::new(x, y, z)
    }

    pub fn sub(&self, other: &Point3Q) -> Vector3Q {
        Vector3Q::new(&self.x - &other.x, &self.y - &other.y, &self.z - &other.z)
    }

    pub fn add(&self, v: &Vector3Q) -> Point3Q {
        Point3Q::new(&self.x + &v.x, &self.y + &v.y, &self.z + &v.z)
    }

    /// Position vector of this point.
    pub fn coords(&self) -> Vector3Q {
        Vector3Q::new(self.x.clone(), self.y.clone(), self.z.clone())
    }
}

impl fmt::Display for Point3Q {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Vector3Q {
    pub fn new(x: BigRational, y: BigRational, z: BigRational) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(BigRational::zero(), BigRational::zero(), BigRational::zero())
    }

    pub fn cross(&self, o: &Vector3Q) -> Vector3Q {
        Vector3Q::new(
            &self.y * &o.z - &self.z * &o.y,
            &self.z * &o.x - &self.x * &o.z,
            &self.x * &o.y - &self.y * &o.x,
        )
    }

    pub fn dot(&self, o: &Vector3Q) -> BigRational {
        &self.x * &o.x + &self.y * &o.y + &self.z * &o.z
    }

    pub fn add_assign(&mut self, o: &Vector3Q) {
        self.x += &o.x;
        self.y += &o.y;
        self.z += &o.z;
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero() && self.z.is_zero()
    }
}

/// Exact supporting plane `norm . p + d = 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    pub norm: Vector3Q,
    pub d: BigRational,
}

impl Plane {
    /// Newell normal of a closed polygon; its length is twice the polygon area.
    pub fn from_polygon(points: &[&Point3Q]) -> Self {
        let mut norm = Vector3Q::zero();
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            norm.add_assign(&p.coords().cross(&q.coords()));
        }
        let d = match points.first() {
            Some(p0) => -norm.dot(&p0.coords()),
            None => BigRational::zero(),
        };
        Self { norm, d }
    }

    /// Signed side of `p`: `Greater` on the side the normal points to.
    pub fn side(&self, p: &Point3Q) -> Ordering {
        (self.norm.dot(&p.coords()) + &self.d).cmp(&BigRational::zero())
    }

    pub fn is_degenerate(&self) -> bool {
        self.norm.is_zero()
    }
}

/// Sign of `det[a - d; b - d; c - d]`.
///
/// `Greater` when `d` lies below the plane through `a`, `b`, `c`, that is on
/// the side opposite to where the counter-clockwise normal of `abc` points.
pub fn orient3d(a: &Point3Q, b: &Point3Q, c: &Point3Q, d: &Point3Q) -> Ordering {
    let ad = a.sub(d);
    let bd = b.sub(d);
    let cd = c.sub(d);
    ad.dot(&bd.cross(&cd)).cmp(&BigRational::zero())
}

/// True when `b` lies on the segment line through `a` and `c` (zero exact cross product).
pub fn collinear(a: &Point3Q, b: &Point3Q, c: &Point3Q) -> bool {
    b.sub(a).cross(&c.sub(b)).is_zero()
}

/// Absolute value of `num / den`, or `None` when `den` is zero.
pub fn abs_ratio(num: &BigRational, den: &BigRational) -> Option<BigRational> {
    if den.is_zero() {
        None
    } else {
        Some((num / den).abs())
    }
}

pub fn int(v: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(v))
}

pub fn ratio_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}
