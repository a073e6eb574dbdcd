use bytemuck::{Pod, Zeroable};
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

/// Tolerance on `|v| == 1` for directions handed to projectors and tessellators.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-5;

/// 3D vector in double precision.
///
/// Used for directions on the celestial sphere and for projected window
/// coordinates (`x`, `y` in pixels, `z` depth or visibility marker).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const X: Vec3 = Vec3::new(1.0, 0.0, 0.0);
    pub const Y: Vec3 = Vec3::new(0.0, 1.0, 0.0);
    pub const Z: Vec3 = Vec3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector from longitude/latitude in radians (`z` toward latitude +90°).
    #[inline]
    pub fn from_spherical(lon: f64, lat: f64) -> Self {
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();
        Self::new(clat * clon, clat * slon, slat)
    }

    #[inline]
    pub fn dot(self, rhs: Vec3) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    #[inline]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_squared().sqrt()
    }

    /// Returns the unit vector. A zero vector stays zero.
    #[inline]
    pub fn normalized(self) -> Self {
        let n = self.norm();
        if n > 0.0 { self / n } else { self }
    }

    #[inline]
    pub fn is_unit(self) -> bool {
        (self.norm() - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Angle between two directions in radians.
    #[inline]
    pub fn angle(self, rhs: Vec3) -> f64 {
        let cos = self.dot(rhs) / (self.norm() * rhs.norm());
        cos.clamp(-1.0, 1.0).acos()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    #[inline]
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn div(self, rhs: f64) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Panics unless `v` is unit length within [`UNIT_NORM_TOLERANCE`].
#[inline]
#[track_caller]
pub fn assert_unit(v: Vec3) {
    assert!(
        v.is_unit(),
        "direction must be unit length (|v| = {}, v = {:?})",
        v.norm(),
        v
    );
}
