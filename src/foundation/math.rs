//! Math types for 3D graphics
//!
//! Provides the vector, rotator, matrix, and transform types used throughout
//! the engine. All matrix-producing operations write into a caller-supplied
//! output matrix so per-frame code never allocates.

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// 2D vector of f32 components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vector2 {
    /// Create a new vector from components
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The zero vector
    pub fn zero() -> Self {
        Self::default()
    }

    /// Componentwise sum
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2::new(self.x + other.x, self.y + other.y)
    }

    /// Scale every component by a scalar
    pub fn scale(&self, factor: f32) -> Vector2 {
        Vector2::new(self.x * factor, self.y * factor)
    }
}

/// 3D vector of f32 components
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl Vector3 {
    /// Create a new vector from components
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// The zero vector
    pub fn zero() -> Self {
        Self::default()
    }

    /// All components one
    pub fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Componentwise sum
    pub fn add(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Componentwise difference
    pub fn sub(&self, other: &Vector3) -> Vector3 {
        Vector3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Scale every component by a scalar
    pub fn scale(&self, factor: f32) -> Vector3 {
        Vector3::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Dot product
    pub fn dot(&self, other: &Vector3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product (right-hand rule)
    pub fn cross(&self, other: &Vector3) -> Vector3 {
        Vector3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Euclidean length
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction; zero vector stays zero
    pub fn normalized(&self) -> Vector3 {
        let len = self.length();
        if len > 0.0 {
            self.scale(1.0 / len)
        } else {
            *self
        }
    }
}

impl std::ops::Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3::add(&self, &rhs)
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3::sub(&self, &rhs)
    }
}

impl std::ops::Mul<f32> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f32) -> Vector3 {
        self.scale(rhs)
    }
}

/// Orientation as yaw/pitch/roll in degrees
///
/// Every mutation renormalizes each angle modulo 360, so stored angles stay
/// inside the open interval (-360, 360) and keep their sign.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotator {
    yaw: f32,
    pitch: f32,
    roll: f32,
}

impl Rotator {
    /// Create a rotator, normalizing each angle
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self {
            yaw: yaw % 360.0,
            pitch: pitch % 360.0,
            roll: roll % 360.0,
        }
    }

    /// Yaw in degrees (rotation about the Y axis)
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch in degrees (rotation about the X axis)
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Roll in degrees (rotation about the Z axis)
    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Set yaw, normalized modulo 360
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw % 360.0;
    }

    /// Set pitch, normalized modulo 360
    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch % 360.0;
    }

    /// Set roll, normalized modulo 360
    pub fn set_roll(&mut self, roll: f32) {
        self.roll = roll % 360.0;
    }

    /// Add another rotator componentwise, renormalizing the result
    pub fn add(&mut self, other: &Rotator) {
        self.yaw = (self.yaw + other.yaw) % 360.0;
        self.pitch = (self.pitch + other.pitch) % 360.0;
        self.roll = (self.roll + other.roll) % 360.0;
    }

    /// Yaw in radians
    pub fn yaw_radians(&self) -> f32 {
        self.yaw * constants::DEG_TO_RAD
    }

    /// Pitch in radians
    pub fn pitch_radians(&self) -> f32 {
        self.pitch * constants::DEG_TO_RAD
    }

    /// Roll in radians
    pub fn roll_radians(&self) -> f32 {
        self.roll * constants::DEG_TO_RAD
    }
}

/// 4x4 matrix, 16 floats in column-major order
///
/// Element (row, col) lives at index `col * 4 + row`. Vectors are treated as
/// columns, so composition reads right to left: `multiply_into(out, &t, &s)`
/// scales first, then translates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4x4 {
    /// Column-major element storage
    pub m: [f32; 16],
}

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4x4 {
    /// The identity matrix
    pub fn identity() -> Self {
        let mut out = Self { m: [0.0; 16] };
        Self::identity_into(&mut out);
        out
    }

    /// Translation by `v`
    pub fn translation(v: &Vector3) -> Self {
        let mut out = Self::identity();
        Self::translation_into(&mut out, v);
        out
    }

    /// Nonuniform scaling by `v`
    pub fn scaling(v: &Vector3) -> Self {
        let mut out = Self::identity();
        Self::scaling_into(&mut out, v);
        out
    }

    /// Write the identity into `out`
    pub fn identity_into(out: &mut Matrix4x4) -> &mut Matrix4x4 {
        out.m = [0.0; 16];
        out.m[0] = 1.0;
        out.m[5] = 1.0;
        out.m[10] = 1.0;
        out.m[15] = 1.0;
        out
    }

    /// Write a translation matrix into `out`
    pub fn translation_into<'a>(out: &'a mut Matrix4x4, v: &Vector3) -> &'a mut Matrix4x4 {
        Self::identity_into(out);
        out.m[12] = v.x;
        out.m[13] = v.y;
        out.m[14] = v.z;
        out
    }

    /// Write a nonuniform scaling matrix into `out`
    pub fn scaling_into<'a>(out: &'a mut Matrix4x4, v: &Vector3) -> &'a mut Matrix4x4 {
        Self::identity_into(out);
        out.m[0] = v.x;
        out.m[5] = v.y;
        out.m[10] = v.z;
        out
    }

    /// Write a rotation of `angle` radians about the X axis into `out`
    pub fn rotation_x_into(out: &mut Matrix4x4, angle: f32) -> &mut Matrix4x4 {
        let (s, c) = angle.sin_cos();
        Self::identity_into(out);
        out.m[5] = c;
        out.m[6] = s;
        out.m[9] = -s;
        out.m[10] = c;
        out
    }

    /// Write a rotation of `angle` radians about the Y axis into `out`
    pub fn rotation_y_into(out: &mut Matrix4x4, angle: f32) -> &mut Matrix4x4 {
        let (s, c) = angle.sin_cos();
        Self::identity_into(out);
        out.m[0] = c;
        out.m[2] = -s;
        out.m[8] = s;
        out.m[10] = c;
        out
    }

    /// Write a rotation of `angle` radians about the Z axis into `out`
    pub fn rotation_z_into(out: &mut Matrix4x4, angle: f32) -> &mut Matrix4x4 {
        let (s, c) = angle.sin_cos();
        Self::identity_into(out);
        out.m[0] = c;
        out.m[1] = s;
        out.m[4] = -s;
        out.m[5] = c;
        out
    }

    /// Write an orthographic projection into `out`
    ///
    /// OpenGL-style column-major convention with depth range [-1, 1].
    pub fn orthographic_into(
        out: &mut Matrix4x4,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> &mut Matrix4x4 {
        Self::identity_into(out);
        out.m[0] = 2.0 / (right - left);
        out.m[5] = 2.0 / (top - bottom);
        out.m[10] = -2.0 / (far - near);
        out.m[12] = -(right + left) / (right - left);
        out.m[13] = -(top + bottom) / (top - bottom);
        out.m[14] = -(far + near) / (far - near);
        out
    }

    /// Write a perspective projection into `out`
    ///
    /// `fov_y` is the vertical field of view in radians. Depth maps to
    /// [-1, 1] per the OpenGL convention.
    pub fn perspective_into(
        out: &mut Matrix4x4,
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> &mut Matrix4x4 {
        let f = 1.0 / (fov_y * 0.5).tan();
        out.m = [0.0; 16];
        out.m[0] = f / aspect;
        out.m[5] = f;
        out.m[10] = (far + near) / (near - far);
        out.m[11] = -1.0;
        out.m[14] = (2.0 * far * near) / (near - far);
        out
    }

    /// Write a right-handed look-at view matrix into `out`
    pub fn look_at_into<'a>(
        out: &'a mut Matrix4x4,
        eye: &Vector3,
        target: &Vector3,
        up: &Vector3,
    ) -> &'a mut Matrix4x4 {
        let forward = target.sub(eye).normalized();
        let side = forward.cross(up).normalized();
        let cam_up = side.cross(&forward);

        Self::identity_into(out);
        out.m[0] = side.x;
        out.m[4] = side.y;
        out.m[8] = side.z;
        out.m[1] = cam_up.x;
        out.m[5] = cam_up.y;
        out.m[9] = cam_up.z;
        out.m[2] = -forward.x;
        out.m[6] = -forward.y;
        out.m[10] = -forward.z;
        out.m[12] = -side.dot(eye);
        out.m[13] = -cam_up.dot(eye);
        out.m[14] = forward.dot(eye);
        out
    }

    /// Write the product `a * b` into `out`
    ///
    /// With column vectors, `a * b` applies `b` first and `a` second.
    pub fn multiply_into<'a>(
        out: &'a mut Matrix4x4,
        a: &Matrix4x4,
        b: &Matrix4x4,
    ) -> &'a mut Matrix4x4 {
        let mut result = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += a.m[k * 4 + row] * b.m[col * 4 + k];
                }
                result[col * 4 + row] = sum;
            }
        }
        out.m = result;
        out
    }

    /// Write the transpose of `src` into `out`
    pub fn transpose_into<'a>(out: &'a mut Matrix4x4, src: &Matrix4x4) -> &'a mut Matrix4x4 {
        let mut result = [0.0f32; 16];
        for col in 0..4 {
            for row in 0..4 {
                result[row * 4 + col] = src.m[col * 4 + row];
            }
        }
        out.m = result;
        out
    }

    /// Write the inverse of `src` into `out`
    ///
    /// Returns `false` and leaves the identity in `out` when `src` is
    /// singular.
    pub fn invert_into(out: &mut Matrix4x4, src: &Matrix4x4) -> bool {
        let m = &src.m;
        let mut inv = [0.0f32; 16];

        inv[0] = m[5] * m[10] * m[15] - m[5] * m[11] * m[14] - m[9] * m[6] * m[15]
            + m[9] * m[7] * m[14]
            + m[13] * m[6] * m[11]
            - m[13] * m[7] * m[10];
        inv[4] = -m[4] * m[10] * m[15] + m[4] * m[11] * m[14] + m[8] * m[6] * m[15]
            - m[8] * m[7] * m[14]
            - m[12] * m[6] * m[11]
            + m[12] * m[7] * m[10];
        inv[8] = m[4] * m[9] * m[15] - m[4] * m[11] * m[13] - m[8] * m[5] * m[15]
            + m[8] * m[7] * m[13]
            + m[12] * m[5] * m[11]
            - m[12] * m[7] * m[9];
        inv[12] = -m[4] * m[9] * m[14] + m[4] * m[10] * m[13] + m[8] * m[5] * m[14]
            - m[8] * m[6] * m[13]
            - m[12] * m[5] * m[10]
            + m[12] * m[6] * m[9];
        inv[1] = -m[1] * m[10] * m[15] + m[1] * m[11] * m[14] + m[9] * m[2] * m[15]
            - m[9] * m[3] * m[14]
            - m[13] * m[2] * m[11]
            + m[13] * m[3] * m[10];
        inv[5] = m[0] * m[10] * m[15] - m[0] * m[11] * m[14] - m[8] * m[2] * m[15]
            + m[8] * m[3] * m[14]
            + m[12] * m[2] * m[11]
            - m[12] * m[3] * m[10];
        inv[9] = -m[0] * m[9] * m[15] + m[0] * m[11] * m[13] + m[8] * m[1] * m[15]
            - m[8] * m[3] * m[13]
            - m[12] * m[1] * m[11]
            + m[12] * m[3] * m[9];
        inv[13] = m[0] * m[9] * m[14] - m[0] * m[10] * m[13] - m[8] * m[1] * m[14]
            + m[8] * m[2] * m[13]
            + m[12] * m[1] * m[10]
            - m[12] * m[2] * m[9];
        inv[2] = m[1] * m[6] * m[15] - m[1] * m[7] * m[14] - m[5] * m[2] * m[15]
            + m[5] * m[3] * m[14]
            + m[13] * m[2] * m[7]
            - m[13] * m[3] * m[6];
        inv[6] = -m[0] * m[6] * m[15] + m[0] * m[7] * m[14] + m[4] * m[2] * m[15]
            - m[4] * m[3] * m[14]
            - m[12] * m[2] * m[7]
            + m[12] * m[3] * m[6];
        inv[10] = m[0] * m[5] * m[15] - m[0] * m[7] * m[13] - m[4] * m[1] * m[15]
            + m[4] * m[3] * m[13]
            + m[12] * m[1] * m[7]
            - m[12] * m[3] * m[5];
        inv[14] = -m[0] * m[5] * m[14] + m[0] * m[6] * m[13] + m[4] * m[1] * m[14]
            - m[4] * m[2] * m[13]
            - m[12] * m[1] * m[6]
            + m[12] * m[2] * m[5];
        inv[3] = -m[1] * m[6] * m[11] + m[1] * m[7] * m[10] + m[5] * m[2] * m[11]
            - m[5] * m[3] * m[10]
            - m[9] * m[2] * m[7]
            + m[9] * m[3] * m[6];
        inv[7] = m[0] * m[6] * m[11] - m[0] * m[7] * m[10] - m[4] * m[2] * m[11]
            + m[4] * m[3] * m[10]
            + m[8] * m[2] * m[7]
            - m[8] * m[3] * m[6];
        inv[11] = -m[0] * m[5] * m[11] + m[0] * m[7] * m[9] + m[4] * m[1] * m[11]
            - m[4] * m[3] * m[9]
            - m[8] * m[1] * m[7]
            + m[8] * m[3] * m[5];
        inv[15] = m[0] * m[5] * m[10] - m[0] * m[6] * m[9] - m[4] * m[1] * m[10]
            + m[4] * m[2] * m[9]
            + m[8] * m[1] * m[6]
            - m[8] * m[2] * m[5];

        let det = m[0] * inv[0] + m[1] * inv[4] + m[2] * inv[8] + m[3] * inv[12];
        if det == 0.0 {
            Self::identity_into(out);
            return false;
        }

        let inv_det = 1.0 / det;
        for (dst, value) in out.m.iter_mut().zip(inv.iter()) {
            *dst = value * inv_det;
        }
        true
    }

    /// Transform a point by this matrix (w = 1)
    pub fn transform_point(&self, p: &Vector3) -> Vector3 {
        Vector3::new(
            self.m[0] * p.x + self.m[4] * p.y + self.m[8] * p.z + self.m[12],
            self.m[1] * p.x + self.m[5] * p.y + self.m[9] * p.z + self.m[13],
            self.m[2] * p.x + self.m[6] * p.y + self.m[10] * p.z + self.m[14],
        )
    }
}

/// Position, rotation, and scale of an entity
///
/// The composed local matrix applies scale first, then the yaw, pitch, and
/// roll axis rotations in that order, then translation. Callers that build
/// matrices by hand must reproduce this exact order; axis rotations do not
/// commute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position in world units
    pub position: Vector3,

    /// Orientation in degrees
    pub rotation: Rotator,

    /// Per-axis scale factors
    pub scale: Vector3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Rotator::default(),
            scale: Vector3::one(),
        }
    }
}

impl Transform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position set
    pub fn from_position(position: Vector3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Compose the local matrix into `out` (scale, rotate, translate)
    pub fn matrix_into<'a>(&self, out: &'a mut Matrix4x4) -> &'a mut Matrix4x4 {
        let mut step = Matrix4x4::identity();
        let mut running = Matrix4x4::identity();

        Matrix4x4::scaling_into(out, &self.scale);

        Matrix4x4::rotation_y_into(&mut step, self.rotation.yaw_radians());
        Matrix4x4::multiply_into(&mut running, &step, out);

        Matrix4x4::rotation_x_into(&mut step, self.rotation.pitch_radians());
        Matrix4x4::multiply_into(out, &step, &running);

        Matrix4x4::rotation_z_into(&mut step, self.rotation.roll_radians());
        Matrix4x4::multiply_into(&mut running, &step, out);

        Matrix4x4::translation_into(&mut step, &self.position);
        Matrix4x4::multiply_into(out, &step, &running);
        out
    }

    /// Compose the local matrix into a fresh matrix
    pub fn matrix(&self) -> Matrix4x4 {
        let mut out = Matrix4x4::identity();
        self.matrix_into(&mut out);
        out
    }
}
