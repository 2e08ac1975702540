//! View and projection state

use crate::foundation::math::{Matrix4x4, Vector3};

/// Projection parameters for a [`Camera`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov_y: f32,
        /// Width / height ratio
        aspect: f32,
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },
    /// Orthographic projection
    Orthographic {
        /// Left clip plane
        left: f32,
        /// Right clip plane
        right: f32,
        /// Bottom clip plane
        bottom: f32,
        /// Top clip plane
        top: f32,
        /// Near clip distance
        near: f32,
        /// Far clip distance
        far: f32,
    },
}

/// Camera combining a look-at view with a projection
#[derive(Debug, Clone)]
pub struct Camera {
    eye: Vector3,
    target: Vector3,
    up: Vector3,
    projection: Projection,
}

impl Camera {
    /// Create a perspective camera at the origin looking down -Z
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            eye: Vector3::zero(),
            target: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            },
        }
    }

    /// Create an orthographic camera at the origin looking down -Z
    pub fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        Self {
            eye: Vector3::zero(),
            target: Vector3::new(0.0, 0.0, -1.0),
            up: Vector3::new(0.0, 1.0, 0.0),
            projection: Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            },
        }
    }

    /// Camera position
    pub fn eye(&self) -> Vector3 {
        self.eye
    }

    /// Point the camera from `eye` at `target` with the given up vector
    pub fn look_at(&mut self, eye: Vector3, target: Vector3, up: Vector3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
    }

    /// Replace the projection parameters
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    /// Write the view matrix into `out`
    pub fn view_into<'a>(&self, out: &'a mut Matrix4x4) -> &'a mut Matrix4x4 {
        Matrix4x4::look_at_into(out, &self.eye, &self.target, &self.up)
    }

    /// Write the projection matrix into `out`
    pub fn projection_into<'a>(&self, out: &'a mut Matrix4x4) -> &'a mut Matrix4x4 {
        match self.projection {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => Matrix4x4::perspective_into(out, fov_y, aspect, near, far),
            Projection::Orthographic {
                left,
                right,
                bottom,
                top,
                near,
                far,
            } => Matrix4x4::orthographic_into(out, left, right, bottom, top, near, far),
        }
    }

    /// Write the combined projection * view matrix into `out`
    pub fn view_projection_into<'a>(&self, out: &'a mut Matrix4x4) -> &'a mut Matrix4x4 {
        let mut view = Matrix4x4::identity();
        let mut projection = Matrix4x4::identity();
        self.view_into(&mut view);
        self.projection_into(&mut projection);
        Matrix4x4::multiply_into(out, &projection, &view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_projection_maps_target_to_clip_center() {
        let mut camera = Camera::perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
        camera.look_at(
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::zero(),
            Vector3::new(0.0, 1.0, 0.0),
        );

        let mut vp = Matrix4x4::identity();
        camera.view_projection_into(&mut vp);

        // The look-at target sits on the view axis, so x and y project to 0.
        let projected = vp.transform_point(&Vector3::zero());
        assert_relative_eq!(projected.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(projected.y, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_camera_preserves_centered_point() {
        let camera = Camera::orthographic(-1.0, 1.0, -1.0, 1.0, -1.0, 1.0);
        let mut vp = Matrix4x4::identity();
        camera.view_projection_into(&mut vp);

        let p = vp.transform_point(&Vector3::new(0.5, -0.5, -0.5));
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-5);
        assert_relative_eq!(p.y, -0.5, epsilon = 1e-5);
    }
}
