//! Scene lighting

use crate::foundation::math::Vector3;

/// A single directional light
///
/// Direction is the way the light travels, stored normalized.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    direction: Vector3,
    intensity: f32,
}

impl DirectionalLight {
    /// Create a light travelling along `direction` with scalar `intensity`
    pub fn new(direction: Vector3, intensity: f32) -> Self {
        Self {
            direction: direction.normalized(),
            intensity,
        }
    }

    /// Normalized travel direction
    pub fn direction(&self) -> Vector3 {
        self.direction
    }

    /// Scalar intensity
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Replace the direction; renormalized on write
    pub fn set_direction(&mut self, direction: Vector3) {
        self.direction = direction.normalized();
    }

    /// Replace the intensity
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity;
    }
}

impl Default for DirectionalLight {
    /// Overhead light at unit intensity
    fn default() -> Self {
        Self::new(Vector3::new(0.0, -1.0, 0.0), 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalized() {
        let light = DirectionalLight::new(Vector3::new(0.0, -2.0, 0.0), 0.8);
        assert_relative_eq!(light.direction().length(), 1.0);
        assert_relative_eq!(light.intensity(), 0.8);
    }
}
