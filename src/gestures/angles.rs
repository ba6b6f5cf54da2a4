//! Elbow angle calculation using dot product
//!
//! Deflection between the upper arm (shoulder→elbow) and the forearm
//! (elbow→wrist): 0° when the arm is a straight line, 90° when bent square.

use nalgebra::Vector3;

/// Deflection angle in degrees, or None for a degenerate (zero-length) segment
pub fn elbow_deflection_deg(shoulder: Vector3<f32>, elbow: Vector3<f32>, wrist: Vector3<f32>) -> Option<f32> {
    let upper = (elbow - shoulder).try_normalize(1e-4)?;
    let fore = (wrist - elbow).try_normalize(1e-4)?;

    let cos_angle = upper.dot(&fore).clamp(-1.0, 1.0);
    Some(cos_angle.acos().to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_straight_arm() {
        let shoulder = Vector3::new(0.0, 0.0, 0.0);
        let elbow = Vector3::new(0.5, 0.0, 0.0);
        let wrist = Vector3::new(1.0, 0.0, 0.0);
        let angle = elbow_deflection_deg(shoulder, elbow, wrist).unwrap();
        assert!(angle.abs() < 1.0);
    }

    #[test]
    fn test_bent_arm() {
        let shoulder = Vector3::new(0.0, 0.0, 0.0);
        let elbow = Vector3::new(0.5, 0.0, 0.0);
        let wrist = Vector3::new(0.5, 0.5, 0.0);
        let angle = elbow_deflection_deg(shoulder, elbow, wrist).unwrap();
        assert!((angle - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_degenerate_segment() {
        let p = Vector3::new(0.3, 0.3, 0.0);
        assert!(elbow_deflection_deg(p, p, Vector3::new(1.0, 0.0, 0.0)).is_none());
    }
}
