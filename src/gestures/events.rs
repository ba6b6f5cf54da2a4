//! Gesture events and hit-test targets shared with the locomotion consumer

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Left => "left",
            Hand::Right => "right",
        }
    }
}

/// Which external collection an object came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Resource,
    Hostile,
    Fauna,
}

impl TargetKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "resource" | "resources" => Some(TargetKind::Resource),
            "hostile" | "hostiles" => Some(TargetKind::Hostile),
            "fauna" => Some(TargetKind::Fauna),
            _ => None,
        }
    }
}

/// A punchable object owned by the host
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldObject {
    pub handle: u64,
    pub position: Vector3<f32>,
}

/// The three collections a punch is tested against
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitTargets {
    pub resources: Vec<WorldObject>,
    pub hostiles: Vec<WorldObject>,
    pub fauna: Vec<WorldObject>,
}

impl HitTargets {
    pub fn collection_mut(&mut self, kind: TargetKind) -> &mut Vec<WorldObject> {
        match kind {
            TargetKind::Resource => &mut self.resources,
            TargetKind::Hostile => &mut self.hostiles,
            TargetKind::Fauna => &mut self.fauna,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TargetKind, &WorldObject)> {
        self.resources
            .iter()
            .map(|o| (TargetKind::Resource, o))
            .chain(self.hostiles.iter().map(|o| (TargetKind::Hostile, o)))
            .chain(self.fauna.iter().map(|o| (TargetKind::Fauna, o)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PunchHit {
    pub kind: TargetKind,
    pub handle: u64,
    pub distance: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureKind {
    Step {
        impulse: Vector3<f32>,
    },
    Turn {
        yaw_delta: f32,
        target_yaw: f32,
    },
    Punch {
        hand: Hand,
        position: Vector3<f32>,
        velocity: f32,
        hits: Vec<PunchHit>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub timestamp_ms: f64,
    #[serde(flatten)]
    pub kind: GestureKind,
}

impl GestureEvent {
    pub fn new(timestamp_ms: f64, kind: GestureKind) -> Self {
        Self { timestamp_ms, kind }
    }

    pub fn is_step(&self) -> bool {
        matches!(self.kind, GestureKind::Step { .. })
    }

    pub fn is_turn(&self) -> bool {
        matches!(self.kind, GestureKind::Turn { .. })
    }

    pub fn is_punch(&self) -> bool {
        matches!(self.kind, GestureKind::Punch { .. })
    }
}

/// Unit vector on the ground plane for a yaw in degrees (0 = +z)
pub fn heading(yaw_deg: f32) -> Vector3<f32> {
    let yaw = yaw_deg.to_radians();
    Vector3::new(yaw.sin(), 0.0, yaw.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_axes() {
        let fwd = heading(0.0);
        assert!((fwd - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        let right = heading(90.0);
        assert!((right - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_event_json_is_tagged() {
        let event = GestureEvent::new(12.0, GestureKind::Turn { yaw_delta: 1.5, target_yaw: 30.0 });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"turn\""));
        assert!(json.contains("\"timestamp_ms\":12.0"));
    }

    #[test]
    fn test_targets_iterate_all_collections() {
        let obj = WorldObject { handle: 1, position: Vector3::zeros() };
        let targets = HitTargets {
            resources: vec![obj],
            hostiles: vec![obj, obj],
            fauna: vec![],
        };
        assert_eq!(targets.iter().count(), 3);
        assert_eq!(TargetKind::from_name("hostiles"), Some(TargetKind::Hostile));
        assert_eq!(TargetKind::from_name("rocks"), None);
    }
}
