// src/gfx/scene/registry.rs
//! Scene registry: typed roles for named model nodes plus the light rig
//!
//! The loaded model is a flat list of named objects. Instead of looking
//! nodes up by string every frame, each expected name is declared once as a
//! [`NodeRole`] and bound to an object index when the model arrives. Binding
//! is exhaustive: a single missing name fails the whole load with a
//! [`SceneError::NamedNodeMissing`] naming the node, rather than faulting
//! later mid-frame.

use std::collections::HashMap;

use cgmath::Vector3;

use crate::error::SceneError;

use super::object::Object;

/// Every node the diorama model must contain, by exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Sky,
    Grass,
    House,
    Door,
    Window,
    Path,
    Wood,
    Glass,
    DoorKnob,
    Sun,
    Moon,
    Cloud,
    Roof,
}

impl NodeRole {
    pub const ALL: [NodeRole; 13] = [
        NodeRole::Sky,
        NodeRole::Grass,
        NodeRole::House,
        NodeRole::Door,
        NodeRole::Window,
        NodeRole::Path,
        NodeRole::Wood,
        NodeRole::Glass,
        NodeRole::DoorKnob,
        NodeRole::Sun,
        NodeRole::Moon,
        NodeRole::Cloud,
        NodeRole::Roof,
    ];

    /// The exact object name this role binds to in the model file.
    pub fn node_name(&self) -> &'static str {
        match self {
            NodeRole::Sky => "Sky",
            NodeRole::Grass => "Grass",
            NodeRole::House => "House",
            NodeRole::Door => "Door",
            NodeRole::Window => "Window",
            NodeRole::Path => "Path",
            NodeRole::Wood => "Wood",
            NodeRole::Glass => "Glass",
            NodeRole::DoorKnob => "DoorKnob",
            NodeRole::Sun => "Sun",
            NodeRole::Moon => "Moon",
            NodeRole::Cloud => "Cloud",
            NodeRole::Roof => "Roof",
        }
    }

    /// The palette material assigned to this role's object.
    ///
    /// Door and window share the trim material; the cloud borrows the path
    /// material. The sky carries no material id: it is rendered by the
    /// dedicated sky pipeline.
    pub fn material_id(&self) -> Option<&'static str> {
        match self {
            NodeRole::Sky => None,
            NodeRole::Grass => Some("grass"),
            NodeRole::House => Some("house"),
            NodeRole::Door | NodeRole::Window => Some("trim"),
            NodeRole::Path | NodeRole::Cloud => Some("path"),
            NodeRole::Wood => Some("wood"),
            NodeRole::Glass => Some("glass"),
            NodeRole::DoorKnob => Some("door_knob"),
            NodeRole::Sun => Some("sun"),
            NodeRole::Moon => Some("moon"),
            NodeRole::Roof => Some("roof"),
        }
    }
}

/// A mesh body the animator moves: position on the orbit plus a roll angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CelestialBody {
    pub position: Vector3<f32>,
    pub spin: f32,
}

impl CelestialBody {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            spin: 0.0,
        }
    }
}

impl Default for CelestialBody {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Live references into the loaded scene plus the light rig.
///
/// The lights exist from startup; only the bodies wait for the model. They
/// are `None` until the asynchronous load completes and
/// [`SceneRegistry::bind`] succeeds, and the animator checks that before
/// touching anything.
pub struct SceneRegistry {
    roles: HashMap<NodeRole, usize>,
    pub sun: Option<CelestialBody>,
    pub moon: Option<CelestialBody>,
    pub sun_light: PointLight,
    pub moon_light: PointLight,
    pub ambient: AmbientLight,
    /// Normalized sun angle handed to the sky shader, sun_angle / PI.
    pub sky_angle: f32,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
            sun: None,
            moon: None,
            sun_light: PointLight {
                position: Vector3::new(8.0, 0.0, 0.0),
                color: [1.0, 1.0, 1.0],
                intensity: 1.0,
            },
            moon_light: PointLight {
                position: Vector3::new(8.0, 0.0, 0.0),
                color: [0.0, 0.0, 1.0],
                intensity: 10.0,
            },
            ambient: AmbientLight {
                color: [1.0, 1.0, 1.0],
                intensity: 0.05,
            },
            sky_angle: 0.0,
        }
    }

    /// Binds every declared role against the loaded objects by exact name.
    ///
    /// Validates the full role table up front; the first missing name aborts
    /// the bind and nothing is recorded, so a failed load leaves the registry
    /// exactly as it was.
    pub fn bind(&mut self, objects: &[Object]) -> Result<(), SceneError> {
        let mut roles = HashMap::new();

        for role in NodeRole::ALL {
            let name = role.node_name();
            let index = objects
                .iter()
                .position(|object| object.name == name)
                .ok_or(SceneError::NamedNodeMissing(name))?;
            roles.insert(role, index);
        }

        self.roles = roles;
        self.sun = Some(CelestialBody::new());
        self.moon = Some(CelestialBody::new());
        Ok(())
    }

    /// Whether the load has completed and the animator may run.
    pub fn is_populated(&self) -> bool {
        self.sun.is_some() && self.moon.is_some()
    }

    /// Object index bound to a role, if the registry is populated.
    pub fn object_index(&self, role: NodeRole) -> Option<usize> {
        self.roles.get(&role).copied()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::object::Mesh;

    fn named_object(name: &str) -> Object {
        Object::new(
            name.to_string(),
            Mesh::new(vec![0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![]),
        )
    }

    fn full_node_set() -> Vec<Object> {
        NodeRole::ALL
            .iter()
            .map(|role| named_object(role.node_name()))
            .collect()
    }

    #[test]
    fn test_bind_full_model() {
        let mut registry = SceneRegistry::new();
        assert!(!registry.is_populated());

        registry.bind(&full_node_set()).unwrap();

        assert!(registry.is_populated());
        for role in NodeRole::ALL {
            assert!(registry.object_index(role).is_some());
        }
    }

    #[test]
    fn test_bind_is_order_independent() {
        let mut objects = full_node_set();
        objects.reverse();

        let mut registry = SceneRegistry::new();
        registry.bind(&objects).unwrap();

        let sun_index = registry.object_index(NodeRole::Sun).unwrap();
        assert_eq!(objects[sun_index].name, "Sun");
    }

    #[test]
    fn test_missing_sun_reports_node_name() {
        let objects: Vec<Object> = full_node_set()
            .into_iter()
            .filter(|object| object.name != "Sun")
            .collect();

        let mut registry = SceneRegistry::new();
        let err = registry.bind(&objects).unwrap_err();

        match err {
            SceneError::NamedNodeMissing(name) => assert_eq!(name, "Sun"),
            other => panic!("unexpected error: {other}"),
        }
        // A failed bind must not half-populate the registry.
        assert!(!registry.is_populated());
        assert!(registry.object_index(NodeRole::House).is_none());
    }

    #[test]
    fn test_initial_light_rig() {
        let registry = SceneRegistry::new();
        assert_eq!(registry.sun_light.position.x, 8.0);
        assert_eq!(registry.moon_light.color, [0.0, 0.0, 1.0]);
        assert_eq!(registry.ambient.intensity, 0.05);
    }
}
