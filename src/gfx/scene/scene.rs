// src/gfx/scene/scene.rs
use wgpu::Device;

use crate::error::SceneError;
use crate::gfx::{
    camera::Camera,
    resources::material::MaterialManager,
    scene::loader::LoadedModel,
    scene::object::Mesh,
    scene::registry::{NodeRole, SceneRegistry},
};

use super::object::Object;

/// Main scene: camera, loaded objects, the palette, and the registry.
pub struct Scene {
    pub camera: Camera,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager,
    pub registry: SceneRegistry,
}

impl Scene {
    /// Creates an empty scene with the diorama palette preloaded.
    ///
    /// Objects arrive later, when the asynchronous model load resolves and
    /// [`Scene::install_model`] runs.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            objects: Vec::new(),
            material_manager: MaterialManager::house_palette(),
            registry: SceneRegistry::new(),
        }
    }

    /// Updates per-frame scene state (camera matrices).
    pub fn update(&mut self) {
        self.camera.update_view_proj();
    }

    /// Installs the loaded model: builds objects, binds every node role, and
    /// assigns palette materials.
    ///
    /// Runs exactly once, when the one-shot load channel resolves. On a
    /// binding failure the scene keeps no objects, so the system stays in the
    /// awaiting-assets state it was in before the call.
    pub fn install_model(&mut self, models: Vec<LoadedModel>) -> Result<(), SceneError> {
        let mut objects = Vec::with_capacity(models.len());

        for model in models {
            // Use normals from the file if present, otherwise reconstruct.
            let normals = if !model.normals.is_empty()
                && model.normals.len() == model.positions.len()
            {
                model.normals
            } else {
                log::warn!("object '{}' has no normals, reconstructing", model.name);
                Mesh::calculate_face_normals(&model.positions, &model.indices)
            };

            let mesh = Mesh::new(model.positions, normals, model.indices);
            objects.push(Object::new(model.name, mesh));
        }

        self.registry.bind(&objects)?;

        for role in NodeRole::ALL {
            let index = self
                .registry
                .object_index(role)
                .expect("bind succeeded, every role is mapped");
            if let Some(material_id) = role.material_id() {
                objects[index].set_material(material_id);
            }
        }

        self.objects = objects;
        log::info!("scene registry populated, {} objects", self.objects.len());
        Ok(())
    }

    /// Initializes GPU resources for all objects and materials
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device);
        }

        self.material_manager.update_all_gpu_resources(device, queue);
    }

    /// Pushes the animated sun and moon poses into their objects' transforms
    /// and syncs them to the GPU.
    pub fn sync_celestial_transforms(&mut self, queue: &wgpu::Queue) {
        let poses = [
            (NodeRole::Sun, self.registry.sun),
            (NodeRole::Moon, self.registry.moon),
        ];

        for (role, body) in poses {
            let Some(body) = body else { continue };
            let Some(index) = self.registry.object_index(role) else {
                continue;
            };
            if let Some(object) = self.objects.get_mut(index) {
                object.set_pose(body.position, cgmath::Rad(body.spin));
                object.update_transform(queue);
            }
        }
    }

    /// Gets material for rendering an object
    pub fn material_for_object(
        &self,
        object: &Object,
    ) -> &crate::gfx::resources::material::Material {
        self.material_manager.material_for_object(object.material_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::loader::LoadedModel;

    fn model(name: &str) -> LoadedModel {
        LoadedModel {
            name: name.to_string(),
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            indices: vec![0, 1, 2],
        }
    }

    fn full_model_set() -> Vec<LoadedModel> {
        NodeRole::ALL
            .iter()
            .map(|role| model(role.node_name()))
            .collect()
    }

    #[test]
    fn test_install_binds_and_assigns_materials() {
        let mut scene = Scene::new(Camera::new(1.0));
        scene.install_model(full_model_set()).unwrap();

        assert!(scene.registry.is_populated());

        let house_index = scene.registry.object_index(NodeRole::House).unwrap();
        assert_eq!(
            scene.objects[house_index].material_id().map(String::as_str),
            Some("house")
        );

        // The sky draws through its own pipeline and carries no material.
        let sky_index = scene.registry.object_index(NodeRole::Sky).unwrap();
        assert!(scene.objects[sky_index].material_id().is_none());
    }

    #[test]
    fn test_install_failure_leaves_scene_empty() {
        let models: Vec<LoadedModel> = full_model_set()
            .into_iter()
            .filter(|m| m.name != "Moon")
            .collect();

        let mut scene = Scene::new(Camera::new(1.0));
        let err = scene.install_model(models).unwrap_err();

        assert!(matches!(err, SceneError::NamedNodeMissing("Moon")));
        assert!(scene.objects.is_empty());
        assert!(!scene.registry.is_populated());
    }

    #[test]
    fn test_missing_normals_are_reconstructed() {
        let mut models = full_model_set();
        models[0].normals.clear();

        let mut scene = Scene::new(Camera::new(1.0));
        scene.install_model(models).unwrap();

        assert_eq!(scene.objects[0].mesh.vertex_count(), 3);
    }
}
