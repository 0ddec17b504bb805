// src/gfx/resources/material.rs
//! Material system for the diorama palette
//!
//! Materials are stored centrally in MaterialManager and objects reference
//! them by id. The palette is fixed per node role: flat colored surfaces lit
//! by the celestial rig, an emissive sun so the bloom pass picks it up, and
//! an unlit moon.

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    /// 1.0 bypasses lighting entirely (the moon disc), 0.0 is lit.
    pub unlit: f32,
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Material bind group management
pub struct MaterialBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl MaterialBindings {
    pub fn new(device: &Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::uniform())
            .create(device, "Material Bind Group");

        MaterialBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &Device, ubo: &MaterialUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Material Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        self.bind_group
            .as_ref()
            .expect("Bind group has not been created yet!")
    }
}

/// A flat-shaded material with optional emission.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub emissive: [f32; 3],
    pub unlit: bool,

    // GPU resources - shared by all objects using this material
    material_ubo: Option<MaterialUBO>,
    material_bindings: Option<MaterialBindings>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            base_color: [0.8, 0.8, 0.8, 1.0],
            emissive: [0.0, 0.0, 0.0],
            unlit: false,
            material_ubo: None,
            material_bindings: None,
        }
    }
}

impl Material {
    pub fn new(name: &str, base_color: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            emissive: [0.0, 0.0, 0.0],
            unlit: false,
            material_ubo: None,
            material_bindings: None,
        }
    }

    /// Builder pattern: construct from an 0xRRGGBB color.
    pub fn from_hex(name: &str, hex: u32) -> Self {
        Self::new(name, hex_to_rgba(hex))
    }

    /// Builder pattern: set emissive color
    pub fn with_emission(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emissive = [r, g, b];
        self
    }

    /// Builder pattern: bypass lighting
    pub fn with_unlit(mut self) -> Self {
        self.unlit = true;
        self
    }

    /// Updates GPU resources for this material
    ///
    /// Must be called after material properties change to sync with GPU.
    pub fn update_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        if self.material_ubo.is_none() {
            self.material_ubo = Some(MaterialUBO::new(device));
        }

        if self.material_bindings.is_none() {
            let mut bindings = MaterialBindings::new(device);
            if let Some(ubo) = &self.material_ubo {
                bindings.create_bind_group(device, ubo);
            }
            self.material_bindings = Some(bindings);
        }

        let uniform_data = MaterialUniform {
            base_color: self.base_color,
            emissive: self.emissive,
            unlit: if self.unlit { 1.0 } else { 0.0 },
        };

        if let Some(ubo) = &mut self.material_ubo {
            ubo.update_content(queue, uniform_data);
        }
    }

    /// Gets the bind group for rendering
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.material_bindings.as_ref().map(|b| b.bind_group())
    }

    /// Gets the bind group layout for pipeline creation
    pub fn bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.material_bindings.as_ref().map(|b| b.bind_group_layout())
    }
}

fn hex_to_rgba(hex: u32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
        1.0,
    ]
}

/// Centralized storage for all materials.
///
/// Objects reference materials by id rather than holding material data
/// directly, so GPU resources are shared between objects (door and window
/// both draw with "trim", the cloud borrows "path").
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material_id: MaterialId,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        let mut manager = Self {
            materials: HashMap::new(),
            default_material_id: "default".to_string(),
        };

        manager
            .materials
            .insert("default".to_string(), Material::default());

        manager
    }

    /// Creates a manager preloaded with the diorama palette.
    pub fn house_palette() -> Self {
        let mut manager = Self::new();

        manager.add_material(Material::from_hex("house", 0xFFBA68));
        manager.add_material(Material::from_hex("trim", 0xE7784B));
        manager.add_material(Material::from_hex("grass", 0x9BE717));
        manager.add_material(Material::from_hex("wood", 0x63360A));
        manager.add_material(Material::from_hex("path", 0xC8C8C8));
        manager.add_material(Material::from_hex("roof", 0xA98156));
        manager.add_material(Material::from_hex("glass", 0xE4FFA5));
        manager.add_material(Material::from_hex("door_knob", 0xFFFE17));
        manager.add_material(
            Material::from_hex("sun", 0xE79900).with_emission(0.906, 0.6, 0.0),
        );
        manager.add_material(Material::from_hex("moon", 0x71B6F2).with_unlit());

        manager
    }

    /// Adds a material to the library
    pub fn add_material(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    /// Gets a material by ID
    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    /// Gets a mutable material by ID
    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    /// Gets the default material
    pub fn default_material(&self) -> &Material {
        self.materials.get(&self.default_material_id).unwrap()
    }

    /// Gets material for an object with fallback to default
    ///
    /// This is the method used during rendering; an object with no material
    /// assigned, or whose material id does not exist, draws with the default.
    pub fn material_for_object(&self, material_id: Option<&MaterialId>) -> &Material {
        match material_id {
            Some(id) => self
                .get_material(id)
                .unwrap_or_else(|| self.default_material()),
            None => self.default_material(),
        }
    }

    /// Lists all material IDs
    pub fn list_materials(&self) -> Vec<&MaterialId> {
        self.materials.keys().collect()
    }

    /// Updates GPU resources for all materials
    pub fn update_all_gpu_resources(&mut self, device: &Device, queue: &wgpu::Queue) {
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue);
        }
    }

    /// Gets the material bind group layout for pipeline creation
    ///
    /// Uses the default material's layout as all materials share the same layout.
    pub fn bind_group_layout(&self) -> Option<&wgpu::BindGroupLayout> {
        self.default_material().bind_group_layout()
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_conversion() {
        let rgba = hex_to_rgba(0xFF0080);
        assert!((rgba[0] - 1.0).abs() < 1e-6);
        assert!((rgba[1]).abs() < 1e-6);
        assert!((rgba[2] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(rgba[3], 1.0);
    }

    #[test]
    fn test_palette_contains_every_role_material() {
        use crate::gfx::scene::registry::NodeRole;

        let manager = MaterialManager::house_palette();
        for role in NodeRole::ALL {
            if let Some(id) = role.material_id() {
                assert!(
                    manager.get_material(id).is_some(),
                    "palette is missing '{id}'"
                );
            }
        }
    }

    #[test]
    fn test_sun_glows_and_moon_is_unlit() {
        let manager = MaterialManager::house_palette();
        let sun = manager.get_material("sun").unwrap();
        assert!(sun.emissive.iter().any(|&c| c > 0.0));

        let moon = manager.get_material("moon").unwrap();
        assert!(moon.unlit);
    }

    #[test]
    fn test_unknown_material_falls_back_to_default() {
        let manager = MaterialManager::house_palette();
        let id = "chimney".to_string();
        let material = manager.material_for_object(Some(&id));
        assert_eq!(material.name, "default");
    }
}
