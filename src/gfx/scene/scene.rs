// src/gfx/scene/scene.rs
use wgpu::Device;

use crate::assets::MeshData;
use crate::gfx::camera::Camera;
use crate::gfx::resources::material::MaterialManager;
use crate::gfx::scene::entity::{Entity, Renderable};
use crate::gfx::scene::transform::{Transform, TransformArena, TransformError, TransformId};

/// Main scene: entities, their transforms, materials, and the view camera
pub struct Scene {
    pub camera: Camera,
    pub transforms: TransformArena,
    pub entities: Vec<Entity>,
    pub materials: MaterialManager,
}

impl Scene {
    /// Creates an empty scene viewed through the given camera
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            transforms: TransformArena::new(),
            entities: Vec::new(),
            materials: MaterialManager::new(),
        }
    }

    /// Refreshes derived per-frame state (camera matrices)
    pub fn update(&mut self) {
        self.camera.update_matrix();
    }

    /// Adds an entity with no renderable, useful as a parent node
    pub fn add_empty(&mut self, name: &str) -> usize {
        let transform = self.transforms.alloc(Transform::new());
        self.entities.push(Entity {
            name: name.to_string(),
            transform,
            renderable: None,
            visible: true,
        });
        self.entities.len() - 1
    }

    /// Adds an entity rendering `data` with the named material
    ///
    /// Unknown material names fall back to the default material at draw time.
    pub fn add_entity(&mut self, name: &str, data: &MeshData, material: &str) -> usize {
        let index = self.add_empty(name);
        self.entities[index].renderable = Some(Renderable::new(data, material));
        index
    }

    /// Re-parents one entity's transform under another's
    pub fn set_parent(&mut self, child: usize, parent: Option<usize>) -> Result<(), TransformError> {
        let child_id = self.entities[child].transform;
        let parent_id = parent.map(|index| self.entities[index].transform);
        self.transforms.set_parent(child_id, parent_id)
    }

    pub fn transform_id(&self, entity: usize) -> TransformId {
        self.entities[entity].transform
    }

    pub fn transform_mut(&mut self, entity: usize) -> &mut Transform {
        let id = self.entities[entity].transform;
        self.transforms.get_mut(id)
    }

    /// Creates GPU resources for every material and renderable
    ///
    /// Called once the device exists, before the first frame.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        transform_layout: &wgpu::BindGroupLayout,
    ) {
        self.materials.init_gpu_resources(device, queue);
        for entity in &mut self.entities {
            if let Some(renderable) = &mut entity.renderable {
                renderable.init_gpu_resources(device, transform_layout);
            }
        }
    }

    /// Uploads every renderable's world matrix for this frame
    ///
    /// Runs once per frame before any pass is recorded, so the shadow and
    /// geometry passes read identical transform state.
    pub fn write_transforms(&self, queue: &wgpu::Queue) {
        for entity in &self.entities {
            if let Some(renderable) = &entity.renderable {
                let world = self.transforms.world_matrix(entity.transform);
                renderable.write_world_matrix(queue, world);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3;

    fn test_scene() -> Scene {
        Scene::new(Camera::perspective(1280, 720, 60.0).unwrap())
    }

    fn unit_triangle() -> MeshData {
        MeshData {
            name: "triangle".to_string(),
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            tex_coords: vec![0.0; 6],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_add_entity_allocates_transform() {
        let mut scene = test_scene();
        let data = unit_triangle();
        let a = scene.add_entity("a", &data, "default");
        let b = scene.add_empty("b");

        assert_ne!(scene.transform_id(a), scene.transform_id(b));
        assert!(scene.entities[a].renderable.is_some());
        assert!(scene.entities[b].renderable.is_none());
        assert_eq!(scene.transforms.len(), 2);
    }

    #[test]
    fn test_parented_entity_inherits_translation() {
        let mut scene = test_scene();
        let data = unit_triangle();
        let parent = scene.add_entity("parent", &data, "default");
        let child = scene.add_entity("child", &data, "default");
        scene.set_parent(child, Some(parent)).unwrap();

        scene.transform_mut(parent).position = Vector3::new(4.0, 0.0, 0.0);
        scene.transform_mut(child).position = Vector3::new(0.0, 2.0, 0.0);

        let world = scene.transforms.world_matrix(scene.transform_id(child));
        assert!((world[3][0] - 4.0).abs() < 1e-5);
        assert!((world[3][1] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_self_parenting_is_rejected() {
        let mut scene = test_scene();
        let entity = scene.add_empty("node");
        assert!(scene.set_parent(entity, Some(entity)).is_err());
    }
}
