use std::fmt;

use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub albedo: Vector3<f32>,
    /// 0이면 반사 방향을 흔들지 않음, 1이면 최대로 흔듦
    pub roughness: f32,
    // 아직 셰이딩에서 안 씀
    pub metallic: f32,
    /// false면 이 표면에서 반사 광선을 더 쏘지 않음
    pub reflective: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vector3::new(1.0, 1.0, 1.0),
            roughness: 1.0,
            metallic: 0.0,
            reflective: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub position: Point3<f32>,
    pub radius: f32,
    pub material_index: usize,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            radius: 0.5,
            material_index: 0,
        }
    }
}

/// 축 정렬 상자. `[position, position + (width, height, depth)]` 구간을 차지함.
#[derive(Debug, Clone, PartialEq)]
pub struct Cuboid {
    pub position: Point3<f32>,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub material_index: usize,
}

impl Cuboid {
    pub fn extent(&self) -> Vector3<f32> {
        Vector3::new(self.width, self.height, self.depth)
    }

    pub fn min(&self) -> Point3<f32> {
        self.position
    }

    pub fn max(&self) -> Point3<f32> {
        self.position + self.extent()
    }
}

impl Default for Cuboid {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            width: 0.5,
            height: 0.5,
            depth: 0.5,
            material_index: 0,
        }
    }
}

/// 어느 도형 테이블에서 나온 인덱스인지. 구와 상자의 인덱스 공간은 서로 독립적임.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Sphere,
    Cuboid,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::Sphere => f.write_str("sphere"),
            PrimitiveKind::Cuboid => f.write_str("box"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has primitives but no materials")]
    NoMaterials,
    #[error("{kind} #{index} uses material {material}, but only {materials} materials exist")]
    MaterialOutOfRange {
        kind: PrimitiveKind,
        index: usize,
        material: usize,
        materials: usize,
    },
}

/// 도형과 재질 테이블. 넣은 순서가 곧 인덱스.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub spheres: Vec<Sphere>,
    pub boxes: Vec<Cuboid>,
    pub materials: Vec<Material>,
}

impl Scene {
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn add_sphere(&mut self, sphere: Sphere) -> usize {
        self.spheres.push(sphere);
        self.spheres.len() - 1
    }

    pub fn add_box(&mut self, cuboid: Cuboid) -> usize {
        self.boxes.push(cuboid);
        self.boxes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty() && self.boxes.is_empty()
    }

    pub fn material(&self, kind: PrimitiveKind, index: usize) -> &Material {
        let material_index = match kind {
            PrimitiveKind::Sphere => self.spheres[index].material_index,
            PrimitiveKind::Cuboid => self.boxes[index].material_index,
        };
        &self.materials[material_index]
    }

    /// 모든 도형의 재질 인덱스가 범위 안에 있는지 확인함. 렌더링 전에 반드시 통과해야 함.
    pub fn validate(&self) -> Result<(), SceneError> {
        if self.materials.is_empty() && !self.is_empty() {
            return Err(SceneError::NoMaterials);
        }

        let materials = self.materials.len();
        let spheres = self
            .spheres
            .iter()
            .enumerate()
            .map(|(index, sphere)| (PrimitiveKind::Sphere, index, sphere.material_index));
        let boxes = self
            .boxes
            .iter()
            .enumerate()
            .map(|(index, cuboid)| (PrimitiveKind::Cuboid, index, cuboid.material_index));

        if let Some((kind, index, material)) = spheres
            .chain(boxes)
            .find(|(_, _, material)| *material >= materials)
        {
            return Err(SceneError::MaterialOutOfRange {
                kind,
                index,
                material,
                materials,
            });
        }

        Ok(())
    }
}
