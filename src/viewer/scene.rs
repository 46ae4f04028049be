//! Placeholder scene
//!
//! The viewer always shows the same procedural cube. It is not derived from
//! the uploaded image.

use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec3;

/// Edge length of the placeholder cube
const CUBE_EDGE: f32 = 2.0;

/// Auto-rotation speed about Y, radians per second
const AUTO_ROTATE_SPEED: f32 = 0.5;

/// Face corners in (u, v), counter-clockwise
const CORNERS: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

const HOVER_SCALE: f32 = 1.1;
const BASE_COLOR: &str = "#3b82f6";
const HOVER_COLOR: &str = "#a855f7";

/// Indexed triangle mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Axis-aligned cube centred on the origin, 4 vertices per face
    pub fn cube(edge: f32) -> Self {
        let h = edge / 2.0;
        // (normal, u, v) with u x v = normal, so corners wind counter-clockwise
        let faces = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];

        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);

        for (n, u, v) in faces {
            let base = positions.len() as u16;
            for (su, sv) in CORNERS {
                positions.push((n + u * su + v * sv) * h);
                normals.push(n);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Physically based material parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: &'static str,
    pub roughness: f32,
    pub metalness: f32,
}

/// The spinning cube shown after a conversion
#[derive(Debug, Clone)]
pub struct PlaceholderModel {
    mesh: Mesh,
    rotation_y: f32,
    hovered: bool,
}

impl Default for PlaceholderModel {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaceholderModel {
    pub fn new() -> Self {
        Self {
            mesh: Mesh::cube(CUBE_EDGE),
            rotation_y: 0.0,
            hovered: false,
        }
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Auto-rotate unless the pointer is over the model
    pub fn advance(&mut self, delta: Duration) {
        if !self.hovered {
            self.rotation_y =
                (self.rotation_y + AUTO_ROTATE_SPEED * delta.as_secs_f32()).rem_euclid(TAU);
        }
    }

    pub fn scale(&self) -> f32 {
        if self.hovered {
            HOVER_SCALE
        } else {
            1.0
        }
    }

    pub fn material(&self) -> Material {
        Material {
            color: if self.hovered { HOVER_COLOR } else { BASE_COLOR },
            roughness: 0.3,
            metalness: 0.7,
        }
    }
}
