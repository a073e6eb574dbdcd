//! Mesh draws. Vertices are projected by direction, so meshes are drawn
//! around the observer: sky domes, panoramas, horizon cylinders.

use crate::geom::mesh::{compute_cylinder, compute_fan_disk, compute_sphere_map, compute_sphere_no_light};
use crate::geom::{SkyVertexArray, SphereParams};
use crate::render::{Backend, DrawRequest};

use super::Painter;

impl<B: Backend> Painter<'_, B> {
    /// Sphere as one strip per stack.
    pub fn draw_sphere(&mut self, params: &SphereParams) {
        for strip in compute_sphere_no_light(params) {
            self.draw_mesh(&strip);
        }
    }

    /// Open cylinder around the `z` axis. Seen from inside, front faces are
    /// culled instead of back faces.
    pub fn draw_cylinder(&mut self, radius: f64, height: f64, slices: u32, orient_inside: bool) {
        let mesh = compute_cylinder(radius, height, slices);
        let old_cull_front = self.state.cull_front;
        if orient_inside {
            self.set_cull_front(true);
        }
        self.draw_mesh(&mesh);
        self.set_cull_front(old_cull_front);
    }

    pub fn draw_fan_disk(&mut self, radius: f32, inner_fan_slices: u32, level: u32) {
        let mesh = compute_fan_disk(radius, inner_fan_slices, level);
        self.draw_mesh(&mesh);
    }

    /// Sphere textured with a fisheye image spanning `texture_fov` radians.
    pub fn draw_sphere_map(&mut self, radius: f64, slices: u32, stacks: u32, texture_fov: f64, orient_inside: bool) {
        for strip in compute_sphere_map(radius, slices, stacks, texture_fov, orient_inside) {
            self.draw_mesh(&strip);
        }
    }

    /// Textured when a texture is bound.
    fn draw_mesh(&mut self, mesh: &SkyVertexArray) {
        let textured = self.texture.is_some();
        let mut req = DrawRequest::new(mesh.topology, mesh.arrays(textured, false));
        if mesh.is_indexed() {
            req = req.indexed(&mesh.indices);
        }
        self.draw_from_array(req);
    }
}
