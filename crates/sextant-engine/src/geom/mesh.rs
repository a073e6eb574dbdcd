//! Mesh generators for spheres, cylinders and disks.
//!
//! Output is model-space geometry: vertices are not unit vectors and are
//! projected by direction when drawn. Angles are radians.

use std::f64::consts::{PI, TAU};

use crate::coords::{Vec2, Vec3};
use crate::render::Topology;

use super::SkyVertexArray;

/// Parameters of [`compute_sphere`] and [`compute_sphere_no_light`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SphereParams {
    pub radius: f64,
    /// Polar axis scale; `1.0` is a perfect sphere.
    pub one_minus_oblateness: f64,
    pub slices: u32,
    pub stacks: u32,
    /// Faces point towards the center (sky domes, panoramas).
    pub orient_inside: bool,
    /// Runs the `s` texture coordinate from 1 to 0.
    pub flip_texture: bool,
    /// Opening angle from the pole where the mesh starts.
    pub top_angle: f64,
    /// Opening angle from the pole where the mesh ends.
    pub bottom_angle: f64,
}

impl Default for SphereParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            one_minus_oblateness: 1.0,
            slices: 40,
            stacks: 20,
            orient_inside: false,
            flip_texture: false,
            top_angle: 0.0,
            bottom_angle: PI,
        }
    }
}

/// `(cos, sin)` of `start + k * step` for `k` in `0..=n`.
fn cos_sin_table(n: u32, start: f64, step: f64) -> Vec<(f64, f64)> {
    (0..=n)
        .map(|k| {
            let (s, c) = (start + k as f64 * step).sin_cos();
            (c, s)
        })
        .collect()
}

fn theta_table(slices: u32) -> Vec<(f64, f64)> {
    cos_sin_table(slices, 0.0, TAU / slices as f64)
}

struct SphereRows {
    /// `(cos ρ, sin ρ)` per ring, `stacks + 1` entries.
    rho: Vec<(f64, f64)>,
    theta: Vec<(f64, f64)>,
    nsign: f64,
    t0: f32,
    dt: f32,
    s0: f32,
    ds: f32,
}

impl SphereRows {
    #[track_caller]
    fn new(p: &SphereParams) -> Self {
        assert!(p.slices >= 3 && p.stacks >= 1, "sphere needs at least 3 slices and 1 stack");
        assert!(p.top_angle < p.bottom_angle, "top angle must be above bottom angle");
        let rho = if p.bottom_angle > 3.1415 && p.top_angle < 0.0001 {
            cos_sin_table(p.stacks, 0.0, PI / p.stacks as f64)
        } else {
            let drho = (p.bottom_angle - p.top_angle) / p.stacks as f64;
            cos_sin_table(p.stacks, PI - p.bottom_angle, drho)
        };
        let nsign = if p.orient_inside { -1.0 } else { 1.0 };
        Self {
            rho,
            theta: theta_table(p.slices),
            nsign,
            // Seen from inside the texture runs the other way.
            t0: if p.orient_inside { 0.0 } else { 1.0 },
            dt: nsign as f32 / p.stacks as f32,
            s0: if p.flip_texture { 1.0 } else { 0.0 },
            ds: (if p.flip_texture { -1.0 } else { 1.0 }) / p.slices as f32,
        }
    }

    /// Vertex pairs of stack `i`: ring `i` then ring `i + 1` for every slice.
    fn stack(&self, p: &SphereParams, i: usize, vertices: &mut Vec<Vec3>, tex: &mut Vec<Vec2>) {
        let t = self.t0 - self.dt * i as f32;
        let mut s = self.s0;
        let point = |(ct, st): (f64, f64), (cr, sr): (f64, f64)| {
            Vec3::new(
                -st * sr * p.radius,
                ct * sr * p.radius,
                self.nsign * cr * p.one_minus_oblateness * p.radius,
            )
        };
        for &theta in &self.theta {
            vertices.push(point(theta, self.rho[i]));
            tex.push(Vec2::new(s, t));
            vertices.push(point(theta, self.rho[i + 1]));
            tex.push(Vec2::new(s, t - self.dt));
            s += self.ds;
        }
    }
}

/// Textured sphere as one indexed triangle list.
///
/// Panics if the mesh needs more vertices than 16-bit indices address.
#[track_caller]
pub fn compute_sphere(p: &SphereParams) -> SkyVertexArray {
    let rows = SphereRows::new(p);
    let per_stack = (p.slices as usize + 1) * 2;
    let total = per_stack * p.stacks as usize;
    assert!(total <= u16::MAX as usize + 1, "sphere mesh exceeds 16-bit indices ({total} vertices)");

    let mut vertices = Vec::with_capacity(total);
    let mut tex = Vec::with_capacity(total);
    let mut indices = Vec::with_capacity(p.stacks as usize * p.slices as usize * 6);
    for i in 0..p.stacks as usize {
        rows.stack(p, i, &mut vertices, &mut tex);
        let offset = i * per_stack;
        for j in (2..p.slices as usize * 2 + 2).step_by(2) {
            let o = offset + j;
            indices.extend([o - 2, o - 1, o, o, o - 1, o + 1].map(|k| k as u16));
        }
    }

    SkyVertexArray::new(Topology::Triangles, vertices)
        .with_tex_coords(tex)
        .with_indices(indices)
}

/// Textured sphere as one triangle strip per stack.
pub fn compute_sphere_no_light(p: &SphereParams) -> Vec<SkyVertexArray> {
    let rows = SphereRows::new(p);
    (0..p.stacks as usize)
        .map(|i| {
            let mut vertices = Vec::new();
            let mut tex = Vec::new();
            rows.stack(p, i, &mut vertices, &mut tex);
            SkyVertexArray::new(Topology::TriangleStrip, vertices).with_tex_coords(tex)
        })
        .collect()
}

/// Flat disk in the `z = 0` plane with radial rings refined towards the rim.
///
/// The center is a fan of `inner_fan_slices` triangles; each of the `level`
/// rings around it doubles the angular resolution. Texture coordinates map
/// the disk onto the unit square.
#[track_caller]
pub fn compute_fan_disk(radius: f32, inner_fan_slices: u32, level: u32) -> SkyVertexArray {
    assert!(level < 32, "fan disk level must be below 32");
    assert!(inner_fan_slices >= 3, "fan disk needs at least 3 inner slices");

    let mut rad = vec![0.0f32; level as usize + 1];
    rad[level as usize] = radius;
    for i in (0..level as usize).rev() {
        let slices_here = (inner_fan_slices << (i + 1)) as f32;
        rad[i] = rad[i + 1] * (1.0 - std::f32::consts::PI / slices_here) * 2.0 / 3.0;
    }
    let slices = inner_fan_slices << level;
    let theta = theta_table(slices);

    let diameter = radius * 2.0;
    let mut vertices = Vec::new();
    let mut tex = Vec::new();
    let mut push = |r: f32, k: usize| {
        let (c, s) = theta[k];
        let (x, y) = (r * c as f32, r * s as f32);
        vertices.push(Vec3::new(x as f64, y as f64, 0.0));
        tex.push(Vec2::new(0.5 + x / diameter, 0.5 + y / diameter));
    };

    let slices = slices as usize;
    let mut step = 2usize;
    for i in (1..=level as usize).rev() {
        let half = step / 2;
        let mut j = 0;
        while j + 1 < slices {
            let (outer, inner) = (rad[i], rad[i - 1]);
            push(outer, j + half);
            push(outer, j + step);
            push(inner, j + step);

            push(outer, j + half);
            push(inner, j + step);
            push(inner, j);

            push(outer, j + half);
            push(inner, j);
            push(outer, j);
            j += step;
        }
        step <<= 1;
    }

    step >>= 1;
    let mut j = 0;
    while j < slices {
        push(0.0, 0);
        push(rad[0], j);
        push(rad[0], j + step);
        j += step;
    }

    SkyVertexArray::new(Topology::Triangles, vertices).with_tex_coords(tex)
}

/// Open cylinder around the `z` axis from `z = 0` to `z = height`, as a strip.
#[track_caller]
pub fn compute_cylinder(radius: f64, height: f64, slices: u32) -> SkyVertexArray {
    assert!(slices >= 3, "cylinder needs at least 3 slices");
    let da = TAU / slices as f64;
    let ds = 1.0 / slices as f32;
    let mut vertices = Vec::with_capacity(2 * (slices as usize + 1));
    let mut tex = Vec::with_capacity(2 * (slices as usize + 1));
    for i in 0..=slices {
        let (x, y) = (da * i as f64).sin_cos();
        let s = ds * i as f32;
        vertices.push(Vec3::new(x * radius, y * radius, 0.0));
        tex.push(Vec2::new(s, 0.0));
        vertices.push(Vec3::new(x * radius, y * radius, height));
        tex.push(Vec2::new(s, 1.0));
    }
    SkyVertexArray::new(Topology::TriangleStrip, vertices).with_tex_coords(tex)
}

/// Sphere textured with a fisheye (polar) image covering `texture_fov`
/// radians around the `+z` pole. One strip per stack.
#[track_caller]
pub fn compute_sphere_map(
    radius: f64,
    slices: u32,
    stacks: u32,
    texture_fov: f64,
    orient_inside: bool,
) -> Vec<SkyVertexArray> {
    assert!(slices >= 3 && stacks >= 1, "sphere needs at least 3 slices and 1 stack");
    assert!(texture_fov > 0.0, "texture field of view must be positive");

    let rho_table = cos_sin_table(stacks, 0.0, PI / stacks as f64);
    let theta = theta_table(slices);
    let drho = (PI / stacks as f64 / texture_fov) as f32;

    let tex_at = |rho: f32, c: f64, s: f64| {
        let r = rho.min(0.5);
        Vec2::new(0.5 + r * c as f32, 0.5 + r * s as f32)
    };
    let point = |(ct, st): (f64, f64), (cr, sr): (f64, f64)| {
        Vec3::new(-st * sr * radius, ct * sr * radius, cr * radius)
    };

    (0..stacks as usize)
        .map(|i| {
            let rho = drho * i as f32;
            let mut vertices = Vec::with_capacity(2 * (slices as usize + 1));
            let mut tex = Vec::with_capacity(2 * (slices as usize + 1));
            for &(c, s) in &theta {
                let top = (point((c, s), rho_table[i]), tex_at(rho, c, s));
                let bottom = (point((c, s), rho_table[i + 1]), tex_at(rho + drho, c, s));
                let pair = if orient_inside {
                    [
                        (bottom.0, tex_at(rho + drho, c, -s)),
                        (top.0, tex_at(rho, c, -s)),
                    ]
                } else {
                    [top, bottom]
                };
                for (v, t) in pair {
                    vertices.push(v);
                    tex.push(t);
                }
            }
            SkyVertexArray::new(Topology::TriangleStrip, vertices).with_tex_coords(tex)
        })
        .collect()
}
