use crate::error::ViewerError;
use crate::scene::mesh::{Mesh, Vertex};
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::path::Path;

/// Loads an OBJ file and merges all of its objects into one mesh.
///
/// The result is centered on the origin and scaled to fit a unit cube, so
/// files authored at any scale drop into the pool at a comparable size.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ViewerError> {
    let path = path.as_ref();
    let load_error = |reason: String| ViewerError::ModelLoad {
        path: path.display().to_string(),
        reason,
    };

    if !path.exists() {
        return Err(load_error("file not found".to_string()));
    }

    info!("Loading OBJ file: {}", path.display());

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true, // Unifies indices for position/normal
        ..Default::default()
    };

    // Materials come from the model config, not MTL files.
    let (models, _materials) =
        tobj::load_obj(path, &load_options).map_err(|e| load_error(e.to_string()))?;

    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    let mut missing_normals = false;

    for model in models {
        let mesh = &model.mesh;
        let index_offset = vertices.len() as u32;
        let num_vertices = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();

        if !has_normals {
            warn!(
                "Mesh '{}' is missing normals. Computing smooth normals.",
                model.name
            );
            missing_normals = true;
        }

        for i in 0..num_vertices {
            let position = Point3::new(
                mesh.positions[i * 3],
                mesh.positions[i * 3 + 1],
                mesh.positions[i * 3 + 2],
            );
            let normal = if has_normals {
                Vector3::new(
                    mesh.normals[i * 3],
                    mesh.normals[i * 3 + 1],
                    mesh.normals[i * 3 + 2],
                )
            } else {
                Vector3::zeros()
            };
            vertices.push(Vertex::new(position, normal));
        }

        // Offset by the vertices merged from previous objects
        indices.extend(mesh.indices.iter().map(|i| i + index_offset));
    }

    if vertices.is_empty() {
        return Err(load_error("no geometry".to_string()));
    }

    let mut mesh = Mesh::new(vertices, indices);
    if missing_normals {
        compute_smooth_normals(&mut mesh);
    }
    let (center, scale) = normalize_and_center(&mut mesh);

    info!(
        "OBJ loaded: {} vertices, {} triangles (center {:?}, scale {:.4})",
        mesh.vertices.len(),
        mesh.triangle_count(),
        center,
        scale
    );

    Ok(mesh)
}

/// Area-weighted average of adjacent face normals.
pub fn compute_smooth_normals(mesh: &mut Mesh) {
    let mut accum = vec![Vector3::<f32>::zeros(); mesh.vertices.len()];

    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let (Some(va), Some(vb), Some(vc)) =
            (mesh.vertices.get(a), mesh.vertices.get(b), mesh.vertices.get(c))
        else {
            continue;
        };
        let face = (vb.position - va.position).cross(&(vc.position - va.position));
        for i in [a, b, c] {
            accum[i] += face;
        }
    }

    for (vertex, n) in mesh.vertices.iter_mut().zip(accum) {
        vertex.normal = n.try_normalize(1e-12).unwrap_or_else(Vector3::y);
    }
}

/// Centers the mesh on the origin and scales it to fit a unit cube.
///
/// Returns the original center and the scaling factor used.
pub fn normalize_and_center(mesh: &mut Mesh) -> (Point3<f32>, f32) {
    let Some((min_bound, max_bound)) = mesh.bounds() else {
        return (Point3::origin(), 1.0);
    };

    let center = nalgebra::center(&min_bound, &max_bound);
    let extent = max_bound - min_bound;
    let max_dimension = extent.x.max(extent.y).max(extent.z);

    let scale_factor = if max_dimension > 1e-6 {
        1.0 / max_dimension
    } else {
        1.0
    };

    for vertex in &mut mesh.vertices {
        vertex.position = Point3::from((vertex.position - center) * scale_factor);
    }

    (center, scale_factor)
}
