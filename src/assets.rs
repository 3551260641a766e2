//! Meshes and textures loaded once at startup.
//!
//! Models are read from `<asset_dir>/<name>.stl` and textures from `<asset_dir>/<name>.png`.
//! Anything missing or unreadable is replaced with a procedural stand-in and reported with
//! `log::warn!`, so the demo always starts with a complete library.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use glam::Vec3;

use crate::error::AssetError;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, MeshData, Vertex3d};
use crate::scene::{GROUND_RESOLUTION, MeshKey, TextureKey};
use crate::tessellation::LEVELS;
use crate::texture::{ColorSpace, Texture, TextureData};

/// Every texture the scene references.
pub const TEXTURES: [TextureKey; 11] = [
    TextureKey::GRASS,
    TextureKey::HEIGHT,
    TextureKey::WATER,
    TextureKey::WATER_HEIGHT,
    TextureKey::SKY,
    TextureKey::CORGI,
    TextureKey::HOUSE,
    TextureKey::CAMPFIRE,
    TextureKey::METAL,
    TextureKey::WOOD,
    TextureKey::WHITE,
];

/// Every non-water mesh the scene references.
pub const MESHES: [MeshKey; 8] = [
    MeshKey::Terrain,
    MeshKey::Sphere,
    MeshKey::Cube,
    MeshKey::Corgi,
    MeshKey::House,
    MeshKey::Campfire,
    MeshKey::Lamp,
    MeshKey::Pier,
];

const FALLBACK_TEXTURE_SIZE: u32 = 64;

/// Reads an STL model into flat-shaded geometry.
pub fn parse_stl<R: Read + Seek>(reader: &mut R, path: &Path) -> Result<MeshData, AssetError> {
    let stl = stl_io::read_stl(reader).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if stl.faces.is_empty() {
        return Err(AssetError::EmptyModel(path.to_path_buf()));
    }

    let mut data = MeshData::default();
    for face in &stl.faces {
        let normal: [f32; 3] = face.normal.into();
        let base = data.vertices.len() as u32;
        for &index in &face.vertices {
            let position: [f32; 3] = stl.vertices[index].into();
            // STL carries no UVs; planar-map from the XZ footprint.
            data.vertices
                .push(Vertex3d::new(position, normal, [position[0], position[2]]));
        }
        data.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
    Ok(data)
}

fn load_stl(path: &Path) -> Result<MeshData, AssetError> {
    let file = std::fs::File::open(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stl(&mut std::io::BufReader::new(file), path)
}

/// Primitive geometry built in code, or the stand-in shape for a model file.
pub fn procedural_mesh(key: MeshKey) -> MeshData {
    match key {
        MeshKey::Terrain => MeshData::grid(GROUND_RESOLUTION as f32, GROUND_RESOLUTION),
        MeshKey::Water => MeshData::patch(1),
        MeshKey::Sphere => MeshData::sphere(32, 16),
        MeshKey::Cube => MeshData::cube(),
        // Stand-ins are sized so the scene's per-object scale gives a plausible footprint.
        MeshKey::Corgi => MeshData::cube().scaled(Vec3::new(0.6, 0.6, 1.2)),
        MeshKey::House => MeshData::cube().scaled(Vec3::new(30.0, 20.0, 24.0)),
        MeshKey::Campfire => MeshData::sphere(12, 6).scaled(Vec3::new(3.0, 1.0, 3.0)),
        MeshKey::Lamp => MeshData::cube().scaled(Vec3::new(0.4, 10.0, 0.4)),
        MeshKey::Pier => MeshData::cube().scaled(Vec3::new(15.0, 1.0, 60.0)),
    }
}

/// Colour space a texture is sampled in.
pub fn color_space(key: TextureKey) -> ColorSpace {
    if key == TextureKey::HEIGHT || key == TextureKey::WATER_HEIGHT {
        ColorSpace::Linear
    } else {
        ColorSpace::Srgb
    }
}

/// Stand-in image for a texture file.
pub fn procedural_texture(key: TextureKey) -> TextureData {
    let size = FALLBACK_TEXTURE_SIZE;
    match key {
        TextureKey::HEIGHT => TextureData::basin(size * 2),
        TextureKey::WATER_HEIGHT => TextureData::ripples(size),
        TextureKey::GRASS => TextureData::noise(size, [86, 125, 70], 12, 1),
        TextureKey::WATER => TextureData::noise(size, [40, 90, 150], 10, 2),
        TextureKey::SKY => TextureData::generate(size, |_, _, _, v| {
            let t = v.clamp(0.0, 1.0);
            let lerp = |a: f32, b: f32| (a + (b - a) * t) as u8;
            [lerp(60.0, 180.0), lerp(110.0, 210.0), lerp(200.0, 240.0), 255]
        }),
        TextureKey::CORGI => TextureData::noise(size, [200, 140, 70], 10, 3),
        TextureKey::HOUSE => TextureData::noise(size, [150, 80, 60], 20, 4),
        TextureKey::CAMPFIRE => TextureData::noise(size, [90, 60, 40], 15, 5),
        TextureKey::METAL => TextureData::noise(size, [150, 150, 160], 8, 6),
        TextureKey::WOOD => TextureData::noise(size, [120, 85, 50], 14, 7),
        _ => TextureData::solid([255, 255, 255, 255]),
    }
}

/// Everything the renderer draws with.
pub struct AssetLibrary {
    meshes: HashMap<MeshKey, Mesh>,
    water_patches: Vec<Mesh>,
    textures: HashMap<TextureKey, Texture>,
    white: Texture,
}

impl AssetLibrary {
    pub fn load(gpu: &GpuContext, asset_dir: &Path) -> Self {
        let mut fallbacks = 0;

        let mut meshes = HashMap::new();
        for key in MESHES {
            let data = match key.model_file() {
                Some(stem) => {
                    let path = asset_dir.join(format!("{stem}.stl"));
                    load_stl(&path).unwrap_or_else(|err| {
                        log::warn!("{err}; using a stand-in shape");
                        fallbacks += 1;
                        procedural_mesh(key)
                    })
                }
                None => procedural_mesh(key),
            };
            meshes.insert(key, data.upload(gpu, &format!("{key:?}")));
        }

        let water_patches = LEVELS
            .iter()
            .map(|&level| MeshData::patch(level).upload(gpu, &format!("Water Patch x{level}")))
            .collect();

        let white = Texture::from_data(
            gpu,
            &procedural_texture(TextureKey::WHITE),
            ColorSpace::Srgb,
            TextureKey::WHITE.0,
        );
        let mut textures = HashMap::new();
        for key in TEXTURES.into_iter().filter(|&key| key != TextureKey::WHITE) {
            let path: PathBuf = asset_dir.join(format!("{}.png", key.0));
            let data = TextureData::from_file(&path).unwrap_or_else(|err| {
                log::warn!("{err}; using a procedural texture");
                fallbacks += 1;
                procedural_texture(key)
            });
            textures.insert(key, Texture::from_data(gpu, &data, color_space(key), key.0));
        }

        log::info!(
            "loaded {} meshes and {} textures from {} ({fallbacks} procedural stand-ins)",
            meshes.len(),
            textures.len() + 1,
            asset_dir.display()
        );

        Self {
            meshes,
            water_patches,
            textures,
            white,
        }
    }

    /// Mesh for `key`; the water uses [`water_patch`](Self::water_patch) instead.
    pub fn mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(&key)
    }

    /// Patch mesh for a tessellation level index.
    pub fn water_patch(&self, level_index: usize) -> Option<&Mesh> {
        self.water_patches.get(level_index)
    }

    /// Texture for `key`, or plain white when the key is unknown.
    pub fn texture(&self, key: TextureKey) -> &Texture {
        self.textures.get(&key).unwrap_or(&self.white)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ASCII_TRIANGLE: &str = "solid tri
facet normal 0 0 1
  outer loop
    vertex 0 0 0
    vertex 1 0 0
    vertex 0 1 0
  endloop
endfacet
endsolid tri
";

    #[test]
    fn stl_triangle_becomes_one_flat_face() {
        let data = parse_stl(&mut Cursor::new(ASCII_TRIANGLE), Path::new("tri.stl")).unwrap();

        assert_eq!(data.triangle_count(), 1);
        assert!(data.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
        assert_eq!(data.vertices[1].position, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn garbage_stl_is_an_error() {
        let result = parse_stl(&mut Cursor::new(b"not a model".to_vec()), Path::new("x.stl"));
        assert!(result.is_err());
    }

    #[test]
    fn height_maps_are_linear() {
        assert_eq!(color_space(TextureKey::HEIGHT), ColorSpace::Linear);
        assert_eq!(color_space(TextureKey::WATER_HEIGHT), ColorSpace::Linear);
        assert_eq!(color_space(TextureKey::GRASS), ColorSpace::Srgb);
    }

    #[test]
    fn every_model_has_a_stand_in() {
        for key in MESHES {
            assert!(procedural_mesh(key).triangle_count() > 0, "{key:?}");
        }
    }

    #[test]
    fn every_texture_has_a_stand_in() {
        for key in TEXTURES {
            let data = procedural_texture(key);
            assert_eq!(data.rgba.len(), (data.width * data.height * 4) as usize);
        }
    }
}
