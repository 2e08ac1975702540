//! Asset catalog seam
//!
//! File formats and disk layout live behind the [`AssetCatalog`] trait;
//! the engine core only sees decoded [`MeshData`]. A successful load can
//! be announced on the message bus under the `asset.loaded` code so other
//! systems can react without knowing the loader.

use crate::foundation::math::Transform;
use crate::messaging::{Message, MessageBus, MessageData, MessagePriority};
use crate::render::geometry::GeometryData;
use crate::render::Renderable;

/// Bus code posted after a successful mesh load
pub const ASSET_LOADED: &str = "asset.loaded";

/// Errors raised by asset catalogs
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// Underlying read failure
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog has no loader for this file extension
    ///
    /// Recoverable: the caller can fall back to another asset or skip it.
    #[error("no loader for asset '{path}'")]
    UnsupportedExtension {
        /// Path as requested
        path: String,
    },

    /// The file was read but could not be decoded
    #[error("asset '{path}' is malformed: {reason}")]
    Malformed {
        /// Path as requested
        path: String,
        /// Decoder-reported reason
        reason: String,
    },
}

/// Decoded mesh payload
///
/// Arrays that the source format lacks are left empty. The transform
/// carries any bake-time placement the format encodes.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions, xyz per vertex
    pub positions: Vec<f32>,
    /// Vertex normals, xyz per vertex
    pub normals: Vec<f32>,
    /// Texture coordinates, uv per vertex
    pub uvs: Vec<f32>,
    /// Triangle indices; empty for non-indexed meshes
    pub indices: Vec<u32>,
    /// Placement baked into the source file
    pub transform: Transform,
}

impl MeshData {
    /// Convert into a renderable named `name`
    ///
    /// Vertex colors are not part of the mesh payload and stay empty.
    pub fn into_renderable(self, name: &str) -> Renderable {
        let mut renderable = Renderable::new(
            name,
            GeometryData {
                positions: self.positions,
                normals: self.normals,
                colors: Vec::new(),
                uvs: self.uvs,
                indices: self.indices,
            },
        );
        renderable.set_model_matrix(self.transform.matrix());
        renderable
    }
}

/// External provider of decoded assets
pub trait AssetCatalog {
    /// Load a UTF-8 text asset, such as shader source
    fn load_text(&self, path: &str) -> Result<String, AssetError>;

    /// Load and decode a mesh asset
    fn load_mesh(&self, path: &str) -> Result<MeshData, AssetError>;
}

/// Load a mesh, convert it to a renderable, and announce it on the bus
pub fn load_renderable(
    catalog: &dyn AssetCatalog,
    path: &str,
    name: &str,
    bus: &mut MessageBus,
) -> Result<Renderable, AssetError> {
    let mesh = catalog.load_mesh(path)?;
    let renderable = mesh.into_renderable(name);
    bus.post(Message::new(
        ASSET_LOADED,
        MessagePriority::Normal,
        MessageData::Text(path.to_string()),
    ));
    log::debug!("loaded mesh '{path}' as renderable '{name}'");
    Ok(renderable)
}
