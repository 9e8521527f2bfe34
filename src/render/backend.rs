use crate::foundation::error::BeatResult;
use crate::visual::draw::DrawList;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are **premultiplied alpha** by default. The `premultiplied` flag is included to make
/// this explicit at API boundaries.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Drawing surface that turns a [`DrawList`] into pixels.
pub trait RenderBackend: Send + Sync {
    /// Paint `list` and read back the frame.
    fn render(&mut self, list: &DrawList) -> BeatResult<FrameRGBA>;

    /// Construct an equivalent backend for a parallel worker.
    fn fork(&self) -> Box<dyn RenderBackend>;
}

/// Available backend kinds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// CPU raster backend powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Create a rendering backend implementation.
pub fn create_backend(kind: BackendKind) -> BeatResult<Box<dyn RenderBackend>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuBackend::new())),
    }
}
