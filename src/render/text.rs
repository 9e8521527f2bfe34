use std::sync::Arc;

use anyhow::Context as _;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{BeatError, BeatResult};

/// Rasterized single line of text, premultiplied RGBA8.
pub(crate) struct TextRaster {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba8_premul: Vec<u8>,
}

/// System font database shared by every backend instance.
pub(crate) fn system_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    tracing::debug!(faces = db.faces().count(), "loaded system fonts");
    Arc::new(db)
}

/// Rasterize one centered line of text into a strip `width` pixels wide.
///
/// Missing fonts yield a transparent strip rather than an error.
pub(crate) fn rasterize_line(
    fontdb: &Arc<usvg::fontdb::Database>,
    text: &str,
    size_px: f32,
    color: Rgb8,
    width: u32,
) -> BeatResult<TextRaster> {
    if !(size_px.is_finite() && size_px > 0.0) {
        return Err(BeatError::validation("text size must be positive"));
    }
    let height = ((size_px * 1.6).ceil() as u32).max(1);
    let baseline = height as f32 / 2.0 + size_px * 0.35;

    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><text x="{x}" y="{baseline}" font-family="sans-serif" font-weight="bold" font-size="{size_px}" fill="{fill}" text-anchor="middle">{body}</text></svg>"#,
        x = width as f32 / 2.0,
        fill = color.to_hex(),
        body = escape_xml(text),
    );

    let opts = usvg::Options {
        fontdb: fontdb.clone(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_data(svg.as_bytes(), &opts).context("parse text svg")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| BeatError::collaborator(crate::Stage::Frames, "failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    Ok(TextRaster {
        width,
        height,
        rgba8_premul: pixmap.data().to_vec(),
    })
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
