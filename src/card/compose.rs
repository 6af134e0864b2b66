//! Layer compositing and card encoding.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbaImage, imageops};

/// Draw `text` over `base` with alpha blending.
pub fn compose(mut base: RgbaImage, text: &RgbaImage) -> Result<RgbaImage> {
    ensure!(
        base.dimensions() == text.dimensions(),
        "text layer is {:?}, background is {:?}",
        text.dimensions(),
        base.dimensions()
    );
    imageops::overlay(&mut base, text, 0, 0);
    Ok(base)
}

/// Encode `image` to `path`, picking the format from the extension.
///
/// Missing parent directories are created. JPEG output drops the alpha
/// channel and uses `jpeg_quality`.
pub fn write_card(image: RgbaImage, path: &Path, jpeg_quality: u8) -> Result<()> {
    let format = ImageFormat::from_path(path)
        .with_context(|| format!("Unsupported card format: {}", path.display()))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    match format {
        ImageFormat::Jpeg => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpeg_quality))
                .with_context(|| format!("Failed to encode {}", path.display()))?;
            writer.flush()?;
        }
        other => image
            .save_with_format(path, other)
            .with_context(|| format!("Failed to encode {}", path.display()))?,
    }
    Ok(())
}
