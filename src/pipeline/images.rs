//! Page images: rasterise or pull embedded images, encode, store, link.
//!
//! Files are created under the configured image directory with a random
//! token in the name (`page_<N>_<token>.<ext>`), using create-new semantics so
//! concurrent conversions sharing the directory never overwrite each other.
//!
//! ## Quality on a lossless format
//!
//! JPEG takes `image_quality` as its encoder quality. PNG is lossless, so the
//! value picks the compression effort instead: high quality means fast,
//! lighter compression, which never yields a smaller file than a lower quality
//! setting on the same bitmap.

use crate::backend::{PageRasterizer, PageSize, PdfSource};
use crate::config::{ConversionOptions, ImageFormat, ImageMode};
use crate::error::PageError;
use crate::model::ImageRef;
use crate::pipeline::geometry;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::DynamicImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Share of the page area above which an embedded image is a background.
pub const BACKGROUND_AREA_RATIO: f32 = 0.9;

/// Alt text for images on page `number`.
pub fn alt_text(number: usize) -> String {
    format!("Page {} Image", number)
}

/// PNG compression effort for a 1–100 quality value.
pub fn png_compression(quality: u8) -> CompressionType {
    if quality >= 67 {
        CompressionType::Fast
    } else if quality >= 34 {
        CompressionType::Default
    } else {
        CompressionType::Best
    }
}

/// Encode `img` as `format` at `quality`.
pub fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, image::ImageError> {
    let quality = quality.clamp(1, 100);
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
        }
        ImageFormat::Png => {
            img.write_with_encoder(PngEncoder::new_with_quality(
                &mut buf,
                png_compression(quality),
                FilterType::Adaptive,
            ))?;
        }
    }
    debug!(
        "Encoded {}x{} image → {} bytes {:?}",
        img.width(),
        img.height(),
        buf.len(),
        format
    );
    Ok(buf)
}

/// Public URL for a stored file.
pub fn public_url(prefix: &str, file_name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), file_name)
}

/// Write `bytes` to a fresh `page_<N>_<token>.<ext>` file in `dir`.
pub fn store(dir: &Path, page: usize, ext: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("page_{}_", page))
        .suffix(&format!(".{}", ext))
        .rand_bytes(12)
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644))?;
    }

    Ok(path)
}

/// Extracts, persists and links the images of one page.
pub struct ImageExtractor<'a> {
    rasterizer: &'a dyn PageRasterizer,
    options: &'a ConversionOptions,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(rasterizer: &'a dyn PageRasterizer, options: &'a ConversionOptions) -> Self {
        Self {
            rasterizer,
            options,
        }
    }

    /// Images for the 1-indexed page `number`, plus any failures.
    ///
    /// A failure drops the affected image; the page itself still converts.
    pub fn extract(
        &self,
        source: &PdfSource<'_>,
        number: usize,
        page_size: PageSize,
    ) -> (Vec<ImageRef>, Vec<PageError>) {
        let index = number.saturating_sub(1);
        let mut images = Vec::new();
        let mut errors = Vec::new();

        match self.options.image_mode {
            ImageMode::PageRaster => {
                let result = self
                    .rasterizer
                    .rasterize(source, index, self.options.dpi)
                    .and_then(|bitmap| self.persist(number, &bitmap));
                match result {
                    Ok(image) => images.push(image),
                    Err(e) => errors.push(e),
                }
            }
            ImageMode::Embedded => match self.rasterizer.embedded_images(source, index) {
                Ok(found) => {
                    let page_area = page_size.width_pt * page_size.height_pt;
                    for embedded in found {
                        if page_area > 0.0
                            && embedded.bounds.area() >= BACKGROUND_AREA_RATIO * page_area
                        {
                            debug!("Page {}: skipping full-page background image", number);
                            continue;
                        }
                        match self.persist(number, &embedded.image) {
                            Ok(mut image) => {
                                let (position, size) =
                                    geometry::rect_to_css(&embedded.bounds, page_size);
                                image.size = Some(size);
                                if self.options.preserve_layout {
                                    image.position = Some(position);
                                }
                                images.push(image);
                            }
                            Err(e) => errors.push(e),
                        }
                    }
                }
                Err(e) => errors.push(e),
            },
        }

        for e in &errors {
            warn!("{}", e);
        }
        (images, errors)
    }

    fn persist(&self, number: usize, bitmap: &DynamicImage) -> Result<ImageRef, PageError> {
        let fail = |detail: String| PageError::ImageFailed {
            page: number,
            detail,
        };
        let format = self.options.image_format;
        let bytes =
            encode(bitmap, format, self.options.image_quality).map_err(|e| fail(e.to_string()))?;

        let (src, path) = if self.options.embed_images {
            let uri = format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(&bytes));
            (uri, None)
        } else {
            let path = store(&self.options.image_dir, number, format.extension(), &bytes)
                .map_err(|e| {
                    fail(format!(
                        "cannot write into '{}': {}",
                        self.options.image_dir.display(),
                        e
                    ))
                })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            debug!("Page {}: stored image {}", number, path.display());
            (public_url(&self.options.public_url_prefix, &file_name), Some(path))
        };

        Ok(ImageRef {
            src,
            alt: alt_text(number),
            path,
            position: None,
            size: None,
            pixel_width: bitmap.width(),
            pixel_height: bitmap.height(),
            bytes: bytes.len(),
        })
    }
}
