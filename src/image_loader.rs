//! Image decoding into OpenCV matrices
//!
//! All decoders produce an 8-bit BGR `Mat`, the layout the detection stage
//! expects. The extension only routes a file to `image` or libheif; the
//! decoder itself is chosen from the file's leading bytes, so a PNG saved
//! as `.jpg` still loads.
//!
//! ## Supported Formats
//!
//! Standard formats (via `image` crate):
//! - JPEG, PNG, GIF (first frame), WebP, TIFF, BMP, ICO, TGA, PNM, QOI
//!
//! Apple formats (via `libheif-rs`, behind the `heif` feature):
//! - HEIC, HEIF

use crate::error::{MeasurementError, Result};
use opencv::core::Mat;
use std::path::Path;

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    /// First frame only
    Gif,
    WebP,
    Tiff,
    Bmp,
    Ico,
    Tga,
    /// PBM, PGM, PPM
    Pnm,
    Qoi,
    /// Apple HEIC/HEIF
    Heic,
}

impl ImageFormat {
    /// Detect format from file extension
    pub fn from_extension(path: &Path) -> Option<ImageFormat> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::WebP),
            "tiff" | "tif" => Some(ImageFormat::Tiff),
            "bmp" => Some(ImageFormat::Bmp),
            "ico" => Some(ImageFormat::Ico),
            "tga" => Some(ImageFormat::Tga),
            "pbm" | "pgm" | "ppm" | "pnm" => Some(ImageFormat::Pnm),
            "qoi" => Some(ImageFormat::Qoi),
            "heic" | "heif" => Some(ImageFormat::Heic),
            _ => None,
        }
    }

    /// Check if format requires libheif
    pub fn requires_heif(&self) -> bool {
        matches!(self, ImageFormat::Heic)
    }
}

/// Load an image from disk as a BGR `Mat`.
///
/// # Errors
///
/// Returns `MeasurementError::ImageLoadError` if:
/// - the extension is not a supported format
/// - the file cannot be opened
/// - decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use vblock_height::image_loader::load_image;
/// use opencv::prelude::*;
/// use std::path::Path;
///
/// let mat = load_image(Path::new("photo.jpg"))?;
/// println!("Loaded image: {}x{}", mat.cols(), mat.rows());
/// # Ok::<(), vblock_height::MeasurementError>(())
/// ```
pub fn load_image(path: &Path) -> Result<Mat> {
    let format = ImageFormat::from_extension(path).ok_or_else(|| {
        MeasurementError::ImageLoadError {
            message: format!("Unknown image format for file: {}", path.display()),
            source: None,
        }
    })?;

    if format.requires_heif() {
        load_heic(path)
    } else {
        load_standard(path)
    }
}

/// Decode an in-memory image (format sniffed from its header) as a BGR `Mat`.
///
/// With the `heif` feature, buffers `image` does not recognise are handed
/// to libheif.
pub fn decode_image(bytes: &[u8]) -> Result<Mat> {
    match image::load_from_memory(bytes) {
        Ok(img) => dynamic_to_bgr_mat(img),
        #[cfg(feature = "heif")]
        Err(_) if image::guess_format(bytes).is_err() => decode_heif(HeifSource::Bytes(bytes)),
        Err(e) => Err(MeasurementError::image_load("Failed to decode image buffer", e)),
    }
}

fn load_standard(path: &Path) -> Result<Mat> {
    use image::ImageReader;

    let open_err = |e: std::io::Error| {
        MeasurementError::image_load(
            format!("Failed to open image file: {}", path.display()),
            e,
        )
    };
    // Falls back to the extension when the header is not recognised
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(open_err)?;

    let img = reader.decode().map_err(|e| {
        MeasurementError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    dynamic_to_bgr_mat(img)
}

fn dynamic_to_bgr_mat(img: image::DynamicImage) -> Result<Mat> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    let width = i32::try_from(width)
        .map_err(|_| MeasurementError::processing(format!("Image too wide: {width}")))?;
    let height = i32::try_from(height)
        .map_err(|_| MeasurementError::processing(format!("Image too tall: {height}")))?;
    rgb_to_bgr_mat(&rgb.into_raw(), width, height)
}

#[cfg(feature = "heif")]
enum HeifSource<'a> {
    File(&'a Path),
    Bytes(&'a [u8]),
}

#[cfg(feature = "heif")]
fn load_heic(path: &Path) -> Result<Mat> {
    decode_heif(HeifSource::File(path))
}

#[cfg(feature = "heif")]
fn decode_heif(source: HeifSource<'_>) -> Result<Mat> {
    use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

    let lib_heif = LibHeif::new();

    let ctx = match source {
        HeifSource::File(path) => {
            let path_str = path.to_str().ok_or_else(|| MeasurementError::ImageLoadError {
                message: format!("Invalid file path encoding: {}", path.display()),
                source: None,
            })?;
            HeifContext::read_from_file(path_str).map_err(|e| {
                MeasurementError::image_load(
                    format!("Failed to read HEIC file: {}", path.display()),
                    e,
                )
            })?
        }
        HeifSource::Bytes(bytes) => HeifContext::read_from_bytes(bytes)
            .map_err(|e| MeasurementError::image_load("Failed to read HEIC buffer", e))?,
    };

    let handle = ctx
        .primary_image_handle()
        .map_err(|e| MeasurementError::image_load("Failed to get primary image handle", e))?;

    let image = lib_heif
        .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
        .map_err(|e| MeasurementError::image_load("Failed to decode HEIC image", e))?;

    let planes = image.planes();
    let plane = planes.interleaved.ok_or_else(|| MeasurementError::ImageLoadError {
        message: "HEIC image has no interleaved RGB data".into(),
        source: None,
    })?;

    let width = handle.width() as i32;
    let height = handle.height() as i32;
    let row_bytes = width as usize * 3;
    let stride = plane.stride as usize;

    // Rows may be padded past width * 3
    let rgb: Vec<u8> = if stride == row_bytes {
        plane.data[..row_bytes * height as usize].to_vec()
    } else {
        plane
            .data
            .chunks(stride)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes])
            .copied()
            .collect()
    };

    rgb_to_bgr_mat(&rgb, width, height)
}

#[cfg(not(feature = "heif"))]
fn load_heic(path: &Path) -> Result<Mat> {
    Err(MeasurementError::ImageLoadError {
        message: format!(
            "HEIC/HEIF support is not enabled (build with the `heif` feature): {}",
            path.display()
        ),
        source: None,
    })
}

/// Convert a packed RGB byte buffer to an OpenCV BGR `Mat`
fn rgb_to_bgr_mat(rgb_data: &[u8], width: i32, height: i32) -> Result<Mat> {
    use opencv::core::CV_8UC3;
    use opencv::prelude::*;

    let expected = width as usize * height as usize * 3;
    if rgb_data.len() != expected {
        return Err(MeasurementError::processing(format!(
            "RGB buffer holds {} bytes, expected {expected} for {width}x{height}",
            rgb_data.len()
        )));
    }

    let mut mat = Mat::zeros(height, width, CV_8UC3)
        .and_then(|m| m.to_mat())
        .map_err(|e| MeasurementError::opencv("Mat allocation", e))?;

    let bgr = mat
        .data_bytes_mut()
        .map_err(|e| MeasurementError::opencv("Mat data access", e))?;
    for (dst, src) in bgr.chunks_exact_mut(3).zip(rgb_data.chunks_exact(3)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
    }

    Ok(mat)
}
