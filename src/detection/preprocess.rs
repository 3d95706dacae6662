//! Downscaling, grayscale conversion, denoising and edge extraction

use opencv::{
    core::{Mat, Size},
    imgproc::{
        canny, cvt_color_def, gaussian_blur_def, median_blur, resize, COLOR_BGR2GRAY,
        COLOR_BGRA2GRAY, INTER_AREA,
    },
    prelude::*,
};
use tracing::debug;

use crate::config::{DenoiseFilter, PreprocessingConfig};
use crate::error::{MeasurementError, Result};

/// Intermediate rasters shared by the line and circle detectors.
#[derive(Debug)]
pub struct Preprocessed {
    /// Color input after optional downscaling; annotations are drawn on this
    pub image: Mat,
    /// Denoised grayscale image, fed to the circle detector
    pub denoised: Mat,
    /// Canny edge map, fed to the line detector
    pub edges: Mat,
    /// Ratio of processed to original size (1.0 when not downscaled)
    pub scale: f64,
}

pub struct Preprocessor {
    config: PreprocessingConfig,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default())
    }
}

impl Preprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, image: &Mat) -> Result<Preprocessed> {
        if image.empty() {
            return Err(MeasurementError::processing("Input image is empty"));
        }

        let (image, scale) = self.downscale(image)?;
        let gray = to_grayscale(&image)?;
        let denoised = self.denoise(&gray)?;

        let mut edges = Mat::default();
        canny(
            &denoised,
            &mut edges,
            self.config.canny_low_threshold,
            self.config.canny_high_threshold,
            self.config.canny_aperture_size,
            false,
        )
        .map_err(|e| MeasurementError::opencv("Canny edge detection", e))?;

        debug!(
            width = image.cols(),
            height = image.rows(),
            scale,
            "Preprocessing complete"
        );

        Ok(Preprocessed {
            image,
            denoised,
            edges,
            scale,
        })
    }

    /// Shrink so the long side fits `max_process_dim`, keeping the aspect ratio
    fn downscale(&self, image: &Mat) -> Result<(Mat, f64)> {
        let (width, height) = (image.cols(), image.rows());
        let long_side = width.max(height);

        let limit = match self.config.max_process_dim {
            Some(limit) if long_side > limit => limit,
            _ => {
                let copy = image
                    .try_clone()
                    .map_err(|e| MeasurementError::opencv("Image copy", e))?;
                return Ok((copy, 1.0));
            }
        };

        let scale = f64::from(limit) / f64::from(long_side);
        let target = Size::new(
            ((f64::from(width) * scale).round() as i32).max(1),
            ((f64::from(height) * scale).round() as i32).max(1),
        );

        let mut resized = Mat::default();
        resize(image, &mut resized, target, 0.0, 0.0, INTER_AREA)
            .map_err(|e| MeasurementError::opencv("Downscale", e))?;

        Ok((resized, scale))
    }

    fn denoise(&self, gray: &Mat) -> Result<Mat> {
        let mut out = Mat::default();
        match self.config.denoise {
            DenoiseFilter::Median { kernel_size } => {
                median_blur(gray, &mut out, kernel_size)
                    .map_err(|e| MeasurementError::opencv("Median filter", e))?;
            }
            DenoiseFilter::Gaussian { kernel_size, sigma } => {
                gaussian_blur_def(gray, &mut out, Size::new(kernel_size, kernel_size), sigma)
                    .map_err(|e| MeasurementError::opencv("Gaussian blur", e))?;
            }
        }
        Ok(out)
    }
}

/// Convert BGR or BGRA to single-channel; single-channel input is copied
pub fn to_grayscale(image: &Mat) -> Result<Mat> {
    let code = match image.channels() {
        1 => {
            return image
                .try_clone()
                .map_err(|e| MeasurementError::opencv("Image copy", e));
        }
        3 => COLOR_BGR2GRAY,
        4 => COLOR_BGRA2GRAY,
        n => {
            return Err(MeasurementError::processing(format!(
                "Unsupported channel count: {n}"
            )))
        }
    };

    let mut gray = Mat::default();
    cvt_color_def(image, &mut gray, code)
        .map_err(|e| MeasurementError::opencv("Grayscale conversion", e))?;
    Ok(gray)
}
