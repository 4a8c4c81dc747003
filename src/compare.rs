use std::path::Path;

use image::{ImageReader, RgbaImage};

use crate::error::{Error, Result};

/// How strictly two images are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareConfig {
    /// Largest allowed absolute difference per channel (0 = exact).
    pub tolerance_per_channel: u8,
    /// Whether the alpha channel takes part in the comparison.
    pub compare_alpha: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            tolerance_per_channel: 0,
            compare_alpha: true,
        }
    }
}

impl CompareConfig {
    /// Every channel of every pixel must match exactly.
    pub fn exact() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance_per_channel = tolerance;
        self
    }

    pub fn with_compare_alpha(mut self, compare_alpha: bool) -> Self {
        self.compare_alpha = compare_alpha;
        self
    }
}

/// Outcome of comparing two images of equal size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub total_pixels: u64,
    /// Pixels with at least one compared channel outside the tolerance.
    pub different_pixels: u64,
    /// Largest difference seen in any compared channel.
    pub max_channel_diff: u8,
    /// Coordinates of the first differing pixel in row-major order.
    pub first_difference: Option<(u32, u32)>,
}

impl Comparison {
    pub fn is_equal(&self) -> bool {
        self.different_pixels == 0
    }
}

/// Loads the images at `expected` and `actual` and compares them pixel by pixel.
///
/// Fails if either file cannot be read or decoded, or if their dimensions
/// differ. A failed comparison carries no equality verdict at all.
pub fn compare_images(
    expected: impl AsRef<Path>,
    actual: impl AsRef<Path>,
    config: &CompareConfig,
) -> Result<Comparison> {
    let expected_image = load_rgba(expected.as_ref())?;
    let actual_image = load_rgba(actual.as_ref())?;
    let comparison = compare_pixels(&expected_image, &actual_image, config)?;

    if !comparison.is_equal() {
        log::warn!(
            "{} differs from {}: {} of {} pixels (max channel diff {})",
            actual.as_ref().display(),
            expected.as_ref().display(),
            comparison.different_pixels,
            comparison.total_pixels,
            comparison.max_channel_diff,
        );
    }

    Ok(comparison)
}

/// Compares two decoded images.
pub fn compare_pixels(
    expected: &RgbaImage,
    actual: &RgbaImage,
    config: &CompareConfig,
) -> Result<Comparison> {
    if expected.dimensions() != actual.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: expected.dimensions(),
            actual: actual.dimensions(),
        });
    }

    let channels = if config.compare_alpha { 4 } else { 3 };
    let mut comparison = Comparison {
        total_pixels: u64::from(expected.width()) * u64::from(expected.height()),
        different_pixels: 0,
        max_channel_diff: 0,
        first_difference: None,
    };

    for ((x, y, expected_pixel), actual_pixel) in expected.enumerate_pixels().zip(actual.pixels()) {
        let pixel_diff = expected_pixel.0[..channels]
            .iter()
            .zip(&actual_pixel.0[..channels])
            .map(|(&expected_channel, &actual_channel)| expected_channel.abs_diff(actual_channel))
            .max()
            .unwrap_or(0);

        comparison.max_channel_diff = comparison.max_channel_diff.max(pixel_diff);
        if pixel_diff > config.tolerance_per_channel {
            comparison.different_pixels += 1;
            comparison.first_difference.get_or_insert((x, y));
        }
    }

    Ok(comparison)
}

fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let image = reader.decode().map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use image::{Rgba, RgbaImage};

    use super::{compare_images, compare_pixels, CompareConfig};
    use crate::Error;

    fn solid(width: u32, height: u32, pixel: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(pixel))
    }

    fn save(directory: &Path, name: &str, image: &RgbaImage) -> PathBuf {
        let path = directory.join(name);
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn identical_files_are_equal() {
        let directory = tempfile::tempdir().unwrap();
        let path = save(directory.path(), "red.png", &solid(8, 8, [255, 0, 0, 255]));

        let comparison = compare_images(&path, &path, &CompareConfig::exact()).unwrap();
        assert!(comparison.is_equal());
        assert_eq!(comparison.total_pixels, 64);
        assert_eq!(comparison.first_difference, None);
    }

    #[test]
    fn single_pixel_difference_is_detected() {
        let directory = tempfile::tempdir().unwrap();
        let black = solid(8, 8, [0, 0, 0, 255]);
        let expected = save(directory.path(), "expected.png", &black);
        let mut changed = black;
        changed.put_pixel(3, 5, Rgba([0, 1, 0, 255]));
        let actual = save(directory.path(), "actual.png", &changed);

        let comparison = compare_images(&expected, &actual, &CompareConfig::exact()).unwrap();
        assert!(!comparison.is_equal());
        assert_eq!(comparison.different_pixels, 1);
        assert_eq!(comparison.max_channel_diff, 1);
        assert_eq!(comparison.first_difference, Some((3, 5)));
    }

    #[test]
    fn missing_file_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let actual = save(directory.path(), "actual.png", &solid(4, 4, [0, 0, 0, 255]));
        let expected = directory.path().join("expected.png");

        let error = compare_images(&expected, &actual, &CompareConfig::exact()).unwrap_err();
        assert!(matches!(error, Error::Read { .. }), "{error}");
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let directory = tempfile::tempdir().unwrap();
        let actual = save(directory.path(), "actual.png", &solid(4, 4, [0, 0, 0, 255]));
        let expected = directory.path().join("expected.png");
        std::fs::write(&expected, b"definitely not a png").unwrap();

        let error = compare_images(&expected, &actual, &CompareConfig::exact()).unwrap_err();
        assert!(matches!(error, Error::Decode { .. }), "{error}");
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let error = compare_pixels(
            &solid(4, 4, [0, 0, 0, 255]),
            &solid(4, 5, [0, 0, 0, 255]),
            &CompareConfig::exact(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            Error::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 5),
            }
        ));
    }

    #[test]
    fn tolerance_absorbs_small_differences() {
        let expected = solid(2, 2, [100, 100, 100, 255]);
        let actual = solid(2, 2, [103, 98, 101, 255]);

        let lenient = CompareConfig::exact().with_tolerance(3);
        let lenient = compare_pixels(&expected, &actual, &lenient).unwrap();
        assert!(lenient.is_equal());
        assert_eq!(lenient.max_channel_diff, 3);

        let strict = compare_pixels(&expected, &actual, &CompareConfig::exact()).unwrap();
        assert_eq!(strict.different_pixels, 4);
    }

    #[test]
    fn alpha_can_be_ignored() {
        let expected = solid(2, 2, [10, 20, 30, 255]);
        let actual = solid(2, 2, [10, 20, 30, 0]);

        let with_alpha = compare_pixels(&expected, &actual, &CompareConfig::exact()).unwrap();
        assert!(!with_alpha.is_equal());

        let without_alpha = compare_pixels(
            &expected,
            &actual,
            &CompareConfig::exact().with_compare_alpha(false),
        )
        .unwrap();
        assert!(without_alpha.is_equal());
    }
}
