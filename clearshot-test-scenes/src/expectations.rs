use clearshot::{ChannelMapping, Color};

/// A single pixel-color expectation to validate after rendering.
pub struct PixelExpectation {
    pub x: u32,
    pub y: u32,
    pub expected: [u8; 4],
    /// Per-channel tolerance for comparison (default 0).
    pub tolerance: u8,
    /// Human-readable label for failure messages.
    pub label: &'static str,
}

impl PixelExpectation {
    pub fn new(x: u32, y: u32, expected: [u8; 4], label: &'static str) -> Self {
        Self {
            x,
            y,
            expected,
            tolerance: 0,
            label,
        }
    }

    pub fn with_tolerance(mut self, tolerance: u8) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Samples the corners and the center of a `width`×`height` canvas that was
/// filled with `color`. An empty canvas has nothing to sample.
pub fn uniform_expectations(
    color: Color,
    mapping: ChannelMapping,
    width: u32,
    height: u32,
) -> Vec<PixelExpectation> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let expected = mapping.apply(color).to_rgba8();
    let (right, bottom) = (width - 1, height - 1);
    vec![
        PixelExpectation::new(0, 0, expected, "top_left"),
        PixelExpectation::new(right, 0, expected, "top_right"),
        PixelExpectation::new(0, bottom, expected, "bottom_left"),
        PixelExpectation::new(right, bottom, expected, "bottom_right"),
        PixelExpectation::new(width / 2, height / 2, expected, "center"),
    ]
}

/// Validates pixel expectations against tightly packed RGBA8 pixel data, as
/// returned by `DrawingSurface::read_pixels` or a decoded snapshot.
///
/// Returns a list of human-readable failure descriptions. An empty list means
/// all expectations passed.
pub fn check_pixels(
    pixel_data: &[u8],
    width: u32,
    height: u32,
    expectations: &[PixelExpectation],
) -> Vec<String> {
    let mut failures = Vec::new();
    let stride = (width as usize) * 4;

    for expectation in expectations {
        if expectation.x >= width || expectation.y >= height {
            failures.push(format!(
                "[{}] pixel ({},{}) is outside canvas {}×{}",
                expectation.label, expectation.x, expectation.y, width, height,
            ));
            continue;
        }

        let offset = (expectation.y as usize) * stride + (expectation.x as usize) * 4;
        let Some(actual) = pixel_data.get(offset..offset + 4) else {
            failures.push(format!(
                "[{}] pixel ({},{}) is out of bounds (buffer len {})",
                expectation.label,
                expectation.x,
                expectation.y,
                pixel_data.len(),
            ));
            continue;
        };

        let matches = actual
            .iter()
            .zip(expectation.expected)
            .all(|(&actual, expected)| actual.abs_diff(expected) <= expectation.tolerance);

        if !matches {
            failures.push(format!(
                "[{}] pixel ({},{}) expected rgba{:?} ±{} but got rgba{:?}",
                expectation.label,
                expectation.x,
                expectation.y,
                expectation.expected,
                expectation.tolerance,
                actual,
            ));
        }
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::{check_pixels, uniform_expectations, PixelExpectation};
    use clearshot::{ChannelMapping, Color};

    #[test]
    fn uniform_buffer_satisfies_uniform_expectations() {
        let pixels = [255, 0, 0, 255].repeat(4 * 3);
        let expectations = uniform_expectations(Color::RED, ChannelMapping::Rgba, 4, 3);

        assert!(check_pixels(&pixels, 4, 3, &expectations).is_empty());
    }

    #[test]
    fn empty_canvas_has_no_expectations() {
        for (width, height) in [(0, 4), (4, 0), (0, 0)] {
            let expectations =
                uniform_expectations(Color::RED, ChannelMapping::Rgba, width, height);
            assert!(expectations.is_empty(), "{width}x{height}");
        }
    }

    #[test]
    fn reports_mismatch_and_out_of_canvas() {
        let pixels = [0, 0, 0, 255].repeat(4);
        let expectations = vec![
            PixelExpectation::new(1, 1, [255, 255, 255, 255], "white"),
            PixelExpectation::new(5, 0, [0, 0, 0, 255], "outside"),
        ];

        let failures = check_pixels(&pixels, 2, 2, &expectations);
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("[white]"));
        assert!(failures[1].contains("outside canvas"));
    }

    #[test]
    fn tolerance_is_per_channel() {
        let pixels = [100, 100, 100, 255];
        let near = PixelExpectation::new(0, 0, [102, 99, 100, 255], "near");

        assert_eq!(check_pixels(&pixels, 1, 1, &[near]).len(), 1);
        let near = PixelExpectation::new(0, 0, [102, 99, 100, 255], "near").with_tolerance(2);
        assert!(check_pixels(&pixels, 1, 1, &[near]).is_empty());
    }
}
