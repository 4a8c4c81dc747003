//! Reference-image regression runs.
//!
//! A run moves through four stages, strictly in order:
//!
//! ```text
//! Init --render_expected--> RenderedExpected --render_actual--> RenderedActual --compare--> Compared
//! ```
//!
//! Each render step fills the surface, reads it back and writes a PNG; the
//! step only returns once the file is on disk. [`RegressionHarness::compare`]
//! needs the [`Snapshot`]s produced by both render steps, so it can never read
//! a file that is still being written.

use std::path::PathBuf;

use crate::color::Color;
use crate::compare::{compare_images, CompareConfig, Comparison};
use crate::error::{Error, Result};
use crate::renderer::{fill_with, ChannelMapping};
use crate::snapshot::{save_snapshot, Snapshot};
use crate::surface::DrawingSurface;

/// Where a regression run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    RenderedExpected,
    RenderedActual,
    Compared,
}

impl Stage {
    /// The stage that follows this one, or `None` for the terminal stage.
    fn next(self) -> Option<Stage> {
        match self {
            Stage::Init => Some(Stage::RenderedExpected),
            Stage::RenderedExpected => Some(Stage::RenderedActual),
            Stage::RenderedActual => Some(Stage::Compared),
            Stage::Compared => None,
        }
    }

    fn ensure(self, expected: Stage, action: &'static str) -> Result<()> {
        if self == expected {
            Ok(())
        } else {
            Err(Error::OutOfOrder {
                action,
                expected,
                found: self,
            })
        }
    }

    /// Moves to the next stage. The terminal stage stays where it is.
    fn advance(&mut self) {
        if let Some(next) = self.next() {
            *self = next;
        }
    }
}

/// What to do with an expected image that is already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Render the expected image on every run.
    #[default]
    Regenerate,
    /// Keep an existing expected image as ground truth and only render it
    /// when it is missing.
    ReuseExisting,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub width: u32,
    pub height: u32,
    pub expected_path: PathBuf,
    pub actual_path: PathBuf,
    pub compare: CompareConfig,
    pub channel_mapping: ChannelMapping,
    pub reference: ReferencePolicy,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            expected_path: PathBuf::from("./expected.png"),
            actual_path: PathBuf::from("./actual.png"),
            compare: CompareConfig::default(),
            channel_mapping: ChannelMapping::default(),
            reference: ReferencePolicy::default(),
        }
    }
}

impl HarnessConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_expected_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.expected_path = path.into();
        self
    }

    pub fn with_actual_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.actual_path = path.into();
        self
    }

    /// Puts both artifacts into `directory` under their default file names.
    pub fn in_directory(self, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        self.with_expected_path(directory.join("expected.png"))
            .with_actual_path(directory.join("actual.png"))
    }

    pub fn with_compare(mut self, compare: CompareConfig) -> Self {
        self.compare = compare;
        self
    }

    pub fn with_channel_mapping(mut self, channel_mapping: ChannelMapping) -> Self {
        self.channel_mapping = channel_mapping;
        self
    }

    pub fn with_reference(mut self, reference: ReferencePolicy) -> Self {
        self.reference = reference;
        self
    }
}

/// Drives one expected/actual/compare cycle against a single surface.
pub struct RegressionHarness {
    surface: DrawingSurface,
    config: HarnessConfig,
    stage: Stage,
    expected: Option<Snapshot>,
    actual: Option<Snapshot>,
}

impl RegressionHarness {
    /// Creates a surface of the configured size and a harness around it.
    pub async fn new(config: HarnessConfig) -> Result<Self> {
        let surface = DrawingSurface::new((config.width, config.height)).await?;
        Self::with_surface(surface, config)
    }

    /// Uses an existing surface. Its size must match the configured size.
    pub fn with_surface(surface: DrawingSurface, config: HarnessConfig) -> Result<Self> {
        if surface.size() != (config.width, config.height) {
            return Err(Error::SizeMismatch {
                requested: (config.width, config.height),
                surface: surface.size(),
            });
        }

        Ok(Self {
            surface,
            config,
            stage: Stage::Init,
            expected: None,
            actual: None,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    /// Renders `color` and stores it as the reference image.
    pub async fn render_expected(&mut self, color: Color) -> Result<&Snapshot> {
        self.stage.ensure(Stage::Init, "render the expected image")?;

        let path = self.config.expected_path.clone();
        let reuse = self.config.reference == ReferencePolicy::ReuseExisting && path.exists();
        let snapshot = if reuse {
            log::info!("Reusing existing reference image {}", path.display());
            Snapshot::existing(path)?
        } else {
            self.render_to(color, path).await?
        };

        self.stage.advance();
        Ok(&*self.expected.insert(snapshot))
    }

    /// Renders `color` and stores it as the candidate image.
    pub async fn render_actual(&mut self, color: Color) -> Result<&Snapshot> {
        self.stage.ensure(Stage::RenderedExpected, "render the actual image")?;

        let path = self.config.actual_path.clone();
        let snapshot = self.render_to(color, path).await?;

        self.stage.advance();
        Ok(&*self.actual.insert(snapshot))
    }

    /// Compares the candidate image against the reference image.
    pub fn compare(&mut self) -> Result<Comparison> {
        self.stage.ensure(Stage::RenderedActual, "compare images")?;
        let (Some(expected), Some(actual)) = (&self.expected, &self.actual) else {
            return Err(Error::OutOfOrder {
                action: "compare images",
                expected: Stage::RenderedActual,
                found: self.stage,
            });
        };

        let result = compare_images(expected.path(), actual.path(), &self.config.compare);
        self.stage.advance();
        result
    }

    async fn render_to(&mut self, color: Color, path: PathBuf) -> Result<Snapshot> {
        fill_with(&mut self.surface, color, self.config.channel_mapping);
        save_snapshot(&self.surface, self.config.width, self.config.height, path).await
    }
}

/// Renders `expected_color` as the reference, `actual_color` as the candidate
/// and compares them.
pub async fn run(
    config: HarnessConfig,
    expected_color: Color,
    actual_color: Color,
) -> Result<Comparison> {
    let mut harness = RegressionHarness::new(config).await?;
    harness.render_expected(expected_color).await?;
    harness.render_actual(actual_color).await?;
    harness.compare()
}

/// The single pass/fail assertion of a regression test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    /// Passes only for a successful comparison without differing pixels.
    /// An error is a failure, never a skipped check.
    pub fn from_result(result: &Result<Comparison>) -> Self {
        match result {
            Ok(comparison) if comparison.is_equal() => Verdict::Pass,
            Ok(comparison) => Verdict::Fail(format!(
                "images differ: {} of {} pixels, max channel diff {}, first at {:?}",
                comparison.different_pixels,
                comparison.total_pixels,
                comparison.max_channel_diff,
                comparison.first_difference,
            )),
            Err(error) => Verdict::Fail(format!("comparison failed: {error}")),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Panics with the failure reason unless the verdict is a pass.
    #[track_caller]
    pub fn assert_pass(&self) {
        if let Verdict::Fail(reason) = self {
            panic!("images do not match: {reason}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HarnessConfig, Stage, Verdict};
    use crate::{Comparison, Error};

    fn comparison(different_pixels: u64) -> Comparison {
        Comparison {
            total_pixels: 16,
            different_pixels,
            max_channel_diff: if different_pixels == 0 { 0 } else { 255 },
            first_difference: (different_pixels > 0).then_some((0, 0)),
        }
    }

    #[test]
    fn stages_advance_in_order() {
        let mut stage = Stage::Init;
        let mut visited = vec![stage];
        while let Some(next) = stage.next() {
            visited.push(next);
            stage = next;
        }

        assert_eq!(
            visited,
            vec![
                Stage::Init,
                Stage::RenderedExpected,
                Stage::RenderedActual,
                Stage::Compared,
            ]
        );
    }

    #[test]
    fn advance_stops_at_compared() {
        let mut stage = Stage::RenderedActual;
        stage.advance();
        assert_eq!(stage, Stage::Compared);
        stage.advance();
        assert_eq!(stage, Stage::Compared);
    }

    #[test]
    fn ensure_reports_the_current_stage() {
        let error = Stage::Init
            .ensure(Stage::RenderedActual, "compare images")
            .unwrap_err();
        assert!(matches!(
            error,
            Error::OutOfOrder {
                action: "compare images",
                expected: Stage::RenderedActual,
                found: Stage::Init,
            }
        ));
    }

    #[test]
    fn equal_comparison_passes() {
        assert_eq!(Verdict::from_result(&Ok(comparison(0))), Verdict::Pass);
    }

    #[test]
    fn differing_comparison_fails() {
        let verdict = Verdict::from_result(&Ok(comparison(3)));
        assert!(!verdict.is_pass());
    }

    #[test]
    fn comparison_error_fails_instead_of_passing() {
        let result = Err(Error::DimensionMismatch {
            expected: (64, 64),
            actual: (32, 32),
        });
        let verdict = Verdict::from_result(&result);
        assert!(matches!(verdict, Verdict::Fail(ref reason) if reason.contains("64x64")));
    }

    #[test]
    #[should_panic(expected = "images do not match: images differ")]
    fn assert_pass_panics_on_failure() {
        Verdict::Fail("images differ".to_string()).assert_pass();
    }

    #[test]
    fn default_config_matches_tutorial_layout() {
        let config = HarnessConfig::default();
        assert_eq!((config.width, config.height), (64, 64));
        assert_eq!(config.expected_path.to_str(), Some("./expected.png"));
        assert_eq!(config.actual_path.to_str(), Some("./actual.png"));
    }
}
