//! Visual regression testing for off-screen GPU rendering.
//!
//! Fill a headless [`DrawingSurface`] with a color, persist it as a PNG
//! [`Snapshot`], and compare a later render against that reference.
//!
//! ```rust,no_run
//! use clearshot::{Color, HarnessConfig, RegressionHarness, Verdict};
//! use futures::executor::block_on;
//!
//! let result = block_on(async {
//!     let mut harness = RegressionHarness::new(HarnessConfig::default()).await?;
//!     harness.render_expected(Color::RED).await?;
//!     harness.render_actual(Color::RED).await?;
//!     harness.compare()
//! });
//! Verdict::from_result(&result).assert_pass();
//! ```

mod color;
mod compare;
mod error;
pub mod harness;
mod renderer;
mod snapshot;
mod surface;

pub use color::Color;
pub use compare::{compare_images, compare_pixels, CompareConfig, Comparison};
pub use error::{Error, Result};
pub use harness::{HarnessConfig, ReferencePolicy, RegressionHarness, Stage, Verdict};
pub use renderer::{fill, fill_with, ChannelMapping};
pub use snapshot::{save_snapshot, Snapshot};
pub use surface::{DrawingSurface, COLOR_FORMAT, DEPTH_STENCIL_FORMAT};
