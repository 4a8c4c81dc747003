pub use clearshot;

pub mod expectations;
pub mod scene;

pub use expectations::{check_pixels, uniform_expectations, PixelExpectation};
pub use scene::{fill_scenes, ExpectedOutcome, FillScene, CANVAS_HEIGHT, CANVAS_WIDTH};
