use clearshot::{ChannelMapping, Color};

// ── Canvas constants ─────────────────────────────────────────────────────────

pub const CANVAS_WIDTH: u32 = 64;
pub const CANVAS_HEIGHT: u32 = 64;

/// Whether the actual render of a scene should match its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedOutcome {
    Match,
    Mismatch,
}

/// A reference color, a candidate color and the outcome their comparison
/// should produce.
#[derive(Debug, Clone, Copy)]
pub struct FillScene {
    pub name: &'static str,
    pub expected_color: Color,
    pub actual_color: Color,
    pub channel_mapping: ChannelMapping,
    pub outcome: ExpectedOutcome,
}

impl FillScene {
    fn new(
        name: &'static str,
        expected_color: Color,
        actual_color: Color,
        outcome: ExpectedOutcome,
    ) -> Self {
        Self {
            name,
            expected_color,
            actual_color,
            channel_mapping: ChannelMapping::Rgba,
            outcome,
        }
    }

    fn with_channel_mapping(mut self, channel_mapping: ChannelMapping) -> Self {
        self.channel_mapping = channel_mapping;
        self
    }
}

/// Every scene the regression suite runs.
pub fn fill_scenes() -> Vec<FillScene> {
    use ExpectedOutcome::{Match, Mismatch};

    vec![
        FillScene::new("red_matches_red", Color::RED, Color::RED, Match),
        FillScene::new("red_differs_from_green", Color::RED, Color::GREEN, Mismatch),
        FillScene::new(
            "half_gray_matches_half_gray",
            Color::rgb(0.5, 0.5, 0.5),
            Color::rgb(0.5, 0.5, 0.5),
            Match,
        ),
        FillScene::new(
            "transparent_differs_from_black",
            Color::TRANSPARENT,
            Color::BLACK,
            Mismatch,
        ),
        // Green and blue are taken from the same component, so red with a
        // changed green channel still renders identically.
        FillScene::new(
            "legacy_mapping_ignores_green",
            Color::rgb(1.0, 0.0, 0.0),
            Color::rgb(1.0, 1.0, 0.0),
            Match,
        )
        .with_channel_mapping(ChannelMapping::LegacyBlueAsGreen),
        FillScene::new(
            "legacy_mapping_sees_blue",
            Color::rgb(1.0, 0.0, 0.0),
            Color::rgb(1.0, 0.0, 1.0),
            Mismatch,
        )
        .with_channel_mapping(ChannelMapping::LegacyBlueAsGreen),
    ]
}
