/// A color with normalized red, green, blue and alpha components.
///
/// Components are expected in `[0.0, 1.0]`, but are not clamped: whatever is
/// stored here is handed to the GPU clear as is, and the render target's own
/// conversion decides what happens to out-of-range values.
///
/// # Examples
///
/// ```
/// use clearshot::Color;
///
/// let red = Color::rgb(1.0, 0.0, 0.0);
/// assert_eq!(red, Color::RED);
/// assert_eq!(red.to_rgba8(), [255, 0, 0, 255]);
///
/// let half_blue = Color::rgba(0.0, 0.0, 1.0, 0.5);
/// assert_eq!(half_blue.to_array(), [0.0, 0.0, 1.0, 0.5]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color(pub [f32; 4]);

impl Color {
    /// All channels zero, fully transparent.
    pub const TRANSPARENT: Self = Self([0.0, 0.0, 0.0, 0.0]);
    pub const BLACK: Self = Self([0.0, 0.0, 0.0, 1.0]);
    pub const WHITE: Self = Self([1.0, 1.0, 1.0, 1.0]);
    pub const RED: Self = Self([1.0, 0.0, 0.0, 1.0]);
    pub const GREEN: Self = Self([0.0, 1.0, 0.0, 1.0]);
    pub const BLUE: Self = Self([0.0, 0.0, 1.0, 1.0]);

    /// Creates an opaque color.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([r, g, b, a])
    }

    /// Builds a color from 8-bit channels.
    ///
    /// ```
    /// use clearshot::Color;
    ///
    /// assert_eq!(Color::from_rgba8([255, 0, 255, 255]), Color::rgb(1.0, 0.0, 1.0));
    /// ```
    pub fn from_rgba8(rgba: [u8; 4]) -> Self {
        Self(rgba.map(|channel| channel as f32 / 255.0))
    }

    /// The 8-bit pixel a full-surface clear with this color leaves in an
    /// `Rgba8Unorm` render target.
    ///
    /// Each component is clamped to `[0.0, 1.0]`, scaled by 255 and rounded to
    /// the nearest integer.
    pub fn to_rgba8(&self) -> [u8; 4] {
        self.0
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    pub fn to_array(&self) -> [f32; 4] {
        self.0
    }
}
