/// A pixel with three independent 8-bit channels.
///
/// # Examples
///
/// ```
/// use rasterfx_image::Rgb8;
///
/// let px = Rgb8::clamped(300, -4, 128);
/// assert_eq!(px, Rgb8::new(255, 0, 128));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Pure black.
    pub const BLACK: Rgb8 = Rgb8::new(0, 0, 0);

    /// Pure white.
    pub const WHITE: Rgb8 = Rgb8::new(255, 255, 255);

    /// Create a pixel from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a pixel from wide intermediate values, clamping each to [0, 255].
    pub fn clamped(r: i32, g: i32, b: i32) -> Self {
        Self {
            r: clamp_u8(r),
            g: clamp_u8(g),
            b: clamp_u8(b),
        }
    }

    /// Create a pixel from per-channel values in R, G, B order.
    pub fn from_channels(channels: [u8; 3]) -> Self {
        Self::new(channels[0], channels[1], channels[2])
    }

    /// The channels in R, G, B order.
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Apply `f` to each channel independently.
    pub fn map(self, mut f: impl FnMut(u8) -> u8) -> Self {
        Self::new(f(self.r), f(self.g), f(self.b))
    }

    /// Combine two pixels channel by channel.
    pub fn zip_map(self, other: Rgb8, mut f: impl FnMut(u8, u8) -> u8) -> Self {
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }
}

impl From<[u8; 3]> for Rgb8 {
    fn from(channels: [u8; 3]) -> Self {
        Self::from_channels(channels)
    }
}

impl From<Rgb8> for [u8; 3] {
    fn from(px: Rgb8) -> Self {
        px.channels()
    }
}

/// Clamp a wide integer into the 8-bit channel range.
pub fn clamp_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}
