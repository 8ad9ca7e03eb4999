//! Pixel geometry and colors.
//!
//! All coordinates are integer pixels. [`Rect`] uses inclusive corners: a
//! rectangle from `(0, 0)` to `(9, 9)` is ten pixels wide.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Rectangle with inclusive corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Rectangle of `width` x `height` pixels with its top-left at `(x, y)`.
    pub const fn from_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width - 1,
            y2: y + height - 1,
        }
    }

    pub const fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    pub const fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    pub const fn top_left(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    /// True when the rectangle covers no pixel.
    pub const fn is_empty(&self) -> bool {
        self.x2 < self.x1 || self.y2 < self.y1
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    pub const fn contains_point(&self, point: Point) -> bool {
        self.contains(point.x, point.y)
    }

    pub const fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Shrinks each side by the given amount.
    pub const fn inset(&self, left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            x1: self.x1 + left,
            y1: self.y1 + top,
            x2: self.x2 - right,
            y2: self.y2 - bottom,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x1 <= other.x2 && other.x1 <= self.x2 && self.y1 <= other.y2 && other.y1 <= self.y2
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let rect = Rect::new(
            self.x1.max(other.x1),
            self.y1.max(other.y1),
            self.x2.min(other.x2),
            self.y2.min(other.y2),
        );
        (!rect.is_empty()).then_some(rect)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{} - {},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Error returned when a comma separated geometry or color value is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGeometryError(pub String);

impl fmt::Display for ParseGeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed value '{}'", self.0)
    }
}

impl std::error::Error for ParseGeometryError {}

fn parse_components<const N: usize>(s: &str) -> Result<[i32; N], ParseGeometryError> {
    let err = || ParseGeometryError(s.to_string());
    let mut out = [0; N];
    let mut parts = s.split(',');
    for slot in out.iter_mut() {
        *slot = parts
            .next()
            .ok_or_else(err)?
            .trim()
            .parse()
            .map_err(|_| err())?;
    }
    if parts.next().is_some() {
        return Err(err());
    }
    Ok(out)
}

impl FromStr for Rect {
    type Err = ParseGeometryError;

    /// Parses `x1,y1,x2,y2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [x1, y1, x2, y2] = parse_components::<4>(s)?;
        Ok(Rect::new(x1, y1, x2, y2))
    }
}

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ParseGeometryError;

    /// Parses `r,g,b` or `r,g,b,a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseGeometryError(s.to_string());
        let channels = parse_components::<4>(s)
            .or_else(|_| parse_components::<3>(s).map(|[r, g, b]| [r, g, b, 255]))?;
        let mut out = [0u8; 4];
        for (dst, src) in out.iter_mut().zip(channels) {
            *dst = u8::try_from(src).map_err(|_| err())?;
        }
        Ok(Color::rgba(out[0], out[1], out[2], out[3]))
    }
}
