use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let d = *self - *other;
        d.x.hypot(d.y)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        (*self + *other) * 0.5
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

/// The two eye landmarks reported by the detector for one frame.
///
/// Both eyes travel together: a frame that lacks either one is represented
/// as `Option::<EyePair>::None` by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyePair {
    pub left: Point,
    pub right: Point,
}

impl EyePair {
    pub const fn new(left: Point, right: Point) -> Self {
        Self { left, right }
    }
}

/// Sensor rotation reported alongside a frame, in clockwise degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Rotation {
    Deg0,
    /// Portrait capture of a landscape sensor, the usual front-camera case.
    #[default]
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn degrees(self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether the frame's width runs along the viewport's vertical axis.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

impl TryFrom<u32> for Rotation {
    type Error = Error;

    fn try_from(degrees: u32) -> std::result::Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(Error::InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// Size of a source frame in detector pixel space, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub rotation: Rotation,
}

impl FrameDimensions {
    /// A frame from a sensor mounted at 90 degrees.
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rotation: Rotation::Deg90,
        }
    }

    pub const fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Frame size as seen upright on the viewport: `(horizontal, vertical)`.
    pub fn upright_size(&self) -> (u32, u32) {
        if self.rotation.swaps_axes() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }
}

/// Size of the on-screen drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportDimensions {
    pub width: f32,
    pub height: f32,
}

impl ViewportDimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Native size of the overlay bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BitmapSize {
    pub width: f32,
    pub height: f32,
}

impl BitmapSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Read the size of an image file from its header without decoding it.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let (width, height) = image::image_dimensions(path)?;
        Ok(Self::new(width as f32, height as f32))
    }
}

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width() / 2.0,
            self.top + self.height() / 2.0,
        )
    }
}
