//! Collision masks
//!
//! A mask keeps only per-pixel opacity and the origin it is drawn around.
//! Display sprites may differ in size or animation; collision never looks at them.

use std::path::Path;
use super::SpriteError;

/// Opaque extents of a frame, all edges inclusive, in frame-local pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameBounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// One animation frame of a mask
#[derive(Debug, Clone, PartialEq)]
pub struct MaskFrame {
    pub width: usize,
    pub height: usize,
    cells: Vec<bool>,
    bounds: Option<FrameBounds>,
}

impl MaskFrame {
    /// Build a frame from a row-major occupancy grid
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Self {
        assert_eq!(cells.len(), width * height, "mask cell count must match frame size");

        let mut bounds: Option<FrameBounds> = None;
        for y in 0..height {
            for x in 0..width {
                if !cells[y * width + x] {
                    continue;
                }
                let (x, y) = (x as i32, y as i32);
                bounds = Some(match bounds {
                    None => FrameBounds { left: x, right: x, top: y, bottom: y },
                    Some(b) => FrameBounds {
                        left: b.left.min(x),
                        right: b.right.max(x),
                        top: b.top.min(y),
                        bottom: b.bottom.max(y),
                    },
                });
            }
        }

        Self { width, height, cells, bounds }
    }

    /// Build a frame by evaluating `opaque(x, y)` for every cell
    pub fn from_fn(width: usize, height: usize, mut opaque: impl FnMut(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(opaque(x, y));
            }
        }
        Self::from_cells(width, height, cells)
    }

    /// Fully opaque rectangle
    pub fn solid(width: usize, height: usize) -> Self {
        Self::from_cells(width, height, vec![true; width * height])
    }

    /// Occupancy test; anything outside the frame rectangle is transparent
    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.cells[y as usize * self.width + x as usize]
    }

    /// Opaque extents, `None` for a fully transparent frame
    pub fn bounds(&self) -> Option<FrameBounds> {
        self.bounds
    }

    pub fn opaque_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// An immutable multi-frame collision mask with a shared origin
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteMask {
    pub name: String,
    pub x_origin: i32,
    pub y_origin: i32,
    frames: Vec<MaskFrame>,
}

impl SpriteMask {
    pub fn new(name: impl Into<String>, x_origin: i32, y_origin: i32, mut frames: Vec<MaskFrame>) -> Self {
        if frames.is_empty() {
            frames.push(MaskFrame::from_cells(0, 0, Vec::new()));
        }
        Self {
            name: name.into(),
            x_origin,
            y_origin,
            frames,
        }
    }

    pub fn single(name: impl Into<String>, x_origin: i32, y_origin: i32, frame: MaskFrame) -> Self {
        Self::new(name, x_origin, y_origin, vec![frame])
    }

    /// Cut an RGBA sheet into `cols x rows` equally sized frames (row-major).
    /// A cell is opaque when its alpha is non-zero.
    pub fn from_rgba(
        name: impl Into<String>,
        width: usize,
        height: usize,
        rgba: &[u8],
        cols: usize,
        rows: usize,
        x_origin: i32,
        y_origin: i32,
    ) -> Result<Self, SpriteError> {
        if cols == 0 || rows == 0 || width % cols != 0 || height % rows != 0 || rgba.len() != width * height * 4 {
            return Err(SpriteError::BadSheet { width, height, cols, rows });
        }

        let fw = width / cols;
        let fh = height / rows;
        let mut frames = Vec::with_capacity(cols * rows);

        for row in 0..rows {
            for col in 0..cols {
                let frame = MaskFrame::from_fn(fw, fh, |x, y| {
                    let sx = col * fw + x;
                    let sy = row * fh + y;
                    rgba[(sy * width + sx) * 4 + 3] != 0
                });
                frames.push(frame);
            }
        }

        Ok(Self::new(name, x_origin, y_origin, frames))
    }

    /// Load a sheet from an image file (PNG, JPEG or BMP)
    pub fn from_file<P: AsRef<Path>>(
        path: P,
        cols: usize,
        rows: usize,
        x_origin: i32,
        y_origin: i32,
    ) -> Result<Self, SpriteError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| SpriteError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (w, h) = rgba.dimensions();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_rgba(name, w as usize, h as usize, rgba.as_raw(), cols, rows, x_origin, y_origin)
    }

    /// Frame for a (fractional) image index: rounded, then wrapped into range
    pub fn frame(&self, image_index: f32) -> &MaskFrame {
        let n = self.frames.len() as i64;
        let i = (image_index.round() as i64).rem_euclid(n);
        &self.frames[i as usize]
    }

    pub fn frames(&self) -> &[MaskFrame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}
