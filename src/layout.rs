//! Grid layout: fractional grid cells to pixel rectangles.
//!
//! Cell size is `floor(W / columns) x floor(H / rows)`, fixed when the layout
//! is bound to a page. The remainder pixels are dropped so that every cell
//! lands on the same whole-pixel grid.

use serde::{Deserialize, Serialize};

use crate::error::{PlateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLayout {
    pub columns: u32,
    pub rows: u32,
    #[serde(default)]
    pub padding_x: i32,
    #[serde(default)]
    pub padding_y: i32,
}

impl GridLayout {
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            padding_x: 0,
            padding_y: 0,
        }
    }

    pub const fn with_padding(mut self, padding_x: i32, padding_y: i32) -> Self {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
        self
    }

    /// Fixes the cell size for a `width` x `height` pixel plate.
    pub fn bind(&self, width: u32, height: u32) -> Result<Grid> {
        if self.columns == 0 || self.rows == 0 {
            return Err(PlateError::InvalidLayout(format!(
                "{}x{} grid has no cells",
                self.columns, self.rows
            )));
        }

        Ok(Grid {
            layout: *self,
            cell_width: (width / self.columns) as i32,
            cell_height: (height / self.rows) as i32,
        })
    }
}

/// A layout bound to one page's plate dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    layout: GridLayout,
    cell_width: i32,
    cell_height: i32,
}

impl Grid {
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn cell_width(&self) -> i32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> i32 {
        self.cell_height
    }

    /// Pixel rectangle for `placement`, or `None` when it is incomplete.
    ///
    /// Fractional products are floored to whole pixels.
    pub fn place(&self, placement: &Placement) -> Option<Rect> {
        let (c, r, w, h) = placement.cells()?;
        let (pad_x, pad_y) = if placement.ignore_padding {
            (0, 0)
        } else {
            (self.layout.padding_x, self.layout.padding_y)
        };

        let scale = |cells: f64, size: i32| (f64::from(size) * cells).floor() as i32;

        Some(Rect {
            x: scale(c, self.cell_width) + pad_x,
            y: scale(r, self.cell_height) + pad_y,
            w: scale(w, self.cell_width) - 2 * pad_x,
            h: scale(h, self.cell_height) - 2 * pad_y,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Where a widget goes, in (fractional) grid cells.
///
/// Any missing coordinate leaves the widget with zero geometry, which is how
/// invisible parent containers (tab views, tabs) are added.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Placement {
    pub column: Option<f64>,
    pub row: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub ignore_padding: bool,
}

impl Placement {
    pub fn grid(column: f64, row: f64, width: f64, height: f64) -> Self {
        Self {
            column: Some(column),
            row: Some(row),
            width: Some(width),
            height: Some(height),
            ignore_padding: false,
        }
    }

    /// No geometry at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ignore_padding(mut self) -> Self {
        self.ignore_padding = true;
        self
    }

    fn cells(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.column?, self.row?, self.width?, self.height?))
    }
}
