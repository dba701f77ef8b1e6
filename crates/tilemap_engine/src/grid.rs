use crate::{Cell, Position, Size, limits};

/// Dense row-major grid of cells.
///
/// Dimensions are bounded to [0, `limits::MAX_MAP_WIDTH`/`HEIGHT`];
/// allocation clamps rather than fails since grid construction has no
/// error conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: Size,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.clamp(0, limits::MAX_MAP_WIDTH);
        let height = height.clamp(0, limits::MAX_MAP_HEIGHT);
        Grid {
            size: Size::new(width, height),
            cells: vec![Cell::default(); (width * height) as usize],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> i32 {
        self.size.width
    }

    pub fn height(&self) -> i32 {
        self.size.height
    }

    pub fn is_inside(&self, pos: Position) -> bool {
        (0..self.size.width).contains(&pos.x) && (0..self.size.height).contains(&pos.y)
    }

    /// Cell at `pos`, or the default cell for out-of-range positions.
    pub fn cell(&self, pos: impl Into<Position>) -> Cell {
        let pos = pos.into();
        if self.is_inside(pos) {
            self.cells[(pos.y * self.size.width + pos.x) as usize].clone()
        } else {
            Cell::default()
        }
    }

    pub fn cell_mut(&mut self, pos: impl Into<Position>) -> Option<&mut Cell> {
        let pos = pos.into();
        if self.is_inside(pos) {
            Some(&mut self.cells[(pos.y * self.size.width + pos.x) as usize])
        } else {
            None
        }
    }

    /// Writes `cell` at `pos`. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, pos: impl Into<Position>, cell: Cell) {
        let pos = pos.into();
        if self.is_inside(pos) {
            self.cells[(pos.y * self.size.width + pos.x) as usize] = cell;
        }
    }

    /// Resizes the grid, copying the overlapping top-left region and
    /// filling new cells with defaults. Unchanged dimensions return the
    /// grid as-is.
    pub fn resize(&mut self, width: i32, height: i32) {
        if width == self.size.width && height == self.size.height {
            return;
        }
        let mut new_grid = Grid::new(width, height);
        let copy_w = self.size.width.min(new_grid.size.width);
        let copy_h = self.size.height.min(new_grid.size.height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                let cell = self.cells[(y * self.size.width + x) as usize].clone();
                new_grid.cells[(y * new_grid.size.width + x) as usize] = cell;
            }
        }
        *self = new_grid;
    }

    /// Iterates positions of all non-default cells in row-major order.
    pub fn non_default_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.size.height)
            .flat_map(move |y| (0..self.size.width).map(move |x| Position::new(x, y)))
            .filter(move |pos| !self.cells[(pos.y * self.size.width + pos.x) as usize].is_default())
    }
}
