use std::collections::VecDeque;

use crate::{Cell, Grid, Position, limits};

/// One history entry: either a deep copy of the whole grid or the
/// pre-mutation values of the affected cells.
#[derive(Clone, Debug)]
pub enum Snapshot {
    Full(Grid),
    Cells(Vec<(Position, Cell)>),
}

impl Snapshot {
    /// Captures the current grid state that this snapshot would replace,
    /// so that applying one direction can push the inverse on the other
    /// stack.
    fn capture_inverse(&self, grid: &Grid) -> Snapshot {
        match self {
            Snapshot::Full(_) => Snapshot::Full(grid.clone()),
            Snapshot::Cells(cells) => Snapshot::Cells(cells.iter().map(|(pos, _)| (*pos, grid.cell(*pos))).collect()),
        }
    }

    fn apply(self, grid: &mut Grid) {
        match self {
            Snapshot::Full(saved) => *grid = saved,
            Snapshot::Cells(cells) => {
                for (pos, cell) in cells {
                    grid.set_cell(pos, cell);
                }
            }
        }
    }
}

/// Bounded per-map undo/redo history over grid mutations.
///
/// The undo stack holds at most [`limits::UNDO_LIMIT`] entries; recording
/// past the bound evicts the oldest entry first. Recording always clears
/// the redo stack. Undo immediately followed by redo restores the exact
/// pre-undo grid for both snapshot kinds, provided operations are applied
/// in strict LIFO order.
#[derive(Default, Clone, Debug)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    /// Records a full deep copy of the grid before a sweeping mutation
    /// (resize, paste, flood fill).
    pub fn record_full(&mut self, grid: &Grid) {
        self.record(Snapshot::Full(grid.clone()));
    }

    /// Records the pre-mutation values of `affected` positions.
    pub fn record_cells(&mut self, grid: &Grid, affected: &[Position]) {
        self.record(Snapshot::Cells(affected.iter().map(|&pos| (pos, grid.cell(pos))).collect()));
    }

    fn record(&mut self, snapshot: Snapshot) {
        self.undo_stack.push_back(snapshot);
        if self.undo_stack.len() > limits::UNDO_LIMIT {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pops the newest snapshot back onto the grid. Returns `false` when
    /// the history is empty; callers treat that as "action unavailable",
    /// not as an error.
    pub fn undo(&mut self, grid: &mut Grid) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(snapshot.capture_inverse(grid));
        snapshot.apply(grid);
        true
    }

    /// Symmetric to [`History::undo`], popping the redo stack.
    pub fn redo(&mut self, grid: &mut Grid) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let inverse = snapshot.capture_inverse(grid);
        self.undo_stack.push_back(inverse);
        snapshot.apply(grid);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn put(history: &mut History, grid: &mut Grid, x: i32, y: i32, symbol: char) {
        history.record_cells(grid, &[Position::new(x, y)]);
        grid.set_cell((x, y), Cell::from_symbol(symbol));
    }

    #[test]
    fn test_undo_redo_inverse_law() {
        let mut grid = Grid::new(8, 8);
        let mut history = History::new();
        for i in 0..5 {
            put(&mut history, &mut grid, i, 0, char::from(b'a' + i as u8));
        }
        let after = grid.clone();

        for _ in 0..5 {
            assert!(history.undo(&mut grid));
        }
        assert!(!history.undo(&mut grid));
        assert_eq!(Grid::new(8, 8), grid);

        for _ in 0..5 {
            assert!(history.redo(&mut grid));
        }
        assert!(!history.redo(&mut grid));
        assert_eq!(after, grid);
    }

    #[test]
    fn test_overlapping_cell_snapshots() {
        let mut grid = Grid::new(4, 4);
        let mut history = History::new();
        // two mutations touching the same position
        put(&mut history, &mut grid, 1, 1, 'A');
        put(&mut history, &mut grid, 1, 1, 'B');
        let after = grid.clone();

        assert!(history.undo(&mut grid));
        assert_eq!('A', grid.cell((1, 1)).symbol);
        assert!(history.redo(&mut grid));
        assert_eq!(after, grid);
    }

    #[test]
    fn test_full_snapshot_restores_dimensions() {
        let mut grid = Grid::new(4, 4);
        grid.set_cell((3, 3), Cell::from_symbol('#'));
        let mut history = History::new();

        history.record_full(&grid);
        grid.resize(2, 2);
        let small = grid.clone();

        assert!(history.undo(&mut grid));
        assert_eq!(4, grid.width());
        assert_eq!('#', grid.cell((3, 3)).symbol);

        assert!(history.redo(&mut grid));
        assert_eq!(small, grid);
    }

    #[test]
    fn test_bounded_history_evicts_oldest() {
        let mut grid = Grid::new(2, 1);
        let mut history = History::new();
        // 31 recorded mutations on the same cell; the first entry is evicted
        for i in 0..=limits::UNDO_LIMIT {
            put(&mut history, &mut grid, 0, 0, char::from(b'0' + (i % 10) as u8));
        }

        let mut steps = 0;
        while history.undo(&mut grid) {
            steps += 1;
        }
        assert_eq!(limits::UNDO_LIMIT, steps);
        // the oldest snapshot ('0' written first) is gone; undo stops at it
        assert_eq!('0', grid.cell((0, 0)).symbol);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut grid = Grid::new(2, 1);
        let mut history = History::new();
        put(&mut history, &mut grid, 0, 0, 'x');
        assert!(history.undo(&mut grid));
        assert!(history.can_redo());

        put(&mut history, &mut grid, 1, 0, 'y');
        assert!(!history.can_redo());
    }
}
