use std::fmt;

use varisat::Var;

use crate::error::{Error, Result};

/// Represents a 2D coordinate on the minesweeper board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Point { x, y }
    }
}

/// What a player knows about a single cell.
///
/// The three states are exclusive: a cell is either still covered and unknown, covered and proven
/// to hold a mine, or uncovered with its clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    Hidden,
    Flagged,
    Revealed(u8), // The u8 is the number of adjacent mines.
}

/// One revealed number turned into a counting constraint over its undecided neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClueConstraint {
    /// The revealed cell the constraint comes from.
    pub clue_cell: Point,
    /// Indices of the covered, non-flagged neighbors.
    pub cells: Vec<usize>,
    /// How many of `cells` must be mines. `None` when more neighbors are flagged than the clue
    /// allows, which no assignment can satisfy.
    pub target: Option<usize>,
}

/// The player's view of the board, stored as a flat arena.
///
/// A cell at `(x, y)` lives at `index = y * width + x`. The same index doubles as the SAT variable
/// for "this cell is a mine" through [`Board::var`], so CNF literals and board positions convert
/// both ways without any lookup table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Cell>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Board {
            width,
            height,
            cells: vec![Cell::Hidden; width * height],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x < self.width && point.y < self.height
    }

    pub fn index(&self, point: Point) -> usize {
        point.y * self.width + point.x
    }

    pub fn point(&self, index: usize) -> Point {
        Point {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// The SAT variable standing for "the cell at `index` is a mine". Its DIMACS id is
    /// `index + 1`, so 0 never appears as a literal.
    pub fn var(index: usize) -> Var {
        Var::from_index(index)
    }

    pub fn cell(&self, point: Point) -> Cell {
        self.cells[self.index(point)]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.cells[index] == Cell::Hidden
    }

    pub fn is_flagged(&self, index: usize) -> bool {
        self.cells[index] == Cell::Flagged
    }

    pub fn has_revealed(&self) -> bool {
        self.cells.iter().any(|cell| matches!(cell, Cell::Revealed(_)))
    }

    /// Records the clue of a freshly uncovered cell.
    pub fn uncover(&mut self, point: Point, clue: u8) -> Result<()> {
        if !self.contains(point) {
            return Err(Error::OutOfBounds(point));
        }
        let index = self.index(point);
        match self.cells[index] {
            Cell::Hidden => {
                self.cells[index] = Cell::Revealed(clue);
                Ok(())
            }
            Cell::Flagged => Err(Error::Flagged(point)),
            Cell::Revealed(_) => Err(Error::AlreadyRevealed(point)),
        }
    }

    /// Permanently marks a covered cell as a mine. Flagging twice is a no-op.
    pub fn flag(&mut self, index: usize) -> Result<()> {
        match self.cells[index] {
            Cell::Hidden | Cell::Flagged => {
                self.cells[index] = Cell::Flagged;
                Ok(())
            }
            Cell::Revealed(_) => Err(Error::AlreadyRevealed(self.point(index))),
        }
    }

    /// All valid neighbor coordinates of `point`, clipped at edges and corners.
    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> + use<> {
        neighbors(self.width, self.height, point)
    }

    /// Covered, non-flagged neighbors of `point`, as indices.
    fn open_neighbors(&self, point: Point) -> Vec<usize> {
        self.neighbors(point)
            .map(|p| self.index(p))
            .filter(|&i| self.is_hidden(i))
            .collect()
    }

    fn flagged_neighbor_count(&self, point: Point) -> usize {
        self.neighbors(point)
            .filter(|&p| self.is_flagged(self.index(p)))
            .count()
    }

    /// Revealed cells that still have at least one covered, non-flagged neighbor.
    pub fn clue_cells(&self) -> Vec<Point> {
        (0..self.len())
            .map(|i| self.point(i))
            .filter(|&p| matches!(self.cell(p), Cell::Revealed(_)))
            .filter(|&p| !self.open_neighbors(p).is_empty())
            .collect()
    }

    /// One constraint per clue cell, with flagged neighbors already subtracted from the clue.
    pub fn constraints(&self) -> Vec<ClueConstraint> {
        self.clue_cells()
            .into_iter()
            .filter_map(|clue_cell| {
                let Cell::Revealed(clue) = self.cell(clue_cell) else {
                    return None;
                };
                Some(ClueConstraint {
                    clue_cell,
                    cells: self.open_neighbors(clue_cell),
                    target: (clue as usize).checked_sub(self.flagged_neighbor_count(clue_cell)),
                })
            })
            .collect()
    }

    /// Covered, non-flagged cells adjacent to some clue cell, ascending by index. These are the
    /// only cells the clue formula says anything about.
    pub fn relevant_cells(&self) -> Vec<usize> {
        let mut relevant: Vec<usize> = self
            .clue_cells()
            .into_iter()
            .flat_map(|p| self.open_neighbors(p))
            .collect();
        relevant.sort_unstable();
        relevant.dedup();
        relevant
    }

    /// Every covered cell not proven to be a mine.
    pub fn hidden_cells(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_hidden(i)).collect()
    }

    pub fn flagged_cells(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.is_flagged(i)).collect()
    }
}

/// Neighbors of `point` on a `width` x `height` grid: 3 in a corner, 5 on an edge, 8 inside.
pub fn neighbors(width: usize, height: usize, point: Point) -> impl Iterator<Item = Point> {
    (-1..=1).flat_map(move |dy| {
        (-1..=1).filter_map(move |dx| {
            // Skip the center point itself (dx=0, dy=0)
            if dx == 0 && dy == 0 {
                return None;
            }

            let nx = point.x as isize + dx;
            let ny = point.y as isize + dy;

            if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
                Some(Point {
                    x: nx as usize,
                    y: ny as usize,
                })
            } else {
                None
            }
        })
    })
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{:^3}", x)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.width))?;

        for y in 0..self.height {
            write!(f, "{:^2}|", y)?;
            for x in 0..self.width {
                match self.cell(Point { x, y }) {
                    Cell::Hidden => write!(f, " ■ ")?,
                    Cell::Flagged => write!(f, " F ")?,
                    Cell::Revealed(n) => write!(f, " {} ", n)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
