use core::ops::{Index, IndexMut};

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Linear indices of a cell's neighbors; never more than eight.
pub type Neighbors = SmallVec<[CellIndex; 8]>;

/// Fixed-size board of cells. Adjacency is derived from coordinates on every
/// query, so it stays correct no matter when mines are placed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// All cells hidden, unflagged and mine-free.
    pub fn new((width, height): Coord2) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(GameError::InvalidDimensions);
        }

        let cells = Array2::from_shape_fn(
            [usize::from(height), usize::from(width)],
            |(y, x)| Cell::new(x as Coord, y as Coord),
        );
        Ok(Self { cells })
    }

    pub fn size(&self) -> Coord2 {
        let (rows, columns) = self.cells.dim();
        (columns as Coord, rows as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn total_cells(&self) -> CellCount {
        let (width, height) = self.size();
        mult(width, height)
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn index_of(&self, coords: Coord2) -> Result<CellIndex> {
        let (x, y) = self.validate_coords(coords)?;
        Ok(usize::from(x) + usize::from(y) * usize::from(self.width()))
    }

    pub fn coords_of(&self, index: CellIndex) -> Result<Coord2> {
        let width = usize::from(self.width());
        if index >= usize::from(self.total_cells()) {
            return Err(GameError::OutOfBounds);
        }
        Ok(((index % width) as Coord, (index / width) as Coord))
    }

    pub fn get(&self, coords: Coord2) -> Option<&Cell> {
        self.cells.get(coords.to_nd_index())
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::new(coords, self.size())
    }

    /// Linear indices of the in-bounds neighbors of `coords`.
    pub fn neighbors_of(&self, coords: Coord2) -> Result<Neighbors> {
        let coords = self.validate_coords(coords)?;
        let width = usize::from(self.width());
        Ok(self
            .iter_neighbors(coords)
            .map(|(x, y)| usize::from(x) + usize::from(y) * width)
            .collect())
    }

    pub fn nearby_mine_count(&self, coords: Coord2) -> Result<u8> {
        let coords = self.validate_coords(coords)?;
        Ok(self.count_neighbors(coords, |cell| cell.mine))
    }

    pub(crate) fn count_neighbors(&self, coords: Coord2, pred: impl Fn(&Cell) -> bool) -> u8 {
        self.iter_neighbors(coords)
            .filter(|&pos| pred(&self[pos]))
            .count() as u8
    }

    /// Cells in row-major order, matching [`CellIndex`].
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    pub fn mine_count(&self) -> CellCount {
        self.count_cells(|cell| cell.mine)
    }

    pub fn count_cells(&self, pred: impl Fn(&Cell) -> bool) -> CellCount {
        self.iter().filter(|cell| pred(cell)).count() as CellCount
    }

    /// Linear indices of every mined cell, ascending.
    pub fn mine_indices(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.iter()
            .enumerate()
            .filter(|(_, cell)| cell.mine)
            .map(|(index, _)| index)
    }

    pub(crate) fn at_index(&self, index: CellIndex) -> &Cell {
        let width = usize::from(self.width());
        &self.cells[[index / width, index % width]]
    }

    pub(crate) fn at_index_mut(&mut self, index: CellIndex) -> &mut Cell {
        let width = usize::from(self.width());
        &mut self.cells[[index / width, index % width]]
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl IndexMut<Coord2> for Grid {
    fn index_mut(&mut self, coords: Coord2) -> &mut Self::Output {
        &mut self.cells[coords.to_nd_index()]
    }
}
