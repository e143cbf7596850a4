use crate::error::SceneError;

/// A small terraced hill in front of the default camera
pub const TERRACED_HILL: [[u32; 8]; 8] = [
    [1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 4, 4, 3, 2, 1],
    [1, 2, 3, 3, 3, 3, 2, 1],
    [1, 2, 2, 2, 2, 2, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1],
];

/// Stack heights of unit cubes on a fixed rectangular grid, stored row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeightMap {
    rows: usize,
    cols: usize,
    heights: Vec<u32>,
}

impl HeightMap {
    /// Build from nested rows. Every row must have the same length.
    pub fn from_rows<R>(rows: &[R]) -> Result<Self, SceneError>
    where
        R: AsRef<[u32]>,
    {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut heights = Vec::with_capacity(rows.len() * cols);

        for (row, cells) in rows.iter().enumerate() {
            let cells = cells.as_ref();
            if cells.len() != cols {
                return Err(SceneError::RaggedHeightMap { row, expected: cols, found: cells.len() });
            }
            heights.extend_from_slice(cells);
        }

        Ok(Self { rows: rows.len(), cols, heights })
    }

    pub fn rows(&self) -> usize { self.rows }

    pub fn cols(&self) -> usize { self.cols }

    /// Cells in row-major order as `(row, col, height)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        let cols = self.cols.max(1);
        self.heights
            .iter()
            .enumerate()
            .map(move |(idx, &h)| (idx / cols, idx % cols, h))
    }

    /// Total number of stacked cubes over all cells
    pub fn cube_count(&self) -> usize {
        self.heights.iter().map(|&h| h as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_are_row_major() {
        let map = HeightMap::from_rows(&[[1u32, 0], [0, 2]]).unwrap();
        let cells: Vec<_> = map.cells().collect();
        assert_eq!(cells, vec![(0, 0, 1), (0, 1, 0), (1, 0, 0), (1, 1, 2)]);
        assert_eq!(map.cube_count(), 3);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows: Vec<Vec<u32>> = vec![vec![1, 2, 3], vec![4]];
        let err = HeightMap::from_rows(&rows).unwrap_err();
        assert_eq!(err, SceneError::RaggedHeightMap { row: 1, expected: 3, found: 1 });
    }

    #[test]
    fn empty_map_has_no_cells() {
        let rows: Vec<Vec<u32>> = Vec::new();
        let map = HeightMap::from_rows(&rows).unwrap();
        assert_eq!(map.cells().count(), 0);
        assert_eq!((map.rows(), map.cols()), (0, 0));
    }

    #[test]
    fn terraced_hill_peaks_in_the_middle() {
        let map = HeightMap::from_rows(&TERRACED_HILL).unwrap();
        assert_eq!((map.rows(), map.cols()), (8, 8));
        let peaks: Vec<_> = map.cells().filter(|&(_, _, h)| h == 4).map(|(r, c, _)| (r, c)).collect();
        assert_eq!(peaks, vec![(3, 3), (3, 4), (4, 3), (4, 4)]);
        assert_eq!(map.cube_count(), 28 + 2 * 20 + 3 * 12 + 4 * 4);
    }
}
