//! Block-move matching between consecutive snapshots
//!
//! When several blocks of the same kind move in one update the snapshots do
//! not say which went where. The policy here is: scan the previous board in
//! row-major order and take the first vacated cell of the same kind that no
//! earlier destination has claimed. Distance and momentum are ignored.

use std::collections::HashSet;

use crate::board::{BoardSnapshot, GridCoord, TileKind};

/// Cells that hold a block of some kind in `curr` but did not hold that kind in `prev`.
///
/// Returned in row-major order of `curr`.
pub fn gained_blocks(prev: &BoardSnapshot, curr: &BoardSnapshot) -> Vec<(GridCoord, TileKind)> {
    curr.iter_cells()
        .filter_map(|(coord, cell)| {
            let kind = cell.block_kind()?;
            let before = prev.cell(coord).and_then(|c| c.block_kind());
            (before != Some(kind)).then_some((coord, kind))
        })
        .collect()
}

/// First cell (row-major in `prev`) that lost a block of `kind`, skipping `claimed` sources.
pub fn find_vacated_source(
    prev: &BoardSnapshot,
    curr: &BoardSnapshot,
    kind: TileKind,
    claimed: &HashSet<GridCoord>,
) -> Option<GridCoord> {
    prev.iter_cells()
        .filter(|(coord, _)| !claimed.contains(coord))
        .find(|(coord, cell)| {
            cell.block_kind() == Some(kind)
                && curr.cell(*coord).and_then(|c| c.block_kind()) != Some(kind)
        })
        .map(|(coord, _)| coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;

    fn row(cells: Vec<Cell>) -> BoardSnapshot {
        BoardSnapshot {
            cells: vec![cells],
            ..Default::default()
        }
    }

    fn floor() -> Cell {
        Cell::new(TileKind::Default)
    }

    #[test]
    fn test_single_block_move() {
        let prev = row(vec![floor().with_block(TileKind::Block), floor(), floor()]);
        let curr = row(vec![floor(), floor().with_block(TileKind::Block), floor()]);

        let gained = gained_blocks(&prev, &curr);
        assert_eq!(gained, vec![(GridCoord::new(1, 0), TileKind::Block)]);

        let source = find_vacated_source(&prev, &curr, TileKind::Block, &HashSet::new());
        assert_eq!(source, Some(GridCoord::new(0, 0)));
    }

    #[test]
    fn test_kind_must_match() {
        let prev = row(vec![floor().with_block(TileKind::BlockUp), floor()]);
        let curr = row(vec![floor(), floor().with_block(TileKind::Block)]);
        assert_eq!(
            find_vacated_source(&prev, &curr, TileKind::Block, &HashSet::new()),
            None
        );
    }

    #[test]
    fn test_first_board_order_match_wins() {
        // Two identical blocks at 0 and 2 both vacate; destinations 1 and 3.
        let prev = row(vec![
            floor().with_block(TileKind::Block),
            floor(),
            floor().with_block(TileKind::Block),
            floor(),
        ]);
        let curr = row(vec![
            floor(),
            floor().with_block(TileKind::Block),
            floor(),
            floor().with_block(TileKind::Block),
        ]);

        let mut claimed = HashSet::new();
        let first = find_vacated_source(&prev, &curr, TileKind::Block, &claimed).unwrap();
        assert_eq!(first, GridCoord::new(0, 0));
        claimed.insert(first);
        let second = find_vacated_source(&prev, &curr, TileKind::Block, &claimed).unwrap();
        assert_eq!(second, GridCoord::new(2, 0));
        claimed.insert(second);
        assert_eq!(
            find_vacated_source(&prev, &curr, TileKind::Block, &claimed),
            None
        );
    }

    #[test]
    fn test_unchanged_block_is_not_gained() {
        let prev = row(vec![floor().with_block(TileKind::Block)]);
        let curr = prev.clone();
        assert!(gained_blocks(&prev, &curr).is_empty());
    }
}
