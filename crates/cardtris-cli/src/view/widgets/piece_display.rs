use cardtris_engine::{Block, PieceKind, PieceRotation};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

/// A single piece in its spawn orientation, used for the hold and next panels.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Occupied offsets of the spawn orientation, shifted to start at `(0, 0)`,
/// and the size of their bounding box.
fn normalized_cells(kind: PieceKind) -> (Vec<(usize, usize)>, (u16, u16)) {
    let offsets: Vec<(i32, i32)> = kind.cell_offsets(PieceRotation::default()).collect();
    let min_x = offsets.iter().map(|(x, _)| *x).min().unwrap_or(0);
    let min_y = offsets.iter().map(|(_, y)| *y).min().unwrap_or(0);
    let cells: Vec<(usize, usize)> = offsets
        .iter()
        .filter_map(|(x, y)| Some((usize::try_from(x - min_x).ok()?, usize::try_from(y - min_y).ok()?)))
        .collect();
    let width = cells.iter().map(|(x, _)| x + 1).max().unwrap_or(0);
    let height = cells.iter().map(|(_, y)| y + 1).max().unwrap_or(0);
    (cells, (super::cells(width, 1), super::cells(height, 1)))
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(piece) = self.piece else {
            BlockDisplay::from_block(Block::Empty, false).render(area, buf);
            return;
        };

        let (cells, (width, height)) = normalized_cells(piece);
        let piece_area = area.centered(
            Constraint::Length(width * BlockDisplay::width()),
            Constraint::Length(height * BlockDisplay::height()),
        );

        let col_constraints = (0..width).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..height).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let empty_block = BlockDisplay::from_block(Block::Empty, false);
        let occupied_block = BlockDisplay::from_block(Block::Piece(piece), false);
        for (y, grid_row) in piece_area.layout_vec(&vertical).into_iter().enumerate() {
            for (x, grid_cell) in grid_row.layout_vec(&horizontal).into_iter().enumerate() {
                if cells.contains(&(x, y)) {
                    Widget::render(&occupied_block, grid_cell, buf);
                } else {
                    Widget::render(&empty_block, grid_cell, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_orientation_fits_panel() {
        for kind in PieceKind::ALL {
            let (cells, (width, height)) = normalized_cells(kind);
            assert_eq!(cells.len(), 4);
            assert!(width <= 4 && height <= 2, "{kind:?} is {width}x{height}");
        }
        assert_eq!(normalized_cells(PieceKind::I).1, (4, 1));
        assert_eq!(normalized_cells(PieceKind::O).1, (2, 2));
    }
}
