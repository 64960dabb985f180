use std::iter;

use cardtris_engine::{Block, Board, Piece};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use super::BlockDisplay;

#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    phantom: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            ghost: None,
            falling_piece: None,
            phantom: false,
            block: None,
        }
    }

    pub fn ghost(self, piece: Piece) -> Self {
        Self {
            ghost: Some(piece),
            ..self
        }
    }

    pub fn falling_piece(self, piece: Piece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn phantom(self, phantom: bool) -> Self {
        Self { phantom, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        super::cells(self.board.width(), BlockDisplay::width())
            + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        super::cells(self.board.height(), BlockDisplay::height())
            + super::block_vertical_margin(self.block.as_ref())
    }

    /// Locked blocks with the ghost and the falling piece drawn on top.
    fn compose(&self) -> Vec<Vec<BlockDisplay>> {
        let mut grid: Vec<Vec<BlockDisplay>> = self
            .board
            .rows()
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .map(|block| BlockDisplay::from_block(*block, true))
                    .collect()
            })
            .collect();

        let mut overlay = |piece: Piece, display: BlockDisplay| {
            for (x, y) in piece.occupied_cells() {
                if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y))
                    && let Some(cell) = grid.get_mut(y).and_then(|row| row.get_mut(x))
                {
                    *cell = display;
                }
            }
        };
        if let Some(ghost) = self.ghost {
            overlay(ghost, BlockDisplay::ghost());
        }
        if let Some(piece) = self.falling_piece {
            let display = if self.phantom {
                BlockDisplay::phantom(piece.kind())
            } else {
                BlockDisplay::from_block(Block::Piece(piece.kind()), true)
            };
            overlay(piece, display);
        }
        grid
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.board.width()).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..self.board.height()).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.compose()) {
            for (grid_cell, block_display) in iter::zip(grid_row, row) {
                block_display.render(grid_cell, buf);
            }
        }
    }
}
