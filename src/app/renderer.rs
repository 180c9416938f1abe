use std::{
    fmt,
    io::{Stdout, Write},
};

use crossterm::{
    cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};

use crate::{
    generator::{MazeBuilder, MazeResult},
    maze::{CellId, Grid},
};

/// How a single maze cell is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellView {
    /// Not yet touched by the maze, showing its weight
    Pending(u8),
    /// Waiting in the frontier, showing its weight
    Queued(u8),
    /// Part of the maze
    Open,
    /// The cell the maze grew from
    Start,
    /// The last cell admitted
    End,
    /// Discarded by the branching constraint or never reached
    Excluded,
}

impl CellView {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// View of `id` while the maze is still growing.
    pub fn growing(builder: &MazeBuilder<'_>, id: CellId) -> Self {
        let weight = builder.grid()[id].weight();
        if builder.set().first() == Some(&id) {
            CellView::Start
        } else if builder.is_admitted(id) {
            CellView::Open
        } else if builder.is_discarded(id) {
            CellView::Excluded
        } else if builder.frontier().contains(id) {
            CellView::Queued(weight)
        } else {
            CellView::Pending(weight)
        }
    }

    /// View of `id` once the maze is finished.
    pub fn finished(result: &MazeResult, id: CellId) -> Self {
        if id == result.start() {
            CellView::Start
        } else if id == result.end() {
            CellView::End
        } else if result.excluded().binary_search(&id).is_ok() {
            CellView::Excluded
        } else {
            CellView::Open
        }
    }
}

impl fmt::Display for CellView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match *self {
            CellView::Pending(weight) => format!("{weight} ").with(Color::DarkGrey),
            CellView::Queued(weight) => format!("{weight} ")
                .with(Color::Magenta)
                .attribute(Attribute::Bold),
            CellView::Open => "⬜".to_string().with(Color::White),
            CellView::Start => "🟩".to_string().with(Color::Green),
            CellView::End => "🟥".to_string().with(Color::Red),
            CellView::Excluded => "⬛".to_string().with(Color::DarkGrey),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                CellView::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}

pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Grid depth in cells; z grows upwards on screen
    depth: u16,
}

impl Renderer {
    pub fn new(depth: u16) -> Self {
        Self {
            stdout: std::io::stdout(),
            depth,
        }
    }

    /// Whether the terminal can show a `width x depth` grid plus two status lines.
    pub fn fits_terminal(width: u16, depth: u16) -> std::io::Result<bool> {
        let (term_width, term_height) = terminal::size()?;
        Ok(term_width >= width.saturating_mul(CellView::CELL_WIDTH)
            && term_height >= depth.saturating_add(2))
    }

    /// Terminal (column, row) of a grid position.
    fn screen_position(&self, position: (u16, u16)) -> (u16, u16) {
        (position.0 * CellView::CELL_WIDTH, self.depth - 1 - position.1)
    }

    fn draw_grid<F>(&mut self, grid: &Grid, view: F) -> std::io::Result<()>
    where
        F: Fn(CellId) -> CellView,
    {
        for id in grid.ids() {
            let (column, row) = self.screen_position(grid[id].position());
            queue!(
                self.stdout,
                cursor::MoveTo(column, row),
                style::Print(view(id))
            )?;
        }
        Ok(())
    }

    /// Redraws every cell of a maze that is still growing.
    pub fn draw_growing(&mut self, builder: &MazeBuilder<'_>) -> std::io::Result<()> {
        self.draw_grid(builder.grid(), |id| CellView::growing(builder, id))?;
        let status = format!(
            "admitted {} | queued {} | discarded {}",
            builder.set().len(),
            builder.frontier().len(),
            builder.discarded()
        );
        self.draw_status(&status, Color::Blue)?;
        self.stdout.flush()
    }

    /// Redraws the finished maze with its start, end and excluded cells marked.
    pub fn draw_finished(&mut self, grid: &Grid, result: &MazeResult) -> std::io::Result<()> {
        self.draw_grid(grid, |id| CellView::finished(result, id))?;
        let status = format!(
            "Done: {} cells in the maze, {} excluded, start {:?}, end {:?}",
            result.path().len(),
            result.excluded().len(),
            grid[result.start()].position(),
            grid[result.end()].position(),
        );
        self.draw_status(&status, Color::Green)?;
        self.stdout.flush()
    }

    /// Row of the hint line, just below the status line.
    fn hint_row(&self) -> u16 {
        self.depth.saturating_add(1)
    }

    fn draw_status(&mut self, message: &str, color: Color) -> std::io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveTo(0, self.depth),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(message.with(color).attribute(Attribute::Bold)),
        )
    }

    /// Prints a hint on the line below the status line.
    pub fn draw_hint(&mut self, message: &str) -> std::io::Result<()> {
        let hint_row = self.hint_row();
        queue!(
            self.stdout,
            cursor::MoveTo(0, hint_row),
            terminal::Clear(ClearType::CurrentLine),
            style::PrintStyledContent(message.with(Color::Blue).attribute(Attribute::Bold)),
        )?;
        self.stdout.flush()
    }

    pub fn clear(&mut self) -> std::io::Result<()> {
        queue!(
            self.stdout,
            terminal::Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        self.stdout.flush()
    }
}
