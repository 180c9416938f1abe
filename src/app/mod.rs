mod renderer;

use std::io::{Stdout, Write};

use crossterm::{
    cursor,
    event::{self, KeyCode},
    queue,
    terminal::{self, ClearType},
};

pub use renderer::{CellView, Renderer};

use crate::{
    config::Config,
    error::Error,
    generator::{MazeBuilder, StepResult, prepare_grid},
};

/// How an animated run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The maze finished growing.
    Completed,
    /// The user pressed Esc before the maze was done.
    Cancelled,
    /// The terminal is too small for the grid.
    TooSmall,
}

/// Terminal front-end that animates one builder step per frame.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Set a panic hook to restore terminal state on panic
    /// This ensures that the terminal is not left in raw mode or alternate screen on panic
    fn set_panic_hook() {
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let _ = App::restore_terminal(&mut std::io::stdout()); // ignore any errors as we are already failing
            hook(panic_info);
        }));
    }

    /// Setup terminal in raw mode and enter alternate screen
    /// Also sets a panic hook to restore terminal on panic
    pub fn setup_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        terminal::enable_raw_mode()?;
        App::set_panic_hook();
        queue!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        stdout.flush()?;
        Ok(())
    }

    /// Restore terminal to original state
    /// Leave alternate screen and disable raw mode
    pub fn restore_terminal(stdout: &mut Stdout) -> std::io::Result<()> {
        queue!(stdout, terminal::LeaveAlternateScreen, cursor::Show)?;
        stdout.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Grows a maze on screen, one admission per frame, then shows the result
    /// until Esc is pressed. Esc during growth stops between two steps.
    pub fn run(&self) -> Result<RunOutcome, Error> {
        let config = &self.config;
        let mut renderer = Renderer::new(config.depth);
        renderer.clear()?;

        if !Renderer::fits_terminal(config.width, config.depth)? {
            tracing::warn!(
                width = config.width,
                depth = config.depth,
                "terminal too small for the maze"
            );
            renderer.draw_hint(&format!(
                "Terminal is too small for a {}x{} maze. Press Esc to exit...",
                config.width, config.depth
            ))?;
            App::wait_for_esc()?;
            return Ok(RunOutcome::TooSmall);
        }

        let mut grid = prepare_grid(config)?;
        let mut builder = MazeBuilder::new(&mut grid)?;
        builder.seed_at(config.start)?;
        renderer.draw_growing(&builder)?;
        renderer.draw_hint("Press Esc to stop")?;

        tracing::info!("Started animation loop");
        loop {
            // Waiting for input doubles as the frame delay
            if App::esc_pressed(config.step_delay)? {
                tracing::info!(admitted = builder.set().len(), "Generation was cancelled by user.");
                return Ok(RunOutcome::Cancelled);
            }
            match builder.step()? {
                StepResult::Admitted(_) => renderer.draw_growing(&builder)?,
                StepResult::Done => break,
            }
        }

        let result = builder.result()?;
        renderer.draw_finished(builder.grid(), &result)?;
        renderer.draw_hint("Press Esc to exit...")?;
        App::wait_for_esc()?;
        Ok(RunOutcome::Completed)
    }

    /// Waits up to `timeout` for a key press and reports whether it was Esc
    fn esc_pressed(timeout: std::time::Duration) -> std::io::Result<bool> {
        if !event::poll(timeout)? {
            return Ok(false);
        }
        Ok(matches!(
            event::read()?,
            event::Event::Key(event::KeyEvent {
                code: KeyCode::Esc,
                kind: event::KeyEventKind::Press,
                ..
            })
        ))
    }

    /// Wait for the user to press the Esc key
    /// This function blocks until Esc is pressed
    fn wait_for_esc() -> std::io::Result<()> {
        loop {
            if let event::Event::Key(event::KeyEvent { code, kind, .. }) = event::read()? {
                if code == KeyCode::Esc && kind == event::KeyEventKind::Press {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Profiling mode: generate mazes without touching the terminal and log
    /// how long each run takes
    pub fn profile(&self, iterations: usize) -> Result<(), Error> {
        for iteration in 0..iterations {
            let started = std::time::Instant::now();
            let (_, result) = crate::generator::generate(&self.config)?;
            tracing::info!(
                iteration,
                admitted = result.path().len(),
                excluded = result.excluded().len(),
                elapsed = ?started.elapsed(),
                "profiled generation"
            );
        }
        Ok(())
    }
}
