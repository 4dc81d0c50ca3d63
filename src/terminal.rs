// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end for the scanner screen
//!
//! Drives an [`AppModel`] from crossterm key events and redraws it with
//! ratatui on every tick.

use crate::app::{self, AppModel};
use crate::constants::timing;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use tracing::{error, info};

/// Run the scanner screen until the user quits
pub fn run(mut model: AppModel) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    model.on_appear();
    let result = run_app(&mut terminal, &mut model);
    model.on_disappear();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "Terminal loop failed");
    }
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: &mut AppModel,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        model.poll_events();
        terminal.draw(|f| app::draw(f, model))?;

        if model.should_quit() {
            info!("Quit requested");
            return Ok(());
        }

        // Input poll doubles as the frame tick
        if event::poll(timing::UI_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && let Some(message) = app::key_to_message(key, model.alert().is_some())
        {
            // Session tasks run on the runtime; the loop never waits for them
            let _ = model.update(message);
        }
    }
}
