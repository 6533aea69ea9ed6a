use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use rankwatch_core::session::Session;
use rankwatch_lookup::RankLookup;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

pub mod app;
pub mod check_monitor;
pub mod form;
mod ui;

pub use app::App;

/// Run the interactive UI (blocking function, should be run in a separate thread).
/// Checks are spawned on the runtime behind `handle`.
pub fn run(session: Session, lookup: Arc<dyn RankLookup>, handle: Handle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, lookup, handle);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        // Fold in progress from running checks before every frame
        app.process_messages();

        terminal.draw(|f| ui::draw(f, app))?;

        if app.should_quit() {
            break;
        }

        // Poll so that check progress keeps redrawing while no key is pressed
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }

    Ok(())
}
