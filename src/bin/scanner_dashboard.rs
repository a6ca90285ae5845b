//! Scanner Dashboard - Terminal UI for live scanner tables
//!
//! Logs go to the configured log file; stdout belongs to the alternate screen.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dex_scanner::bin_common::{load_config, ConfigType};
use ratatui::{backend::CrosstermBackend, Terminal};
use scanner::application::dashboard::{ui, App};
use scanner::infrastructure::{init_file_tracing, ShutdownManager};

/// Input poll timeout; also the redraw cadence for price flashes
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = load_config(ConfigType::Scanner)?;
    init_file_tracing(&config.log_level, &config.log_file)
        .with_context(|| format!("Failed to open log file {}", config.log_file))?;
    config.log();

    let runtime = tokio::runtime::Runtime::new()?;
    let shutdown = ShutdownManager::new();
    let mut app = App::initialize(runtime.handle().clone(), &config, shutdown)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown();

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.set_viewport_height(ui::table_body_height(size.height));
        app.tick();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            app.should_quit = true
                        }
                        KeyCode::Tab => app.next_table(),
                        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
                        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
                        KeyCode::PageDown => app.page_down(),
                        KeyCode::PageUp => app.page_up(),
                        KeyCode::Char('g') | KeyCode::Home => app.home(),
                        KeyCode::Char('G') | KeyCode::End => app.end(),
                        KeyCode::Char('s') => app.toggle_sort(),
                        KeyCode::Char('r') => app.reload(),
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
