mod api;
mod app;
mod board;
mod cli;
mod config;
mod coordinator;
mod event;
mod logging;
mod model;
mod store;
mod ui;
mod validation;

use std::io;
use std::panic;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info};

use api::rest::RestApi;
use app::{Action, App};
use coordinator::Coordinator;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if matches!(args.first().map(String::as_str), Some("-h" | "--help" | "help")) {
        cli::print_help();
        return Ok(());
    }

    let config = config::load_config()?;
    let _log_guard = logging::init(config.log_level.as_deref())?;

    let api = RestApi::new(
        config.api.base_url(),
        config.api.token.clone(),
        config.api.timeout(),
    )?;
    let mut coordinator = Coordinator::new(Arc::new(api));
    let default_project = config.project_id.as_deref();

    match args.first().map(String::as_str) {
        Some("add") => return cli::handle_add(&mut coordinator, default_project, &args[1..]).await,
        Some("edit") => return cli::handle_edit(&mut coordinator, &args[1..]).await,
        Some("list") => return cli::handle_list(&mut coordinator, default_project, &args[1..]).await,
        Some("move") => return cli::handle_move(&mut coordinator, &args[1..]).await,
        Some("delete") => return cli::handle_delete(&mut coordinator, &args[1..]).await,
        _ => {}
    }

    let project_id = args.first().cloned().or_else(|| config.project_id.clone());
    info!(project = ?project_id, base_url = config.api.base_url(), "starting board");

    // Set up action channel
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let mut app = App::new(coordinator, project_id, action_tx.clone());

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    // Restore the terminal before the panic message is printed
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        error!("panic: {panic_info}");
        original_hook(panic_info);
    }));

    // Spawn event reader
    let event_tx = action_tx.clone();
    tokio::spawn(async move {
        event::run_event_loop(event_tx).await;
    });

    // Initial fetch
    app.refresh().await;

    // Main loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        match action_rx.recv().await {
            Some(action) => {
                app.update(action).await;
                if app.should_quit {
                    break;
                }
            }
            None => break,
        }
    }

    // Restore terminal
    terminal.show_cursor()?;
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
