mod app;
mod cli;
mod config;
mod error;
mod event;
mod http;
mod logging;
mod scheduler;
mod state;
mod terminal;
mod ui;

use std::time::Duration;

use clap::Parser;
use ratatui::{Terminal, backend::Backend};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::app::App;
use crate::cli::Cli;
use crate::config::Config;
use crate::error::AppError;
use crate::event::Event;
use crate::http::fetcher::{Fetcher, FragmentSource};

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = config::load_file(cli.config.as_deref())?
        .layer(cli.overrides())
        .resolve()?;

    if let Err(err) = logging::init(&config.log_file) {
        eprintln!("warning: logging disabled ({}): {err}", config.log_file.display());
    }
    info!(
        url = %config.url,
        interval = %humantime::format_duration(config.interval),
        timeout = %humantime::format_duration(config.timeout),
        once = cli.once,
        "starting fortune"
    );

    let fetcher = Fetcher::new(&config)?;

    if cli.once {
        let fragment = fetcher.fetch().await?;
        println!("{}", fragment.text);
        return Ok(());
    }

    run_tui(config, fetcher).await
}

async fn run_tui(config: Config, fetcher: Fetcher) -> Result<(), AppError> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let (refresh_tx, refresh_rx) = mpsc::unbounded_channel::<()>();
    let mut app = App::new(refresh_tx);

    // Fetch before the first paint so the screen does not start blank.
    app.handle_fetched(fetcher.fetch().await);

    terminal::install_panic_hook();
    let mut terminal = match terminal::init() {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = terminal::restore();
            return Err(err.into());
        }
    };

    spawn_input_reader(tx.clone());

    let cancel = CancellationToken::new();
    let scheduler = tokio::spawn(scheduler::run(
        fetcher,
        config.interval,
        tx,
        refresh_rx,
        cancel.clone(),
    ));

    let result = run_loop(&mut terminal, &mut app, &mut rx).await;

    cancel.cancel();
    if let Err(err) = scheduler.await {
        warn!(error = %err, "scheduler task failed");
    }
    terminal::restore()?;
    info!("exiting");
    result
}

/// Background thread: read crossterm events and feed them into the channel.
/// Emits `Event::Tick` whenever no input arrives within `TICK_RATE`.
fn spawn_input_reader(tx: mpsc::UnboundedSender<Event>) {
    std::thread::spawn(move || loop {
        let event = match crossterm::event::poll(TICK_RATE) {
            Ok(true) => match crossterm::event::read() {
                Ok(crossterm::event::Event::Key(key)) => Event::Key(key),
                Ok(crossterm::event::Event::Mouse(mouse)) => Event::Mouse(mouse),
                Ok(crossterm::event::Event::Resize(w, h)) => Event::Resize(w, h),
                Ok(_) => continue,
                Err(err) => {
                    warn!(error = %err, "failed to read terminal event");
                    continue;
                }
            },
            Ok(false) => Event::Tick,
            Err(err) => {
                warn!(error = %err, "failed to poll terminal events");
                std::thread::sleep(TICK_RATE);
                Event::Tick
            }
        };
        if tx.send(event).is_err() {
            break;
        }
    });
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<(), AppError> {
    loop {
        if app.state.dirty {
            terminal.draw(|frame| ui::layout::render(frame, &app.state))?;
            app.state.dirty = false;
        }

        match rx.recv().await {
            Some(event) => app.handle_event(event),
            None => break,
        }

        if app.state.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;

    use crate::state::fragment::Fragment;
    use crate::ui::layout::test_support::row_text;

    fn setup() -> (
        Terminal<TestBackend>,
        App,
        mpsc::UnboundedSender<Event>,
        mpsc::UnboundedReceiver<Event>,
    ) {
        let terminal = Terminal::new(TestBackend::new(100, 8)).unwrap();
        let (refresh_tx, _refresh_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::unbounded_channel();
        (terminal, App::new(refresh_tx), tx, rx)
    }

    fn quit_key() -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn test_fetched_fragment_is_drawn_before_quit() {
        let (mut terminal, mut app, tx, mut rx) = setup();
        tx.send(Event::Fetched(Ok(Fragment::new("Chuck Norris can divide by zero."))))
            .unwrap();
        tx.send(quit_key()).unwrap();

        run_loop(&mut terminal, &mut app, &mut rx).await.unwrap();

        assert!(app.state.should_quit);
        assert_eq!(
            row_text(terminal.backend().buffer(), 3).trim(),
            "Chuck Norris can divide by zero."
        );
    }

    #[tokio::test]
    async fn test_first_paint_shows_initial_fetch() {
        let (mut terminal, mut app, tx, mut rx) = setup();
        app.handle_fetched(Ok(Fragment::new("first paint")));
        tx.send(quit_key()).unwrap();

        run_loop(&mut terminal, &mut app, &mut rx).await.unwrap();

        assert_eq!(row_text(terminal.backend().buffer(), 3).trim(), "first paint");
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_display_unchanged() {
        let (mut terminal, mut app, tx, mut rx) = setup();
        app.handle_fetched(Ok(Fragment::new("last good")));
        tx.send(Event::Fetched(Err(crate::error::FetchError::Status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ))))
        .unwrap();
        tx.send(quit_key()).unwrap();

        run_loop(&mut terminal, &mut app, &mut rx).await.unwrap();

        let buf = terminal.backend().buffer();
        assert_eq!(row_text(buf, 3).trim(), "last good");
        assert!(row_text(buf, 7).contains("unexpected HTTP status 500"));
    }

    #[tokio::test]
    async fn test_loop_ends_when_all_senders_drop() {
        let (mut terminal, mut app, tx, mut rx) = setup();
        drop(tx);
        run_loop(&mut terminal, &mut app, &mut rx).await.unwrap();
        assert!(!app.state.should_quit);
    }
}
