mod app;
mod config;
mod game;
mod media;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, Popup};
use config::AppConfig;
use game::{Session, Timing, CASE_COUNT};
use media::player::MediaPresenter;
use media::Presentation;
use theme::Theme;

#[derive(Parser, Debug)]
#[command(name = "casepick")]
#[command(version = "0.1.0")]
#[command(about = "Pick one of four cases and find out if you won")]
struct Args {
    /// Play one game without the TUI and print the result as JSON
    #[arg(short, long, value_name = "CASE")]
    pick: Option<usize>,

    /// Presentation style (overrides the config file)
    #[arg(short, long, value_enum)]
    style: Option<Presentation>,

    /// Skip all delays
    #[arg(long)]
    instant: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix with JSON on stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();
    let style = args.style.unwrap_or(config.style);
    let timing = if args.instant {
        Timing::instant()
    } else {
        config.timing(style)
    };

    if let Some(case) = args.pick {
        return run_headless(case, &config, style, timing).await;
    }

    run_tui(config, style, timing).await
}

/// Play a single session, sleeping through each timer, then print the report
async fn run_headless(case: usize, config: &AppConfig, style: Presentation, timing: Timing) -> Result<()> {
    let mut rng = StdRng::from_entropy();
    let mut session = Session::new(&mut rng);
    let mut presenter = MediaPresenter::new(config, style);

    let index = game::case_index(case);
    let mut next = session.dispatch(game::Event::Pick(index), &timing, &mut presenter, &mut rng);
    if next.is_none() {
        tracing::warn!("Case {} does not exist (1-{})", case, CASE_COUNT);
    }

    while let Some(timer) = next {
        tokio::time::sleep(timer.after).await;
        next = session.dispatch(timer.event, &timing, &mut presenter, &mut rng);
    }

    println!("{}", serde_json::to_string(&session.report())?);
    Ok(())
}

async fn run_tui(config: AppConfig, style: Presentation, timing: Timing) -> Result<()> {
    ui::init_theme(Theme::load(config.theme_file.as_deref()));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let presenter = MediaPresenter::new(&config, style);
    let mut app = App::new(config, style, presenter);
    app.timing = timing;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<MediaPresenter>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None => return Ok(()),
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Fire due reveal steps
        app.tick();
    }
}
