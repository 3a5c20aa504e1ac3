//! Backtest dashboard: loads a backtest report, renders every known section
//! and presents an interactive terminal dashboard.
//!
//! Usage: cargo run --bin dashboard -- [--dump] [--export <file>] <report>
//!   e.g. cargo run --bin dashboard -- runs/2024-06-01
//!
//! The report can point to:
//!   - A report JSON file
//!   - A run directory containing report.json
//!
//! Keys:
//!   [Tab/1-6] Switch tab  [j/k] Scroll  [t m + - s] Explorer controls  [q/Esc] Quit

use std::fs::OpenOptions;
use std::io::stdout;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event as CEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tracing::error;
use tracing_subscriber::EnvFilter;

use backtest_dashboard::config::DashboardConfig;
use backtest_dashboard::dump::render_dump;
use backtest_dashboard::export::{write_export, Export};
use backtest_dashboard::report::loader::load_report;
use backtest_dashboard::ui::{self, render, App};

struct Args {
    dump: bool,
    export: Option<String>,
    report: Option<String>,
}

fn parse_args() -> Args {
    let mut args = Args { dump: false, export: None, report: None };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dump" => args.dump = true,
            "--export" => args.export = iter.next(),
            flag if flag.starts_with("--") => eprintln!("Ignoring unknown flag {}", flag),
            _ if args.report.is_none() => args.report = Some(arg),
            _ => {}
        }
    }
    args
}

/// Logs go to stderr, or to `log_file` while the TUI owns the screen.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = DashboardConfig::from_env();
    let args = parse_args();

    let report_path = match &args.report {
        Some(p) => p.clone(),
        None => {
            eprintln!("Usage: dashboard [--dump] [--export <file>] <report>");
            eprintln!("  e.g. cargo run --bin dashboard -- runs/2024-06-01");
            eprintln!("  --dump           Print every section to stdout instead of the TUI");
            eprintln!("  --export <file>  Write every mount and figure as JSON");
            std::process::exit(1);
        }
    };

    let interactive = !args.dump && args.export.is_none();
    init_logging(interactive.then_some(config.log_file.as_path()))?;

    eprintln!("Loading report from {}...", report_path);
    let doc = load_report(&report_path).with_context(|| format!("loading report from {}", report_path))?;
    eprintln!("Loaded {} section(s)", doc.len());

    let app = App::new(doc, report_path.clone(), &config.explorer_defaults());
    eprintln!(
        "Rendered {}/{} sections | {} failed",
        app.dispatch.rendered(),
        app.dispatch.sections.len(),
        app.dispatch.failed().count(),
    );
    for (key, msg) in app.dispatch.failed() {
        eprintln!("  ! {}: {}", key, msg);
    }

    if let Some(out) = &args.export {
        let export = Export { source: &report_path, sections: &app.dispatch, mounts: &app.mounts };
        write_export(out, &export).with_context(|| format!("exporting to {}", out))?;
        eprintln!("Exported to {}", out);
    }
    if args.dump {
        print!("{}", render_dump(&report_path, &app.mounts, &app.dispatch));
    }
    if !interactive {
        return Ok(());
    }

    eprintln!("Starting TUI... (logs in {})", config.log_file.display());
    run_tui(app, config.tick_rate())
}

fn run_tui(mut app: App, tick_rate: Duration) -> Result<()> {
    // a panic mid-frame must not leave the terminal in raw mode
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen);
        error!(%info, "panic in terminal UI");
        default_hook(info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|frame| render::draw(&app, frame))?;

        let timeout = tick_rate.checked_sub(last_tick.elapsed()).unwrap_or(Duration::ZERO);

        if event::poll(timeout)? {
            if let CEvent::Key(key) = event::read()? {
                if ui::handle_key(&mut app, key) {
                    break;
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
