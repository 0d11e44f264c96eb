//! TambouI Headless Runner
//!
//! Runs a small demo application on the headless terminal for a number of
//! frames and prints the final screen. Useful for smoke testing the run loop
//! and for generating deterministic snapshots.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use tamboui::app::{Application, Config, Context, Flow, Runner};
use tamboui::core::{Color, Rect, Size, Style};
use tamboui::effects::{
    AnimValue, Animation, AnimationTarget, Easing, Overlay, PropertyStore, Repeat, TargetRef,
};
use tamboui::event::{Event, KeyEvent};
use tamboui::headless::{HeadlessTerminal, ScriptedSource};
use tamboui::layout::Constraint;
use tamboui::widget::{Alignment, Split, Text, Widget};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const BANNER_FADE: &str = "banner.fade";
const PROGRESS: &str = "progress";

/// Demo: a title fading in, an animated progress bar and a key log
struct Demo {
    props: PropertyStore,
    keys: Vec<String>,
}

impl Demo {
    fn new() -> Self {
        let mut props = PropertyStore::new();
        props.declare(BANNER_FADE, AnimValue::Scalar(1.0));
        props.declare(PROGRESS, AnimValue::Scalar(0.0));
        Self {
            props,
            keys: Vec::new(),
        }
    }

    fn scalar(&self, name: &'static str) -> f32 {
        self.props.scalar(&TargetRef::new(name)).unwrap_or_default()
    }
}

impl Application for Demo {
    fn view(&self) -> Box<dyn Widget + '_> {
        let progress = self.scalar(PROGRESS).clamp(0.0, 1.0);
        let bar_width = 20usize;
        let filled = (progress * bar_width as f32).round() as usize;
        let bar = format!(
            "[{}{}] {:>3}%",
            "#".repeat(filled),
            "-".repeat(bar_width - filled),
            (progress * 100.0).round() as u32
        );

        let log = if self.keys.is_empty() {
            "Press keys; q quits".to_string()
        } else {
            self.keys.join(" ")
        };

        let tree = Split::vertical(vec![
            (
                Constraint::Length(1),
                Box::new(
                    Text::new("TambouI")
                        .style(Style::new().bold().fg(Color::BRIGHT_CYAN))
                        .alignment(Alignment::Center),
                ) as Box<dyn Widget>,
            ),
            (Constraint::Length(1), Box::new(Text::new(bar)) as Box<dyn Widget>),
            (Constraint::Fill(1), Box::new(Text::new(log)) as Box<dyn Widget>),
            (
                Constraint::Length(1),
                Box::new(Text::new("q: quit").style(Style::new().faint())) as Box<dyn Widget>,
            ),
        ]);

        match tree {
            Ok(tree) => Box::new(tree),
            Err(e) => Box::new(Text::new(e.to_string())),
        }
    }

    fn animated(&mut self) -> &mut dyn AnimationTarget {
        &mut self.props
    }

    fn on_event(&mut self, event: &Event, ctx: &mut Context<'_>) -> Flow {
        match event {
            Event::Key(key) if key.is_char('q') => Flow::Quit,
            Event::Key(key) => {
                self.keys.push(key.to_string());
                ctx.animate(
                    Animation::scalar(PROGRESS, 0.0, 1.0, Duration::from_millis(200))
                        .easing(Easing::CubicOut),
                );
                Flow::Continue
            },
            Event::Paste(text) => {
                self.keys.push(format!("paste({})", text));
                Flow::Continue
            },
            Event::Resize { .. } => Flow::Continue,
        }
    }

    fn overlays(&self, area: Rect) -> Vec<Overlay> {
        let title = Rect::new(area.x, area.y, area.width, area.height.min(1));
        vec![Overlay::fade_foreground(
            title,
            Color::Default,
            self.scalar(BANNER_FADE),
        )]
    }
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let mut cols: Option<u16> = None;
    let mut rows: Option<u16> = None;
    let mut frames = 30u64;
    let mut config_path: Option<PathBuf> = None;
    let mut keys: Vec<String> = Vec::new();
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--cols" => {
                i += 1;
                if i < args.len() {
                    cols = args[i].parse().ok();
                }
            },
            "-r" | "--rows" => {
                i += 1;
                if i < args.len() {
                    rows = args[i].parse().ok();
                }
            },
            "-n" | "--frames" => {
                i += 1;
                if i < args.len() {
                    frames = args[i].parse().unwrap_or(30);
                }
            },
            "-k" | "--keys" => {
                i += 1;
                if i < args.len() {
                    keys.extend(args[i].split(',').map(|k| k.trim().to_string()));
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            },
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                eprintln!("Ignoring unknown argument '{}'", other);
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut config = match &config_path {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };
    if let Some(cols) = cols {
        config.headless.columns = cols;
    }
    if let Some(rows) = rows {
        config.headless.rows = rows;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut script = Vec::new();
    for key in keys.iter().filter(|k| !k.is_empty()) {
        match key.parse::<KeyEvent>() {
            Ok(key) => script.push(Event::Key(key)),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            },
        }
    }

    let size = config.headless.size();
    let terminal = HeadlessTerminal::new(size);
    let mut runner = match Runner::new(terminal, config) {
        Ok(runner) => runner.with_input(ScriptedSource::new(script)),
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    let mut app = Demo::new();
    runner.timeline_mut().register(
        Animation::scalar(BANNER_FADE, 1.0, 0.0, Duration::from_millis(300))
            .easing(Easing::ExpoOut),
    );
    runner.timeline_mut().register(
        Animation::scalar(PROGRESS, 0.0, 1.0, Duration::from_millis(400))
            .repeat(Repeat::Times(2)),
    );

    if let Err(e) = run_frames(&mut runner, &mut app, frames) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let terminal = runner.terminal();
    match output_format {
        OutputFormat::Text => {
            let snapshot = terminal.compact_snapshot();
            println!("Screen ({}):", Size::new(snapshot.width, snapshot.height));
            println!("---");
            for line in &snapshot.text {
                println!("{}", line);
            }
            println!("---");
        },
        OutputFormat::Json => match terminal.snapshot().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            },
        },
    }

    ExitCode::SUCCESS
}

fn run_frames(
    runner: &mut Runner<HeadlessTerminal>,
    app: &mut Demo,
    frames: u64,
) -> tamboui::Result<()> {
    runner.start()?;
    while runner.frame_count() < frames {
        if runner.frame(app)? != Flow::Continue {
            break;
        }
    }
    runner.terminate()
}

fn print_help() {
    println!("TambouI Headless Runner");
    println!();
    println!("Usage: tamboui-headless [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --cols <N>       Screen width (default: from config, 80)");
    println!("  -r, --rows <N>       Screen height (default: from config, 24)");
    println!("  -n, --frames <N>     Frames to render before stopping (default: 30)");
    println!("  -k, --keys <LIST>    Comma separated keys to feed, e.g. 'a,ctrl+x,q'");
    println!("      --config <PATH>  Load configuration from PATH");
    println!("  -j, --json           Output snapshot as JSON");
    println!("  -t, --text           Output snapshot as text (default)");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Logging follows RUST_LOG, falling back to the config's log_filter.");
}
