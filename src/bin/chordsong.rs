// Chordsong CLI
// Validate chord documents, inspect candidates and replay key sequences

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use chordsong_core::config::{parse_chord, Config};
use chordsong_core::conflicts::{find_conflicts, ConflictReport};
use chordsong_core::event::{ActionExecutor, DeferredAction, ExecutionError};
use chordsong_core::overlay::build_overlay;
use chordsong_core::settings::Settings;
use chordsong_core::state::ChordHistory;
use chordsong_core::token::KeyEvent;
use chordsong_core::transform::{candidates, filter_by_context, CaptureEngine, Outcome, Step};

/// Leader-key chord engine for Blender
#[derive(Parser, Debug)]
#[command(name = "chordsong")]
#[command(version)]
#[command(about = "Leader-key chord engine", long_about = None)]
struct Args {
    /// JSON chord document
    #[arg(short, long, value_name = "CONFIG", required = true)]
    config: PathBuf,

    /// TOML settings file (default: ~/.config/chordsong/settings.toml)
    #[arg(short, long, value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Editor context used to filter definitions
    #[arg(long, value_name = "CONTEXT")]
    context: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Validate config and exit
    #[arg(long)]
    check_config: bool,

    /// Show what can be pressed after a partial chord ("" for the root)
    #[arg(long, value_name = "CHORD")]
    candidates: Option<String>,

    /// Replay host keys after the leader, e.g. "G ctrl+S"
    #[arg(long, value_name = "KEYS")]
    simulate: Option<String>,

    /// Report duplicate and prefix conflicts
    #[arg(long)]
    conflicts: bool,
}

/// Executor that only reports what it would run
struct PrintExecutor;

impl ActionExecutor for PrintExecutor {
    fn execute(&mut self, task: &DeferredAction) -> Result<(), ExecutionError> {
        println!("  run: {} ({})", task.label, task.action);
        Ok(())
    }
}

/// Main application state
struct Application {
    config: Config,
    settings: Settings,
    args: Args,
}

impl Application {
    fn new(args: Args) -> Result<Self> {
        let mut settings = match &args.settings {
            Some(path) => Settings::from_file(path)
                .with_context(|| format!("loading settings {}", path.display()))?,
            None => Settings::load_default()?,
        };
        if let Some(context) = &args.context {
            settings.set_context(context.clone());
        }

        let mut config = Config::from_path(&args.config)
            .with_context(|| format!("loading config {}", args.config.display()))?;
        for warning in &config.warnings {
            log::warn!("{}", warning);
        }
        settings.apply_to(&mut config);

        Ok(Self {
            config,
            settings,
            args,
        })
    }

    fn validate(&self) -> Result<()> {
        let enabled = self.config.definitions.iter().filter(|d| d.enabled).count();
        println!(
            "Configuration is valid: {} definitions ({} enabled), timeout {} ms, leader {}",
            self.config.definitions.len(),
            enabled,
            self.config.timeout_ms,
            self.config.leader_key
        );
        for warning in &self.config.warnings {
            println!("  warning: {}", warning);
        }
        Ok(())
    }

    fn engine(&self) -> CaptureEngine {
        CaptureEngine::new(
            self.config.definitions.clone(),
            self.settings.capture_config(&self.config),
        )
        .with_history(ChordHistory::shared(self.settings.history_size()))
    }

    fn show_candidates(&self, chord: &str) -> Result<()> {
        let buffer = if chord.trim().is_empty() {
            Vec::new()
        } else {
            parse_chord(chord)?
        };

        let definitions: Vec<_> = match self.settings.context() {
            Some(context) => filter_by_context(&self.config.definitions, context)
                .cloned()
                .collect(),
            None => self.config.definitions.clone(),
        };
        let next = candidates(&definitions, &buffer);

        if next.is_empty() {
            println!("No candidates");
            return Ok(());
        }

        let model = build_overlay(&buffer, &next, &self.leader_token(), &self.config.overlay);
        println!("{}", model.header);
        for (index, column) in model.columns.iter().enumerate() {
            if model.columns.len() > 1 {
                println!("-- column {} --", index + 1);
            }
            for row in column {
                let suffix = row.count_suffix().unwrap_or_default();
                println!("  {:<10} {} {}", row.token, row.label, suffix);
            }
        }
        if model.hidden > 0 {
            println!("  ... {} more", model.hidden);
        }
        for row in &model.footer {
            println!("  [{}] {}", row.token, row.label);
        }
        Ok(())
    }

    fn simulate(&self, keys: &str) -> Result<()> {
        let events = keys
            .split_whitespace()
            .map(parse_key_event)
            .collect::<Result<Vec<_>>>()?;

        let mut engine = self.engine();
        engine.start(Instant::now());

        for event in &events {
            match engine.process_event(event, Instant::now()) {
                Step::Ignored => println!("{}: ignored", event.key_id),
                Step::Continue(next) => println!(
                    "{}: {} candidate(s), buffer \"{}\"",
                    event.key_id,
                    next.len(),
                    engine
                        .buffer()
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(" ")
                ),
                Step::Finished(outcome) => {
                    print_outcome(&outcome);
                    break;
                }
            }
        }

        if engine.is_capturing() {
            println!("Still capturing after {} key(s)", events.len());
            engine.cancel();
        }

        let ran = engine.queue_mut().run(&mut PrintExecutor);
        log::debug!("{} action(s) executed", ran);
        Ok(())
    }

    fn report_conflicts(&self) -> Result<()> {
        let report = find_conflicts(&self.config.definitions, true);
        print_report(&report);
        if !report.is_empty() {
            bail!("{} conflict(s) found", report.len());
        }
        Ok(())
    }

    fn leader_token(&self) -> String {
        KeyEvent::press(self.config.leader_key.clone())
            .to_token()
            .map(|t| t.as_str().to_string())
            .unwrap_or_else(|| self.config.leader_key.to_lowercase())
    }

    fn run(&self) -> Result<()> {
        if self.args.check_config {
            return self.validate();
        }
        if let Some(chord) = &self.args.candidates {
            return self.show_candidates(chord);
        }
        if let Some(keys) = &self.args.simulate {
            return self.simulate(keys);
        }
        if self.args.conflicts {
            return self.report_conflicts();
        }
        self.show_candidates("")
    }
}

/// Parse `ctrl+shift+A` style key descriptions into a press event
fn parse_key_event(spec: &str) -> Result<KeyEvent> {
    let mut parts: Vec<&str> = spec.split('+').collect();
    let key_id = match parts.pop() {
        Some(key) if !key.is_empty() => key.to_uppercase(),
        _ => bail!("missing key in '{}'", spec),
    };

    let mut event = KeyEvent::press(key_id);
    for modifier in parts {
        event = match modifier.to_lowercase().as_str() {
            "ctrl" => event.with_ctrl(),
            "shift" => event.with_shift(),
            "alt" => event.with_alt(),
            "oskey" | "cmd" | "super" => event.with_oskey(),
            other => bail!("unknown modifier '{}' in '{}'", other, spec),
        };
    }
    Ok(event)
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Executed(def) => println!("Executed \"{}\": {}", def.chord(), def.display_label()),
        Outcome::AbortedUnknown(buffer) => println!(
            "Unknown chord \"{}\"",
            buffer
                .iter()
                .map(|t| t.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        ),
        Outcome::AbortedCancelled => println!("Cancelled"),
        Outcome::AbortedTimeout => println!("Timed out"),
    }
}

fn print_report(report: &ConflictReport) {
    if report.is_empty() {
        println!("No conflicts");
        return;
    }

    for dup in &report.duplicates {
        println!(
            "Duplicate \"{}\" in {} ({}x): {}",
            dup.chord,
            dup.context,
            dup.count(),
            dup.labels.join(", ")
        );
        if !dup.fixes_append.is_empty() {
            println!("  append: {}", dup.fixes_append.join(" | "));
        }
        if !dup.fixes_change_last.is_empty() {
            println!("  change last: {}", dup.fixes_change_last.join(" | "));
        }
    }

    for prefix in &report.prefix_conflicts {
        println!(
            "Prefix \"{}\" ({}) blocks \"{}\" ({}) in {}",
            prefix.prefix_chord,
            prefix.prefix_label,
            prefix.full_chord,
            prefix.full_label,
            prefix.context
        );
        if let Some(fix) = &prefix.suggested_fix {
            println!("  try: {}", fix);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let app = Application::new(args)?;
    app.run()
}
