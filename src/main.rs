use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::Print;
use crossterm::terminal::{
    Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use morsetap::config::Config;
use morsetap::engine::TimingConfig;
use morsetap::feedback::{FeedbackEvent, FeedbackSink};
use morsetap::generator::ExerciseGenerator;
use morsetap::session::{
    Difficulty, DrillState, ExerciseMode, ExerciseSession, SessionState, SymbolDrill,
};
use morsetap::stats::{BackgroundSink, MemoryStats};

/// Longest wait for input when no pause timer is pending.
const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Parser)]
#[command(name = "morsetap", version, about = "Morse code tap trainer")]
struct Cli {
    #[arg(short, long, value_enum, help = "Exercise mode")]
    mode: Option<ExerciseMode>,

    #[arg(short, long, value_enum, help = "Difficulty level")]
    difficulty: Option<Difficulty>,

    #[arg(short = 'n', long, help = "Number of exercises in the session")]
    count: Option<usize>,

    #[arg(long, help = "Drill single symbols instead of running exercises")]
    drill: bool,

    #[arg(short, long, help = "Path to a config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Seed for repeatable exercise selection")]
    seed: Option<u64>,

    #[arg(long, help = "Print the end-of-run summary as JSON")]
    json: bool,
}

/// Rings the terminal bell when a tapped group doesn't decode.
struct TerminalBell {
    enabled: bool,
}

impl FeedbackSink for TerminalBell {
    fn notify(&self, event: FeedbackEvent) {
        if !self.enabled || !matches!(event, FeedbackEvent::SymbolRejected(_)) {
            return;
        }
        let mut out = io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
    }
}

enum Activity {
    Practice(ExerciseSession),
    Drill(SymbolDrill),
}

struct App {
    activity: Activity,
    keyboard_enhanced: bool,
    should_quit: bool,
}

impl App {
    fn takes_taps(&self) -> bool {
        match &self.activity {
            Activity::Practice(session) => session.mode().is_code_input(),
            Activity::Drill(_) => true,
        }
    }

    fn press(&mut self, now: Instant) {
        match &mut self.activity {
            Activity::Practice(session) => session.press(now),
            Activity::Drill(drill) => drill.press(now),
        }
    }

    fn release(&mut self, now: Instant) {
        match &mut self.activity {
            Activity::Practice(session) => session.release(now),
            Activity::Drill(drill) => drill.release(now),
        }
    }

    fn tick(&mut self, now: Instant) {
        match &mut self.activity {
            Activity::Practice(session) => session.tick(now),
            Activity::Drill(drill) => drill.tick(now),
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        match &self.activity {
            Activity::Practice(session) => session.next_deadline(),
            Activity::Drill(drill) => drill.next_deadline(),
        }
    }

    fn timing(&self) -> TimingConfig {
        match &self.activity {
            Activity::Practice(session) => session.timing(),
            Activity::Drill(drill) => drill.timing(),
        }
    }
}

#[derive(Serialize)]
struct Summary<'a> {
    activity: String,
    difficulty: Difficulty,
    correct: usize,
    total: usize,
    completed: bool,
    stats: &'a MemoryStats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(err) = init_logging() {
        eprintln!("logging disabled: {err:#}");
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(difficulty) = cli.difficulty {
        config.difficulty = difficulty;
    }
    if let Some(count) = cli.count {
        config.exercise_count = count;
    }
    config.validate();

    let rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let (stats_sink, stats_worker) = BackgroundSink::spawn(MemoryStats::new());
    let bell = Rc::new(TerminalBell {
        enabled: config.sound_enabled,
    });

    let difficulty = config.difficulty;
    let generator = Box::new(ExerciseGenerator::new(rng));
    let activity = if cli.drill {
        info!(%difficulty, "starting symbol drill");
        Activity::Drill(
            SymbolDrill::new(generator, Rc::new(config.clone()), difficulty)
                .with_statistics(Box::new(stats_sink))
                .with_feedback(bell),
        )
    } else {
        info!(mode = %config.mode, %difficulty, total = config.exercise_count, "starting session");
        Activity::Practice(
            ExerciseSession::new(
                config.mode,
                difficulty,
                config.exercise_count,
                generator,
                Rc::new(config.clone()),
                Instant::now(),
            )
            .with_statistics(Box::new(stats_sink))
            .with_feedback(bell),
        )
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, Hide)?;

    // Key release events are needed to time space-bar taps.
    let keyboard_enhanced = execute!(
        io::stdout(),
        PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
    )
    .is_ok();

    let mut app = App {
        activity,
        keyboard_enhanced,
        should_quit: false,
    };
    let result = run_app(&mut stdout, &mut app);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(stdout, Show, LeaveAlternateScreen)?;

    let (activity, correct, total, completed) = match &app.activity {
        Activity::Practice(session) => (
            session.mode().title().to_string(),
            session.correct_count(),
            session.total(),
            session.is_complete(),
        ),
        Activity::Drill(drill) => (
            "Symbol drill".to_string(),
            drill.correct_count(),
            drill.attempts(),
            true,
        ),
    };
    // Dropping the activity closes the stats channel so the worker can finish.
    drop(app);
    let stats = stats_worker.join().unwrap_or_default();
    info!(correct, total, completed, "run finished");

    result?;
    print_summary(
        &Summary {
            activity,
            difficulty,
            correct,
            total,
            completed,
            stats: &stats,
        },
        cli.json,
    )
}

fn init_logging() -> Result<()> {
    let dir = dirs::data_dir()
        .map(|dir| dir.join("morsetap"))
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir)?;
    let file = File::create(dir.join("morsetap.log"))?;

    let filter = EnvFilter::try_from_env("MORSETAP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .with(filter)
        .try_init()?;
    Ok(())
}

/// How long to block on input: until the pause timer is due, capped so the
/// screen still refreshes while idle.
fn poll_timeout(deadline: Option<Instant>, now: Instant) -> Duration {
    deadline.map_or(IDLE_POLL, |due| due.saturating_duration_since(now).min(IDLE_POLL))
}

fn run_app(out: &mut io::Stdout, app: &mut App) -> Result<()> {
    loop {
        render(out, app)?;

        let timeout = poll_timeout(app.next_deadline(), Instant::now());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                handle_key(app, key);
            }
        }
        app.tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    if key.code == KeyCode::Char(' ') && app.takes_taps() {
        handle_space(app, key.kind, now);
        return;
    }

    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match &app.activity {
        Activity::Practice(_) => handle_practice_key(app, key, now),
        Activity::Drill(_) => handle_drill_key(app, key, now),
    }
}

/// Every press restarts timing, so a release lost to a focus change costs one
/// tap rather than locking the key.
fn handle_space(app: &mut App, kind: KeyEventKind, now: Instant) {
    if !app.keyboard_enhanced {
        return;
    }
    match kind {
        KeyEventKind::Press => app.press(now),
        KeyEventKind::Release => app.release(now),
        KeyEventKind::Repeat => {}
    }
}

/// Stands in for a held key on terminals that can't report releases.
fn synthesize_tap(app: &mut App, dash: bool, now: Instant) {
    let held = if dash {
        app.timing().dash_min
    } else {
        Duration::ZERO
    };
    app.press(now.checked_sub(held).unwrap_or(now));
    app.release(now);
}

fn handle_practice_key(app: &mut App, key: KeyEvent, now: Instant) {
    let code_input = app.takes_taps();
    let Activity::Practice(session) = &mut app.activity else {
        return;
    };

    match session.state() {
        SessionState::InProgress => match key.code {
            KeyCode::Esc => app.should_quit = true,
            KeyCode::Enter => {
                session.submit(now);
            }
            KeyCode::Backspace => session.delete_last(now),
            KeyCode::Tab => session.insert_space(),
            KeyCode::Char('.') if code_input => synthesize_tap(app, false, now),
            KeyCode::Char('-') if code_input => synthesize_tap(app, true, now),
            KeyCode::Char(ch) if !code_input => session.type_char(ch),
            _ => {}
        },
        SessionState::ShowingResult => match key.code {
            KeyCode::Enter => session.advance(now),
            KeyCode::Esc => app.should_quit = true,
            _ => {}
        },
        SessionState::Complete => match key.code {
            KeyCode::Char('r') => session.restart(now),
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.should_quit = true,
            _ => {}
        },
    }
}

fn handle_drill_key(app: &mut App, key: KeyEvent, now: Instant) {
    let Activity::Drill(drill) = &mut app.activity else {
        return;
    };

    if drill.state().is_graded() {
        match key.code {
            KeyCode::Enter => drill.next(),
            KeyCode::Char('r') => drill.retry(),
            KeyCode::Esc => app.should_quit = true,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Backspace => drill.delete_last(now),
        KeyCode::Char('.') => synthesize_tap(app, false, now),
        KeyCode::Char('-') => synthesize_tap(app, true, now),
        _ => {}
    }
}

fn tap_hint(app: &App) -> &'static str {
    if app.keyboard_enhanced {
        "[space] tap  [.][-] dot/dash"
    } else {
        "[.][-] dot/dash"
    }
}

fn practice_lines(app: &App, session: &ExerciseSession) -> Vec<String> {
    let mut lines = vec![
        format!(
            "morsetap  {}  {}  {}",
            session.mode(),
            session.difficulty(),
            session.progress_text()
        ),
        String::new(),
        format!("  {}", session.current_exercise().prompt),
        String::new(),
        format!("> {}", session.display_answer()),
        String::new(),
    ];

    match session.state() {
        SessionState::InProgress => {
            if session.mode().is_code_input() {
                lines.push(format!("{}  [tab] word gap", tap_hint(app)));
            }
            lines.push("[backspace] delete  [enter] submit  [esc] quit".to_string());
        }
        SessionState::ShowingResult => {
            if let Some(result) = session.last_result() {
                if result.is_correct {
                    lines.push("Correct!".to_string());
                } else {
                    lines.push(format!("Incorrect. Expected: {}", result.expected));
                }
            }
            lines.push("[enter] next  [esc] quit".to_string());
        }
        SessionState::Complete => {
            lines.push(format!(
                "Session complete: {} / {} correct",
                session.correct_count(),
                session.total()
            ));
            lines.push("[r] restart  [enter] quit".to_string());
        }
    }
    lines
}

fn drill_lines(app: &App, drill: &SymbolDrill) -> Vec<String> {
    let mut lines = vec![
        format!(
            "morsetap  Symbol drill  {}  {} / {} correct",
            drill.difficulty(),
            drill.correct_count(),
            drill.attempts()
        ),
        String::new(),
        format!("  {}   {}", drill.target(), drill.target_pattern()),
        String::new(),
        format!("> {}", drill.pending_pattern()),
        String::new(),
    ];

    match drill.state() {
        DrillState::Ready | DrillState::Inputting => {
            lines.push(format!("{}  [backspace] delete  [esc] quit", tap_hint(app)));
        }
        DrillState::Correct { input_time } => {
            lines.push(format!("Correct in {:.1}s", input_time.as_secs_f64()));
            lines.push("[enter] next  [r] again  [esc] quit".to_string());
        }
        DrillState::Incorrect { expected, got } => {
            lines.push(format!("Expected {expected}, got {got}"));
            lines.push("[enter] next  [r] retry  [esc] quit".to_string());
        }
    }
    lines
}

fn render(out: &mut io::Stdout, app: &App) -> Result<()> {
    let lines = match &app.activity {
        Activity::Practice(session) => practice_lines(app, session),
        Activity::Drill(drill) => drill_lines(app, drill),
    };

    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    for line in lines {
        queue!(out, Print(line), Print("\r\n"))?;
    }
    out.flush()?;
    Ok(())
}

fn print_summary(summary: &Summary<'_>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "{} ({}): {} / {} correct{}",
        summary.activity,
        summary.difficulty,
        summary.correct,
        summary.total,
        if summary.completed { "" } else { ", stopped early" }
    );
    for (mode, tally) in &summary.stats.modes {
        println!(
            "  {mode}: {} attempts, {:.0}% accuracy, {:.1}s average",
            tally.attempts,
            tally.accuracy(),
            tally.average_time_ms() / 1000.0
        );
    }
    let weakest = summary.stats.weakest_symbols(5);
    if !weakest.is_empty() {
        let symbols: String = weakest.iter().collect();
        println!("  practice next: {symbols}");
    }
    Ok(())
}
