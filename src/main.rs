use std::{
    io,
    process::ExitCode,
    sync::{Arc, Mutex, MutexGuard, mpsc},
    thread,
    time::Duration,
};

mod console;
mod options;
mod stats;

use console::{ConsoleCommand, ConsoleRender};
use lifegrid::{
    DecodeOutcome, Grid, Pattern, Pos2, Runner, Simulation,
    pattern::PatternError,
    store::{self, StoreError},
};
use log::warn;
use options::{Args, ArgsError};
use stats::Throughput;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Args(#[from] ArgsError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{path}: {source}")]
    Pattern { path: String, source: PatternError },
    #[error("{0}: document has no usable dimensions")]
    Rejected(String),
    #[error("simulation lock poisoned")]
    Poisoned,
}

fn lock(sim: &Mutex<Simulation>) -> Result<MutexGuard<'_, Simulation>, AppError> {
    sim.lock().map_err(|_| AppError::Poisoned)
}

fn build_simulation(args: &Args) -> Result<Simulation, AppError> {
    let settings = args.settings()?;
    let (width, height) = args.grid_size(settings.cell_size);
    let mut sim = Simulation::new(Grid::new(width, height), settings);
    args.fill_mode()?.apply(sim.grid_mut());

    // a loaded document replaces the fill, a pattern is drawn over either
    if let Some(file_name) = args.input_file() {
        let config = store::load(&file_name)?;
        if sim.import(&config) == DecodeOutcome::Rejected {
            return Err(AppError::Rejected(file_name));
        }
    }

    if let Some(file_name) = args.pattern_file() {
        let text = std::fs::read_to_string(&file_name)?;
        let pattern = Pattern::parse(&text).map_err(|source| AppError::Pattern {
            path: file_name,
            source,
        })?;
        let origin = pattern.centered_in(sim.grid());
        pattern.stamp(sim.grid_mut(), origin);
    }
    Ok(sim)
}

fn write_outputs(args: &Args, sim: &Simulation) -> Result<(), AppError> {
    if let Some(file_name) = args.output_file() {
        store::save(&file_name, &sim.export())?;
    }
    if let Some(file_name) = args.export_file() {
        let text = Pattern::from_grid(sim.grid())
            .set_name("lifegrid generated pattern")
            .to_rle();
        std::fs::write(file_name, text)?;
    }
    Ok(())
}

fn run_batch(args: &Args, mut sim: Simulation) -> Result<(), AppError> {
    println!("alive: {}", sim.grid().alive_count());

    let sleep = args.batch_sleep();
    let mut stats = Throughput::new(sim.grid().alive_count());
    for _ in 0..args.generations() {
        if stats.has_report() {
            println!("{}", stats.report());
        }

        sim.step();
        stats.record(sim.generation(), sim.grid().alive_count());
        if let Some(time) = sleep {
            thread::sleep(time);
        }
    }
    println!("{}", stats.report());

    write_outputs(args, &sim)
}

fn save(args: &Args, sim: &Simulation) -> String {
    let Some(file_name) = args.output_file() else {
        return "no --output file to save to".into();
    };
    match store::save(&file_name, &sim.export()) {
        Ok(()) => format!("saved {}", file_name),
        Err(err) => {
            warn!("save failed: {}", err);
            format!("save failed: {}", err)
        }
    }
}

fn load(args: &Args, sim: &mut Simulation) -> String {
    let Some(file_name) = args.input_file() else {
        return "no --input file to load".into();
    };
    match store::load(&file_name).map(|config| sim.import(&config)) {
        Ok(DecodeOutcome::Rejected) => {
            warn!("{}: document has no usable dimensions", file_name);
            format!("{}: nothing to load", file_name)
        }
        Ok(_) => format!("loaded {}", file_name),
        Err(err) => {
            warn!("load failed: {}", err);
            format!("load failed: {}", err)
        }
    }
}

/// Applies an editing command to the simulation, returning a notice to show
fn apply(
    cmd: ConsoleCommand,
    args: &Args,
    sim: &mut Simulation,
    last_cell: &mut Option<Pos2>,
) -> Option<String> {
    match cmd {
        ConsoleCommand::Step => sim.step(),
        ConsoleCommand::Clear => sim.clear(),
        ConsoleCommand::Randomize => sim.randomize(),
        ConsoleCommand::ToggleWrap => {
            let settings = sim.settings_mut();
            settings.wrap = !settings.wrap;
        }
        ConsoleCommand::Save => return Some(save(args, sim)),
        ConsoleCommand::Load => return Some(load(args, sim)),
        ConsoleCommand::Toggle { px, py } => {
            let cell = sim.settings().cell_at_pixel(px, py);
            // a drag within one cell toggles it once
            if *last_cell != Some(cell) {
                *last_cell = Some(cell);
                sim.toggle_at_pixel(px, py);
            }
        }
        ConsoleCommand::PointerReleased => *last_cell = None,
        ConsoleCommand::Resize { cols, rows } => {
            let size = sim.settings().cell_size.max(1) as usize;
            sim.ensure_size(cols as usize / size, (rows as usize).saturating_sub(1) / size);
        }
        ConsoleCommand::Exit | ConsoleCommand::ToggleRun | ConsoleCommand::Handled => {}
    }
    None
}

fn run_console(args: &Args, sim: Simulation) -> Result<(), AppError> {
    let shared = Arc::new(Mutex::new(sim));
    let (redraw_tx, redraw_rx) = mpsc::channel::<()>();
    let mut runner: Option<Runner> = None;
    let mut stats = Throughput::new(lock(&shared)?.grid().alive_count());
    let mut last_cell: Option<Pos2> = None;
    let mut dirty = true;

    let mut console = ConsoleRender::new()?;
    'frames: loop {
        let mut wait = Duration::from_millis(16);
        while let Some(cmd) = console.poll_events(wait)? {
            wait = Duration::ZERO;
            match cmd {
                ConsoleCommand::Exit => break 'frames,
                ConsoleCommand::Handled => continue,
                // never holds the lock, the runner needs it to finish its iteration
                ConsoleCommand::ToggleRun => match runner.take() {
                    Some(mut running) => running.stop(),
                    None => {
                        let tx = redraw_tx.clone();
                        runner = Some(Runner::start(Arc::clone(&shared), move |_| {
                            let _ = tx.send(());
                        }));
                    }
                },
                cmd => {
                    let mut sim = lock(&shared)?;
                    if let Some(notice) = apply(cmd, args, &mut sim, &mut last_cell) {
                        console.set_notice(notice);
                    }
                }
            }
            dirty = true;
        }

        while redraw_rx.try_recv().is_ok() {
            dirty = true;
        }
        if dirty {
            let sim = lock(&shared)?;
            stats.record(sim.generation(), sim.grid().alive_count());
            if stats.has_report() {
                console.set_report(stats.report());
            }
            console.render(&sim, runner.is_some())?;
            dirty = false;
        }
    }

    if let Some(mut running) = runner.take() {
        running.stop();
    }
    drop(console);

    let sim = lock(&shared)?;
    write_outputs(args, &sim)
}

fn run() -> Result<(), AppError> {
    let Some(args) = Args::from_env()? else {
        return Ok(());
    };

    let sim = build_simulation(&args)?;
    if args.console() {
        run_console(&args, sim)
    } else {
        run_batch(&args, sim)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lifegrid: {}", err);
            ExitCode::FAILURE
        }
    }
}
