use std::{str::FromStr, time::Duration};

use lifegrid::{Grid, Settings, grid::DEFAULT_DENSITY};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArgsError {
    #[error(transparent)]
    Parse(#[from] getopts::Fail),
    #[error("invalid value for --{name}: {value}")]
    Value { name: &'static str, value: String },
}

pub struct Args {
    matches: getopts::Matches,
}

impl Args {
    pub fn new<T: AsRef<str>>(args: &[T]) -> Result<Option<Self>, ArgsError> {
        let mut opts = getopts::Options::new();
        opts.optflag("", "help", "print this help menu");
        opts.optflag("c", "console", "run in console mode");
        opts.optflag("t", "threads", "compute generations in parallel");
        opts.optflag("", "wrap", "connect opposite edges of the grid");
        opts.optopt("i", "input", "load a saved grid document", "FILE");
        opts.optopt("o", "output", "save the grid document to FILE", "FILE");
        opts.optopt("p", "pattern", "stamp a Life RLE pattern in the center", "FILE");
        opts.optopt("e", "export", "write the final grid as a Life RLE pattern", "FILE");
        opts.optopt("w", "width", "set grid width", "WIDTH");
        opts.optopt("h", "height", "set grid height", "HEIGHT");
        opts.optopt("f", "fill", "random, alternating, all or empty", "TYPE");
        opts.optopt("d", "density", "live probability for the random fill", "P");
        opts.optopt(
            "s",
            "interval",
            "the amount of time to wait between generations",
            "MILLIS",
        );
        opts.optopt("g", "gens", "number of generations in batch mode", "COUNT");
        opts.optopt("", "cell-size", "terminal columns per cell", "N");

        let matches = opts.parse(args.iter().map(T::as_ref))?;
        if matches.opt_present("help") {
            println!("{}", opts.usage("usage: lifegrid [options]"));
            return Ok(None);
        }

        let args = Self { matches };
        // surface malformed values before anything starts running
        args.fill_mode()?;
        args.settings()?;
        args.parsed::<usize>("gens")?;
        args.parsed::<usize>("width")?;
        args.parsed::<usize>("height")?;
        Ok(Some(args))
    }
    pub fn from_env() -> Result<Option<Self>, ArgsError> {
        let env = std::env::args().collect::<Vec<_>>();
        Self::new(&env[1..])
    }

    fn parsed<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, ArgsError> {
        let Some(value) = self.matches.opt_str(name) else {
            return Ok(None);
        };
        match value.parse() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(_) => Err(ArgsError::Value { name, value }),
        }
    }

    pub fn console(&self) -> bool {
        self.matches.opt_present("console")
    }

    pub fn generations(&self) -> usize {
        self.parsed("gens").ok().flatten().unwrap_or(100)
    }
    /// Extra delay between batch generations, only when asked for
    pub fn batch_sleep(&self) -> Option<Duration> {
        self.parsed("interval")
            .ok()
            .flatten()
            .map(Duration::from_millis)
    }

    pub fn settings(&self) -> Result<Settings, ArgsError> {
        let defaults = Settings::default();
        let cell_size = match self.parsed::<u32>("cell-size")? {
            Some(0) => {
                return Err(ArgsError::Value {
                    name: "cell-size",
                    value: "0".into(),
                });
            }
            Some(size) => size,
            None if self.console() => 1,
            None => defaults.cell_size,
        };

        Ok(Settings {
            cell_size,
            interval: self
                .parsed("interval")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.interval),
            wrap: self.matches.opt_present("wrap"),
            parallel: self.matches.opt_present("threads"),
        })
    }

    /// Grid dimensions, falling back to the terminal area in console mode
    pub fn grid_size(&self, cell_size: u32) -> (usize, usize) {
        let default = if self.console() {
            let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
            let cell = cell_size.max(1) as usize;
            // the last terminal row holds the status line
            (cols as usize / cell, (rows as usize).saturating_sub(1) / cell)
        } else {
            (200, 200)
        };

        (
            self.parsed("width").ok().flatten().unwrap_or(default.0),
            self.parsed("height").ok().flatten().unwrap_or(default.1),
        )
    }

    pub fn fill_mode(&self) -> Result<FillMode, ArgsError> {
        let seeded = self.input_file().is_some() || self.pattern_file().is_some();
        let mode = match self.matches.opt_str("fill") {
            Some(mode) => mode,
            None if seeded => return Ok(FillMode::Empty),
            None => "random".to_owned(),
        };
        let density = self.parsed::<f64>("density")?.unwrap_or(DEFAULT_DENSITY);
        FillMode::new(&mode, density).ok_or(ArgsError::Value {
            name: "fill",
            value: mode,
        })
    }

    pub fn output_file(&self) -> Option<String> {
        self.matches.opt_str("output")
    }
    pub fn input_file(&self) -> Option<String> {
        self.matches.opt_str("input")
    }
    pub fn pattern_file(&self) -> Option<String> {
        self.matches.opt_str("pattern")
    }
    pub fn export_file(&self) -> Option<String> {
        self.matches.opt_str("export")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillMode {
    Random(f64),
    Alternating,
    All,
    Empty,
}
impl FillMode {
    fn new<S: AsRef<str>>(s: S, density: f64) -> Option<Self> {
        match s.as_ref() {
            "random" => Some(Self::Random(density)),
            "alternating" => Some(Self::Alternating),
            "all" => Some(Self::All),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }

    pub fn apply(self, grid: &mut Grid) {
        match self {
            Self::Random(density) => grid.randomize(density),
            Self::All => grid.randomize(1.0),
            Self::Empty => grid.clear(),
            Self::Alternating => {
                for y in 0..grid.rows() as i32 {
                    for x in 0..grid.columns() as i32 {
                        grid.set(x, y, (x + y) % 2 == 0);
                    }
                }
            }
        }
    }
}
