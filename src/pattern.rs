//! Import and export of the Life RLE pattern text format
//!
//! ```text
//! #N Glider
//! x = 3, y = 3, rule = B3/S23
//! bo$2bo$3o!
//! ```

use crate::{Grid, Pos2};
use regex::Regex;
use std::{fmt::Write, sync::LazyLock};
use thiserror::Error;

static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^x\s*=\s*(\d+)\s*,\s*y\s*=\s*(\d+)(?:\s*,\s*rule\s*=\s*(\S+))?\s*$")
        .expect("valid header regex")
});
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d*)([^\s\d])").expect("valid token regex"));

/// Rule spellings that mean B3/S23
const LIFE_RULES: [&str; 2] = ["b3/s23", "23/3"];
const MAX_LINE_LEN: usize = 70;
/// Largest width or height a pattern may span
const MAX_EXTENT: usize = 1 << 16;
/// Largest number of live cells a pattern may hold
const MAX_LIVE_CELLS: usize = 1 << 22;

#[derive(Debug, Error, PartialEq)]
pub enum PatternError {
    #[error("invalid header line: {0}")]
    Header(String),
    #[error("unsupported rule {0}, only B3/S23 is supported")]
    Rule(String),
    #[error("unexpected tag '{0}'")]
    Tag(char),
    #[error("invalid run length {0}")]
    Run(String),
}

/// A set of live cells relative to the pattern's top-left corner
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pattern {
    name: Option<String>,
    width: usize,
    height: usize,
    /// Sorted row-major
    cells: Vec<Pos2>,
}

impl Pattern {
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        let mut pattern = Self::default();
        let mut declared = None;
        let mut cursor = Pos2::zero();

        'lines: for line in text.lines() {
            let line = line.trim();
            if let Some(comment) = line.strip_prefix('#') {
                if let Some(name) = comment.strip_prefix('N') {
                    pattern.name = Some(name.trim().to_owned());
                }
                continue;
            }
            if line.starts_with('x') {
                declared = Some(parse_header(line)?);
                continue;
            }

            let (width, height) = declared.unwrap_or((MAX_EXTENT, MAX_EXTENT));
            for (token, [run_str, tag]) in TOKEN.captures_iter(line).map(|c| c.extract()) {
                let run = match run_str {
                    "" => 1,
                    s => s
                        .parse::<i32>()
                        .map_err(|_| PatternError::Run(s.to_owned()))?,
                };
                // every run must stay inside the declared (or largest) extent
                let advance = |from: i32, limit: usize| {
                    from.checked_add(run)
                        .filter(|&to| to as usize <= limit)
                        .ok_or_else(|| PatternError::Run(token.to_owned()))
                };
                match tag {
                    "!" => break 'lines,
                    "o" => {
                        let end = advance(cursor.x, width)?;
                        if cursor.y as usize >= height
                            || pattern.cells.len() + run as usize > MAX_LIVE_CELLS
                        {
                            return Err(PatternError::Run(token.to_owned()));
                        }
                        pattern
                            .cells
                            .extend((cursor.x..end).map(|x| Pos2::new(x, cursor.y)));
                        cursor.x = end;
                    }
                    "b" => cursor.x = advance(cursor.x, width)?,
                    "$" => {
                        cursor.x = 0;
                        cursor.y = advance(cursor.y, height)?;
                    }
                    other => {
                        return Err(PatternError::Tag(other.chars().next().unwrap_or('?')));
                    }
                }
            }
        }

        let (width, height) = declared.unwrap_or_else(|| {
            let width = pattern.cells.iter().map(|p| p.x + 1).max().unwrap_or(0);
            let height = pattern.cells.last().map(|p| p.y + 1).unwrap_or(0);
            (width as usize, height as usize)
        });
        pattern.width = width;
        pattern.height = height;
        Ok(pattern)
    }

    /// Captures every live cell of `grid`, keeping the grid's dimensions
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            name: None,
            width: grid.columns(),
            height: grid.rows(),
            cells: grid.alive().collect(),
        }
    }

    pub fn set_name<T: AsRef<str>>(mut self, name: T) -> Self {
        self.name = Some(name.as_ref().to_owned());
        self
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }
    #[inline]
    pub fn cells(&self) -> &[Pos2] {
        &self.cells
    }

    /// Sets the pattern's cells alive in `grid`, shifted by `origin`
    ///
    /// Cells landing outside the grid are dropped.
    pub fn stamp(&self, grid: &mut Grid, origin: Pos2) {
        for &cell in &self.cells {
            let Pos2 { x, y } = cell + origin;
            grid.set(x, y, true);
        }
    }

    /// The origin that centers this pattern in `grid`, never left of or above it
    pub fn centered_in(&self, grid: &Grid) -> Pos2 {
        Pos2 {
            x: (grid.columns().saturating_sub(self.width) / 2) as i32,
            y: (grid.rows().saturating_sub(self.height) / 2) as i32,
        }
    }

    pub fn to_rle(&self) -> String {
        let mut header = String::new();
        if let Some(name) = &self.name {
            header.push_str(&format!("#N {}\n", name));
        }
        header.push_str(&format!(
            "x = {}, y = {}, rule = B3/S23",
            self.width, self.height
        ));
        format!("{}\n{}\n", header, self.encode_cells())
    }

    fn encode_cells(&self) -> String {
        let mut last = Pos2 { x: -1, y: 0 };
        let mut alive_run = 0;
        let mut out = RleWriter::with_width(MAX_LINE_LEN);
        for &pos in &self.cells {
            if last.y == pos.y && last.x + 1 == pos.x {
                alive_run += 1;
                last = pos;
                continue;
            }

            let lines_run = pos.y - last.y;
            let dead_run = match lines_run {
                0 => pos.x - last.x - 1,
                _ => pos.x,
            };
            // a pending run of live cells ends before the line break
            out.item(alive_run, 'o');
            out.item(lines_run, '$');
            out.item(dead_run, 'b');

            alive_run = 1;
            last = pos;
        }

        out.item(alive_run, 'o');
        out.finish()
    }
}

fn parse_header(line: &str) -> Result<(usize, usize), PatternError> {
    let caps = HEADER
        .captures(line)
        .ok_or_else(|| PatternError::Header(line.to_owned()))?;
    let dimension = |i: usize| {
        caps[i]
            .parse::<usize>()
            .ok()
            .filter(|&n| n <= MAX_EXTENT)
            .ok_or_else(|| PatternError::Header(line.to_owned()))
    };
    let size = (dimension(1)?, dimension(2)?);

    if let Some(rule) = caps.get(3) {
        let rule = rule.as_str();
        if !LIFE_RULES.contains(&rule.to_ascii_lowercase().as_str()) {
            return Err(PatternError::Rule(rule.to_owned()));
        }
    }
    Ok(size)
}

/// Writes `<count><tag>` items, starting a new line before one would pass
/// `width` columns
struct RleWriter {
    out: String,
    column: usize,
    width: usize,
}
impl RleWriter {
    fn with_width(width: usize) -> Self {
        Self {
            out: String::new(),
            column: 0,
            width,
        }
    }

    fn item(&mut self, count: i32, tag: char) {
        if count <= 0 {
            return;
        }
        let digits = match count {
            1 => 0,
            n => n.ilog10() as usize + 1,
        };
        let len = digits + tag.len_utf8();
        if self.column > 0 && self.column + len > self.width {
            self.out.push('\n');
            self.column = 0;
        }
        if count > 1 {
            // writing to a String cannot fail
            let _ = write!(self.out, "{}", count);
        }
        self.out.push(tag);
        self.column += len;
    }

    fn finish(mut self) -> String {
        self.item(1, '!');
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLIDER: &str = "#N Glider\n#C a comment\nx = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n";

    fn pos(x: i32, y: i32) -> Pos2 {
        Pos2 { x, y }
    }

    #[test]
    fn parses_glider() {
        let glider = Pattern::parse(GLIDER).unwrap();

        assert_eq!(glider.name(), Some("Glider"));
        assert_eq!(glider.size(), (3, 3));
        assert_eq!(
            glider.cells(),
            &[pos(1, 0), pos(2, 1), pos(0, 2), pos(1, 2), pos(2, 2)]
        );
    }

    #[test]
    fn headerless_pattern_uses_bounding_box() {
        let pattern = Pattern::parse("2o3$4bo!").unwrap();

        assert_eq!(pattern.cells(), &[pos(0, 0), pos(1, 0), pos(4, 3)]);
        assert_eq!(pattern.size(), (5, 4));
    }

    #[test]
    fn stops_at_terminator() {
        let pattern = Pattern::parse("o!\n3o").unwrap();

        assert_eq!(pattern.cells(), &[pos(0, 0)]);
    }

    #[test]
    fn rejects_other_rules_and_tags() {
        assert_eq!(
            Pattern::parse("x = 1, y = 1, rule = B36/S23\no!"),
            Err(PatternError::Rule("B36/S23".into()))
        );
        assert_eq!(Pattern::parse("2oz!"), Err(PatternError::Tag('z')));
        assert!(matches!(
            Pattern::parse("x = wide"),
            Err(PatternError::Header(_))
        ));
        assert!(matches!(
            Pattern::parse("99999999999o!"),
            Err(PatternError::Run(_))
        ));
    }

    #[test]
    fn rejects_runs_past_the_extent() {
        for text in [
            "2147483647b2147483647bo!",
            "2147483647$2147483647$o!",
            "2147483647o!",
            "x = 3, y = 3\n4o!",
            "x = 3, y = 3\n2bo$$$o!",
            "x = 3, y = 2\n2$o!",
        ] {
            assert!(
                matches!(Pattern::parse(text), Err(PatternError::Run(_))),
                "{text:?} parsed"
            );
        }
        assert!(matches!(
            Pattern::parse("x = 99999999, y = 1\no!"),
            Err(PatternError::Header(_))
        ));
    }

    #[test]
    fn runs_up_to_the_extent_are_fine() {
        let pattern = Pattern::parse("x = 3, y = 2\n3o$3b!").unwrap();

        assert_eq!(pattern.cells(), &[pos(0, 0), pos(1, 0), pos(2, 0)]);
    }

    #[test]
    fn accepts_legacy_rule_spelling() {
        let pattern = Pattern::parse("x = 2, y = 1, rule = 23/3\n2o!").unwrap();

        assert_eq!(pattern.cells().len(), 2);
    }

    #[test]
    fn stamps_with_offset_and_clips() {
        let glider = Pattern::parse(GLIDER).unwrap();
        let mut grid = Grid::new(4, 4);
        glider.stamp(&mut grid, pos(2, 2));

        // only (3, 2) of the glider lands inside a 4x4 grid at this offset
        assert_eq!(grid.alive().collect::<Vec<_>>(), vec![pos(3, 2)]);
    }

    #[test]
    fn centers_in_grid() {
        let glider = Pattern::parse(GLIDER).unwrap();

        assert_eq!(glider.centered_in(&Grid::new(9, 10)), pos(3, 3));
        assert_eq!(glider.centered_in(&Grid::new(2, 2)), pos(0, 0));
    }

    #[test]
    fn exports_grid() {
        let mut grid = Grid::new(5, 4);
        for (x, y) in [(1, 0), (2, 0), (0, 3), (4, 3)] {
            grid.set(x, y, true);
        }
        let text = Pattern::from_grid(&grid).set_name("sample").to_rle();

        assert_eq!(text, "#N sample\nx = 5, y = 4, rule = B3/S23\nb2o3$o3bo!\n");
    }

    #[test]
    fn export_then_parse_stamps_identical_grid() {
        let mut grid = Grid::new(40, 30);
        grid.randomize(0.5);
        let pattern = Pattern::parse(&Pattern::from_grid(&grid).to_rle()).unwrap();

        let mut restored = Grid::new(40, 30);
        pattern.stamp(&mut restored, Pos2::zero());
        assert_eq!(restored, grid);
        assert_eq!(pattern.size(), (40, 30));
    }

    #[test]
    fn long_output_wraps_lines() {
        let mut grid = Grid::new(200, 1);
        for x in (0..200).step_by(2) {
            grid.set(x, 0, true);
        }
        let text = Pattern::from_grid(&grid).to_rle();

        assert!(text.lines().all(|line| line.len() <= MAX_LINE_LEN));
        assert!(text.trim_end().ends_with('!'));
    }
}
