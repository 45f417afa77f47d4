use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute, queue,
    style::Print,
    terminal,
};
use lifegrid::Simulation;
use std::{io, time::Duration};

pub enum ConsoleCommand {
    Exit,
    ToggleRun,
    Step,
    Clear,
    Randomize,
    ToggleWrap,
    Save,
    Load,
    /// Pointer pressed or dragged at a terminal cell
    Toggle { px: i32, py: i32 },
    PointerReleased,
    Resize { cols: u16, rows: u16 },
    Handled,
}

pub struct ConsoleRender {
    report: String,
    notice: String,
}
impl ConsoleRender {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Self {
            report: String::new(),
            notice: String::new(),
        })
    }

    pub fn render(&self, sim: &Simulation, running: bool) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let size = sim.settings().cell_size.max(1) as usize;
        let block = "\u{2588}".repeat(size);
        let field_rows = rows.saturating_sub(1) as usize;

        let mut stdout = io::stdout();
        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
        for cell in sim.grid().alive() {
            let left = cell.x as usize * size;
            let top = cell.y as usize * size;
            if left + size > cols as usize || top >= field_rows {
                continue;
            }
            for row in top..(top + size).min(field_rows) {
                queue!(stdout, cursor::MoveTo(left as u16, row as u16), Print(&block))?;
            }
        }

        // footer
        let state = if running { "running" } else { "paused" };
        let wrap = if sim.settings().wrap { "wrap" } else { "bounded" };
        let footer = format!(
            "{} | gen {} | {} | {} | {}",
            self.report,
            sim.generation(),
            state,
            wrap,
            self.notice
        );
        let footer: String = footer.chars().take(cols as usize).collect();
        queue!(stdout, cursor::MoveTo(0, rows.saturating_sub(1)), Print(footer))?;

        io::Write::flush(&mut stdout)
    }

    /// Waits up to `timeout` for one terminal event
    pub fn poll_events(&mut self, timeout: Duration) -> io::Result<Option<ConsoleCommand>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }

        let cmd = match event::read()? {
            // key releases are reported on some platforms
            Event::Key(KeyEvent { kind, .. }) if kind != KeyEventKind::Press => {
                ConsoleCommand::Handled
            }
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
            | Event::Key(KeyEvent {
                code: KeyCode::Char('q') | KeyCode::Esc,
                ..
            }) => ConsoleCommand::Exit,
            Event::Key(KeyEvent {
                code: KeyCode::Char(key),
                ..
            }) => match key {
                ' ' => ConsoleCommand::ToggleRun,
                'n' => ConsoleCommand::Step,
                'c' => ConsoleCommand::Clear,
                'r' => ConsoleCommand::Randomize,
                'w' => ConsoleCommand::ToggleWrap,
                's' => ConsoleCommand::Save,
                'l' => ConsoleCommand::Load,
                _ => ConsoleCommand::Handled,
            },
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left),
                column,
                row,
                ..
            }) => ConsoleCommand::Toggle {
                px: column as i32,
                py: row as i32,
            },
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Up(_),
                ..
            }) => ConsoleCommand::PointerReleased,
            Event::Resize(cols, rows) => ConsoleCommand::Resize { cols, rows },
            _ => ConsoleCommand::Handled,
        };
        Ok(Some(cmd))
    }

    pub fn set_report(&mut self, report: String) {
        self.report = report;
    }
    pub fn set_notice<S: Into<String>>(&mut self, notice: S) {
        self.notice = notice.into();
    }
}
impl Drop for ConsoleRender {
    fn drop(&mut self) {
        // if we can enable it, we should be able to disable it
        terminal::disable_raw_mode().expect("disable raw mode");
        execute!(
            io::stdout(),
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )
        .expect("restore terminal");
    }
}
