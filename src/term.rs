use std::io::{self, stdout, Stdout, Write};
use std::thread::sleep;
use std::time::{Duration, Instant};

use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};
use rand::Rng;
use tracing::{error, info};

use crate::game::{Flow, Game, Input, Screen};
use crate::grid::{Grid, DEFAULT_HEIGHT, DEFAULT_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use crate::worm::Direction::*;
use crate::{Cell, GameError, GridInt};

pub type TermInt = u16;
pub type Coords = (TermInt, TermInt);

const FRAME_INTERVAL_MS: u64 = 8;

const WORM_BODY: [char; 2] = ['█', '█'];
const FOOD: [char; 2] = ['(', ')'];
const DEAD_WORM: [char; 2] = ['X', 'X'];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Glyph {
    ch: char,
    color: Color,
}

const BLANK: Glyph = Glyph { ch: ' ', color: Color::Reset };

/// Owns the terminal. Drawing goes into `frame`; `present` sends only the
/// cells that differ from what is already on screen.
pub struct TermManager<W: Write = Stdout> {
    width: TermInt,
    height: TermInt,
    out: W,
    screen: Vec<Glyph>,
    frame: Vec<Glyph>,
}

impl TermManager<Stdout> {
    pub fn stdout() -> Result<Self, GameError> {
        let (width, height) = terminal::size()?;
        Ok(TermManager::new(stdout(), width, height))
    }
}

impl<W: Write> TermManager<W> {
    pub fn new(out: W, width: TermInt, height: TermInt) -> Self {
        let cells = width as usize * height as usize;
        TermManager { width, height, out, screen: vec![BLANK; cells], frame: vec![BLANK; cells] }
    }

    pub fn setup(&mut self) -> io::Result<()> {
        execute!(self.out, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.out, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
    }

    /// Best effort: a failure here still lets the other steps run.
    pub fn restore(&mut self) {
        if let Err(err) = terminal::disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
        if let Err(err) = execute!(self.out, ResetColor, cursor::Show, cursor::EnableBlinking) {
            error!(?err, "failed to restore the cursor");
        }
        if let Err(err) = execute!(self.out, LeaveAlternateScreen) {
            error!(?err, "failed to leave alternate screen");
        }
    }

    pub fn get_terminal_size(&self) -> Coords {
        (self.width, self.height)
    }

    pub fn clear_frame(&mut self) {
        self.frame.fill(BLANK);
    }

    /// Forgets what is on screen so the next `present` repaints everything.
    pub fn invalidate(&mut self) -> io::Result<()> {
        execute!(self.out, terminal::Clear(ClearType::All))?;
        self.screen.fill(BLANK);
        Ok(())
    }

    pub fn print_at(&mut self, pos: Coords, ch: char, color: Color) {
        if pos.0 < self.width && pos.1 < self.height {
            let idx = self.width as usize * pos.1 as usize + pos.0 as usize;
            self.frame[idx] = Glyph { ch, color };
        }
    }

    pub fn print_str_at(&mut self, pos: Coords, text: &str, color: Color) {
        for (x_diff, ch) in text.chars().enumerate() {
            self.print_at((pos.0.saturating_add(x_diff as TermInt), pos.1), ch, color);
        }
    }

    pub fn draw_borders(&mut self, top_left: Coords, (width, height): Coords) {
        let end_x = top_left.0 + width - 1;
        let end_y = top_left.1 + height - 1;

        for x in top_left.0..=end_x {
            let ch = if x == top_left.0 || x == end_x {'+'} else {'-'};
            self.print_at((x, top_left.1), ch, Color::DarkGrey);
            self.print_at((x, end_y), ch, Color::DarkGrey);
        }

        for y in top_left.1 + 1..end_y {
            self.print_at((top_left.0, y), '|', Color::DarkGrey);
            self.print_at((end_x, y), '|', Color::DarkGrey);
        }
    }

    /// Draws a padded box with the lines centred, over whatever is below it.
    pub fn show_message(&mut self, lines: &[String]) {
        let msg_height = (lines.len() + 2) as TermInt;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 4) as TermInt;
        let center = (self.width / 2, self.height / 2);
        let top_left = (center.0.saturating_sub(msg_width / 2), center.1.saturating_sub(msg_height / 2));

        for y_diff in 0..msg_height {
            for x_diff in 0..msg_width {
                self.print_at((top_left.0 + x_diff, top_left.1 + y_diff), ' ', Color::Reset);
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as TermInt + 1;
            let color = if i == 0 {Color::Cyan} else {Color::White};
            self.print_str_at((top_left.0, y), &padded_line, color);
        }
    }

    pub fn present(&mut self) -> io::Result<()> {
        let width = self.width as usize;
        let mut color = None;

        for (i, (shown, wanted)) in self.screen.iter_mut().zip(&self.frame).enumerate() {
            if shown == wanted {
                continue;
            }

            if color != Some(wanted.color) {
                queue!(self.out, SetForegroundColor(wanted.color))?;
                color = Some(wanted.color);
            }

            let pos = ((i % width) as TermInt, (i / width) as TermInt);
            queue!(self.out, cursor::MoveTo(pos.0, pos.1), Print(wanted.ch))?;
            *shown = *wanted;
        }

        if color.is_some() {
            queue!(self.out, ResetColor)?;
        }
        self.out.flush()
    }

    pub fn read_inputs(&mut self) -> io::Result<Vec<Input>> {
        let mut inputs = vec![];

        while poll(Duration::from_millis(1))? {
            match read()? {
                Event::Key(ev) => inputs.extend(map_key(&ev)),
                Event::Resize(..) => self.invalidate()?,
                _ => {}
            }
        }

        Ok(inputs)
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL)
}

pub fn map_key(ev: &KeyEvent) -> Option<Input> {
    if ev.kind == KeyEventKind::Release {
        return None;
    }
    if is_ctrl_c(ev) {
        return Some(Input::Terminate);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Input::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Input::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Input::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Input::Turn(Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Input::Confirm),
        KeyCode::Esc => Some(Input::Back),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(Input::Quit),
        _ => None,
    }
}

/// Terminal columns and rows a board needs: two columns per cell, a frame
/// around it and the status line on top. `None` if that is more than a
/// terminal can address.
pub fn required_size(grid: &Grid) -> Option<Coords> {
    let columns = TermInt::try_from(grid.width()).ok()?.checked_mul(2)?.checked_add(2)?;
    let rows = TermInt::try_from(grid.height()).ok()?.checked_add(3)?;
    Some((columns, rows))
}

/// Board for the terminal we're running in.
pub fn current_terminal_grid(requested: Option<Cell>) -> Result<Grid, GameError> {
    let (columns, rows) = terminal::size()?;
    terminal_grid(columns, rows, requested)
}

/// Picks the board for a terminal of the given size. An explicit size must
/// fit; otherwise the largest board up to the default that fits is used.
pub fn terminal_grid(columns: TermInt, rows: TermInt, requested: Option<Cell>) -> Result<Grid, GameError> {
    let too_small = |needed: Coords| GameError::TerminalTooSmall {
        columns,
        rows,
        needed_columns: needed.0,
        needed_rows: needed.1,
    };

    match requested {
        Some((height, width)) => {
            let grid = Grid::new(height, width)?;
            match required_size(&grid) {
                Some(needed) if columns >= needed.0 && rows >= needed.1 => Ok(grid),
                Some(needed) => Err(too_small(needed)),
                None => Err(too_small((TermInt::MAX, TermInt::MAX))),
            }
        }
        None => {
            let width = (columns.saturating_sub(2) / 2).min(DEFAULT_WIDTH as TermInt) as GridInt;
            let height = rows.saturating_sub(3).min(DEFAULT_HEIGHT as TermInt) as GridInt;
            Grid::new(height, width).map_err(|_| {
                too_small((MIN_WIDTH as TermInt * 2 + 2, MIN_HEIGHT as TermInt + 3))
            })
        }
    }
}

fn draw<R: Rng, W: Write>(term: &mut TermManager<W>, game: &Game<R>) {
    term.clear_frame();

    let grid = game.grid();
    let Some(board) = required_size(grid) else {
        return;
    };
    let (term_width, _) = term.get_terminal_size();
    let origin = (term_width.saturating_sub(board.0) / 2, 1);
    term.draw_borders(origin, (board.0, board.1 - 1));

    let cell_pos = |(row, col): Cell| (origin.0 + 1 + col as TermInt * 2, origin.1 + 1 + row as TermInt);
    let put = |term: &mut TermManager<W>, cell: Cell, glyph: [char; 2], color: Color| {
        let pos = cell_pos(cell);
        term.print_at(pos, glyph[0], color);
        term.print_at((pos.0 + 1, pos.1), glyph[1], color);
    };

    if let Some(hud) = game.hud_line() {
        term.print_str_at((origin.0, 0), &hud, Color::White);
    }

    if let Some(level) = game.level() {
        if let Some(food) = level.food() {
            put(term, food, FOOD, Color::DarkYellow);
        }

        let dead = matches!(game.screen(), Screen::GameOver(_));
        let head = level.worm().head();
        for &pos in level.worm().cells() {
            let (glyph, color) = if dead {
                (DEAD_WORM, Color::Red)
            } else if pos == head {
                let ch = level.direction().head_char();
                ([ch, ch], Color::Green)
            } else {
                (WORM_BODY, Color::DarkGreen)
            };
            put(term, pos, glyph, color);
        }
    }

    let lines = game.overlay_lines();
    if !lines.is_empty() {
        term.show_message(&lines);
    }
}

fn run_loop<R: Rng, W: Write>(term: &mut TermManager<W>, game: &mut Game<R>) -> Result<(), GameError> {
    let mut last_frame = Instant::now();

    loop {
        for input in term.read_inputs()? {
            if game.handle_input(input) == Flow::Exit {
                return Ok(());
            }
        }

        let now = Instant::now();
        game.update(now - last_frame);
        last_frame = now;

        draw(term, game);
        term.present()?;

        sleep(Duration::from_millis(FRAME_INTERVAL_MS));
    }
}

/// Plays in the current terminal until the player quits.
pub fn run<R: Rng>(game: &mut Game<R>) -> Result<(), GameError> {
    let mut term = TermManager::stdout()?;
    let (columns, rows) = term.get_terminal_size();
    let needed = required_size(game.grid()).unwrap_or((TermInt::MAX, TermInt::MAX));
    if columns < needed.0 || rows < needed.1 {
        return Err(GameError::TerminalTooSmall { columns, rows, needed_columns: needed.0, needed_rows: needed.1 });
    }

    info!(columns, rows, "Entering terminal mode");
    term.setup()?;
    let result = run_loop(&mut term, game);
    term.restore();
    result
}
