//! Graphical presentation in a desktop window, drawn with macroquad.
//!
//! Macroquad is pulled in without its default `audio` feature so the crate
//! builds on hosts without ALSA development headers.

use std::time::Duration;

use macroquad::color::Color;
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::shapes::{draw_line, draw_rectangle};
use macroquad::text::{draw_text, measure_text};
use rand::Rng;
use tracing::info;

use crate::game::{Flow, Game, Input, Screen, TITLE};
use crate::state::LevelState;
use crate::worm::Direction::*;
use crate::Cell;

pub const CELL_SIZE: f32 = 20.0;

const HUD_FONT_SIZE: u16 = 22;
const OVERLAY_FONT_SIZE: u16 = 32;
const LINE_GAP: f32 = 6.0;

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgba(r, g, b, 255)
}

struct Palette {
    background_top: Color,
    background_bottom: Color,
    grid: Color,
    head: Color,
    body: Color,
    food: Color,
    text: Color,
    accent: Color,
}

impl Palette {
    fn new() -> Self {
        Palette {
            background_top: rgb(18, 28, 60),
            background_bottom: rgb(8, 12, 26),
            grid: rgb(38, 48, 78),
            head: rgb(144, 255, 188),
            body: rgb(78, 214, 144),
            food: rgb(255, 140, 70),
            text: rgb(234, 242, 255),
            accent: rgb(120, 180, 255),
        }
    }
}

/// Keys pressed since the last frame, in a fixed order.
fn poll_inputs() -> Vec<Input> {
    const BINDINGS: [(KeyCode, Input); 13] = [
        (KeyCode::Up, Input::Turn(Up)),
        (KeyCode::W, Input::Turn(Up)),
        (KeyCode::Down, Input::Turn(Down)),
        (KeyCode::S, Input::Turn(Down)),
        (KeyCode::Left, Input::Turn(Left)),
        (KeyCode::A, Input::Turn(Left)),
        (KeyCode::Right, Input::Turn(Right)),
        (KeyCode::D, Input::Turn(Right)),
        (KeyCode::Enter, Input::Confirm),
        (KeyCode::KpEnter, Input::Confirm),
        (KeyCode::Space, Input::Confirm),
        (KeyCode::Escape, Input::Back),
        (KeyCode::Q, Input::Quit),
    ];

    BINDINGS
        .iter()
        .filter(|(key, _)| is_key_pressed(*key))
        .map(|(_, input)| *input)
        .collect()
}

fn draw_background(palette: &Palette, width: f32, height: f32) {
    let rows = height as u32;
    for y in 0..rows {
        let mix = y as f32 / height;
        let blend = |top: f32, bottom: f32| top * (1.0 - mix) + bottom * mix;
        let color = Color::new(
            blend(palette.background_top.r, palette.background_bottom.r),
            blend(palette.background_top.g, palette.background_bottom.g),
            blend(palette.background_top.b, palette.background_bottom.b),
            1.0,
        );
        draw_line(0.0, y as f32, width, y as f32, 1.0, color);
    }
}

fn draw_grid(palette: &Palette, width: f32, height: f32) {
    let mut x = 0.0;
    while x < width {
        draw_line(x, 0.0, x, height, 1.0, palette.grid);
        x += CELL_SIZE;
    }
    let mut y = 0.0;
    while y < height {
        draw_line(0.0, y, width, y, 1.0, palette.grid);
        y += CELL_SIZE;
    }
}

fn draw_cell((row, col): Cell, inset: f32, color: Color) {
    draw_rectangle(
        col as f32 * CELL_SIZE + inset,
        row as f32 * CELL_SIZE + inset,
        CELL_SIZE - 2.0 * inset,
        CELL_SIZE - 2.0 * inset,
        color,
    );
}

fn draw_center_text(lines: &[String], width: f32, height: f32, color: Color) {
    let line_height = OVERLAY_FONT_SIZE as f32 + LINE_GAP;
    let total_height = line_height * lines.len() as f32;
    let mut y = (height - total_height) / 2.0 + OVERLAY_FONT_SIZE as f32;

    for line in lines {
        let dims = measure_text(line, None, OVERLAY_FONT_SIZE, 1.0);
        draw_text(line, (width - dims.width) / 2.0, y, OVERLAY_FONT_SIZE as f32, color);
        y += line_height;
    }
}

/// Level whose board is drawn under the overlay. The game-over screen shows
/// only the message, like the menu.
fn visible_level(screen: &Screen) -> Option<&LevelState> {
    match screen {
        Screen::Playing(level) | Screen::LevelComplete(level) => Some(level),
        Screen::Menu | Screen::GameOver(_) => None,
    }
}

fn draw_frame<R: Rng>(game: &Game<R>, palette: &Palette, width: f32, height: f32) {
    draw_background(palette, width, height);
    draw_grid(palette, width, height);

    if let Some(level) = visible_level(game.screen()) {
        let head = level.worm().head();
        for &pos in level.worm().cells() {
            let color = if pos == head {palette.head} else {palette.body};
            draw_cell(pos, 1.0, color);
        }
        if let Some(food) = level.food() {
            draw_cell(food, 3.0, palette.food);
        }
        if let Some(hud) = game.hud_line() {
            draw_text(&hud, 16.0, 12.0 + HUD_FONT_SIZE as f32, HUD_FONT_SIZE as f32, palette.text);
        }
    }

    let lines = game.overlay_lines();
    if !lines.is_empty() {
        let color = if matches!(game.screen(), Screen::Menu) {palette.accent} else {palette.text};
        draw_center_text(&lines, width, height, color);
    }
}

/// Opens a window sized to the grid and plays until the player quits or
/// closes it.
pub fn run<R: Rng + 'static>(game: Game<R>) {
    let width = game.grid().width() as f32 * CELL_SIZE;
    let height = game.grid().height() as f32 * CELL_SIZE;
    info!(width, height, "Opening game window");

    let config = macroquad::window::Conf {
        window_title: TITLE.to_owned(),
        window_width: width as i32,
        window_height: height as i32,
        window_resizable: false,
        ..macroquad::window::Conf::default()
    };

    macroquad::Window::from_config(config, async move {
        let mut game = game;
        let palette = Palette::new();

        'frames: loop {
            for input in poll_inputs() {
                if game.handle_input(input) == Flow::Exit {
                    break 'frames;
                }
            }

            let dt = macroquad::time::get_frame_time().max(0.0);
            game.update(Duration::from_secs_f32(dt));

            draw_frame(&game, &palette, width, height);
            macroquad::window::next_frame().await;
        }

        info!("Window game loop finished");
    });
}
