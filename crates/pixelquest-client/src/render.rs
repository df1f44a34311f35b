//! Draws a `Session` into a grid of terminal cells.
//!
//! World coordinates (pixels, y down) are scaled into the cell grid by a
//! `Projection`. Drawing is pure over a `Canvas`; only `Canvas::present`
//! touches the terminal.

use std::io::{self, Write};

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Color, Print},
};

use pixelquest_core::geometry::Rect;
use pixelquest_platformer::level_gen::PlatformKind;
use pixelquest_platformer::overworld::{FINAL_NODE, OverworldNode};
use pixelquest_platformer::stage::Stage;
use pixelquest_platformer::{Banner, Mode, Session};

use crate::theme::{Glyph, Theme};

/// Smallest grid the game is drawn into.
pub const MIN_COLS: u16 = 40;
pub const MIN_ROWS: u16 = 12;

/// Border around the node cloud on the map, in world pixels.
const MAP_MARGIN: f32 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub fg: Color,
    pub bg: Color,
}

pub struct Canvas {
    cols: u16,
    rows: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let blank = Cell {
            symbol: ' ',
            fg: Color::White,
            bg: Color::Black,
        };
        Self {
            cols,
            rows,
            cells: vec![blank; usize::from(cols) * usize::from(rows)],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn get(&self, col: u16, row: u16) -> Option<Cell> {
        self.index(col, row).map(|i| self.cells[i])
    }

    fn index(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.cols && row < self.rows)
            .then(|| usize::from(row) * usize::from(self.cols) + usize::from(col))
    }

    pub fn clear(&mut self, bg: Color) {
        for cell in &mut self.cells {
            *cell = Cell {
                symbol: ' ',
                fg: Color::White,
                bg,
            };
        }
    }

    /// Set a cell's symbol and foreground, keeping its background.
    pub fn put(&mut self, col: u16, row: u16, glyph: Glyph) {
        if let Some(i) = self.index(col, row) {
            self.cells[i].symbol = glyph.symbol;
            self.cells[i].fg = glyph.color;
        }
    }

    pub fn text(&mut self, col: u16, row: u16, text: &str, color: Color) {
        for (offset, symbol) in text.chars().enumerate() {
            let Ok(offset) = u16::try_from(offset) else {
                break;
            };
            self.put(col.saturating_add(offset), row, Glyph::new(symbol, color));
        }
    }

    pub fn text_centered(&mut self, row: u16, text: &str, color: Color) {
        let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        self.text(self.cols.saturating_sub(len) / 2, row, text, color);
    }

    /// Fill the cells covered by `rect` under `projection`.
    pub fn fill(&mut self, projection: &Projection, rect: &Rect, glyph: Glyph) {
        let Some(((c0, c1), (r0, r1))) = projection.cells(rect) else {
            return;
        };
        for row in r0..=r1 {
            for col in c0..=c1 {
                self.put(col, row, glyph);
            }
        }
    }

    pub fn present<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let mut current: Option<(Color, Color)> = None;
        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            for col in 0..self.cols {
                let Some(cell) = self.get(col, row) else {
                    continue;
                };
                if current != Some((cell.fg, cell.bg)) {
                    out.queue(style::SetForegroundColor(cell.fg))?;
                    out.queue(style::SetBackgroundColor(cell.bg))?;
                    current = Some((cell.fg, cell.bg));
                }
                out.queue(Print(cell.symbol))?;
            }
        }
        out.queue(style::ResetColor)?;
        out.flush()
    }
}

/// Maps a world-space viewport onto a block of canvas cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    viewport: Rect,
    col: u16,
    row: u16,
    cols: u16,
    rows: u16,
}

impl Projection {
    pub fn new(viewport: Rect, col: u16, row: u16, cols: u16, rows: u16) -> Self {
        Self {
            viewport,
            col,
            row,
            cols,
            rows,
        }
    }

    /// Cell holding the world point `(x, y)`, if it is inside the viewport.
    pub fn point(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = axis_index(x, self.viewport.x, self.viewport.w, self.cols)?;
        let row = axis_index(y, self.viewport.y, self.viewport.h, self.rows)?;
        Some((self.col + col, self.row + row))
    }

    /// Inclusive column and row ranges covered by `rect`, clipped to the
    /// viewport. Anything visible covers at least one cell.
    pub fn cells(&self, rect: &Rect) -> Option<((u16, u16), (u16, u16))> {
        let cols = axis_span(
            rect.left(),
            rect.right(),
            self.viewport.x,
            self.viewport.w,
            self.cols,
        )?;
        let rows = axis_span(
            rect.top(),
            rect.bottom(),
            self.viewport.y,
            self.viewport.h,
            self.rows,
        )?;
        Some((
            (self.col + cols.0, self.col + cols.1),
            (self.row + rows.0, self.row + rows.1),
        ))
    }
}

fn scaled(value: f32, origin: f32, extent: f32, cells: u16) -> f32 {
    (value - origin) / extent * f32::from(cells)
}

fn axis_index(value: f32, origin: f32, extent: f32, cells: u16) -> Option<u16> {
    let scaled = scaled(value, origin, extent, cells).floor();
    (scaled >= 0.0 && scaled < f32::from(cells)).then_some(scaled as u16)
}

fn axis_span(start: f32, end: f32, origin: f32, extent: f32, cells: u16) -> Option<(u16, u16)> {
    if cells == 0 || extent <= 0.0 {
        return None;
    }
    let first = scaled(start, origin, extent, cells).floor();
    let last = (scaled(end, origin, extent, cells).ceil() - 1.0).max(first);
    let max = f32::from(cells - 1);
    if last < 0.0 || first > max {
        return None;
    }
    Some((first.max(0.0) as u16, last.min(max) as u16))
}

/// Draw the whole frame for the session's current mode.
pub fn draw(canvas: &mut Canvas, session: &Session, theme: &Theme) {
    if canvas.cols() < MIN_COLS || canvas.rows() < MIN_ROWS {
        canvas.clear(Color::Black);
        canvas.text(0, 0, "Terminal too small", Color::White);
        return;
    }
    match session.mode() {
        Mode::Overworld => draw_overworld(canvas, session, theme),
        Mode::Level | Mode::Boss => match session.stage() {
            Some(stage) => draw_stage(canvas, session, stage, theme),
            None => draw_overworld(canvas, session, theme),
        },
        Mode::Banner(banner) => draw_banner(canvas, session, banner, theme),
        Mode::Finished => canvas.clear(Color::Black),
    }
}

/// Play area: every row between the HUD line and the footer line.
fn play_area(canvas: &Canvas, viewport: Rect) -> Projection {
    Projection::new(viewport, 0, 1, canvas.cols(), canvas.rows() - 2)
}

fn node_label(node: &OverworldNode) -> String {
    if node.id == FINAL_NODE {
        "Final".to_string()
    } else if node.is_boss {
        format!("{}-B", node.world)
    } else {
        format!("{}-{}", node.world, node.level_num)
    }
}

fn stage_title(node: &OverworldNode) -> String {
    if node.id == FINAL_NODE {
        "Final Castle".to_string()
    } else if node.is_boss {
        format!("World {} - Boss", node.world)
    } else {
        format!("World {} - Level {}", node.world, node.level_num)
    }
}

fn map_viewport(nodes: &[OverworldNode]) -> Rect {
    let mut bounds: Option<(f32, f32, f32, f32)> = None;
    for node in nodes {
        let (x, y) = node.pos;
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let (x0, y0, x1, y1) = bounds.unwrap_or((0.0, 0.0, 0.0, 0.0));
    Rect::new(
        x0 - MAP_MARGIN,
        y0 - MAP_MARGIN,
        x1 - x0 + 2.0 * MAP_MARGIN,
        y1 - y0 + 2.0 * MAP_MARGIN,
    )
}

fn draw_overworld(canvas: &mut Canvas, session: &Session, theme: &Theme) {
    canvas.clear(theme.map_sky);
    let overworld = session.overworld();
    let projection = play_area(canvas, map_viewport(overworld.nodes()));

    for &(a, b) in overworld.edges() {
        let (Some(from), Some(to)) = (overworld.node(a), overworld.node(b)) else {
            continue;
        };
        draw_path(canvas, &projection, from.pos, to.pos, theme.map_path);
    }

    for node in overworld.nodes() {
        let glyph = if node.completed {
            theme.node_done
        } else if node.is_boss {
            theme.node_boss
        } else {
            theme.node_open
        };
        if let Some((col, row)) = projection.point(node.pos.0, node.pos.1) {
            canvas.put(col, row, glyph);
            let label = node_label(node);
            let half = u16::try_from(label.len() / 2).unwrap_or(0);
            canvas.text(col.saturating_sub(half), row + 1, &label, theme.hud);
        }
    }

    let (mx, my) = overworld.marker_pos();
    if let Some((col, row)) = projection.point(mx, my) {
        canvas.put(col, row, theme.player);
    }

    let here = overworld.current_node();
    let header = format!(
        "{}   Score {}   Lives {}",
        stage_title(here),
        session.player().score,
        session.player().lives
    );
    canvas.text(1, 0, &header, theme.hud);
    canvas.text(
        1,
        canvas.rows() - 1,
        "Left/Right: walk | Enter: play | Esc: quit",
        theme.hud,
    );
}

/// Dotted line between two world points.
fn draw_path(
    canvas: &mut Canvas,
    projection: &Projection,
    from: (f32, f32),
    to: (f32, f32),
    glyph: Glyph,
) {
    let steps = 32;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let x = from.0 + (to.0 - from.0) * t;
        let y = from.1 + (to.1 - from.1) * t;
        if let Some((col, row)) = projection.point(x, y) {
            canvas.put(col, row, glyph);
        }
    }
}

fn draw_stage(canvas: &mut Canvas, session: &Session, stage: &Stage, theme: &Theme) {
    let world = theme.world(stage.world());
    canvas.clear(world.sky);
    let screen = session.config().screen;
    let projection = play_area(canvas, Rect::new(0.0, 0.0, screen.width, screen.height));

    let layout = stage.layout();
    for platform in &layout.platforms {
        let glyph = match platform.kind {
            PlatformKind::Lava => theme.lava,
            PlatformKind::Ground | PlatformKind::Ledge => world.platform,
        };
        canvas.fill(&projection, &platform.rect, glyph);
    }
    if let Some(exit) = &layout.exit {
        canvas.fill(&projection, exit, theme.exit);
    }
    for power_up in stage.power_ups() {
        canvas.fill(&projection, &power_up.rect, theme.power_up);
    }
    for enemy in stage.enemies() {
        canvas.fill(&projection, &enemy.rect, theme.enemy);
    }
    if let Some(boss) = stage.boss() {
        canvas.fill(&projection, &boss.rect(), theme.boss);
        for attack in boss.projectiles().iter().chain(boss.shockwaves()) {
            canvas.fill(&projection, attack, theme.attack);
        }
    }

    let player = session.player();
    // Blink while invincible.
    if !player.is_invincible() || (player.invincibility / 4) % 2 == 0 {
        canvas.fill(&projection, &player.rect(), theme.player);
    }

    let title = session
        .overworld()
        .node(stage.node())
        .map(stage_title)
        .unwrap_or_default();
    let hearts: String = (0..player.health).map(|_| '♥').collect();
    let hud = format!(
        "Score {}   Lives {}   Health {:<3}   {}",
        player.score, player.lives, hearts, title
    );
    canvas.text(1, 0, &hud, theme.hud);

    if let Some(boss) = stage.boss() {
        let bar = health_bar(boss.health(), boss.max_health(), 20);
        let label = format!("{} {bar}", boss.name());
        let len = u16::try_from(label.chars().count()).unwrap_or(0);
        canvas.text(canvas.cols().saturating_sub(len + 1), 0, &label, theme.boss.color);
    }

    canvas.text(
        1,
        canvas.rows() - 1,
        "Left/Right: move | Space: jump | Esc: map",
        theme.hud,
    );
}

/// Fixed-width bar: filled cells proportional to `health / max`.
pub fn health_bar(health: u32, max: u32, width: usize) -> String {
    let filled = if max == 0 {
        0
    } else {
        (health.min(max) as usize * width).div_ceil(max as usize)
    };
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('█', filled));
    bar.extend(std::iter::repeat_n('░', width - filled));
    bar
}

fn draw_banner(canvas: &mut Canvas, session: &Session, banner: Banner, theme: &Theme) {
    let bg = match banner {
        Banner::GameOver => theme.banner_loss,
        Banner::LevelComplete | Banner::BossDefeated | Banner::CampaignWon => theme.banner_win,
    };
    canvas.clear(bg);
    let middle = canvas.rows() / 2;
    canvas.text_centered(middle - 1, banner.title(), theme.hud);
    let score = format!("Score {}", session.player().score);
    canvas.text_centered(middle + 1, &score, theme.hud);
}
