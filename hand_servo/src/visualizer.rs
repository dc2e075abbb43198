//! Software-rendered visualizer using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ thumb: up                          press q to quit   │
//! │ index: down        ___                               │
//! │ ...             (  arcs  )  · orbiting dots          │
//! │                 ( ~hand~ )    landmark trails        │
//! │                  [Hand Status]                       │
//! │ status bar: payload, frame counters                  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! The window doubles as the simulation input surface: key presses are
//! translated to [`SimKey`] events and forwarded to the hand source.

use minifb::{Key, KeyRepeat, Window, WindowOptions};

use std::sync::mpsc::Sender;

use finger_state::{Finger, FingerStatus};
use hand_model::LandmarkSet;

use crate::overlay::{OverlayState, ARC_RADII, ARC_SPAN_DEG, DOT_RADIUS};
use crate::source::SimKey;

// ════════════════════════════════════════════════════════════════════════════
// Palette and layout constants
// ════════════════════════════════════════════════════════════════════════════

const BG_COLOR: u32 = 0xFF101018;
/// White — landmark dots, arcs, and trail threads all share it.
const OVERLAY_COLOR: u32 = 0xFFFFFFFF;
const PANEL_COLOR: u32 = 0xFFFFFFFF;
const PANEL_TEXT: u32 = 0xFF000000;
const HUD_BG: u32 = 0xFF0F3460;
const HUD_TEXT: u32 = 0xFFEEEEEE;
const DIM_TEXT: u32 = 0xFF888888;

const STATUS_LINE_H: usize = 14;
const HUD_H: usize = 36;

// ════════════════════════════════════════════════════════════════════════════
// Visualizer
// ════════════════════════════════════════════════════════════════════════════

pub struct Visualizer {
    window: Window,
    buf: Vec<u32>,
    width: usize,
    height: usize,
    sim_tx: Sender<SimKey>,
}

impl Visualizer {
    pub fn new(width: usize, height: usize, sim_tx: Sender<SimKey>) -> Result<Self, String> {
        let mut window = Window::new(
            "Hand Servo — Finger Tracking",
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16))); // ~60fps

        Ok(Visualizer {
            window,
            buf: vec![BG_COLOR; width * height],
            width,
            height,
            sim_tx,
        })
    }

    /// Returns false when the window should close.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Poll keyboard input and forward it to the hand source.
    ///
    /// Returns false on quit (the `Q` key or a closed window).
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() {
            return false;
        }

        // Toggles fire on first press only
        let one_shot = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);
        // Movement repeats while held
        let held = |k: Key| self.window.is_key_pressed(k, KeyRepeat::Yes);

        if one_shot(Key::Q) {
            let _ = self.sim_tx.send(SimKey::Quit);
            return false;
        }

        let toggles = [
            (Key::Key1, SimKey::ToggleThumb),
            (Key::Key2, SimKey::ToggleIndex),
            (Key::Key3, SimKey::ToggleMiddle),
            (Key::Key4, SimKey::ToggleRing),
            (Key::Key5, SimKey::TogglePinky),
            (Key::H, SimKey::ToggleHand),
        ];
        for (key, sim) in toggles {
            if one_shot(key) {
                let _ = self.sim_tx.send(sim);
            }
        }

        let moves = [
            (Key::Left, SimKey::MoveLeft),
            (Key::Right, SimKey::MoveRight),
            (Key::Up, SimKey::MoveUp),
            (Key::Down, SimKey::MoveDown),
        ];
        for (key, sim) in moves {
            if held(key) {
                let _ = self.sim_tx.send(sim);
            }
        }

        true
    }

    /// Render one frame.
    pub fn render(
        &mut self,
        hand: Option<&LandmarkSet>,
        overlay: &OverlayState,
        status: &FingerStatus,
        hud: &str,
    ) {
        // Clear
        self.buf.fill(BG_COLOR);

        if let Some(hand) = hand {
            let bounds = hand.bounds(self.width as u32, self.height as u32);
            let center = bounds.center();
            let radius = bounds.radius();

            // ── Landmark trails ───────────────────────────────────────────
            for &(from, to) in overlay.trail() {
                self.draw_line(from, to, OVERLAY_COLOR);
            }

            // ── Landmark dots ─────────────────────────────────────────────
            for lm in hand.iter() {
                let p = lm.pixel(self.width as u32, self.height as u32);
                self.fill_circle(p, 2, OVERLAY_COLOR);
            }

            // ── Rotating concentric arcs ──────────────────────────────────
            let start = overlay.arc_angle();
            for r in ARC_RADII {
                self.draw_arc(center, r, start, start + ARC_SPAN_DEG, OVERLAY_COLOR);
            }

            // ── Orbiting dots ─────────────────────────────────────────────
            for dot in overlay.dot_positions(center, radius) {
                self.fill_circle(dot, DOT_RADIUS, OVERLAY_COLOR);
            }

            // ── Hand Status panel below the hand ──────────────────────────
            self.draw_status_panel(center);

            // ── Per-finger labels, stacked top-left ───────────────────────
            for (i, finger) in Finger::ALL.into_iter().enumerate() {
                let line = format!("{}: {}", finger.name(), status.label(finger).name());
                self.draw_label(&line, 10, 10 + i * STATUS_LINE_H, HUD_TEXT);
            }
        }

        // ── Quit hint, top-right ──────────────────────────────────────────
        self.draw_label(
            "press q to quit",
            self.width.saturating_sub(75),
            10,
            DIM_TEXT,
        );

        // ── Status bar ────────────────────────────────────────────────────
        let hud_y = self.height - HUD_H;
        self.fill_rect(0, hud_y, self.width, HUD_H, HUD_BG);
        self.draw_label(hud, 10, hud_y + 8, HUD_TEXT);
        self.draw_label(
            "1-5=fingers  h=hand  arrows=move  q=quit",
            10,
            self.height - 12,
            DIM_TEXT,
        );

        self.window
            .update_with_buffer(&self.buf, self.width, self.height)
            .ok();
    }

    // ── Hand Status panel ─────────────────────────────────────────────────

    fn draw_status_panel(&mut self, center: (i32, i32)) {
        let text = "Hand Status";
        let text_w = text.len() as i32 * 4;

        let x0 = center.0 - 100;
        let y0 = center.1 + 50;
        let x1 = center.0 + 100 + text_w / 2;
        let y1 = center.1 + 90;
        if x1 <= x0 || y1 <= y0 {
            return;
        }

        let (w, h) = ((x1 - x0) as usize, (y1 - y0) as usize);
        let (px, py) = (x0.max(0) as usize, y0.max(0) as usize);
        self.fill_rect(px, py, w, h, PANEL_COLOR);
        self.draw_border(px, py, w, h, PANEL_TEXT);
        self.draw_label(text, px + 20, py + h / 2 - 2, PANEL_TEXT);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(self.height) {
            for col in x..(x + w).min(self.width) {
                self.buf[row * self.width + col] = color;
            }
        }
    }

    fn draw_border(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for col in x..(x + w).min(self.width) {
            if y < self.height {
                self.buf[y * self.width + col] = color;
            }
            if y + h - 1 < self.height {
                self.buf[(y + h - 1) * self.width + col] = color;
            }
        }
        for row in y..(y + h).min(self.height) {
            if x < self.width {
                self.buf[row * self.width + x] = color;
            }
            if x + w - 1 < self.width {
                self.buf[row * self.width + x + w - 1] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.buf[y as usize * self.width + x as usize] = color;
        }
    }

    /// Bresenham line between two pixel positions.
    fn draw_line(&mut self, from: (i32, i32), to: (i32, i32), color: u32) {
        let (mut x, mut y) = from;
        let (x1, y1) = to;
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.set_pixel(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn fill_circle(&mut self, center: (i32, i32), radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(center.0 + dx, center.1 + dy, color);
                }
            }
        }
    }

    /// Thin arc from `start_deg` to `end_deg` (clockwise, y-down screen
    /// coordinates), stepped finely enough to stay gap-free at our radii.
    fn draw_arc(&mut self, center: (i32, i32), radius: i32, start_deg: f32, end_deg: f32, color: u32) {
        let mut deg = start_deg;
        while deg <= end_deg {
            let rad = deg.to_radians();
            let x = center.0 + (radius as f32 * rad.cos()) as i32;
            let y = center.1 + (radius as f32 * rad.sin()) as i32;
            self.set_pixel(x, y, color);
            deg += 0.5;
        }
    }

    /// Minimal bitmap font — 3×5 characters for label rendering.
    fn draw_label(&mut self, text: &str, x: usize, y: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3usize {
                    if bits & (1 << (2 - col)) != 0 {
                        self.set_pixel((cx + col) as i32, (y + row) as i32, color);
                    }
                }
            }
            cx += 4; // 3 wide + 1 gap
            if cx + 4 > self.width {
                break;
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

fn char_glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'a' | 'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'b' | 'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'c' | 'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'd' | 'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'e' | 'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'f' | 'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'g' | 'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'h' | 'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'i' | 'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'j' | 'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'k' | 'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'l' | 'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'm' | 'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'n' | 'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'o' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'p' | 'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'q' | 'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'r' | 'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        's' | 'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        't' | 'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'u' | 'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'v' | 'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'w' | 'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'x' | 'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'y' | 'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'z' | 'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _ => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
