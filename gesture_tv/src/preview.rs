//! Software-rendered preview window using `minifb`.
//!
//! Layout:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  GESTURE LABEL                               │
//! │                                              │
//! │              hand skeleton                   │
//! │        (normalized coords × window)          │
//! │                                              │
//! │  status bar                                  │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! The window also acts as the simulation keyboard: key presses become
//! [`SimKey`]s for the [`SimFrameSource`](crate::source::SimFrameSource).

use std::sync::mpsc::Sender;

use hand_pose::{Gesture, Hand, HandLandmark};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::source::SimKey;

pub const WIN_W:     usize = 640;
pub const WIN_H:     usize = 520;
const LABEL_H:       usize = 40;
const STATUS_H:      usize = 32;
const STATUS_Y:      usize = WIN_H - STATUS_H;
const BG_COLOR:      u32   = 0xFF1A1A2E;
const BAR_COLOR:     u32   = 0xFF0F3460;
const BONE_COLOR:    u32   = 0xFF8FA3BF;
const JOINT_COLOR:   u32   = 0xFFE0E0E0;
const TIP_COLOR:     u32   = 0xFFFFD700;
const IDLE_TEXT:     u32   = 0xFF7F8C8D;

const TIPS: [HandLandmark; 5] = [
    HandLandmark::ThumbTip,
    HandLandmark::IndexTip,
    HandLandmark::MiddleTip,
    HandLandmark::RingTip,
    HandLandmark::PinkyTip,
];

pub struct Preview {
    window: Window,
    buf:    Vec<u32>,
    sim_tx: Sender<SimKey>,
}

impl Preview {
    pub fn new(sim_tx: Sender<SimKey>) -> Result<Self, String> {
        let mut window = Window::new(
            "Gesture TV - U/D thumbs  ←/→ swipe  Space stop  N rest  Q quit",
            WIN_W, WIN_H,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        ).map_err(|e| e.to_string())?;

        window.limit_update_rate(Some(std::time::Duration::from_millis(16)));

        Ok(Preview {
            window,
            buf: vec![BG_COLOR; WIN_W * WIN_H],
            sim_tx,
        })
    }

    pub fn is_open(&self) -> bool { self.window.is_open() }

    /// Translate key presses into [`SimKey`]s.  Returns false on quit.
    pub fn poll_input(&mut self) -> bool {
        if !self.window.is_open() { return false; }

        let pressed = |k: Key| self.window.is_key_pressed(k, KeyRepeat::No);

        if pressed(Key::Q) || pressed(Key::Escape) {
            let _ = self.sim_tx.send(SimKey::Quit);
            return false;
        }

        let bindings = [
            (Key::U,     SimKey::ThumbsUp),
            (Key::D,     SimKey::ThumbsDown),
            (Key::Left,  SimKey::SwipeLeft),
            (Key::L,     SimKey::SwipeLeft),
            (Key::Right, SimKey::SwipeRight),
            (Key::R,     SimKey::SwipeRight),
            (Key::Space, SimKey::OpenPalm),
            (Key::S,     SimKey::OpenPalm),
            (Key::N,     SimKey::Rest),
        ];
        for (key, sim) in bindings {
            if pressed(key) {
                let _ = self.sim_tx.send(sim);
            }
        }
        true
    }

    pub fn render(&mut self, hand: Option<&Hand>, gesture: Option<Gesture>, status: &str) {
        self.buf.fill(BG_COLOR);

        // ── label bar ─────────────────────────────────────────────────────
        self.fill_rect(0, 0, WIN_W, LABEL_H, BAR_COLOR);
        match gesture {
            Some(g) => self.draw_text(g.as_str(), 12, 10, 4, gesture_color(g)),
            None    => self.draw_text("no gesture", 12, 10, 4, IDLE_TEXT),
        }

        // ── skeleton ──────────────────────────────────────────────────────
        if let Some(hand) = hand {
            for (a, b) in HandLandmark::BONES {
                let (x0, y0) = to_pixel(hand[a].x, hand[a].y);
                let (x1, y1) = to_pixel(hand[b].x, hand[b].y);
                self.draw_line(x0, y0, x1, y1, BONE_COLOR);
            }
            for lm in HandLandmark::ALL {
                let (x, y) = to_pixel(hand[lm].x, hand[lm].y);
                let (r, color) = if TIPS.contains(&lm) { (4, TIP_COLOR) } else { (2, JOINT_COLOR) };
                self.draw_dot(x, y, r, color);
            }
        } else {
            self.draw_text("waiting for a hand", WIN_W / 2 - 140, WIN_H / 2, 4, IDLE_TEXT);
        }

        // ── status bar ────────────────────────────────────────────────────
        self.fill_rect(0, STATUS_Y, WIN_W, STATUS_H, BAR_COLOR);
        self.draw_text(status, 12, STATUS_Y + 10, 2, JOINT_COLOR);

        let _ = self.window.update_with_buffer(&self.buf, WIN_W, WIN_H);
    }

    // ── Primitive drawing helpers ─────────────────────────────────────────

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: u32) {
        for row in y..(y + h).min(WIN_H) {
            for col in x..(x + w).min(WIN_W) {
                self.buf[row * WIN_W + col] = color;
            }
        }
    }

    fn set_pixel(&mut self, x: isize, y: isize, color: u32) {
        if x >= 0 && y >= 0 && (x as usize) < WIN_W && (y as usize) < WIN_H {
            self.buf[y as usize * WIN_W + x as usize] = color;
        }
    }

    fn draw_dot(&mut self, cx: isize, cy: isize, r: isize, color: u32) {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx * dx + dy * dy <= r * r {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn draw_line(&mut self, x0: isize, y0: isize, x1: isize, y1: isize, color: u32) {
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1);
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 as f32 + (x1 - x0) as f32 * t;
            let y = y0 as f32 + (y1 - y0) as f32 * t;
            self.set_pixel(x.round() as isize, y.round() as isize, color);
        }
    }

    /// 3×5 bitmap text, each font pixel drawn as a `scale`×`scale` block.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: u32) {
        let mut cx = x;
        for ch in text.chars() {
            let bits = glyph(ch);
            for row in 0..5 {
                for col in 0..3 {
                    if bits & (1 << ((4 - row) * 3 + (2 - col))) != 0 {
                        self.fill_rect(cx + col * scale, y + row * scale, scale, scale, color);
                    }
                }
            }
            cx += 4 * scale;
            if cx + 4 * scale > WIN_W { break; }
        }
    }
}

/// Map normalized landmark coordinates into the area between the bars.
fn to_pixel(x: f32, y: f32) -> (isize, isize) {
    let area_h = (STATUS_Y - LABEL_H) as f32;
    let px = x.clamp(0.0, 1.0) * (WIN_W - 1) as f32;
    let py = LABEL_H as f32 + y.clamp(0.0, 1.0) * area_h;
    (px.round() as isize, py.round() as isize)
}

fn gesture_color(g: Gesture) -> u32 {
    match g {
        Gesture::ThumbsUp   => 0xFF2ECC71,
        Gesture::ThumbsDown => 0xFFE74C3C,
        Gesture::LeftSwipe | Gesture::RightSwipe => 0xFF3498DB,
        Gesture::Stop       => 0xFFF1C40F,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3×5 bitmap font: one octal digit per row, top row first
// ────────────────────────────────────────────────────────────────────────────

const FONT: [(char, u16); 44] = [
    ('0', 0o75557), ('1', 0o26227), ('2', 0o71747), ('3', 0o71717), ('4', 0o55711), ('5', 0o74717),
    ('6', 0o74757), ('7', 0o71111), ('8', 0o75757), ('9', 0o75717), ('A', 0o75755), ('B', 0o65656),
    ('C', 0o74447), ('D', 0o65556), ('E', 0o74747), ('F', 0o74744), ('G', 0o74557), ('H', 0o55755),
    ('I', 0o72227), ('J', 0o11157), ('K', 0o55655), ('L', 0o44447), ('M', 0o57555), ('N', 0o75555),
    ('O', 0o75557), ('P', 0o75744), ('Q', 0o75571), ('R', 0o65655), ('S', 0o74717), ('T', 0o72222),
    ('U', 0o55557), ('V', 0o55522), ('W', 0o55575), ('X', 0o55255), ('Y', 0o55722), ('Z', 0o71247),
    ('_', 0o00007), ('-', 0o00700), ('.', 0o00002), (':', 0o02020), ('/', 0o11244), ('(', 0o24442),
    (')', 0o21112), (' ', 0o00000),
];

fn glyph(c: char) -> u16 {
    let c = c.to_ascii_uppercase();
    FONT.iter()
        .find(|(k, _)| *k == c)
        .map(|&(_, bits)| bits)
        .unwrap_or(0o00200) // unknown: centre dot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_map_inside_the_hand_area() {
        assert_eq!(to_pixel(0.0, 0.0), (0, LABEL_H as isize));
        assert_eq!(to_pixel(1.0, 1.0), ((WIN_W - 1) as isize, STATUS_Y as isize));
        assert_eq!(to_pixel(-3.0, 7.0), to_pixel(0.0, 1.0));
    }

    #[test]
    fn glyph_lookup_is_case_insensitive() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('_'), 0o00007);
        assert_eq!(glyph('~'), 0o00200);
    }
}
