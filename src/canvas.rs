//! Software framebuffer in minifb's `0x00RRGGBB` pixel format.

pub const WHITE: u32 = 0xFFFFFF;
pub const BLACK: u32 = 0x000000;
pub const GRID: u32 = 0xE0E0E0;
pub const FRAME: u32 = 0x404040;
pub const ACCENT: u32 = 0x1F77B4;
pub const PANEL: u32 = 0xF0F0F0;

/// Pixel rectangle, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Rect { x, y, w, h }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && py >= self.y as f32
            && px < (self.x + self.w) as f32
            && py < (self.y + self.h) as f32
    }

    pub fn right(&self) -> usize {
        self.x + self.w
    }

    pub fn bottom(&self) -> usize {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }
}

// 3x5 glyphs, one row per byte, high bit on the left.
const GLYPHS: &[(char, [u8; 5])] = &[
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b111, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b001, 0b001]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('a', [0b111, 0b101, 0b111, 0b101, 0b101]),
    ('b', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('c', [0b111, 0b100, 0b100, 0b100, 0b111]),
    ('d', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('e', [0b111, 0b100, 0b111, 0b100, 0b111]),
    ('f', [0b111, 0b100, 0b111, 0b100, 0b100]),
    ('g', [0b111, 0b100, 0b101, 0b101, 0b111]),
    ('h', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('i', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('j', [0b001, 0b001, 0b001, 0b101, 0b111]),
    ('k', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('l', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('m', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('n', [0b101, 0b111, 0b111, 0b111, 0b101]),
    ('o', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('p', [0b111, 0b101, 0b111, 0b100, 0b100]),
    ('q', [0b111, 0b101, 0b101, 0b111, 0b001]),
    ('r', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('s', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('t', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('u', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('v', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('w', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('x', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('y', [0b101, 0b101, 0b111, 0b010, 0b010]),
    ('z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('+', [0b000, 0b010, 0b111, 0b010, 0b000]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('_', [0b000, 0b000, 0b000, 0b000, 0b111]),
    ('*', [0b000, 0b101, 0b010, 0b101, 0b000]),
    ('%', [0b101, 0b001, 0b010, 0b100, 0b101]),
    ('=', [0b000, 0b111, 0b000, 0b111, 0b000]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
    ('(', [0b010, 0b100, 0b100, 0b100, 0b010]),
    (')', [0b010, 0b001, 0b001, 0b001, 0b010]),
];

fn glyph(ch: char) -> [u8; 5] {
    let ch = ch.to_ascii_lowercase();
    GLYPHS
        .iter()
        .find(|(c, _)| *c == ch)
        .map(|(_, rows)| *rows)
        .unwrap_or([0; 5])
}

/// Horizontal advance of one character at `scale`.
pub fn char_advance(scale: usize) -> usize {
    4 * scale
}

pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * char_advance(scale)
}

pub struct Canvas {
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { width, height, buffer: vec![WHITE; width * height] }
    }

    pub fn buffer(&self) -> &[u32] {
        &self.buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.buffer[y * self.width + x]
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    pub fn set(&mut self, x: i64, y: i64, color: u32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.buffer[y as usize * self.width + x as usize] = color;
    }

    /// Mixes `color` over the existing pixel with opacity `alpha`.
    pub fn blend(&mut self, x: i64, y: i64, color: u32, alpha: f32) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.buffer[idx] = mix(self.buffer[idx], color, alpha);
    }

    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let (mut x, mut y, mut err) = (x0, y0, dx + dy);

        loop {
            self.set(x, y, color);
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

    pub fn outline(&mut self, rect: Rect, color: u32) {
        if rect.is_empty() {
            return;
        }
        let (l, t) = (rect.x as i64, rect.y as i64);
        let (r, b) = ((rect.right() - 1) as i64, (rect.bottom() - 1) as i64);
        self.line(l, t, r, t, color);
        self.line(l, b, r, b, color);
        self.line(l, t, l, b, color);
        self.line(r, t, r, b, color);
    }

    pub fn fill(&mut self, rect: Rect, color: u32) {
        let right = rect.right().min(self.width);
        let bottom = rect.bottom().min(self.height);
        for y in rect.y.min(bottom)..bottom {
            self.buffer[y * self.width + rect.x.min(right)..y * self.width + right].fill(color);
        }
    }

    pub fn text(&mut self, x: usize, y: usize, text: &str, color: u32, scale: usize) {
        let mut offset_x = x;
        for ch in text.chars() {
            if offset_x + char_advance(scale) > self.width {
                break;
            }
            self.draw_glyph(offset_x, y, ch, color, scale);
            offset_x += char_advance(scale);
        }
    }

    fn draw_glyph(&mut self, x: usize, y: usize, ch: char, color: u32, scale: usize) {
        for (dy, &row) in glyph(ch).iter().enumerate() {
            for dx in 0..3 {
                if row & (1 << (2 - dx)) == 0 {
                    continue;
                }
                let px = x + dx * scale;
                let py = y + dy * scale;
                self.fill(Rect::new(px, py, scale, scale), color);
            }
        }
    }
}

fn mix(dst: u32, src: u32, alpha: f32) -> u32 {
    let alpha = alpha.clamp(0.0, 1.0);
    let channel = |shift: u32| {
        let d = ((dst >> shift) & 0xFF) as f32;
        let s = ((src >> shift) & 0xFF) as f32;
        ((s * alpha + d * (1.0 - alpha)).round() as u32) << shift
    };
    channel(16) | channel(8) | channel(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blending_darkens_progressively() {
        let mut canvas = Canvas::new(4, 4);
        canvas.blend(1, 1, BLACK, 0.25);
        let once = canvas.pixel(1, 1);
        canvas.blend(1, 1, BLACK, 0.25);
        let twice = canvas.pixel(1, 1);
        assert_eq!(once & 0xFF, 191);
        assert!(twice & 0xFF < once & 0xFF);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut canvas = Canvas::new(2, 2);
        canvas.set(-1, 0, BLACK);
        canvas.blend(5, 5, BLACK, 1.0);
        canvas.line(-3, -3, 3, 3, BLACK);
        assert_eq!(canvas.pixel(0, 0), BLACK);
        assert_eq!(canvas.pixel(1, 0), WHITE);
    }

    #[test]
    fn text_renders_known_glyph() {
        let mut canvas = Canvas::new(8, 8);
        canvas.text(0, 0, "1", BLACK, 1);
        // top row of '1' is 0b010
        assert_eq!(canvas.pixel(0, 0), WHITE);
        assert_eq!(canvas.pixel(1, 0), BLACK);
        assert_eq!(text_width("abc", 2), 24);
    }
}
