use font8x8::UnicodeFonts;
use std::{fs::File, io::BufWriter, path::Path};

/// Width and height of a glyph before scaling
pub const GLYPH_SIZE: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Black with the given opacity in 0..=1
    pub fn shade(opacity: f32) -> Self {
        Self::new(0, 0, 0, (opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Each pixel of the 8x8 font becomes a square this many pixels wide
    pub scale: u32,
    pub colour: Rgba,
}

/// An RGBA image that can be drawn on with rectangles and bitmap text
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

fn blend_channel(dst: u8, src: u8, alpha: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * (255 - alpha) + 127) / 255) as u8
}

impl Canvas {
    /// A fully transparent canvas
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = &self.pixels[i..i + 4];
        Some(Rgba::new(p[0], p[1], p[2], p[3]))
    }

    /// Composites `colour` over the pixel at (x, y). Coordinates off the canvas are ignored.
    fn blend(&mut self, x: i64, y: i64, colour: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64
        {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        let p = &mut self.pixels[i..i + 4];
        let alpha = colour.a as u32;
        p[0] = blend_channel(p[0], colour.r, alpha);
        p[1] = blend_channel(p[1], colour.g, alpha);
        p[2] = blend_channel(p[2], colour.b, alpha);
        p[3] = (alpha + p[3] as u32 * (255 - alpha) / 255) as u8;
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, colour: Rgba) {
        for py in y..(y + h) {
            for px in x..(x + w) {
                self.blend(px, py, colour);
            }
        }
    }

    /// Outlines a rectangle with a line centred on its edges
    pub fn stroke_rect(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        line_width: i64,
        colour: Rgba,
    ) {
        let half = line_width / 2;
        let (x0, y0) = (x - half, y - half);
        let outer_w = w + line_width;
        let side_h = h - line_width;
        self.fill_rect(x0, y0, outer_w, line_width, colour);
        self.fill_rect(x0, y + h - half, outer_w, line_width, colour);
        self.fill_rect(x0, y0 + line_width, line_width, side_h, colour);
        let right_x = x + w - half;
        self.fill_rect(right_x, y0 + line_width, line_width, side_h, colour);
    }

    /// Width in pixels of `text` drawn at `scale`
    pub fn text_width(text: &str, scale: u32) -> u32 {
        text.chars().count() as u32 * GLYPH_SIZE * scale
    }

    /// Draws `text` with its top left corner at (x, y). Characters missing from the font are drawn
    /// as '?'.
    pub fn draw_text(&mut self, text: &str, x: i64, y: i64, style: TextStyle) {
        let TextStyle { scale, colour } = style;
        let scale = scale.max(1) as i64;
        let advance = GLYPH_SIZE as i64 * scale;
        for (i, ch) in text.chars().enumerate() {
            let glyph = font8x8::BASIC_FONTS
                .get(ch)
                .or_else(|| font8x8::BASIC_FONTS.get('?'))
                .unwrap_or([0; 8]);
            let left = x + i as i64 * advance;
            for (row, bits) in glyph.iter().enumerate() {
                for col in 0..GLYPH_SIZE {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    self.fill_rect(
                        left + col as i64 * scale,
                        y + row as i64 * scale,
                        scale,
                        scale,
                        colour,
                    );
                }
            }
        }
    }

    /// Draws `text` broken into lines at whitespace so that no line is wider than `max_width`,
    /// unless it's a single word. Returns the y coordinate below the last line.
    pub fn draw_wrapped_text(
        &mut self,
        text: &str,
        (x, y): (i64, i64),
        max_width: u32,
        line_height: i64,
        style: TextStyle,
    ) -> i64 {
        let mut y = y;
        for line in wrap(text, max_width, style.scale) {
            self.draw_text(&line, x, y, style);
            y += line_height;
        }
        y
    }

    pub fn write_png(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let w = BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Default);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.pixels)?;
        writer.finish()?;
        Ok(())
    }
}

/// Greedy word wrap measured with the bitmap font
pub fn wrap(text: &str, max_width: u32, scale: u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let candidate = if line.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", line, word)
        };
        if Canvas::text_width(&candidate, scale) > max_width && !line.is_empty()
        {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}
