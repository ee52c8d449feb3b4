use tiny_skia::{Paint, Color, Rect, Transform, PixmapMut, PathBuilder, Stroke};
use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, SwashCache};
use crate::state::AppState;
use crate::config::{ThemeConfig, WindowConfig};

/// Axis-aligned box in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Bounds {
    fn rect(&self) -> Option<Rect> {
        Rect::from_xywh(self.x, self.y, self.w, self.h)
    }
}

/// Where the search box and each list row go for a given surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub input: Bounds,
    pub rows: Vec<Bounds>,
}

impl Layout {
    pub fn compute(width: u32, height: u32, window: &WindowConfig, theme: &ThemeConfig, visible: usize) -> Self {
        let left = window.margin_left.max(0) as f32;
        let top = window.margin_top.max(0) as f32;
        let inner_w = (width as f32 - left - window.margin_right.max(0) as f32).max(0.0);
        let inner_h = (height as f32 - top - window.margin_bottom.max(0) as f32).max(0.0);

        let input_h = (theme.input_font_size * 1.6).min(inner_h);
        let input = Bounds { x: left, y: top, w: inner_w, h: input_h };

        let list_y = top + input_h + theme.spacing;
        let list_h = (inner_h - input_h - theme.spacing).max(0.0);
        let row_h = list_h / visible.max(1) as f32;

        let rows = (0..visible)
            .map(|i| Bounds { x: left, y: list_y + i as f32 * row_h, w: inner_w, h: row_h })
            .collect();

        Self { input, rows }
    }
}

pub struct Renderer {
    font_system: FontSystem,
    swash_cache: SwashCache,
    theme: ThemeConfig,
    window: WindowConfig,
    placeholder: String,
}

impl Renderer {
    pub fn new(theme: ThemeConfig, window: WindowConfig, placeholder: String) -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
            theme,
            window,
            placeholder,
        }
    }

    pub fn draw(&mut self, pixmap: &mut PixmapMut, state: &AppState) {
        let bg_color = ThemeConfig::parse_color(&self.theme.background);
        let border_color = ThemeConfig::parse_color(&self.theme.border_color);
        let text_color = ThemeConfig::parse_color(&self.theme.text);
        let placeholder_color = ThemeConfig::parse_color(&self.theme.placeholder);
        let input_bg_color = ThemeConfig::parse_color(&self.theme.input_background);
        let sel_bg_color = ThemeConfig::parse_color(&self.theme.selection_background);
        let sel_text_color = ThemeConfig::parse_color(&self.theme.selection_text);
        let radius = self.theme.border_radius;
        let font_size = self.theme.font_size;
        let input_font_size = self.theme.input_font_size;

        pixmap.fill(Color::TRANSPARENT);

        let width = pixmap.width();
        let height = pixmap.height();
        let layout = Layout::compute(width, height, &self.window, &self.theme, state.params().visible_count);

        if let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) {
            self.draw_rounded_rect(pixmap, rect, radius, bg_color, Some(border_color));
        }

        if let Some(rect) = layout.input.rect() {
            self.draw_rounded_rect(pixmap, rect, radius / 2.0, input_bg_color, None);
        }
        let (search_text, search_color) = if state.query().is_empty() {
            (self.placeholder.clone(), placeholder_color)
        } else {
            (state.query().to_string(), text_color)
        };
        let pad = self.theme.spacing;
        let text_y = layout.input.y + (layout.input.h - input_font_size) / 2.0;
        self.draw_text(pixmap, &search_text, layout.input.x + pad, text_y, input_font_size, search_color);

        for (row, bounds) in state.visible_rows().zip(&layout.rows) {
            let mut current_text_color = text_color;

            if row.selected {
                if let Some(rect) = bounds.rect() {
                    self.draw_rounded_rect(pixmap, rect, radius / 2.0, sel_bg_color, None);
                }
                current_text_color = sel_text_color;
            }

            let y = bounds.y + (bounds.h - font_size) / 2.0;
            self.draw_text(pixmap, &row.entry.name, bounds.x + pad, y, font_size, current_text_color);
        }

        if state.filtered_len() == 0 && !state.query().is_empty() {
            if let Some(first) = layout.rows.first() {
                let y = first.y + (first.h - font_size) / 2.0;
                self.draw_text(pixmap, "No results found", first.x + pad, y, font_size, placeholder_color);
            }
        }
    }

    fn draw_rounded_rect(&self, pixmap: &mut PixmapMut, rect: Rect, radius: f32, fill: Color, stroke: Option<Color>) {
        let x = rect.left();
        let y = rect.top();
        let w = rect.width();
        let h = rect.height();
        let radius = radius.min(w / 2.0).min(h / 2.0).max(0.0);

        let mut pb = PathBuilder::new();
        pb.move_to(x + radius, y);
        pb.line_to(x + w - radius, y);
        pb.quad_to(x + w, y, x + w, y + radius);
        pb.line_to(x + w, y + h - radius);
        pb.quad_to(x + w, y + h, x + w - radius, y + h);
        pb.line_to(x + radius, y + h);
        pb.quad_to(x, y + h, x, y + h - radius);
        pb.line_to(x, y + radius);
        pb.quad_to(x, y, x + radius, y);
        pb.close();

        if let Some(path) = pb.finish() {
            let mut paint = Paint::default();
            paint.set_color(fill);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, tiny_skia::FillRule::Winding, Transform::identity(), None);

            if let Some(s_color) = stroke {
                let mut s_paint = Paint::default();
                s_paint.set_color(s_color);
                s_paint.anti_alias = true;
                let stroke_obj = Stroke { width: 1.5, ..Default::default() };
                pixmap.stroke_path(&path, &s_paint, &stroke_obj, Transform::identity(), None);
            }
        }
    }

    fn draw_text(&mut self, pixmap: &mut PixmapMut, text: &str, x: f32, y: f32, size: f32, color: Color) {
        let mut buffer = Buffer::new(&mut self.font_system, Metrics::new(size, size));
        buffer.set_size(&mut self.font_system, Some(pixmap.width() as f32 - x), None);
        buffer.set_text(&mut self.font_system, text, Attrs::new(), cosmic_text::Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let text_color = cosmic_text::Color::rgba(
            (color.red() * 255.0) as u8,
            (color.green() * 255.0) as u8,
            (color.blue() * 255.0) as u8,
            (color.alpha() * 255.0) as u8,
        );

        buffer.draw(&mut self.font_system, &mut self.swash_cache, text_color, |draw_x, draw_y, w, h, color| {
            let draw_x = draw_x + x as i32;
            let draw_y = draw_y + y as i32;
            if w == 0 || h == 0 { return; }
            if draw_x >= 0 && draw_y >= 0 && draw_x < pixmap.width() as i32 && draw_y < pixmap.height() as i32 {
                let paint = Paint {
                    shader: tiny_skia::Shader::SolidColor(tiny_skia::Color::from_rgba8(color.r(), color.g(), color.b(), color.a())),
                    ..Paint::default()
                };
                if let Some(r) = Rect::from_xywh(draw_x as f32, draw_y as f32, w as f32, h as f32) {
                    pixmap.fill_rect(r, &paint, Transform::identity(), None);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(margin: i32) -> WindowConfig {
        WindowConfig {
            margin_left: margin,
            margin_top: margin,
            margin_right: margin,
            margin_bottom: margin,
            ..WindowConfig::default()
        }
    }

    #[test]
    fn one_row_per_visible_entry() {
        let theme = ThemeConfig::default();
        let layout = Layout::compute(400, 200, &window(0), &theme, 5);
        assert_eq!(layout.rows.len(), 5);

        let bottom = layout.rows.last().map(|r| r.y + r.h).unwrap();
        assert!((bottom - 200.0).abs() < 0.01);
        assert!(layout.rows[0].y >= layout.input.y + layout.input.h);
    }

    #[test]
    fn margins_inset_the_content() {
        let theme = ThemeConfig::default();
        let layout = Layout::compute(400, 200, &window(10), &theme, 3);
        assert_eq!(layout.input.x, 10.0);
        assert_eq!(layout.input.y, 10.0);
        assert_eq!(layout.input.w, 380.0);
        let bottom = layout.rows.last().map(|r| r.y + r.h).unwrap();
        assert!((bottom - 190.0).abs() < 0.01);
    }

    #[test]
    fn tiny_surface_does_not_go_negative() {
        let theme = ThemeConfig::default();
        let layout = Layout::compute(10, 10, &window(20), &theme, 4);
        assert_eq!(layout.input.w, 0.0);
        assert!(layout.rows.iter().all(|r| r.h >= 0.0));
    }
}
