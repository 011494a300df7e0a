use std::borrow::Cow;
use std::path::Path;

use tracing::{debug, warn};

use crate::foundation::error::{PosterError, PosterResult};
use crate::render::backend::{Canvas, HAlign, OutputFormat, RenderBackend};
use crate::style::color::Rgba;
use crate::style::fonts::{FontRole, FontSet};

/// RGBA8 brush carried through Parley text layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct TextBrush {
    r: u8,
    g: u8,
    b: u8,
    a: u8,
}

/// CPU rasterizer over `vello_cpu`, text shaping via Parley, PNG encoding
/// via `image`. Draw calls composite in submission order.
pub struct CpuBackend {
    canvas: Canvas,
    ctx: vello_cpu::RenderContext,
    width_px: u16,
    height_px: u16,
    fonts: Option<FontSet>,
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    /// Lazily registered family name + glyph font handle per role.
    resolved: [Option<ResolvedFont>; 3],
}

#[derive(Clone)]
struct ResolvedFont {
    family: String,
    font: vello_cpu::peniko::FontData,
}

fn role_index(role: FontRole) -> usize {
    match role {
        FontRole::Bold => 0,
        FontRole::Regular => 1,
        FontRole::Light => 2,
    }
}

impl CpuBackend {
    /// Build a backend for `canvas`. `fonts: None` means no poster fonts are
    /// installed and a generic monospace family is substituted.
    pub fn new(canvas: Canvas, fonts: Option<FontSet>) -> PosterResult<Self> {
        let width_px: u16 = canvas
            .width_px()
            .try_into()
            .map_err(|_| PosterError::render("canvas width exceeds 65535 px"))?;
        let height_px: u16 = canvas
            .height_px()
            .try_into()
            .map_err(|_| PosterError::render("canvas height exceeds 65535 px"))?;
        if width_px == 0 || height_px == 0 {
            return Err(PosterError::render("canvas must be at least 1x1 px"));
        }

        Ok(Self {
            canvas,
            ctx: vello_cpu::RenderContext::new(width_px, height_px),
            width_px,
            height_px,
            fonts,
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            resolved: [None, None, None],
        })
    }

    fn paint(color: Rgba) -> vello_cpu::peniko::Color {
        vello_cpu::peniko::Color::from_rgba8(color.r, color.g, color.b, color.a)
    }

    /// Register the role's font bytes once and keep the family name plus the
    /// glyph-drawing handle.
    fn resolve_font(&mut self, role: FontRole) -> PosterResult<Option<ResolvedFont>> {
        let Some(fonts) = &self.fonts else {
            return Ok(None);
        };
        let idx = role_index(role);
        if let Some(resolved) = &self.resolved[idx] {
            return Ok(Some(resolved.clone()));
        }

        let bytes = fonts.bytes_for(role).to_vec();
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PosterError::render("no font families registered from font bytes"))?;
        let family = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PosterError::render("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        let resolved = ResolvedFont { family, font };
        self.resolved[idx] = Some(resolved.clone());
        Ok(Some(resolved))
    }

    fn layout_line(
        &mut self,
        text: &str,
        family: Option<&str>,
        size_px: f32,
        brush: TextBrush,
    ) -> PosterResult<parley::Layout<TextBrush>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PosterError::render("text size must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        let stack = family.map_or(
            parley::style::FontStack::Source(Cow::Borrowed("monospace")),
            |name| parley::style::FontStack::Source(Cow::Owned(name.to_string())),
        );
        builder.push_default(parley::style::StyleProperty::FontStack(stack));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl RenderBackend for CpuBackend {
    fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    fn clear(&mut self, color: Rgba) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(Self::paint(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width_px),
            f64::from(self.height_px),
        ));
    }

    fn fill_polygon(&mut self, ring: &[kurbo::Point], color: Rgba) {
        if ring.len() < 3 {
            return;
        }
        let mut path = kurbo::BezPath::new();
        path.move_to(ring[0]);
        for p in &ring[1..] {
            path.line_to(*p);
        }
        path.close_path();

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(Self::paint(color));
        self.ctx.fill_path(&bezpath_to_cpu(&path));
    }

    fn stroke_polyline(&mut self, points: &[kurbo::Point], color: Rgba, width_pt: f64) {
        if points.len() < 2 {
            return;
        }
        let width_px = (width_pt * self.canvas.px_per_pt()).max(0.1);

        let mut path = kurbo::BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }

        // Expand the stroke on our side of the seam; the rasterizer only
        // ever fills.
        let outline = kurbo::stroke(
            path,
            &kurbo::Stroke::new(width_px),
            &kurbo::StrokeOpts::default(),
            0.25,
        );

        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(Self::paint(color));
        self.ctx.fill_path(&bezpath_to_cpu(&outline));
    }

    fn draw_text(
        &mut self,
        text: &str,
        x_px: f64,
        baseline_y_px: f64,
        role: FontRole,
        size_pt: f64,
        color: Rgba,
        align: HAlign,
    ) -> PosterResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        let size_px = (size_pt * self.canvas.px_per_pt()) as f32;
        let brush = TextBrush {
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
        };

        let resolved = self.resolve_font(role)?;
        let layout = self.layout_line(
            text,
            resolved.as_ref().map(|r| r.family.as_str()),
            size_px,
            brush,
        )?;

        let Some(first_line) = layout.lines().next() else {
            warn!(text, "no glyphs laid out; text skipped");
            return Ok(());
        };
        let baseline_offset = f64::from(first_line.metrics().baseline);
        let left = match align {
            HAlign::Center => x_px - f64::from(layout.width()) / 2.0,
            HAlign::Right => x_px - f64::from(layout.width()),
        };

        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            left,
            baseline_y_px - baseline_offset,
        )));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let b = run.style().brush;
                self.ctx
                    .set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                // Prefer the registered handle; fall back to whatever family
                // Parley resolved when no poster fonts are installed.
                let font = match &resolved {
                    Some(r) => r.font.clone(),
                    None => {
                        let f = run.run().font();
                        vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(f.data.as_ref().to_vec()),
                            f.index,
                        )
                    }
                };
                self.ctx
                    .glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn composite_rgba(
        &mut self,
        x_px: u32,
        y_px: u32,
        width_px: u32,
        height_px: u32,
        rgba: &[u8],
    ) -> PosterResult<()> {
        let expected = (width_px as usize)
            .checked_mul(height_px as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| PosterError::render("overlay size overflow"))?;
        if rgba.len() != expected {
            return Err(PosterError::render(
                "overlay buffer must match width*height*4",
            ));
        }

        let mut premul = rgba.to_vec();
        premultiply_rgba8_in_place(&mut premul);
        let pixmap = pixmap_from_premul_bytes(&premul, width_px, height_px)?;
        let img = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };

        self.ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            f64::from(x_px),
            f64::from(y_px),
        )));
        self.ctx.set_paint(img);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(width_px),
            f64::from(height_px),
        ));
        Ok(())
    }

    fn save(&mut self, path: &Path) -> PosterResult<()> {
        if self.canvas.format != OutputFormat::Png {
            return Err(PosterError::render(format!(
                "cpu backend only encodes png; '{}' needs a vector backend",
                self.canvas.format.extension()
            )));
        }

        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width_px, self.height_px);
        self.ctx.render_to_pixmap(&mut pixmap);

        let mut bytes = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut bytes);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PosterError::render(format!("create output dir '{}': {e}", parent.display()))
            })?;
        }
        image::save_buffer_with_format(
            path,
            &bytes,
            u32::from(self.width_px),
            u32::from(self.height_px),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| PosterError::render(format!("write png '{}': {e}", path.display())))?;

        debug!(path = %path.display(), "poster written");
        Ok(())
    }
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Build a pixmap from premultiplied RGBA8 bytes.
fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> PosterResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PosterError::render("overlay width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PosterError::render("overlay height exceeds u16"))?;

    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
        px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
        px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
    }
}
