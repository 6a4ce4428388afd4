use eframe::egui::epaint::{Mesh, Vertex};
use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, TextureId, pos2, vec2};

const CIRCLE_SEGMENTS: u32 = 48;

pub(super) const CHART_BACKGROUND: Color32 = Color32::from_rgb(19, 23, 29);
pub(super) const BUBBLE_STROKE: Color32 = Color32::WHITE;
pub(super) const BUBBLE_STROKE_WIDTH: f32 = 1.5;
pub(super) const BUBBLE_OPACITY: f32 = 0.9;
pub(super) const BACKDROP_OPACITY: f32 = 0.2;

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Fills the chart rect and stretches the backdrop over it.
pub(super) fn draw_background(painter: &Painter, rect: Rect, backdrop: Option<TextureId>) {
    painter.rect_filled(rect, 0.0, CHART_BACKGROUND);

    if let Some(texture) = backdrop {
        painter.image(
            texture,
            rect,
            Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
            with_opacity(Color32::WHITE, BACKDROP_OPACITY),
        );
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Triangle fan covering a circle, with the texture's unit square mapped onto
/// the circle's bounding box.
pub(super) fn textured_circle(center: Pos2, radius: f32, texture: TextureId, tint: Color32) -> Mesh {
    let mut mesh = Mesh::with_texture(texture);
    mesh.vertices.push(Vertex {
        pos: center,
        uv: pos2(0.5, 0.5),
        color: tint,
    });

    for segment in 0..=CIRCLE_SEGMENTS {
        let angle = segment as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
        let direction = vec2(angle.cos(), angle.sin());
        mesh.vertices.push(Vertex {
            pos: center + direction * radius,
            uv: pos2(0.5 + direction.x * 0.5, 0.5 + direction.y * 0.5),
            color: tint,
        });
    }

    for segment in 1..=CIRCLE_SEGMENTS {
        mesh.indices.extend_from_slice(&[0, segment, segment + 1]);
    }
    mesh
}

/// Portrait-filled circle with the white outline. Without a texture only the
/// outline is drawn.
pub(super) fn draw_bubble(
    painter: &Painter,
    center: Pos2,
    radius: f32,
    texture: Option<TextureId>,
    opacity: f32,
) {
    if !radius.is_finite() || radius <= 0.0 {
        return;
    }

    if let Some(texture) = texture {
        let tint = with_opacity(Color32::WHITE, BUBBLE_OPACITY * opacity);
        painter.add(Shape::mesh(textured_circle(center, radius, texture, tint)));
    }

    painter.circle_stroke(
        center,
        radius,
        Stroke::new(
            BUBBLE_STROKE_WIDTH,
            with_opacity(BUBBLE_STROKE, BUBBLE_OPACITY * opacity),
        ),
    );
}
