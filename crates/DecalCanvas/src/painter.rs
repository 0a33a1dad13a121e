use glam::{Vec2, Vec4};
use tiny_skia::{
    Color, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::config::CanvasConfig;
use crate::error::RenderError;
use crate::model::{DecalGeometry, DecalId, Scene};
use crate::render::{DrawCommand, RenderList};

/// High-level renderer for the decal scene.
///
/// The `Painter` is responsible for converting the scene (background + decals) into concrete
/// drawing commands (`RenderList`) and for rasterizing those commands into pixels.
/// It handles:
/// - Background placement at the content origin
/// - Decal placement (translate, rotate, stretch into the decal box)
/// - Selection affordances (dashed box, resize handle, rotate handle with guide line)
/// - Z-ordering (painters algorithm, same order the hit-test walks in reverse)
///
/// Painting never mutates anything and can be repeated at any time.
pub struct Painter;

impl Painter {
    /// Generates a list of draw commands to render the entire scene.
    ///
    /// # Arguments
    /// * `scene` - The scene to render.
    /// * `selection` - The selected decal, if any.
    /// * `processing` - While a fusion request is outstanding the affordances are hidden.
    /// * `config` - Handle geometry and style.
    pub fn draw_scene(
        scene: &Scene,
        selection: Option<DecalId>,
        processing: bool,
        config: &CanvasConfig,
    ) -> RenderList {
        let mut draw_list = vec![
            DrawCommand::Clear,
            DrawCommand::Background {
                image: scene.background().clone(),
            },
        ];

        for decal in scene.paint_order() {
            let g = decal.geometry;
            draw_list.push(DrawCommand::Image {
                image: decal.image.clone(),
                center: g.center,
                size: g.size,
                rotation: g.rotation,
            });

            if Some(decal.id) == selection && !processing {
                Self::draw_affordances(&g, config, &mut draw_list);
            }
        }

        draw_list
    }

    fn draw_affordances(g: &DecalGeometry, config: &CanvasConfig, draw_list: &mut RenderList) {
        let style = &config.style;
        let rect = g.oriented_rect();

        draw_list.push(DrawCommand::Outline {
            center: g.center,
            size: g.size,
            rotation: g.rotation,
            color: style.accent_color,
            width: style.outline_width,
            dash: Some(style.outline_dash),
        });

        draw_list.push(DrawCommand::Handle {
            center: g.resize_handle(),
            radius: config.handle_radius,
            fill: style.resize_handle_fill,
            stroke: style.accent_color,
            stroke_width: style.handle_stroke_width,
        });

        // Guide line from the top edge midpoint up to the rotate handle.
        let top_mid = rect.to_world(Vec2::new(0.0, -g.size.y * 0.5));
        let rotate_handle = g.rotate_handle(config.rotate_handle_offset);
        draw_list.push(DrawCommand::Line {
            start: top_mid,
            end: rotate_handle,
            color: style.accent_color,
            width: style.handle_stroke_width,
        });
        draw_list.push(DrawCommand::Handle {
            center: rotate_handle,
            radius: config.handle_radius,
            fill: style.rotate_handle_fill,
            stroke: style.accent_color,
            stroke_width: style.handle_stroke_width,
        });
    }

    /// Rasterizes a display list onto a fresh transparent surface of `width` x `height`.
    pub fn rasterize(
        draw_list: &RenderList,
        width: u32,
        height: u32,
    ) -> Result<Pixmap, RenderError> {
        let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface { width, height })?;
        for cmd in draw_list {
            Self::execute(&mut pixmap, cmd);
        }
        Ok(pixmap)
    }

    fn execute(pixmap: &mut Pixmap, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Clear => pixmap.fill(Color::TRANSPARENT),
            DrawCommand::Background { image } => {
                pixmap.draw_pixmap(
                    0,
                    0,
                    image.pixmap().as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
            DrawCommand::Image {
                image,
                center,
                size,
                rotation,
            } => {
                if image.width() == 0 || image.height() == 0 {
                    return;
                }
                let transform = box_transform(*center, *rotation)
                    .pre_translate(-size.x * 0.5, -size.y * 0.5)
                    .pre_scale(
                        size.x / image.width() as f32,
                        size.y / image.height() as f32,
                    );
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                pixmap.draw_pixmap(0, 0, image.pixmap().as_ref(), &paint, transform, None);
            }
            DrawCommand::Outline {
                center,
                size,
                rotation,
                color,
                width,
                dash,
            } => {
                let Some(rect) =
                    tiny_skia::Rect::from_xywh(-size.x * 0.5, -size.y * 0.5, size.x, size.y)
                else {
                    return;
                };
                let path = PathBuilder::from_rect(rect);
                let stroke = Stroke {
                    width: *width,
                    dash: (*dash).and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0)),
                    ..Stroke::default()
                };
                pixmap.stroke_path(
                    &path,
                    &solid(*color),
                    &stroke,
                    box_transform(*center, *rotation),
                    None,
                );
            }
            DrawCommand::Line {
                start,
                end,
                color,
                width,
            } => {
                let mut pb = PathBuilder::new();
                pb.move_to(start.x, start.y);
                pb.line_to(end.x, end.y);
                if let Some(path) = pb.finish() {
                    let stroke = Stroke {
                        width: *width,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &solid(*color), &stroke, Transform::identity(), None);
                }
            }
            DrawCommand::Handle {
                center,
                radius,
                fill,
                stroke,
                stroke_width,
            } => {
                let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) else {
                    return;
                };
                pixmap.fill_path(
                    &path,
                    &solid(*fill),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
                let border = Stroke {
                    width: *stroke_width,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &solid(*stroke), &border, Transform::identity(), None);
            }
        }
    }
}

/// Translate to `center`, then rotate by `rotation` radians.
fn box_transform(center: Vec2, rotation: f32) -> Transform {
    Transform::from_translate(center.x, center.y).pre_rotate(rotation.to_degrees())
}

fn solid(color: Vec4) -> Paint<'static> {
    let c = color.clamp(Vec4::ZERO, Vec4::ONE);
    let mut paint = Paint::default();
    paint.set_color(Color::from_rgba(c.x, c.y, c.z, c.w).unwrap_or(Color::BLACK));
    paint.anti_alias = true;
    paint
}
