use decal_canvas::painter::Painter;
use decal_canvas::render::DrawCommand;
use decal_canvas::view::CanvasLayout;
use decal_canvas::{Canvas, CanvasConfig, RasterImage};
use glam::Vec2;
use image::{Rgba, RgbaImage};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
    RasterImage::encode_rgba(&pixels).unwrap().image
}

/// 100x100 red background with one 20x20 blue decal centered at (50, 50), selected.
fn create_test_canvas() -> Canvas {
    let background = solid(100, 100, RED);
    let config = CanvasConfig {
        placement_fraction: 0.2,
        ..CanvasConfig::default()
    };
    let layout = CanvasLayout::native(Vec2::splat(100.0));
    let mut canvas = Canvas::new(config, background, layout).unwrap();
    canvas
        .place_decal("blue", solid(10, 10, BLUE), Vec2::new(50.0, 50.0))
        .unwrap();
    canvas
}

fn is_blue(pixel: Option<[u8; 4]>) -> bool {
    pixel.is_some_and(|[r, _, b, a]| b > 200 && r < 50 && a == 255)
}

fn count_affordances(list: &[DrawCommand]) -> usize {
    list.iter()
        .filter(|cmd| {
            matches!(
                cmd,
                DrawCommand::Outline { .. } | DrawCommand::Handle { .. } | DrawCommand::Line { .. }
            )
        })
        .count()
}

#[test]
fn test_display_list_order() {
    let canvas = create_test_canvas();
    let list = canvas.render();

    assert!(matches!(list[0], DrawCommand::Clear));
    assert!(matches!(list[1], DrawCommand::Background { .. }));
    match &list[2] {
        DrawCommand::Image { center, size, rotation, .. } => {
            assert_eq!(*center, Vec2::new(50.0, 50.0));
            assert_eq!(*size, Vec2::new(20.0, 20.0));
            assert_eq!(*rotation, 0.0);
        }
        other => panic!("expected the decal image, got {other:?}"),
    }
    // Dashed box, resize handle, guide line, rotate handle.
    assert_eq!(count_affordances(&list), 4);
}

#[test]
fn test_affordances_hidden() {
    let mut canvas = create_test_canvas();

    // No selection.
    let list = Painter::draw_scene(canvas.scene(), None, false, &canvas.config);
    assert_eq!(count_affordances(&list), 0);

    // Selected but processing.
    canvas.begin_processing();
    assert_eq!(count_affordances(&canvas.render()), 0);
}

#[test]
fn test_frame_pixels() {
    let canvas = create_test_canvas();
    let frame = canvas.render_frame().unwrap();
    assert_eq!((frame.width(), frame.height()), (100, 100));

    let pixel = |x, y| {
        let c = frame.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    };
    assert!(is_blue(Some(pixel(50, 50))));
    assert_eq!(pixel(5, 95), RED);
    // The rotate handle is drawn 35px above the center.
    assert_ne!(pixel(50, 15), RED);
}

#[test]
fn test_composite_hides_selection() {
    let canvas = create_test_canvas();
    let composite = canvas.current_composite().unwrap();
    assert_eq!((composite.image.width(), composite.image.height()), (100, 100));
    assert_eq!(composite.image.pixel(50, 15), Some(RED));
    assert!(is_blue(composite.image.pixel(50, 50)));
    assert!(!composite.bytes.is_empty());

    // The composite decodes back to the same pixels.
    let decoded = RasterImage::decode(&composite.bytes).unwrap();
    assert_eq!(decoded.id(), composite.image.id());
    assert_eq!(decoded.pixel(50, 50), composite.image.pixel(50, 50));
}

#[test]
fn test_rotated_decal_pixels() {
    let background = solid(100, 100, RED);
    let config = CanvasConfig {
        placement_fraction: 0.6,
        ..CanvasConfig::default()
    };
    let layout = CanvasLayout::native(Vec2::splat(100.0));
    let mut canvas = Canvas::new(config, background, layout).unwrap();
    // 60x12 bar across the middle.
    canvas
        .place_decal("bar", solid(50, 10, BLUE), Vec2::new(50.0, 50.0))
        .unwrap();
    let composite = canvas.current_composite().unwrap().image;
    assert!(is_blue(composite.pixel(25, 50)));
    assert_eq!(composite.pixel(50, 25), Some(RED));

    // Turn it upright by dragging the rotate handle to the right of the center.
    let handle = canvas.selected_decal().unwrap().geometry.rotate_handle(25.0);
    canvas.pointer_down(handle);
    canvas.pointer_move(Vec2::new(90.0, 50.0));
    canvas.pointer_up(Vec2::new(90.0, 50.0));

    let composite = canvas.current_composite().unwrap().image;
    assert!(is_blue(composite.pixel(50, 25)));
    assert_eq!(composite.pixel(25, 50), Some(RED));
}
