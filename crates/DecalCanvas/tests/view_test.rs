use decal_canvas::view::{CanvasLayout, View};
use glam::Vec2;

fn native_view() -> View {
    let content = Vec2::new(800.0, 600.0);
    View::new(CanvasLayout::native(content), content, 0.5, 3.0)
}

#[test]
fn test_identity_mapping_is_exact() {
    let view = native_view();
    for p in [Vec2::ZERO, Vec2::new(123.25, 456.5), Vec2::new(800.0, 600.0)] {
        assert_eq!(view.screen_to_content(p), p);
    }
}

#[test]
fn test_css_ratio_mapping() {
    // The element is shown at half size, 100px from the left.
    let layout = CanvasLayout {
        origin: Vec2::new(100.0, 0.0),
        css_size: Vec2::new(400.0, 300.0),
        container_origin: Vec2::ZERO,
    };
    let view = View::new(layout, Vec2::new(800.0, 600.0), 0.5, 3.0);
    assert_eq!(view.screen_to_content(Vec2::new(300.0, 150.0)), Vec2::new(400.0, 300.0));
}

#[test]
fn test_wheel_zoom_keeps_point_fixed() {
    let mut view = native_view();
    let cursor = Vec2::new(200.0, 150.0);
    let before = view.screen_to_content(cursor);

    assert!(view.zoom_at(cursor, 1.0, 0.15));
    assert!((view.transform.scale - 1.15).abs() < 1e-6);

    let after = view.screen_to_content(cursor);
    assert!(after.distance(before) < 1e-3, "{after:?} drifted from {before:?}");
}

#[test]
fn test_zoom_clamps_to_bounds() {
    let mut view = native_view();
    for _ in 0..20 {
        view.zoom_by(0.25);
    }
    assert_eq!(view.transform.scale, 3.0);
    // At the bound zooming further is a no-op.
    assert!(!view.zoom_by(0.25));
    assert!(!view.zoom_at(Vec2::new(10.0, 10.0), 1.0, 0.15));

    for _ in 0..20 {
        view.zoom_at(Vec2::new(10.0, 10.0), -1.0, 0.15);
    }
    assert_eq!(view.transform.scale, 0.5);
}

#[test]
fn test_screen_content_roundtrip_when_zoomed() {
    let layout = CanvasLayout {
        origin: Vec2::new(40.0, 20.0),
        css_size: Vec2::new(400.0, 300.0),
        container_origin: Vec2::ZERO,
    };
    let mut view = View::new(layout, Vec2::new(800.0, 600.0), 0.5, 3.0);
    view.zoom_at(Vec2::new(120.0, 90.0), 1.0, 0.15);
    view.pan_by(Vec2::new(-35.0, 12.0));

    let p = Vec2::new(250.0, 175.0);
    let back = view.content_to_screen(view.screen_to_content(p));
    assert!(back.distance(p) < 1e-3);
}

#[test]
fn test_displayed_rect_tracks_zoom() {
    let mut view = native_view();
    view.zoom_by(1.0);
    let shown = view.displayed_rect();
    assert_eq!(shown.size(), Vec2::new(1600.0, 1200.0));
    assert_eq!(shown.center(), Vec2::new(400.0, 300.0));

    view.reset();
    assert!(view.transform.is_identity());
    assert!(!view.is_zoomed());
}
