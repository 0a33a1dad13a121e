use decal_canvas::math::{OrientedRect, Rect, point_in_oriented_rect, rotate_point};
use decal_canvas::model::DecalGeometry;
use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

const EPS: f32 = 1e-3;

#[test]
fn test_rotate_point_roundtrip() {
    let pivots = [Vec2::ZERO, Vec2::new(100.0, -40.0), Vec2::new(-3.5, 812.0)];
    let angles = [0.0, 0.3, FRAC_PI_2, PI, -2.1, 7.0 * PI];
    let point = Vec2::new(37.0, 91.0);

    for pivot in pivots {
        for angle in angles {
            let there = rotate_point(point, pivot, angle);
            let back = rotate_point(there, pivot, -angle);
            assert!(
                back.distance(point) < EPS,
                "pivot {pivot:?} angle {angle}: {back:?} != {point:?}"
            );
        }
    }
}

#[test]
fn test_rotate_quarter_turn() {
    let p = rotate_point(Vec2::new(10.0, 0.0), Vec2::ZERO, FRAC_PI_2);
    assert!(p.distance(Vec2::new(0.0, 10.0)) < EPS);
}

#[test]
fn test_corners_are_inside() {
    let rect = OrientedRect::new(Vec2::new(50.0, 60.0), Vec2::new(40.0, 20.0), 0.0);
    for corner in [
        Vec2::new(30.0, 50.0),
        Vec2::new(70.0, 50.0),
        Vec2::new(70.0, 70.0),
        Vec2::new(30.0, 70.0),
    ] {
        assert!(point_in_oriented_rect(corner, &rect), "corner {corner:?}");
    }
}

#[test]
fn test_points_outside_expanded_box() {
    let g = DecalGeometry {
        center: Vec2::new(200.0, 200.0),
        size: Vec2::new(100.0, 50.0),
        rotation: 0.7,
    };
    let rect = g.oriented_rect();
    let eps = 0.5;

    // Just past each edge midpoint, measured in the local frame.
    for local in [
        Vec2::new(50.0 + eps, 0.0),
        Vec2::new(-50.0 - eps, 0.0),
        Vec2::new(0.0, 25.0 + eps),
        Vec2::new(0.0, -25.0 - eps),
    ] {
        let world = rect.to_world(local);
        assert!(!g.contains(world), "{local:?} should be outside");
    }
    assert!(g.contains(g.center));
}

#[test]
fn test_handles_follow_rotation() {
    let g = DecalGeometry {
        center: Vec2::new(100.0, 100.0),
        size: Vec2::new(40.0, 40.0),
        rotation: FRAC_PI_2,
    };
    // Local up (0, -45) rotated a quarter turn points to +x.
    assert!(g.rotate_handle(25.0).distance(Vec2::new(145.0, 100.0)) < EPS);
    // Local bottom-right (20, 20) rotated a quarter turn.
    assert!(g.resize_handle().distance(Vec2::new(80.0, 120.0)) < EPS);
}

#[test]
fn test_rect_from_corners() {
    let r = Rect::from_corners(Vec2::new(30.0, 5.0), Vec2::new(10.0, 25.0));
    assert_eq!(r.min, Vec2::new(10.0, 5.0));
    assert_eq!(r.size(), Vec2::new(20.0, 20.0));
    assert!(r.contains(Vec2::new(10.0, 25.0)));
}
