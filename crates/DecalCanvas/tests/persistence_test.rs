use decal_canvas::model::Scene;
use decal_canvas::persistence::SavedScene;
use decal_canvas::view::CanvasLayout;
use decal_canvas::{Canvas, CanvasConfig, CanvasError, RasterImage};
use glam::Vec2;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;

fn solid(width: u32, height: u32, color: [u8; 4]) -> RasterImage {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
    RasterImage::encode_rgba(&pixels).unwrap().image
}

#[test]
fn test_roundtrip_persistence() {
    // 1. Build a scene with two decals sharing one image and one with its own
    let background = solid(300, 200, [10, 10, 10, 255]);
    let shared = solid(8, 8, [255, 0, 0, 255]);
    let other = solid(16, 4, [0, 0, 255, 255]);
    let mut canvas = Canvas::new(
        CanvasConfig::default(),
        background.clone(),
        CanvasLayout::native(background.size()),
    )
    .unwrap();
    canvas.place_decal("star", shared.clone(), Vec2::new(50.0, 50.0)).unwrap();
    canvas.place_decal("bar", other.clone(), Vec2::new(150.0, 100.0)).unwrap();
    canvas.place_decal("star", shared.clone(), Vec2::new(250.0, 150.0)).unwrap();

    // 2. Save
    let saved = canvas.scene().save();
    assert_eq!(saved.decals.len(), 3);
    assert_eq!(saved.background, background.id());
    // Background first, each image once.
    assert_eq!(
        saved.image_refs(),
        vec![background.id(), shared.id(), other.id()]
    );

    // 3. Through JSON and back into a new scene
    let json = saved.to_json().unwrap();
    let parsed = SavedScene::from_json(&json).unwrap();
    assert_eq!(parsed, saved);

    let images: HashMap<_, _> = [&background, &shared, &other]
        .into_iter()
        .map(|image| (image.id(), image.clone()))
        .collect();
    let scene = Scene::from_saved(&parsed, &images).unwrap();

    // 4. Verify order, identity and geometry survived
    let original: Vec<_> = canvas.scene().paint_order().collect();
    let restored: Vec<_> = scene.paint_order().collect();
    assert_eq!(original.len(), restored.len());
    for (a, b) in original.iter().zip(&restored) {
        assert_eq!(a.uuid, b.uuid);
        assert_eq!(a.source_id, b.source_id);
        assert_eq!(a.image.id(), b.image.id());
        assert_eq!(a.geometry, b.geometry);
    }
    assert_eq!(scene.content_size(), Vec2::new(300.0, 200.0));
}

#[test]
fn test_load_fails_on_missing_image() {
    let background = solid(50, 50, [10, 10, 10, 255]);
    let scene = Scene::new(background.clone());
    let saved = scene.save();

    let err = Scene::from_saved(&saved, &HashMap::new()).unwrap_err();
    match err {
        CanvasError::MissingImage(id) => assert_eq!(id, background.id()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_image_refs_are_content_addressed() {
    let a = solid(4, 4, [1, 2, 3, 255]);
    let b = solid(4, 4, [1, 2, 3, 255]);
    let c = solid(4, 4, [3, 2, 1, 255]);
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
    assert_eq!(a.id().to_hex().len(), 64);
}
