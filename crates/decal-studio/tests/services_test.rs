use decal_canvas::RasterImage;
use decal_studio::{
    BlockingDecoder, DirectoryExportSink, ExportSink, ImageDecoder, ImageStore, StudioConfig,
};
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::sync::Arc;

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = std::io::Cursor::new(Vec::new());
    pixels.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_blocking_decoder() {
    let bytes = png(7, 3, [1, 2, 3, 255]);
    let image = BlockingDecoder.decode(Arc::from(bytes.as_slice())).await.unwrap();
    assert_eq!((image.width(), image.height()), (7, 3));
    assert_eq!(image.pixel(6, 2), Some([1, 2, 3, 255]));

    assert!(BlockingDecoder.decode(Arc::from(&b""[..])).await.is_err());
}

#[tokio::test]
async fn test_directory_export_sink() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = std::env::temp_dir().join(format!("decal-studio-{}", uuid::Uuid::new_v4()));
    let sink = DirectoryExportSink::new(&dir);
    let image = RasterImage::decode(&png(12, 8, [200, 10, 10, 255])).unwrap();

    sink.emit(&image, "out.png").await.unwrap();
    sink.emit(&image, "out.jpg").await.unwrap();
    assert!(sink.emit(&image, "out.unknown").await.is_err());

    let written = image::open(dir.join("out.png")).unwrap();
    assert_eq!((written.width(), written.height()), (12, 8));
    assert_eq!(written.to_rgba8().get_pixel(0, 0).0, [200, 10, 10, 255]);
    let jpeg = image::open(dir.join("out.jpg")).unwrap();
    assert_eq!((jpeg.width(), jpeg.height()), (12, 8));

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[test]
fn test_image_store_dedupes() {
    let store = ImageStore::new();
    let bytes = png(2, 2, [9, 9, 9, 255]);
    let a = store.check_in(&bytes);
    let b = store.check_in(&bytes);
    assert_eq!(a, b);
    assert_eq!(store.len(), 1);
    assert_eq!(store.total_bytes(), bytes.len());
    assert_eq!(&*store.claim(&a).unwrap(), bytes.as_slice());

    let other = RasterImage::decode(&png(2, 2, [0, 0, 0, 255])).unwrap();
    assert!(!store.contains(&other.id()));
    assert!(store.claim(&other.id()).is_err());
}

#[test]
fn test_config_from_vars() {
    let vars: HashMap<&str, &str> = [
        ("DECAL_STUDIO_EXPORT_PREFIX", "tattoo"),
        ("DECAL_STUDIO_MAX_DECAL_BYTES", "1024"),
        ("DECAL_STUDIO_FUSION_MAX_DIMENSION", "512"),
        ("DECAL_STUDIO_FUSION_JPEG_QUALITY", "300"),
    ]
    .into_iter()
    .collect();
    let config = StudioConfig::from_vars(|key| vars.get(key).map(|v| v.to_string()));

    // 300 does not fit in a u8.
    assert!(config.is_err());

    let config = StudioConfig::from_vars(|key| match key {
        "DECAL_STUDIO_EXPORT_PREFIX" => Some("tattoo".into()),
        "DECAL_STUDIO_MAX_DECAL_BYTES" => Some("1024".into()),
        "DECAL_STUDIO_FUSION_JPEG_QUALITY" => Some("0".into()),
        _ => None,
    })
    .unwrap();
    assert_eq!(config.export_prefix, "tattoo");
    assert_eq!(config.max_decal_bytes, 1024);
    assert_eq!(config.fusion_max_dimension, 1024);
    assert_eq!(config.fusion_jpeg_quality, 1);
    assert_eq!(config.canvas.max_scale, 3.0);
}

#[test]
fn test_canvas_config_file() {
    let path = std::env::temp_dir().join(format!("canvas-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, r#"{ "min_decal_size": 32.0, "max_history": 10 }"#).unwrap();
    let path_str = path.to_string_lossy().to_string();

    let config = StudioConfig::from_vars(|key| {
        (key == "DECAL_STUDIO_CANVAS_CONFIG").then(|| path_str.clone())
    })
    .unwrap();
    assert_eq!(config.canvas.min_decal_size, 32.0);
    assert_eq!(config.canvas.max_history, 10);
    // Unset fields keep their defaults.
    assert_eq!(config.canvas.handle_hit_radius, 15.0);

    std::fs::remove_file(&path).unwrap();
}
