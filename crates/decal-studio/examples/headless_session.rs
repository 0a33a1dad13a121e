//! Drives a short editing session without any UI and writes the results to the export dir.
//!
//! ```sh
//! DECAL_STUDIO_EXPORT_DIR=/tmp/decals cargo run -p decal-studio --example headless_session
//! ```

use decal_canvas::PointerEvent;
use decal_studio::{DecalStudio, StudioConfig};
use glam::Vec2;
use image::{Rgba, RgbaImage};

fn solid_png(width: u32, height: u32, color: [u8; 4]) -> anyhow::Result<Vec<u8>> {
    let pixels = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = std::io::Cursor::new(Vec::new());
    pixels.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = StudioConfig::from_env()?;
    let background = solid_png(640, 480, [230, 190, 160, 255])?;
    let studio = DecalStudio::builder(config).build(&background).await?;

    let decal = solid_png(120, 60, [20, 20, 90, 255])?;
    let id = studio
        .place_decal("anchor.png", &decal, Vec2::new(320.0, 240.0))
        .await?;
    println!("placed decal {:?}", id);

    // Drag it to the right.
    studio.handle_pointer(PointerEvent::Down(Vec2::new(320.0, 240.0))).await;
    studio.handle_pointer(PointerEvent::Move(Vec2::new(420.0, 260.0))).await;
    studio.handle_pointer(PointerEvent::Up(Vec2::new(420.0, 260.0))).await;

    studio.undo().await?;
    studio.redo().await?;

    // No service is configured, so the composite itself is adopted.
    studio.fuse().await?;

    let name = studio.download_composite().await?;
    println!("exported {}", name);

    for notice in studio.take_notices() {
        println!("[{:?}] {}", notice.level, notice.message);
    }
    Ok(())
}
