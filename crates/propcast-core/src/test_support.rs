//! Shared helpers for unit tests: synthetic images and local stub servers.

use axum::{routing::get, Json, Router};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::Path;

pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    buf.into_inner()
}

pub fn write_jpeg(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serve fixed bodies at fixed paths; anything else is a 404
pub async fn serve_images(routes: Vec<(&'static str, Vec<u8>)>) -> String {
    let mut router = Router::new();
    for (path, body) in routes {
        router = router.route(
            path,
            get(move || {
                let body = body.clone();
                async move { body }
            }),
        );
    }
    serve(router).await
}

/// Answer every request with a one-candidate `generateContent` response
pub async fn serve_gemini(text: &'static str) -> String {
    let router = Router::new().fallback(move || async move {
        Json(serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        }))
    });
    serve(router).await
}
