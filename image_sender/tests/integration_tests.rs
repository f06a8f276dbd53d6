use std::{io::Cursor, net::SocketAddr, path::Path, sync::Arc};

use classifier::{
    endpoints::{router, SharedModel, DEFAULT_BODY_LIMIT},
    nn::InferModel,
    prediction::Label,
    preproc::Preprocessing,
    Tensor,
};
use image::{codecs::jpeg::JpegEncoder, ColorType, Rgb, RgbImage};
use image_sender::sender::ImageSender;

struct FixedModel(Preprocessing);

impl InferModel for FixedModel {
    fn preprocessing(&self) -> &Preprocessing {
        &self.0
    }

    fn run(&self, _input: Tensor) -> classifier::Result<f32> {
        Ok(0.125)
    }
}

async fn spawn_server() -> SocketAddr {
    let model: SharedModel = Arc::new(FixedModel(Preprocessing::default()));
    let addr: SocketAddr = "127.0.0.1:0".parse().expect("valid address");
    let server =
        axum::Server::bind(&addr).serve(router(model, DEFAULT_BODY_LIMIT).into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);

    addr
}

#[tokio::test]
async fn test_classify_file() -> anyhow::Result<()> {
    let addr = spawn_server().await;

    let image = RgbImage::from_pixel(64, 64, Rgb([30, 60, 90]));
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, 90).encode(
        image.as_raw(),
        64,
        64,
        ColorType::Rgb8,
    )?;
    let path = std::env::temp_dir().join(format!("image_sender_{}.jpg", std::process::id()));
    std::fs::write(&path, buf.into_inner())?;

    let sender = ImageSender::new(&addr.to_string());
    let result = sender.classify_file(&path).await;
    std::fs::remove_file(&path)?;

    let prediction = result?;
    assert_eq!(prediction.label, Label::Cat);
    assert_eq!(prediction.confidence, 0.875);
    assert_eq!(prediction.summary(), "cat 87.50%");

    Ok(())
}

#[tokio::test]
async fn test_server_error_is_reported() -> anyhow::Result<()> {
    let addr = spawn_server().await;

    let path = std::env::temp_dir().join(format!("image_sender_{}.txt", std::process::id()));
    std::fs::write(&path, b"plain text")?;

    let sender = ImageSender::new(&addr.to_string());
    let result = sender.classify_file(&path).await;
    std::fs::remove_file(&path)?;

    let err = result.expect_err("text is not a JPEG");
    assert!(err.to_string().contains("422"));

    Ok(())
}

#[tokio::test]
async fn test_missing_file() {
    let sender = ImageSender::new("127.0.0.1:1");
    let result = sender.classify_file(Path::new("no/such/image.jpg")).await;
    assert!(result.is_err());
}
