use std::time::Duration;

use reqwest::Client;
use tracing::debug;

/// Raw RGBA pixels plus width and height.
pub type Pixels = (Vec<u8>, u32, u32);

/// Asks GitHub's avatar CDN for a specific size.
fn sized_url(url: &str, size: u32) -> String {
    if url.contains('?') {
        format!("{url}&s={size}")
    } else {
        format!("{url}?s={size}")
    }
}

/// Decodes image bytes and scales them to exactly `size` x `size`.
fn decode(bytes: &[u8], size: u32) -> Option<Pixels> {
    let image = image::load_from_memory(bytes).ok()?;
    // The CDN sometimes ignores `s=` and serves a cached larger image.
    let rgba = image.thumbnail_exact(size, size).to_rgba8();
    let (w, h) = rgba.dimensions();
    Some((rgba.into_raw(), w, h))
}

/// Downloads an avatar. `None` on any failure or after `timeout`; the card
/// renders without it.
pub async fn download(client: &Client, url: &str, size: u32, timeout: Duration) -> Option<Pixels> {
    if url.is_empty() {
        return None;
    }
    let url = sized_url(url, size);

    let response = client
        .get(&url)
        .timeout(timeout)
        .send()
        .await
        .and_then(|r| r.error_for_status());
    let bytes = match response {
        Ok(response) => response.bytes().await.ok()?,
        Err(e) => {
            debug!(%url, "avatar download failed: {e}");
            return None;
        }
    };

    decode(&bytes, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use tokio::net::TcpListener;

    #[test]
    fn size_parameter_respects_existing_query() {
        assert_eq!(
            sized_url("https://avatars.githubusercontent.com/u/583231?v=4", 64),
            "https://avatars.githubusercontent.com/u/583231?v=4&s=64"
        );
        assert_eq!(
            sized_url("https://avatars.githubusercontent.com/u/583231", 64),
            "https://avatars.githubusercontent.com/u/583231?s=64"
        );
    }

    #[test]
    fn decodes_and_resizes_png() {
        let mut png = Vec::new();
        RgbaImage::from_pixel(200, 120, Rgba([255, 0, 0, 255]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let (pixels, w, h) = decode(&png, 64).unwrap();
        assert_eq!((w, h), (64, 64));
        assert_eq!(pixels.len(), 64 * 64 * 4);
    }

    #[test]
    fn garbage_bytes_give_none() {
        assert!(decode(b"<html>not an image</html>", 64).is_none());
    }

    #[tokio::test]
    async fn stalled_cdn_gives_up_after_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/u/583231", listener.local_addr().unwrap());
        tokio::spawn(async move {
            // Accept and never answer.
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let pixels = tokio::time::timeout(
            Duration::from_secs(5),
            download(&Client::new(), &url, 64, Duration::from_millis(200)),
        )
        .await
        .expect("download should give up on its own");
        assert!(pixels.is_none());
    }

    #[tokio::test]
    async fn empty_url_is_skipped() {
        assert!(download(&Client::new(), "", 64, Duration::from_secs(1)).await.is_none());
    }
}
