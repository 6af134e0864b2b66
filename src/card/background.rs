//! Card backgrounds: a solid color or an image, always 1200×630.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};

use super::color::Rgb;
use super::{HEIGHT, WIDTH};
use crate::debug;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the card's base image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Background {
    /// Solid fill.
    Solid(Rgb),
    /// Local image file, already resolved against the site root.
    File(PathBuf),
    /// Remote image fetched over HTTP(S).
    Url(String),
}

impl Background {
    /// Classify a background setting.
    ///
    /// Any string containing six consecutive hex digits is a color, so
    /// `#1d2021`, `1d2021` and `color: 1d2021` all fill with the same value.
    /// `http://` and `https://` values are fetched; anything else is a path
    /// relative to `root`.
    pub fn parse(value: &str, root: &Path) -> Self {
        if let Some(color) = Rgb::find_hex6(value) {
            return Self::Solid(color);
        }
        if is_remote(value) {
            return Self::Url(value.to_string());
        }
        Self::File(root.join(value))
    }

    /// Produce a fresh base image at card size.
    pub fn render(&self) -> Result<RgbaImage> {
        let image = match self {
            Self::Solid(color) => return Ok(RgbaImage::from_pixel(WIDTH, HEIGHT, color.rgba())),
            Self::File(path) => image::open(path)
                .with_context(|| format!("Failed to load background image {}", path.display()))?,
            Self::Url(url) => fetch(url)?,
        };
        Ok(fit_canvas(image))
    }
}

fn is_remote(value: &str) -> bool {
    url::Url::parse(value).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Scale and center-crop to exactly fill the card.
fn fit_canvas(image: DynamicImage) -> RgbaImage {
    if (image.width(), image.height()) == (WIDTH, HEIGHT) {
        return image.into_rgba8();
    }
    debug!(
        "background";
        "resizing {}x{} to {WIDTH}x{HEIGHT}",
        image.width(),
        image.height()
    );
    image
        .resize_to_fill(WIDTH, HEIGHT, FilterType::Lanczos3)
        .into_rgba8()
}

fn fetch(url: &str) -> Result<DynamicImage> {
    debug!("background"; "fetching {}", url);
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;
    let bytes = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::bytes)
        .with_context(|| format!("Failed to fetch background {url}"))?;
    image::load_from_memory(&bytes).with_context(|| format!("Failed to decode background {url}"))
}
