use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::{Context as _, Result, anyhow};
use eframe::egui::{ColorImage, Context, TextureHandle, TextureOptions};
use resvg::{tiny_skia, usvg};
use tracing::{debug, warn};

use crate::influencers::{Dataset, fetch_bytes};

const BACKDROP_TARGET_WIDTH: f32 = 1600.0;
const PORTRAIT_MAX_SIDE: u32 = 256;

enum AssetMessage {
    Backdrop(ColorImage),
    Portrait { rank: u32, image: ColorImage },
}

/// Textures for the backdrop and per-record portraits, filled in as the
/// asset worker delivers them.
#[derive(Default)]
pub(in crate::app) struct AssetStore {
    rx: Option<Receiver<AssetMessage>>,
    backdrop: Option<TextureHandle>,
    portraits: HashMap<u32, TextureHandle>,
}

impl AssetStore {
    pub(in crate::app) fn spawn(ctx: &Context, backdrop: String, dataset: &Dataset) -> Self {
        let jobs = dataset
            .records
            .iter()
            .filter(|record| !record.image_url.trim().is_empty())
            .map(|record| (record.rank, record.image_url.clone()))
            .collect::<Vec<_>>();

        Self {
            rx: Some(spawn_asset_worker(ctx.clone(), backdrop, jobs)),
            ..Self::default()
        }
    }

    /// Uploads whatever the worker finished since the last frame.
    pub(in crate::app) fn poll(&mut self, ctx: &Context) {
        let Some(rx) = self.rx.as_ref() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(AssetMessage::Backdrop(image)) => {
                    self.backdrop =
                        Some(ctx.load_texture("backdrop", image, TextureOptions::LINEAR));
                }
                Ok(AssetMessage::Portrait { rank, image }) => {
                    let texture =
                        ctx.load_texture(format!("influencer-{rank}"), image, TextureOptions::LINEAR);
                    self.portraits.insert(rank, texture);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    debug!(portraits = self.portraits.len(), "asset worker finished");
                    self.rx = None;
                    break;
                }
            }
        }
    }

    pub(in crate::app) fn backdrop(&self) -> Option<&TextureHandle> {
        self.backdrop.as_ref()
    }

    pub(in crate::app) fn portrait(&self, rank: u32) -> Option<&TextureHandle> {
        self.portraits.get(&rank)
    }
}

fn spawn_asset_worker(
    ctx: Context,
    backdrop: String,
    jobs: Vec<(u32, String)>,
) -> Receiver<AssetMessage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        match load_backdrop(&backdrop) {
            Ok(image) => {
                if tx.send(AssetMessage::Backdrop(image)).is_err() {
                    return;
                }
                ctx.request_repaint();
            }
            Err(error) => warn!(source = %backdrop, "backdrop unavailable: {error:#}"),
        }

        for (rank, url) in jobs {
            match load_portrait(&url) {
                Ok(image) => {
                    if tx.send(AssetMessage::Portrait { rank, image }).is_err() {
                        return;
                    }
                    ctx.request_repaint();
                }
                Err(error) => warn!(rank, url = %url, "image unavailable: {error:#}"),
            }
        }
    });

    rx
}

fn load_backdrop(source: &str) -> Result<ColorImage> {
    let bytes = fetch_bytes(source)?;
    if is_svg(source, &bytes) {
        rasterize_svg(&bytes).with_context(|| format!("failed to rasterize {source}"))
    } else {
        decode_raster(&bytes, None).with_context(|| format!("failed to decode {source}"))
    }
}

fn load_portrait(url: &str) -> Result<ColorImage> {
    let bytes = fetch_bytes(url)?;
    decode_raster(&bytes, Some(PORTRAIT_MAX_SIDE))
        .with_context(|| format!("failed to decode {url}"))
}

fn is_svg(source: &str, bytes: &[u8]) -> bool {
    let path = source.split(['?', '#']).next().unwrap_or(source);
    if path.to_ascii_lowercase().ends_with(".svg") {
        return true;
    }

    let head = &bytes[..bytes.len().min(512)];
    String::from_utf8_lossy(head).contains("<svg")
}

fn rasterize_svg(bytes: &[u8]) -> Result<ColorImage> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
    let size = tree.size();
    let scale = BACKDROP_TARGET_WIDTH / size.width().max(1.0);
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("failed to allocate {width}x{height} pixmap"))?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    Ok(ColorImage::from_rgba_premultiplied(
        [width as usize, height as usize],
        pixmap.data(),
    ))
}

fn decode_raster(bytes: &[u8], max_side: Option<u32>) -> Result<ColorImage> {
    let mut decoded = image::load_from_memory(bytes)?;
    if let Some(max_side) = max_side
        && (decoded.width() > max_side || decoded.height() > max_side)
    {
        decoded = decoded.thumbnail(max_side, max_side);
    }

    let rgba = decoded.to_rgba8();
    let size = [
        usize::try_from(rgba.width())?,
        usize::try_from(rgba.height())?,
    ];
    Ok(ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw()))
}
