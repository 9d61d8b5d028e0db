// Asynchronous layer compositor.
//
// Each request decodes its payloads on worker threads (one per layer) and is
// tagged with a generation. Decoded layers come back over a channel that the
// event loop drains between frames; only the most recently issued generation
// is ever drawn, so a superseded request finishing late is a no-op.

use crate::blend;
use crate::types::{Rgb, Surface, pack};
use image::imageops::{self, FilterType};
use image::{ImageError, RgbaImage};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
#[cfg(test)]
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Encoded raster bytes (PNG, JPEG, ...) as delivered by the analysis step.
pub type Payload = Arc<[u8]>;

/// Up to three derived layers plus the blend alpha of the middle one.
/// Immutable once received.
#[derive(Clone, Debug)]
pub struct LayerSet {
    pub base: Payload,
    pub mid: Option<Payload>,
    pub top: Option<Payload>,
    pub mid_alpha: f32,
}

impl LayerSet {
    pub fn new(base: impl Into<Payload>) -> Self {
        Self { base: base.into(), mid: None, top: None, mid_alpha: 1.0 }
    }

    pub fn with_mid(mut self, mid: impl Into<Payload>, alpha: f32) -> Self {
        self.mid = Some(mid.into());
        self.mid_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_top(mut self, top: impl Into<Payload>) -> Self {
        self.top = Some(top.into());
        self
    }

    fn members(&self) -> impl Iterator<Item = (Slot, &Payload)> {
        [
            (Slot::Base, Some(&self.base)),
            (Slot::Mid, self.mid.as_ref()),
            (Slot::Top, self.top.as_ref()),
        ]
        .into_iter()
        .filter_map(|(slot, payload)| payload.map(|p| (slot, p)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

/// Z-order position of a layer; also its index into `Pending::images`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    Base = 0,
    Mid = 1,
    Top = 2,
}

/// One finished decode, as sent back by a worker.
#[derive(Debug)]
pub struct Decoded {
    pub generation: Generation,
    pub slot: Slot,
    pub result: Result<RgbaImage, ImageError>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum CompositeEvent {
    /// The current generation still has layers in flight.
    Waiting,
    /// Every layer decoded and the surface was repainted.
    Drawn(Generation),
    /// A layer failed to decode; this generation will never draw.
    Failed(Generation),
    /// A result for a superseded or abandoned generation; dropped.
    Stale(Generation),
}

struct Pending {
    generation: Generation,
    mid_alpha: f32,
    expected: [bool; 3],
    images: [Option<RgbaImage>; 3],
}

impl Pending {
    fn is_complete(&self) -> bool {
        self.expected.iter().zip(&self.images).all(|(want, got)| !want || got.is_some())
    }
}

pub struct LayerCompositor {
    background: Rgb,
    latest: Generation,
    pending: Option<Pending>,
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl LayerCompositor {
    pub fn new(background: Rgb) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { background, latest: Generation::default(), pending: None, tx, rx }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start decoding every present layer in parallel under a fresh generation.
    pub fn request(&mut self, set: &LayerSet) -> Generation {
        self.latest = self.latest.next();
        let generation = self.latest;

        let mut expected = [false; 3];
        for (slot, payload) in set.members() {
            expected[slot as usize] = true;
            let tx = self.tx.clone();
            let payload = Arc::clone(payload);
            thread::spawn(move || {
                let result = image::load_from_memory(&payload).map(|img| img.to_rgba8());
                // The compositor may already be gone; then nobody wants this.
                let _ = tx.send(Decoded { generation, slot, result });
            });
        }

        info!(
            generation = generation.get(),
            layers = expected.iter().filter(|&&e| e).count(),
            "composite requested"
        );
        self.pending = Some(Pending {
            generation,
            mid_alpha: set.mid_alpha.clamp(0.0, 1.0),
            expected,
            images: [None, None, None],
        });
        generation
    }

    /// Make every outstanding request stale without issuing a new one.
    pub fn invalidate(&mut self) {
        self.latest = self.latest.next();
        if self.pending.take().is_some() {
            debug!(generation = self.latest.get(), "outstanding composite abandoned");
        }
    }

    /// Drain finished decodes without blocking. Returns the last event handled.
    pub fn poll(&mut self, surface: &mut Surface) -> Option<CompositeEvent> {
        let mut last = None;
        while let Ok(decoded) = self.rx.try_recv() {
            last = Some(self.accept(decoded, surface));
        }
        last
    }

    /// Completion handler for one decoded layer.
    pub fn accept(&mut self, decoded: Decoded, surface: &mut Surface) -> CompositeEvent {
        let Decoded { generation, slot, result } = decoded;
        if generation != self.latest {
            debug!(generation = generation.get(), latest = self.latest.get(), "stale layer dropped");
            return CompositeEvent::Stale(generation);
        }
        let Some(pending) = self.pending.as_mut().filter(|p| p.generation == generation) else {
            // current generation, but it already failed
            return CompositeEvent::Stale(generation);
        };

        match result {
            Err(err) => {
                warn!(generation = generation.get(), ?slot, error = %err, "layer decode failed; composite aborted");
                self.pending = None;
                CompositeEvent::Failed(generation)
            }
            Ok(image) => {
                pending.images[slot as usize] = Some(image);
                if !pending.is_complete() {
                    return CompositeEvent::Waiting;
                }
                if let Some(ready) = self.pending.take() {
                    self.composite(&ready, surface);
                }
                info!(generation = generation.get(), "composite drawn");
                CompositeEvent::Drawn(generation)
            }
        }
    }

    /// Background, then base, then mid at its alpha, then top fully opaque.
    fn composite(&self, ready: &Pending, surface: &mut Surface) {
        surface.fill(self.background);
        let [base, mid, top] = &ready.images;
        if let Some(base) = base {
            Self::draw_stretched(surface, base, 1.0);
        }
        if let Some(mid) = mid {
            Self::draw_stretched(surface, mid, ready.mid_alpha);
        }
        // opacity is back to 1.0 for everything after the mid layer
        if let Some(top) = top {
            Self::draw_stretched(surface, top, 1.0);
        }
    }

    /// Scale `image` to the surface and lay it over at `alpha` times its own alpha.
    fn draw_stretched(surface: &mut Surface, image: &RgbaImage, alpha: f32) {
        let (w, h) = (surface.width as u32, surface.height as u32);
        let scaled;
        let image = if image.dimensions() == (w, h) {
            image
        } else {
            scaled = imageops::resize(image, w, h, FilterType::Triangle);
            &scaled
        };
        for (dst, src) in surface.pixels.iter_mut().zip(image.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = blend::mix(*dst, pack(r, g, b), alpha * a as f32 / 255.0);
        }
    }

    /// Block until the latest generation draws or fails, or the timeout hits.
    #[cfg(test)]
    pub fn wait(&mut self, surface: &mut Surface, timeout: Duration) -> CompositeEvent {
        let deadline = Instant::now() + timeout;
        loop {
            let left = deadline.saturating_duration_since(Instant::now());
            let Ok(decoded) = self.rx.recv_timeout(left) else {
                return CompositeEvent::Waiting;
            };
            let event = self.accept(decoded, surface);
            let latest = self.latest;
            if matches!(event, CompositeEvent::Drawn(g) | CompositeEvent::Failed(g) if g == latest) {
                return event;
            }
        }
    }
}
