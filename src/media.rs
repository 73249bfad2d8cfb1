//! Guards for asynchronous frame requests.
//!
//! Every request is stamped with a [`RequestTicket`] from the consumer's
//! [`RequestGuard`]. Results arriving for an older ticket, or after the
//! guard was torn down, are dropped so they can never overwrite a newer
//! frame or touch a view that no longer exists.

use eyre::{Result, WrapErr};
use gpui::RenderImage;
use image::RgbaImage;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct GuardState {
    generation: AtomicU64,
    torn_down: AtomicBool,
}

/// Generation counter tied to the lifetime of one consumer.
#[derive(Clone, Default)]
pub struct RequestGuard {
    state: Arc<GuardState>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, invalidating every ticket issued before it.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.state.generation.fetch_add(1, Ordering::AcqRel) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        !self.is_torn_down() && self.state.generation.load(Ordering::Acquire) == ticket.0
    }

    /// Marks the consumer as gone; no ticket is current afterwards.
    pub fn tear_down(&self) {
        self.state.torn_down.store(true, Ordering::Release);
    }

    pub fn is_torn_down(&self) -> bool {
        self.state.torn_down.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for RequestGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGuard")
            .field("generation", &self.state.generation.load(Ordering::Relaxed))
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

/// Decoded frame, kept in the BGRA layout GPUI paints from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub frame_index: u32,
    pub width: u32,
    pub height: u32,
    pub image: Arc<RenderImage>,
}

impl VideoFrame {
    /// Builds a frame from tightly packed RGBA8 pixels.
    pub fn new(frame_index: u32, width: u32, height: u32, mut rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            eyre::bail!(
                "frame {frame_index}: expected {expected} bytes for {width}x{height}, got {}",
                rgba.len()
            );
        }
        for pixel in rgba.chunks_exact_mut(4) {
            pixel.swap(0, 2);
        }
        let buffer = RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| eyre::eyre!("frame {frame_index}: invalid {width}x{height} buffer"))?;
        Ok(Self {
            frame_index,
            width,
            height,
            image: Arc::new(RenderImage::new(vec![image::Frame::new(buffer)])),
        })
    }
}

/// Caller-supplied provider of decoded frames. The crate never opens a
/// media URI itself. Fetches run on a background thread.
pub trait FrameSource: Send + Sync {
    fn fetch_frame(&self, uri: &str, frame_index: u32) -> Result<VideoFrame>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FrameContent {
    #[default]
    Empty,
    Frame(VideoFrame),
    /// Fetch or decode failed; shown as a placeholder box.
    Placeholder { frame_index: u32, message: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Accepted,
    Stale,
}

/// One in-flight fetch. Safe to move to a worker; hand the result back to
/// [`FrameSlot::finish`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    pub ticket: RequestTicket,
    pub frame_index: u32,
    pub uri: String,
}

impl FrameRequest {
    pub fn fetch(&self, source: &dyn FrameSource) -> Result<VideoFrame> {
        source
            .fetch_frame(&self.uri, self.frame_index)
            .wrap_err_with(|| format!("failed to fetch frame {} of {}", self.frame_index, self.uri))
    }
}

/// Latest accepted frame of one consumer.
#[derive(Debug, Default)]
pub struct FrameSlot {
    guard: RequestGuard,
    content: FrameContent,
    requested: Option<u32>,
}

impl FrameSlot {
    pub fn new(guard: RequestGuard) -> Self {
        Self {
            guard,
            content: FrameContent::Empty,
            requested: None,
        }
    }

    pub fn guard(&self) -> &RequestGuard {
        &self.guard
    }

    pub fn content(&self) -> &FrameContent {
        &self.content
    }

    /// Issues a ticket for `frame_index` unless that frame is already the
    /// latest request.
    pub fn request(&mut self, frame_index: u32) -> Option<RequestTicket> {
        if self.requested == Some(frame_index) || self.guard.is_torn_down() {
            return None;
        }
        self.requested = Some(frame_index);
        Some(self.guard.issue())
    }

    pub fn begin(&mut self, uri: &str, frame_index: u32) -> Option<FrameRequest> {
        let ticket = self.request(frame_index)?;
        Some(FrameRequest {
            ticket,
            frame_index,
            uri: uri.to_string(),
        })
    }

    /// Stores a result if `ticket` is still current. A failure leaves the
    /// frame requestable again.
    pub fn deliver(
        &mut self,
        ticket: RequestTicket,
        frame_index: u32,
        result: Result<VideoFrame>,
    ) -> Delivery {
        if !self.guard.is_current(ticket) {
            debug!(
                frame_index,
                generation = ticket.generation(),
                "discarding stale frame result"
            );
            return Delivery::Stale;
        }
        self.content = match result {
            Ok(frame) => FrameContent::Frame(frame),
            Err(err) => {
                warn!(frame_index, error = %err, "frame fetch failed");
                self.requested = None;
                FrameContent::Placeholder {
                    frame_index,
                    message: format!("{err:#}"),
                }
            }
        };
        Delivery::Accepted
    }

    pub fn finish(&mut self, request: FrameRequest, result: Result<VideoFrame>) -> Delivery {
        self.deliver(request.ticket, request.frame_index, result)
    }

    /// Requests and fetches synchronously through `source`.
    pub fn load(&mut self, source: &dyn FrameSource, uri: &str, frame_index: u32) -> Delivery {
        let Some(request) = self.begin(uri, frame_index) else {
            return Delivery::Stale;
        };
        let result = request.fetch(source);
        self.finish(request, result)
    }
}
