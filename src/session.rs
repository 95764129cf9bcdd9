// Frame driver.
//
// The host owns an `AnimationSession` and calls into it: once when a new image
// has been decoded and once per scheduled display frame. The session talks back
// through `FrameHost` to present the frame buffer and to schedule or cancel the
// next tick. Nothing here blocks; one call renders at most one frame.

use crate::compose::{angle_for_frame, format_matrix, frame_transform, preview_transform};
use crate::config::Config;
use crate::error::Result;
use crate::im::{self, RGBAIm};
use crate::mat3::Mat3;
use crate::resample::{resample, resample_into, ResampleStats, Rounding, Sampling};
use std::path::Path;

/// Identifies one scheduled frame callback. Issued by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(pub u64);

/// What the session needs from the display side.
pub trait FrameHost {
    /// Shows a finished frame. Called synchronously, right after it was written.
    fn present(&mut self, frame: &RGBAIm);

    /// Arranges for `AnimationSession::on_tick` to be called with the returned
    /// handle on the next display frame.
    fn schedule_frame(&mut self) -> TickHandle;

    /// Withdraws a scheduled tick. Cancelling an already-fired handle is harmless.
    fn cancel_frame(&mut self, handle: TickHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No image, nothing scheduled.
    Idle,
    /// An image is loaded and exactly one tick is outstanding.
    Animating { pending: TickHandle },
}

#[derive(Debug)]
pub struct AnimationSession {
    config: Config,
    image: Option<RGBAIm>,
    frame: Option<RGBAIm>,
    elapsed_frames: u64,
    state: DriverState,
    paused: bool,
    composite: Mat3,
    last_stats: ResampleStats,
}

impl Default for AnimationSession {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AnimationSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            image: None,
            frame: None,
            elapsed_frames: 0,
            state: DriverState::Idle,
            paused: false,
            composite: Mat3::identity(),
            last_stats: ResampleStats::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Takes effect on the next rendered frame; a new `target_size` reallocates
    /// the frame buffer.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn elapsed_frames(&self) -> u64 {
        self.elapsed_frames
    }

    pub fn image(&self) -> Option<&RGBAIm> {
        self.image.as_ref()
    }

    pub fn frame(&self) -> Option<&RGBAIm> {
        self.frame.as_ref()
    }

    /// Composite used for the most recent frame.
    pub fn composite(&self) -> Mat3 {
        self.composite
    }

    pub fn matrix_text(&self) -> String {
        format_matrix(&self.composite)
    }

    pub fn last_stats(&self) -> ResampleStats {
        self.last_stats
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, ticks keep being scheduled but frames don't advance.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    // Load
    // -------------------------------------------------------------------------

    /// Starts (or restarts) the animation on a freshly decoded image.
    ///
    /// Frame 0 is rendered into a fresh buffer first; if that fails the running
    /// animation is left alone. Otherwise the outstanding tick is cancelled
    /// before the new image and buffer are installed, so frames of the previous
    /// image can never be presented afterwards. Frame 0 is presented
    /// immediately and the next tick is scheduled.
    pub fn on_image_decoded<H: FrameHost>(&mut self, image: RGBAIm, host: &mut H) -> Result<()> {
        let was_idle = self.state == DriverState::Idle;
        let start_frame = if was_idle || self.config.reset_on_reload {
            0
        } else {
            self.elapsed_frames
        };

        let size = self.config.target_size;
        let mut frame = RGBAIm::new(size, size);
        let (composite, stats) = render_into(&image, &mut frame, start_frame, &self.config)?;

        self.cancel_pending(host);
        log::info!(
            "animating {}x{} image into {size}x{size} frames (start frame {start_frame})",
            image.w,
            image.h,
        );
        self.image = Some(image);
        self.composite = composite;
        self.last_stats = stats;
        host.present(&frame);
        self.frame = Some(frame);
        self.elapsed_frames = start_frame + 1;

        self.state = DriverState::Animating {
            pending: host.schedule_frame(),
        };
        Ok(())
    }

    /// Decodes a raw PPM buffer and starts animating it.
    ///
    /// A decode failure leaves the session exactly as it was.
    pub fn load_ppm<H: FrameHost>(&mut self, bytes: &[u8], host: &mut H) -> Result<()> {
        let image = im::decode_ppm(bytes).inspect_err(|e| log::warn!("image load rejected: {e}"))?;
        self.on_image_decoded(image, host)
    }

    /// Like [`Self::load_ppm`] but reads from disk; non-PPM files go through `image`.
    pub fn load_path<H: FrameHost, P: AsRef<Path>>(&mut self, path: P, host: &mut H) -> Result<()> {
        let image = im::read_any(path.as_ref()).inspect_err(|e| {
            log::warn!("image load from {} rejected: {e}", path.as_ref().display())
        })?;
        self.on_image_decoded(image, host)
    }

    // Ticks
    // -------------------------------------------------------------------------

    /// Host callback for a scheduled display frame.
    ///
    /// Handles other than the outstanding one belong to a cancelled schedule and
    /// are ignored.
    pub fn on_tick<H: FrameHost>(&mut self, handle: TickHandle, host: &mut H) -> Result<()> {
        match self.state {
            DriverState::Animating { pending } if pending == handle => {}
            _ => {
                log::debug!("ignoring stale tick {handle:?} (state {:?})", self.state);
                return Ok(());
            }
        }

        if !self.paused {
            self.advance(host)?;
        }
        self.state = DriverState::Animating {
            pending: host.schedule_frame(),
        };
        Ok(())
    }

    /// Renders and presents exactly one frame, even while paused.
    pub fn step<H: FrameHost>(&mut self, host: &mut H) -> Result<()> {
        if self.image.is_none() {
            return Ok(());
        }
        self.advance(host)
    }

    /// Cancels the outstanding tick and drops the image.
    pub fn stop<H: FrameHost>(&mut self, host: &mut H) {
        self.cancel_pending(host);
        self.image = None;
        self.frame = None;
        self.elapsed_frames = 0;
        log::info!("animation stopped");
    }

    fn cancel_pending<H: FrameHost>(&mut self, host: &mut H) {
        if let DriverState::Animating { pending } = self.state {
            host.cancel_frame(pending);
        }
        self.state = DriverState::Idle;
    }

    fn advance<H: FrameHost>(&mut self, host: &mut H) -> Result<()> {
        if self.render_frame()?.is_none() {
            return Ok(());
        }
        if let Some(frame) = &self.frame {
            host.present(frame);
        }
        self.elapsed_frames += 1;
        Ok(())
    }

    // Rendering
    // -------------------------------------------------------------------------

    /// Composes this frame's transform and resamples the image into the frame
    /// buffer. Returns `None` when no image is loaded.
    pub fn render_frame(&mut self) -> Result<Option<&RGBAIm>> {
        let Some(image) = &self.image else {
            return Ok(None);
        };

        let size = self.config.target_size;
        if !matches!(&self.frame, Some(f) if f.w == size && f.h == size) {
            self.frame = Some(RGBAIm::new(size, size));
        }
        let Some(frame) = self.frame.as_mut() else {
            return Ok(None);
        };

        let (composite, stats) = render_into(image, frame, self.elapsed_frames, &self.config)?;
        self.composite = composite;
        self.last_stats = stats;
        Ok(Some(&*frame))
    }

    /// The loaded image mirrored top-to-bottom at its own size, floor-sampled
    /// with the configured origin. `None` when no image is loaded.
    pub fn render_preview(&self) -> Result<Option<RGBAIm>> {
        let Some(image) = &self.image else {
            return Ok(None);
        };
        let sampling = Sampling {
            rounding: Rounding::Floor,
            origin: self.config.sample_origin,
        };
        let m = preview_transform(image.h, sampling.origin);
        log::debug!("preview:\n{}", format_matrix(&m));
        resample(image, &m, image.w, image.h, sampling).map(Some)
    }

    /// Pauses the animation and presents the preview in place of the current
    /// frame. Returns false when there is nothing to preview.
    pub fn show_preview<H: FrameHost>(&mut self, host: &mut H) -> Result<bool> {
        let Some(preview) = self.render_preview()? else {
            return Ok(false);
        };
        self.paused = true;
        host.present(&preview);
        Ok(true)
    }
}

/// Composes the transform for `frame_i` and resamples `image` into `frame`.
fn render_into(
    image: &RGBAIm,
    frame: &mut RGBAIm,
    frame_i: u64,
    config: &Config,
) -> Result<(Mat3, ResampleStats)> {
    let angle = angle_for_frame(frame_i, config.angular_step_deg);
    let composite = frame_transform(image.w, image.h, frame.w, angle);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!("frame {frame_i} angle {angle}:\n{}", format_matrix(&composite));
    }
    let stats = resample_into(image, frame, &composite, config.sampling())?;
    Ok((composite, stats))
}
