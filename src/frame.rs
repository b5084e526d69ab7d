//! Host loop plumbing: surface sizing, frame clocks and the per-frame tick.
//!
//! The loop owns everything that persists between frames (elapsed time and
//! the current surface size) and forwards it to a [`RenderTarget`]. Targets
//! never see a zero-area frame and never see a frame after [`FrameLoop::stop`].

use std::time::Instant;

use crate::error::RenderError;

/// Surface dimensions in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Surface size for a window's physical size, with the device-pixel-ratio capped.
    ///
    /// Below the cap the physical size is used as is. Above it, both sides
    /// shrink by `max_scale_factor / scale_factor` and floor. A scale factor
    /// that is not finite counts as uncapped.
    pub fn from_physical(
        width: u32,
        height: u32,
        scale_factor: f64,
        max_scale_factor: f64,
    ) -> Self {
        if !(scale_factor.is_finite() && scale_factor > max_scale_factor) {
            return Self::new(width, height);
        }
        let ratio = max_scale_factor / scale_factor;
        let shrink = |v: u32| (v as f64 * ratio).floor() as u32;
        Self::new(shrink(width), shrink(height))
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Remembers the last surface size so resizes happen only on change
#[derive(Debug, Default)]
pub struct SurfaceTracker {
    current: Option<SurfaceSize>,
}

impl SurfaceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `size`; returns it only if it differs from the last one
    pub fn update(&mut self, size: SurfaceSize) -> Option<SurfaceSize> {
        if self.current == Some(size) {
            return None;
        }
        self.current = Some(size);
        Some(size)
    }

    pub fn current(&self) -> Option<SurfaceSize> {
        self.current
    }
}

/// Source of the elapsed time handed to the compositor
pub trait FrameClock {
    /// Seconds since the renderer started, sampled once per frame
    fn elapsed_s(&mut self, frame_index: u64) -> f32;

    /// Reset the time origin to now (no-op for synthetic clocks)
    fn restart(&mut self) {}
}

impl<C: FrameClock + ?Sized> FrameClock for Box<C> {
    fn elapsed_s(&mut self, frame_index: u64) -> f32 {
        (**self).elapsed_s(frame_index)
    }

    fn restart(&mut self) {
        (**self).restart()
    }
}

/// Wall-clock time since construction
#[derive(Debug)]
pub struct WallClock {
    start: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for WallClock {
    fn elapsed_s(&mut self, _frame_index: u64) -> f32 {
        self.start.elapsed().as_secs_f32()
    }

    fn restart(&mut self) {
        self.start = Instant::now();
    }
}

/// Synthetic time advancing a fixed step per frame (recording and tests)
#[derive(Debug, Clone)]
pub struct FixedStepClock {
    start_s: f32,
    fps: u32,
}

impl FixedStepClock {
    pub fn new(fps: u32) -> Self {
        Self::starting_at(0.0, fps)
    }

    pub fn starting_at(start_s: f32, fps: u32) -> Self {
        Self {
            start_s,
            fps: fps.max(1),
        }
    }
}

impl FrameClock for FixedStepClock {
    fn elapsed_s(&mut self, frame_index: u64) -> f32 {
        self.start_s + (frame_index as f64 / self.fps as f64) as f32
    }
}

/// Everything a target needs to draw one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    pub time_s: f32,
    pub size: SurfaceSize,
    pub frame_index: u64,
}

/// Something the frame loop can draw into
pub trait RenderTarget {
    /// Adopt a new surface size (only called when the size changed)
    fn resize(&mut self, size: SurfaceSize);

    /// Draw one frame; `frame.size` is never zero-area
    fn draw(&mut self, frame: &FrameInput) -> Result<(), RenderError>;
}

/// Result of one loop tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// A frame was drawn
    Drawn(FrameInput),

    /// Surface has zero area; nothing was drawn
    Skipped,

    /// The loop was stopped; nothing will be drawn again
    Stopped,
}

/// Per-frame driver with an injectable time source
#[derive(Debug)]
pub struct FrameLoop<C> {
    clock: C,
    tracker: SurfaceTracker,
    frame_index: u64,
    running: bool,
}

impl<C: FrameClock> FrameLoop<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tracker: SurfaceTracker::new(),
            frame_index: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of frames drawn so far
    pub fn frames_drawn(&self) -> u64 {
        self.frame_index
    }

    /// Start counting time from now, once the target is ready to draw
    pub fn restart_clock(&mut self) {
        self.clock.restart();
    }

    /// Stop scheduling frames. Idempotent.
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Frame loop stopped after {} frames", self.frame_index);
            self.running = false;
        }
    }

    /// Run one tick: resize the target if needed, then draw unless the
    /// surface is empty or the loop has been stopped.
    pub fn run_frame<T: RenderTarget + ?Sized>(
        &mut self,
        target: &mut T,
        size: SurfaceSize,
    ) -> Result<FrameOutcome, RenderError> {
        if !self.running {
            return Ok(FrameOutcome::Stopped);
        }

        if let Some(new_size) = self.tracker.update(size) {
            log::debug!("Surface resized to {}x{}", new_size.width, new_size.height);
            target.resize(new_size);
        }

        if size.is_empty() {
            return Ok(FrameOutcome::Skipped);
        }

        let frame = FrameInput {
            time_s: self.clock.elapsed_s(self.frame_index),
            size,
            frame_index: self.frame_index,
        };
        target.draw(&frame)?;
        self.frame_index += 1;

        Ok(FrameOutcome::Drawn(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call it receives
    #[derive(Default)]
    struct RecordingTarget {
        resizes: Vec<SurfaceSize>,
        frames: Vec<FrameInput>,
    }

    impl RenderTarget for RecordingTarget {
        fn resize(&mut self, size: SurfaceSize) {
            self.resizes.push(size);
        }

        fn draw(&mut self, frame: &FrameInput) -> Result<(), RenderError> {
            self.frames.push(*frame);
            Ok(())
        }
    }

    #[test]
    fn test_scale_factor_is_capped() {
        let size = SurfaceSize::from_physical(3200, 2400, 4.0, 2.0);
        assert_eq!(size, SurfaceSize::new(1600, 1200));

        let size = SurfaceSize::from_physical(1001, 751, 2.5, 2.0);
        assert_eq!(size, SurfaceSize::new(800, 600));
    }

    #[test]
    fn test_physical_size_kept_below_cap() {
        for scale in [1.0, 1.1, 1.25, 1.75, 2.0] {
            for width in (1..4000).step_by(7) {
                let size = SurfaceSize::from_physical(width, 600, scale, 2.0);
                assert_eq!(size, SurfaceSize::new(width, 600), "scale {}", scale);
            }
        }
    }

    #[test]
    fn test_window_size_survives_logical_round_trip() {
        use winit::dpi::PhysicalSize;

        let inner = PhysicalSize::new(453u32, 600u32);
        let logical = inner.to_logical::<f64>(1.75);
        let physical: PhysicalSize<u32> = logical.to_physical(1.75);
        let size = SurfaceSize::from_physical(physical.width, physical.height, 1.75, 2.0);
        assert_eq!(size, SurfaceSize::new(453, 600));
    }

    #[test]
    fn test_bad_scale_factor_leaves_size_alone() {
        for scale in [f64::NAN, f64::INFINITY] {
            let size = SurfaceSize::from_physical(640, 480, scale, 2.0);
            assert_eq!(size, SurfaceSize::new(640, 480));
        }
    }

    #[test]
    fn test_tracker_reports_only_changes() {
        let mut tracker = SurfaceTracker::new();
        let size = SurfaceSize::new(800, 600);
        assert_eq!(tracker.update(size), Some(size));
        assert_eq!(tracker.update(size), None);
        assert_eq!(tracker.update(SurfaceSize::new(801, 600)), Some(SurfaceSize::new(801, 600)));
        assert_eq!(tracker.current(), Some(SurfaceSize::new(801, 600)));
    }

    #[test]
    fn test_fixed_step_clock() {
        let mut clock = FixedStepClock::new(60);
        assert_eq!(clock.elapsed_s(0), 0.0);
        assert!((clock.elapsed_s(90) - 1.5).abs() < 1e-6);

        let mut offset = FixedStepClock::starting_at(10.0, 30);
        assert!((offset.elapsed_s(15) - 10.5).abs() < 1e-6);
    }

    #[test]
    fn test_boxed_clock_drives_loop() {
        let clock: Box<dyn FrameClock> = Box::new(FixedStepClock::new(2));
        let mut frame_loop = FrameLoop::new(clock);
        let mut target = RecordingTarget::default();
        frame_loop.run_frame(&mut target, SurfaceSize::new(4, 4)).unwrap();
        frame_loop.run_frame(&mut target, SurfaceSize::new(4, 4)).unwrap();
        assert_eq!(target.frames[1].time_s, 0.5);
    }

    #[test]
    fn test_restart_excludes_setup_time() {
        let clock: Box<dyn FrameClock> = Box::new(WallClock::new());
        let mut frame_loop = FrameLoop::new(clock);
        std::thread::sleep(std::time::Duration::from_millis(50));
        frame_loop.restart_clock();

        let mut target = RecordingTarget::default();
        frame_loop.run_frame(&mut target, SurfaceSize::new(4, 4)).unwrap();
        assert!(target.frames[0].time_s < 0.05);
    }

    #[test]
    fn test_wall_clock_is_monotonic() {
        let mut clock = WallClock::new();
        let a = clock.elapsed_s(0);
        let b = clock.elapsed_s(1);
        assert!(a >= 0.0);
        assert!(b >= a);
    }

    #[test]
    fn test_loop_resizes_once_per_change() {
        let mut frame_loop = FrameLoop::new(FixedStepClock::new(60));
        let mut target = RecordingTarget::default();
        let size = SurfaceSize::new(320, 240);

        frame_loop.run_frame(&mut target, size).unwrap();
        frame_loop.run_frame(&mut target, size).unwrap();
        frame_loop.run_frame(&mut target, size).unwrap();

        assert_eq!(target.resizes, vec![size]);
        assert_eq!(target.frames.len(), 3);
        assert!(target.frames[2].time_s > target.frames[1].time_s);
    }

    #[test]
    fn test_zero_area_frame_is_skipped() {
        let mut frame_loop = FrameLoop::new(FixedStepClock::new(60));
        let mut target = RecordingTarget::default();

        let outcome = frame_loop
            .run_frame(&mut target, SurfaceSize::new(0, 0))
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert!(target.frames.is_empty());

        // Collapsed in one dimension only
        let outcome = frame_loop
            .run_frame(&mut target, SurfaceSize::new(640, 0))
            .unwrap();
        assert_eq!(outcome, FrameOutcome::Skipped);
        assert!(target.frames.is_empty());
        assert_eq!(frame_loop.frames_drawn(), 0);
    }

    #[test]
    fn test_stopped_loop_never_draws() {
        let mut frame_loop = FrameLoop::new(FixedStepClock::new(60));
        let mut target = RecordingTarget::default();
        let size = SurfaceSize::new(64, 64);

        frame_loop.run_frame(&mut target, size).unwrap();
        frame_loop.stop();
        frame_loop.stop();

        let outcome = frame_loop.run_frame(&mut target, size).unwrap();
        assert_eq!(outcome, FrameOutcome::Stopped);
        assert!(!frame_loop.is_running());
        assert_eq!(target.frames.len(), 1);
    }

    #[test]
    fn test_frames_carry_synthetic_time() {
        let mut frame_loop = FrameLoop::new(FixedStepClock::starting_at(2.0, 4));
        let mut target = RecordingTarget::default();
        for _ in 0..5 {
            frame_loop
                .run_frame(&mut target, SurfaceSize::new(8, 8))
                .unwrap();
        }
        let times: Vec<f32> = target.frames.iter().map(|f| f.time_s).collect();
        assert_eq!(times, vec![2.0, 2.25, 2.5, 2.75, 3.0]);
    }
}
