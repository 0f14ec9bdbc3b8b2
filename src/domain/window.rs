// Viewport window over a dataset, in sample-index space
use super::sample::Sample;
use serde::Serialize;

/// Smallest index span a zoom-in will shrink the window to.
pub const MIN_WINDOW_SPAN: usize = 10;

/// Fraction of the current span removed (or added) on each side per zoom step.
pub const ZOOM_FACTOR: f64 = 0.1;

/// Inclusive index range of the visible samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start_index: usize,
    pub end_index: usize,
}

impl Window {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    /// Full view over `len` samples, `{0, 0}` when there is nothing to show.
    pub fn full(len: usize) -> Self {
        Self::new(0, len.saturating_sub(1))
    }

    pub fn span(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Zoom/pan state machine for one chart.
///
/// All arithmetic is clamped to the dataset bounds; no command can leave the
/// window outside `0 <= start < end <= len - 1` once `len >= 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    len: usize,
    window: Window,
}

impl Viewport {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            window: Window::full(len),
        }
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn len(&self) -> usize {
        self.len
    }

    /// True when there are fewer than two samples to draw a line through.
    pub fn is_degenerate(&self) -> bool {
        self.len < 2
    }

    pub fn reset_window(&mut self) {
        self.window = Window::full(self.len);
    }

    /// Point the viewport at a dataset of `len` samples.
    ///
    /// Returns true when the length changed and the window was reset.
    pub fn set_len(&mut self, len: usize) -> bool {
        if self.len == len {
            return false;
        }
        self.len = len;
        self.reset_window();
        true
    }

    pub fn is_zoomed(&self) -> bool {
        self.window != Window::full(self.len)
    }

    /// Returns true when the window changed.
    pub fn zoom_in(&mut self) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let Window {
            start_index: start,
            end_index: end,
        } = self.window;
        let span = end - start;
        if span <= MIN_WINDOW_SPAN {
            return false;
        }

        let amount = zoom_amount(span);
        let new_start = (start + amount).min(end - MIN_WINDOW_SPAN);
        let new_end = end
            .saturating_sub(amount)
            .max(start + MIN_WINDOW_SPAN)
            .max(new_start + MIN_WINDOW_SPAN);

        self.apply(Window::new(new_start, new_end))
    }

    /// Returns true when the window changed.
    pub fn zoom_out(&mut self) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let amount = zoom_amount(self.window.span());
        let new_start = self.window.start_index.saturating_sub(amount);
        let new_end = (self.window.end_index + amount).min(self.len - 1);

        self.apply(Window::new(new_start, new_end))
    }

    /// Shift the window by a pointer delta scaled against `sensitivity` pixels.
    ///
    /// Returns the requested pan amount in samples. It can be non-zero even
    /// when the window is already against a bound and did not move.
    pub fn pan_by(&mut self, pixel_delta: f64, sensitivity: f64) -> i64 {
        if self.is_degenerate() || !(sensitivity > 0.0) || !pixel_delta.is_finite() {
            return 0;
        }
        let span = self.window.span() as i64;
        let amount = ((pixel_delta / sensitivity) * span as f64).floor() as i64;
        if amount == 0 {
            return 0;
        }

        let len = self.len as i64;
        let max_start = len - span - 1;
        let new_start = (self.window.start_index as i64)
            .saturating_add(amount)
            .clamp(0, max_start);
        let new_end = (new_start + span).min(len - 1);

        self.apply(Window::new(new_start as usize, new_end as usize));
        amount
    }

    /// Samples inside the window; empty for degenerate datasets.
    pub fn visible_slice<'a>(&self, samples: &'a [Sample]) -> &'a [Sample] {
        if self.is_degenerate() || samples.len() != self.len {
            return &[];
        }
        &samples[self.window.start_index..=self.window.end_index]
    }

    fn apply(&mut self, window: Window) -> bool {
        if window == self.window {
            return false;
        }
        self.window = window;
        true
    }
}

fn zoom_amount(span: usize) -> usize {
    ((span as f64 * ZOOM_FACTOR).floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::{ClockTime, Sample};
    use proptest::prelude::*;

    fn samples(n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| {
                let minutes = (i % 1440) as u32;
                Sample::new(ClockTime::from_hm(minutes / 60, minutes % 60).unwrap())
                    .with_value("value", Some(i as f64))
            })
            .collect()
    }

    #[test]
    fn test_new_viewport_is_full_view() {
        let viewport = Viewport::new(30);
        assert_eq!(viewport.window(), Window::new(0, 29));
        assert!(!viewport.is_zoomed());

        let empty = Viewport::new(0);
        assert_eq!(empty.window(), Window::new(0, 0));
        assert!(!empty.is_zoomed());
    }

    #[test]
    fn test_zoom_in_step() {
        let mut viewport = Viewport::new(101);
        assert!(viewport.zoom_in());
        assert_eq!(viewport.window(), Window::new(10, 90));
        assert!(viewport.is_zoomed());
    }

    #[test]
    fn test_zoom_in_converges_to_floor() {
        let mut viewport = Viewport::new(500);
        for _ in 0..200 {
            viewport.zoom_in();
        }
        let at_floor = viewport.window();
        assert_eq!(at_floor.span(), MIN_WINDOW_SPAN);

        assert!(!viewport.zoom_in());
        assert_eq!(viewport.window(), at_floor);
    }

    #[test]
    fn test_zoom_in_near_floor_does_not_undershoot() {
        let mut viewport = Viewport::new(12);
        assert!(viewport.zoom_in());
        assert_eq!(viewport.window(), Window::new(1, 11));
        assert!(!viewport.zoom_in());
    }

    #[test]
    fn test_zoom_in_on_small_dataset_is_noop() {
        let mut viewport = Viewport::new(8);
        assert!(!viewport.zoom_in());
        assert_eq!(viewport.window(), Window::new(0, 7));
    }

    #[test]
    fn test_zoom_out_converges_to_full_view() {
        let mut viewport = Viewport::new(300);
        for _ in 0..20 {
            viewport.zoom_in();
        }
        assert!(viewport.is_zoomed());

        for _ in 0..200 {
            viewport.zoom_out();
        }
        assert_eq!(viewport.window(), Window::new(0, 299));
        assert!(!viewport.zoom_out());
        assert!(!viewport.is_zoomed());
    }

    #[test]
    fn test_pan_moves_and_clamps() {
        let mut viewport = Viewport::new(100);
        for _ in 0..5 {
            viewport.zoom_in();
        }
        let before = viewport.window();

        assert_ne!(viewport.pan_by(250.0, 500.0), 0);
        assert!(viewport.window().start_index > before.start_index);
        assert_eq!(viewport.window().span(), before.span());

        viewport.pan_by(1_000_000.0, 500.0);
        assert_eq!(viewport.window().end_index, 99);

        viewport.pan_by(-1_000_000.0, 500.0);
        assert_eq!(viewport.window().start_index, 0);
        assert_eq!(viewport.window().span(), before.span());
    }

    #[test]
    fn test_huge_pan_delta_clamps_to_edges() {
        let mut viewport = Viewport::new(100);
        viewport.zoom_in();
        let span = viewport.window().span();

        assert_ne!(viewport.pan_by(1.7e308, 500.0), 0);
        assert_eq!(viewport.window(), Window::new(99 - span, 99));

        assert_ne!(viewport.pan_by(-1.7e308, 500.0), 0);
        assert_eq!(viewport.window(), Window::new(0, span));

        assert_ne!(viewport.pan_by(10.0, f64::MIN_POSITIVE), 0);
        assert_eq!(viewport.window().end_index, 99);
    }

    #[test]
    fn test_small_pan_delta_is_ignored() {
        let mut viewport = Viewport::new(100);
        viewport.zoom_in();
        let before = viewport.window();
        assert_eq!(viewport.pan_by(1.0, 800.0), 0);
        assert_eq!(viewport.window(), before);
    }

    #[test]
    fn test_pan_at_bound_reports_amount_without_moving() {
        let mut viewport = Viewport::new(50);
        assert_eq!(viewport.pan_by(-100.0, 500.0), -10);
        assert_eq!(viewport.window(), Window::new(0, 49));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut viewport = Viewport::new(40);
        viewport.zoom_in();
        viewport.reset_window();
        let first = viewport.window();
        viewport.reset_window();
        assert_eq!(viewport.window(), first);
        assert_eq!(first, Window::new(0, 39));
    }

    #[test]
    fn test_dataset_length_change_resets_window() {
        let mut viewport = Viewport::new(30);
        viewport.window = Window::new(5, 20);

        assert!(!viewport.set_len(30));
        assert_eq!(viewport.window(), Window::new(5, 20));

        assert!(viewport.set_len(50));
        assert_eq!(viewport.window(), Window::new(0, 49));
    }

    #[test]
    fn test_degenerate_datasets() {
        for len in [0, 1] {
            let mut viewport = Viewport::new(len);
            assert!(!viewport.zoom_in());
            assert!(!viewport.zoom_out());
            assert_eq!(viewport.pan_by(400.0, 500.0), 0);
            assert!(viewport.visible_slice(&samples(len)).is_empty());
        }
    }

    #[test]
    fn test_visible_slice_is_inclusive() {
        let data = samples(30);
        let mut viewport = Viewport::new(30);
        viewport.window = Window::new(5, 20);
        let slice = viewport.visible_slice(&data);
        assert_eq!(slice.len(), 16);
        assert_eq!(slice[0].value("value"), Some(5.0));
        assert_eq!(slice[15].value("value"), Some(20.0));
    }

    #[derive(Debug, Clone)]
    enum Command {
        ZoomIn,
        ZoomOut,
        Pan(f64, f64),
        Reset,
    }

    fn command() -> impl Strategy<Value = Command> {
        prop_oneof![
            Just(Command::ZoomIn),
            Just(Command::ZoomOut),
            (-2_000.0f64..2_000.0, prop_oneof![Just(500.0), Just(800.0)])
                .prop_map(|(delta, sensitivity)| Command::Pan(delta, sensitivity)),
            Just(Command::Reset),
        ]
    }

    proptest! {
        #[test]
        fn prop_window_stays_within_bounds(
            len in 2usize..400,
            commands in prop::collection::vec(command(), 0..60),
        ) {
            let mut viewport = Viewport::new(len);
            for command in commands {
                match command {
                    Command::ZoomIn => { viewport.zoom_in(); }
                    Command::ZoomOut => { viewport.zoom_out(); }
                    Command::Pan(delta, sensitivity) => { viewport.pan_by(delta, sensitivity); }
                    Command::Reset => viewport.reset_window(),
                }
                let window = viewport.window();
                prop_assert!(window.start_index < window.end_index);
                prop_assert!(window.end_index <= len - 1);
            }
        }

        #[test]
        fn prop_pan_preserves_span(
            len in 20usize..400,
            zooms in 0usize..30,
            deltas in prop::collection::vec(-3_000.0f64..3_000.0, 1..40),
        ) {
            let mut viewport = Viewport::new(len);
            for _ in 0..zooms {
                viewport.zoom_in();
            }
            let span = viewport.window().span();
            for delta in deltas {
                viewport.pan_by(delta, 500.0);
                prop_assert_eq!(viewport.window().span(), span);
            }
        }
    }
}
