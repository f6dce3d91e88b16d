//! Transient pointer state for press-and-hold panning.
//!
//! A press in keypoint mode starts the pan detection timer. The host drives
//! the timer with [`crate::input::Event::Tick`]; once the button has been held
//! for [`PAN_DETECTION_MS`] with nothing selected, the press becomes a pan.
//! The timer must be stopped on every exit path (release, pointer out).

use crate::constants::PAN_DETECTION_MS;
use crate::transform::Point;

#[derive(Debug, Clone, Default)]
pub struct PointerState {
    /// Whether the primary button is held
    pub mouse_down: bool,
    /// Host timestamp of the last press
    pub down_at_ms: u64,
    /// Pan detection timer, holding the time it was started
    pan_timer: Option<u64>,
    /// Whether the current press has turned into a pan
    pub panning: bool,
    /// Last screen position, for computing pan deltas
    pub last_position: Point,
    /// A marker was dropped since the last release
    pub keypoint_moved: bool,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a button press.
    pub fn press(&mut self, position: Point, timestamp_ms: u64) {
        self.mouse_down = true;
        self.down_at_ms = timestamp_ms;
        self.last_position = position;
    }

    /// Start the pan detection timer unless it is already running.
    pub fn start_pan_timer(&mut self, timestamp_ms: u64) {
        if self.pan_timer.is_none() {
            self.pan_timer = Some(timestamp_ms);
        }
    }

    pub fn stop_pan_timer(&mut self) {
        self.pan_timer = None;
    }

    pub fn pan_timer_running(&self) -> bool {
        self.pan_timer.is_some()
    }

    /// Whether the press has been held long enough to pan.
    pub fn held_long_enough(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.down_at_ms) >= PAN_DETECTION_MS
    }

    /// Update the pan position and return the delta from the last one.
    pub fn update_drag(&mut self, position: Point) -> (f64, f64) {
        let delta = (
            position.x - self.last_position.x,
            position.y - self.last_position.y,
        );
        self.last_position = position;
        delta
    }

    /// End the press.
    pub fn release(&mut self) {
        self.panning = false;
        self.mouse_down = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_timer_lifecycle() {
        let mut pointer = PointerState::new();
        pointer.press(Point::new(0.0, 0.0), 1000);
        pointer.start_pan_timer(1000);
        pointer.start_pan_timer(1100);
        assert!(pointer.pan_timer_running());
        assert!(!pointer.held_long_enough(1199));
        assert!(pointer.held_long_enough(1200));
        pointer.stop_pan_timer();
        assert!(!pointer.pan_timer_running());
    }

    #[test]
    fn test_update_drag_delta() {
        let mut pointer = PointerState::new();
        pointer.press(Point::new(10.0, 10.0), 0);
        assert_eq!(pointer.update_drag(Point::new(15.0, 7.0)), (5.0, -3.0));
        assert_eq!(pointer.update_drag(Point::new(15.0, 8.0)), (0.0, 1.0));
        pointer.release();
        assert!(!pointer.mouse_down);
    }
}
