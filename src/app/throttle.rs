use std::time::{Duration, Instant};

/// Minimum spacing between zoom commits while a gesture is in progress.
pub(super) const ZOOM_UPDATE_INTERVAL: Duration = Duration::from_millis(80);

/// Trailing throttle for continuous zoom gestures: the first change opens a
/// window, the change is committed once the window has elapsed, and the end
/// of a gesture commits immediately.
#[derive(Clone, Debug)]
pub(super) struct ZoomThrottle {
    interval: Duration,
    committed: f64,
    window_started: Option<Instant>,
}

impl ZoomThrottle {
    pub(super) fn new(zoom: f64) -> Self {
        Self {
            interval: ZOOM_UPDATE_INTERVAL,
            committed: zoom,
            window_started: None,
        }
    }

    pub(super) fn committed(&self) -> f64 {
        self.committed
    }

    /// Feeds the live zoom; returns the newly committed zoom, if any.
    pub(super) fn observe(&mut self, now: Instant, zoom: f64, gesture_ended: bool) -> Option<f64> {
        if gesture_ended {
            self.window_started = None;
            return self.commit(zoom);
        }

        if zoom == self.committed {
            return None;
        }

        let started = *self.window_started.get_or_insert(now);
        if now.duration_since(started) >= self.interval {
            self.window_started = None;
            return self.commit(zoom);
        }

        None
    }

    /// Adopts a zoom set from elsewhere (tab switch) without a pending window.
    pub(super) fn reset(&mut self, zoom: f64) {
        self.committed = zoom;
        self.window_started = None;
    }

    /// Time left before a pending change is committed.
    pub(super) fn pending_for(&self, now: Instant) -> Option<Duration> {
        self.window_started
            .map(|started| self.interval.saturating_sub(now.duration_since(started)))
    }

    fn commit(&mut self, zoom: f64) -> Option<f64> {
        if zoom == self.committed {
            return None;
        }
        self.committed = zoom;
        Some(zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_inside_the_window_are_held_back() {
        let start = Instant::now();
        let mut throttle = ZoomThrottle::new(10.0);

        assert_eq!(throttle.observe(start, 10.2, false), None);
        assert_eq!(throttle.observe(start + Duration::from_millis(40), 10.4, false), None);
        assert_eq!(throttle.committed(), 10.0);

        assert_eq!(
            throttle.observe(start + Duration::from_millis(80), 10.5, false),
            Some(10.5)
        );
        assert_eq!(throttle.pending_for(start + Duration::from_millis(90)), None);
    }

    #[test]
    fn gesture_end_commits_immediately() {
        let start = Instant::now();
        let mut throttle = ZoomThrottle::new(10.0);

        assert_eq!(throttle.observe(start, 11.0, false), None);
        assert_eq!(
            throttle.observe(start + Duration::from_millis(5), 11.3, true),
            Some(11.3)
        );
        assert_eq!(throttle.pending_for(start + Duration::from_millis(6)), None);
    }

    #[test]
    fn unchanged_zoom_commits_nothing() {
        let now = Instant::now();
        let mut throttle = ZoomThrottle::new(12.0);
        assert_eq!(throttle.observe(now, 12.0, false), None);
        assert_eq!(throttle.observe(now, 12.0, true), None);
    }

    #[test]
    fn reset_adopts_shared_zoom() {
        let now = Instant::now();
        let mut throttle = ZoomThrottle::new(10.0);
        throttle.observe(now, 10.7, false);
        throttle.reset(13.0);

        assert_eq!(throttle.committed(), 13.0);
        assert_eq!(throttle.pending_for(now), None);
    }
}
