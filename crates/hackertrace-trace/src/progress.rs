//! Trace progress tracking.
//!
//! The arc drawn toward the target city lags the true ratio slightly: each
//! newly revealed hop starts a short ease-out glide from wherever the arc
//! was drawn to the new ratio.

/// Length of the glide toward a new progress ratio.
pub const ARC_GLIDE_MS: u32 = 200;

/// Quadratic ease-out over `t` in `[0, 1]`.
fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * (2.0 - t)
}

/// Progress of one trace: how many of its output lines have been revealed.
#[derive(Debug, Clone)]
pub struct TraceProgress {
    total: usize,
    done: usize,
    /// Arc position when the current glide began.
    glide_from: f32,
    glide_ms: u32,
}

impl TraceProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            done: 0,
            glide_from: 0.0,
            glide_ms: ARC_GLIDE_MS,
        }
    }

    /// Record one more revealed line. Returns the new ratio.
    pub fn advance(&mut self) -> f32 {
        self.glide_from = self.displayed();
        self.glide_ms = 0;
        self.done = (self.done + 1).min(self.total);
        self.ratio()
    }

    /// `done / total`, capped at 1. An empty trace counts as complete.
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done as f32 / self.total as f32).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }

    /// Move the drawn arc forward by `dt_ms` and return its position.
    pub fn tick(&mut self, dt_ms: u32) -> f32 {
        self.glide_ms = self.glide_ms.saturating_add(dt_ms).min(ARC_GLIDE_MS);
        self.displayed()
    }

    /// Where the arc is currently drawn, in `[0, 1]`.
    pub fn displayed(&self) -> f32 {
        let t = self.glide_ms as f32 / ARC_GLIDE_MS as f32;
        let target = self.ratio();
        self.glide_from + (target - self.glide_from) * ease_out(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_is_ahead_of_linear() {
        assert_eq!(ease_out(0.0), 0.0);
        assert_eq!(ease_out(1.0), 1.0);
        assert!(ease_out(0.5) > 0.5);
        assert_eq!(ease_out(7.0), 1.0);
    }

    #[test]
    fn progress_ratio_and_completion() {
        let mut p = TraceProgress::new(4);
        assert_eq!(p.ratio(), 0.0);
        assert!(!p.is_complete());
        p.advance();
        assert_eq!(p.ratio(), 0.25);
        for _ in 0..10 {
            p.advance();
        }
        assert_eq!(p.ratio(), 1.0);
        assert!(p.is_complete());
    }

    #[test]
    fn arc_glides_toward_ratio() {
        let mut p = TraceProgress::new(2);
        assert_eq!(p.displayed(), 0.0);
        p.advance();
        assert_eq!(p.displayed(), 0.0);
        p.tick(ARC_GLIDE_MS);
        assert_eq!(p.displayed(), 0.5);
        p.advance();
        p.tick(ARC_GLIDE_MS / 2);
        let mid = p.displayed();
        assert!(mid > 0.75 && mid < 1.0, "ease-out is past halfway: {mid}");
        p.tick(ARC_GLIDE_MS);
        assert_eq!(p.displayed(), 1.0);
    }

    #[test]
    fn advance_mid_glide_starts_from_drawn_position() {
        let mut p = TraceProgress::new(4);
        p.advance();
        p.tick(ARC_GLIDE_MS / 2);
        let drawn = p.displayed();
        p.advance();
        assert_eq!(p.displayed(), drawn);
        p.tick(ARC_GLIDE_MS);
        assert_eq!(p.displayed(), 0.5);
    }

    #[test]
    fn empty_trace_is_complete() {
        let p = TraceProgress::new(0);
        assert!(p.is_complete());
        assert_eq!(p.ratio(), 1.0);
        assert_eq!(p.displayed(), 1.0);
    }
}
