use crate::types::{EyePair, Point};

/// First-order IIR low-pass filter over the two eye landmarks.
///
/// Each coordinate is filtered independently:
/// `prev' = prev * alpha + new * (1 - alpha)`. Larger `alpha` gives a steadier
/// but laggier estimate.
///
/// The very first observation is taken as-is so tracking does not glide in
/// from an arbitrary origin.
#[derive(Debug, Clone, PartialEq)]
pub struct EyeSmoother {
    alpha: f32,
    prev: Option<EyePair>,
}

impl EyeSmoother {
    pub fn new(alpha: f32) -> Self {
        Self { alpha, prev: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// The current smoothed estimate, or `None` before the first observation.
    pub fn current(&self) -> Option<EyePair> {
        self.prev
    }

    /// Fold a new observation into the estimate and return the result.
    pub fn observe(&mut self, eyes: EyePair) -> EyePair {
        let next = match self.prev {
            None => eyes,
            Some(prev) => EyePair {
                left: self.blend(prev.left, eyes.left),
                right: self.blend(prev.right, eyes.right),
            },
        };
        self.prev = Some(next);
        next
    }

    /// Forget the estimate. Used at the start of a new camera session.
    pub fn reset(&mut self) {
        self.prev = None;
    }

    #[inline]
    fn blend(&self, prev: Point, new: Point) -> Point {
        prev * self.alpha + new * (1.0 - self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eyes(lx: f32, ly: f32, rx: f32, ry: f32) -> EyePair {
        EyePair::new(Point::new(lx, ly), Point::new(rx, ry))
    }

    #[test]
    fn first_observation_is_taken_exactly() {
        let mut smoother = EyeSmoother::new(0.5);
        assert_eq!(smoother.current(), None);

        let first = eyes(123.25, 87.5, 301.0, 90.75);
        assert_eq!(smoother.observe(first), first);
        assert_eq!(smoother.current(), Some(first));
    }

    #[test]
    fn second_observation_averages_with_half_alpha() {
        let mut smoother = EyeSmoother::new(0.5);
        smoother.observe(eyes(10.0, 20.0, 100.0, 40.0));
        let smoothed = smoother.observe(eyes(30.0, 40.0, 200.0, 60.0));

        assert_eq!(smoothed, eyes(20.0, 30.0, 150.0, 50.0));
    }

    #[test]
    fn alpha_weights_the_previous_estimate() {
        let mut smoother = EyeSmoother::new(0.75);
        smoother.observe(eyes(0.0, 0.0, 0.0, 0.0));
        let smoothed = smoother.observe(eyes(100.0, 100.0, 100.0, 100.0));

        assert!((smoothed.left.x - 25.0).abs() < 1e-5);
        assert!((smoothed.right.y - 25.0).abs() < 1e-5);
    }

    #[test]
    fn converges_towards_a_steady_input() {
        let mut smoother = EyeSmoother::new(0.5);
        smoother.observe(eyes(0.0, 0.0, 0.0, 0.0));

        let target = eyes(64.0, 32.0, 128.0, 32.0);
        let mut last_gap = f32::MAX;
        for _ in 0..20 {
            let smoothed = smoother.observe(target);
            let gap = smoothed.left.distance(&target.left);
            assert!(gap <= last_gap);
            last_gap = gap;
        }
        assert!(last_gap < 1e-3);
    }

    #[test]
    fn reset_returns_to_uninitialized() {
        let mut smoother = EyeSmoother::new(0.5);
        smoother.observe(eyes(1.0, 2.0, 3.0, 4.0));
        smoother.reset();
        assert_eq!(smoother.current(), None);

        let fresh = eyes(50.0, 50.0, 90.0, 50.0);
        assert_eq!(smoother.observe(fresh), fresh);
    }
}
