//! Decorative overlay state — rotating arcs, orbiting dots, landmark trails.
//!
//! Three concentric half-circle arcs spin around the hand, four dots orbit
//! an inner ring, and thread-like lines connect each landmark's
//! previous-frame position to its current one.  All of that state (rotation
//! counters, previous-landmark cache) lives here as explicit fields, owned
//! by the render loop, never shared across threads.

use hand_model::LandmarkSet;

// ════════════════════════════════════════════════════════════════════════════
// Geometry constants
// ════════════════════════════════════════════════════════════════════════════

/// Radii of the concentric arcs, pixels.
pub const ARC_RADII: [i32; 3] = [60, 80, 100];
/// Each arc spans half a circle.
pub const ARC_SPAN_DEG: f32 = 180.0;
/// Arc rotation per hand frame, degrees.
pub const ARC_STEP_DEG: f32 = 2.0;
/// Dot-ring rotation per hand frame, degrees.
pub const DOT_STEP_DEG: f32 = 3.0;
/// Number of orbiting dots (one per 90°).
pub const DOT_COUNT: usize = 4;
/// Dots orbit this many pixels inside the hand radius.
pub const DOT_INSET: i32 = 40;
/// Dot size, pixels.
pub const DOT_RADIUS: i32 = 5;

/// A trail thread: previous pixel position → current pixel position.
pub type TrailSegment = ((i32, i32), (i32, i32));

// ════════════════════════════════════════════════════════════════════════════
// OverlayState
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame animation state for the hand overlay.
#[derive(Debug, Default)]
pub struct OverlayState {
    arc_angle: f32,
    dot_angle: f32,
    previous: Option<LandmarkSet>,
    trail: Vec<TrailSegment>,
}

impl OverlayState {
    pub fn new() -> Self {
        OverlayState::default()
    }

    /// Fold one frame's detection result into the overlay.
    ///
    /// Rotations advance only while a hand is visible, one step per camera
    /// frame.  The trail connects the previous frame's landmarks to this
    /// frame's; losing the hand clears the cache so the trail never jumps
    /// from a stale position when the hand reappears elsewhere.
    pub fn advance(&mut self, hand: Option<&LandmarkSet>, width: u32, height: u32) {
        match hand {
            Some(current) => {
                self.arc_angle = (self.arc_angle + ARC_STEP_DEG) % 360.0;
                self.dot_angle = (self.dot_angle + DOT_STEP_DEG) % 360.0;

                self.trail.clear();
                if let Some(prev) = &self.previous {
                    for (p, c) in prev.iter().zip(current.iter()) {
                        self.trail
                            .push((p.pixel(width, height), c.pixel(width, height)));
                    }
                }
                self.previous = Some(current.clone());
            }
            None => {
                self.trail.clear();
                self.previous = None;
            }
        }
    }

    /// Start angle of the arcs, degrees; each arc spans [`ARC_SPAN_DEG`].
    pub fn arc_angle(&self) -> f32 {
        self.arc_angle
    }

    /// Current landmark trail threads.
    pub fn trail(&self) -> &[TrailSegment] {
        &self.trail
    }

    /// Pixel positions of the orbiting dots for a hand centered at
    /// `center` with bounding radius `radius`.
    pub fn dot_positions(&self, center: (i32, i32), radius: i32) -> [(i32, i32); DOT_COUNT] {
        let ring = (radius - DOT_INSET).max(10) as f32;
        let mut dots = [(0, 0); DOT_COUNT];
        for (k, dot) in dots.iter_mut().enumerate() {
            let deg = self.dot_angle + (k as f32) * (360.0 / DOT_COUNT as f32);
            let rad = deg.to_radians();
            *dot = (
                center.0 + (ring * rad.cos()) as i32,
                center.1 + (ring * rad.sin()) as i32,
            );
        }
        dots
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::{Landmark, LANDMARK_COUNT};

    fn hand_at(y: f32) -> LandmarkSet {
        LandmarkSet::new([Landmark::new(0.5, y, 0.0); LANDMARK_COUNT])
    }

    #[test]
    fn rotations_advance_only_with_hand() {
        let mut ov = OverlayState::new();
        ov.advance(None, 640, 480);
        assert_eq!(ov.arc_angle(), 0.0);

        let hand = hand_at(0.5);
        ov.advance(Some(&hand), 640, 480);
        assert_eq!(ov.arc_angle(), ARC_STEP_DEG);
    }

    #[test]
    fn angles_wrap_at_360() {
        let mut ov = OverlayState::new();
        let hand = hand_at(0.5);
        for _ in 0..200 {
            ov.advance(Some(&hand), 640, 480);
        }
        assert!(ov.arc_angle() < 360.0);
    }

    #[test]
    fn first_hand_frame_has_no_trail() {
        let mut ov = OverlayState::new();
        ov.advance(Some(&hand_at(0.5)), 640, 480);
        assert!(ov.trail().is_empty());
    }

    #[test]
    fn second_hand_frame_trails_all_landmarks() {
        let mut ov = OverlayState::new();
        ov.advance(Some(&hand_at(0.5)), 1000, 1000);
        ov.advance(Some(&hand_at(0.6)), 1000, 1000);
        assert_eq!(ov.trail().len(), LANDMARK_COUNT);
        let ((_, py), (_, cy)) = ov.trail()[0];
        assert_eq!((py, cy), (500, 600));
    }

    #[test]
    fn losing_the_hand_clears_the_trail() {
        let mut ov = OverlayState::new();
        ov.advance(Some(&hand_at(0.5)), 640, 480);
        ov.advance(Some(&hand_at(0.6)), 640, 480);
        ov.advance(None, 640, 480);
        assert!(ov.trail().is_empty());

        // Reappearing hand starts a fresh trail rather than jumping.
        ov.advance(Some(&hand_at(0.2)), 640, 480);
        assert!(ov.trail().is_empty());
    }

    #[test]
    fn dots_are_evenly_spaced_on_the_ring() {
        let ov = OverlayState::new();
        let dots = ov.dot_positions((100, 100), 140);
        // Angle 0: dots at 0°, 90°, 180°, 270° on a 100 px ring.
        assert_eq!(dots[0], (200, 100));
        assert_eq!(dots[1], (100, 200));
        assert_eq!(dots[2], (0, 100));
        assert_eq!(dots[3], (100, 0));
    }

    #[test]
    fn dot_ring_never_collapses() {
        let ov = OverlayState::new();
        // Tiny hand: radius smaller than the inset still gives a ring.
        let dots = ov.dot_positions((100, 100), 20);
        assert_eq!(dots[0], (110, 100));
    }
}
