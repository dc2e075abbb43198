//! Hand frame sources — real LeapMotion hardware and keyboard simulation.
//!
//! The public interface is [`HandFrame`] delivered over a `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware or
//! the keyboard simulator, and a disconnected channel means the source is
//! exhausted and the frame loop should stop.
//!
//! A failed detection call and a frame with no hand in it look the same to
//! the consumer: `hand: None`.  That keeps the loop alive through detector
//! hiccups while still feeding the receiver a default status every frame.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use hand_model::{landmark, Handedness, Landmark, LandmarkSet, LANDMARK_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// HandFrame
// ════════════════════════════════════════════════════════════════════════════

/// One captured frame's worth of detection output.
#[derive(Clone, Debug)]
pub struct HandFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Landmarks for the detected hand, or `None` when no hand was found
    /// (or the detection call failed).
    pub hand: Option<LandmarkSet>,
    /// Detector's left/right guess.  Metadata only; the classifier ignores it.
    pub handedness: Option<Handedness>,
}

// ════════════════════════════════════════════════════════════════════════════
// HandSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`HandFrame`]s over a channel.
pub trait HandSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<HandFrame>);
}

/// Spawn a hand source on its own thread and return the receiving end.
pub fn spawn_hand_source<S: HandSource>(source: S) -> Receiver<HandFrame> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimKey — keyboard events from the visualizer window
// ════════════════════════════════════════════════════════════════════════════

/// Simulated input (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    ToggleThumb,  // 1
    ToggleIndex,  // 2
    ToggleMiddle, // 3
    ToggleRing,   // 4
    TogglePinky,  // 5
    ToggleHand,   // H
    MoveLeft,     // ←
    MoveRight,    // →
    MoveUp,       // ↑
    MoveDown,     // ↓
    Quit,         // Q
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandSource — keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Hand source driven by [`SimKey`] events from the visualizer's window.
///
/// Maintains a synthetic hand pose and emits frames at a fixed rate, so the
/// consumer sees the same cadence a camera would produce.  The synthetic
/// landmark geometry is honest: a toggled-down finger's tip really does sit
/// below its DIP joint, so frames round-trip through the real classifier.
pub struct SimHandSource {
    pub rx: Receiver<SimKey>,
    pub width: u32,
    pub height: u32,
    /// Frames per second to emit.
    pub fps: u32,
}

impl HandSource for SimHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        let interval = Duration::from_millis(1000 / self.fps.max(1) as u64);
        let mut pose = SimPose::default();

        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(SimKey::Quit) => return,
                    Ok(key) => pose.apply(key),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            let frame = HandFrame {
                width: self.width,
                height: self.height,
                hand: pose.present.then(|| pose.landmarks()),
                handedness: pose.present.then_some(Handedness::Right),
            };
            if tx.send(frame).is_err() {
                return;
            }

            thread::sleep(interval);
        }
    }
}

// ── SimPose — the synthetic hand ────────────────────────────────────────────

const MOVE_STEP: f32 = 0.02;

/// Mutable state behind the simulated hand.
#[derive(Clone, Debug)]
pub struct SimPose {
    /// Hand center in normalized coordinates.
    pub center: (f32, f32),
    /// Per-finger curled flag, thumb..pinky.
    pub down: [bool; 5],
    /// False simulates an empty frame.
    pub present: bool,
}

impl Default for SimPose {
    fn default() -> Self {
        SimPose {
            center: (0.5, 0.5),
            down: [false; 5],
            present: true,
        }
    }
}

impl SimPose {
    pub fn apply(&mut self, key: SimKey) {
        match key {
            SimKey::ToggleThumb => self.down[0] = !self.down[0],
            SimKey::ToggleIndex => self.down[1] = !self.down[1],
            SimKey::ToggleMiddle => self.down[2] = !self.down[2],
            SimKey::ToggleRing => self.down[3] = !self.down[3],
            SimKey::TogglePinky => self.down[4] = !self.down[4],
            SimKey::ToggleHand => self.present = !self.present,
            SimKey::MoveLeft => self.center.0 -= MOVE_STEP,
            SimKey::MoveRight => self.center.0 += MOVE_STEP,
            SimKey::MoveUp => self.center.1 -= MOVE_STEP,
            SimKey::MoveDown => self.center.1 += MOVE_STEP,
            SimKey::Quit => {}
        }
        // Keep the whole synthetic hand inside the frame.
        self.center.0 = self.center.0.clamp(0.2, 0.8);
        self.center.1 = self.center.1.clamp(0.2, 0.8);
    }

    /// Build the 21-point landmark set for the current pose.
    pub fn landmarks(&self) -> LandmarkSet {
        let (cx, cy) = self.center;
        let at = |dx: f32, dy: f32| {
            Landmark::new((cx + dx).clamp(0.0, 1.0), (cy + dy).clamp(0.0, 1.0), 0.0)
        };

        let mut pts = [Landmark::default(); LANDMARK_COUNT];
        pts[landmark::WRIST] = at(0.0, 0.16);

        // Thumb chain, angled off to the side.  Tip drops below the index
        // MCP row (y = cy) when curled.
        pts[landmark::THUMB_CMC] = at(-0.07, 0.10);
        pts[landmark::THUMB_MCP] = at(-0.10, 0.05);
        pts[landmark::THUMB_IP] = at(-0.12, 0.01);
        pts[landmark::THUMB_TIP] = if self.down[0] {
            at(-0.13, 0.06)
        } else {
            at(-0.13, -0.04)
        };

        // Index..pinky: MCP row at cy, PIP/DIP above, tip above the DIP
        // when extended or back below it when curled.
        const FINGER_X: [f32; 4] = [-0.03, 0.00, 0.03, 0.06];
        const MCPS: [usize; 4] = [
            landmark::INDEX_FINGER_MCP,
            landmark::MIDDLE_FINGER_MCP,
            landmark::RING_FINGER_MCP,
            landmark::PINKY_MCP,
        ];
        for (i, (mcp, dx)) in MCPS.into_iter().zip(FINGER_X).enumerate() {
            pts[mcp] = at(dx, 0.0);
            pts[mcp + 1] = at(dx, -0.06); // PIP
            pts[mcp + 2] = at(dx, -0.10); // DIP
            pts[mcp + 3] = if self.down[i + 1] {
                at(dx, -0.02)
            } else {
                at(dx, -0.14)
            };
        }

        LandmarkSet::new(pts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
///
/// Each tracking frame, the most confident hand is kept if its confidence
/// clears the threshold — `detection_confidence` while acquiring,
/// `tracking_confidence` once a hand is already locked — and its per-digit
/// joints are mapped onto the 21-point landmark layout: per finger, the
/// proximal bone's base is the MCP, the bone junctions give the PIP and
/// DIP, and the distal bone's end is the tip.  Positions are normalized
/// from the controller's millimeter interaction volume into [0,1] image
/// coordinates with y flipped (Leap y grows upward, image y downward).
#[cfg(feature = "leap")]
pub struct LeapHandSource {
    pub width: u32,
    pub height: u32,
    /// Minimum confidence to acquire a hand.
    pub detection_confidence: f32,
    /// Minimum confidence to keep a hand that is already tracked.
    pub tracking_confidence: f32,
}

#[cfg(feature = "leap")]
impl HandSource for LeapHandSource {
    fn run(self: Box<Self>, tx: Sender<HandFrame>) {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        let mut locked = false;

        loop {
            let msg = match connection.poll(100) {
                Ok(m) => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands: Vec<_> = frame.hands().collect();
                let threshold = if locked {
                    self.tracking_confidence
                } else {
                    self.detection_confidence
                };

                let best = hands
                    .iter()
                    .filter(|h| h.confidence() >= threshold)
                    .max_by(|a, b| {
                        a.confidence()
                            .partial_cmp(&b.confidence())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    });

                let hand = best.and_then(leap_landmarks);
                locked = hand.is_some();

                let out = HandFrame {
                    width: self.width,
                    height: self.height,
                    handedness: hand.as_ref().and(best).map(|h| match h.hand_type() {
                        HandType::Left => Handedness::Left,
                        HandType::Right => Handedness::Right,
                    }),
                    hand,
                };
                if tx.send(out).is_err() {
                    return;
                }
            }
        }
    }
}

/// Map one Leap hand skeleton onto the 21-point landmark layout.
///
/// Returns `None` when the skeleton is incomplete (fewer than five digits).
#[cfg(feature = "leap")]
fn leap_landmarks(hand: &leaprs::Hand) -> Option<LandmarkSet> {
    // Interaction volume, millimeters.  x spans the device, y is height
    // above it (up-positive — flipped below), z is toward the user.
    const X_MIN: f32 = -220.0;
    const X_SPAN: f32 = 440.0;
    const Y_MIN: f32 = 80.0;
    const Y_SPAN: f32 = 440.0;
    const Z_SPAN: f32 = 440.0;

    let norm = |x: f32, y: f32, z: f32| {
        Landmark::new(
            ((x - X_MIN) / X_SPAN).clamp(0.0, 1.0),
            (1.0 - (y - Y_MIN) / Y_SPAN).clamp(0.0, 1.0),
            z / Z_SPAN,
        )
    };

    let digits: Vec<_> = hand.digits().collect();
    if digits.len() < 5 {
        return None;
    }

    let mut pts = Vec::with_capacity(LANDMARK_COUNT);
    let palm = hand.palm().position();
    // Wrist sits just below the palm center in image space.
    pts.push(norm(palm.x, palm.y - 40.0, palm.z));

    for digit in &digits {
        for joint in [
            digit.proximal().prev_joint(),
            digit.proximal().next_joint(),
            digit.intermediate().next_joint(),
            digit.distal().next_joint(),
        ] {
            pts.push(norm(joint.x, joint.y, joint.z));
        }
    }

    LandmarkSet::from_slice(&pts).ok()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
