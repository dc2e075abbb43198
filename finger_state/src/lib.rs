//! # finger_state
//!
//! Maps one hand's 21 landmarks into five discrete servo angle codes, one
//! per finger.  Each finger has its own "up" and "down" code; the values
//! double as target angles for the receiving actuator, so they are a wire
//! contract, not arbitrary flags.
//!
//! ## Code table
//!
//! | Finger | Down | Up |
//! |---|---|---|
//! | Thumb  | 150 | 0   |
//! | Index  | 0   | 110 |
//! | Middle | 0   | 180 |
//! | Ring   | 0   | 150 |
//! | Pinky  | 60  | 120 |
//!
//! ## Classification rule
//!
//! A finger is "down" when its tip sits lower on screen (greater pixel y)
//! than its reference joint, and "up" otherwise:
//!
//! * index/middle/ring/pinky reference their own DIP joint;
//! * the thumb references the **index finger's MCP** joint.  The
//!   cross-finger reference is part of the actuator contract and must not
//!   be normalised to a thumb joint.
//!
//! Classification is a pure function of one landmark set and the frame
//! height — no history, no smoothing, no hysteresis.

use hand_model::{landmark, LandmarkSet};

// ════════════════════════════════════════════════════════════════════════════
// Finger — the five digits, in transmission order
// ════════════════════════════════════════════════════════════════════════════

/// One of the five fingers, in status-array / wire order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Finger {
    Thumb  = 0,
    Index  = 1,
    Middle = 2,
    Ring   = 3,
    Pinky  = 4,
}

impl Finger {
    /// All five fingers in array order.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// Position in the status array (0..5).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Servo angle code sent when the finger is curled down.
    pub fn down_code(self) -> u8 {
        match self {
            Finger::Thumb  => 150,
            Finger::Index  => 0,
            Finger::Middle => 0,
            Finger::Ring   => 0,
            Finger::Pinky  => 60,
        }
    }

    /// Servo angle code sent when the finger is extended.
    pub fn up_code(self) -> u8 {
        match self {
            Finger::Thumb  => 0,
            Finger::Index  => 110,
            Finger::Middle => 180,
            Finger::Ring   => 150,
            Finger::Pinky  => 120,
        }
    }

    /// Tip landmark index.
    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb  => landmark::THUMB_TIP,
            Finger::Index  => landmark::INDEX_FINGER_TIP,
            Finger::Middle => landmark::MIDDLE_FINGER_TIP,
            Finger::Ring   => landmark::RING_FINGER_TIP,
            Finger::Pinky  => landmark::PINKY_TIP,
        }
    }

    /// Reference joint the tip is compared against.
    ///
    /// The thumb's reference is the index finger's MCP; the other four use
    /// their own DIP joint.
    pub fn reference_joint(self) -> usize {
        match self {
            Finger::Thumb  => landmark::INDEX_FINGER_MCP,
            Finger::Index  => landmark::INDEX_FINGER_DIP,
            Finger::Middle => landmark::MIDDLE_FINGER_DIP,
            Finger::Ring   => landmark::RING_FINGER_DIP,
            Finger::Pinky  => landmark::PINKY_DIP,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "Thumb",
            Finger::Index  => "Index",
            Finger::Middle => "Middle",
            Finger::Ring   => "Ring",
            Finger::Pinky  => "Pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StateLabel — display-only Up/Down label
// ════════════════════════════════════════════════════════════════════════════

/// Up/Down label shown next to each finger in the overlay.
///
/// Derived purely from the code value: the thumb is "Up" when its code is
/// 0, every other finger is "Up" when its code is greater than 0.  The
/// pinky's down code (60) therefore reads as "Up"; the label is display
/// convention, not ground truth, and must not be fed back into the codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateLabel {
    Up,
    Down,
}

impl StateLabel {
    pub fn name(self) -> &'static str {
        match self {
            StateLabel::Up => "Up",
            StateLabel::Down => "Down",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStatus — the five-code array handed to the transmitter
// ════════════════════════════════════════════════════════════════════════════

/// Fixed-order array of the five finger codes for one frame.
///
/// Index 0..4 = thumb, index, middle, ring, pinky.  A fresh value is
/// produced every frame; nothing mutates one across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerStatus([u8; 5]);

impl FingerStatus {
    /// The array transmitted when no hand is detected.
    ///
    /// The per-finger values match neither column of the code table for
    /// index/middle/ring/pinky; the receiver depends on these exact
    /// literals, so do not normalise them to the table.
    pub const NO_HAND: FingerStatus = FingerStatus([0, 180, 180, 180, 180]);

    pub fn from_codes(codes: [u8; 5]) -> Self {
        FingerStatus(codes)
    }

    /// The raw codes in transmission order.
    pub fn codes(&self) -> [u8; 5] {
        self.0
    }

    /// The code for one finger.
    pub fn code(&self, finger: Finger) -> u8 {
        self.0[finger.index()]
    }

    /// Display label for one finger (see [`StateLabel`] for the rule).
    pub fn label(&self, finger: Finger) -> StateLabel {
        let code = self.code(finger);
        let up = match finger {
            Finger::Thumb => code == 0,
            _ => code > 0,
        };
        if up {
            StateLabel::Up
        } else {
            StateLabel::Down
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify — the per-frame classification policy
// ════════════════════════════════════════════════════════════════════════════

/// Classify all five fingers of one detected hand.
///
/// `frame_height` converts normalized y to pixel space before comparison;
/// the comparisons mirror how the receiver was calibrated, so the truncating
/// conversion matters.
///
/// Not called for no-hand frames — the caller substitutes
/// [`FingerStatus::NO_HAND`] instead.
pub fn classify(hand: &LandmarkSet, frame_height: u32) -> FingerStatus {
    let mut codes = [0u8; 5];
    for finger in Finger::ALL {
        let tip_y = hand.get(finger.tip()).pixel_y(frame_height);
        let joint_y = hand.get(finger.reference_joint()).pixel_y(frame_height);
        codes[finger.index()] = if tip_y > joint_y {
            finger.down_code()
        } else {
            finger.up_code()
        };
    }
    FingerStatus::from_codes(codes)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_model::{Landmark, LANDMARK_COUNT};

    /// Frame height used throughout: normalized y × 1000 = pixel y exactly.
    const H: u32 = 1000;

    /// A hand with every point at y=0.5, then per-point overrides.
    fn hand_with(overrides: &[(usize, f32)]) -> LandmarkSet {
        let mut pts = [Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        for &(idx, y) in overrides {
            pts[idx] = Landmark::new(0.5, y, 0.0);
        }
        LandmarkSet::new(pts)
    }

    /// All five fingers posed "up" (every tip above its reference joint).
    fn open_hand() -> LandmarkSet {
        hand_with(&[
            (landmark::THUMB_TIP, 0.30),
            (landmark::INDEX_FINGER_MCP, 0.50),
            (landmark::INDEX_FINGER_TIP, 0.20),
            (landmark::INDEX_FINGER_DIP, 0.30),
            (landmark::MIDDLE_FINGER_TIP, 0.18),
            (landmark::MIDDLE_FINGER_DIP, 0.28),
            (landmark::RING_FINGER_TIP, 0.20),
            (landmark::RING_FINGER_DIP, 0.30),
            (landmark::PINKY_TIP, 0.24),
            (landmark::PINKY_DIP, 0.34),
        ])
    }

    /// All five fingers posed "down" (every tip below its reference joint).
    fn fist() -> LandmarkSet {
        hand_with(&[
            (landmark::THUMB_TIP, 0.60),
            (landmark::INDEX_FINGER_MCP, 0.50),
            (landmark::INDEX_FINGER_TIP, 0.55),
            (landmark::INDEX_FINGER_DIP, 0.45),
            (landmark::MIDDLE_FINGER_TIP, 0.55),
            (landmark::MIDDLE_FINGER_DIP, 0.45),
            (landmark::RING_FINGER_TIP, 0.55),
            (landmark::RING_FINGER_DIP, 0.45),
            (landmark::PINKY_TIP, 0.55),
            (landmark::PINKY_DIP, 0.45),
        ])
    }

    // ── code table ───────────────────────────────────────────────────────

    #[test]
    fn code_table_matches_actuator_contract() {
        let expected: [(u8, u8); 5] = [(150, 0), (0, 110), (0, 180), (0, 150), (60, 120)];
        for (finger, (down, up)) in Finger::ALL.into_iter().zip(expected) {
            assert_eq!(finger.down_code(), down, "{} down", finger.name());
            assert_eq!(finger.up_code(), up, "{} up", finger.name());
        }
    }

    #[test]
    fn thumb_references_index_mcp() {
        assert_eq!(Finger::Thumb.reference_joint(), landmark::INDEX_FINGER_MCP);
    }

    #[test]
    fn other_fingers_reference_own_dip() {
        assert_eq!(Finger::Index.reference_joint(), landmark::INDEX_FINGER_DIP);
        assert_eq!(Finger::Middle.reference_joint(), landmark::MIDDLE_FINGER_DIP);
        assert_eq!(Finger::Ring.reference_joint(), landmark::RING_FINGER_DIP);
        assert_eq!(Finger::Pinky.reference_joint(), landmark::PINKY_DIP);
    }

    // ── classification ───────────────────────────────────────────────────

    #[test]
    fn open_hand_all_up_codes() {
        let status = classify(&open_hand(), H);
        assert_eq!(status.codes(), [0, 110, 180, 150, 120]);
    }

    #[test]
    fn fist_all_down_codes() {
        let status = classify(&fist(), H);
        assert_eq!(status.codes(), [150, 0, 0, 0, 60]);
    }

    #[test]
    fn thumb_down_index_up_rest_down() {
        // Thumb tip y=300px vs index MCP y=250px → tip lower → 150.
        // Index tip y=200px vs index DIP y=250px → tip higher → 110.
        // Middle/ring/pinky tips below their DIPs → down codes.
        let hand = hand_with(&[
            (landmark::THUMB_TIP, 0.300),
            (landmark::INDEX_FINGER_MCP, 0.250),
            (landmark::INDEX_FINGER_TIP, 0.200),
            (landmark::INDEX_FINGER_DIP, 0.250),
            (landmark::MIDDLE_FINGER_TIP, 0.55),
            (landmark::MIDDLE_FINGER_DIP, 0.45),
            (landmark::RING_FINGER_TIP, 0.55),
            (landmark::RING_FINGER_DIP, 0.45),
            (landmark::PINKY_TIP, 0.55),
            (landmark::PINKY_DIP, 0.45),
        ]);
        assert_eq!(classify(&hand, H).codes(), [150, 110, 0, 0, 0]);
    }

    #[test]
    fn tip_level_with_joint_counts_as_up() {
        // Strictly-greater comparison: equal pixel y is not "down".
        let hand = hand_with(&[
            (landmark::THUMB_TIP, 0.250),
            (landmark::INDEX_FINGER_MCP, 0.250),
        ]);
        assert_eq!(classify(&hand, H).code(Finger::Thumb), Finger::Thumb.up_code());
    }

    #[test]
    fn classify_is_deterministic() {
        let hand = open_hand();
        assert_eq!(classify(&hand, H), classify(&hand, H));
    }

    #[test]
    fn every_code_is_legal_for_its_finger() {
        for hand in [open_hand(), fist()] {
            let status = classify(&hand, H);
            for finger in Finger::ALL {
                let code = status.code(finger);
                assert!(
                    code == finger.up_code() || code == finger.down_code(),
                    "{}: illegal code {}",
                    finger.name(),
                    code
                );
            }
        }
    }

    // ── no-hand default ──────────────────────────────────────────────────

    #[test]
    fn no_hand_literal_preserved() {
        assert_eq!(FingerStatus::NO_HAND.codes(), [0, 180, 180, 180, 180]);
    }

    // ── display labels ───────────────────────────────────────────────────

    #[test]
    fn thumb_label_inverted() {
        let up = classify(&open_hand(), H);
        let down = classify(&fist(), H);
        assert_eq!(up.label(Finger::Thumb), StateLabel::Up); // code 0
        assert_eq!(down.label(Finger::Thumb), StateLabel::Down); // code 150
    }

    #[test]
    fn pinky_down_code_labelled_up() {
        // Historical quirk: pinky down code 60 satisfies "code > 0".
        let down = classify(&fist(), H);
        assert_eq!(down.code(Finger::Pinky), 60);
        assert_eq!(down.label(Finger::Pinky), StateLabel::Up);
    }

    #[test]
    fn index_labels_follow_code_sign() {
        let up = classify(&open_hand(), H);
        let down = classify(&fist(), H);
        assert_eq!(up.label(Finger::Index), StateLabel::Up); // 110
        assert_eq!(down.label(Finger::Index), StateLabel::Down); // 0
    }
}
