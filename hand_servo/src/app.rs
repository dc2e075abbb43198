//! Top-level application state and frame loop.
//!
//! `AppState` owns the uplink sink, the overlay animation state, and the
//! last classified status.  `run` wires a hand source, the visualizer, and
//! the state together into the single-threaded per-frame pipeline:
//! acquire → classify (or default) → transmit once → render.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::mpsc::{self, TryRecvError};

use log::warn;
use thiserror::Error;

use finger_state::{classify, FingerStatus};
use hand_model::{Handedness, LandmarkSet};
use servo_link::{payload, NullSink, StatusSink, UdpSink};

use crate::overlay::OverlayState;
use crate::source::{spawn_hand_source, HandFrame};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Receiver address for the servo datagrams.
    pub endpoint: SocketAddrV4,
    /// Frame dimensions, pixels.
    pub frame_width: u32,
    pub frame_height: u32,
    /// False routes status arrays to the null sink instead of the network.
    pub transmit: bool,
    /// Simulated camera frame rate.
    pub sim_fps: u32,
    /// Detector confidence floor while acquiring a hand (hardware mode).
    pub detection_confidence: f32,
    /// Detector confidence floor once a hand is tracked (hardware mode).
    pub tracking_confidence: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            endpoint: SocketAddrV4::new(Ipv4Addr::new(192, 168, 4, 1), 8080),
            frame_width: 640,
            frame_height: 480,
            transmit: true,
            sim_fps: 30,
            detection_confidence: 0.7,
            tracking_confidence: 0.7,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Link(#[from] servo_link::LinkError),

    #[error("window: {0}")]
    Window(String),
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    // ── uplink ───────────────────────────────────────────────────────────
    sink: Box<dyn StatusSink>,

    // ── per-frame detection result ───────────────────────────────────────
    hand: Option<LandmarkSet>,
    handedness: Option<Handedness>,
    status: FingerStatus,

    // ── overlay animation ────────────────────────────────────────────────
    overlay: OverlayState,

    // ── counters / status line ───────────────────────────────────────────
    frames: u64,
    send_failures: u64,
    pub hud: String,
}

impl AppState {
    pub fn new(sink: Box<dyn StatusSink>) -> Self {
        AppState {
            sink,
            hand: None,
            handedness: None,
            status: FingerStatus::NO_HAND,
            overlay: OverlayState::new(),
            frames: 0,
            send_failures: 0,
            hud: "Ready — waiting for frames".to_string(),
        }
    }

    // ── process one captured frame ───────────────────────────────────────

    /// Classify (or substitute the no-hand default), transmit exactly once,
    /// and fold the frame into the overlay.
    ///
    /// A failed transmit is logged and dropped; the loop never stalls on
    /// the network.
    pub fn handle_frame(&mut self, frame: HandFrame) {
        let status = match &frame.hand {
            Some(hand) => classify(hand, frame.height),
            None => FingerStatus::NO_HAND,
        };

        if let Err(e) = self.sink.send(&status) {
            self.send_failures += 1;
            warn!("dropping status datagram: {e}");
        }
        self.frames += 1;

        self.overlay
            .advance(frame.hand.as_ref(), frame.width, frame.height);

        let who = match frame.handedness {
            Some(h) => h.name(),
            None => "none",
        };
        self.hud = format!(
            "frame {}  hand: {}  tx {}  drops {}",
            self.frames,
            who,
            payload(&status),
            self.send_failures,
        );

        self.status = status;
        self.hand = frame.hand;
        self.handedness = frame.handedness;
    }

    // ── Accessors for the render loop ────────────────────────────────────

    pub fn hand(&self) -> Option<&LandmarkSet> {
        self.hand.as_ref()
    }
    pub fn overlay(&self) -> &OverlayState {
        &self.overlay
    }
    pub fn status(&self) -> &FingerStatus {
        &self.status
    }
    pub fn frames(&self) -> u64 {
        self.frames
    }
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Creates the uplink, the hand source (simulation by default, hardware
/// with `--features leap`), and the visualizer, then drives the frame loop
/// until the quit key, a closed window, or an exhausted frame source.
/// Every exit path releases the window and the socket via drop.
pub fn run(cfg: AppConfig) -> Result<(), AppError> {
    let sink: Box<dyn StatusSink> = if cfg.transmit {
        Box::new(UdpSink::connect(cfg.endpoint)?)
    } else {
        Box::new(NullSink)
    };

    // ── Sim input channel (the visualizer's window feeds it) ──────────────
    let (sim_tx, sim_rx) = mpsc::channel();

    #[cfg(not(feature = "leap"))]
    let frame_rx = spawn_hand_source(crate::source::SimHandSource {
        rx: sim_rx,
        width: cfg.frame_width,
        height: cfg.frame_height,
        fps: cfg.sim_fps,
    });

    #[cfg(feature = "leap")]
    let frame_rx = {
        drop(sim_rx); // keyboard pose keys are meaningless in hardware mode
        spawn_hand_source(crate::source::LeapHandSource {
            width: cfg.frame_width,
            height: cfg.frame_height,
            detection_confidence: cfg.detection_confidence,
            tracking_confidence: cfg.tracking_confidence,
        })
    };

    let mut vis = Visualizer::new(cfg.frame_width as usize, cfg.frame_height as usize, sim_tx)
        .map_err(AppError::Window)?;

    let mut app = AppState::new(sink);

    while vis.is_open() {
        if !vis.poll_input() {
            break;
        }

        // Drain captured frames; each one classifies and transmits once.
        loop {
            match frame_rx.try_recv() {
                Ok(frame) => app.handle_frame(frame),
                Err(TryRecvError::Empty) => break,
                // Frame source exhausted or failed — terminate the loop.
                Err(TryRecvError::Disconnected) => return Ok(()),
            }
        }

        vis.render(app.hand(), app.overlay(), app.status(), &app.hud);
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SimPose;
    use servo_link::LinkError;
    use std::sync::{Arc, Mutex};

    /// Captures every payload handed to the sink.
    struct RecordingSink(Arc<Mutex<Vec<String>>>);

    impl StatusSink for RecordingSink {
        fn send(&mut self, status: &FingerStatus) -> Result<(), LinkError> {
            self.0.lock().unwrap().push(payload(status));
            Ok(())
        }
    }

    /// Fails every send, like an unreachable receiver.
    struct FailingSink;

    impl StatusSink for FailingSink {
        fn send(&mut self, _status: &FingerStatus) -> Result<(), LinkError> {
            Err(LinkError::Send {
                dest: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9),
                source: std::io::Error::new(std::io::ErrorKind::Other, "unreachable"),
            })
        }
    }

    fn recording_app() -> (AppState, Arc<Mutex<Vec<String>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let app = AppState::new(Box::new(RecordingSink(sent.clone())));
        (app, sent)
    }

    fn hand_frame(pose: &SimPose) -> HandFrame {
        HandFrame {
            width: 640,
            height: 480,
            hand: Some(pose.landmarks()),
            handedness: Some(Handedness::Right),
        }
    }

    fn empty_frame() -> HandFrame {
        HandFrame {
            width: 640,
            height: 480,
            hand: None,
            handedness: None,
        }
    }

    #[test]
    fn no_hand_frame_transmits_default() {
        let (mut app, sent) = recording_app();
        app.handle_frame(empty_frame());
        assert_eq!(*sent.lock().unwrap(), ["0,180,180,180,180"]);
    }

    #[test]
    fn open_hand_transmits_up_codes() {
        let (mut app, sent) = recording_app();
        app.handle_frame(hand_frame(&SimPose::default()));
        assert_eq!(*sent.lock().unwrap(), ["0,110,180,150,120"]);
    }

    #[test]
    fn exactly_one_send_per_frame() {
        let (mut app, sent) = recording_app();
        app.handle_frame(hand_frame(&SimPose::default()));
        app.handle_frame(empty_frame());
        app.handle_frame(hand_frame(&SimPose::default()));
        assert_eq!(sent.lock().unwrap().len(), 3);
    }

    #[test]
    fn send_failure_does_not_stop_the_loop() {
        let mut app = AppState::new(Box::new(FailingSink));
        app.handle_frame(empty_frame());
        app.handle_frame(hand_frame(&SimPose::default()));
        assert_eq!(app.frames(), 2);
        assert_eq!(app.send_failures(), 2);
    }

    #[test]
    fn each_frame_computes_fresh_status() {
        let (mut app, sent) = recording_app();
        let mut pose = SimPose::default();
        app.handle_frame(hand_frame(&pose));

        pose.down = [true; 5];
        app.handle_frame(hand_frame(&pose));

        let sent = sent.lock().unwrap();
        assert_eq!(*sent, ["0,110,180,150,120", "150,0,0,0,60"]);
    }

    #[test]
    fn consecutive_hand_frames_build_a_trail() {
        let (mut app, _) = recording_app();
        let mut pose = SimPose::default();
        app.handle_frame(hand_frame(&pose));
        assert!(app.overlay().trail().is_empty());

        pose.apply(crate::source::SimKey::MoveDown);
        app.handle_frame(hand_frame(&pose));
        assert!(!app.overlay().trail().is_empty());
    }

    #[test]
    fn hud_carries_the_wire_payload() {
        let (mut app, _) = recording_app();
        app.handle_frame(empty_frame());
        assert!(app.hud.contains("0,180,180,180,180"));
    }
}
