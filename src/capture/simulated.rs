//! Simulated voice capture
//!
//! There is no microphone here: a session produces a pseudo-random input
//! level on a fixed tick, runs until a fixed threshold (or a manual stop),
//! and finalizes with a phrase drawn uniformly from a canned pool. This is
//! a deliberate stand-in for real capture; `capture::live` is the real
//! counterpart behind the same command/event vocabulary.

use crate::capture::{CaptureCommand, CaptureEvent};
use crate::Result;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Phrases substituted for real speech input
const CANNED_PHRASES: [&str; 5] = [
    "What's the weather like today?",
    "Tell me a joke",
    "What's the capital of France?",
    "How do I make pancakes?",
    "What's the meaning of life?",
];

/// Configuration for the simulated capture pipeline
#[derive(Debug, Clone)]
pub struct SimulatedCaptureConfig {
    /// Interval between level samples
    pub sample_period: Duration,
    /// Elapsed session time after which the session finalizes itself
    pub session_limit: Duration,
    /// Pool of phrases a session can finalize with
    pub phrases: Vec<String>,
}

impl Default for SimulatedCaptureConfig {
    fn default() -> Self {
        Self {
            sample_period: Duration::from_millis(100),
            session_limit: Duration::from_millis(3000),
            phrases: CANNED_PHRASES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Simulated capture pipeline with channel-based communication
pub struct SimulatedCapture {
    config: SimulatedCaptureConfig,
    command_tx: Sender<CaptureCommand>,
    command_rx: Receiver<CaptureCommand>,
    event_tx: Sender<CaptureEvent>,
    event_rx: Receiver<CaptureEvent>,
}

impl SimulatedCapture {
    pub fn new(config: SimulatedCaptureConfig) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(64);

        Self {
            config,
            command_tx,
            command_rx,
            event_tx,
            event_rx,
        }
    }

    /// Get a sender for commands
    pub fn command_sender(&self) -> Sender<CaptureCommand> {
        self.command_tx.clone()
    }

    /// Get a receiver for events
    pub fn event_receiver(&self) -> Receiver<CaptureEvent> {
        self.event_rx.clone()
    }

    /// Start the pipeline worker thread
    pub fn start_worker(self) -> Result<()> {
        let config = self.config.clone();
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        std::thread::spawn(move || {
            info!("Simulated capture worker starting");
            let mut rng = rand::thread_rng();
            // Start time of the active session, if any. Finalization takes
            // it, so a session can finalize at most once.
            let mut session: Option<Instant> = None;

            loop {
                match command_rx.recv_timeout(config.sample_period) {
                    Ok(CaptureCommand::Start) => {
                        if session.is_none() {
                            debug!("Capture session started");
                            session = Some(Instant::now());
                        }
                    }
                    Ok(CaptureCommand::Stop) => {
                        if session.take().is_some() {
                            finalize(&config, &event_tx, &mut rng);
                        }
                    }
                    Ok(CaptureCommand::Cancel) => {
                        if session.take().is_some() {
                            debug!("Capture session cancelled");
                        }
                    }
                    Ok(CaptureCommand::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                        let _ = event_tx.send(CaptureEvent::Shutdown);
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(started) = session {
                            let _ = event_tx.send(CaptureEvent::Level(rng.gen_range(0.0..1.0)));

                            if started.elapsed() >= config.session_limit {
                                session = None;
                                finalize(&config, &event_tx, &mut rng);
                            }
                        }
                    }
                }
            }

            info!("Simulated capture worker stopped");
        });

        Ok(())
    }
}

fn finalize(
    config: &SimulatedCaptureConfig,
    event_tx: &Sender<CaptureEvent>,
    rng: &mut impl Rng,
) {
    let phrase = config
        .phrases
        .choose(rng)
        .cloned()
        .unwrap_or_default();
    debug!("Capture session finalized: \"{phrase}\"");
    let r = event_tx.send(CaptureEvent::Final(phrase));
    eprintln!("DBG finalize send result: {r:?} (len now {})", event_tx.len());
}
