//! Live voice capture
//!
//! Wraps a platform speech-recognition session behind the shared capture
//! command/event vocabulary. The recognizer is an opaque collaborator: it
//! delivers full transcript snapshots on its own callback timeline, and may
//! end the session on its own. Each snapshot overwrites the buffer (the
//! engine recomputes the full joined transcript, it does not append), and a
//! session finalizes exactly once no matter how stop and engine-end race.

use crate::capture::{CaptureCommand, CaptureEvent};
use crate::Result;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, info, warn};

/// Events delivered by a platform recognizer session
#[derive(Debug, Clone, PartialEq)]
pub enum RecognizerEvent {
    /// Full transcript snapshot covering everything recognized so far
    Transcript(String),
    /// Input level in [0, 1), for visualization
    Level(f32),
    /// The engine ended the session on its own
    Ended,
}

/// An opaque platform speech-recognition service.
///
/// `start` hands the recognizer a sender for its session events; `stop`
/// asks it to end the session (the engine may already have ended it).
pub trait Recognizer: Send + 'static {
    fn start(&mut self, events: Sender<RecognizerEvent>) -> Result<()>;
    fn stop(&mut self);
}

/// Live capture pipeline bridging a recognizer to capture events
pub struct LiveCapture {
    recognizer: Option<Box<dyn Recognizer>>,
    command_tx: Sender<CaptureCommand>,
    command_rx: Receiver<CaptureCommand>,
    event_tx: Sender<CaptureEvent>,
    event_rx: Receiver<CaptureEvent>,
}

impl LiveCapture {
    /// Create a new live capture pipeline.
    ///
    /// When the host has no recognition capability, pass `None`: the
    /// pipeline stays up but start commands are ignored, leaving voice mode
    /// visually present and non-functional.
    pub fn new(recognizer: Option<Box<dyn Recognizer>>) -> Self {
        let (command_tx, command_rx) = bounded(16);
        let (event_tx, event_rx) = bounded(64);

        Self {
            recognizer,
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
        let mut recognizer = self.recognizer;
        let command_rx = self.command_rx.clone();
        let event_tx = self.event_tx.clone();

        if recognizer.is_none() {
            warn!("No speech recognizer available; live capture will ignore start commands");
        }

        std::thread::spawn(move || {
            info!("Live capture worker starting");
            let (recognizer_tx, recognizer_rx) = bounded::<RecognizerEvent>(64);

            let mut session = Session::new(event_tx.clone());

            loop {
                select! {
                    recv(command_rx) -> command => match command {
                        Ok(CaptureCommand::Start) => {
                            if session.active {
                                continue;
                            }
                            let Some(recognizer) = recognizer.as_mut() else {
                                debug!("Start ignored: no recognizer");
                                continue;
                            };
                            session.begin();
                            if let Err(e) = recognizer.start(recognizer_tx.clone()) {
                                warn!("Recognizer failed to start: {e}");
                                session.abandon();
                            }
                        }
                        Ok(CaptureCommand::Stop) => {
                            if let Some(recognizer) = recognizer.as_mut() {
                                recognizer.stop();
                            }
                            session.finalize();
                        }
                        Ok(CaptureCommand::Cancel) => {
                            if let Some(recognizer) = recognizer.as_mut() {
                                recognizer.stop();
                            }
                            session.abandon();
                        }
                        Ok(CaptureCommand::Shutdown) | Err(_) => {
                            let _ = event_tx.send(CaptureEvent::Shutdown);
                            break;
                        }
                    },
                    recv(recognizer_rx) -> event => match event {
                        Ok(RecognizerEvent::Transcript(snapshot)) => {
                            session.observe(snapshot);
                        }
                        Ok(RecognizerEvent::Level(level)) => {
                            if session.active {
                                let _ = event_tx.send(CaptureEvent::Level(level));
                            }
                        }
                        Ok(RecognizerEvent::Ended) => {
                            session.finalize();
                        }
                        Err(_) => {}
                    },
                }
            }

            info!("Live capture worker stopped");
        });

        Ok(())
    }
}

/// One listening session. `active` is the single-shot guard: a manual stop
/// racing the engine's own end event finalizes exactly once.
struct Session {
    active: bool,
    transcript: String,
    event_tx: Sender<CaptureEvent>,
}

impl Session {
    fn new(event_tx: Sender<CaptureEvent>) -> Self {
        Self {
            active: false,
            transcript: String::new(),
            event_tx,
        }
    }

    fn begin(&mut self) {
        debug!("Recognition session started");
        self.active = true;
        self.transcript.clear();
    }

    /// Record the latest snapshot. Snapshots replace the buffer wholesale.
    fn observe(&mut self, snapshot: String) {
        if !self.active {
            return;
        }
        self.transcript = snapshot;
        let _ = self
            .event_tx
            .send(CaptureEvent::Partial(self.transcript.clone()));
    }

    fn finalize(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        let transcript = std::mem::take(&mut self.transcript);
        if transcript.is_empty() {
            debug!("Recognition session ended with empty transcript");
            return;
        }

        debug!("Recognition session finalized: \"{transcript}\"");
        let _ = self.event_tx.send(CaptureEvent::Final(transcript));
    }

    fn abandon(&mut self) {
        self.active = false;
        self.transcript.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Recognizer that replays a fixed script on start.
    struct ScriptedRecognizer {
        script: Vec<RecognizerEvent>,
    }

    impl ScriptedRecognizer {
        fn new(script: Vec<RecognizerEvent>) -> Self {
            Self { script }
        }
    }

    impl Recognizer for ScriptedRecognizer {
        fn start(&mut self, events: Sender<RecognizerEvent>) -> crate::Result<()> {
            let script = self.script.clone();
            std::thread::spawn(move || {
                for event in script {
                    std::thread::sleep(Duration::from_millis(5));
                    if events.send(event).is_err() {
                        break;
                    }
                }
            });
            Ok(())
        }

        fn stop(&mut self) {}
    }

    fn drain(rx: &Receiver<CaptureEvent>, wait: Duration) -> Vec<CaptureEvent> {
        std::thread::sleep(wait);
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn finals(events: &[CaptureEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                CaptureEvent::Final(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_snapshots_overwrite_and_engine_end_finalizes() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognizerEvent::Transcript("tell".to_string()),
            RecognizerEvent::Transcript("tell me".to_string()),
            RecognizerEvent::Transcript("tell me a joke".to_string()),
            RecognizerEvent::Ended,
        ]);
        let capture = LiveCapture::new(Some(Box::new(recognizer)));
        let commands = capture.command_sender();
        let events = capture.event_receiver();
        capture.start_worker().unwrap();

        commands.send(CaptureCommand::Start).unwrap();
        let received = drain(&events, Duration::from_millis(100));

        // The final transcript is the last snapshot, not a concatenation
        assert_eq!(finals(&received), vec!["tell me a joke".to_string()]);

        let partials: Vec<_> = received
            .iter()
            .filter(|e| matches!(e, CaptureEvent::Partial(_)))
            .collect();
        assert_eq!(partials.len(), 3);

        commands.send(CaptureCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_stop_racing_engine_end_finalizes_once() {
        let recognizer = ScriptedRecognizer::new(vec![
            RecognizerEvent::Transcript("hello".to_string()),
            RecognizerEvent::Ended,
        ]);
        let capture = LiveCapture::new(Some(Box::new(recognizer)));
        let commands = capture.command_sender();
        let events = capture.event_receiver();
        capture.start_worker().unwrap();

        commands.send(CaptureCommand::Start).unwrap();
        // Manual stop lands around the same time as the scripted end
        std::thread::sleep(Duration::from_millis(8));
        commands.send(CaptureCommand::Stop).unwrap();

        let received = drain(&events, Duration::from_millis(100));
        assert_eq!(finals(&received).len(), 1);

        commands.send(CaptureCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_empty_transcript_emits_nothing() {
        let recognizer = ScriptedRecognizer::new(vec![RecognizerEvent::Ended]);
        let capture = LiveCapture::new(Some(Box::new(recognizer)));
        let commands = capture.command_sender();
        let events = capture.event_receiver();
        capture.start_worker().unwrap();

        commands.send(CaptureCommand::Start).unwrap();
        let received = drain(&events, Duration::from_millis(60));
        assert!(finals(&received).is_empty());

        commands.send(CaptureCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_missing_recognizer_ignores_start() {
        let capture = LiveCapture::new(None);
        let commands = capture.command_sender();
        let events = capture.event_receiver();
        capture.start_worker().unwrap();

        commands.send(CaptureCommand::Start).unwrap();
        commands.send(CaptureCommand::Stop).unwrap();
        let received = drain(&events, Duration::from_millis(60));
        assert!(received.is_empty());

        commands.send(CaptureCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_cancel_discards_transcript() {
        let recognizer = ScriptedRecognizer::new(vec![RecognizerEvent::Transcript(
            "half a sentence".to_string(),
        )]);
        let capture = LiveCapture::new(Some(Box::new(recognizer)));
        let commands = capture.command_sender();
        let events = capture.event_receiver();
        capture.start_worker().unwrap();

        commands.send(CaptureCommand::Start).unwrap();
        std::thread::sleep(Duration::from_millis(30));
        commands.send(CaptureCommand::Cancel).unwrap();
        // A stop after cancel must not resurrect the session
        commands.send(CaptureCommand::Stop).unwrap();

        let received = drain(&events, Duration::from_millis(60));
        assert!(finals(&received).is_empty());

        commands.send(CaptureCommand::Shutdown).unwrap();
    }
}
