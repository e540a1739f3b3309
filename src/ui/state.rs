//! Application state management
//!
//! Central state for the Patter UI: the interaction mode, the phase of the
//! voice state machine, the conversation, and the channel handles to the
//! capture/LLM/synthesis workers. All mutation happens on the UI thread;
//! workers are only ever reached through channels.

use crate::capture::{CaptureCommand, CaptureEvent};
use crate::config::ApiStyle;
use crate::llm::{ChatMessage, LlmCommand, LlmEvent};
use crate::messages::{Message, MessageStorage, Sender};
use crate::speech::{SynthesisCommand, SynthesisEvent};
use crate::ui::components::OrbAnimation;
use crossbeam_channel::{Receiver, Sender as ChannelSender};
use tracing::debug;
use uuid::Uuid;

/// Which interaction surface is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Orb visualization plus a mic button
    Voice,
    /// Scrolling message log plus a text input
    Chat,
}

/// Current step of the interaction state machine. One value, one phase;
/// combinations like "listening while responding" cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Listening,
    Responding,
    Speaking,
}

/// Central application state
pub struct AppState {
    /// Interaction mode
    pub mode: Mode,

    /// Voice state machine phase
    pub phase: Phase,

    /// Latest input level in [0, 1); drives the orb pulse while listening
    pub level: f32,

    /// Latest transcript snapshot of the active listening session
    pub partial_transcript: Option<String>,

    /// Conversation storage (thread-safe)
    pub messages: MessageStorage,

    /// Current text input
    pub input_text: String,

    /// Orb animation state carried across frames
    pub orb: OrbAnimation,

    /// Which endpoint operation submissions go through
    pub api: ApiStyle,

    /// Whether assistant replies are spoken aloud
    pub speak_replies: bool,

    /// Channel to send capture commands
    pub capture_command_tx: Option<ChannelSender<CaptureCommand>>,

    /// Channel to receive capture events
    pub capture_event_rx: Option<Receiver<CaptureEvent>>,

    /// Channel to send LLM commands
    pub llm_command_tx: Option<ChannelSender<LlmCommand>>,

    /// Channel to receive LLM events
    pub llm_event_rx: Option<Receiver<LlmEvent>>,

    /// Channel to send synthesis commands
    pub synthesis_command_tx: Option<ChannelSender<SynthesisCommand>>,

    /// Channel to receive synthesis events
    pub synthesis_event_rx: Option<Receiver<SynthesisEvent>>,

    /// Request id of the submission currently driving the phase. A reply
    /// with any other id still appends its message but no longer moves the
    /// state machine.
    pending_request: Option<Uuid>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// Create a new application state
    pub fn new() -> Self {
        Self {
            mode: Mode::Voice,
            phase: Phase::Idle,
            level: 0.0,
            partial_transcript: None,
            messages: MessageStorage::new(),
            input_text: String::new(),
            orb: OrbAnimation::new(),
            api: ApiStyle::Generate,
            speak_replies: false,
            capture_command_tx: None,
            capture_event_rx: None,
            llm_command_tx: None,
            llm_event_rx: None,
            synthesis_command_tx: None,
            synthesis_event_rx: None,
            pending_request: None,
        }
    }

    /// Whether a submission is waiting on the endpoint
    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Responding
    }

    /// Flip between voice and chat mode.
    ///
    /// Transient voice state is reset: an active listening session is
    /// cancelled (not finalized) and the phase returns to idle. The
    /// conversation is never touched.
    pub fn toggle_mode(&mut self) {
        if self.phase == Phase::Listening {
            if let Some(tx) = &self.capture_command_tx {
                let _ = tx.send(CaptureCommand::Cancel);
            }
        }

        self.mode = match self.mode {
            Mode::Voice => Mode::Chat,
            Mode::Chat => Mode::Voice,
        };
        self.phase = Phase::Idle;
        self.level = 0.0;
        self.partial_transcript = None;
        debug!("Mode toggled to {:?}", self.mode);
    }

    /// Handle a mic button click: first click starts a listening session,
    /// a second click stops it (the capture worker then emits the final
    /// transcript). Ignored while a reply is pending or being spoken.
    pub fn mic_pressed(&mut self) {
        match self.phase {
            Phase::Idle => {
                if let Some(tx) = &self.capture_command_tx {
                    let _ = tx.send(CaptureCommand::Start);
                }
                self.phase = Phase::Listening;
                self.level = 0.0;
                self.partial_transcript = None;
            }
            Phase::Listening => {
                if let Some(tx) = &self.capture_command_tx {
                    let _ = tx.send(CaptureCommand::Stop);
                }
            }
            Phase::Responding | Phase::Speaking => {}
        }
    }

    /// Send the typed message to the assistant
    pub fn send_message(&mut self) {
        let text = self.input_text.trim().to_string();
        if text.is_empty() {
            return;
        }

        self.submit(text);
        self.input_text.clear();
    }

    /// Append a user message and hand it to the LLM pipeline
    pub fn submit(&mut self, text: String) {
        self.messages.add(Message::new(Sender::User, text.clone()));
        self.phase = Phase::Responding;
        self.level = 0.0;
        self.partial_transcript = None;

        if let Some(tx) = &self.llm_command_tx {
            let request_id = Uuid::new_v4();
            let command = match self.api {
                ApiStyle::Generate => LlmCommand::Generate {
                    prompt: text,
                    request_id,
                },
                ApiStyle::Chat => LlmCommand::Chat {
                    messages: vec![ChatMessage::user(text)],
                    request_id,
                },
            };
            let _ = tx.send(command);
            self.pending_request = Some(request_id);
        }
    }

    /// Process incoming events from the worker channels
    pub fn poll_events(&mut self) {
        // Collect first, then process: the receivers borrow self
        let capture_events: Vec<CaptureEvent> = self
            .capture_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in capture_events {
            match event {
                CaptureEvent::Level(level) => {
                    if self.phase == Phase::Listening {
                        self.level = level;
                    }
                }
                CaptureEvent::Partial(snapshot) => {
                    if self.phase == Phase::Listening {
                        self.partial_transcript = Some(snapshot);
                    }
                }
                CaptureEvent::Final(text) => {
                    self.level = 0.0;
                    if text.trim().is_empty() {
                        self.phase = Phase::Idle;
                    } else {
                        self.submit(text);
                    }
                }
                CaptureEvent::Shutdown => {
                    debug!("Capture pipeline shut down");
                }
            }
        }

        let llm_events: Vec<LlmEvent> = self
            .llm_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in llm_events {
            match event {
                LlmEvent::Complete {
                    response,
                    request_id,
                    total_ms,
                } => {
                    debug!("Reply for {request_id} after {total_ms}ms");
                    // A reply always lands in the conversation, even when
                    // the user toggled away while it was in flight.
                    self.messages
                        .add(Message::new(Sender::Assistant, response.clone()));

                    if self.pending_request == Some(request_id) {
                        self.pending_request = None;
                        if self.phase == Phase::Responding {
                            self.finish_response(response);
                        }
                    }
                }
                LlmEvent::Shutdown => {
                    debug!("LLM pipeline shut down");
                }
            }
        }

        let synthesis_events: Vec<SynthesisEvent> = self
            .synthesis_event_rx
            .as_ref()
            .map(|rx| rx.try_iter().collect())
            .unwrap_or_default();

        for event in synthesis_events {
            match event {
                SynthesisEvent::Finished => {
                    if self.phase == Phase::Speaking {
                        self.phase = Phase::Idle;
                    }
                }
                SynthesisEvent::Shutdown => {
                    debug!("Synthesis pipeline shut down");
                }
            }
        }
    }

    fn finish_response(&mut self, response: String) {
        if self.speak_replies {
            if let Some(tx) = &self.synthesis_command_tx {
                let _ = tx.send(SynthesisCommand::Speak(response));
                self.phase = Phase::Speaking;
                return;
            }
        }
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    struct Wired {
        state: AppState,
        capture_commands: Receiver<CaptureCommand>,
        capture_events: ChannelSender<CaptureEvent>,
        llm_commands: Receiver<LlmCommand>,
        llm_events: ChannelSender<LlmEvent>,
        synthesis_commands: Receiver<SynthesisCommand>,
        synthesis_events: ChannelSender<SynthesisEvent>,
    }

    fn wired_state() -> Wired {
        let (capture_cmd_tx, capture_cmd_rx) = bounded(16);
        let (capture_evt_tx, capture_evt_rx) = bounded(16);
        let (llm_cmd_tx, llm_cmd_rx) = bounded(16);
        let (llm_evt_tx, llm_evt_rx) = bounded(16);
        let (syn_cmd_tx, syn_cmd_rx) = bounded(16);
        let (syn_evt_tx, syn_evt_rx) = bounded(16);

        let mut state = AppState::new();
        state.capture_command_tx = Some(capture_cmd_tx);
        state.capture_event_rx = Some(capture_evt_rx);
        state.llm_command_tx = Some(llm_cmd_tx);
        state.llm_event_rx = Some(llm_evt_rx);
        state.synthesis_command_tx = Some(syn_cmd_tx);
        state.synthesis_event_rx = Some(syn_evt_rx);

        Wired {
            state,
            capture_commands: capture_cmd_rx,
            capture_events: capture_evt_tx,
            llm_commands: llm_cmd_rx,
            llm_events: llm_evt_tx,
            synthesis_commands: syn_cmd_rx,
            synthesis_events: syn_evt_tx,
        }
    }

    fn pending_id(commands: &Receiver<LlmCommand>) -> Uuid {
        match commands.try_recv().expect("expected an LLM command") {
            LlmCommand::Generate { request_id, .. } | LlmCommand::Chat { request_id, .. } => {
                request_id
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_toggle_preserves_conversation() {
        let mut wired = wired_state();
        wired.state.messages.add(Message::new(Sender::User, "hi"));
        wired
            .state
            .messages
            .add(Message::new(Sender::Assistant, "hello"));

        wired.state.toggle_mode();
        wired.state.toggle_mode();
        wired.state.toggle_mode();

        assert_eq!(wired.state.mode, Mode::Chat);
        assert_eq!(wired.state.messages.len(), 2);
    }

    #[test]
    fn test_toggle_resets_voice_state_and_cancels_session() {
        let mut wired = wired_state();
        wired.state.mic_pressed();
        assert_eq!(wired.state.phase, Phase::Listening);
        assert_eq!(
            wired.capture_commands.try_recv().unwrap(),
            CaptureCommand::Start
        );

        wired.state.level = 0.7;
        wired.state.toggle_mode();

        assert_eq!(wired.state.mode, Mode::Chat);
        assert_eq!(wired.state.phase, Phase::Idle);
        assert_eq!(wired.state.level, 0.0);
        assert_eq!(
            wired.capture_commands.try_recv().unwrap(),
            CaptureCommand::Cancel
        );
    }

    #[test]
    fn test_second_mic_press_stops_session() {
        let mut wired = wired_state();
        wired.state.mic_pressed();
        wired.state.mic_pressed();

        assert_eq!(
            wired.capture_commands.try_recv().unwrap(),
            CaptureCommand::Start
        );
        assert_eq!(
            wired.capture_commands.try_recv().unwrap(),
            CaptureCommand::Stop
        );
        // Still listening until the worker finalizes
        assert_eq!(wired.state.phase, Phase::Listening);
    }

    #[test]
    fn test_final_transcript_submits_and_reply_completes() {
        let mut wired = wired_state();
        wired.state.mic_pressed();

        wired
            .capture_events
            .send(CaptureEvent::Final("Tell me a joke".to_string()))
            .unwrap();
        wired.state.poll_events();

        assert_eq!(wired.state.phase, Phase::Responding);
        let all = wired.state.messages.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].sender, Sender::User);
        assert_eq!(all[0].content, "Tell me a joke");

        let request_id = pending_id(&wired.llm_commands);
        wired
            .llm_events
            .send(LlmEvent::Complete {
                response: "Why did the chicken cross the road?".to_string(),
                request_id,
                total_ms: 12,
            })
            .unwrap();
        wired.state.poll_events();

        assert_eq!(wired.state.phase, Phase::Idle);
        let all = wired.state.messages.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].sender, Sender::Assistant);
    }

    #[test]
    fn test_level_updates_only_while_listening() {
        let mut wired = wired_state();
        wired.capture_events.send(CaptureEvent::Level(0.9)).unwrap();
        wired.state.poll_events();
        assert_eq!(wired.state.level, 0.0);

        wired.state.mic_pressed();
        wired.capture_events.send(CaptureEvent::Level(0.9)).unwrap();
        wired.state.poll_events();
        assert_eq!(wired.state.level, 0.9);
    }

    #[test]
    fn test_stale_reply_appends_but_does_not_drive_phase() {
        let mut wired = wired_state();
        wired.state.submit("first".to_string());
        let _current = pending_id(&wired.llm_commands);

        // A reply from an older submission arrives while responding
        wired
            .llm_events
            .send(LlmEvent::Complete {
                response: "stale".to_string(),
                request_id: Uuid::new_v4(),
                total_ms: 5,
            })
            .unwrap();
        wired.state.poll_events();

        assert_eq!(wired.state.phase, Phase::Responding);
        let all = wired.state.messages.get_all();
        assert_eq!(all.last().unwrap().content, "stale");
    }

    #[test]
    fn test_reply_after_toggle_still_lands_in_conversation() {
        let mut wired = wired_state();
        wired.state.submit("question".to_string());
        let request_id = pending_id(&wired.llm_commands);

        wired.state.toggle_mode();
        assert_eq!(wired.state.phase, Phase::Idle);

        wired
            .llm_events
            .send(LlmEvent::Complete {
                response: "late answer".to_string(),
                request_id,
                total_ms: 5,
            })
            .unwrap();
        wired.state.poll_events();

        let all = wired.state.messages.get_all();
        assert_eq!(all.last().unwrap().content, "late answer");
        assert_eq!(wired.state.phase, Phase::Idle);
    }

    #[test]
    fn test_spoken_reply_walks_speaking_phase() {
        let mut wired = wired_state();
        wired.state.speak_replies = true;
        wired.state.submit("question".to_string());
        let request_id = pending_id(&wired.llm_commands);

        wired
            .llm_events
            .send(LlmEvent::Complete {
                response: "answer".to_string(),
                request_id,
                total_ms: 5,
            })
            .unwrap();
        wired.state.poll_events();

        assert_eq!(wired.state.phase, Phase::Speaking);
        assert!(matches!(
            wired.synthesis_commands.try_recv().unwrap(),
            SynthesisCommand::Speak(text) if text == "answer"
        ));

        wired
            .synthesis_events
            .send(SynthesisEvent::Finished)
            .unwrap();
        wired.state.poll_events();
        assert_eq!(wired.state.phase, Phase::Idle);
    }

    #[test]
    fn test_chat_api_style_sends_one_message_history() {
        let mut wired = wired_state();
        wired.state.api = ApiStyle::Chat;
        wired.state.input_text = "  hello there  ".to_string();
        wired.state.send_message();

        assert!(wired.state.input_text.is_empty());
        match wired.llm_commands.try_recv().unwrap() {
            LlmCommand::Chat { messages, .. } => {
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].role, "user");
                assert_eq!(messages[0].content, "hello there");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_not_sent() {
        let mut wired = wired_state();
        wired.state.input_text = "   ".to_string();
        wired.state.send_message();

        assert!(wired.state.messages.is_empty());
        assert!(wired.llm_commands.try_recv().is_err());
        assert_eq!(wired.state.phase, Phase::Idle);
    }

    #[test]
    fn test_mic_ignored_while_responding() {
        let mut wired = wired_state();
        wired.state.submit("question".to_string());
        let _ = pending_id(&wired.llm_commands);

        wired.state.mic_pressed();
        assert_eq!(wired.state.phase, Phase::Responding);
        assert!(wired.capture_commands.try_recv().is_err());
    }
}
