//! Main application struct and eframe integration

use crate::capture::{LiveCapture, Recognizer, SimulatedCapture, SimulatedCaptureConfig};
use crate::config::{AppConfig, CaptureSource};
use crate::llm::LlmPipeline;
use crate::speech::{NullSynthesizer, SynthesisPipeline};
use crate::ui::components::{InputBar, MessageList, Orb};
use crate::ui::state::{AppState, Mode, Phase};
use crate::ui::theme::Theme;
use egui::{self, CentralPanel, RichText, TopBottomPanel, Vec2};
use tracing::warn;

/// Main Patter application
pub struct PatterApp {
    /// Application state
    state: AppState,
    /// Visual theme
    theme: Theme,
}

impl PatterApp {
    /// Create a new Patter application and start its worker pipelines
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        if let Err(e) = config.validate() {
            warn!("Invalid configuration, continuing with it anyway: {e}");
        }

        let mut state = AppState::new();
        state.api = config.api;
        state.speak_replies = config.speak_replies;

        // Capture pipeline
        match config.capture {
            CaptureSource::Simulated => {
                let capture = SimulatedCapture::new(SimulatedCaptureConfig::default());
                state.capture_command_tx = Some(capture.command_sender());
                state.capture_event_rx = Some(capture.event_receiver());
                if let Err(e) = capture.start_worker() {
                    warn!("Capture pipeline unavailable: {e}");
                }
            }
            CaptureSource::Live => {
                let capture = LiveCapture::new(platform_recognizer());
                state.capture_command_tx = Some(capture.command_sender());
                state.capture_event_rx = Some(capture.event_receiver());
                if let Err(e) = capture.start_worker() {
                    warn!("Capture pipeline unavailable: {e}");
                }
            }
        }

        // LLM pipeline
        let llm = LlmPipeline::new(config.llm);
        state.llm_command_tx = Some(llm.command_sender());
        state.llm_event_rx = Some(llm.event_receiver());
        if let Err(e) = llm.start_worker() {
            warn!("LLM pipeline unavailable: {e}");
        }

        // Synthesis pipeline
        let synthesis = SynthesisPipeline::new(platform_synthesizer());
        state.synthesis_command_tx = Some(synthesis.command_sender());
        state.synthesis_event_rx = Some(synthesis.event_receiver());
        if let Err(e) = synthesis.start_worker() {
            warn!("Synthesis pipeline unavailable: {e}");
        }

        Self { state, theme }
    }

    /// Show the top header bar with the mode toggle
    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Patter")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.label(
                        RichText::new("Assistant")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let (icon, tooltip) = match self.state.mode {
                            Mode::Voice => ("💬", "Switch to chat"),
                            Mode::Chat => ("🎤", "Switch to voice"),
                        };

                        let response = ui.button(icon);
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Button,
                                true,
                                "Toggle mode",
                            )
                        });
                        if response.on_hover_text(tooltip).clicked() {
                            self.state.toggle_mode();
                        }
                    });
                });
            });
    }

    /// Show the voice surface: the orb with the mic button beneath it
    fn show_voice_view(&mut self, ctx: &egui::Context) {
        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    let orb_height = (ui.available_height() - 120.0).max(0.0);
                    ui.allocate_ui(Vec2::new(ui.available_width(), orb_height), |ui| {
                        ui.centered_and_justified(|ui| {
                            Orb::new(&mut self.state, &self.theme).show(ui);
                        });
                    });

                    self.show_mic_button(ui);

                    if let Some(partial) = &self.state.partial_transcript {
                        ui.add_space(self.theme.spacing_sm);
                        ui.label(
                            RichText::new(partial)
                                .size(13.0)
                                .italics()
                                .color(self.theme.text_muted),
                        );
                    }
                });
            });
    }

    fn show_mic_button(&mut self, ui: &mut egui::Ui) {
        let is_listening = self.state.phase == Phase::Listening;
        let icon = if is_listening { "🔊" } else { "🎤" };

        let button = egui::Button::new(RichText::new(icon).size(22.0))
            .min_size(Vec2::splat(56.0))
            .rounding(self.theme.button_rounding)
            .fill(if is_listening {
                self.theme.listening.gamma_multiply(0.2)
            } else {
                self.theme.bg_secondary
            });

        let enabled = matches!(self.state.phase, Phase::Idle | Phase::Listening);
        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, true, "Microphone")
        });

        if response.clicked() {
            self.state.mic_pressed();
        }

        // Pulsing ring while listening
        if is_listening {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;

            let painter = ui.painter();
            let center = response.rect.center();
            let radius = response.rect.width() / 2.0 + 2.0 + pulse * 3.0;

            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(
                    2.0 * pulse,
                    self.theme.listening.gamma_multiply(1.0 - pulse * 0.5),
                ),
            );
        }
    }

    /// Show the chat surface: message log plus the input bar
    fn show_chat_view(&mut self, ctx: &egui::Context) {
        TopBottomPanel::bottom("input_area")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                InputBar::new(&mut self.state, &self.theme).show(ui);
            });

        CentralPanel::default()
            .frame(egui::Frame::none().fill(self.theme.bg_primary))
            .show(ctx, |ui| {
                MessageList::new(&self.state, &self.theme).show(ui);
            });
    }
}

impl eframe::App for PatterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Drain worker events before rendering
        self.state.poll_events();

        self.show_header(ctx);
        match self.state.mode {
            Mode::Voice => self.show_voice_view(ctx),
            Mode::Chat => self.show_chat_view(ctx),
        }

        // Voice mode repaints every frame; chat mode only needs it while a
        // reply is pending
        if self.state.mode == Mode::Voice || self.state.is_generating() {
            ctx.request_repaint();
        }
    }
}

/// Platform speech recognizer, when the host offers one. None is a valid
/// answer: voice mode stays visible and start commands are ignored.
fn platform_recognizer() -> Option<Box<dyn Recognizer>> {
    None
}

/// Platform speech synthesizer. Falls back to a silent synthesizer so the
/// speaking phase still completes.
fn platform_synthesizer() -> Box<dyn crate::speech::Synthesizer> {
    Box::new(NullSynthesizer)
}
