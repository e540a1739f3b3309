//! Orb visualization component
//!
//! The voice-mode canvas. What it paints depends on the interaction phase:
//! a blurred pulse plus film grain while listening, oscillating bars while
//! a reply is pending, and a spring-eased glow while the reply is spoken.
//! Idle frames paint nothing. A zero-area rect is a no-op.

use crate::ui::state::{AppState, Phase};
use crate::ui::theme::Theme;
use egui::{self, Color32, Pos2, Rect, Sense, Stroke, TextureHandle, TextureOptions, Vec2};
use rand::Rng;

/// Reference side length the drawing constants are expressed against
const BASE_SIDE: f32 = 300.0;

/// Pulse radius at zero input level
const PULSE_BASE_RADIUS: f32 = 50.0;
/// Extra pulse radius at full input level
const PULSE_LEVEL_GAIN: f32 = 20.0;

/// Number of oscillating bars while responding
const BAR_COUNT: usize = 5;
const BAR_WIDTH: f32 = 4.0;

/// Exponential easing toward a target value.
///
/// `tick` advances the value by the fraction of the remaining distance a
/// frame of `dt` seconds covers at the configured speed; stable for any
/// frame time.
#[derive(Debug, Clone)]
pub struct Spring {
    value: f32,
    target: f32,
    speed: f32,
}

impl Spring {
    pub fn new(value: f32, speed: f32) -> Self {
        Self {
            value,
            target: value,
            speed,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn tick(&mut self, dt: f32) {
        let blend = 1.0 - (-self.speed * dt.max(0.0)).exp();
        self.value += (self.target - self.value) * blend;
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Orb animation state carried across frames
pub struct OrbAnimation {
    /// Glow radius while speaking
    pub radius: Spring,
    /// Glow softness (how far the falloff reaches past the radius)
    pub softness: Spring,
    /// Reused texture for the per-frame grain overlay
    grain: Option<TextureHandle>,
}

/// Resting and speaking targets for the glow (radius, softness)
const GLOW_REST: (f32, f32) = (100.0, 20.0);
const GLOW_SPEAKING: (f32, f32) = (120.0, 40.0);

impl OrbAnimation {
    pub fn new() -> Self {
        Self {
            radius: Spring::new(GLOW_REST.0, 4.0),
            softness: Spring::new(GLOW_REST.1, 4.0),
            grain: None,
        }
    }

    fn tick(&mut self, speaking: bool, dt: f32) {
        let (radius, softness) = if speaking { GLOW_SPEAKING } else { GLOW_REST };
        self.radius.set_target(radius);
        self.softness.set_target(softness);
        self.radius.tick(dt);
        self.softness.tick(dt);
    }
}

impl Default for OrbAnimation {
    fn default() -> Self {
        Self::new()
    }
}

/// Orb visualization component
pub struct Orb<'a> {
    state: &'a mut AppState,
    theme: &'a Theme,
}

impl<'a> Orb<'a> {
    pub fn new(state: &'a mut AppState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(mut self, ui: &mut egui::Ui) -> egui::Response {
        let side = BASE_SIDE.min(ui.available_width()).min(ui.available_height());
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(side.max(0.0)), Sense::hover());

        // Degenerate canvas: nothing to draw, never panic
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return response;
        }

        let dt = ui.input(|i| i.stable_dt);
        self.state
            .orb
            .tick(self.state.phase == Phase::Speaking, dt);

        match self.state.phase {
            Phase::Idle => {}
            Phase::Listening => {
                self.paint_pulse(ui, rect);
                self.paint_grain(ui, rect);
            }
            Phase::Responding => self.paint_bars(ui, rect),
            Phase::Speaking => self.paint_glow(ui, rect),
        }

        response
    }

    /// Blurred circle sized by the current input level
    fn paint_pulse(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let scale = rect.width() / BASE_SIDE;
        let radius = (PULSE_BASE_RADIUS + self.state.level * PULSE_LEVEL_GAIN) * scale;

        // No blur in the painter: stack widening translucent discs instead
        let layers = 6;
        for i in 0..layers {
            let spread = i as f32 * 3.0 * scale;
            let alpha = (0.2 * 255.0 / layers as f32) as u8;
            painter.circle_filled(
                rect.center(),
                radius + spread,
                color_with_alpha(self.theme.orb, alpha),
            );
        }
    }

    /// Full-frame random-grayscale grain, one luminance per pixel
    fn paint_grain(&mut self, ui: &egui::Ui, rect: Rect) {
        let width = rect.width() as usize;
        let height = rect.height() as usize;
        if width == 0 || height == 0 {
            return;
        }

        let mut rng = rand::thread_rng();
        let mut image = egui::ColorImage::new([width, height], Color32::TRANSPARENT);
        for pixel in image.pixels.iter_mut() {
            let luminance: u8 = rng.gen_range(0..50);
            *pixel = Color32::from_rgba_unmultiplied(luminance, luminance, luminance, 50);
        }

        // Reuse one texture and overwrite it every frame
        if let Some(texture) = self.state.orb.grain.as_mut() {
            texture.set(image, TextureOptions::NEAREST);
        } else {
            self.state.orb.grain =
                Some(ui.ctx()
                    .load_texture("orb-grain", image, TextureOptions::NEAREST));
        }

        if let Some(texture) = &self.state.orb.grain {
            ui.painter_at(rect).image(
                texture.id(),
                rect,
                Rect::from_min_max(Pos2::new(0.0, 0.0), Pos2::new(1.0, 1.0)),
                Color32::WHITE,
            );
        }
    }

    /// Evenly spaced bars oscillating on wall-clock time, one phase offset
    /// per bar
    fn paint_bars(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let scale = rect.width() / BASE_SIDE;
        let spacing = rect.width() / (BAR_COUNT + 1) as f32;
        let t = ui.ctx().input(|i| i.time);

        for i in 0..BAR_COUNT {
            let x = rect.left() + spacing * (i + 1) as f32;
            let height = ((t * 10.0 + i as f64).sin() + 1.0) as f32 * 50.0 * scale;

            painter.line_segment(
                [
                    Pos2::new(x, rect.center().y - height / 2.0),
                    Pos2::new(x, rect.center().y + height / 2.0),
                ],
                Stroke::new(BAR_WIDTH * scale, self.theme.orb),
            );
        }
    }

    /// Radial glow; falloff approximated with stacked translucent discs
    fn paint_glow(&self, ui: &egui::Ui, rect: Rect) {
        let painter = ui.painter_at(rect);
        let scale = rect.width() / BASE_SIDE;
        let radius = self.state.orb.radius.value() * scale;
        let softness = self.state.orb.softness.value() * scale;

        let layers = 12;
        for i in 0..layers {
            // f runs 1 → ~0 from the outer edge toward the center
            let f = 1.0 - i as f32 / layers as f32;
            let r = radius * f + softness * f;
            let alpha = (200.0 / layers as f32 * (1.0 - f * 0.5)) as u8;
            painter.circle_filled(rect.center(), r, color_with_alpha(self.theme.orb, alpha));
        }
    }
}

fn color_with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_converges_to_target() {
        let mut spring = Spring::new(100.0, 4.0);
        spring.set_target(120.0);
        for _ in 0..240 {
            spring.tick(1.0 / 60.0);
        }
        assert!((spring.value() - 120.0).abs() < 0.1);
    }

    #[test]
    fn test_spring_is_stable_for_large_frame_times() {
        let mut spring = Spring::new(0.0, 4.0);
        spring.set_target(1.0);
        spring.tick(10.0);
        assert!(spring.value() <= 1.0);
        spring.tick(10.0);
        assert!(spring.value() <= 1.0);
    }

    #[test]
    fn test_spring_never_overshoots() {
        let mut spring = Spring::new(20.0, 4.0);
        spring.set_target(40.0);
        let mut previous = spring.value();
        for _ in 0..600 {
            spring.tick(0.016);
            assert!(spring.value() >= previous);
            assert!(spring.value() <= 40.0);
            previous = spring.value();
        }
    }

    #[test]
    fn test_orb_animation_eases_toward_speaking_targets() {
        let mut orb = OrbAnimation::new();
        for _ in 0..600 {
            orb.tick(true, 0.016);
        }
        assert!((orb.radius.value() - GLOW_SPEAKING.0).abs() < 0.5);
        assert!((orb.softness.value() - GLOW_SPEAKING.1).abs() < 0.5);

        for _ in 0..600 {
            orb.tick(false, 0.016);
        }
        assert!((orb.radius.value() - GLOW_REST.0).abs() < 0.5);
        assert!((orb.softness.value() - GLOW_REST.1).abs() < 0.5);
    }
}
