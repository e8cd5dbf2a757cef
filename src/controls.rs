use crate::camera::ViewPreset;
use crate::post::PostEffect;
use crate::terrain::RenderMode;
use crate::wave::{PlaneMode, WaveControl};

pub const CAMERA_SPEED: f32 = 5.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// What a key press asks the visualizer to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Preset(ViewPreset),
    Move(Movement),
    ToggleMouseLook,
    Wave(WaveControl),
    PlaneMode(PlaneMode),
    ToggleGeometryWireframe,
    ToggleFramebufferWireframe,
    RenderMode(RenderMode),
    PostEffect(PostEffect),
}

#[cfg(feature = "winit")]
impl Action {
    pub fn from_key(code: winit::keyboard::KeyCode) -> Option<Self> {
        use winit::keyboard::KeyCode;
        let action = match code {
            KeyCode::Escape | KeyCode::KeyQ => Action::Quit,

            KeyCode::KeyA => Action::Preset(ViewPreset::Top),
            KeyCode::KeyS => Action::Preset(ViewPreset::Bottom),
            KeyCode::KeyD => Action::Preset(ViewPreset::Left),
            KeyCode::KeyF => Action::Preset(ViewPreset::Right),
            KeyCode::KeyG => Action::Preset(ViewPreset::Front),
            KeyCode::KeyH => Action::Preset(ViewPreset::Back),

            KeyCode::ArrowLeft => Action::Move(Movement::Left),
            KeyCode::ArrowRight => Action::Move(Movement::Right),
            KeyCode::ArrowUp => Action::Move(Movement::Forward),
            KeyCode::ArrowDown => Action::Move(Movement::Backward),
            KeyCode::ShiftRight => Action::Move(Movement::Up),
            KeyCode::ControlRight | KeyCode::AltRight => Action::Move(Movement::Down),

            KeyCode::KeyR => Action::ToggleMouseLook,

            KeyCode::BracketLeft => Action::Wave(WaveControl::AmplitudeDown),
            KeyCode::BracketRight => Action::Wave(WaveControl::AmplitudeUp),
            KeyCode::Semicolon => Action::Wave(WaveControl::WaveNumberDown),
            KeyCode::Quote => Action::Wave(WaveControl::WaveNumberUp),
            KeyCode::Period => Action::Wave(WaveControl::PeriodDown),
            KeyCode::Slash => Action::Wave(WaveControl::PeriodUp),

            KeyCode::KeyZ => Action::PlaneMode(PlaneMode::YAxis),
            KeyCode::KeyX => Action::PlaneMode(PlaneMode::XyAxis),
            KeyCode::KeyC => Action::PlaneMode(PlaneMode::Flat),

            KeyCode::KeyW => Action::ToggleGeometryWireframe,
            KeyCode::KeyE => Action::ToggleFramebufferWireframe,
            KeyCode::KeyO => Action::RenderMode(RenderMode::TriangleStrip),
            KeyCode::KeyP => Action::RenderMode(RenderMode::Points),

            KeyCode::Digit1 => Action::PostEffect(PostEffect::Standard),
            KeyCode::Digit2 => Action::PostEffect(PostEffect::Grayscale),
            KeyCode::Digit3 => Action::PostEffect(PostEffect::Blur),
            KeyCode::Digit4 => Action::PostEffect(PostEffect::Invert),
            KeyCode::Digit5 => Action::PostEffect(PostEffect::Sharpen),
            KeyCode::Digit6 => Action::PostEffect(PostEffect::EdgeDetection),

            _ => return None,
        };
        Some(action)
    }
}
