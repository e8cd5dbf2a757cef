use std::f32::consts::TAU;

/// Which sine displacement the terrain vertex shader applies.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum PlaneMode {
    Flat,
    #[default]
    YAxis,
    XyAxis,
}

impl PlaneMode {
    /// Identifier shared with the terrain shader.
    pub fn id(self) -> u32 {
        match self {
            PlaneMode::Flat => 0,
            PlaneMode::YAxis => 1,
            PlaneMode::XyAxis => 2,
        }
    }
}

/// One keyboard step on a wave parameter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WaveControl {
    AmplitudeDown,
    AmplitudeUp,
    WaveNumberDown,
    WaveNumberUp,
    PeriodDown,
    PeriodUp,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WaveParams {
    pub amplitude: f32,
    pub wave_number: f32,
    pub wave_period: f32,
}

impl WaveParams {
    pub const AMPLITUDE_STEP: f32 = 1.0;
    pub const WAVE_NUMBER_STEP: f32 = 0.1;
    pub const PERIOD_STEP: f32 = 5.0;

    pub fn adjust(&mut self, control: WaveControl) {
        match control {
            WaveControl::AmplitudeDown => self.amplitude -= Self::AMPLITUDE_STEP,
            WaveControl::AmplitudeUp => self.amplitude += Self::AMPLITUDE_STEP,
            WaveControl::WaveNumberDown => self.wave_number -= Self::WAVE_NUMBER_STEP,
            WaveControl::WaveNumberUp => self.wave_number += Self::WAVE_NUMBER_STEP,
            WaveControl::PeriodDown => self.wave_period -= Self::PERIOD_STEP,
            WaveControl::PeriodUp => self.wave_period += Self::PERIOD_STEP,
        }
        log::info!(
            "Amplitude: {} Wave Number: {} Wave Period: {}",
            self.amplitude,
            self.wave_number,
            self.wave_period
        );
    }

    /// Temporal phase at `time`; a zero period freezes the wave.
    pub fn phase(&self, time: f32) -> f32 {
        if self.wave_period == 0.0 {
            0.0
        } else {
            TAU * time / self.wave_period
        }
    }
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            amplitude: 2.0,
            wave_number: 0.5,
            wave_period: 50.0,
        }
    }
}

/// Vertical offset added to a vertex at `(x, z)`. Must stay in step with
/// `displace` in `terrain.wgsl`.
pub fn displacement(mode: PlaneMode, params: &WaveParams, x: f32, z: f32, time: f32) -> f32 {
    let phase = params.phase(time);
    let k = params.wave_number;
    match mode {
        PlaneMode::Flat => 0.0,
        PlaneMode::YAxis => params.amplitude * (k * x - phase).sin(),
        PlaneMode::XyAxis => params.amplitude * (k * x - phase).sin() * (k * z - phase).cos(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_never_moves() {
        let p = WaveParams::default();
        for t in [0.0, 3.0, 17.5] {
            assert_eq!(displacement(PlaneMode::Flat, &p, 1.3, -4.0, t), 0.0);
        }
    }

    #[test]
    fn y_axis_ignores_z_and_peaks_at_amplitude() {
        let p = WaveParams {
            amplitude: 3.0,
            wave_number: 1.0,
            wave_period: 10.0,
        };
        let x = std::f32::consts::FRAC_PI_2;
        let a = displacement(PlaneMode::YAxis, &p, x, 0.0, 0.0);
        let b = displacement(PlaneMode::YAxis, &p, x, 42.0, 0.0);
        assert!((a - 3.0).abs() < 1e-5);
        assert_eq!(a, b);
    }

    #[test]
    fn wave_repeats_after_one_period() {
        let p = WaveParams::default();
        let a = displacement(PlaneMode::XyAxis, &p, 2.0, 1.0, 3.0);
        let b = displacement(PlaneMode::XyAxis, &p, 2.0, 1.0, 3.0 + p.wave_period);
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn zero_period_freezes_phase() {
        let p = WaveParams {
            wave_period: 0.0,
            ..WaveParams::default()
        };
        assert_eq!(p.phase(100.0), 0.0);
    }

    #[test]
    fn controls_step_parameters() {
        let mut p = WaveParams::default();
        p.adjust(WaveControl::AmplitudeUp);
        p.adjust(WaveControl::WaveNumberDown);
        p.adjust(WaveControl::PeriodUp);
        p.adjust(WaveControl::PeriodUp);
        assert_eq!(p.amplitude, 3.0);
        assert!((p.wave_number - 0.4).abs() < 1e-6);
        assert_eq!(p.wave_period, 60.0);
    }

    #[test]
    fn amplitude_moves_one_unit_per_step() {
        let mut p = WaveParams::default();
        p.adjust(WaveControl::AmplitudeDown);
        p.adjust(WaveControl::AmplitudeDown);
        p.adjust(WaveControl::AmplitudeDown);
        assert_eq!(p.amplitude, -1.0);
        assert_eq!(WaveParams::AMPLITUDE_STEP, 1.0);
    }

    #[test]
    fn plane_mode_ids() {
        assert_eq!(PlaneMode::Flat.id(), 0);
        assert_eq!(PlaneMode::YAxis.id(), 1);
        assert_eq!(PlaneMode::XyAxis.id(), 2);
    }
}
