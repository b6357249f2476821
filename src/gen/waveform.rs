//! Periodic waveform functions and the cyclable waveform catalogue
//!
//! Every function maps `(frequency, amplitude, time)` to a sample. Time is the
//! engine's phase clock in seconds and is kept in `f64` so long sessions do not
//! lose phase precision.

use super::noise::NoiseSource;
use crate::error::SynthError;
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

pub fn sine(frequency: f32, amplitude: f32, time: f64) -> f32 {
    (frequency as f64 * time * TAU).sin() as f32 * amplitude
}

/// High while the unit sine is above a threshold shifted by the duty cycle.
pub fn pulse(frequency: f32, amplitude: f32, time: f64, duty_cycle: f32) -> f32 {
    if sine(frequency, 1.0, time) >= (1.0 - duty_cycle) - 0.5 {
        amplitude
    } else {
        -amplitude
    }
}

pub fn square(frequency: f32, amplitude: f32, time: f64) -> f32 {
    pulse(frequency, amplitude, time, 0.5)
}

/// Ramp from `-amplitude` up to `amplitude` once per period.
pub fn sawtooth(frequency: f32, amplitude: f32, time: f64) -> f32 {
    let cycles = time * frequency as f64;
    (2.0 * (cycles - (cycles + 0.5).floor())) as f32 * amplitude
}

/// Folded sawtooth.
///
/// The `- 1.0` offset is not scaled by `amplitude`, so anything below full
/// amplitude is shifted downwards rather than shrunk around zero.
pub fn triangle(frequency: f32, amplitude: f32, time: f64) -> f32 {
    sawtooth(frequency, amplitude, time).abs() * 2.0 - 1.0
}

/// Difference of two uniform draws: triangular distribution over (-amplitude, amplitude).
pub fn noise(amplitude: f32, source: &mut NoiseSource) -> f32 {
    let (a, b) = source.next_pair();
    (a - b) as f32 * amplitude
}

/// The selectable waveforms, in cycling order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WaveformKind {
    #[default]
    Sine,
    Pulse12_5,
    Pulse25,
    Square,
    Pulse75,
    Sawtooth,
    Triangle,
    Noise,
}

impl WaveformKind {
    pub const ALL: [WaveformKind; 8] = [
        WaveformKind::Sine,
        WaveformKind::Pulse12_5,
        WaveformKind::Pulse25,
        WaveformKind::Square,
        WaveformKind::Pulse75,
        WaveformKind::Sawtooth,
        WaveformKind::Triangle,
        WaveformKind::Noise,
    ];

    pub fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|kind| *kind == self)
            .unwrap_or_default()
    }

    /// Waveform at `index`, wrapping around the catalogue
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn next(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    pub fn previous(self) -> Self {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }

    pub fn name(self) -> &'static str {
        match self {
            WaveformKind::Sine => "Sine Wave",
            WaveformKind::Pulse12_5 => "Pulse Wave (12.5% duty cycle)",
            WaveformKind::Pulse25 => "Pulse Wave (25% duty cycle)",
            WaveformKind::Square => "Square Wave (pulse wave w/ 50% duty cycle)",
            WaveformKind::Pulse75 => "Pulse Wave (75% duty cycle)",
            WaveformKind::Sawtooth => "Sawtooth Wave",
            WaveformKind::Triangle => "Triangle Wave",
            WaveformKind::Noise => "Noise",
        }
    }

    pub fn duty_cycle(self) -> Option<f32> {
        match self {
            WaveformKind::Pulse12_5 => Some(0.125),
            WaveformKind::Pulse25 => Some(0.25),
            WaveformKind::Square => Some(0.5),
            WaveformKind::Pulse75 => Some(0.75),
            _ => None,
        }
    }

    pub fn is_noise(self) -> bool {
        self == WaveformKind::Noise
    }

    /// Evaluate this waveform. Only `Noise` touches the random source.
    pub fn sample(self, frequency: f32, amplitude: f32, time: f64, source: &mut NoiseSource) -> f32 {
        match self {
            WaveformKind::Sine => sine(frequency, amplitude, time),
            WaveformKind::Sawtooth => sawtooth(frequency, amplitude, time),
            WaveformKind::Triangle => triangle(frequency, amplitude, time),
            WaveformKind::Noise => noise(amplitude, source),
            pulse_kind => {
                let duty = pulse_kind.duty_cycle().unwrap_or(0.5);
                pulse(frequency, amplitude, time, duty)
            }
        }
    }
}

impl fmt::Display for WaveformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WaveformKind {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sine" => Ok(WaveformKind::Sine),
            "pulse12.5" | "pulse125" | "pulse12" => Ok(WaveformKind::Pulse12_5),
            "pulse25" => Ok(WaveformKind::Pulse25),
            "square" | "pulse50" => Ok(WaveformKind::Square),
            "pulse75" => Ok(WaveformKind::Pulse75),
            "saw" | "sawtooth" => Ok(WaveformKind::Sawtooth),
            "triangle" | "tri" => Ok(WaveformKind::Triangle),
            "noise" => Ok(WaveformKind::Noise),
            other => Err(SynthError::InvalidConfig(format!("unknown waveform '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_duty_cycles() {
        // Fraction of one period spent high should follow the duty cycle ordering
        let frequency = 1.0;
        let steps = 10_000;
        let high_fraction = |duty: f32| {
            (0..steps)
                .filter(|i| pulse(frequency, 1.0, *i as f64 / steps as f64, duty) > 0.0)
                .count() as f32
                / steps as f32
        };

        let eighth = high_fraction(0.125);
        let quarter = high_fraction(0.25);
        let half = high_fraction(0.5);
        let three_quarter = high_fraction(0.75);

        assert!((half - 0.5).abs() < 0.01, "square should be high half the time, got {}", half);
        assert!(eighth < quarter && quarter < half && half < three_quarter);
    }

    #[test]
    fn test_triangle_offset_is_not_scaled() {
        // At a sawtooth zero crossing the triangle sits at -1 regardless of amplitude
        assert_eq!(triangle(1.0, 0.5, 0.0), -1.0);
        assert_eq!(triangle(1.0, 1.0, 0.0), -1.0);
        // Half amplitude peaks at 0 instead of 0.5
        assert!(triangle(1.0, 0.5, 0.4999).abs() < 0.01);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("Sine".parse::<WaveformKind>().unwrap(), WaveformKind::Sine);
        assert_eq!("pulse12.5".parse::<WaveformKind>().unwrap(), WaveformKind::Pulse12_5);
        assert_eq!("saw".parse::<WaveformKind>().unwrap(), WaveformKind::Sawtooth);
        assert!("organ".parse::<WaveformKind>().is_err());
    }

    #[test]
    fn test_index_round_trip() {
        for (i, kind) in WaveformKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
            assert_eq!(WaveformKind::from_index(i), *kind);
        }
        assert_eq!(WaveformKind::from_index(8), WaveformKind::Sine);
    }
}
