//! Audio-rate oscillator backing the graph's oscillator node.
//!
//! Sawtooth and square use PolyBLEP (Polynomial Band-Limited Step) correction
//! to keep aliasing down when a track picks a bright waveform.

use core::f32::consts::PI;
use libm::sinf;

/// Oscillator waveform types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Waveform {
    /// Pure fundamental tone.
    #[default]
    Sine,
    /// Odd harmonics, 50% duty cycle.
    Square,
    /// All harmonics, bright timbre.
    Sawtooth,
    /// Odd harmonics falling at 12 dB/octave, softer than square.
    Triangle,
}

impl Waveform {
    /// Lower-case name of the waveform.
    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Sawtooth => "sawtooth",
            Waveform::Triangle => "triangle",
        }
    }
}

/// Phase-accumulator oscillator.
///
/// ```rust
/// use keytone_core::{Oscillator, Waveform};
///
/// let mut osc = Oscillator::new(48000.0, Waveform::Triangle);
/// osc.set_frequency(220.0);
/// let sample = osc.advance();
/// assert!(sample.abs() <= 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Oscillator {
    /// Current phase position [0.0, 1.0)
    phase: f32,
    /// Phase increment per sample
    phase_inc: f32,
    sample_rate: f32,
    frequency: f32,
    waveform: Waveform,
}

impl Oscillator {
    /// Create an oscillator at 440 Hz with the given waveform.
    pub fn new(sample_rate: f32, waveform: Waveform) -> Self {
        Self {
            phase: 0.0,
            phase_inc: 440.0 / sample_rate,
            sample_rate,
            frequency: 440.0,
            waveform,
        }
    }

    /// Set frequency in Hz. Negative values are clamped to zero.
    #[inline]
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.frequency = freq_hz.max(0.0);
        self.phase_inc = self.frequency / self.sample_rate;
    }

    /// Current frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Waveform in use.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current phase in [0.0, 1.0).
    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset phase to 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Generate the next sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        let output = self.sample_at(self.phase);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        output
    }

    #[inline]
    fn sample_at(&self, phase: f32) -> f32 {
        let dt = self.phase_inc;
        match self.waveform {
            Waveform::Sine => sinf(phase * 2.0 * PI),
            Waveform::Sawtooth => 2.0 * phase - 1.0 - poly_blep(phase, dt),
            Waveform::Square => {
                let naive = if phase < 0.5 { 1.0 } else { -1.0 };
                let falling = phase + 0.5;
                let falling = if falling >= 1.0 { falling - 1.0 } else { falling };
                naive + poly_blep(phase, dt) - poly_blep(falling, dt)
            }
            // The corner is a slope discontinuity only; harmonics already fall
            // fast enough that the naive shape is clean at pad frequencies.
            Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
        }
    }
}

/// 4th-order PolyBLEP correction.
///
/// C²-continuous degree-4 piecewise polynomial fitted to the ideal BLEP
/// residual, spanning 2 samples on each side of the discontinuity.
///
/// Reference: Välimäki et al., "Antialiasing Oscillators", IEEE Signal
/// Processing Magazine, 2010.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    const A4: f32 = -43.0 / 48.0;
    const A3: f32 = 7.0 / 6.0;
    const A2: f32 = 0.5;
    const A0: f32 = -1.0;
    const C: f32 = -11.0 / 48.0;

    if dt <= 0.0 {
        return 0.0;
    }

    let dt2 = 2.0 * dt;
    if t < dt2 {
        let n = t / dt;
        if n < 1.0 {
            let n2 = n * n;
            A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            C * u2 * u2
        }
    } else if t > 1.0 - dt2 {
        let n = (1.0 - t) / dt;
        if n < 1.0 {
            let n2 = n * n;
            -(A4 * n2 * n2 + A3 * n2 * n + A2 * n2 + A0)
        } else {
            let u = 2.0 - n;
            let u2 = u * u;
            -(C * u2 * u2)
        }
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rising_crossings(osc: &mut Oscillator, samples: usize) -> i32 {
        let mut count = 0;
        let mut prev = osc.advance();
        for _ in 1..samples {
            let sample = osc.advance();
            if prev <= 0.0 && sample > 0.0 {
                count += 1;
            }
            prev = sample;
        }
        count
    }

    #[test]
    fn test_sine_frequency_440hz() {
        let mut osc = Oscillator::new(48000.0, Waveform::Sine);
        osc.set_frequency(440.0);
        let crossings = rising_crossings(&mut osc, 48000);
        assert!((crossings - 440).abs() <= 2, "got {crossings}");
    }

    #[test]
    fn test_triangle_frequency_and_range() {
        let mut osc = Oscillator::new(48000.0, Waveform::Triangle);
        osc.set_frequency(100.0);
        for _ in 0..4800 {
            let s = osc.advance();
            assert!((-1.0..=1.0).contains(&s), "triangle out of range: {s}");
        }
        osc.reset();
        let crossings = rising_crossings(&mut osc, 48000);
        assert!((crossings - 100).abs() <= 2, "got {crossings}");
    }

    #[test]
    fn test_saw_and_square_range() {
        for waveform in [Waveform::Sawtooth, Waveform::Square] {
            let mut osc = Oscillator::new(48000.0, waveform);
            osc.set_frequency(1000.0);
            for _ in 0..10000 {
                let s = osc.advance();
                assert!((-2.0..=2.0).contains(&s), "{waveform:?} out of range: {s}");
            }
        }
    }

    #[test]
    fn test_zero_frequency_holds_phase() {
        let mut osc = Oscillator::new(48000.0, Waveform::Sine);
        osc.set_frequency(-5.0);
        assert_eq!(osc.frequency(), 0.0);
        for _ in 0..10 {
            assert_eq!(osc.advance(), 0.0);
        }
    }

    #[test]
    fn test_waveform_names() {
        assert_eq!(Waveform::Sine.name(), "sine");
        assert_eq!(Waveform::Triangle.name(), "triangle");
        assert_eq!(Waveform::default(), Waveform::Sine);
    }
}
