//! Property-based tests for keytone-core automation and rendering.
//!
//! Tests ramp bounds, monotonicity, and render stability using proptest for
//! randomized schedules.

use keytone_core::{AudioContext, AudioParam, ContextOptions, Destination, ParamKind, Waveform};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// A linear ramp never leaves the interval spanned by its endpoints.
    #[test]
    fn linear_ramp_stays_between_endpoints(
        start in -10.0f32..10.0,
        end in -10.0f32..10.0,
        t0 in 0.0f64..5.0,
        span in 0.001f64..5.0,
        probe in 0.0f64..1.0,
    ) {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(start, t0).unwrap();
        param.linear_ramp_to_value_at_time(end, t0 + span, 0.0).unwrap();

        let v = param.value_at(t0 + span * probe);
        let (lo, hi) = if start < end { (start, end) } else { (end, start) };
        prop_assert!(v >= lo - 1e-3 && v <= hi + 1e-3, "{} outside [{}, {}]", v, lo, hi);
    }

    /// An exponential decay is monotonically non-increasing and positive.
    #[test]
    fn exponential_decay_monotonic(
        peak in 0.01f32..1.0,
        ratio in 0.001f32..0.99,
        length in 0.01f64..3.0,
    ) {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(peak, 0.0).unwrap();
        param.exponential_ramp_to_value_at_time(peak * ratio, length, 0.0).unwrap();

        let mut prev = f32::INFINITY;
        for i in 0..=64 {
            let v = param.value_at(length * f64::from(i) / 64.0);
            prop_assert!(v > 0.0);
            prop_assert!(v <= prev + 1e-6, "rose from {} to {}", prev, v);
            prev = v;
        }
    }

    /// Pruning past events never changes values at or after the prune time.
    #[test]
    fn prune_preserves_future_values(
        values in prop::collection::vec(0.01f32..1.0, 1..8),
        now in 0.0f64..10.0,
    ) {
        let mut param = AudioParam::new(0.5);
        for (i, &v) in values.iter().enumerate() {
            let t = i as f64 * 1.5;
            if i % 2 == 0 {
                param.set_value_at_time(v, t).unwrap();
            } else {
                param.exponential_ramp_to_value_at_time(v, t, 0.0).unwrap();
            }
        }

        let before: Vec<f32> = (0..20).map(|k| param.value_at(now + f64::from(k) * 0.5)).collect();
        param.prune(now);
        let after: Vec<f32> = (0..20).map(|k| param.value_at(now + f64::from(k) * 0.5)).collect();
        prop_assert_eq!(before, after);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    /// Filtered oscillators with modulated cutoff always render finite output.
    #[test]
    fn filtered_voice_renders_finite(
        freq in 20.0f32..4000.0,
        cutoff in 20.0f32..20000.0,
        q in 0.1f32..10.0,
        depth in 0.0f32..2000.0,
        waveform in 0usize..4,
    ) {
        let waveform = [Waveform::Sine, Waveform::Square, Waveform::Sawtooth, Waveform::Triangle][waveform];
        let mut ctx = AudioContext::new(ContextOptions::default());
        ctx.resume();

        let osc = ctx.create_oscillator(waveform).unwrap();
        let filter = ctx.create_lowpass().unwrap();
        let lfo = ctx.create_oscillator(Waveform::Sine).unwrap();
        let lfo_gain = ctx.create_gain().unwrap();

        ctx.set_param(osc, ParamKind::Frequency, freq).unwrap();
        ctx.set_param(filter, ParamKind::Frequency, cutoff).unwrap();
        ctx.set_param(filter, ParamKind::Q, q).unwrap();
        ctx.set_param(lfo, ParamKind::Frequency, 5.0).unwrap();
        ctx.set_param(lfo_gain, ParamKind::Gain, depth).unwrap();

        ctx.connect(osc, Destination::Node(filter)).unwrap();
        ctx.connect(lfo, Destination::Node(lfo_gain)).unwrap();
        ctx.connect(lfo_gain, Destination::Param(filter, ParamKind::Frequency)).unwrap();
        ctx.connect(filter, Destination::Output).unwrap();
        ctx.start(osc, 0.0).unwrap();
        ctx.start(lfo, 0.0).unwrap();

        let mut block = vec![0.0f32; 4800];
        ctx.render(&mut block);
        prop_assert!(block.iter().all(|s| s.is_finite()));
    }
}
