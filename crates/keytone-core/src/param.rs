//! Automatable node parameters.
//!
//! [`AudioParam`] holds an intrinsic value plus a timeline of automation
//! events. Evaluation follows the Web Audio rules: a ramp event interpolates
//! from the event before it, and after the last event the parameter holds
//! that event's value.
//!
//! ```text
//!  value
//!   0.1 ┤     ╭──────────╮
//!       │    ╱            ╲
//!   0.0 ┼───╯              ╰────
//!       t   t+a      t+d-r  t+d
//!      set  linear   set   linear
//! ```

use libm::powf;

use crate::error::{GraphError, Result};

/// Identifies one parameter on a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Oscillator frequency or filter cutoff, in Hz.
    Frequency,
    /// Oscillator detune, in cents.
    Detune,
    /// Gain stage multiplier.
    Gain,
    /// Filter resonance.
    Q,
}

impl ParamKind {
    pub(crate) const COUNT: usize = 4;

    #[inline]
    pub(crate) fn slot(self) -> usize {
        match self {
            ParamKind::Frequency => 0,
            ParamKind::Detune => 1,
            ParamKind::Gain => 2,
            ParamKind::Q => 3,
        }
    }
}

impl core::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ParamKind::Frequency => "frequency",
            ParamKind::Detune => "detune",
            ParamKind::Gain => "gain",
            ParamKind::Q => "Q",
        };
        f.write_str(name)
    }
}

/// One scheduled change on a parameter timeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AutomationEvent {
    /// Jump to `value` at `time`.
    SetValue {
        /// Absolute context time in seconds.
        time: f64,
        /// Target value.
        value: f32,
    },
    /// Ramp linearly from the previous event, arriving at `value` at `time`.
    LinearRamp {
        /// Absolute context time in seconds.
        time: f64,
        /// Target value.
        value: f32,
    },
    /// Ramp exponentially from the previous event, arriving at `value` at `time`.
    ExponentialRamp {
        /// Absolute context time in seconds.
        time: f64,
        /// Target value, strictly positive.
        value: f32,
    },
}

impl AutomationEvent {
    /// Time at which the event completes.
    pub fn time(&self) -> f64 {
        match *self {
            AutomationEvent::SetValue { time, .. }
            | AutomationEvent::LinearRamp { time, .. }
            | AutomationEvent::ExponentialRamp { time, .. } => time,
        }
    }

    /// Value the event arrives at.
    pub fn value(&self) -> f32 {
        match *self {
            AutomationEvent::SetValue { value, .. }
            | AutomationEvent::LinearRamp { value, .. }
            | AutomationEvent::ExponentialRamp { value, .. } => value,
        }
    }

    fn is_ramp(&self) -> bool {
        !matches!(self, AutomationEvent::SetValue { .. })
    }
}

/// An automatable parameter: intrinsic value plus an ordered event timeline.
#[derive(Debug, Clone)]
pub struct AudioParam {
    value: f32,
    events: Vec<AutomationEvent>,
}

impl AudioParam {
    /// Create a parameter with the given intrinsic value and no automation.
    pub fn new(value: f32) -> Self {
        Self {
            value,
            events: Vec::new(),
        }
    }

    /// Intrinsic value, used until the first automation event takes effect.
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Replace the intrinsic value.
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    /// Scheduled events, ordered by time.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Schedule a jump to `value` at `time`.
    pub fn set_value_at_time(&mut self, value: f32, time: f64) -> Result<()> {
        check_time(time)?;
        self.insert(AutomationEvent::SetValue { time, value });
        Ok(())
    }

    /// Schedule a linear ramp arriving at `value` at `time`.
    ///
    /// `now` anchors the ramp when no earlier event exists.
    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, time: f64, now: f64) -> Result<()> {
        check_time(time)?;
        self.anchor(now);
        self.insert(AutomationEvent::LinearRamp { time, value });
        Ok(())
    }

    /// Schedule an exponential ramp arriving at `value` at `time`.
    ///
    /// `value` must be strictly positive.
    pub fn exponential_ramp_to_value_at_time(
        &mut self,
        value: f32,
        time: f64,
        now: f64,
    ) -> Result<()> {
        check_time(time)?;
        if value <= 0.0 || !value.is_finite() {
            return Err(GraphError::NonPositiveRampTarget(value));
        }
        self.anchor(now);
        self.insert(AutomationEvent::ExponentialRamp { time, value });
        Ok(())
    }

    /// Evaluate the automated value at absolute time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        // Index of the first event strictly in the future.
        let next = self.events.partition_point(|e| e.time() <= t);

        if next == 0 {
            return self.value;
        }

        let prev = self.events[next - 1];
        match self.events.get(next) {
            Some(upcoming) if upcoming.is_ramp() => {
                interpolate(prev.time(), prev.value(), upcoming, t)
            }
            _ => prev.value(),
        }
    }

    /// Drop events that can no longer influence values at or after `now`.
    ///
    /// The last event at or before `now` is kept as the anchor for any ramp
    /// that follows it.
    pub fn prune(&mut self, now: f64) {
        let next = self.events.partition_point(|e| e.time() <= now);
        if next > 1 {
            self.events.drain(..next - 1);
        }
    }

    /// Insert a ramp anchor at `now` when the timeline is empty, so the ramp
    /// starts from the intrinsic value instead of time zero.
    fn anchor(&mut self, now: f64) {
        if self.events.is_empty() {
            self.events.push(AutomationEvent::SetValue {
                time: now,
                value: self.value,
            });
        }
    }

    /// Insert keeping time order; equal times land after existing events.
    fn insert(&mut self, event: AutomationEvent) {
        let at = self.events.partition_point(|e| e.time() <= event.time());
        self.events.insert(at, event);
    }
}

fn check_time(time: f64) -> Result<()> {
    if time.is_finite() && time >= 0.0 {
        Ok(())
    } else {
        Err(GraphError::InvalidTime(time))
    }
}

fn interpolate(t0: f64, v0: f32, ramp: &AutomationEvent, t: f64) -> f32 {
    let t1 = ramp.time();
    let v1 = ramp.value();
    let span = t1 - t0;
    if span <= 0.0 {
        return v1;
    }
    let progress = ((t - t0) / span) as f32;

    match ramp {
        AutomationEvent::LinearRamp { .. } => v0 + (v1 - v0) * progress,
        AutomationEvent::ExponentialRamp { .. } => {
            // Undefined for a zero or sign-changing start; hold the start value.
            if v0 <= 0.0 {
                v0
            } else {
                v0 * powf(v1 / v0, progress)
            }
        }
        AutomationEvent::SetValue { .. } => v0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn intrinsic_value_without_events() {
        let param = AudioParam::new(0.25);
        assert_eq!(param.value_at(0.0), 0.25);
        assert_eq!(param.value_at(100.0), 0.25);
    }

    #[test]
    fn set_value_at_time_steps() {
        let mut param = AudioParam::new(1.0);
        param.set_value_at_time(0.5, 1.0).unwrap();
        assert_eq!(param.value_at(0.5), 1.0);
        assert_eq!(param.value_at(1.0), 0.5);
        assert_eq!(param.value_at(3.0), 0.5);
    }

    #[test]
    fn linear_ramp_interpolates_from_previous_event() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.0, 1.0).unwrap();
        param.linear_ramp_to_value_at_time(0.1, 1.02, 0.0).unwrap();

        assert!(approx(param.value_at(1.0), 0.0));
        assert!(approx(param.value_at(1.01), 0.05));
        assert!(approx(param.value_at(1.02), 0.1));
        assert!(approx(param.value_at(2.0), 0.1));
    }

    #[test]
    fn exponential_ramp_decays_geometrically() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.1, 0.0).unwrap();
        param.exponential_ramp_to_value_at_time(0.01, 1.0, 0.0).unwrap();

        // Halfway through a 10x decay is a factor of sqrt(10).
        let mid = param.value_at(0.5);
        assert!(approx(mid, 0.1 / 10f32.sqrt()), "mid {mid}");
        assert!(approx(param.value_at(1.0), 0.01));
    }

    #[test]
    fn exponential_ramp_rejects_non_positive_target() {
        let mut param = AudioParam::new(1.0);
        assert_eq!(
            param.exponential_ramp_to_value_at_time(0.0, 1.0, 0.0),
            Err(GraphError::NonPositiveRampTarget(0.0))
        );
        assert!(param.events().is_empty());
    }

    #[test]
    fn ramp_without_anchor_starts_from_intrinsic_value_now() {
        let mut param = AudioParam::new(1.0);
        param.linear_ramp_to_value_at_time(0.0, 3.0, 2.0).unwrap();
        assert!(approx(param.value_at(2.0), 1.0));
        assert!(approx(param.value_at(2.5), 0.5));
        assert!(approx(param.value_at(3.0), 0.0));
    }

    #[test]
    fn exponential_from_zero_holds_zero() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.0, 0.0).unwrap();
        param.exponential_ramp_to_value_at_time(1.0, 1.0, 0.0).unwrap();
        assert_eq!(param.value_at(0.5), 0.0);
        assert_eq!(param.value_at(1.0), 1.0);
    }

    #[test]
    fn invalid_time_rejected() {
        let mut param = AudioParam::new(0.0);
        assert!(matches!(
            param.set_value_at_time(1.0, -1.0),
            Err(GraphError::InvalidTime(_))
        ));
        assert!(matches!(
            param.set_value_at_time(1.0, f64::NAN),
            Err(GraphError::InvalidTime(_))
        ));
    }

    #[test]
    fn prune_keeps_anchor_for_pending_ramp() {
        let mut param = AudioParam::new(0.0);
        param.set_value_at_time(0.0, 0.0).unwrap();
        param.set_value_at_time(0.2, 1.0).unwrap();
        param.linear_ramp_to_value_at_time(0.4, 2.0, 0.0).unwrap();

        param.prune(1.5);
        assert_eq!(param.events().len(), 2);
        assert!(approx(param.value_at(1.5), 0.3));

        param.prune(5.0);
        assert_eq!(param.events().len(), 1);
        assert!(approx(param.value_at(5.0), 0.4));
    }
}
