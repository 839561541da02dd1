//! Utterance endpointing
//!
//! Decides when the speaker has finished talking. The detector calibrates
//! its energy threshold against a fixed ambient-noise window, then
//! accumulates audio until speech has been followed by a long enough
//! pause. There is no hard limit on utterance length.

use std::time::Duration;

/// Ambient calibration window
pub const CALIBRATION_WINDOW: Duration = Duration::from_secs(1);

/// Pause length that ends an utterance
pub const PAUSE_THRESHOLD: Duration = Duration::from_millis(1800);

/// Floor for the calibrated energy threshold
const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Headroom factor applied over measured ambient energy
const CALIBRATION_HEADROOM: f32 = 2.5;

/// Endpointer phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// Measuring ambient noise
    Calibrating,
    /// Waiting for speech to start
    Waiting,
    /// Speech in progress, accumulating samples
    Speaking,
    /// Pause threshold reached, utterance ready
    Complete,
}

/// Energy-based utterance detector over a 16kHz mono sample stream
pub struct UtteranceDetector {
    sample_rate: u32,
    state: EndpointState,
    energy_threshold: f32,
    calibration_samples: usize,
    calibration_energy: f32,
    calibration_chunks: usize,
    utterance: Vec<f32>,
    silence_samples: usize,
    waiting_samples: usize,
}

impl UtteranceDetector {
    #[must_use]
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            state: EndpointState::Calibrating,
            energy_threshold: MIN_ENERGY_THRESHOLD,
            calibration_samples: 0,
            calibration_energy: 0.0,
            calibration_chunks: 0,
            utterance: Vec::new(),
            silence_samples: 0,
            waiting_samples: 0,
        }
    }

    /// Feed captured samples; returns true once the utterance is complete
    pub fn process(&mut self, samples: &[f32]) -> bool {
        if samples.is_empty() {
            return self.state == EndpointState::Complete;
        }

        let energy = rms_energy(samples);

        match self.state {
            EndpointState::Calibrating => {
                self.calibration_samples += samples.len();
                self.calibration_energy += energy;
                self.calibration_chunks += 1;

                if self.calibration_samples >= self.duration_samples(CALIBRATION_WINDOW) {
                    #[allow(clippy::cast_precision_loss)]
                    let ambient = self.calibration_energy / self.calibration_chunks as f32;
                    self.energy_threshold =
                        (ambient * CALIBRATION_HEADROOM).max(MIN_ENERGY_THRESHOLD);
                    self.state = EndpointState::Waiting;
                    tracing::debug!(
                        ambient,
                        threshold = self.energy_threshold,
                        "ambient calibration complete"
                    );
                }
            }
            EndpointState::Waiting => {
                self.waiting_samples += samples.len();
                if energy > self.energy_threshold {
                    self.state = EndpointState::Speaking;
                    self.utterance.extend_from_slice(samples);
                    self.silence_samples = 0;
                    tracing::trace!(energy, "speech started");
                }
            }
            EndpointState::Speaking => {
                self.utterance.extend_from_slice(samples);

                if energy > self.energy_threshold {
                    self.silence_samples = 0;
                } else {
                    self.silence_samples += samples.len();
                }

                if self.silence_samples >= self.duration_samples(PAUSE_THRESHOLD) {
                    self.state = EndpointState::Complete;
                    tracing::debug!(samples = self.utterance.len(), "utterance complete");
                }
            }
            EndpointState::Complete => {}
        }

        self.state == EndpointState::Complete
    }

    /// How long the detector has waited for speech to begin
    #[must_use]
    pub fn waited(&self) -> Duration {
        Duration::from_secs_f64(f64::from(self.waiting_samples_u32()) / f64::from(self.sample_rate))
    }

    /// Take the completed utterance, resetting for the next one
    ///
    /// Calibration is kept; only the buffers and phase reset.
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.utterance);
        self.silence_samples = 0;
        self.waiting_samples = 0;
        if self.state != EndpointState::Calibrating {
            self.state = EndpointState::Waiting;
        }
        utterance
    }

    #[must_use]
    pub const fn state(&self) -> EndpointState {
        self.state
    }

    #[must_use]
    pub const fn energy_threshold(&self) -> f32 {
        self.energy_threshold
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn duration_samples(&self, duration: Duration) -> usize {
        (duration.as_secs_f64() * f64::from(self.sample_rate)) as usize
    }

    #[allow(clippy::cast_possible_truncation)]
    fn waiting_samples_u32(&self) -> u32 {
        u32::try_from(self.waiting_samples).unwrap_or(u32::MAX)
    }
}

/// RMS energy of a sample block
#[allow(clippy::cast_precision_loss)]
fn rms_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 16_000;

    fn silence(secs: f32) -> Vec<f32> {
        vec![0.0; (RATE as f32 * secs) as usize]
    }

    fn tone(secs: f32, amplitude: f32) -> Vec<f32> {
        let n = (RATE as f32 * secs) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / RATE as f32;
                amplitude * (2.0 * std::f32::consts::PI * 440.0 * t).sin()
            })
            .collect()
    }

    fn calibrated() -> UtteranceDetector {
        let mut detector = UtteranceDetector::new(RATE);
        detector.process(&silence(1.1));
        assert_eq!(detector.state(), EndpointState::Waiting);
        detector
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert!(rms_energy(&silence(0.1)) < 0.001);
        assert!(rms_energy(&tone(0.1, 0.5)) > 0.3);
    }

    #[test]
    fn calibration_raises_threshold_above_ambient() {
        let mut detector = UtteranceDetector::new(RATE);
        // Noisy room: constant low-level hum
        let hum = tone(1.1, 0.05);
        detector.process(&hum);

        assert_eq!(detector.state(), EndpointState::Waiting);
        assert!(detector.energy_threshold() > rms_energy(&hum));
    }

    #[test]
    fn silence_never_arms_detector() {
        let mut detector = calibrated();
        assert!(!detector.process(&silence(3.0)));
        assert_eq!(detector.state(), EndpointState::Waiting);
    }

    #[test]
    fn speech_then_pause_completes_utterance() {
        let mut detector = calibrated();

        detector.process(&tone(0.5, 0.3));
        assert_eq!(detector.state(), EndpointState::Speaking);

        // Pause shorter than the threshold does not end the utterance
        assert!(!detector.process(&silence(1.0)));
        assert_eq!(detector.state(), EndpointState::Speaking);

        // Crossing 1.8s of accumulated silence does
        assert!(detector.process(&silence(1.0)));
        assert_eq!(detector.state(), EndpointState::Complete);
    }

    #[test]
    fn brief_pause_mid_sentence_keeps_accumulating() {
        let mut detector = calibrated();

        detector.process(&tone(0.5, 0.3));
        detector.process(&silence(0.5));
        detector.process(&tone(0.5, 0.3));
        assert_eq!(detector.state(), EndpointState::Speaking);

        // Silence counter resets on renewed speech
        assert!(!detector.process(&silence(1.0)));
    }

    #[test]
    fn take_utterance_resets_for_next_turn() {
        let mut detector = calibrated();
        let speech = tone(0.5, 0.3);
        detector.process(&speech);
        detector.process(&silence(2.0));

        let utterance = detector.take_utterance();
        assert!(utterance.len() >= speech.len());
        assert_eq!(detector.state(), EndpointState::Waiting);

        // Calibration survives the reset
        assert!(detector.energy_threshold() >= 0.01);
    }

    #[test]
    fn tracks_time_waited_for_speech() {
        let mut detector = calibrated();
        detector.process(&silence(2.0));
        assert!(detector.waited() >= Duration::from_secs(2));
    }
}
