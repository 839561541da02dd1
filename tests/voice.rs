//! Voice pipeline integration tests
//!
//! Exercises endpointing and audio encoding without audio hardware or
//! network access.

use std::io::Cursor;

use triaid::voice::{
    EndpointState, PAUSE_THRESHOLD, SAMPLE_RATE, UtteranceDetector, encode_wav, samples_to_pcm,
};

/// Generate sine wave audio samples
fn sine(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// Generate silence
fn silence(duration_secs: f32) -> Vec<f32> {
    vec![0.0; (SAMPLE_RATE as f32 * duration_secs) as usize]
}

/// Run a detector through calibration on a quiet room
fn calibrated_detector() -> UtteranceDetector {
    let mut detector = UtteranceDetector::new(SAMPLE_RATE);
    detector.process(&silence(1.1));
    assert_eq!(detector.state(), EndpointState::Waiting);
    detector
}

#[test]
fn detector_starts_in_calibration() {
    let detector = UtteranceDetector::new(SAMPLE_RATE);
    assert_eq!(detector.state(), EndpointState::Calibrating);
}

#[test]
fn pause_threshold_matches_interactive_speech() {
    assert_eq!(PAUSE_THRESHOLD.as_millis(), 1800);
}

#[test]
fn full_utterance_cycle() {
    let mut detector = calibrated_detector();

    // Speak for a second
    let speech = sine(440.0, 1.0, 0.3);
    assert!(!detector.process(&speech));
    assert_eq!(detector.state(), EndpointState::Speaking);

    // Pause long enough to end the utterance
    assert!(detector.process(&silence(2.0)));
    assert_eq!(detector.state(), EndpointState::Complete);

    let utterance = detector.take_utterance();
    assert!(utterance.len() >= speech.len());

    // Detector is ready for the next utterance without recalibrating
    assert_eq!(detector.state(), EndpointState::Waiting);
}

#[test]
fn short_pauses_do_not_end_utterance() {
    let mut detector = calibrated_detector();

    detector.process(&sine(440.0, 0.5, 0.3));
    assert!(!detector.process(&silence(1.5)));
    assert_eq!(detector.state(), EndpointState::Speaking);

    // Resumed speech resets the pause counter
    detector.process(&sine(330.0, 0.5, 0.3));
    assert!(!detector.process(&silence(1.5)));
    assert_eq!(detector.state(), EndpointState::Speaking);
}

#[test]
fn ambient_noise_raises_threshold() {
    let mut noisy = UtteranceDetector::new(SAMPLE_RATE);
    noisy.process(&sine(120.0, 1.1, 0.05));

    let quiet = calibrated_detector();
    assert!(noisy.energy_threshold() > quiet.energy_threshold());

    // Noise at the calibration level does not arm the noisy detector
    assert!(!noisy.process(&sine(120.0, 0.5, 0.05)));
    assert_eq!(noisy.state(), EndpointState::Waiting);
}

#[test]
fn wav_encoding_produces_riff_container() {
    let samples = sine(440.0, 0.1, 0.5);
    let wav = encode_wav(&samples, SAMPLE_RATE).unwrap();

    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert!(wav.len() > 44);
}

#[test]
fn wav_roundtrip_preserves_sample_count() {
    let original: Vec<f32> = vec![0.0, 0.5, -0.5, 1.0, -1.0, 0.25];
    let wav = encode_wav(&original, SAMPLE_RATE).unwrap();

    let mut reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.channels, 1);

    let read: Vec<i16> = reader.samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(read.len(), original.len());
}

#[test]
fn pcm_matches_wav_data_section() {
    let samples = vec![0.25f32, -0.25, 0.0];
    let pcm = samples_to_pcm(&samples);
    let wav = encode_wav(&samples, SAMPLE_RATE).unwrap();

    // WAV data chunk carries the identical LINEAR16 bytes
    assert_eq!(&wav[wav.len() - pcm.len()..], pcm.as_slice());
}
