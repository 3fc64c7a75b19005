//! Integration tests for keytone-io WAV writing and context-driven output.

use std::sync::{Arc, Mutex};

use keytone_core::{AudioContext, ContextOptions, ContextState, SharedContext};
use keytone_io::{
    AudioBackend, AudioDevice, BackendStreamConfig, Error, ErrorCallback, OutputCallback,
    StreamHandle, WavSpec, read_wav, start_output, write_wav,
};
use keytone_synth::{SoundEffect, play_keystroke};
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// WAV files
// ---------------------------------------------------------------------------

fn ramp(len: usize) -> Vec<f32> {
    (0..len).map(|i| i as f32 / len as f32 - 0.5).collect()
}

#[test]
fn float_wav_roundtrip_is_exact() {
    let samples = ramp(4800);
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, WavSpec::default()).unwrap();

    let (loaded, spec) = read_wav(file.path()).unwrap();
    assert_eq!(spec, WavSpec::default());
    assert_eq!(loaded, samples);
}

#[test]
fn pcm16_stereo_roundtrip_is_close() {
    let samples = ramp(1000);
    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
    };
    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &samples, spec).unwrap();

    let (loaded, loaded_spec) = read_wav(file.path()).unwrap();
    assert_eq!(loaded_spec, spec);
    assert_eq!(loaded.len(), samples.len());
    for (a, b) in samples.iter().zip(&loaded) {
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }
}

#[test]
fn unsupported_bit_depth_is_rejected() {
    let file = NamedTempFile::new().unwrap();
    let spec = WavSpec {
        bits_per_sample: 12,
        ..WavSpec::default()
    };
    let err = write_wav(file.path(), &[0.0], spec).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat(_)));
}

#[test]
fn rendered_effect_survives_a_file() {
    let mut ctx = AudioContext::new(ContextOptions::default());
    SoundEffect::Complete.play(&mut ctx).unwrap();
    let mut audio = vec![0.0f32; 48000];
    ctx.render(&mut audio);

    let file = NamedTempFile::new().unwrap();
    write_wav(file.path(), &audio, WavSpec::default()).unwrap();
    let (loaded, _) = read_wav(file.path()).unwrap();

    let peak = loaded.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    assert!(peak > 0.01);
}

// ---------------------------------------------------------------------------
// Output streams
// ---------------------------------------------------------------------------

/// Backend that runs the callback once, synchronously, and keeps the result.
struct OneShotBackend {
    captured: Arc<Mutex<Vec<f32>>>,
}

impl AudioBackend for OneShotBackend {
    fn name(&self) -> &str {
        "one-shot"
    }

    fn list_output_devices(&self) -> keytone_io::Result<Vec<AudioDevice>> {
        Ok(Vec::new())
    }

    fn default_output_device(&self) -> keytone_io::Result<Option<AudioDevice>> {
        Ok(None)
    }

    fn build_output_stream(
        &self,
        config: &BackendStreamConfig,
        mut callback: OutputCallback,
        _error_callback: ErrorCallback,
    ) -> keytone_io::Result<StreamHandle> {
        let mut buffer = vec![0.0f32; config.buffer_size as usize * usize::from(config.channels)];
        callback(&mut buffer);
        *self.captured.lock().unwrap() = buffer;
        Ok(StreamHandle::new(()))
    }
}

#[test]
fn start_output_resumes_and_renders_context() {
    let shared = SharedContext::new(AudioContext::new(ContextOptions::default()));
    {
        let mut ctx = shared.lock().unwrap();
        play_keystroke(&mut ctx).unwrap();
        ctx.suspend();
    }

    let captured = Arc::new(Mutex::new(Vec::new()));
    let backend = OneShotBackend {
        captured: Arc::clone(&captured),
    };
    let config = BackendStreamConfig {
        buffer_size: 256,
        channels: 2,
        ..BackendStreamConfig::default()
    };
    let _handle = start_output(&backend, &config, shared.clone()).unwrap();

    assert_eq!(shared.lock().unwrap().state(), ContextState::Running);
    let buffer = captured.lock().unwrap();
    assert_eq!(buffer.len(), 512);
    assert!(buffer.iter().any(|&s| s != 0.0));
}
