use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use neurogram_explorer::audio::Waveform;
use neurogram_explorer::audio::codec::{SampleEncoding, decode_wav, encode_wav, read_wav};
use neurogram_explorer::audio::transform::{modulate_am, scramble_with_rng, segment_len};
use neurogram_explorer::state::{AppState, AudioEffect, StatusMessage};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn make_temp_dir(tag: &str) -> PathBuf {
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    let mut dir = std::env::temp_dir();
    dir.push(format!("neurogram_{tag}_{}_{seq}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp test dir");
    dir
}

fn tone(sr: u32, secs: f32, hz: f32, amp: f32) -> Waveform {
    let frames = ((sr as f32) * secs).max(1.0) as usize;
    let samples = (0..frames)
        .map(|i| (i as f32 / sr as f32 * hz * std::f32::consts::TAU).sin() * amp)
        .collect();
    Waveform::new(sr, samples).expect("valid sample rate")
}

fn sorted(samples: &[f32]) -> Vec<f32> {
    let mut v = samples.to_vec();
    v.sort_by(f32::total_cmp);
    v
}

#[test]
fn scramble_survives_a_float_wav_round_trip() {
    let input = tone(8_000, 0.5, 230.0, 0.4);
    let bytes = encode_wav(&input, SampleEncoding::Float32).unwrap();
    let decoded = decode_wav(&bytes).unwrap();
    assert_eq!(decoded, input);

    let mut rng = StdRng::seed_from_u64(11);
    let scrambled = scramble_with_rng(&decoded, 0.05, &mut rng).unwrap();
    assert_eq!(scrambled.len(), input.len());
    assert_eq!(scrambled.sample_rate(), 8_000);
    assert_eq!(scrambled.peak(), 1.0);

    // Same multiset of (normalized) samples, different order.
    let peak = input.peak();
    let normalized: Vec<f32> = input.samples().iter().map(|s| s / peak).collect();
    assert_eq!(sorted(scrambled.samples()), sorted(&normalized));
    assert_ne!(scrambled.samples(), normalized.as_slice());
    assert_eq!(segment_len(0.05, 8_000), 400);
}

#[test]
fn modulation_is_deterministic_and_normalized() {
    let input = tone(44_100, 0.2, 440.0, 0.3);
    let a = modulate_am(&input, 15_000.0).unwrap();
    let b = modulate_am(&input, 15_000.0).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.len(), input.len());
    assert!((a.peak() - 1.0).abs() < 1e-6);
}

#[test]
fn pcm16_output_stays_within_one_step() {
    let input = tone(16_000, 0.1, 300.0, 1.0);
    let bytes = encode_wav(&input, SampleEncoding::Pcm16).unwrap();
    let decoded = decode_wav(&bytes).unwrap();
    assert_eq!(decoded.len(), input.len());
    for (got, want) in decoded.samples().iter().zip(input.samples()) {
        assert!((got - want).abs() <= 1.0 / 16_384.0, "{got} vs {want}");
    }
}

#[test]
fn app_state_uploads_modulates_and_saves() {
    let dir = make_temp_dir("carrier");
    let upload = dir.join("upload.wav");
    let saved = dir.join(AudioEffect::Carrier.output_file_name(15_000.0));
    std::fs::write(
        &upload,
        encode_wav(&tone(22_050, 0.25, 330.0, 0.5), SampleEncoding::Pcm16).unwrap(),
    )
    .unwrap();

    let mut state = AppState::default();
    state.load_audio(AudioEffect::Carrier, &upload);
    assert!(state.audio_job(AudioEffect::Carrier).input.is_some());
    assert!(state.audio_job(AudioEffect::Scramble).input.is_none());

    state.run_effect(AudioEffect::Carrier);
    assert!(matches!(state.status_message, Some(StatusMessage::Info(_))));
    state.save_effect_output(AudioEffect::Carrier, &saved);
    assert!(matches!(state.status_message, Some(StatusMessage::Info(_))));

    let written = read_wav(&saved).unwrap();
    assert_eq!(written.sample_rate(), 22_050);
    assert_eq!(
        written.len(),
        state.audio_job(AudioEffect::Carrier).input.as_ref().unwrap().len()
    );
    assert_eq!(saved.file_name().unwrap(), "modulated_15000Hz.wav");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn out_of_range_parameter_reports_an_error() {
    let dir = make_temp_dir("scramble");
    let upload = dir.join("upload.wav");
    std::fs::write(
        &upload,
        encode_wav(&tone(8_000, 0.1, 200.0, 0.5), SampleEncoding::Float32).unwrap(),
    )
    .unwrap();

    let mut state = AppState::default();
    state.load_audio(AudioEffect::Scramble, &upload);
    state.audio_job_mut(AudioEffect::Scramble).parameter = 2.0;
    state.run_effect(AudioEffect::Scramble);

    assert!(matches!(state.status_message, Some(StatusMessage::Error(_))));
    assert!(state.audio_job(AudioEffect::Scramble).output.is_none());

    let _ = std::fs::remove_dir_all(&dir);
}
