use std::f64::consts::TAU;

use rand::Rng;
use rand::seq::SliceRandom;

use super::waveform::{Waveform, peak};
use crate::error::TransformError;

// ---------------------------------------------------------------------------
// Parameter bounds
// ---------------------------------------------------------------------------

pub const MAX_SEGMENT_SECONDS: f64 = 1.0;
pub const MIN_CARRIER_HZ: f64 = 100.0;
pub const MAX_CARRIER_HZ: f64 = 50_000.0;

fn check_segment_seconds(seconds: f64) -> Result<(), TransformError> {
    if seconds > 0.0 && seconds <= MAX_SEGMENT_SECONDS {
        Ok(())
    } else {
        Err(TransformError::OutOfRange {
            parameter: "segment duration (s)",
            value: seconds,
            bounds: "(0, 1]",
        })
    }
}

fn check_carrier_hz(hz: f64) -> Result<(), TransformError> {
    if (MIN_CARRIER_HZ..=MAX_CARRIER_HZ).contains(&hz) {
        Ok(())
    } else {
        Err(TransformError::OutOfRange {
            parameter: "carrier frequency (Hz)",
            value: hz,
            bounds: "[100, 50000]",
        })
    }
}

/// Scale to a peak of exactly 1.0. `None` for silence, which callers pass through untouched.
fn normalize(samples: &[f32]) -> Option<Vec<f32>> {
    let peak = peak(samples);
    if peak == 0.0 || !peak.is_finite() {
        return None;
    }
    Some(samples.iter().map(|s| s / peak).collect())
}

/// Samples per scramble segment: `round(seconds * rate)`, never less than one.
pub fn segment_len(seconds: f64, sample_rate: u32) -> usize {
    ((seconds * f64::from(sample_rate)).round() as usize).max(1)
}

// ---------------------------------------------------------------------------
// Segment scramble
// ---------------------------------------------------------------------------

/// Normalize, cut into consecutive segments of `segment_seconds`, and
/// concatenate the segments in a uniformly random order.
///
/// The last segment keeps whatever samples remain, so the output always has
/// exactly as many samples as the input. Silent input is returned unchanged.
pub fn scramble(waveform: &Waveform, segment_seconds: f64) -> Result<Waveform, TransformError> {
    scramble_with_rng(waveform, segment_seconds, &mut rand::thread_rng())
}

pub fn scramble_with_rng<R: Rng + ?Sized>(
    waveform: &Waveform,
    segment_seconds: f64,
    rng: &mut R,
) -> Result<Waveform, TransformError> {
    check_segment_seconds(segment_seconds)?;
    let Some(normalized) = normalize(waveform.samples()) else {
        return Ok(waveform.clone());
    };

    let len = segment_len(segment_seconds, waveform.sample_rate());
    let mut segments: Vec<&[f32]> = normalized.chunks(len).collect();
    segments.shuffle(rng);
    Ok(waveform.with_samples(segments.concat()))
}

// ---------------------------------------------------------------------------
// AM carrier
// ---------------------------------------------------------------------------

/// Multiply the normalized signal by `cos(2π·f·t)` and renormalize to a peak of 1.0.
///
/// Deterministic. Silent input is returned unchanged; if the product cancels
/// out entirely the result is silence rather than a division by zero.
pub fn modulate_am(waveform: &Waveform, carrier_hz: f64) -> Result<Waveform, TransformError> {
    check_carrier_hz(carrier_hz)?;
    let Some(normalized) = normalize(waveform.samples()) else {
        return Ok(waveform.clone());
    };

    let rate = f64::from(waveform.sample_rate());
    let modulated: Vec<f32> = normalized
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let t = i as f64 / rate;
            (f64::from(s) * (TAU * carrier_hz * t).cos()) as f32
        })
        .collect();

    let out = normalize(&modulated).unwrap_or(modulated);
    Ok(waveform.with_samples(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// 1/n, 2/n, …, 1.0: distinct values already at peak 1.0.
    fn ramp(n: usize, sample_rate: u32) -> Waveform {
        let samples = (1..=n).map(|i| i as f32 / n as f32).collect();
        Waveform::new(sample_rate, samples).unwrap()
    }

    fn sorted(samples: &[f32]) -> Vec<f32> {
        let mut v = samples.to_vec();
        v.sort_by(f32::total_cmp);
        v
    }

    #[test]
    fn scramble_rejects_out_of_range_durations() {
        let w = ramp(10, 100);
        for bad in [0.0, -0.1, 1.0001, f64::NAN] {
            assert!(matches!(
                scramble(&w, bad),
                Err(TransformError::OutOfRange { .. })
            ));
        }
        assert!(scramble(&w, 1.0).is_ok());
    }

    #[test]
    fn scramble_keeps_length_and_multiset() {
        let w = ramp(1_000, 100);
        let mut rng = StdRng::seed_from_u64(7);
        let out = scramble_with_rng(&w, 0.1, &mut rng).unwrap();
        assert_eq!(out.len(), 1_000);
        assert_eq!(out.sample_rate(), 100);
        assert_eq!(sorted(out.samples()), sorted(w.samples()));
    }

    #[test]
    fn scramble_moves_whole_segments() {
        let w = ramp(1_000, 100);
        let mut rng = StdRng::seed_from_u64(11);
        let out = scramble_with_rng(&w, 0.1, &mut rng).unwrap();

        let input_segments: Vec<&[f32]> = w.samples().chunks(10).collect();
        let mut seen = Vec::new();
        for segment in out.samples().chunks(10) {
            let pos = input_segments
                .iter()
                .position(|s| *s == segment)
                .expect("output segment is an input segment");
            seen.push(pos);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn scramble_short_final_segment_is_kept() {
        let w = ramp(1_005, 100);
        let mut rng = StdRng::seed_from_u64(3);
        let out = scramble_with_rng(&w, 0.1, &mut rng).unwrap();
        assert_eq!(out.len(), 1_005);
        assert_eq!(sorted(out.samples()), sorted(w.samples()));
    }

    #[test]
    fn scramble_actually_reorders() {
        let w = ramp(4_000, 1_000);
        let mut rng = StdRng::seed_from_u64(42);
        let out = scramble_with_rng(&w, 0.01, &mut rng).unwrap();
        assert_ne!(out.samples(), w.samples());
    }

    #[test]
    fn single_segment_is_identity_after_normalization() {
        let w = Waveform::new(100, vec![0.25, -0.5, 0.125, 0.375]).unwrap();
        let out = scramble(&w, 1.0).unwrap();
        assert_eq!(out.samples(), &[0.5, -1.0, 0.25, 0.75]);
    }

    #[test]
    fn scramble_passes_silence_through() {
        let w = Waveform::new(100, vec![0.0; 50]).unwrap();
        assert_eq!(scramble(&w, 0.1).unwrap(), w);
        let empty = Waveform::new(100, Vec::new()).unwrap();
        assert_eq!(scramble(&empty, 0.1).unwrap(), empty);
    }

    #[test]
    fn segment_len_rounds_and_never_hits_zero() {
        assert_eq!(segment_len(0.1, 100), 10);
        assert_eq!(segment_len(0.024, 100), 2);
        assert_eq!(segment_len(0.05, 44_100), 2_205);
        assert_eq!(segment_len(0.001, 100), 1);
    }

    #[test]
    fn modulate_rejects_out_of_range_carrier() {
        let w = ramp(10, 1_000);
        for bad in [99.9, 50_000.5, f64::NAN] {
            let err = modulate_am(&w, bad).unwrap_err();
            assert!(matches!(err, TransformError::OutOfRange { .. }), "{err}");
        }
        assert!(modulate_am(&w, 100.0).is_ok());
        assert!(modulate_am(&w, 50_000.0).is_ok());
    }

    #[test]
    fn modulate_output_peaks_at_one() {
        let samples: Vec<f32> = (0..4_410)
            .map(|i| 0.3 * (TAU * 440.0 * i as f64 / 44_100.0).sin() as f32)
            .collect();
        let w = Waveform::new(44_100, samples).unwrap();
        let out = modulate_am(&w, 15_000.0).unwrap();
        assert_eq!(out.len(), w.len());
        assert_eq!(out.sample_rate(), 44_100);
        assert!((out.peak() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn modulate_follows_the_carrier() {
        let w = Waveform::new(1_000, vec![0.5; 8]).unwrap();
        let out = modulate_am(&w, 250.0).unwrap();
        // cos(2π·250·i/1000) cycles 1, 0, -1, 0.
        let expected: [f32; 8] = [1.0, 0.0, -1.0, 0.0, 1.0, 0.0, -1.0, 0.0];
        for (got, want) in out.samples().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
    }

    #[test]
    fn modulate_is_deterministic() {
        let w = ramp(500, 8_000);
        assert_eq!(modulate_am(&w, 1_000.0).unwrap(), modulate_am(&w, 1_000.0).unwrap());
    }

    #[test]
    fn modulate_passes_silence_through() {
        let w = Waveform::new(8_000, vec![0.0; 64]).unwrap();
        assert_eq!(modulate_am(&w, 15_000.0).unwrap(), w);
    }

    #[test]
    fn input_is_not_mutated() {
        let w = Waveform::new(100, vec![0.2, -0.4, 0.1]).unwrap();
        let before = w.clone();
        let _ = scramble(&w, 0.01).unwrap();
        let _ = modulate_am(&w, 100.0).unwrap();
        assert_eq!(w, before);
    }
}
