use crate::error::TransformError;

/// Single-channel audio: a sample rate and the samples at that rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    sample_rate: u32,
    samples: Vec<f32>,
}

impl Waveform {
    pub fn new(sample_rate: u32, samples: Vec<f32>) -> Result<Self, TransformError> {
        if sample_rate == 0 {
            return Err(TransformError::InvalidSampleRate(sample_rate));
        }
        Ok(Self {
            sample_rate,
            samples,
        })
    }

    /// Collapse interleaved multi-channel frames to mono by averaging each frame.
    /// A trailing partial frame is averaged over the channels it has.
    pub fn from_interleaved(
        sample_rate: u32,
        channels: u16,
        interleaved: &[f32],
    ) -> Result<Self, TransformError> {
        let channels = usize::from(channels.max(1));
        let samples = if channels == 1 {
            interleaved.to_vec()
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };
        Self::new(sample_rate, samples)
    }

    /// Same rate, new samples. The rate was validated when `self` was built.
    pub(crate) fn with_samples(&self, samples: Vec<f32>) -> Self {
        Self {
            sample_rate: self.sample_rate,
            samples,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value; 0.0 for silence or an empty waveform.
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }
}

pub(crate) fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        assert_eq!(
            Waveform::new(0, vec![0.5]),
            Err(TransformError::InvalidSampleRate(0))
        );
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let w = Waveform::from_interleaved(8_000, 2, &[1.0, 0.0, -0.5, -0.5, 0.25, 0.75]).unwrap();
        assert_eq!(w.samples(), &[0.5, -0.5, 0.5]);
        assert_eq!(w.sample_rate(), 8_000);
    }

    #[test]
    fn peak_and_duration() {
        let w = Waveform::new(100, vec![0.1, -0.8, 0.3, 0.0]).unwrap();
        assert_eq!(w.peak(), 0.8);
        assert!((w.duration_secs() - 0.04).abs() < 1e-12);
        assert_eq!(Waveform::new(100, Vec::new()).unwrap().peak(), 0.0);
    }
}
