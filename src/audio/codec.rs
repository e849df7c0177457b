use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use super::waveform::Waveform;

/// Sample format written to output WAV files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 16-bit signed PCM.
    #[default]
    Pcm16,
    /// 32-bit IEEE float.
    Float32,
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// Decode WAV bytes into a mono waveform.
///
/// Integer PCM is scaled into [-1, 1); float data is taken as-is. Multi-channel
/// audio is averaged down to one channel.
pub fn decode_wav(bytes: &[u8]) -> Result<Waveform> {
    let mut reader = hound::WavReader::new(bytes).context("reading WAV header")?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .context("reading float samples")?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                bail!("unsupported bit depth: {}", spec.bits_per_sample);
            }
            let scale = 1.0 / (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()
                .context("reading integer samples")?
        }
    };

    Ok(Waveform::from_interleaved(
        spec.sample_rate,
        spec.channels,
        &interleaved,
    )?)
}

pub fn read_wav(path: &Path) -> Result<Waveform> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let waveform =
        decode_wav(&bytes).with_context(|| format!("decoding {}", path.display()))?;
    log::info!(
        "Decoded {} ({} samples @ {} Hz)",
        path.display(),
        waveform.len(),
        waveform.sample_rate()
    );
    Ok(waveform)
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encode a waveform as a mono WAV file at its own sample rate.
pub fn encode_wav(waveform: &Waveform, encoding: SampleEncoding) -> Result<Vec<u8>> {
    let (bits_per_sample, sample_format) = match encoding {
        SampleEncoding::Pcm16 => (16, hound::SampleFormat::Int),
        SampleEncoding::Float32 => (32, hound::SampleFormat::Float),
    };
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample,
        sample_format,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).context("writing WAV header")?;
        for &s in waveform.samples() {
            let s = s.clamp(-1.0, 1.0);
            match encoding {
                SampleEncoding::Pcm16 => {
                    writer.write_sample((s * i16::MAX as f32).round() as i16)?
                }
                SampleEncoding::Float32 => writer.write_sample(s)?,
            }
        }
        writer.finalize().context("finalizing WAV")?;
    }
    Ok(cursor.into_inner())
}

pub fn write_wav(path: &Path, waveform: &Waveform, encoding: SampleEncoding) -> Result<()> {
    let bytes = encode_wav(waveform, encoding)?;
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
    log::info!("Wrote {} ({} samples)", path.display(), waveform.len());
    Ok(())
}
