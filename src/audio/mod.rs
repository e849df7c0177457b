//! Audio layer: WAV codec adapter and the two waveform effects.
//!
//! ```text
//!   uploaded .wav bytes
//!        │  codec::decode_wav   (channels averaged to mono)
//!        ▼
//!   Waveform { sample_rate, samples }
//!        │  transform::scramble / transform::modulate_am
//!        ▼
//!   Waveform
//!        │  codec::encode_wav
//!        ▼
//!   processed .wav bytes
//! ```

pub mod codec;
pub mod transform;
pub mod waveform;

pub use waveform::Waveform;
