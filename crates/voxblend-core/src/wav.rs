//! WAV reading and deterministic WAV writing.
//!
//! Input files are decoded with `hound` (int or float PCM, stereo
//! downmixed to mono). Output is written as 16-bit PCM with no timestamps
//! or variable metadata, so identical samples always produce byte-identical
//! files; the BLAKE3 hash of the PCM data identifies the audio content.

use std::io::{self, Write};
use std::path::Path;

use crate::error::{ConvertError, ConvertResult};
use crate::waveform::Waveform;

/// WAV format parameters for the mono writer.
#[derive(Debug, Clone, Copy)]
pub struct WavFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bits per sample (always 16 for this implementation).
    pub bits_per_sample: u16,
}

impl WavFormat {
    /// Creates a mono 16-bit format.
    pub fn mono(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 16,
        }
    }

    fn block_align(&self) -> u16 {
        self.bits_per_sample / 8
    }

    fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }
}

/// Writes a complete mono WAV file to a writer.
pub fn write_wav<W: Write>(writer: &mut W, format: &WavFormat, pcm_data: &[u8]) -> io::Result<()> {
    let data_size = pcm_data.len() as u32;
    let file_size = 36 + data_size; // Total file size minus 8 bytes for RIFF header

    // RIFF header
    writer.write_all(b"RIFF")?;
    writer.write_all(&file_size.to_le_bytes())?;
    writer.write_all(b"WAVE")?;

    // fmt chunk
    writer.write_all(b"fmt ")?;
    writer.write_all(&16u32.to_le_bytes())?; // Chunk size (16 for PCM)
    writer.write_all(&1u16.to_le_bytes())?; // Audio format (1 = PCM)
    writer.write_all(&1u16.to_le_bytes())?; // Channels (mono)
    writer.write_all(&format.sample_rate.to_le_bytes())?;
    writer.write_all(&format.byte_rate().to_le_bytes())?;
    writer.write_all(&format.block_align().to_le_bytes())?;
    writer.write_all(&format.bits_per_sample.to_le_bytes())?;

    // data chunk
    writer.write_all(b"data")?;
    writer.write_all(&data_size.to_le_bytes())?;
    writer.write_all(pcm_data)?;

    Ok(())
}

/// Converts f64 samples to 16-bit PCM bytes, clipping to [-1.0, 1.0].
pub fn samples_to_pcm16(samples: &[f64]) -> Vec<u8> {
    let mut pcm = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clipped = sample.clamp(-1.0, 1.0);
        let pcm_value = (clipped * 32767.0).round() as i16;
        pcm.extend_from_slice(&pcm_value.to_le_bytes());
    }
    pcm
}

/// A rendered WAV file plus its content hash.
#[derive(Debug)]
pub struct WavResult {
    /// Complete WAV file bytes.
    pub wav_data: Vec<u8>,
    /// BLAKE3 hash of the PCM data only.
    pub pcm_hash: String,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of samples.
    pub num_samples: usize,
}

impl WavResult {
    /// Renders mono samples into a WAV file.
    pub fn from_mono(samples: &[f64], sample_rate: u32) -> Self {
        let pcm = samples_to_pcm16(samples);
        let pcm_hash = blake3::hash(&pcm).to_hex().to_string();
        let format = WavFormat::mono(sample_rate);

        let mut wav_data = Vec::with_capacity(44 + pcm.len());
        write_wav(&mut wav_data, &format, &pcm).expect("writing to Vec should not fail");

        Self {
            wav_data,
            pcm_hash,
            sample_rate,
            num_samples: samples.len(),
        }
    }

    /// Renders a waveform into a WAV file.
    pub fn from_waveform(wave: &Waveform) -> Self {
        Self::from_mono(&wave.samples, wave.sample_rate)
    }

    /// Duration in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.num_samples as f64 / self.sample_rate as f64
    }

    /// Writes the WAV bytes to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        std::fs::write(path, &self.wav_data)
    }
}

/// Reads a WAV file into a mono waveform.
///
/// Integer formats are normalized to [-1.0, 1.0]; stereo files are
/// downmixed by averaging channels. Multichannel files beyond stereo are
/// rejected.
pub fn read_wav_file(path: impl AsRef<Path>) -> ConvertResult<Waveform> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path).map_err(|e| ConvertError::MalformedWav {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let spec = reader.spec();
    let channels = spec.channels;
    let sample_rate = spec.sample_rate;

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .filter_map(|s| s.ok())
                .map(|s| s as f64 / max_val)
                .collect()
        }
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .filter_map(|s| s.ok())
            .map(f64::from)
            .collect(),
    };

    match channels {
        1 => Ok(Waveform::new(samples, sample_rate)),
        2 => {
            let left: Vec<f64> = samples.iter().step_by(2).copied().collect();
            let right: Vec<f64> = samples.iter().skip(1).step_by(2).copied().collect();
            Ok(Waveform::from_stereo(&left, &right, sample_rate))
        }
        n => Err(ConvertError::MalformedWav {
            path: path.display().to_string(),
            message: format!("unsupported channel count: {n}"),
        }),
    }
}
