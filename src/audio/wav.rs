//! WAV decode/encode for audio tracks.
//!
//! Tracks keep their native sample rate and channel count; the analysis
//! stages are rate-agnostic.

use crate::audio::track::AudioTrack;
use crate::error::{ClipcueError, Result};
use std::io::{Read, Seek, Write};
use std::path::Path;

/// Decodes a WAV stream into an [`AudioTrack`].
///
/// Accepts 16-bit integer PCM, the format every collaborator in the chain
/// produces. Other encodings are rejected rather than silently converted.
pub fn read_track(reader: impl Read) -> Result<AudioTrack> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| ClipcueError::Audio {
        message: format!("failed to parse WAV stream: {e}"),
    })?;

    let spec = wav_reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(ClipcueError::Audio {
            message: format!(
                "unsupported WAV encoding: {:?} {} bit (expected 16-bit PCM)",
                spec.sample_format, spec.bits_per_sample
            ),
        });
    }

    let samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ClipcueError::Audio {
            message: format!("failed to read WAV samples: {e}"),
        })?;

    AudioTrack::new(samples, spec.sample_rate, spec.channels)
}

/// Decodes a WAV byte buffer into an [`AudioTrack`].
pub fn read_track_bytes(bytes: &[u8]) -> Result<AudioTrack> {
    read_track(std::io::Cursor::new(bytes))
}

/// Decodes a WAV file into an [`AudioTrack`].
pub fn read_track_file(path: &Path) -> Result<AudioTrack> {
    let file = std::fs::File::open(path)?;
    read_track(std::io::BufReader::new(file))
}

/// Encodes a track as 16-bit PCM WAV into the given writer.
pub fn write_track(track: &AudioTrack, writer: impl Write + Seek) -> Result<()> {
    let spec = hound::WavSpec {
        channels: track.channels(),
        sample_rate: track.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut wav_writer = hound::WavWriter::new(writer, spec).map_err(|e| ClipcueError::Audio {
        message: format!("failed to create WAV writer: {e}"),
    })?;
    for &sample in track.samples() {
        wav_writer
            .write_sample(sample)
            .map_err(|e| ClipcueError::Audio {
                message: format!("failed to write WAV sample: {e}"),
            })?;
    }
    wav_writer.finalize().map_err(|e| ClipcueError::Audio {
        message: format!("failed to finalize WAV stream: {e}"),
    })?;
    Ok(())
}

/// Encodes a track as a WAV file at `path`.
pub fn write_track_file(track: &AudioTrack, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_track(track, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(track: &AudioTrack) -> AudioTrack {
        let mut buffer = Cursor::new(Vec::new());
        write_track(track, &mut buffer).unwrap();
        read_track_bytes(buffer.get_ref()).unwrap()
    }

    #[test]
    fn test_roundtrip_mono() {
        let track = AudioTrack::new(vec![0, 1000, -1000, 32_000], 24_000, 1).unwrap();
        assert_eq!(roundtrip(&track), track);
    }

    #[test]
    fn test_roundtrip_stereo() {
        let track = AudioTrack::new(vec![10, -10, 20, -20], 44_100, 2).unwrap();
        let decoded = roundtrip(&track);
        assert_eq!(decoded.channels(), 2);
        assert_eq!(decoded.sample_rate(), 44_100);
        assert_eq!(decoded.samples(), track.samples());
    }

    #[test]
    fn test_rejects_garbage_bytes() {
        assert!(read_track_bytes(b"not a wav file").is_err());
    }

    #[test]
    fn test_rejects_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut buffer, spec).unwrap();
        writer.write_sample(0.5f32).unwrap();
        writer.finalize().unwrap();

        let err = read_track_bytes(buffer.get_ref()).unwrap_err();
        assert!(err.to_string().contains("unsupported WAV encoding"));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let track = AudioTrack::new(vec![500i16; 2400], 24_000, 1).unwrap();

        write_track_file(&track, &path).unwrap();
        let decoded = read_track_file(&path).unwrap();
        assert_eq!(decoded, track);
    }
}
