//! WAV encoding and atomic file output

use std::io::{Cursor, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::NamedTempFile;
use tracing::info;

use crate::render::RenderError;
use crate::synth::SampleBuffer;

/// Mono integer PCM header for a buffer
pub fn wav_spec(buffer: &SampleBuffer) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: buffer.bit_depth,
        sample_format: SampleFormat::Int,
    }
}

fn write_samples<W: Write + Seek>(writer: &mut WavWriter<W>, buffer: &SampleBuffer) -> Result<(), RenderError> {
    match buffer.bit_depth {
        8 => {
            for &s in &buffer.samples {
                writer.write_sample(s as i8)?;
            }
        }
        16 => {
            for &s in &buffer.samples {
                writer.write_sample(s as i16)?;
            }
        }
        24 | 32 => {
            for &s in &buffer.samples {
                writer.write_sample(s)?;
            }
        }
        other => return Err(RenderError::UnsupportedBitDepth(other)),
    }
    Ok(())
}

/// Encode a buffer as an in-memory RIFF/WAV file
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, wav_spec(buffer))?;
    write_samples(&mut writer, buffer)?;
    writer.finalize()?;
    Ok(cursor.into_inner())
}

/// Write the encoded buffer to a temporary file beside `path`, then rename it into place
pub fn write_wav_atomic(buffer: &SampleBuffer, path: &Path) -> Result<(), RenderError> {
    let bytes = encode_wav(buffer)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| RenderError::Io(e.error))?;

    info!(path = %path.display(), bytes = bytes.len(), samples = buffer.len(), "wrote WAV file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;

    fn buffer(bit_depth: u16, samples: Vec<i32>) -> SampleBuffer {
        SampleBuffer {
            sample_rate: 22050,
            bit_depth,
            samples,
            clipped_samples: 0,
        }
    }

    #[test]
    fn test_header_fields() {
        let bytes = encode_wav(&buffer(16, vec![0, 1000, -1000])).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");

        let reader = WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn test_samples_survive_encoding() {
        for (bits, samples) in [
            (8u16, vec![0, 127, -128, 5]),
            (16, vec![0, 32767, -32768, -7]),
            (24, vec![0, 8_388_607, -8_388_608, 42]),
            (32, vec![0, i32::MAX, i32::MIN, -1]),
        ] {
            let bytes = encode_wav(&buffer(bits, samples.clone())).unwrap();
            let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
            let decoded: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
            assert_eq!(decoded, samples, "{bits}-bit");
        }
    }

    #[test]
    fn test_empty_buffer_encodes() {
        let bytes = encode_wav(&buffer(16, Vec::new())).unwrap();
        let reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.len(), 0);
    }

    #[test]
    fn test_atomic_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        std::fs::write(&path, b"stale").unwrap();

        write_wav_atomic(&buffer(16, vec![1, 2, 3]), &path).unwrap();

        let reader = WavReader::open(&path).unwrap();
        assert_eq!(reader.len(), 3);
        // Only the target remains; the temporary file was renamed away
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.wav");
        assert!(matches!(
            write_wav_atomic(&buffer(16, vec![0]), &path),
            Err(RenderError::Io(_))
        ));
    }
}
