use hound::{SampleFormat, WavReader};
use std::{fs, io::BufReader, path::Path, sync::Arc};

mod cache;
mod layout;

pub use cache::{AssetError, BufferCache, PitchSamples, SampleLoader};
pub use layout::AssetLayout;

/// Decoded mono audio. Cheap to clone as the samples are shared.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    pub sample_rate_hz: u32,
    pub samples: Arc<[f32]>,
}

impl SampleBuffer {
    pub fn new(sample_rate_hz: u32, samples: impl Into<Arc<[f32]>>) -> Self {
        Self {
            sample_rate_hz,
            samples: samples.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn mix_down(interleaved: &[f32], channels: u16) -> Vec<f32> {
    interleaved
        .chunks(channels as usize)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

fn parse_wav_mono(buffer: &[u8]) -> anyhow::Result<SampleBuffer> {
    let mut reader = WavReader::new(BufReader::new(buffer))?;
    let spec = reader.spec();
    if spec.channels == 0 {
        anyhow::bail!("wav file has no channels");
    }
    let interleaved = match spec.sample_format {
        SampleFormat::Float => {
            reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?
        }
        SampleFormat::Int => {
            let max_value = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|x| x.map(|x| x as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };
    Ok(SampleBuffer::new(
        spec.sample_rate,
        mix_down(&interleaved, spec.channels),
    ))
}

/// Reads a wav file, averaging all its channels into one
pub fn read_wav_mono(path: impl AsRef<Path>) -> anyhow::Result<SampleBuffer> {
    let raw = fs::read(path)?;
    parse_wav_mono(&raw)
}

#[cfg(test)]
pub(crate) mod test_util {
    use hound::{SampleFormat, WavSpec, WavWriter};
    use std::path::Path;

    pub fn write_wav(path: &Path, channels: u16, frames: &[i16]) {
        let spec = WavSpec {
            channels,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for &frame in frames {
            for _ in 0..channels {
                writer.write_sample(frame).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_stereo_as_mono() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c4.wav");
        test_util::write_wav(&path, 2, &[0, 16384, -16384]);
        let buffer = read_wav_mono(&path).unwrap();
        assert_eq!(buffer.sample_rate_hz, 8000);
        assert_eq!(&*buffer.samples, &[0.0, 0.5, -0.5]);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_wav_mono(b"definitely not a wav file").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_wav_mono(dir.path().join("nope.wav")).is_err());
    }
}
