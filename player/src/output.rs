use crate::mixer::{Mixer, MixerConfig};
use cpal::{
    BufferSize, Device, OutputCallbackInfo, StreamConfig, SupportedBufferSize,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// default: 0.01
    pub target_latency_s: f32,
    pub mixer: MixerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_latency_s: 0.01,
            mixer: MixerConfig::default(),
        }
    }
}

/// Plays the output of a `Mixer` on the default audio device for as long as it's alive
pub struct Output {
    #[allow(unused)]
    stream: cpal::Stream,
    mixer: Arc<Mixer>,
}

fn default_device() -> anyhow::Result<Device> {
    let host = cpal::default_host();
    log::info!("cpal host: {}", host.id().name());
    let device = host
        .default_output_device()
        .ok_or(anyhow::anyhow!("no output device"))?;
    if let Ok(name) = device.name() {
        log::info!("cpal device: {}", name);
    } else {
        log::info!("cpal device: (no name)");
    }
    Ok(device)
}

fn choose_config(
    device: &Device,
    config: Config,
) -> anyhow::Result<StreamConfig> {
    let default_config = device.default_output_config()?;
    let sample_rate = default_config.sample_rate();
    let channels = 2;
    let ideal_buffer_size =
        (sample_rate.0 as f32 * config.target_latency_s) as u32 * channels;
    // Round down to a multiple of 4. It's not clear why this is necessary but alsa complains
    // if the buffer size is not evenly divisible by 4.
    let ideal_buffer_size = ideal_buffer_size & (!3);
    let buffer_size = match default_config.buffer_size() {
        SupportedBufferSize::Range { min, max } => {
            BufferSize::Fixed(ideal_buffer_size.clamp(*min, *max))
        }
        SupportedBufferSize::Unknown => BufferSize::Default,
    };
    Ok(StreamConfig {
        channels: channels as u16,
        sample_rate,
        buffer_size,
    })
}

impl Output {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let device = default_device()?;
        let stream_config = choose_config(&device, config)?;
        log::info!("sample rate: {}", stream_config.sample_rate.0);
        log::info!("num channels: {}", stream_config.channels);
        log::info!("buffer size: {:?}", stream_config.buffer_size);
        let mixer =
            Arc::new(Mixer::new(stream_config.sample_rate.0, config.mixer));
        let stream = device.build_output_stream(
            &stream_config,
            {
                let mixer = Arc::clone(&mixer);
                let channels = stream_config.channels as usize;
                move |data: &mut [f32], _: &OutputCallbackInfo| {
                    mixer.render(data, channels);
                }
            },
            |err| log::error!("stream error: {}", err),
            None,
        )?;
        stream.play()?;
        Ok(Self { stream, mixer })
    }

    pub fn mixer(&self) -> &Arc<Mixer> {
        &self.mixer
    }
}
