use super::{check_buffer_shape, AudioOutput, PlaybackQueue, PlaybackState};
use crate::error::{Result, SynthError};
use anyhow::Context;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, FromSample, Sample, SampleRate, SizedSample, Stream, StreamConfig,
};
use std::sync::{Arc, Mutex};

/// State shared between the main thread and the audio callback
struct SharedPlayback {
    queue: PlaybackQueue,
    volume: f32,
}

/// Buffer-queue output on the default CPAL device.
///
/// The stream is opened at exactly the requested sample rate and channel
/// count; no resampling happens here.
pub struct CpalOutput {
    stream: Option<Stream>,
    device: Option<Device>,
    config: Option<StreamConfig>,
    shared: Arc<Mutex<SharedPlayback>>,
    fault: Arc<Mutex<Option<String>>>,
    sample_rate: u32,
    channels: u16,
    state: PlaybackState,
    volume: f32,
}

impl CpalOutput {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            stream: None,
            device: None,
            config: None,
            shared: Arc::new(Mutex::new(SharedPlayback {
                queue: PlaybackQueue::new(),
                volume: 1.0,
            })),
            fault: Arc::new(Mutex::new(None)),
            sample_rate,
            channels,
            state: PlaybackState::Stopped,
            volume: 1.0,
        }
    }

    /// Open the default device and build a (paused) stream for it
    pub fn initialize(&mut self) -> anyhow::Result<()> {
        let sample_format = self.setup_host_device()?;
        self.create_stream(sample_format)?;
        Ok(())
    }

    /// Setup the CPAL host and device
    fn setup_host_device(&mut self) -> anyhow::Result<cpal::SampleFormat> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("Default output device is not available"))?;

        log::info!("Output device: {}", device.name()?);

        let wanted_rate = SampleRate(self.sample_rate);
        let supported = device
            .supported_output_configs()
            .context("Failed to query output configurations")?
            .find(|range| {
                range.channels() == self.channels
                    && range.min_sample_rate() <= wanted_rate
                    && range.max_sample_rate() >= wanted_rate
            })
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Device does not support {} channel(s) at {} Hz",
                    self.channels,
                    self.sample_rate
                )
            })?
            .with_sample_rate(wanted_rate);

        log::debug!("Output config: {:?}", supported);

        let sample_format = supported.sample_format();
        self.device = Some(device);
        self.config = Some(supported.into());

        Ok(sample_format)
    }

    fn create_stream(&mut self, sample_format: cpal::SampleFormat) -> anyhow::Result<()> {
        let device = self.device.as_ref().ok_or_else(|| anyhow::anyhow!("Device not initialized"))?;
        let config = self.config.as_ref().ok_or_else(|| anyhow::anyhow!("Config not initialized"))?;
        let shared = self.shared.clone();
        let fault = self.fault.clone();

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::make_stream::<i8>(device, config, shared, fault)?,
            cpal::SampleFormat::I16 => Self::make_stream::<i16>(device, config, shared, fault)?,
            cpal::SampleFormat::I32 => Self::make_stream::<i32>(device, config, shared, fault)?,
            cpal::SampleFormat::I64 => Self::make_stream::<i64>(device, config, shared, fault)?,
            cpal::SampleFormat::U8 => Self::make_stream::<u8>(device, config, shared, fault)?,
            cpal::SampleFormat::U16 => Self::make_stream::<u16>(device, config, shared, fault)?,
            cpal::SampleFormat::U32 => Self::make_stream::<u32>(device, config, shared, fault)?,
            cpal::SampleFormat::U64 => Self::make_stream::<u64>(device, config, shared, fault)?,
            cpal::SampleFormat::F32 => Self::make_stream::<f32>(device, config, shared, fault)?,
            cpal::SampleFormat::F64 => Self::make_stream::<f64>(device, config, shared, fault)?,
            sample_format => return Err(anyhow::anyhow!("Unsupported sample format '{}'", sample_format)),
        };

        // Some hosts start streams on creation
        if let Err(err) = stream.pause() {
            log::debug!("Could not pause new stream: {}", err);
        }

        self.stream = Some(stream);
        Ok(())
    }

    /// Create a typed stream for the given sample format
    fn make_stream<T>(
        device: &Device,
        config: &StreamConfig,
        shared: Arc<Mutex<SharedPlayback>>,
        fault: Arc<Mutex<Option<String>>>,
    ) -> anyhow::Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let num_channels = config.channels as usize;

        let err_fn = move |err: cpal::StreamError| {
            log::error!("Audio stream error: {}", err);
            if let Ok(mut slot) = fault.lock() {
                *slot = Some(err.to_string());
            }
        };

        let stream = device.build_output_stream(
            config,
            move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::process_frames(output, &shared, num_channels);
            },
            err_fn,
            None,
        )?;

        Ok(stream)
    }

    /// Fill one device callback from the queue, padding with silence on underrun
    fn process_frames<SampleType>(
        output: &mut [SampleType],
        shared: &Arc<Mutex<SharedPlayback>>,
        num_channels: usize,
    ) where
        SampleType: Sample + FromSample<f32>,
    {
        let Ok(mut playback) = shared.lock() else {
            output.fill(SampleType::EQUILIBRIUM);
            return;
        };

        let volume = playback.volume;
        let mut pcm = [0i16; 2];
        let pcm = &mut pcm[..num_channels.min(2)];

        for frame in output.chunks_mut(num_channels) {
            if playback.queue.read_frame(pcm) {
                for (sample, value) in frame.iter_mut().zip(pcm.iter()) {
                    *sample = SampleType::from_sample(*value as f32 / 32768.0 * volume);
                }
            } else {
                frame.fill(SampleType::EQUILIBRIUM);
            }
        }
    }

    fn check_fault(&self) -> Result<()> {
        let slot = self
            .fault
            .lock()
            .map_err(|_| SynthError::DeviceFault("fault state poisoned".into()))?;
        match slot.as_ref() {
            Some(reason) => Err(SynthError::DeviceFault(reason.clone())),
            None => Ok(()),
        }
    }

    fn stream(&self) -> Result<&Stream> {
        self.stream
            .as_ref()
            .ok_or_else(|| SynthError::DeviceUnavailable("stream not created, call initialize first".into()))
    }

    fn with_playback<R>(&self, f: impl FnOnce(&mut SharedPlayback) -> R) -> Result<R> {
        let mut playback = self
            .shared
            .lock()
            .map_err(|_| SynthError::DeviceFault("playback queue poisoned".into()))?;
        Ok(f(&mut playback))
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn pending_buffer_count(&self) -> Result<usize> {
        self.check_fault()?;
        self.with_playback(|playback| playback.queue.pending())
    }

    fn submit(&mut self, buffer: &[u8]) -> Result<()> {
        self.check_fault()?;
        check_buffer_shape(buffer, self.channels)?;
        self.with_playback(|playback| playback.queue.push(buffer))
    }

    fn play(&mut self) -> Result<()> {
        self.stream()?
            .play()
            .map_err(|e| SynthError::DeviceFault(e.to_string()))?;
        self.state = PlaybackState::Playing;
        log::info!("Audio stream started at sample rate: {}", self.sample_rate);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if self.state != PlaybackState::Playing {
            return Ok(());
        }
        self.stream()?
            .pause()
            .map_err(|e| SynthError::DeviceFault(e.to_string()))?;
        self.state = PlaybackState::Paused;
        log::info!("Audio stream paused");
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if self.state != PlaybackState::Paused {
            return Ok(());
        }
        self.play()
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stream) = &self.stream {
            stream
                .pause()
                .map_err(|e| SynthError::DeviceFault(e.to_string()))?;
        }
        self.with_playback(|playback| playback.queue.clear())?;
        self.state = PlaybackState::Stopped;
        log::info!("Audio stream stopped");
        Ok(())
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        let volume = self.volume;
        if self.with_playback(|playback| playback.volume = volume).is_err() {
            log::warn!("Could not apply volume, playback state poisoned");
        }
    }

    fn state(&self) -> PlaybackState {
        self.state
    }
}
