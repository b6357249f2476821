/* WaveSynth - play the waveform catalogue through the default output device.
Runs in the terminal by default, in a window with `--window` (visualization
feature) or without any device at all with `--headless`.
*/

use anyhow::Context;
use clap::Parser;

use wavesynth::config::{
    DEFAULT_AMPLITUDE, DEFAULT_CHANNELS, DEFAULT_FRAMES_PER_BUFFER, DEFAULT_FREQUENCY,
    DEFAULT_HIGH_WATER_MARK, DEFAULT_LOW_WATER_MARK, DEFAULT_SAMPLE_RATE,
};
use wavesynth::input::{InputTracker, KeySnapshot};
use wavesynth::platform::VirtualOutput;
use wavesynth::utils::init_logger;
use wavesynth::{NoiseSource, Synth, SynthConfig, TickOutcome, WaveformKind};

/// Host loop period
const TICK: std::time::Duration = std::time::Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "wavesynth", about = "Real-time waveform synthesizer")]
struct Args {
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// 1 (mono) or 2 (stereo)
    #[arg(long, default_value_t = DEFAULT_CHANNELS)]
    channels: u16,

    /// Frames per submitted buffer
    #[arg(long, default_value_t = DEFAULT_FRAMES_PER_BUFFER)]
    frames: usize,

    #[arg(long, default_value_t = DEFAULT_LOW_WATER_MARK)]
    low_water: usize,

    #[arg(long, default_value_t = DEFAULT_HIGH_WATER_MARK)]
    high_water: usize,

    /// Frequency multiplier for the left channel (stereo only)
    #[arg(long, default_value_t = 1.0)]
    left_scale: f32,

    #[arg(long, default_value_t = DEFAULT_FREQUENCY)]
    frequency: f32,

    #[arg(long, default_value_t = DEFAULT_AMPLITUDE)]
    amplitude: f32,

    /// sine, pulse12.5, pulse25, square, pulse75, sawtooth, triangle or noise
    #[arg(long, default_value = "sine")]
    waveform: WaveformKind,

    /// Seed the noise generator for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Run against a virtual device instead of real audio output
    #[arg(long)]
    headless: bool,

    /// Length of a headless run
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Open the visualization window
    #[arg(long)]
    window: bool,
}

impl Args {
    fn config(&self) -> SynthConfig {
        let mut config = SynthConfig::default()
            .with_sample_rate(self.sample_rate)
            .with_channels(self.channels)
            .with_frames_per_buffer(self.frames)
            .with_water_marks(self.low_water, self.high_water);

        if self.channels == 2 {
            config = config.with_channel_frequency_scales(vec![self.left_scale, 1.0]);
        } else if self.left_scale != 1.0 {
            log::warn!("--left-scale ignored for {} channel(s)", self.channels);
        }

        config.initial_frequency = self.frequency;
        config.initial_amplitude = self.amplitude;
        config.initial_waveform = self.waveform;
        config
    }

    fn noise_source(&self) -> NoiseSource {
        match self.seed {
            Some(seed) => NoiseSource::seeded(seed),
            None => NoiseSource::from_entropy(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logger();

    let args = Args::parse();
    let config = args.config();
    config.validate().context("Invalid synth configuration")?;
    let noise = args.noise_source();

    if args.headless {
        return run_headless(&config, noise, args.seconds);
    }
    if args.window {
        return run_window(&config, noise);
    }
    run_terminal(&config, noise)
}

/// Drive the synth against a virtual device whose clock advances one tick per loop
fn run_headless(config: &SynthConfig, noise: NoiseSource, seconds: f64) -> anyhow::Result<()> {
    let output = VirtualOutput::new(config.sample_rate, config.channels);
    let mut synth = Synth::new(config, noise, output)?;
    synth.start()?;

    let ticks = (seconds / TICK.as_secs_f64()).ceil() as usize;
    let mut input = InputTracker::new();

    for _ in 0..ticks {
        input.begin_tick(KeySnapshot::new());
        synth.output_mut().advance_seconds(TICK.as_secs_f64());
        if synth.tick(&input)? == TickOutcome::Quit {
            break;
        }
    }

    let streamer = synth.streamer();
    log::info!(
        "{}: {} buffers submitted, {} frames played, {} underruns, clock at {:.3}s",
        synth.title(),
        streamer.submitted_total(),
        synth.output().frames_played(),
        streamer.underruns(),
        synth.engine().clock().time()
    );

    synth.stop()?;
    Ok(())
}

#[cfg(feature = "native")]
fn open_output(config: &SynthConfig) -> anyhow::Result<wavesynth::platform::CpalOutput> {
    let mut output = wavesynth::platform::CpalOutput::new(config.sample_rate, config.channels);
    output.initialize().context("Failed to open audio output")?;
    Ok(output)
}

#[cfg(all(feature = "native", feature = "crossterm"))]
fn run_terminal(config: &SynthConfig, noise: NoiseSource) -> anyhow::Result<()> {
    use crossterm::{
        cursor, execute,
        terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
    };
    use std::io;

    let mut synth = Synth::new(config, noise, open_output(config)?)?;
    synth.start()?;

    println!("Up/Down amplitude, Left/Right frequency, Space next waveform (Shift+Space previous)");
    println!("P pause, R resume, Esc or Q quit");

    execute!(io::stdout(), cursor::Hide)?;
    enable_raw_mode()?;

    let result = terminal_loop(&mut synth);

    execute!(io::stdout(), Clear(ClearType::CurrentLine), cursor::Show)?;
    disable_raw_mode()?;
    println!("\nQuitting...");

    synth.stop()?;
    result
}

#[cfg(all(feature = "native", feature = "crossterm"))]
fn terminal_loop<O: wavesynth::platform::AudioOutput>(synth: &mut Synth<O>) -> anyhow::Result<()> {
    use crossterm::{
        execute,
        terminal::{Clear, ClearType},
    };
    use std::io::{self, Write};

    let mut input = InputTracker::new();
    let mut last_status = String::new();

    loop {
        input.begin_tick(poll_terminal_keys(TICK)?);

        if synth.tick(&input)? == TickOutcome::Quit {
            return Ok(());
        }

        let status = format!(
            "\r{} | amplitude {:.3} | queued {} | underruns {}",
            synth.title(),
            synth.engine().amplitude(),
            synth.output().pending_buffer_count()?,
            synth.streamer().underruns()
        );
        if status != last_status {
            execute!(io::stdout(), Clear(ClearType::CurrentLine))?;
            print!("{}", status);
            io::stdout().flush()?;
            last_status = status;
        }
    }
}

/// Collect the keys reported during one tick.
///
/// Terminals only report presses (and auto-repeat), so a key counts as held for
/// the tick in which an event for it arrived.
#[cfg(all(feature = "native", feature = "crossterm"))]
fn poll_terminal_keys(timeout: std::time::Duration) -> anyhow::Result<KeySnapshot> {
    use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
    use wavesynth::input::Key;

    let mut snapshot = KeySnapshot::new();
    let mut wait = timeout;

    while event::poll(wait)? {
        wait = std::time::Duration::ZERO;

        let Event::Key(KeyEvent {
            code, modifiers, kind, ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }

        if modifiers.contains(KeyModifiers::SHIFT) {
            snapshot.press(Key::Shift);
        }
        match code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => snapshot.press(Key::Escape),
            KeyCode::Up => snapshot.press(Key::Up),
            KeyCode::Down => snapshot.press(Key::Down),
            KeyCode::Left => snapshot.press(Key::Left),
            KeyCode::Right => snapshot.press(Key::Right),
            KeyCode::Char(' ') => snapshot.press(Key::Space),
            KeyCode::Char('p') | KeyCode::Char('P') => snapshot.press(Key::P),
            KeyCode::Char('r') | KeyCode::Char('R') => snapshot.press(Key::R),
            _ => {}
        }
    }

    Ok(snapshot)
}

#[cfg(not(all(feature = "native", feature = "crossterm")))]
fn run_terminal(_config: &SynthConfig, _noise: NoiseSource) -> anyhow::Result<()> {
    anyhow::bail!("The terminal front end needs the 'native' and 'crossterm' features, try --headless")
}

#[cfg(all(feature = "native", feature = "visualization"))]
fn run_window(config: &SynthConfig, noise: NoiseSource) -> anyhow::Result<()> {
    use wavesynth::visualization::WaveformDisplay;

    const WINDOW_SIZE: (u32, u32) = (1280, 720);

    let mut synth = Synth::new(config, noise, open_output(config)?)?;
    let mut display = WaveformDisplay::new(WINDOW_SIZE.0, WINDOW_SIZE.1, &synth.title())
        .map_err(|e| anyhow::anyhow!(e))?;
    synth.start()?;

    let mut input = InputTracker::new();
    let mut title = synth.title();

    while !display.should_close() {
        input.begin_tick(display.poll_keys());

        if synth.tick(&input)? == TickOutcome::Quit {
            break;
        }

        let current = synth.title();
        if current != title {
            display.set_title(&current);
            title = current;
        }

        display.render(&synth.feed(), synth.preview());
        std::thread::sleep(TICK);
    }

    synth.stop()?;
    Ok(())
}

#[cfg(not(all(feature = "native", feature = "visualization")))]
fn run_window(_config: &SynthConfig, _noise: NoiseSource) -> anyhow::Result<()> {
    anyhow::bail!("The window front end needs the 'native' and 'visualization' features")
}
