// Integration tests for keyboard controls and the window title

use wavesynth::gen::{NoiseSource, WaveformKind};
use wavesynth::input::{InputTracker, Key, KeySnapshot};
use wavesynth::platform::{AudioOutput, PlaybackState, VirtualOutput};
use wavesynth::synth::{AMPLITUDE_STEP, FREQUENCY_STEP};
use wavesynth::visualization::PREVIEW_POINTS;
use wavesynth::{Synth, SynthConfig, TickOutcome};

fn synth() -> Synth<VirtualOutput> {
    let config = SynthConfig::default().with_frames_per_buffer(128);
    let output = VirtualOutput::new(config.sample_rate, config.channels);
    let mut synth = Synth::new(&config, NoiseSource::seeded(9), output).unwrap();
    synth.start().unwrap();
    synth
}

/// Run `ticks` ticks with the same keys held
fn hold(synth: &mut Synth<VirtualOutput>, input: &mut InputTracker, keys: &[Key], ticks: usize) {
    let snapshot: KeySnapshot = keys.iter().copied().collect();
    for _ in 0..ticks {
        input.begin_tick(snapshot);
        synth.tick(input).unwrap();
    }
}

fn release(synth: &mut Synth<VirtualOutput>, input: &mut InputTracker) {
    hold(synth, input, &[], 1);
}

#[test]
fn test_up_and_down_step_amplitude_while_held() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Down], 10);
    let expected = 1.0 - 10.0 * AMPLITUDE_STEP;
    assert!((synth.engine().amplitude() - expected).abs() < 1e-5);

    hold(&mut synth, &mut input, &[Key::Up], 4);
    let expected = expected + 4.0 * AMPLITUDE_STEP;
    assert!((synth.engine().amplitude() - expected).abs() < 1e-5);
}

#[test]
fn test_up_wins_over_down() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Up, Key::Down], 2);
    assert!((synth.engine().amplitude() - (1.0 + 2.0 * AMPLITUDE_STEP)).abs() < 1e-5);
}

#[test]
fn test_left_and_right_step_frequency() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Right], 5);
    assert!((synth.engine().frequency() - (220.0 + 5.0 * FREQUENCY_STEP)).abs() < 1e-3);

    hold(&mut synth, &mut input, &[Key::Left], 10);
    assert!((synth.engine().frequency() - (220.0 - 5.0 * FREQUENCY_STEP)).abs() < 1e-3);
}

#[test]
fn test_frequency_is_not_clamped_at_zero() {
    let mut synth = synth();
    synth.engine_mut().set_frequency(0.1);
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Left], 2);
    assert!(synth.engine().frequency() < 0.0);
    assert!(synth.feed().working.channel(0).iter().all(|s| s.is_finite()));
}

#[test]
fn test_space_selects_once_per_press() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Space], 6);
    assert_eq!(synth.engine().waveform(), WaveformKind::Pulse12_5);

    release(&mut synth, &mut input);
    hold(&mut synth, &mut input, &[Key::Space], 1);
    assert_eq!(synth.engine().waveform(), WaveformKind::Pulse25);
}

#[test]
fn test_shift_space_selects_previous() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    hold(&mut synth, &mut input, &[Key::Shift, Key::Space], 1);
    assert_eq!(synth.engine().waveform(), WaveformKind::Noise);

    release(&mut synth, &mut input);
    hold(&mut synth, &mut input, &[Key::Shift, Key::Space], 1);
    assert_eq!(synth.engine().waveform(), WaveformKind::Triangle);
}

#[test]
fn test_pause_and_resume() {
    let mut synth = synth();
    let mut input = InputTracker::new();
    assert_eq!(synth.output().state(), PlaybackState::Playing);

    hold(&mut synth, &mut input, &[Key::P], 1);
    assert_eq!(synth.output().state(), PlaybackState::Paused);

    hold(&mut synth, &mut input, &[Key::R], 1);
    assert_eq!(synth.output().state(), PlaybackState::Playing);
}

#[test]
fn test_escape_quits() {
    let mut synth = synth();
    let mut input = InputTracker::new();

    input.begin_tick(KeySnapshot::new().with(Key::Escape));
    assert_eq!(synth.tick(&input).unwrap(), TickOutcome::Quit);
}

#[test]
fn test_title_shows_frequency_except_for_noise() {
    let mut synth = synth();
    assert_eq!(synth.title(), "WaveSynth - Sine Wave @ 220 Hz");

    synth.engine_mut().set_frequency(440.4);
    synth.engine_mut().set_waveform(WaveformKind::Sawtooth);
    assert_eq!(synth.title(), "WaveSynth - Sawtooth Wave @ 440 Hz");

    synth.engine_mut().set_waveform(WaveformKind::Noise);
    assert_eq!(synth.title(), "WaveSynth - Noise");
}

#[test]
fn test_feed_exposes_latest_buffers() {
    let mut synth = synth();
    let mut input = InputTracker::new();
    hold(&mut synth, &mut input, &[], 1);

    let feed = synth.feed();
    assert_eq!(feed.waveform_name(), "Sine Wave");
    assert_eq!(feed.encoded.as_bytes(), synth.output().last_submitted());
    assert_eq!(feed.working.frames(), 128);

    let trace = feed.pcm_view().trace(580.0, 240.0);
    assert_eq!(trace.len(), 128 * 2 * 2);
}

#[test]
fn test_preview_follows_selected_waveform() {
    let mut synth = synth();
    let mut input = InputTracker::new();
    hold(&mut synth, &mut input, &[], 1);

    let preview = synth.preview();
    assert_eq!(preview.heights().len(), PREVIEW_POINTS);
    assert!(preview
        .heights()
        .iter()
        .all(|h| *h >= 0.0 && *h <= preview.height()));

    // Square only ever sits at the top or bottom edge
    synth.engine_mut().set_waveform(WaveformKind::Square);
    hold(&mut synth, &mut input, &[], 1);
    let preview = synth.preview();
    assert!(preview
        .heights()
        .iter()
        .all(|h| *h == 0.0 || *h == preview.height()));
}

#[test]
fn test_preview_does_not_consume_audio_noise() {
    let config = SynthConfig::default().with_frames_per_buffer(128);
    let frames = 3 * config.frames_per_buffer;
    let run = |idle_ticks: usize| {
        let output = VirtualOutput::new(config.sample_rate, config.channels);
        let mut synth = Synth::new(&config, NoiseSource::seeded(21), output).unwrap();
        synth.engine_mut().set_waveform(WaveformKind::Noise);
        synth.start().unwrap();
        let mut input = InputTracker::new();

        hold(&mut synth, &mut input, &[], 1);
        // Backlog is full, so these ticks only redraw the preview
        hold(&mut synth, &mut input, &[], idle_ticks);

        synth.output_mut().advance_frames(frames);
        hold(&mut synth, &mut input, &[], 1);
        synth.output().last_submitted().to_vec()
    };

    assert_eq!(run(0), run(20));
}
