// Integration tests for the buffer streamer against the virtual device

use wavesynth::gen::NoiseSource;
use wavesynth::platform::{AudioOutput, PlaybackState, VirtualOutput};
use wavesynth::{BufferStreamer, Engine, SynthConfig, SynthError};

const FRAMES: usize = 64;

struct Rig {
    config: SynthConfig,
    engine: Engine,
    output: VirtualOutput,
    streamer: BufferStreamer,
}

fn rig_with(config: SynthConfig, output: VirtualOutput) -> Rig {
    Rig {
        engine: Engine::new(&config, NoiseSource::seeded(5)).unwrap(),
        streamer: BufferStreamer::new(&config),
        output,
        config,
    }
}

fn rig() -> Rig {
    let config = SynthConfig::default().with_frames_per_buffer(FRAMES);
    let output = VirtualOutput::new(config.sample_rate, config.channels);
    rig_with(config, output)
}

#[test]
fn test_tops_up_only_to_low_water_mark() {
    let mut rig = rig();

    // One buffer already queued
    rig.output.submit(&vec![0u8; rig.config.encoded_len()]).unwrap();
    assert_eq!(rig.output.pending_buffer_count().unwrap(), 1);

    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(report.backlog_before, 1);
    assert_eq!(report.submitted, 2);
    assert_eq!(report.backlog_after, 3);
    assert!(!report.bounded);
    assert_eq!(rig.output.pending_buffer_count().unwrap(), 3);
}

#[test]
fn test_empty_device_is_filled_in_one_tick() {
    let mut rig = rig();
    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();

    assert_eq!(report.submitted, 3);
    assert_eq!(rig.engine.clock().frames_elapsed(), 3 * FRAMES as u64);
}

#[test]
fn test_raised_low_water_mark_is_reached_in_one_tick() {
    let config = SynthConfig::default()
        .with_frames_per_buffer(FRAMES)
        .with_water_marks(5, 8);
    let output = VirtualOutput::new(config.sample_rate, config.channels);
    let mut rig = rig_with(config, output);

    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(report.backlog_before, 0);
    assert_eq!(report.submitted, 5);
    assert_eq!(report.backlog_after, 5);
    assert!(!report.bounded);
    assert_eq!(rig.output.pending_buffer_count().unwrap(), 5);
}

#[test]
fn test_full_backlog_is_a_no_op() {
    let mut rig = rig();
    rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    let before = rig.output.submitted_count();

    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(report.submitted, 0);
    assert_eq!(rig.output.submitted_count(), before);
}

#[test]
fn test_unreachable_backlog_is_bounded_per_tick() {
    let config = SynthConfig::default()
        .with_frames_per_buffer(FRAMES)
        .with_max_submissions_per_tick(2);
    let output = VirtualOutput::instant(config.sample_rate, config.channels);
    let mut rig = rig_with(config, output);

    for tick in 1..=5 {
        let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
        assert_eq!(report.submitted, 2);
        assert!(report.bounded);
        assert_eq!(rig.output.submitted_count(), tick * 2);
    }
}

#[test]
fn test_device_fault_is_propagated() {
    let mut rig = rig();
    rig.output.inject_fault("device removed");

    let result = rig.streamer.tick(&mut rig.engine, &mut rig.output);
    assert!(matches!(result, Err(SynthError::DeviceFault(_))));
    assert_eq!(rig.streamer.submitted_total(), 0);
}

#[test]
fn test_underrun_is_counted_after_playback_drains() {
    let mut rig = rig();
    rig.output.play().unwrap();

    rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(rig.streamer.underruns(), 0);

    rig.output.advance_frames(3 * FRAMES);
    assert_eq!(rig.output.pending_buffer_count().unwrap(), 0);

    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(report.submitted, 3);
    assert_eq!(rig.streamer.underruns(), 1);
}

#[test]
fn test_device_that_plays_on_arrival_never_underruns() {
    let config = SynthConfig::default().with_frames_per_buffer(FRAMES);
    let output = VirtualOutput::instant(config.sample_rate, config.channels);
    let mut rig = rig_with(config, output);
    rig.output.play().unwrap();

    for _ in 0..10 {
        let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
        assert_eq!(report.backlog_before, 0);
        assert_eq!(report.submitted, 3);
    }
    assert_eq!(rig.streamer.underruns(), 0);
}

#[test]
fn test_paused_device_holds_its_backlog() {
    let mut rig = rig();
    rig.output.play().unwrap();
    rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();

    rig.output.pause().unwrap();
    assert_eq!(rig.output.state(), PlaybackState::Paused);
    assert_eq!(rig.output.advance_frames(10 * FRAMES), 0);

    let report = rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();
    assert_eq!(report.submitted, 0);
}

#[test]
fn test_device_receives_the_encoded_buffer() {
    let mut rig = rig();
    rig.streamer.tick(&mut rig.engine, &mut rig.output).unwrap();

    assert_eq!(rig.output.last_submitted(), rig.streamer.encoded().as_bytes());
    assert_eq!(rig.output.last_submitted().len(), rig.config.encoded_len());
}
