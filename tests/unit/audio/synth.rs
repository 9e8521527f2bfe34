use super::*;

use crate::genre::pitch::Pitch;
use crate::genre::registry::genre_template;
use crate::schedule::scheduler::schedule;
use crate::schedule::timeline::Voicing;

fn timeline(seed: u64) -> EventTimeline {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    schedule(genre_template("electronic").unwrap(), 10.0, &mut rng).unwrap()
}

#[test]
fn buffer_matches_timeline_duration() {
    let buf = OscillatorSynth::new(1)
        .synthesize(&timeline(1), AudioFormat::CD)
        .unwrap();
    assert_eq!(buf.frames(), 441_000);
    assert_eq!(buf.samples.len(), 882_000);
    assert!((buf.duration_secs() - 10.0).abs() < 1e-9);
}

#[test]
fn output_is_audible_and_clipped() {
    let buf = OscillatorSynth::new(1)
        .synthesize(&timeline(1), AudioFormat::CD)
        .unwrap();
    let peak = buf.peak();
    assert!(peak > 0.05, "peak {peak}");
    assert!(peak < 1.0);
}

#[test]
fn same_seed_same_samples() {
    let synth = OscillatorSynth::new(9);
    let a = synth.synthesize(&timeline(3), AudioFormat::CD).unwrap();
    let b = synth.synthesize(&timeline(3), AudioFormat::CD).unwrap();
    assert_eq!(a, b);
}

#[test]
fn mono_output_has_one_sample_per_frame() {
    let mono = AudioFormat {
        sample_rate: 8_000,
        channels: 1,
    };
    let buf = OscillatorSynth::new(1).synthesize(&timeline(1), mono).unwrap();
    assert_eq!(buf.samples.len(), 80_000);
}

#[test]
fn tails_past_the_end_are_truncated() {
    let tl = EventTimeline {
        tempo: 120,
        duration_secs: 0.5,
        events: vec![NoteEvent {
            time_secs: 0.4,
            role: Role::Harmony,
            voicing: Voicing::Chord(vec![Pitch(60), Pitch(64), Pitch(67)]),
            velocity: 0.5,
            length_secs: 4.0,
        }],
    };
    let buf = OscillatorSynth::default()
        .synthesize(&tl, AudioFormat::CD)
        .unwrap();
    assert_eq!(buf.frames(), 22_050);
    assert!(buf.samples[..2 * 17_000].iter().all(|s| *s == 0.0));
}

#[test]
fn empty_timeline_is_silent() {
    let tl = EventTimeline {
        tempo: 120,
        duration_secs: 1.0,
        events: vec![],
    };
    let buf = OscillatorSynth::default()
        .synthesize(&tl, AudioFormat::CD)
        .unwrap();
    assert_eq!(buf.peak(), 0.0);
}

#[test]
fn non_positive_duration_is_rejected() {
    let tl = EventTimeline {
        tempo: 120,
        duration_secs: 0.0,
        events: vec![],
    };
    assert!(matches!(
        OscillatorSynth::default().synthesize(&tl, AudioFormat::CD),
        Err(BeatError::InvalidDuration(_))
    ));
}
