// Voice-engine tests: polyphony bounds, envelope lifecycle, master
// chain output and the controller's input guards.

use klavier::controller::Controller;
use klavier::engine::{Engine, Stage, Timbre, MAX_POLYPHONY, VOLUME_LEVELS};
use klavier::layout::LayoutFamily;
use klavier::pitch::FLAT_NAMES;

const SR: f32 = 44_100.0;

fn engine() -> Engine {
    Engine::new(SR)
}

/// Distinct chromatic note names, low to high.
fn nth_note(i: usize) -> String {
    format!("{}{}", FLAT_NAMES[i % 12], 3 + i / 12)
}

fn render_n(engine: &mut Engine, n: usize) -> Vec<f32> {
    let mut buf = vec![0.0f32; n];
    engine.render(&mut buf);
    buf
}

fn peak(buf: &[f32]) -> f32 {
    buf.iter().fold(0.0f32, |m, &v| m.max(v.abs()))
}

// ---------------------------------------------------------------------------
// Polyphony
// ---------------------------------------------------------------------------

#[test]
fn pool_is_capped_at_16() {
    let mut e = engine();
    for i in 0..MAX_POLYPHONY + 1 {
        e.start(&nth_note(i), 0.2);
    }
    assert_eq!(e.active_len(), MAX_POLYPHONY);
}

#[test]
fn seventeenth_note_evicts_the_oldest() {
    let mut e = engine();
    for i in 0..MAX_POLYPHONY + 1 {
        e.start(&nth_note(i), 0.2);
    }
    assert_eq!(e.stage_of(&nth_note(0)), None);
    assert_eq!(e.active_notes()[0], nth_note(1));
    // Eviction cuts the voice dead, no release tail.
    assert_eq!(e.tail_count(), 0);
}

#[test]
fn eviction_order_tracks_voice_age() {
    let mut e = engine();
    for i in 0..5 {
        e.start(&nth_note(i), 0.2);
    }
    // Stopping a middle voice must not disturb the age order.
    e.stop(&nth_note(1));
    for i in 5..MAX_POLYPHONY + 1 {
        e.start(&nth_note(i), 0.2);
    }
    assert_eq!(e.active_len(), MAX_POLYPHONY);
    e.start(&nth_note(20), 0.2);
    // nth_note(0) was the oldest and goes first.
    assert_eq!(e.stage_of(&nth_note(0)), None);
    assert_eq!(e.active_notes()[0], nth_note(2));
}

#[test]
fn retrigger_restarts_one_voice() {
    let mut e = engine();
    e.start("A4", 0.2);
    render_n(&mut e, 8_000); // well into sustain
    assert_eq!(e.stage_of("A4"), Some(Stage::Sustain));

    e.start("A4", 0.2);
    assert_eq!(e.active_len(), 1);
    assert_eq!(e.stage_of("A4"), Some(Stage::Attack));
    // The cut voice leaves no tail behind.
    assert_eq!(e.tail_count(), 0);
}

// ---------------------------------------------------------------------------
// Envelope lifecycle
// ---------------------------------------------------------------------------

#[test]
fn envelope_walks_attack_decay_sustain() {
    let mut e = engine();
    e.start("C4", 0.2);
    assert_eq!(e.stage_of("C4"), Some(Stage::Attack));
    render_n(&mut e, 900); // attack is 20 ms = 882 samples
    assert_eq!(e.stage_of("C4"), Some(Stage::Decay));
    render_n(&mut e, 6_000); // decay ends 120 ms in
    assert_eq!(e.stage_of("C4"), Some(Stage::Sustain));
}

#[test]
fn stop_moves_the_voice_to_its_release_tail() {
    let mut e = engine();
    e.start("C4", 0.2);
    render_n(&mut e, 8_000);
    e.stop("C4");
    assert_eq!(e.active_len(), 0);
    assert_eq!(e.tail_count(), 1);
    // Release is 300 ms = 13230 samples.
    render_n(&mut e, 14_000);
    assert!(e.is_quiet());
}

#[test]
fn stop_of_unknown_note_is_a_noop() {
    let mut e = engine();
    e.start("C4", 0.2);
    e.stop("G7");
    e.stop("not a note");
    assert_eq!(e.active_len(), 1);
    assert_eq!(e.tail_count(), 0);
    // A second stop of an already-released note does nothing either.
    e.stop("C4");
    e.stop("C4");
    assert_eq!(e.tail_count(), 1);
}

#[test]
fn malformed_note_occupies_a_voice_silently() {
    let mut e = engine();
    e.start("Cb4", 0.2);
    assert_eq!(e.active_len(), 1);
    let buf = render_n(&mut e, 4_410);
    assert!(peak(&buf) < 1e-3);
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

#[test]
fn idle_engine_renders_silence() {
    let mut e = engine();
    let buf = render_n(&mut e, 1_024);
    assert!(buf.iter().all(|&s| s == 0.0));
}

#[test]
fn each_timbre_is_audible() {
    for timbre in [
        Timbre::Sine,
        Timbre::Triangle,
        Timbre::Square,
        Timbre::Sawtooth,
        Timbre::Organ,
    ] {
        let mut e = engine();
        e.set_timbre(timbre);
        e.start("A4", 0.2);
        let buf = render_n(&mut e, 8_820);
        assert!(peak(&buf) > 0.01, "timbre {} was silent", timbre.name());
    }
}

#[test]
fn release_tail_keeps_sounding_after_stop() {
    let mut e = engine();
    e.start("A4", 0.2);
    render_n(&mut e, 8_000);
    e.stop("A4");
    let early = render_n(&mut e, 2_000);
    assert!(peak(&early) > 0.005);
    render_n(&mut e, 12_000);
    let late = render_n(&mut e, 2_000);
    assert!(peak(&late) < 1e-3);
}

#[test]
fn volume_steps_scale_the_output() {
    let mut peaks = [0.0f32; 4];
    for (step, p) in peaks.iter_mut().enumerate() {
        let mut e = engine();
        e.set_volume_step(step);
        e.start("A4", 0.2);
        *p = peak(&render_n(&mut e, 8_820));
    }
    for step in 1..4 {
        let expected = peaks[0] * VOLUME_LEVELS[step] / VOLUME_LEVELS[0];
        assert!(
            (peaks[step] - expected).abs() < 1e-3,
            "step {}: {} vs {}",
            step,
            peaks[step],
            expected,
        );
    }
}

#[test]
fn out_of_range_volume_step_is_ignored() {
    let mut e = engine();
    e.set_volume_step(2);
    e.set_volume_step(7);
    assert_eq!(e.volume_step(), 2);
}

#[test]
fn timbre_names_round_trip() {
    for name in ["sine", "triangle", "square", "sawtooth", "organ"] {
        assert_eq!(Timbre::from_name(name).map(Timbre::name), Some(name));
    }
    assert_eq!(Timbre::from_name("theremin"), None);
}

#[test]
fn release_uses_the_current_timbre() {
    // Matches the reference behavior: the release slope is read at
    // stop time, so a timbre switch mid-note changes the tail.
    let mut e = engine();
    e.start("A4", 0.2);
    render_n(&mut e, 8_000);
    e.set_timbre(Timbre::Square);
    e.stop("A4");
    assert_eq!(e.tail_count(), 1);
    render_n(&mut e, 14_000);
    assert!(e.is_quiet());
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

#[test]
fn held_key_does_not_retrigger() {
    let mut c = Controller::new(SR);
    assert_eq!(c.key_down("KeyZ", 'z', false).as_deref(), Some("C4"));
    assert_eq!(c.key_down("KeyZ", 'z', false), None);
    assert_eq!(c.engine.active_len(), 1);
}

#[test]
fn unknown_key_up_is_a_noop() {
    let mut c = Controller::new(SR);
    assert_eq!(c.key_up("KeyZ"), None);
    c.key_down("KeyZ", 'z', false);
    assert_eq!(c.key_up("KeyZ").as_deref(), Some("C4"));
    assert_eq!(c.key_up("KeyZ"), None);
    assert_eq!(c.engine.active_len(), 0);
}

#[test]
fn shifted_symbol_reaches_the_chromatic_key() {
    let mut c = Controller::new(SR);
    c.config.set_layout(LayoutFamily::Blue);
    let highlight = c.key_down("Digit2", '@', true);
    assert_eq!(highlight.as_deref(), Some("Db4"));
    assert_eq!(c.engine.active_notes(), ["Db6"]);
}

#[test]
fn unmapped_key_holds_no_state() {
    let mut c = Controller::new(SR);
    c.config.set_layout(LayoutFamily::Blue);
    assert_eq!(c.key_down("KeyA", 'a', false), None); // gap key
    assert_eq!(c.key_up("KeyA"), None);
    assert_eq!(c.engine.active_len(), 0);
}

#[test]
fn drag_stops_the_previous_note_first() {
    let mut c = Controller::new(SR);
    c.pointer_down("C3");
    assert_eq!(c.engine.active_notes(), ["C3"]);

    assert_eq!(c.pointer_move("D3").as_deref(), Some("D3"));
    assert_eq!(c.engine.active_notes(), ["D3"]);
    assert_eq!(c.engine.tail_count(), 1); // C3 ringing out

    // Sliding within the same key changes nothing.
    assert_eq!(c.pointer_move("D3"), None);

    c.pointer_up();
    assert_eq!(c.engine.active_len(), 0);
    // Releases after the pointer is up are ignored.
    assert_eq!(c.pointer_move("E3"), None);
}
