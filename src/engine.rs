// Polyphonic voice engine: envelope-shaped oscillators through per-voice
// lowpass filters into a shared master chain, rendered as mono f32.

use std::f32::consts::TAU;

use crate::pitch;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const MAX_POLYPHONY: usize = 16;

/// Headroom applied to the voice mix before the master chain.
const MIX_GAIN: f32 = 0.8;

const MASTER_HP_FREQ: f32 = 100.0;
const MASTER_LP_FREQ: f32 = 10_000.0;
const MASTER_Q: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Selectable master volume, loudest first.
pub const VOLUME_LEVELS: [f32; 4] = [0.9, 0.675, 0.45, 0.225];

/// A release ramp ends when the level falls below this.
const RELEASE_FLOOR: f32 = 1.0e-4;

// Organ partial amplitudes (fundamental first) and wavetable size.
const ORGAN_PARTIALS: [f32; 4] = [1.0, 0.15, 0.10, 0.05];
const ORGAN_TABLE_LEN: usize = 2048;

// Organ vibrato: rate ramps 4 to 6 Hz over the first 1.5 s, depth in Hz.
const VIB_RATE_LO: f32 = 4.0;
const VIB_RATE_HI: f32 = 6.0;
const VIB_RAMP_SECS: f32 = 1.5;
const VIB_DEPTH_HZ: f32 = 2.5;

// ---------------------------------------------------------------------------
// Timbres
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Timbre {
    Sine,
    Triangle,
    Square,
    Sawtooth,
    Organ,
}

struct Profile {
    attack:      f32,
    decay:       f32,
    sustain:     f32,
    release:     f32,
    filter_freq: f32,
    filter_q:    f32,
}

impl Timbre {
    pub fn from_name(name: &str) -> Option<Timbre> {
        let timbre = match name {
            "sine"     => Timbre::Sine,
            "triangle" => Timbre::Triangle,
            "square"   => Timbre::Square,
            "sawtooth" => Timbre::Sawtooth,
            "organ"    => Timbre::Organ,
            _ => return None,
        };
        Some(timbre)
    }

    pub fn name(self) -> &'static str {
        match self {
            Timbre::Sine     => "sine",
            Timbre::Triangle => "triangle",
            Timbre::Square   => "square",
            Timbre::Sawtooth => "sawtooth",
            Timbre::Organ    => "organ",
        }
    }

    fn profile(self) -> Profile {
        let filter_freq = match self {
            Timbre::Square | Timbre::Sawtooth => 6_000.0,
            _ => 8_000.0,
        };
        Profile {
            attack:  0.02,
            decay:   0.1,
            sustain: 0.7,
            release: 0.3,
            filter_freq,
            filter_q: 0.7,
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear attack-decay-sustain-release, advanced one sample at a time.
/// The release slope is fixed at note-off from the level the voice held
/// at that moment.
struct Envelope {
    stage:        Stage,
    level:        f32,
    peak:         f32,
    sustain:      f32,
    attack_step:  f32,
    decay_step:   f32,
    release_step: f32,
}

impl Envelope {
    fn new(profile: &Profile, peak: f32, sample_rate: f32) -> Envelope {
        Envelope {
            stage:        Stage::Attack,
            level:        0.0,
            peak,
            sustain:      profile.sustain * peak,
            attack_step:  peak / (profile.attack * sample_rate),
            decay_step:   peak * (1.0 - profile.sustain) / (profile.decay * sample_rate),
            release_step: 0.0,
        }
    }

    fn release(&mut self, release_secs: f32, sample_rate: f32) {
        self.release_step = self.level / (release_secs * sample_rate);
        self.stage = Stage::Release;
    }

    fn next(&mut self) -> f32 {
        match self.stage {
            Stage::Attack => {
                self.level += self.attack_step;
                if self.level >= self.peak {
                    self.level = self.peak;
                    self.stage = Stage::Decay;
                }
            }
            Stage::Decay => {
                self.level -= self.decay_step;
                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => {}
            Stage::Release => {
                self.level -= self.release_step;
                if self.level < RELEASE_FLOOR {
                    self.level = 0.0;
                }
            }
        }
        self.level
    }

    fn is_done(&self) -> bool {
        self.stage == Stage::Release && self.level <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Vibrato LFO (organ only)
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Vibrato {
    phase:   f32, // 0..1, wraps each cycle
    elapsed: f32, // seconds since voice start
}

impl Vibrato {
    /// Frequency offset in Hz for the next sample.
    fn next(&mut self, sample_rate: f32) -> f32 {
        let rate = if self.elapsed >= VIB_RAMP_SECS {
            VIB_RATE_HI
        } else {
            VIB_RATE_LO + (VIB_RATE_HI - VIB_RATE_LO) * self.elapsed / VIB_RAMP_SECS
        };
        let out = VIB_DEPTH_HZ * (TAU * self.phase).sin();
        self.phase += rate / sample_rate;
        self.phase -= self.phase.floor();
        self.elapsed += 1.0 / sample_rate;
        out
    }
}

// ---------------------------------------------------------------------------
// Biquad filter (RBJ cookbook)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Default)]
struct Biquad {
    b0: f32, b1: f32, b2: f32,
    a1: f32, a2: f32,
    x1: f32, x2: f32,
    y1: f32, y2: f32,
}

impl Biquad {
    fn lowpass(sample_rate: f32, freq: f32, q: f32) -> Biquad {
        let (sin, cos) = (TAU * freq / sample_rate).sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;
        Biquad {
            b0: (1.0 - cos) / 2.0 / a0,
            b1: (1.0 - cos) / a0,
            b2: (1.0 - cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
            ..Biquad::default()
        }
    }

    fn highpass(sample_rate: f32, freq: f32, q: f32) -> Biquad {
        let (sin, cos) = (TAU * freq / sample_rate).sin_cos();
        let alpha = sin / (2.0 * q);
        let a0 = 1.0 + alpha;
        Biquad {
            b0: (1.0 + cos) / 2.0 / a0,
            b1: -(1.0 + cos) / a0,
            b2: (1.0 + cos) / 2.0 / a0,
            a1: -2.0 * cos / a0,
            a2: (1.0 - alpha) / a0,
            ..Biquad::default()
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1 - self.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;
        y
    }
}

// ---------------------------------------------------------------------------
// Compressor
// ---------------------------------------------------------------------------

/// Soft-knee feed-forward compressor with smoothed level detection.
/// Fixed settings: -24 dB threshold, 30 dB knee, 4:1 ratio, 10 ms
/// attack, 250 ms release.
struct Compressor {
    threshold:     f32, // dB
    knee:          f32, // dB
    ratio:         f32,
    attack_coeff:  f32,
    release_coeff: f32,
    envelope_db:   f32,
}

impl Compressor {
    fn new(sample_rate: f32) -> Compressor {
        Compressor {
            threshold:     -24.0,
            knee:          30.0,
            ratio:         4.0,
            attack_coeff:  (-1.0 / (0.010 * sample_rate)).exp(),
            release_coeff: (-1.0 / (0.250 * sample_rate)).exp(),
            envelope_db:   -120.0,
        }
    }

    fn process(&mut self, x: f32) -> f32 {
        let level_db = 20.0 * x.abs().max(1.0e-6).log10();
        let coeff = if level_db > self.envelope_db {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope_db = coeff * self.envelope_db + (1.0 - coeff) * level_db;

        let e = self.envelope_db;
        let half = self.knee / 2.0;
        let out_db = if e <= self.threshold - half {
            e
        } else if e >= self.threshold + half {
            self.threshold + (e - self.threshold) / self.ratio
        } else {
            let over = e - self.threshold + half;
            e + (1.0 / self.ratio - 1.0) * over * over / (2.0 * self.knee)
        };
        x * 10.0_f32.powf((out_db - e) / 20.0)
    }
}

// ---------------------------------------------------------------------------
// Voices
// ---------------------------------------------------------------------------

struct Voice {
    note:    String,
    timbre:  Timbre,
    freq:    f32,
    phase:   f32, // 0..1, wraps each cycle
    env:     Envelope,
    filter:  Biquad,
    vibrato: Option<Vibrato>,
}

impl Voice {
    fn next_sample(&mut self, sample_rate: f32, organ_wave: &[f32]) -> f32 {
        let gain = self.env.next();
        let mut freq = self.freq;
        if let Some(vib) = &mut self.vibrato {
            freq += vib.next(sample_rate);
        }
        let raw = wave_sample(self.timbre, self.phase, organ_wave);
        self.phase += freq / sample_rate;
        self.phase -= self.phase.floor();
        self.filter.process(raw) * gain
    }
}

fn wave_sample(timbre: Timbre, phase: f32, organ_wave: &[f32]) -> f32 {
    match timbre {
        Timbre::Sine => (TAU * phase).sin(),
        Timbre::Triangle => {
            if phase < 0.25 {
                4.0 * phase
            } else if phase < 0.75 {
                2.0 - 4.0 * phase
            } else {
                4.0 * phase - 4.0
            }
        }
        Timbre::Square => {
            if phase < 0.5 { 1.0 } else { -1.0 }
        }
        Timbre::Sawtooth => {
            if phase < 0.5 { 2.0 * phase } else { 2.0 * phase - 2.0 }
        }
        Timbre::Organ => {
            let pos = phase * organ_wave.len() as f32;
            let i = pos as usize % organ_wave.len();
            let j = (i + 1) % organ_wave.len();
            organ_wave[i] + (organ_wave[j] - organ_wave[i]) * (pos - pos.floor())
        }
    }
}

/// Fixed additive wavetable for the organ timbre, peak-normalized.
fn build_organ_wave() -> Vec<f32> {
    let mut table = vec![0.0f32; ORGAN_TABLE_LEN];
    for (i, sample) in table.iter_mut().enumerate() {
        let phi = TAU * i as f32 / ORGAN_TABLE_LEN as f32;
        *sample = ORGAN_PARTIALS
            .iter()
            .enumerate()
            .map(|(k, &amp)| amp * ((k + 1) as f32 * phi).cos())
            .sum();
    }
    let peak = table.iter().fold(0.0f32, |m, &v| m.max(v.abs()));
    for sample in &mut table {
        *sample /= peak;
    }
    table
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The voice pool and master chain. At most one active voice per note
/// string and at most MAX_POLYPHONY active voices; starting a 17th note
/// silences the oldest. Released voices leave the pool at once but keep
/// rendering until their release ramp lands.
pub struct Engine {
    sample_rate: f32,
    timbre:      Timbre,
    volume_step: usize,
    voices:      Vec<Voice>, // active, oldest first
    tails:       Vec<Voice>, // released, ringing out
    organ_wave:  Vec<f32>,   // built on first organ voice
    master_hp:   Biquad,
    master_lp:   Biquad,
    compressor:  Compressor,
}

impl Engine {
    pub fn new(sample_rate: f32) -> Engine {
        Engine {
            sample_rate,
            timbre:      Timbre::Triangle,
            volume_step: 0,
            voices:      Vec::new(),
            tails:       Vec::new(),
            organ_wave:  Vec::new(),
            master_hp:   Biquad::highpass(sample_rate, MASTER_HP_FREQ, MASTER_Q),
            master_lp:   Biquad::lowpass(sample_rate, MASTER_LP_FREQ, MASTER_Q),
            compressor:  Compressor::new(sample_rate),
        }
    }

    pub fn timbre(&self) -> Timbre {
        self.timbre
    }

    pub fn set_timbre(&mut self, timbre: Timbre) {
        self.timbre = timbre;
    }

    pub fn volume_step(&self) -> usize {
        self.volume_step
    }

    /// Selects one of the VOLUME_LEVELS entries.
    pub fn set_volume_step(&mut self, step: usize) {
        if step < VOLUME_LEVELS.len() {
            self.volume_step = step;
        }
    }

    /// Starts a voice for `note` at the given peak gain. A note already
    /// sounding is cut dead and restarted from the top of its attack;
    /// when the pool is full the oldest voice is cut to make room.
    pub fn start(&mut self, note: &str, velocity: f32) {
        if let Some(i) = self.voices.iter().position(|v| v.note == note) {
            self.voices.remove(i);
        }
        if self.voices.len() >= MAX_POLYPHONY {
            self.voices.remove(0);
        }
        let voice = self.make_voice(note, velocity);
        self.voices.push(voice);
    }

    /// Releases `note`. Unknown notes are ignored. The release time is
    /// read from the timbre selected now, not the one the voice started
    /// with.
    pub fn stop(&mut self, note: &str) {
        let Some(i) = self.voices.iter().position(|v| v.note == note) else {
            return;
        };
        let mut voice = self.voices.remove(i);
        let release = self.timbre.profile().release;
        voice.env.release(release, self.sample_rate);
        self.tails.push(voice);
    }

    pub fn active_len(&self) -> usize {
        self.voices.len()
    }

    /// Active notes, oldest first.
    pub fn active_notes(&self) -> Vec<&str> {
        self.voices.iter().map(|v| v.note.as_str()).collect()
    }

    pub fn stage_of(&self, note: &str) -> Option<Stage> {
        self.voices.iter().find(|v| v.note == note).map(|v| v.env.stage)
    }

    pub fn tail_count(&self) -> usize {
        self.tails.len()
    }

    /// True once nothing is sounding, release tails included.
    pub fn is_quiet(&self) -> bool {
        self.voices.is_empty() && self.tails.is_empty()
    }

    /// Fills `out` with mono frames: voice mix, headroom, highpass,
    /// lowpass, compressor, master volume.
    pub fn render(&mut self, out: &mut [f32]) {
        let volume = VOLUME_LEVELS[self.volume_step];
        for frame in out.iter_mut() {
            let mut mix = 0.0;
            for voice in self.voices.iter_mut().chain(self.tails.iter_mut()) {
                mix += voice.next_sample(self.sample_rate, &self.organ_wave);
            }
            let s = self.master_hp.process(mix * MIX_GAIN);
            let s = self.master_lp.process(s);
            let s = self.compressor.process(s);
            *frame = s * volume;
        }
        self.tails.retain(|v| !v.env.is_done());
    }

    fn make_voice(&mut self, note: &str, velocity: f32) -> Voice {
        let profile = self.timbre.profile();
        let vibrato = match self.timbre {
            Timbre::Organ => {
                if self.organ_wave.is_empty() {
                    self.organ_wave = build_organ_wave();
                }
                Some(Vibrato::default())
            }
            _ => None,
        };
        Voice {
            note:    note.to_string(),
            timbre:  self.timbre,
            freq:    pitch::freq_of(note),
            phase:   0.0,
            env:     Envelope::new(&profile, velocity, self.sample_rate),
            filter:  Biquad::lowpass(self.sample_rate, profile.filter_freq, profile.filter_q),
            vibrato,
        }
    }
}
