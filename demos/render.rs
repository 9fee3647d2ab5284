// Renders a short phrase through the engine and writes it to riff.wav.

use hound::{SampleFormat, WavSpec, WavWriter};
use klavier::config::Config;
use klavier::controller::DEFAULT_VELOCITY;
use klavier::engine::{Engine, Timbre};
use klavier::mapper;

const SAMPLE_RATE: u32 = 44_100;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    simple_logging::log_to_stderr(log::LevelFilter::Info);

    let mut engine = Engine::new(SAMPLE_RATE as f32);
    engine.set_timbre(Timbre::Organ);

    let cfg = Config::default(); // Flex, C Major, one octave

    let spec = WavSpec {
        channels:        1,
        sample_rate:     SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format:   SampleFormat::Float,
    };
    let mut wav = WavWriter::create("riff.wav", spec)?;
    let mut buf = vec![0.0f32; SAMPLE_RATE as usize / 2];

    // Walk up the bottom row: C E G B C.
    for key in ['z', 'c', 'b', 'm', ','] {
        let Some(mapping) = mapper::map_key(key, false, &cfg) else {
            continue;
        };
        log::info!("key {:?} -> {}", key, mapping.play);
        engine.start(&mapping.play, DEFAULT_VELOCITY);
        engine.render(&mut buf);
        for &s in &buf {
            wav.write_sample(s)?;
        }
        engine.stop(&mapping.play);
    }

    // Let the last release ring out.
    while !engine.is_quiet() {
        engine.render(&mut buf);
        for &s in &buf {
            wav.write_sample(s)?;
        }
    }

    wav.finalize()?;
    Ok(())
}
