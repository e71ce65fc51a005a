//! Synthetic mixer demo.
//!
//! Feeds two avatars a 440Hz test tone each, at slightly different
//! positions, and runs the cadence loop for a few seconds, printing
//! per-listener RMS so you can see the spatialization and mixing pipeline
//! moving frames end to end without a real network socket.
//!
//! Usage: cargo run --example run_mixer

use std::time::Instant;

use vox_mixer::cadence::Cadence;
use vox_mixer::config::MixerConfig;
use vox_mixer::eligibility;
use vox_mixer::ingest::{self, Packet};
use vox_mixer::mixer::{mix_frame, FrameSink, OutFrame};
use vox_mixer::registry::SourceRegistry;
use vox_mixer::source::{Pose, SourceId, SourceKind, Vec3};
use vox_mixer::stats::MixerStats;

struct ToneGenerator {
    phase: f32,
    phase_increment: f32,
    amplitude: i16,
}

impl ToneGenerator {
    fn new(frequency: f32, sample_rate: f32, amplitude: i16) -> Self {
        Self { phase: 0.0, phase_increment: 2.0 * std::f32::consts::PI * frequency / sample_rate, amplitude }
    }

    fn fill(&mut self, buf: &mut [i16]) {
        for sample in buf.iter_mut() {
            *sample = (self.phase.sin() * self.amplitude as f32) as i16;
            self.phase += self.phase_increment;
        }
    }
}

fn le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

struct PrintingSink;

impl FrameSink for PrintingSink {
    fn emit(&mut self, frame: OutFrame) {
        let sum_sq: i64 = frame.stereo_pcm.iter().map(|&s| (s as i64) * (s as i64)).sum();
        let rms = ((sum_sq as f64) / frame.stereo_pcm.len() as f64).sqrt();
        println!("listener {:?}: rms={:.1}", frame.listener, rms);
    }
}

fn main() {
    env_logger::init();

    let config = MixerConfig::default();
    config.validate().expect("default config is valid");

    let mut registry = SourceRegistry::new();
    let stats = MixerStats::default();

    let a = SourceId::Avatar(1);
    let b = SourceId::Avatar(2);
    let mut tone_a = ToneGenerator::new(440.0, config.sample_rate as f32, 8000);
    let mut tone_b = ToneGenerator::new(220.0, config.sample_rate as f32, 8000);

    let pose_a = Pose { position: Vec3 { x: 0.0, y: 0.0, z: 0.0 }, bearing: 0.0 };
    let pose_b = Pose { position: Vec3 { x: 2.0, y: 0.0, z: 1.0 }, bearing: 180.0 };

    let jitter_samples = config.jitter_samples();
    let mut cadence = Cadence::new(Instant::now(), config.frame_duration());
    let mut sink = PrintingSink;

    // Prime both sources with a couple of frames before the loop starts, so
    // the startup jitter cushion (spec §4.5) clears quickly.
    for _ in 0..2 {
        let mut buf = vec![0i16; config.samples_per_frame];
        tone_a.fill(&mut buf);
        ingest::ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet { kind: SourceKind::Avatar, source: a, pose: Some(pose_a), attenuation_ratio: None, pcm_bytes: le_bytes(&buf) },
        );
        tone_b.fill(&mut buf);
        ingest::ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet { kind: SourceKind::Avatar, source: b, pose: Some(pose_b), attenuation_ratio: None, pcm_bytes: le_bytes(&buf) },
        );
    }

    for frame_n in 0..200 {
        let mut buf = vec![0i16; config.samples_per_frame];
        let now = Instant::now();

        tone_a.fill(&mut buf);
        ingest::ingest(
            &mut registry,
            &config,
            &stats,
            now,
            Packet { kind: SourceKind::Avatar, source: a, pose: Some(pose_a), attenuation_ratio: None, pcm_bytes: le_bytes(&buf) },
        );
        tone_b.fill(&mut buf);
        ingest::ingest(
            &mut registry,
            &config,
            &stats,
            now,
            Packet { kind: SourceKind::Avatar, source: b, pose: Some(pose_b), attenuation_ratio: None, pcm_bytes: le_bytes(&buf) },
        );

        for source in registry.iter_mut() {
            eligibility::evaluate(source, config.samples_per_frame, jitter_samples);
        }

        mix_frame(&mut registry, &config, &stats, &mut sink);

        if frame_n % 20 == 0 {
            let s = stats.snapshot();
            println!(
                "frame {frame_n}: frames_emitted={} cadence_slips={} sources_created={}",
                s.frames_emitted, s.cadence_slips, s.sources_created
            );
        }

        cadence.tick(Instant::now(), &stats);
    }
}
