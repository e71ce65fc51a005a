//! Ingest (C5): dispatch an inbound packet to its source's ring buffer.

use std::time::Instant;

use crate::config::MixerConfig;
use crate::registry::SourceRegistry;
use crate::source::{Pose, SourceId, SourceKind};
use crate::stats::MixerStats;

/// One inbound packet, after the external collaborator has stripped its
/// protocol header. PCM is little-endian signed 16-bit at the nominal
/// sample rate.
pub struct Packet {
    pub kind: SourceKind,
    pub source: SourceId,
    /// Present for avatar packets (sender's pose) and injector packets
    /// (the injector's pose).
    pub pose: Option<Pose>,
    /// Injector-only.
    pub attenuation_ratio: Option<f32>,
    pub pcm_bytes: Vec<u8>,
}

/// Converts little-endian PCM bytes to samples, silently truncating a
/// trailing odd byte (spec §4.4/§7(e)).
fn bytes_to_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Resolves or creates the packet's source, notifies its gap tracker, and
/// writes its PCM payload into the source's ring buffer.
pub fn ingest(
    registry: &mut SourceRegistry,
    config: &MixerConfig,
    stats: &MixerStats,
    now: Instant,
    packet: Packet,
) {
    if packet.pcm_bytes.len() % 2 != 0 {
        stats.malformed_packets.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        log::debug!("ingest: odd-length payload ({} bytes) from {:?}, dropping trailing byte", packet.pcm_bytes.len(), packet.source);
    }

    let source = registry.get_or_create_logged(packet.source, packet.kind, config, stats);

    source.tracker.on_frame_received(now);

    if let Some(pose) = packet.pose {
        source.pose = pose;
    }
    if let Some(ratio) = packet.attenuation_ratio {
        source.attenuation_ratio = ratio;
    }

    let samples = bytes_to_samples(&packet.pcm_bytes);
    source.buffer.write(&samples);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn ingest_creates_unknown_source_and_writes_samples() {
        let mut registry = SourceRegistry::new();
        let config = MixerConfig::default();
        let stats = MixerStats::default();
        let id = SourceId::Avatar(42);

        ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet {
                kind: SourceKind::Avatar,
                source: id,
                pose: None,
                attenuation_ratio: None,
                pcm_bytes: le_bytes(&[1, 2, 3, 4]),
            },
        );

        let source = registry.get(id).expect("source should have been created");
        assert_eq!(source.buffer.diff_last_write_next_output(), 4);
        assert_eq!(stats.snapshot().sources_created, 1);
    }

    #[test]
    fn odd_length_payload_truncates_trailing_byte() {
        let mut registry = SourceRegistry::new();
        let config = MixerConfig::default();
        let stats = MixerStats::default();
        let id = SourceId::Avatar(1);

        let mut bytes = le_bytes(&[1, 2, 3]);
        bytes.push(0xFF); // trailing odd byte

        ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet {
                kind: SourceKind::Avatar,
                source: id,
                pose: None,
                attenuation_ratio: None,
                pcm_bytes: bytes,
            },
        );

        let source = registry.get(id).unwrap();
        assert_eq!(source.buffer.diff_last_write_next_output(), 3);
        assert_eq!(stats.snapshot().malformed_packets, 1);
    }

    #[test]
    fn injector_stream_id_mismatch_creates_second_source() {
        let mut registry = SourceRegistry::new();
        let config = MixerConfig::default();
        let stats = MixerStats::default();

        ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet {
                kind: SourceKind::Injector,
                source: SourceId::Injector(*b"streamA\0"),
                pose: None,
                attenuation_ratio: Some(0.8),
                pcm_bytes: le_bytes(&[10, 20]),
            },
        );
        ingest(
            &mut registry,
            &config,
            &stats,
            Instant::now(),
            Packet {
                kind: SourceKind::Injector,
                source: SourceId::Injector(*b"streamB\0"),
                pose: None,
                attenuation_ratio: Some(0.5),
                pcm_bytes: le_bytes(&[30]),
            },
        );

        assert_eq!(registry.len(), 2);
        assert_eq!(stats.snapshot().sources_created, 2);
    }
}
