//! Per-listener spatialized mixer (C7): selects eligible sources, applies
//! spatialization, and sums into a saturating stereo scratch buffer.
//!
//! One frame's worth of mixing touches every avatar-kind source as a
//! listener and every `should_mix` source as a contributor; the distance
//! coefficient is memoized per unordered source/listener pair across all
//! listeners in the frame (spec §4.6/§9), since it depends only on distance.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use crate::config::MixerConfig;
use crate::registry::SourceRegistry;
use crate::source::{SourceId, SourceKind, SourceState};
use crate::spatial::{self, GoodChannel, SpatialParams};
use crate::stats::MixerStats;

/// One listener's personalized stereo mix for this frame.
pub struct OutFrame {
    pub listener: SourceId,
    /// Interleaved `L, R, L, R, ...`, length `2 * samples_per_frame`.
    pub stereo_pcm: Vec<i16>,
}

/// Destination for completed frames. A `Vec<OutFrame>` implements this so
/// tests can collect output without a real network sink.
pub trait FrameSink {
    fn emit(&mut self, frame: OutFrame);
}

impl FrameSink for Vec<OutFrame> {
    fn emit(&mut self, frame: OutFrame) {
        self.push(frame);
    }
}

fn saturating_add(sample: &mut i16, contribution: f32) {
    let sum = *sample as i32 + contribution.round() as i32;
    *sample = sum.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
}

/// Index of the good/delayed channel slots for frame position `i` in an
/// interleaved `L, R` scratch buffer.
fn channel_indices(good_channel: GoodChannel, i: usize) -> (usize, usize) {
    match good_channel {
        GoodChannel::Left => (2 * i, 2 * i + 1),
        GoodChannel::Right => (2 * i + 1, 2 * i),
    }
}

/// Mixes `samples_per_frame` samples of `source`'s ring buffer into
/// `scratch` under `params`, per spec §4.6's per-sample algorithm. Reads via
/// `RingBuffer::index`, so the source's read cursor is untouched here — the
/// caller advances it once, after every listener has mixed this source.
fn mix_source_into(scratch: &mut [i16], source: &SourceState, params: &SpatialParams, samples_per_frame: usize) {
    let delay = params.delay;
    let a = params.attenuation;
    let weak = params.weak_ratio;

    for i in 0..samples_per_frame {
        if i < delay {
            let lookback = source.buffer.index(i as isize - delay as isize);
            let (_, delayed_idx) = channel_indices(params.good_channel, i);
            saturating_add(&mut scratch[delayed_idx], lookback as f32 * a * weak);
        }

        let cur = source.buffer.index(i as isize) as f32 * a;
        let (good_idx, _) = channel_indices(params.good_channel, i);
        saturating_add(&mut scratch[good_idx], cur);

        if i + delay < samples_per_frame {
            let (_, delayed_idx) = channel_indices(params.good_channel, i + delay);
            saturating_add(&mut scratch[delayed_idx], cur * weak);
        }
    }
}

/// Produces and emits one personalized frame per avatar-kind listener, then
/// advances the read cursor of every contributing source exactly once.
/// Callers run the eligibility gate (`crate::eligibility::evaluate`) over
/// every source before calling this.
pub fn mix_frame(registry: &mut SourceRegistry, config: &MixerConfig, stats: &MixerStats, sink: &mut impl FrameSink) {
    let samples_per_frame = config.samples_per_frame;
    let mut distance_cache: HashMap<(SourceId, SourceId), f32> = HashMap::new();

    let listener_ids: Vec<SourceId> =
        registry.iter().filter(|s| s.kind == SourceKind::Avatar).map(|s| s.id).collect();

    for listener_id in listener_ids {
        let (listener_pose, listener_loopback) = match registry.get(listener_id) {
            Some(l) => (l.pose, l.loopback),
            None => continue,
        };

        let mut scratch = vec![0i16; 2 * samples_per_frame];

        for source in registry.iter() {
            if !source.should_mix {
                continue;
            }

            if source.id == listener_id {
                if !listener_loopback {
                    continue;
                }
                mix_source_into(&mut scratch, source, &SpatialParams::identity(), samples_per_frame);
                continue;
            }

            let d = listener_pose.position.distance(&source.pose.position);
            let key = spatial::pair_key(source.id, listener_id);
            let c_d = *distance_cache.entry(key).or_insert_with(|| spatial::distance_coefficient(d, config));

            let params = spatial::spatialize_with_coefficient(
                &listener_pose,
                &source.pose,
                source.attenuation_ratio,
                c_d,
                config,
            );
            mix_source_into(&mut scratch, source, &params, samples_per_frame);
        }

        sink.emit(OutFrame { listener: listener_id, stereo_pcm: scratch });
        stats.frames_emitted.fetch_add(1, Ordering::Relaxed);
    }

    for source in registry.iter_mut() {
        if source.should_mix {
            source.buffer.shift_read(samples_per_frame as isize);
            source.stats.frames_mixed.fetch_add(1, Ordering::Relaxed);
            source.should_mix = false;
        }
    }
}
