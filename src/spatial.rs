//! Spatialization math: distance attenuation, off-axis attenuation,
//! inter-aural delay and amplitude ratio. All geometry is in the
//! horizontal `(x, z)` plane; `y` only contributes to distance.

use crate::config::MixerConfig;
use crate::source::{Pose, Vec3};

/// Which stereo channel is the "good" (near-ear) channel for a given
/// relative angle. `alpha == 0` deterministically picks the left channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodChannel {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialParams {
    /// Composite attenuation `A = c_d * attenuation_ratio * c_o`.
    pub attenuation: f32,
    /// Inter-aural delay, in samples.
    pub delay: usize,
    /// Weak-ear amplitude ratio, `1 - 0.5 * |sin(alpha)|`.
    pub weak_ratio: f32,
    pub good_channel: GoodChannel,
}

impl SpatialParams {
    /// Identity parameters for a listener hearing themselves.
    pub fn identity() -> Self {
        Self { attenuation: 1.0, delay: 0, weak_ratio: 1.0, good_channel: GoodChannel::Left }
    }
}

/// Smooth roll-off attenuation coefficient for distance `d`. `1` for very
/// small `d`, decreasing above the reference distance `0.3 / R`.
pub fn distance_coefficient(d: f32, config: &MixerConfig) -> f32 {
    let r = config.distance_ratio;
    let exponent = (r * d).log(3.0) - 1.0;
    0.5f32.powf(exponent).min(1.0)
}

/// Absolute bearing from the listener to the source, in `(-180, 180]`
/// degrees, per spec §4.6's quadrant table.
pub fn absolute_angle(listener: &Vec3, source: &Vec3) -> f32 {
    let dx = source.x - listener.x;
    let dz = source.z - listener.z;
    let theta = dz.abs().atan2(dx.abs()).to_degrees();

    // Ties resolve to the "yes" branch of each comparison, matching the
    // worked co-located example in spec §8 Sc.3 (the table's literal
    // strict-`>` reading would instead fall through to the "no,no" row).
    match (source.x >= listener.x, source.z >= listener.z) {
        (true, true) => -90.0 + theta,
        (true, false) => -90.0 - theta,
        (false, true) => 90.0 - theta,
        (false, false) => 90.0 + theta,
    }
}

/// Wraps an angle (in degrees) into `(-180, 180]`.
pub fn wrap_angle(mut angle: f32) -> f32 {
    angle = angle % 360.0;
    if angle <= -180.0 {
        angle += 360.0;
    } else if angle > 180.0 {
        angle -= 360.0;
    }
    angle
}

/// Off-axis attenuation of the source: `1.0` when it faces the listener
/// head-on, weakening down to `config.max_off_axis_atten` at perpendicular
/// (and beyond).
pub fn off_axis_coefficient(beta: f32, config: &MixerConfig) -> f32 {
    let floor = config.max_off_axis_atten;
    let span = 1.0 - floor;
    let ratio = (beta.abs() / 90.0).min(1.0);
    (1.0 - span * ratio).max(floor)
}

/// Computes the full set of spatialization parameters for mixing `source`
/// into `listener`'s personalized frame.
pub fn spatialize(
    listener: &Pose,
    source_pose: &Pose,
    source_attenuation_ratio: f32,
    config: &MixerConfig,
) -> SpatialParams {
    let d = listener.position.distance(&source_pose.position);
    let c_d = distance_coefficient(d, config);
    spatialize_with_coefficient(listener, source_pose, source_attenuation_ratio, c_d, config)
}

/// As [`spatialize`], but takes an already-computed distance coefficient —
/// the mixer memoizes `c_d` per unordered source/listener pair within a
/// frame, since distance (unlike angle) is symmetric.
pub fn spatialize_with_coefficient(
    listener: &Pose,
    source_pose: &Pose,
    source_attenuation_ratio: f32,
    c_d: f32,
    config: &MixerConfig,
) -> SpatialParams {
    let abs_angle = absolute_angle(&listener.position, &source_pose.position);
    let alpha = wrap_angle(abs_angle - listener.bearing);
    let beta = wrap_angle(abs_angle - source_pose.bearing);

    let c_o = off_axis_coefficient(beta, config);
    let attenuation = c_d * source_attenuation_ratio * c_o;

    let alpha_rad = alpha.to_radians();
    let k = alpha_rad.sin().abs();
    let delay = (config.phase_delay_at_90 * k).round() as usize;
    let weak_ratio = 1.0 - (1.0 - config.phase_amp_ratio_at_90) * k;

    let good_channel = if alpha > 0.0 { GoodChannel::Right } else { GoodChannel::Left };

    SpatialParams { attenuation, delay, weak_ratio, good_channel }
}

/// Frame-local memoization key for an unordered pair (distance coefficients,
/// being symmetric in source/listener, are keyed this way).
pub fn pair_key<T: PartialOrd>(a: T, b: T) -> (T, T) {
    if a <= b { (a, b) } else { (b, a) }
}
