//! Spatialized voice mixing core for a networked virtual environment.
//!
//! Avatars stream mono microphone audio; injector sources stream
//! synthesized or pre-recorded audio. Each frame, every avatar-kind
//! listener gets a personalized stereo mix that positions every other
//! eligible source in 3D space relative to the listener's pose and, by
//! default, excludes the listener's own voice.
//!
//! The crate owns none of: network I/O, peer discovery, packet framing,
//! entity/physics state, configuration loading, or logging backends. A
//! host process drives it by feeding [`ingest::Packet`]s in, running
//! [`eligibility::evaluate`] and [`mixer::mix_frame`] on its own cadence
//! (paced by [`cadence::Cadence`]), and implementing [`mixer::FrameSink`]
//! to receive [`mixer::OutFrame`]s.

pub mod cadence;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod gap;
pub mod ingest;
pub mod mixer;
pub mod registry;
pub mod ring;
pub mod source;
pub mod spatial;
pub mod stats;

pub use config::MixerConfig;
pub use error::ConfigError;
pub use ingest::Packet;
pub use mixer::{FrameSink, OutFrame};
pub use registry::{SharedRegistry, SourceRegistry};
pub use source::{ListenerId, Pose, SourceId, SourceKind, Vec3};
