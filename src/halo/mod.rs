//! Halo exchange: per-direction windows, participation, buffers and the
//! exchange round itself.

pub mod buffers;
pub mod exchange;
pub mod geometry;
pub mod participation;
pub mod plan;

pub use buffers::{BufferStats, HaloBuffers, buffer_len};
pub use exchange::{HaloExchange, pack_window, unpack_window};
pub use geometry::{DirectionGeometry, Window, direction_geometry};
pub use participation::{Participation, resolve};
pub use plan::{DirectionPlan, HaloPlan};
