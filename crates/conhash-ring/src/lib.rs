pub mod hash;
pub mod manager;
pub mod membership;
pub mod ring;
pub mod stats;

pub use manager::{KeyMove, RingManager, moved_keys};
pub use membership::Membership;
pub use ring::HashRing;
pub use stats::{DistributionReport, DistributionStats, RingInfo, UniformityGrade};
