pub mod pool;
pub mod protocol;
pub mod relationship;
pub mod snapshot;

pub use pool::{ApyPoint, ApyStability, IlRisk, Pool, RiskBreakdown, RiskLevel, Trend};
pub use protocol::Protocol;
pub use relationship::{Relationship, RelationshipType};
pub use snapshot::{Snapshot, SnapshotMetadata, SnapshotStore};
