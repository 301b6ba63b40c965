//! Repository interfaces for the external durable store.
//!
//! Implementations (SQL, Redis, DynamoDB) live outside this crate; the mocks
//! exported here back the test suites and honor the same atomicity
//! contracts as a real store.

pub mod bounce;
pub mod challenge;
pub mod counter;
pub mod denylist;
pub mod device;
pub mod token;

pub use bounce::{BounceRepository, MockBounceRepository};
pub use challenge::{ChallengeRepository, MockChallengeRepository};
pub use counter::{CounterStore, MockCounterStore, WindowCount};
pub use denylist::{DenylistRepository, MockDenylistRepository};
pub use device::{DeviceRepository, MockDeviceRepository};
pub use token::{MockRedeemedTokenRepository, RedeemedTokenRepository};
