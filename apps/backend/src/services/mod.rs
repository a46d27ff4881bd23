pub mod registry;

pub use registry::{MatchRegistry, MatchUpdate, RegistryStats};
