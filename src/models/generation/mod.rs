pub mod params;
pub mod sampling;
pub mod seed;

pub use params::{DecodingParameters, ParameterOverrides};
pub use sampling::LogitsProcessor;
pub use seed::{derive_seed, ScopedRng, SeedController};
