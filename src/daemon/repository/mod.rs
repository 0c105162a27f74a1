pub mod duration;

pub use duration::DurationConfiguration;
