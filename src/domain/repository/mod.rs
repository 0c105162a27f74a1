pub mod duration;

pub use duration::DurationRepository;
