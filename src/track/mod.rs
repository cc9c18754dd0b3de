pub mod model;

pub use model::{RawSample, TrackModel};
