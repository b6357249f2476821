pub mod noise;
pub mod waveform;

pub use self::noise::*;
pub use self::waveform::*;
