mod ack;
mod motors;
mod playback;
mod presence;

pub use ack::*;
pub use motors::*;
pub use playback::*;
pub use presence::*;
