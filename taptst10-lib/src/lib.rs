pub mod constants;
pub mod decoder;
pub mod device;
pub mod error;
pub mod packet;
pub mod report;
pub mod sample;
pub mod transport;


// Re-export the main entry points for easy access
pub use decoder::{Session, StreamDecoder, decode, read_history};
pub use device::TapTst10;
pub use error::{ProtocolError, TapError, TransportError};
pub use report::render;
pub use sample::{Sample, SampleSeries, Watt};
pub use transport::Transport;
