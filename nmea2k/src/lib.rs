//! NMEA2000 Protocol Library
//!
//! This library provides the receive side of an NMEA2000 gateway:
//! - CAN bus interface utilities and candump log replay
//! - NMEA2000 stream reader with fast packet assembly
//! - A data-driven message catalog describing PGN signal layouts
//! - Little-endian signal extraction with the NMEA2000 "not available" rules
//!
//! # Example
//!
//! ```no_run
//! use nmea2k::{CanBusSource, FrameSource, MessageCatalog, signal};
//!
//! let catalog = MessageCatalog::builtin();
//! let mut source = CanBusSource::open("can0").unwrap();
//!
//! while let Ok(Some(frame)) = source.read_frame() {
//!     if let Some(sd) = catalog.signal(frame.pgn(), "Latitude") {
//!         println!("{:?}", signal::decode(sd, &frame.data));
//!     }
//! }
//! ```

pub mod canbus;
pub mod candump;
pub mod catalog;
pub mod date_time;
pub mod frame_source;
pub mod identifier;
pub mod signal;
pub mod stream_reader;

pub use canbus::{open_can_socket_with_retry, CanBusSource};
pub use candump::{CandumpError, CandumpSource};
pub use catalog::{MessageCatalog, MessageCategory, MessageDescriptor, SignalDescriptor, SignalFormat, ValueType};
pub use date_time::N2kDateTime;
pub use frame_source::{FrameSource, RawFrame};
pub use signal::{SignalError, SignalValue};
pub use stream_reader::N2kStreamReader;
