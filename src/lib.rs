//! Stateful command protocol for driving long-lived visual object tracking
//! sessions from a stateless, call-by-call host.
//!
//! A host issues commands (`create`, `initialize`, `update`, `set_region`,
//! `remove`) with column-major array arguments. The [`Dispatcher`] decodes
//! them into row-major frames and 2x4 corner regions, runs the matching
//! session transition and encodes the resulting region back for the host.
//!
//! # Example
//!
//! ```no_run
//! use trackcmd_rs::{Dispatcher, HostArray, Region, encode_region};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.call_command("create", &[HostArray::text("config")], 1);
//!
//! let image = HostArray::uint8(&[100, 100], vec![0; 100 * 100]).unwrap();
//! let region = encode_region(&Region::from_tlbr(10.0, 10.0, 50.0, 50.0));
//! let reply = dispatcher.call_command("initialize", &[image, region], 2);
//! assert_eq!(reply.status, 1.0);
//! ```

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod marshal;
pub mod session;

pub use config::{ConfigSource, JsonConfigSource, SessionConfig};
pub use dispatch::{Command, Dispatcher, DispatcherBuilder, Reply};
pub use engine::{
    BuiltinFactory, EngineFactory, FramePipeline, InputKind, NoSelector, ProcessedFrame,
    RegionSelector, TrackerEngine,
};
pub use error::{AcquisitionError, CommandError, ConfigError, EngineError, FormatError, Result};
pub use marshal::{Frame, HostArray, Region, decode_image, decode_region, encode_region};
pub use session::{SessionRegistry, SessionState, TrackerSession};
