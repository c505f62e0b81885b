//! Records of training and evaluation runs.
//!
//! A [`Record`] is a set of key-value pairs written to a [`Recorder`] at the end
//! of each training or evaluation episode. Recorders decide where the values go:
//! [`BufferedRecorder`] keeps them in memory, [`NullRecorder`] drops them, and
//! `cyberbattle-tensorboard` writes them as tensorboard scalars.
//!
//! ```rust
//! use cyberbattle_core::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("steps_done", 120.0);
//! record.insert("training/total_reward", RecordValue::Scalar(37.0));
//! assert_eq!(record.get_scalar("steps_done").unwrap(), 120.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
