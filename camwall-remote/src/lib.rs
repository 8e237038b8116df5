//! # camwall remote
//!
//! Typed client for the two backend endpoints the camera grid calls:
//! `POST /update-last-access/{cctv_id}` before opening a single-camera view,
//! and `POST /start-detection` to kick off the detection job.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod mock;
pub mod protocol;

// Re-export main types
pub use client::{HttpRemoteApi, RemoteApi, RemoteConfig};
pub use mock::{MockRemoteApi, MockReply, RemoteCall};
pub use protocol::{
    focus_view_path, update_last_access_path, LastAccessRecord, LastAccessResponse,
    LOCAL_TIMESTAMP_FORMAT, START_DETECTION_PATH,
};
