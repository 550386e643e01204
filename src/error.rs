//! Error types for CPCL label operations.
//!
//! Decoding never fails on a bad line; the variants here cover invalid
//! input handed to the encoder, printer communication and file access.

use crate::ItemId;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid page geometry.
    ///
    /// Paper size must be positive, the margin non-negative and at least
    /// one copy must be requested.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// An item handed to the encoder breaks a layout invariant.
    #[error("Invalid item {id}: {reason}")]
    InvalidItem { id: ItemId, reason: String },

    /// USB communication error.
    ///
    /// Wraps underlying rusb errors for device communication issues,
    /// timeouts, or permission problems.
    #[error(transparent)]
    UsbError(#[from] rusb::Error),

    /// Printer device is not connected or not responding.
    #[error("Device is offline")]
    DeviceOffline,

    #[error("Can't read device list, permission issue ?")]
    DeviceListNotReadable,

    #[error("Device is missing endpoint")]
    MissingEndpoint,

    #[error("Printer accepted {0} bytes of the job")]
    InvalidResponse(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
