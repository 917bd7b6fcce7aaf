// Error handling framework: one typed enum per subsystem.

use thiserror::Error;

/// Schedule persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read schedule file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Schedule file {path} is not valid JSON: {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode schedule: {0}")]
    EncodeFailed(#[source] serde_json::Error),

    #[error("Failed to write schedule file {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Timer registration errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Invalid weekly trigger for timer '{name}': {reason}")]
    InvalidTrigger { name: String, reason: String },
}

/// Command validation errors, recovered locally with a corrective reply.
/// No state mutation happens when one of these is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("add command requires a day, a time and a name")]
    MissingAddArguments,

    #[error("unknown day token: {0}")]
    UnknownDay(String),

    #[error("invalid time: {0}")]
    InvalidTime(String),

    #[error("lecture name is missing")]
    MissingName,

    #[error("remove command requires exactly one number")]
    MissingRemoveArguments,

    #[error("not a positive integer: {0}")]
    InvalidIndex(String),

    #[error("no lecture at position {0}")]
    NoSuchLecture(usize),
}

/// Outbound message delivery errors
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),
}
