use thiserror::Error;

pub type Result<T> = std::result::Result<T, GreeterError>;

#[derive(Error, Debug)]
pub enum GreeterError {
    /// Greeting (including its terminator) does not fit into the greeting buffer
    #[error("greeting of {len} bytes exceeds the limit of {max} bytes")]
    GreetingTooLong { len: usize, max: usize },

    #[error("greeting is not valid UTF-8")]
    InvalidEncoding(#[from] std::string::FromUtf8Error),

    #[error("rank {rank} is outside of a process group of size {size}")]
    RankOutOfRange { rank: u32, size: u32 },

    /// The channel to or from `peer` was closed before the message got through
    #[error("lost connection to process #{peer}")]
    Disconnected { peer: u32 },

    /// The message passing runtime could not be brought up
    #[error("message passing runtime: {0}")]
    Runtime(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
