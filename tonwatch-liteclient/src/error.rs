use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiteClientError {
    #[error("lite-client timed out running `{cmd}`")]
    Timeout { cmd: String },

    #[error("lite-client error running `{cmd}`: {stderr}")]
    Stderr { cmd: String, stderr: String },

    #[error("failed to run lite-client binary: {0}")]
    Spawn(#[from] std::io::Error),
}
