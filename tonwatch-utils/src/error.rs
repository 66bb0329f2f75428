use thiserror::Error;

/// Failures of the text decoders and the address codec. Each variant carries
/// enough of the offending input to diagnose a bad lite-client response.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("structural decode failed: {reason}; input: {text:?}")]
    Structural { reason: String, text: String },

    #[error("result list decode failed: {reason}; input: {text:?}")]
    ResultList { reason: String, text: String },

    #[error("invalid length of hexadecimal address: expected 64 characters, got {0}")]
    InvalidAddressLength(usize),

    #[error("decimal value does not fit a 256-bit address")]
    AddressRange,

    #[error("invalid hexadecimal address: {0:?}")]
    AddressHex(String),
}
