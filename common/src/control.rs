use thiserror::Error;

/// Failure reported by the control primitive itself (the ioctl or its stand-in).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("control primitive returned error code {code}")]
pub struct PrimitiveError {
    /// OS error number, or `-1` when none is available.
    pub code: i32,
}

impl From<std::io::Error> for PrimitiveError {
    fn from(err: std::io::Error) -> Self {
        Self {
            code: err.raw_os_error().unwrap_or(-1),
        }
    }
}

/// The narrow, blocking channel into the radio's private command handler.
///
/// Every call carries both buffers; the device decides which side to use from the
/// direction `flags`. Implementations must not add their own timeout: the call
/// blocks until the device answers or the OS gives up.
pub trait ControlPrimitive: Send {
    fn transact(
        &mut self,
        opcode: u32,
        flags: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), PrimitiveError>;
}
