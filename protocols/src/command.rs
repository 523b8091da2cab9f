use std::fmt;

use thiserror::Error;

/// Direction flag: the device consumes the input buffer.
pub const PRIVATE_CMD_SET_FLAG: u32 = 0x01;
/// Direction flag: the device fills the output buffer.
pub const PRIVATE_CMD_GET_FLAG: u32 = 0x02;
/// Largest input payload the private command handler accepts.
pub const MAX_PAYLOAD_LEN: usize = 4096;

/// Vendor opcodes understood by the radio. The high half selects the firmware
/// module, the low half the parameter within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    DriverStart = 0x0001_0002,
    DriverStop = 0x0001_0003,
    MacAddress = 0x0002_0001,
    StartAppScan = 0x0003_0001,
    Rssi = 0x0004_0001,
    PowerModeSet = 0x0005_0001,
    PowerModeGet = 0x0005_0002,
    CoexSetEnable = 0x0006_0001,
    CoexGetConfig = 0x0006_0002,
    AddRxDataFilter = 0x0007_0001,
    RemoveRxDataFilter = 0x0007_0002,
    EnableRxDataFilters = 0x0007_0003,
    RxDataFilterStatistics = 0x0007_0004,
}

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Opcode::DriverStart,
        Opcode::DriverStop,
        Opcode::MacAddress,
        Opcode::StartAppScan,
        Opcode::Rssi,
        Opcode::PowerModeSet,
        Opcode::PowerModeGet,
        Opcode::CoexSetEnable,
        Opcode::CoexGetConfig,
        Opcode::AddRxDataFilter,
        Opcode::RemoveRxDataFilter,
        Opcode::EnableRxDataFilters,
        Opcode::RxDataFilterStatistics,
    ];

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.code() == code)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:#x})", self, self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("{0} requires a non-empty input payload")]
    EmptyPayload(Opcode),
    #[error("{opcode} payload of {len} bytes exceeds {MAX_PAYLOAD_LEN}")]
    PayloadTooLarge { opcode: Opcode, len: usize },
    #[error("{0} requires a non-empty output buffer")]
    EmptyOutput(Opcode),
}

/// One private command, tagged by direction.
///
/// A set command only carries input, a get command only an output buffer, so
/// the pairing the device relies on cannot be violated by the caller.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandDescriptor<'a> {
    Set { opcode: Opcode, payload: Vec<u8> },
    Get { opcode: Opcode, output: &'a mut [u8] },
}

impl<'a> CommandDescriptor<'a> {
    pub fn set(opcode: Opcode, payload: Vec<u8>) -> Result<Self, DescriptorError> {
        if payload.is_empty() {
            return Err(DescriptorError::EmptyPayload(opcode));
        }
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(DescriptorError::PayloadTooLarge {
                opcode,
                len: payload.len(),
            });
        }
        Ok(Self::Set { opcode, payload })
    }

    pub fn get(opcode: Opcode, output: &'a mut [u8]) -> Result<Self, DescriptorError> {
        if output.is_empty() {
            return Err(DescriptorError::EmptyOutput(opcode));
        }
        Ok(Self::Get { opcode, output })
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Set { opcode, .. } | Self::Get { opcode, .. } => *opcode,
        }
    }

    pub fn flags(&self) -> u32 {
        match self {
            Self::Set { .. } => PRIVATE_CMD_SET_FLAG,
            Self::Get { .. } => PRIVATE_CMD_GET_FLAG,
        }
    }

    /// Splits the descriptor into the `(input, output)` pair the primitive takes.
    /// The unused side is always empty.
    pub fn buffers(&mut self) -> (&[u8], &mut [u8]) {
        match self {
            Self::Set { payload, .. } => (payload.as_slice(), &mut []),
            Self::Get { output, .. } => (&[], &mut **output),
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
