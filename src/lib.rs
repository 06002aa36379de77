extern crate num;
#[macro_use]
extern crate num_derive;

pub mod constants;
pub mod error;
pub mod host;
pub mod isa;
pub mod memory;
pub mod processor;

pub use error::ErrorKind;
pub use host::{HostIo, RecordingHost};
pub use isa::{Opcode, OperandKind, SysId, INSTRUCTION_TABLE};
pub use memory::Memory;
pub use processor::{ExitReason, Vm};
