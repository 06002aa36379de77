use num::traits::ToPrimitive;
use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

/// The VM's opcode set.
///
/// Each instruction is a single opcode byte followed by zero, one, or two
/// operand bytes (see [`OperandKind`](enum.OperandKind.html) and
/// [`operand_kind`](fn.operand_kind.html)). Mnemonics parse to their matching
/// variant via [`EnumFromStr`](../util/trait.EnumFromStr.html), so the
/// assembler never needs a second name table.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive, EnumFromStr)]
pub enum Opcode {
    /// No effect.
    NOP,
    /// `running ← false` with success.
    HALT,
    /// Push an 8-bit immediate.
    PUSH,
    /// Discard the top of stack.
    POP,
    /// `v←pop; push v; push v`.
    DUP,
    /// Swap the top two stack cells.
    SWAP,
    /// `b←pop; a←pop; push (a+b) mod 256`.
    ADD,
    /// `b←pop; a←pop; push (a-b) mod 256`.
    SUB,
    /// `b←pop; a←pop; push (a*b) mod 256`.
    MUL,
    /// `b←pop; a←pop; push (a/b)`. Sets `DivisionByZero` if `b == 0`.
    DIV,
    /// `b←pop; a←pop; push (a%b)`. Sets `DivisionByZero` if `b == 0`.
    MOD,
    /// Unary: `v←pop; push (-v) mod 256`.
    NEG,
    /// `b←pop; a←pop; push (a & b)`.
    AND,
    /// `b←pop; a←pop; push (a | b)`.
    OR,
    /// `b←pop; a←pop; push (a ^ b)`.
    XOR,
    /// Unary: `v←pop; push (!v)`.
    NOT,
    /// `b←pop; a←pop; push (a << b) mod 256`; `0` if `b >= 8`.
    SHL,
    /// `b←pop; a←pop; push (a >> b)`; `0` if `b >= 8`.
    SHR,
    /// `b←pop; a←pop; push (a == b) as u8`.
    EQ,
    /// `b←pop; a←pop; push (a != b) as u8`.
    NEQ,
    /// `b←pop; a←pop; push (a > b) as u8`.
    GT,
    /// `b←pop; a←pop; push (a < b) as u8`.
    LT,
    /// `b←pop; a←pop; push (a >= b) as u8`.
    GTE,
    /// `b←pop; a←pop; push (a <= b) as u8`.
    LTE,
    /// Push `memory[addr16]`.
    LOAD,
    /// `v←pop; memory[addr16]←v`.
    STORE,
    /// `hi←pop; lo←pop; addr←(hi<<8)|lo; push memory[addr]`.
    LOAD_IND,
    /// `hi←pop; lo←pop; v←pop; memory[addr]←v`.
    STORE_IND,
    /// `PC ← addr16` (does not advance past its own operand).
    JMP,
    /// Advance past operand; `v←pop`; if `v == 0` then `PC ← addr16`.
    JZ,
    /// Advance past operand; `v←pop`; if `v != 0` then `PC ← addr16`.
    JNZ,
    /// Advance past operand; push return `PC` low byte then high byte; `PC ← addr16`.
    CALL,
    /// Pop high byte, pop low byte; `PC ← (hi<<8)|lo`.
    RET,
    /// Dispatch to host I/O for the `id8` operand (see [`SysId`](enum.SysId.html)).
    SYS,
}

/// The shape of an instruction's operand, if any.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandKind {
    /// No operand bytes.
    None,
    /// One immediate byte.
    Imm8,
    /// Two little-endian address bytes.
    Addr16,
}

/// Number of opcode values in the table (`0x00..=0x21`), used to size
/// [`INSTRUCTION_TABLE`](constant.INSTRUCTION_TABLE.html).
const OPCODE_COUNT: usize = 0x22;

/// `(opcode, operand kind)` indexed by the opcode's numeric value.
///
/// Centralising this here means the assembler and the VM decode loop agree
/// on operand widths bit-for-bit by construction, instead of maintaining
/// two parallel tables that can drift apart.
pub const INSTRUCTION_TABLE: [(Opcode, OperandKind); OPCODE_COUNT] = [
    (Opcode::NOP, OperandKind::None),
    (Opcode::HALT, OperandKind::None),
    (Opcode::PUSH, OperandKind::Imm8),
    (Opcode::POP, OperandKind::None),
    (Opcode::DUP, OperandKind::None),
    (Opcode::SWAP, OperandKind::None),
    (Opcode::ADD, OperandKind::None),
    (Opcode::SUB, OperandKind::None),
    (Opcode::MUL, OperandKind::None),
    (Opcode::DIV, OperandKind::None),
    (Opcode::MOD, OperandKind::None),
    (Opcode::NEG, OperandKind::None),
    (Opcode::AND, OperandKind::None),
    (Opcode::OR, OperandKind::None),
    (Opcode::XOR, OperandKind::None),
    (Opcode::NOT, OperandKind::None),
    (Opcode::SHL, OperandKind::None),
    (Opcode::SHR, OperandKind::None),
    (Opcode::EQ, OperandKind::None),
    (Opcode::NEQ, OperandKind::None),
    (Opcode::GT, OperandKind::None),
    (Opcode::LT, OperandKind::None),
    (Opcode::GTE, OperandKind::None),
    (Opcode::LTE, OperandKind::None),
    (Opcode::LOAD, OperandKind::Addr16),
    (Opcode::STORE, OperandKind::Addr16),
    (Opcode::LOAD_IND, OperandKind::None),
    (Opcode::STORE_IND, OperandKind::None),
    (Opcode::JMP, OperandKind::Addr16),
    (Opcode::JZ, OperandKind::Addr16),
    (Opcode::JNZ, OperandKind::Addr16),
    (Opcode::CALL, OperandKind::Addr16),
    (Opcode::RET, OperandKind::None),
    (Opcode::SYS, OperandKind::Imm8),
];

/// Looks up the operand kind for an opcode via [`INSTRUCTION_TABLE`](constant.INSTRUCTION_TABLE.html).
pub fn operand_kind(opcode: Opcode) -> OperandKind {
    INSTRUCTION_TABLE[enum_to_u32(opcode) as usize].1
}

#[inline]
pub fn enum_to_u32<T: ToPrimitive + Copy>(val: T) -> u32 {
    val.to_u32().unwrap()
}

/// Host I/O operation identifiers, dispatched through the `SYS` opcode.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive)]
pub enum SysId {
    Exit = 0x00,
    PrintChar = 0x01,
    ReadChar = 0x02,
    DrawPixel = 0x10,
    DrawLine = 0x11,
    FillRect = 0x12,
    Refresh = 0x13,
    PollKey = 0x20,
    GetKey = 0x21,
    PollMouse = 0x22,
    GetMouseX = 0x23,
    GetMouseY = 0x24,
    GetMouseB = 0x25,
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_round_trips_through_enum_from_str() {
        assert_eq!(Opcode::from_str("ADD").unwrap(), Opcode::ADD);
        assert_eq!(Opcode::from_str("LOAD_IND").unwrap(), Opcode::LOAD_IND);
        assert!(Opcode::from_str("NOPE").is_err());
    }

    #[test]
    fn operand_kinds_match_isa_table() {
        assert_eq!(operand_kind(Opcode::PUSH), OperandKind::Imm8);
        assert_eq!(operand_kind(Opcode::JMP), OperandKind::Addr16);
        assert_eq!(operand_kind(Opcode::ADD), OperandKind::None);
    }

    #[test]
    fn opcode_numeric_values_match_the_wire_format() {
        use num::traits::ToPrimitive;
        assert_eq!(Opcode::NOP.to_u32(), Some(0x00));
        assert_eq!(Opcode::NEG.to_u32(), Some(0x0B));
        assert_eq!(Opcode::NEQ.to_u32(), Some(0x13));
        assert_eq!(Opcode::SYS.to_u32(), Some(0x21));
    }
}
