//! Two-pass assembler for [tsvm](../tsvm/index.html)'s mnemonic assembly
//! language.
//!
//! A program is a sequence of lines. Each line may start with `label:`,
//! may contain one instruction, and may end with a `;` comment; any of
//! these may be absent, so blank lines and comment-only lines are fine.
//! An instruction is a mnemonic (matched case-insensitively against the
//! [`Opcode`](../tsvm/isa/enum.Opcode.html) table) followed by its operand,
//! if the opcode takes one: an immediate byte for `PUSH`/`SYS`, or a
//! 16-bit address for `LOAD`/`STORE`/`JMP`/`JZ`/`JNZ`/`CALL` — written as a
//! number (`0x`-prefixed hex or decimal) or a label name.
//!
//! Assembly is a single pass: each instruction is emitted as soon as it is
//! parsed, with forward label references emitted as placeholder zero bytes
//! and patched once every label in the source has been seen. An unknown
//! mnemonic or an out-of-range operand aborts immediately with no output.
//! An undefined label is reported the same way, but since every other byte
//! of the image is already correct by the time patching runs, [`assemble`]
//! hands back the best-effort image (unresolved references left as the
//! zero placeholder bytes) alongside the error, so a caller can still write
//! it to disk before exiting non-zero.

mod error;
mod labels;
mod parser;

use error::{AssembleError, ParseError};
pub use error::{Error, Result};
use labels::Assembler;
use parser::{AsmParser, Rule};
use pest::iterators::Pair;
use pest::Parser;
use std::str::FromStr;
use tsvm::isa::{operand_kind, OperandKind, Opcode};

/// One assembled instruction's provenance, for diagnostics and tooling: the
/// source line it started on and how many source lines it spans (always `1`
/// in this line-oriented grammar, but kept distinct from `start_line` so a
/// disassembler or debugger built on top of this core doesn't have to assume
/// that).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceMapItem {
    pub start_line: u32,
    pub line_count: u32,
}

pub type SourceMap = Vec<SourceMapItem>;

/// Assembles `source` into a flat binary image (no header, no magic) ready
/// to be loaded directly at address 0.
///
/// On success, or on an undefined-label error, the first element of the
/// `Err` tuple's companion `Vec<u8>` (resp. the `Ok` tuple's first element)
/// is the assembled image; every other error returns an empty image, since
/// nothing past the failing line was ever emitted.
pub fn assemble(source: &str) -> std::result::Result<(Vec<u8>, SourceMap), (Error, Vec<u8>)> {
    let mut pairs = match AsmParser::parse(Rule::program, source).map_err(ParseError::from) {
        Ok(pairs) => pairs,
        Err(err) => return Err((err.into(), Vec::new())),
    };
    let program = pairs.next().unwrap();

    let mut asm = Assembler::new();
    let mut source_map = SourceMap::new();

    for (line_no, line) in program.into_inner().enumerate() {
        if line.as_rule() != Rule::line {
            continue; // EOI
        }
        let source_line = line_no + 1;
        let offset_before = asm.here();
        if let Err(err) = assemble_line(&mut asm, line, source_line) {
            return Err((err, Vec::new()));
        }
        if asm.here() != offset_before {
            source_map.push(SourceMapItem {
                start_line: source_line as u32,
                line_count: 1,
            });
        }
    }

    if let Err((name, line)) = asm.resolve() {
        // Every patch location not touched by this failure already holds
        // its resolved address; only the unresolved ones are left as the
        // zero bytes emitted during the first pass.
        return Err((AssembleError::UndefinedLabel(name, line).into(), asm.output));
    }

    if asm.output.len() > u16::max_value() as usize {
        return Err((AssembleError::ProgramTooLarge(asm.output.len()).into(), Vec::new()));
    }

    Ok((asm.output, source_map))
}

fn assemble_line<'i>(
    asm: &mut Assembler<'i>,
    line: Pair<'i, Rule>,
    source_line: usize,
) -> Result<()> {
    for part in line.into_inner() {
        match part.as_rule() {
            Rule::label_def => {
                let name = part.into_inner().next().unwrap().as_str();
                asm.define_label(name)
                    .map_err(|name| AssembleError::DuplicateLabel(name, source_line))?;
            }
            Rule::instruction => assemble_instruction(asm, part, source_line)?,
            _ => unreachable!(),
        }
    }
    Ok(())
}

fn assemble_instruction<'i>(
    asm: &mut Assembler<'i>,
    instruction: Pair<'i, Rule>,
    source_line: usize,
) -> Result<()> {
    let mut parts = instruction.into_inner();
    let mnemonic_pair = parts.next().unwrap();
    let mnemonic = mnemonic_pair.as_str().to_ascii_uppercase();

    let opcode = Opcode::from_str(&mnemonic)
        .map_err(|_| AssembleError::UnknownMnemonic(mnemonic_pair.as_str().to_owned(), source_line))?;

    asm.emit_byte(tsvm::isa::enum_to_u32(opcode) as u8);

    match operand_kind(opcode) {
        OperandKind::None => {}
        OperandKind::Imm8 => {
            let operand = parts.next().unwrap();
            let value = parse_immediate(&operand, source_line)?;
            asm.emit_byte(value as u8);
        }
        OperandKind::Addr16 => {
            let operand = parts.next().unwrap();
            emit_address_operand(asm, operand, source_line)?;
        }
    }

    Ok(())
}

fn emit_address_operand<'i>(
    asm: &mut Assembler<'i>,
    operand: Pair<'i, Rule>,
    source_line: usize,
) -> Result<()> {
    let inner = operand.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::identifier => asm.emit_label_ref(inner.as_str(), source_line),
        Rule::number => {
            let value = parse_number(inner.as_str(), source_line)?;
            if !(0..=0xFFFF).contains(&value) {
                return Err(AssembleError::OperandOutOfRange(value, source_line).into());
            }
            asm.emit_word(value as u16);
        }
        _ => unreachable!(),
    }
    Ok(())
}

fn parse_immediate(operand: &Pair<Rule>, source_line: usize) -> Result<i64> {
    let inner = operand.clone().into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::number => {
            let value = parse_number(inner.as_str(), source_line)?;
            if !(-128..=255).contains(&value) {
                return Err(AssembleError::OperandOutOfRange(value, source_line).into());
            }
            Ok(value)
        }
        Rule::identifier => Err(AssembleError::OperandOutOfRange(0, source_line).into()),
        _ => unreachable!(),
    }
}

fn parse_number(text: &str, source_line: usize) -> Result<i64> {
    if let Some(hex) = text.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else {
        text.parse::<i64>()
    }
    .map_err(|_| ParseError::Number(text.to_owned(), source_line).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembles_push_add_halt_in_order() {
        let (image, _) = assemble("PUSH 2\nPUSH 3\nADD\nHALT").unwrap();
        assert_eq!(image, vec![0x02, 2, 0x02, 3, 0x06, 0x01]);
    }

    #[test]
    fn mnemonics_are_case_insensitive() {
        let (image, _) = assemble("push 2\nhalt").unwrap();
        assert_eq!(image, vec![0x02, 2, 0x01]);
    }

    #[test]
    fn hex_and_decimal_immediates_agree() {
        let (hex, _) = assemble("PUSH 0x2A\nHALT").unwrap();
        let (dec, _) = assemble("PUSH 42\nHALT").unwrap();
        assert_eq!(hex, dec);
    }

    #[test]
    fn forward_label_reference_is_patched_to_the_right_address() {
        // JMP later; later: HALT -- "later" is at offset 3.
        let (image, _) = assemble("JMP later\nlater: HALT").unwrap();
        assert_eq!(image, vec![0x1C, 0x03, 0x00, 0x01]);
    }

    #[test]
    fn backward_label_reference_resolves_without_patching() {
        // top: NOP; JMP top -- "top" is at offset 0.
        let (image, _) = assemble("top: NOP\nJMP top").unwrap();
        assert_eq!(image, vec![0x00, 0x1C, 0x00, 0x00]);
    }

    #[test]
    fn undefined_label_is_a_fatal_error_with_best_effort_output() {
        let (err, image) = assemble("JMP nowhere\nHALT").unwrap_err();
        assert!(matches!(
            err,
            Error::Assemble(AssembleError::UndefinedLabel(ref name, 1)) if name == "nowhere"
        ));
        // JMP's opcode byte was emitted before the unresolved reference;
        // only the patch location is left as the zero placeholder.
        assert_eq!(image, vec![0x1C, 0x00, 0x00, 0x01]);
    }

    #[test]
    fn duplicate_label_is_a_fatal_error() {
        let (err, image) = assemble("top: NOP\ntop: HALT").unwrap_err();
        assert!(matches!(
            err,
            Error::Assemble(AssembleError::DuplicateLabel(ref name, 2)) if name == "top"
        ));
        assert!(image.is_empty());
    }

    #[test]
    fn unknown_mnemonic_is_a_fatal_error() {
        let (err, image) = assemble("FROBNICATE").unwrap_err();
        assert!(matches!(
            err,
            Error::Assemble(AssembleError::UnknownMnemonic(ref name, 1)) if name == "FROBNICATE"
        ));
        assert!(image.is_empty());
    }

    #[test]
    fn out_of_range_immediate_is_a_fatal_error() {
        let (err, image) = assemble("PUSH 999\nHALT").unwrap_err();
        assert!(matches!(
            err,
            Error::Assemble(AssembleError::OperandOutOfRange(999, 1))
        ));
        assert!(image.is_empty());
    }

    #[test]
    fn comments_and_blank_lines_do_not_affect_emitted_bytes() {
        let with_comments = assemble("; a leading comment\nNOP ; trailing\n\nHALT").unwrap().0;
        let without = assemble("NOP\nHALT").unwrap().0;
        assert_eq!(with_comments, without);
    }

    #[test]
    fn source_map_skips_label_only_and_comment_only_lines() {
        let input = "NOP\nskip:\n; comment\nHALT";
        let (_, source_map) = assemble(input).unwrap();
        assert_eq!(
            source_map,
            vec![
                SourceMapItem {
                    start_line: 1,
                    line_count: 1
                },
                SourceMapItem {
                    start_line: 4,
                    line_count: 1
                },
            ]
        );
    }

    #[test]
    fn program_too_large_is_rejected() {
        let mut source = String::new();
        for _ in 0..(u16::max_value() as usize + 1) {
            source.push_str("NOP\n");
        }
        let (err, image) = assemble(&source).unwrap_err();
        assert!(matches!(
            err,
            Error::Assemble(AssembleError::ProgramTooLarge(_))
        ));
        assert!(image.is_empty());
    }
}
