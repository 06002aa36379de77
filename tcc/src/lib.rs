//! Compiler from a small C-like language to [tasm](../tasm/index.html)
//! assembly text.
//!
//! # Language
//!
//! A program is a sequence of statements. There are no functions and no
//! user-defined types; every value is an unsigned byte (`u8`), matching the
//! VM's own word size, and arithmetic wraps the same way `ADD`/`SUB`/`MUL`
//! do on the VM.
//!
//! ```text
//! var x = 1;
//! var y = 2;
//! if (x < y) {
//!     print_char(65);
//! } else {
//!     print_char(66);
//! }
//! while (x != 0) {
//!     x = x - 1;
//! }
//! ```
//!
//! Statements: `var NAME [= EXPR];`, `NAME = EXPR;`, `if (EXPR) STMT [else
//! STMT]`, `while (EXPR) STMT`, `{ STMT* }`, or a bare expression statement.
//!
//! Expressions are the usual precedence climb: comparison
//! (`== != < > <= >=`) over additive (`+ -`) over multiplicative (`* /`)
//! over a factor (a number literal, a variable, a parenthesized
//! expression, or a builtin call).
//!
//! The builtins are the VM's `SYS` operations: `print_char`, `read_char`,
//! `draw_pixel`, `draw_line`, `fill_rect`, `refresh`, and `halt`. `halt`
//! additionally emits a `HALT` so control never falls through a `SYS exit`.
//! Every variable gets its own fixed memory cell starting at `0x0100`, in
//! declaration order; there is no stack allocation and no reuse.
//!
//! Any error — a stray character, an unknown identifier, a missing
//! semicolon — is fatal and reported with the source line it occurred on;
//! this compiler does not attempt error recovery.

mod error;
mod lexer;
mod parser;
mod token;

pub use error::{CompileError, Result};
use parser::Parser;

/// Compiles `source`, returning the generated assembly as a sequence of
/// lines (one per emitted instruction or label) ready to be joined with
/// newlines and handed to `tasm`.
pub fn compile(source: &str) -> Result<Vec<String>> {
    let tokens = lexer::tokenize(source)?;
    Parser::new(tokens).compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiles_a_var_declaration_and_assignment() {
        let lines = compile("var x = 1; x = x + 1;").unwrap();
        assert!(lines.contains(&"PUSH 1".to_string()));
        assert!(lines.contains(&"STORE 0x0100".to_string()));
        assert!(lines.contains(&"LOAD 0x0100".to_string()));
        assert!(lines.contains(&"ADD".to_string()));
        assert_eq!(lines.last().unwrap(), "HALT");
    }

    #[test]
    fn if_else_emits_both_branch_labels() {
        let lines = compile("if (1) { print_char(65); } else { print_char(66); }").unwrap();
        assert!(lines.iter().any(|l| l == "IF_ELSE_0:"));
        assert!(lines.iter().any(|l| l == "IF_END_0:"));
        assert!(lines.iter().any(|l| l == "JZ IF_ELSE_0"));
        assert!(lines.iter().any(|l| l == "JMP IF_END_0"));
    }

    #[test]
    fn while_loop_emits_loop_labels_and_back_jump() {
        let lines = compile("while (1) { print_char(65); }").unwrap();
        assert!(lines.iter().any(|l| l == "L0:"));
        assert!(lines.iter().any(|l| l == "L1:"));
        assert!(lines.iter().any(|l| l == "JMP L0"));
    }

    #[test]
    fn halt_builtin_emits_sys_exit_then_halt() {
        let lines = compile("halt();").unwrap();
        assert!(lines.windows(2).any(|w| w == ["SYS 0x00", "HALT"]));
    }

    #[test]
    fn undefined_variable_is_a_compile_error() {
        let err = compile("x = 1;").unwrap_err();
        assert!(err.message.contains("ndefined variable"));
    }

    #[test]
    fn does_not_duplicate_a_trailing_halt() {
        let lines = compile("halt();").unwrap();
        assert_eq!(lines.iter().filter(|l| l.as_str() == "HALT").count(), 1);
    }

    #[test]
    fn integer_literal_over_255_is_a_compile_error() {
        let err = compile("var x = 256;").unwrap_err();
        assert!(err.message.contains("overflow"));
    }

    #[test]
    fn integer_literal_of_255_is_accepted() {
        let lines = compile("var x = 255;").unwrap();
        assert!(lines.contains(&"PUSH 255".to_string()));
    }

    #[test]
    fn using_return_is_a_compile_error() {
        assert!(compile("return;").is_err());
    }
}
