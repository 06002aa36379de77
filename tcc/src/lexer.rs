use crate::error::{CompileError, Result};
use crate::token::{keyword, Token, TokenKind};

/// Splits `source` into tokens. `//` starts a line comment; there are no
/// block comments. Identifiers and numbers use the common `isalpha`/
/// `isdigit` rules; there is no escape syntax because there are no string
/// literals in this language.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line = 1;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        let start_line = line;

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text: chars[start..i].iter().collect(),
                line: start_line,
            });
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let text: String = chars[start..i].iter().collect();
            let kind = keyword(&text).unwrap_or(TokenKind::Identifier);
            tokens.push(Token {
                kind,
                text,
                line: start_line,
            });
            continue;
        }

        if let Some((kind, width)) = two_char_operator(&chars, i) {
            tokens.push(Token {
                kind,
                text: chars[i..i + width].iter().collect(),
                line: start_line,
            });
            i += width;
            continue;
        }

        let kind = match c {
            '=' => TokenKind::Assign,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            other => {
                return Err(CompileError::new(
                    start_line,
                    format!("unexpected character '{}'", other),
                ))
            }
        };
        tokens.push(Token {
            kind,
            text: c.to_string(),
            line: start_line,
        });
        i += 1;
    }

    Ok(tokens)
}

fn two_char_operator(chars: &[char], i: usize) -> Option<(TokenKind, usize)> {
    let pair = (chars[i], chars.get(i + 1).copied());
    match pair {
        ('=', Some('=')) => Some((TokenKind::Equals, 2)),
        ('!', Some('=')) => Some((TokenKind::NotEquals, 2)),
        ('<', Some('=')) => Some((TokenKind::LessEqual, 2)),
        ('>', Some('=')) => Some((TokenKind::GreaterEqual, 2)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_a_var_declaration() {
        let tokens = tokenize("var x = 5;").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Var,
                TokenKind::Identifier,
                TokenKind::Assign,
                TokenKind::Number,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn line_comments_are_skipped() {
        let tokens = tokenize("// nothing here\nvar y;").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Var);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn rejects_an_unknown_character() {
        assert!(tokenize("var x = 5 @ 2;").is_err());
    }
}
