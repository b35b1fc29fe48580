//! Minimal C++ tokenizer.
//!
//! Strips comments and classifies string/char literals so downstream
//! statement parsing never mistakes text inside a comment or a string
//! for an identifier — logging-function spellings that appear only in
//! comments must never be detected as log calls.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    StringLit,
    CharLit,
    Number,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = source.chars().collect();
    let mut i = 0;
    let mut line = 1usize;
    let mut col = 1usize;

    let advance = |i: &mut usize, line: &mut usize, col: &mut usize, chars: &[char]| {
        if chars[*i] == '\n' {
            *line += 1;
            *col = 1;
        } else {
            *col += 1;
        }
        *i += 1;
    };

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            advance(&mut i, &mut line, &mut col, &chars);
            continue;
        }

        // Line comment.
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                advance(&mut i, &mut line, &mut col, &chars);
            }
            continue;
        }

        // Block comment.
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            advance(&mut i, &mut line, &mut col, &chars);
            advance(&mut i, &mut line, &mut col, &chars);
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                advance(&mut i, &mut line, &mut col, &chars);
            }
            if i < chars.len() {
                advance(&mut i, &mut line, &mut col, &chars);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            continue;
        }

        let start_line = line;
        let start_col = col;

        // String literal.
        if c == '"' {
            let mut text = String::from("\"");
            advance(&mut i, &mut line, &mut col, &chars);
            while i < chars.len() && chars[i] != '"' {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    text.push(chars[i]);
                    advance(&mut i, &mut line, &mut col, &chars);
                }
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            if i < chars.len() {
                text.push('"');
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token {
                kind: TokenKind::StringLit,
                text,
                line: start_line,
                column: start_col,
            });
            continue;
        }

        // Char literal.
        if c == '\'' {
            let mut text = String::from("'");
            advance(&mut i, &mut line, &mut col, &chars);
            while i < chars.len() && chars[i] != '\'' {
                if chars[i] == '\\' && i + 1 < chars.len() {
                    text.push(chars[i]);
                    advance(&mut i, &mut line, &mut col, &chars);
                }
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            if i < chars.len() {
                text.push('\'');
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token {
                kind: TokenKind::CharLit,
                text,
                line: start_line,
                column: start_col,
            });
            continue;
        }

        // Identifier / keyword.
        if c.is_alphabetic() || c == '_' {
            let mut text = String::new();
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                text,
                line: start_line,
                column: start_col,
            });
            continue;
        }

        // Number literal.
        if c.is_ascii_digit() {
            let mut text = String::new();
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '.' || chars[i] == '\'')
            {
                text.push(chars[i]);
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                text,
                line: start_line,
                column: start_col,
            });
            continue;
        }

        // Multi-character punctuation (longest match first).
        const MULTI: &[&str] = &[
            "<<=", ">>=", "->*", "...", "::", "->", "<<", ">>", "==", "!=", "<=", ">=", "&&",
            "||", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "++", "--",
        ];
        let rest: String = chars[i..].iter().take(3).collect();
        if let Some(m) = MULTI.iter().find(|m| rest.starts_with(*m)) {
            for _ in 0..m.len() {
                advance(&mut i, &mut line, &mut col, &chars);
            }
            tokens.push(Token {
                kind: TokenKind::Punct,
                text: m.to_string(),
                line: start_line,
                column: start_col,
            });
            continue;
        }

        tokens.push(Token {
            kind: TokenKind::Punct,
            text: c.to_string(),
            line: start_line,
            column: start_col,
        });
        advance(&mut i, &mut line, &mut col, &chars);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let toks = tokenize("// qDebug()\nint /* qInfo() */ x;");
        let idents: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(idents, vec!["int", "x"]);
    }

    #[test]
    fn tokenizes_stream_call() {
        let toks = tokenize(r#"qDebug() << "x";"#);
        let texts: Vec<&str> = toks.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["qDebug", "(", ")", "<<", "\"x\"", ";"]);
    }
}
