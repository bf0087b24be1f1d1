//! Statement text normalization.
//!
//! Statements are cleaned before submission: comments are stripped outside of
//! string literals, surrounding whitespace is trimmed, and trailing statement
//! terminators are dropped (servers reject a trailing `;` on a single
//! statement).

/// Normalize a statement for submission.
pub fn clean(statement: &str) -> String {
    let stripped = strip_comments(statement);
    let trimmed = stripped
        .trim()
        .trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    trimmed.to_string()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Remove `--` line comments and `/* */` block comments, leaving string
/// literals untouched.
fn strip_comments(statement: &str) -> String {
    let mut out = String::with_capacity(statement.len());
    let mut chars = statement.chars().peekable();
    let mut state = State::Normal;

    while let Some(c) = chars.next() {
        match state {
            State::Normal => match c {
                '\'' => {
                    out.push(c);
                    state = State::SingleQuoted;
                }
                '"' => {
                    out.push(c);
                    state = State::DoubleQuoted;
                }
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    state = State::BlockComment;
                }
                _ => out.push(c),
            },
            State::SingleQuoted => {
                out.push(c);
                if c == '\\' {
                    // Escaped character, including \' — does not end the literal
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '\'' {
                    state = State::Normal;
                }
            }
            State::DoubleQuoted => {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '"' {
                    state = State::Normal;
                }
            }
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Normal;
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    // Keep a separator so adjacent tokens do not merge
                    out.push(' ');
                    state = State::Normal;
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean("  SELECT 1  \n"), "SELECT 1");
    }

    #[test]
    fn test_strips_trailing_semicolons() {
        assert_eq!(clean("SELECT 1;"), "SELECT 1");
        assert_eq!(clean("SELECT 1 ; ; "), "SELECT 1");
    }

    #[test]
    fn test_strips_line_comments() {
        let sql = "SELECT a -- pick the key\nFROM t";
        assert_eq!(clean(sql), "SELECT a \nFROM t");
    }

    #[test]
    fn test_strips_block_comments() {
        let sql = "SELECT /* hint */ a FROM t";
        assert_eq!(clean(sql), "SELECT   a FROM t");
    }

    #[test]
    fn test_preserves_literals() {
        let sql = "SELECT '--not a comment' FROM t";
        assert_eq!(clean(sql), "SELECT '--not a comment' FROM t");

        let sql = "SELECT 'a;b' FROM t;";
        assert_eq!(clean(sql), "SELECT 'a;b' FROM t");

        let sql = "SELECT \"/*col*/\" FROM t";
        assert_eq!(clean(sql), "SELECT \"/*col*/\" FROM t");
    }

    #[test]
    fn test_escaped_quote_does_not_end_literal() {
        let sql = r"SELECT 'it\'s -- not a comment' FROM t";
        assert_eq!(clean(sql), sql);

        let sql = r#"SELECT "a\"b /*still a name*/" FROM t"#;
        assert_eq!(clean(sql), sql);
    }

    #[test]
    fn test_comment_only_statement_becomes_empty() {
        assert_eq!(clean("-- nothing here"), "");
    }
}
