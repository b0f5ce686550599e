//! Shared byte-level tokenizer: whitespace-delimited tokens with explicit
//! newline markers, used by both `vocab_build` and `cooccur` so the two
//! stages never drift on what counts as a token boundary.

use std::io::Read;

use crate::error::Result;

/// Tokens longer than this are silently truncated.
pub const MAX_STRING_LENGTH: usize = 1000;

pub enum Token<'a> {
    Word(&'a [u8]),
    Newline,
}

/// Reads `input` byte-by-byte, invoking `f` once per word and once per
/// newline. Carriage returns are dropped; a trailing word with no final
/// newline is still emitted.
pub fn for_each_token<R: Read>(mut input: R, mut f: impl FnMut(Token) -> Result<()>) -> Result<()> {
    let mut buf: Vec<u8> = Vec::with_capacity(64);
    let mut byte = [0u8; 1];
    loop {
        if input.read(&mut byte)? == 0 {
            break;
        }
        match byte[0] {
            b'\r' => continue,
            b' ' | b'\t' => {
                if !buf.is_empty() {
                    f(Token::Word(&buf))?;
                    buf.clear();
                }
            }
            b'\n' => {
                if !buf.is_empty() {
                    f(Token::Word(&buf))?;
                    buf.clear();
                }
                f(Token::Newline)?;
            }
            c => {
                if buf.len() < MAX_STRING_LENGTH {
                    buf.push(c);
                }
            }
        }
    }
    if !buf.is_empty() {
        f(Token::Word(&buf))?;
    }
    Ok(())
}
