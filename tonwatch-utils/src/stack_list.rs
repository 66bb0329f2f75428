use num_bigint::BigInt;

use crate::error::DecodeError;
use crate::pars::pars;
use crate::tree::TreeValue;

/// Decodes a `runmethod` / `runmethodfull` response into a tree.
///
/// Only the first line after the `result:` marker is considered; `None`
/// means the marker is absent or the segment reports an error, both of
/// which callers treat as "no result" rather than a failure. Tuples nest
/// with either `( )` or `[ ]`; scalar tokens are signed decimal integers or
/// pre-printed cell fragments such as `C{8E4F...}`, which are kept as
/// strings. A fragment is only valid when another value follows it in the
/// same tuple. Anything else means the response is malformed and the decode
/// fails outright, there is no recovery pass here.
pub fn result_to_list(text: &str) -> Result<Option<TreeValue>, DecodeError> {
    let Some(segment) = pars(text, "result:", Some("\n")) else {
        return Ok(None);
    };
    if segment.contains("error") {
        return Ok(None);
    }

    let tokens = tokenize(segment);
    let mut pos = 0;
    let value =
        parse_value(&tokens, &mut pos).map_err(|reason| result_list(segment, reason))?;
    if pos != tokens.len() {
        return Err(result_list(segment, "trailing tokens after result tuple".into()));
    }
    Ok(Some(value))
}

fn result_list(text: &str, reason: String) -> DecodeError {
    DecodeError::ResultList {
        reason,
        text: text.to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    fn flush(word: &mut String, tokens: &mut Vec<Token>) {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    }
    for ch in text.chars() {
        match ch {
            '(' | '[' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' | ']' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn parse_value(tokens: &[Token], pos: &mut usize) -> Result<TreeValue, String> {
    match tokens.get(*pos) {
        None => Err("unexpected end of input".into()),
        Some(Token::Open) => {
            *pos += 1;
            let mut items = Vec::new();
            loop {
                match tokens.get(*pos) {
                    None => return Err("unbalanced bracket".into()),
                    Some(Token::Close) => {
                        *pos += 1;
                        return Ok(TreeValue::List(items));
                    }
                    _ => items.push(parse_value(tokens, pos)?),
                }
            }
        }
        Some(Token::Close) => Err("unexpected closing bracket".into()),
        Some(Token::Word(word)) => {
            let followed = matches!(tokens.get(*pos + 1), Some(Token::Open | Token::Word(_)));
            *pos += 1;
            scalar(word, followed)
        }
    }
}

fn scalar(word: &str, followed: bool) -> Result<TreeValue, String> {
    let digits = word.strip_prefix('-').unwrap_or(word);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        Ok(TreeValue::Int(BigInt::parse_bytes(word.as_bytes(), 10).unwrap()))
    } else if word.contains('{') || word.contains('}') {
        // pre-printed structural fragment, e.g. a cell reference; valid only
        // with another value behind it
        if followed {
            Ok(TreeValue::Str(word.to_string()))
        } else {
            Err(format!("dangling cell fragment {word:?}"))
        }
    } else {
        Err(format!("unrecognized token {word:?}"))
    }
}
