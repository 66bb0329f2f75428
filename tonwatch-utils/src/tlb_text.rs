use std::collections::HashMap;

use num_bigint::BigInt;

use crate::error::DecodeError;
use crate::tree::TreeValue;

/// Decodes a lite-client TL-B style dump into a tree.
///
/// The accepted language is the parenthesized, colon-delimited subset the
/// lite-client prints for config params and smart-contract state:
///
/// ```text
/// ConfigParam(17) = (_ min_stake:(nanograms amount:(var_uint len:6 value:N)) ...)
/// x{...raw cell data, ignored...}
/// ```
///
/// Everything up to and including the first `=` is dropped, as is everything
/// from the first raw-cell marker `x{`. Each parenthesized group becomes a
/// mapping; `name:value` pairs keep their names, while anonymous items (the
/// leading constructor tag, nested untagged groups) are stored under the
/// synthetic key `_`, a later anonymous item replacing an earlier one.
/// All-decimal tokens decode as integers, everything else as strings.
pub fn tlb_to_tree(text: &str) -> Result<TreeValue, DecodeError> {
    let mut body = text;
    if let Some(at) = body.find('=') {
        body = &body[at + 1..];
    }
    if let Some(at) = body.find("x{") {
        body = &body[..at];
    }
    let body = body.trim();

    let tokens = tokenize(body);
    let mut pos = 0;
    let value = parse_value(&tokens, &mut pos).map_err(|reason| structural(text, reason))?;
    if pos != tokens.len() {
        return Err(structural(text, "trailing tokens after top-level value".into()));
    }
    Ok(value)
}

fn structural(text: &str, reason: String) -> DecodeError {
    DecodeError::Structural {
        reason,
        text: text.to_string(),
    }
}

#[derive(Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Colon,
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
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            ':' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Colon);
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
        Some(Token::Open) => parse_group(tokens, pos),
        Some(Token::Word(word)) => {
            *pos += 1;
            Ok(scalar(word))
        }
        Some(Token::Close) => Err("unexpected ')'".into()),
        Some(Token::Colon) => Err("unexpected ':'".into()),
    }
}

fn parse_group(tokens: &[Token], pos: &mut usize) -> Result<TreeValue, String> {
    *pos += 1; // consume '('
    let mut map = HashMap::new();
    let mut leading = true;
    loop {
        match tokens.get(*pos) {
            None => return Err("unbalanced '('".into()),
            Some(Token::Close) => {
                *pos += 1;
                return Ok(TreeValue::Map(map));
            }
            Some(Token::Word(word))
                if matches!(tokens.get(*pos + 1), Some(Token::Colon)) =>
            {
                let key = word.clone();
                *pos += 2;
                let value = parse_value(tokens, pos)?;
                map.insert(key, value);
            }
            Some(Token::Colon) => {
                return Err("field value with no preceding name".into());
            }
            // past the constructor tag only numbers and groups may be anonymous
            Some(Token::Word(word)) if !leading && !is_decimal(word) => {
                return Err(format!("bare token {word:?} after the leading position"));
            }
            _ => {
                let value = parse_value(tokens, pos)?;
                map.insert("_".to_string(), value);
            }
        }
        leading = false;
    }
}

fn is_decimal(word: &str) -> bool {
    !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
}

fn scalar(word: &str) -> TreeValue {
    if is_decimal(word) {
        // all-decimal tokens can be wider than 64 bits
        TreeValue::Int(BigInt::parse_bytes(word.as_bytes(), 10).unwrap())
    } else {
        TreeValue::Str(word.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_param_with_hex_field() {
        let text = "ConfigParam(1) = (_ elector_addr:xA3935861F79DAF59A13D6D182B1F323EB24C18DAF03FB268AA9B84C0D96A5F9B)";
        let tree = tlb_to_tree(text).unwrap();
        assert_eq!(
            tree.get("elector_addr").and_then(TreeValue::as_str),
            Some("xA3935861F79DAF59A13D6D182B1F323EB24C18DAF03FB268AA9B84C0D96A5F9B")
        );
        assert_eq!(tree.get("_").and_then(TreeValue::as_str), Some("_"));
    }

    #[test]
    fn test_flat_named_fields() {
        let text = "ConfigParam(15) = (_ validators_elected_for:65536 elections_start_before:32768 elections_end_before:8192 stake_held_for:32768)";
        let tree = tlb_to_tree(text).unwrap();
        assert_eq!(
            tree.get("elections_end_before").and_then(TreeValue::as_u64),
            Some(8192)
        );
        assert_eq!(
            tree.get("stake_held_for").and_then(TreeValue::as_u64),
            Some(32768)
        );
    }

    #[test]
    fn test_nested_grams_encoding() {
        let text = "ConfigParam(17) = (_ min_stake:(nanograms amount:(var_uint len:6 value:10000000000000)) max_stake_factor:196608)\nx{DEADBEEF}";
        let tree = tlb_to_tree(text).unwrap();
        let min_stake = tree.get("min_stake").unwrap();
        assert_eq!(min_stake.get("_").and_then(TreeValue::as_str), Some("nanograms"));
        let amount = min_stake.get("amount").unwrap();
        assert_eq!(amount.get("_").and_then(TreeValue::as_str), Some("var_uint"));
        assert_eq!(amount.get("value").and_then(TreeValue::as_u64), Some(10000000000000));
        assert_eq!(tree.get("max_stake_factor").and_then(TreeValue::as_u64), Some(196608));
    }

    #[test]
    fn test_anonymous_groups_last_wins() {
        let tree = tlb_to_tree("= (pair (int 1) (int 2))").unwrap();
        assert_eq!(tree.get("_").unwrap().get("_").and_then(TreeValue::as_u64), Some(2));
    }

    #[test]
    fn test_raw_cell_data_ignored() {
        let tree = tlb_to_tree("= (_ a:1) x{ABCDEF} x{012345}").unwrap();
        assert_eq!(tree.get("a").and_then(TreeValue::as_u64), Some(1));
    }

    #[test]
    fn test_deterministic() {
        let text = "ConfigParam(16) = (_ max_validators:400 max_main_validators:100 min_validators:75)";
        assert_eq!(tlb_to_tree(text).unwrap(), tlb_to_tree(text).unwrap());
    }

    #[test]
    fn test_bare_token_after_leading_position_is_fatal() {
        assert!(tlb_to_tree("= (_ a:1 foo)").is_err());
        assert!(tlb_to_tree("= (a:1 foo)").is_err());
        // anonymous numbers stay valid in any position
        let tree = tlb_to_tree("= (tag 5 6)").unwrap();
        assert_eq!(tree.get("_").and_then(TreeValue::as_u64), Some(6));
    }

    #[test]
    fn test_malformed_inputs_are_fatal() {
        for bad in ["= (a:1", "= (a:1))", "= (:5)", "= (a:1) (b:2)", "="] {
            let err = tlb_to_tree(bad).unwrap_err();
            match err {
                DecodeError::Structural { text, .. } => assert_eq!(text, bad),
                other => panic!("expected structural error, got {other:?}"),
            }
        }
    }
}
