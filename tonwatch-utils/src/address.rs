use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use num_bigint::BigUint;

use crate::error::DecodeError;

/// Renders a public-key-derived decimal integer as a fixed-width 64
/// character uppercase hex string. Values wider than 256 bits cannot be
/// addresses and are rejected.
pub fn dec_to_hex_addr(dec: &BigUint) -> Result<String, DecodeError> {
    let mut hex = format!("{:x}", dec);
    if hex.len() % 2 == 1 {
        hex.insert(0, '0');
    }
    if hex.len() > 64 {
        return Err(DecodeError::AddressRange);
    }
    Ok(format!("{:0>64}", hex.to_uppercase()))
}

/// Converts a raw hex address into its checksummed base64url display form.
///
/// The 36-byte layout (flag, workchain, 32 address bytes, CRC-16/XMODEM
/// high then low) matches the form used by TON wallets and explorers, so it
/// must stay bit-for-bit stable.
pub fn hex_to_base64_addr(
    workchain: i32,
    addr_hex: &str,
    bounceable: bool,
    testnet: bool,
) -> Result<String, DecodeError> {
    if addr_hex.len() != 64 {
        return Err(DecodeError::InvalidAddressLength(addr_hex.len()));
    }
    if !addr_hex.is_ascii() {
        return Err(DecodeError::AddressHex(addr_hex.to_string()));
    }

    let mut buf = [0u8; 36];
    buf[0] = 0x51 - if bounceable { 0x40 } else { 0 } + if testnet { 0x80 } else { 0 };
    buf[1] = (workchain.rem_euclid(256)) as u8;
    for (i, chunk) in buf[2..34].iter_mut().enumerate() {
        let pair = &addr_hex[i * 2..i * 2 + 2];
        *chunk = u8::from_str_radix(pair, 16)
            .map_err(|_| DecodeError::AddressHex(addr_hex.to_string()))?;
    }
    let crc = crc16_xmodem(&buf[..34]);
    buf[34] = (crc >> 8) as u8;
    buf[35] = (crc & 0xff) as u8;

    let encoded = STANDARD.encode(buf);
    Ok(encoded.replace('+', "-").replace('/', "_"))
}

/// CRC-16/XMODEM: polynomial 0x1021, initial value 0, no reflection.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ 0x1021
            } else {
                crc << 1
            };
        }
    }
    crc
}
