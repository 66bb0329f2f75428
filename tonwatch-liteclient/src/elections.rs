use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use tonwatch_utils::address::{dec_to_hex_addr, hex_to_base64_addr};
use tonwatch_utils::tree::TreeValue;

/// One entry of the elector's `participant_list_extended` result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub pubkey: String,
    pub stake: u64,
    pub max_factor: u64,
    pub wallet_address: String,
    pub adnl_addr: String,
}

/// Decodes the participant list tuple: each entry is
/// `[pubkey, [stake, max_factor, wallet_addr, adnl_addr]]` with every
/// address given as a decimal integer. Wallets live on the masterchain, so
/// the display address is rendered with workchain -1.
pub fn decode_participants(entries: &TreeValue) -> Result<Vec<Participant>> {
    let entries = entries
        .as_list()
        .context("participant list is not a tuple")?;

    let mut participants = Vec::with_capacity(entries.len());
    for entry in entries {
        let pubkey_dec = entry
            .at(0)
            .and_then(TreeValue::as_biguint)
            .context("participant entry has no pubkey")?;
        let details = entry
            .at(1)
            .and_then(TreeValue::as_list)
            .context("participant entry has no details tuple")?;
        let stake = details
            .first()
            .and_then(TreeValue::as_u64)
            .context("participant entry has no stake")?;
        let max_factor = details
            .get(1)
            .and_then(TreeValue::as_u64)
            .context("participant entry has no max_factor")?;
        let wallet_dec = details
            .get(2)
            .and_then(TreeValue::as_biguint)
            .context("participant entry has no wallet address")?;
        let adnl_dec = details
            .get(3)
            .and_then(TreeValue::as_biguint)
            .context("participant entry has no adnl address")?;

        let wallet_hex = dec_to_hex_addr(&wallet_dec)?;
        participants.push(Participant {
            pubkey: dec_to_hex_addr(&pubkey_dec)?,
            stake,
            max_factor,
            wallet_address: hex_to_base64_addr(-1, &wallet_hex, true, false)?,
            adnl_addr: dec_to_hex_addr(&adnl_dec)?,
        });
    }
    Ok(participants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonwatch_utils::stack_list::result_to_list;

    #[test]
    fn test_decode_participants() {
        let text = "result: ( ( 57086 ( 350000000000000 196608 12345 257 ) ) ( 4660 ( 460000000000000 262144 999 511 ) ) )\n";
        let tree = result_to_list(text).unwrap().unwrap();
        let participants = decode_participants(&tree).unwrap();
        assert_eq!(participants.len(), 2);

        let first = &participants[0];
        // 57086 = 0xDEFE
        assert_eq!(first.pubkey, format!("{:0>64}", "DEFE"));
        assert_eq!(first.stake, 350000000000000);
        assert_eq!(first.max_factor, 196608);
        assert_eq!(first.adnl_addr, format!("{:0>64}", "0101"));
        // wallet 12345 = 0x3039, rendered as a -1: display address
        let expected_wallet =
            hex_to_base64_addr(-1, &format!("{:0>64}", "3039"), true, false).unwrap();
        assert_eq!(first.wallet_address, expected_wallet);

        assert_eq!(participants[1].pubkey, format!("{:0>64}", "1234"));
        assert_eq!(participants[1].adnl_addr, format!("{:0>64}", "01FF"));
    }

    #[test]
    fn test_malformed_entry_is_fatal() {
        let tree = result_to_list("result: ( ( 5 ) )\n").unwrap().unwrap();
        assert!(decode_participants(&tree).is_err());
    }
}
