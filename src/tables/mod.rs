pub mod reader;
pub mod writer;

pub use reader::{read_transactions, read_transactions_from};
pub use writer::{OutputPaths, TableWriter};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::parse_controls;
    use crate::engine;
    use std::fs;

    const CONTROLS: &str = r#"
- control_id: ach_high_value_new_account
  rail: ACH
  action: BLOCK
  conditions:
    funding_speed: instant
    amount_gt: 5000
    account_age_lt_days: 30
- control_id: card_cnp_new_device
  rail: CARD
  action: REVIEW
  conditions:
    card_present: false
    is_new_device: true
    amount_gt: 800
- control_id: crypto_new_wallet
  rail: CRYPTO
  action: REVIEW
  conditions:
    wallet_age_lt_days: 7
    amount_gt: 2.0
"#;

    const TRANSACTIONS: &str = "\
tx_id,rail,amount,funding_speed,account_age_days,card_present,is_new_device,wallet_age_days,is_fraud_pattern
ach_tx_000000,ACH,6200.50,instant,12,,,,True
ach_tx_000001,ACH,6200.50,standard,12,,,,False
card_tx_000000,CARD,950.00,,40,False,True,,True
card_tx_000001,CARD,950.00,,40,True,True,,False
crypto_tx_000000,CRYPTO,2.5,,90,,,3,False
";

    #[test]
    fn test_csv_to_tables() {
        let catalogue = parse_controls(CONTROLS).unwrap();
        let transactions = read_transactions_from(TRANSACTIONS.as_bytes()).unwrap();

        let output = engine::run(&transactions, &catalogue).unwrap();
        let metrics = engine::aggregate(&output.hits, &catalogue, transactions.len());

        let dir = tempfile::tempdir().unwrap();
        let paths = TableWriter::new(dir.path()).unwrap().write_all(&output, &metrics).unwrap();

        assert_eq!(
            fs::read_to_string(&paths.decisions).unwrap(),
            "tx_id,rail,final_action,determined_by,triggered_controls\n\
             ach_tx_000000,ACH,BLOCK,ach_high_value_new_account,ach_high_value_new_account\n\
             ach_tx_000001,ACH,ALLOW,,\n\
             card_tx_000000,CARD,REVIEW,card_cnp_new_device,card_cnp_new_device\n\
             card_tx_000001,CARD,ALLOW,,\n\
             crypto_tx_000000,CRYPTO,REVIEW,crypto_new_wallet,crypto_new_wallet\n"
        );
        assert_eq!(
            fs::read_to_string(&paths.hits).unwrap(),
            "tx_id,control_id,rail,action,is_fraud_pattern\n\
             ach_tx_000000,ach_high_value_new_account,ACH,BLOCK,true\n\
             card_tx_000000,card_cnp_new_device,CARD,REVIEW,true\n\
             crypto_tx_000000,crypto_new_wallet,CRYPTO,REVIEW,false\n"
        );
        assert_eq!(
            fs::read_to_string(&paths.metrics).unwrap(),
            "control_id,hits,hit_rate,precision_proxy\n\
             ach_high_value_new_account,1,0.2,1.0\n\
             card_cnp_new_device,1,0.2,1.0\n\
             crypto_new_wallet,1,0.2,0.0\n"
        );
    }
}
