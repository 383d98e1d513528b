// Copyright (c) 2022-2023 The MobileCoin Foundation

use std::io::Write;

use ledger_mina::{
    apdu::types::{NetworkId, TxKind},
    flow::{Approver, Prompt},
    intent::TransactionIntent,
    validate::format_currency,
};

/// Interactive approver, prints the transaction and waits for `y` on stdin
pub struct StdinApprover;

impl Approver for StdinApprover {
    fn approve(&mut self, prompt: &Prompt<'_>) -> bool {
        match prompt {
            Prompt::Sign {
                intent,
                network,
                balance,
            } => {
                println!("Sign transaction:");
                print_transaction(intent, network, *balance);
                confirm("Continue?")
            }
            Prompt::Submit {
                intent,
                network,
                signed,
            } => {
                println!("Submit signed transaction:");
                print_transaction(intent, network, None);
                if let Some(s) = signed.signature() {
                    println!("    Signature:   {}", s);
                }
                println!();
                confirm("Broadcast?")
            }
        }
    }
}

/// BIP44 derivation path for an account
pub fn path(account: u32) -> String {
    format!("44'/12586'/{}'/0/0", account)
}

/// Read a y/N answer from stdin, anything other than `y` / `yes` declines
pub fn confirm(question: &str) -> bool {
    print!("{} (y/N) ", question);
    let _ = std::io::stdout().flush();

    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Print transaction details for user confirmation
pub fn print_transaction(intent: &TransactionIntent, network: &str, balance: Option<u64>) {
    if intent.network_id == NetworkId::Testnet {
        println!("    Network:     {} (testnet)", network);
    } else {
        println!("    Network:     {}", network);
    }
    println!("    Type:        {}", intent.kind);
    println!(
        "    Account:     {} (path {})",
        intent.account_index,
        path(intent.account_index)
    );

    let (from, to) = match intent.kind {
        TxKind::Payment => ("Sender:   ", "Receiver: "),
        TxKind::Delegation => ("Delegator:", "Delegate: "),
    };
    match balance {
        Some(b) => println!(
            "    {}   {} (balance {})",
            from,
            intent.sender,
            format_currency(b)
        ),
        None => println!("    {}   {}", from, intent.sender),
    }
    println!("    {}   {}", to, intent.receiver);

    if intent.kind == TxKind::Payment {
        println!("    Amount:      {}", format_currency(intent.amount));
    }
    println!("    Fee:         {}", format_currency(intent.fee));
    if intent.kind == TxKind::Payment {
        if let Some(t) = intent.total() {
            println!("    Total:       {}", format_currency(t));
        }
    }
    println!("    Nonce:       {}", intent.nonce);
    if let Some(v) = intent.valid_until_override() {
        println!("    Valid until: {}", v);
    }
    if let Some(m) = intent.memo_override() {
        println!("    Memo:        {}", m);
    }
    println!();
}
