// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address derivation tests

use log::info;

use ledger_mina::{DeviceHandle, Exchange};

/// Known account / address pairs for the test seed
pub const VECTORS: &[(u32, &str)] = &[
    (0, "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV"),
    (1, "B62qicipYxyEHu7QjUqS7QvBipTs5CzgkYZZZkPoKVYBu6tnDUcE9Zt"),
    (2, "B62qrKG4Z8hnzZqp1AL8WsQhQYah3quN1qUj3SyfJA8Lw135qWWg1mi"),
    (3, "B62qoqiAgERjCjXhofXiD7cMLJSKD8hE8ZtMh4jX5MPNgKB4CFxxm1N"),
    (49370, "B62qkiT4kgCawkSEF84ga5kP9QnhmTJEYzcfgGuk6okAJtSBfVcjm1M"),
    (0x312a, "B62qoG5Yk4iVxpyczUrBNpwtx2xunhL48dydN53A2VjoRwF8NUTbVr4"),
];

/// Fetch addresses for each known account and compare against expectations
pub async fn test<T>(d: &mut DeviceHandle<T>) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    for (account, expected) in VECTORS {
        info!("Requesting address for account {}", account);

        let a = d.address(*account).await?;

        info!("Received address: {}", a);

        if a.as_str() != *expected {
            return Err(anyhow::anyhow!(
                "Address mismatch for account {} (expected: {}, actual: {})",
                account,
                expected,
                a
            ));
        }
    }

    Ok(())
}
