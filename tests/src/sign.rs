// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction signing tests

use lazy_static::lazy_static;
use log::{debug, info};

use ledger_mina::{
    apdu::{
        sign_tx::SignTxReq,
        types::{Memo, NetworkId, TxKind, VALID_UNTIL_NEVER},
    },
    DeviceHandle, Exchange,
};

/// Signing vector, a device request with its expected signature
#[derive(Clone, Debug, PartialEq)]
pub struct SignVector {
    pub kind: TxKind,
    pub account_index: u32,
    pub sender: &'static str,
    pub receiver: &'static str,
    pub amount: u64,
    pub fee: u64,
    pub nonce: u32,
    pub valid_until: u32,
    pub memo: &'static str,
    /// Expected signature (hex)
    pub signature: &'static str,
}

impl SignVector {
    /// Build the device request for this vector
    pub fn request(&self) -> anyhow::Result<SignTxReq> {
        let invalid = |e| anyhow::anyhow!("Invalid vector field: {:?}", e);

        Ok(SignTxReq {
            account_index: self.account_index,
            sender: self.sender.parse().map_err(invalid)?,
            receiver: self.receiver.parse().map_err(invalid)?,
            amount: self.amount,
            fee: self.fee,
            nonce: self.nonce,
            valid_until: self.valid_until,
            memo: Memo::new(self.memo).map_err(invalid)?,
            kind: self.kind,
            network_id: NetworkId::Testnet,
        })
    }
}

lazy_static! {
    /// Known signatures for the test seed (testnet domain)
    pub static ref VECTORS: Vec<SignVector> = vec![
        SignVector {
            kind: TxKind::Payment,
            account_index: 0,
            sender: "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV",
            receiver: "B62qicipYxyEHu7QjUqS7QvBipTs5CzgkYZZZkPoKVYBu6tnDUcE9Zt",
            amount: 1729000000000,
            fee: 2000000000,
            nonce: 16,
            valid_until: 271828,
            memo: "Hello Mina!",
            signature: "0a68fc40b470abedd14cd8b830effa4fa6225e76cbc67fa46dfb0f825c0d1a7d1a8685817e449150070456b5628eeb9af954040e023d3a1b4211c818d210ee56",
        },
        SignVector {
            kind: TxKind::Payment,
            account_index: 12586,
            sender: "B62qoG5Yk4iVxpyczUrBNpwtx2xunhL48dydN53A2VjoRwF8NUTbVr4",
            receiver: "B62qrKG4Z8hnzZqp1AL8WsQhQYah3quN1qUj3SyfJA8Lw135qWWg1mi",
            amount: 314159265359,
            fee: 1618033988,
            nonce: 0,
            valid_until: VALID_UNTIL_NEVER,
            memo: "",
            signature: "32d7ea2ae54df316e7baa4bebf8a62ea1cfb321debc75e27fc0ba302beba383a398ec6e103e0101a20179955bb11a1956bf0b470d7782344aec4d8d0fc73ed92",
        },
        SignVector {
            kind: TxKind::Payment,
            account_index: 12586,
            sender: "B62qoG5Yk4iVxpyczUrBNpwtx2xunhL48dydN53A2VjoRwF8NUTbVr4",
            receiver: "B62qoqiAgERjCjXhofXiD7cMLJSKD8hE8ZtMh4jX5MPNgKB4CFxxm1N",
            amount: 271828182845904,
            fee: 100000,
            nonce: 5687,
            valid_until: VALID_UNTIL_NEVER,
            memo: "01234567890123456789012345678901",
            signature: "063a7b5b5b78090760eb93cbfacf5672155e1c0bcfd5629d75b06bbb079694922f1394b7eb2f929b5a97f229e988523223e4b7fee531d8d85caafd1c702b1673",
        },
        SignVector {
            kind: TxKind::Payment,
            account_index: 3,
            sender: "B62qoqiAgERjCjXhofXiD7cMLJSKD8hE8ZtMh4jX5MPNgKB4CFxxm1N",
            receiver: "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV",
            amount: 0,
            fee: 2000000000,
            nonce: 0,
            valid_until: 1982,
            memo: "",
            signature: "09c5712632f6281a43c64dbb936ce6002a0c2e004b375037a05ec7e266f9f1be3f8e5bdd506c35c6546cfc4edbeaff816a38096c0bdb408341eb0e25adbf4d83",
        },
        SignVector {
            kind: TxKind::Delegation,
            account_index: 0,
            sender: "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV",
            receiver: "B62qicipYxyEHu7QjUqS7QvBipTs5CzgkYZZZkPoKVYBu6tnDUcE9Zt",
            amount: 0,
            fee: 2000000000,
            nonce: 16,
            valid_until: 1337,
            memo: "Delewho?",
            signature: "376cd8a00b4ce495b3b23187b94a688a1c36837d2eb911c0085b3e37ba96dea02a3573e6a6471b068e14a03fe0b7d6399119ea52e4a310c3f98d7af5d988c676",
        },
        SignVector {
            kind: TxKind::Delegation,
            account_index: 49370,
            sender: "B62qkiT4kgCawkSEF84ga5kP9QnhmTJEYzcfgGuk6okAJtSBfVcjm1M",
            receiver: "B62qnzbXmRNo9q32n4SNu2mpB8e7FYYLH8NmaX6oFCBYjjQ8SbD7uzV",
            amount: 0,
            fee: 2000000000,
            nonce: 0,
            valid_until: VALID_UNTIL_NEVER,
            memo: "",
            signature: "05a1f5f50c6fe5616023251653e5be099d0ad942323498fb23bcfcd21c5fab6a3a641fce6d51e05566b0ce1244da30b0014cb7580f760f84e58eb654190bc607",
        },
        SignVector {
            kind: TxKind::Delegation,
            account_index: 12586,
            sender: "B62qoG5Yk4iVxpyczUrBNpwtx2xunhL48dydN53A2VjoRwF8NUTbVr4",
            receiver: "B62qkiT4kgCawkSEF84ga5kP9QnhmTJEYzcfgGuk6okAJtSBfVcjm1M",
            amount: 0,
            fee: 42000000000,
            nonce: 1,
            valid_until: VALID_UNTIL_NEVER,
            memo: "more delegates, more fun........",
            signature: "29febace385dfad1bcc97f1297d5f8c5bdadb57faf1c20a9c9f6c7516f80c6af05b0a0a186332f544b70c8e8717355bd7ebde310dee31b351f333219443ac798",
        },
        SignVector {
            kind: TxKind::Delegation,
            account_index: 2,
            sender: "B62qrKG4Z8hnzZqp1AL8WsQhQYah3quN1qUj3SyfJA8Lw135qWWg1mi",
            receiver: "B62qicipYxyEHu7QjUqS7QvBipTs5CzgkYZZZkPoKVYBu6tnDUcE9Zt",
            amount: 0,
            fee: 1202056900,
            nonce: 0,
            valid_until: 577216,
            memo: "",
            signature: "08a668739ec0bd4149e51a85ea9f05887232f91accb884c312dbca8ef7de0c9b341178cfb969c69bb9fc87df110276880cf09bcdf6b899ea3d1d1b4aa59e7c33",
        },
    ];
}

/// Sign each known transaction and compare against expected signatures
pub async fn test<T>(d: &mut DeviceHandle<T>) -> anyhow::Result<()>
where
    T: Exchange + Send,
{
    for (i, v) in VECTORS.iter().enumerate() {
        info!(
            "Signing vector {}: {} for account {}",
            i, v.kind, v.account_index
        );

        let req = v.request()?;
        debug!("Request: {:?}", req);

        let s = d.sign_tx(&req).await?;

        if s.to_hex() != v.signature {
            return Err(anyhow::anyhow!(
                "Signature mismatch for vector {} (expected: {}, actual: {})",
                i,
                v.signature,
                s
            ));
        }
    }

    Ok(())
}
