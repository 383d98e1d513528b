// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{AddressReq, AddressResp},
    frame::{Frame, FrameError},
    sign_tx::{Signature, SignTxReq, SignTxResp},
    status::{split_status, StatusWord},
    types::{Address, Memo, NetworkId, TxKind, VALID_UNTIL_NEVER},
    ApduError, ApduStatic, Instruction,
};
