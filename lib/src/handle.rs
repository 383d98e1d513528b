// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Handle for connected ledger devices
//!
//! This provides methods for interacting with the device
//! and is generic over [ledger_lib::Exchange] transports.
//!
//! The handle owns its transport and every request takes `&mut self`,
//! so at most one request can be outstanding at any time.

use std::time::Duration;

use encdec::{DecodeOwned, Encode};
use ledger_lib::Exchange;
use ledger_proto::{ApduError, ApduStatic};
use log::{debug, warn};

use ledger_mina_apdu::{
    address::{AddressReq, AddressResp},
    frame::Frame,
    sign_tx::{SignTxReq, SignTxResp, Signature},
    status::split_status,
    types::Address,
};

use crate::{
    error::{DeviceError, TransportError},
    Error,
};

/// Maximum response length, a short APDU payload plus the status word
pub const MAX_RESPONSE_LEN: usize = 255 + 2;

/// Mina handle for a connected ledger device.
///
/// This is generic over [Exchange] types to support different
/// underlying transports
pub struct DeviceHandle<T: Exchange> {
    /// Transport for device communication
    t: T,
    /// Timeout for requests requiring user interaction
    user_timeout: Duration,
}

/// Create a [DeviceHandle] wrapper from a type implementing [Exchange]
impl<T: Exchange> From<T> for DeviceHandle<T> {
    fn from(t: T) -> Self {
        Self {
            t,
            user_timeout: Duration::from_secs(30),
        }
    }
}

impl<T: Exchange + Send> DeviceHandle<T> {
    /// Override the timeout applied to requests awaiting user approval
    pub fn with_user_timeout(mut self, timeout: Duration) -> Self {
        self.user_timeout = timeout;
        self
    }

    /// Release the underlying transport
    pub fn into_inner(self) -> T {
        self.t
    }

    /// Send a validated frame, returning the response data on success
    pub async fn exchange_frame(
        &mut self,
        frame: &Frame,
        timeout: Duration,
    ) -> Result<Vec<u8>, Error> {
        debug!("TX {:?}", frame);

        let resp = tokio::time::timeout(timeout, self.t.exchange(frame.as_bytes(), timeout))
            .await
            .map_err(TransportError::from)?
            .map_err(TransportError::from)?;

        if resp.len() > MAX_RESPONSE_LEN {
            return Err(TransportError::Oversized(resp.len()).into());
        }

        let (data, sw) =
            split_status(&resp).ok_or(TransportError::Truncated(resp.len()))?;

        debug!("RX status 0x{:04x} ({} bytes)", sw, data.len());

        if let Some(e) = DeviceError::from_status(sw) {
            warn!("Device error: {}", e);
            return Err(e.into());
        }

        Ok(data.to_vec())
    }

    /// Issue a typed request and decode the typed response
    pub async fn request<RESP>(
        &mut self,
        req: &(impl ApduStatic + Encode<Error = ApduError> + Sync),
        timeout: Duration,
    ) -> Result<RESP, Error>
    where
        RESP: DecodeOwned<Output = RESP, Error = ApduError>,
    {
        // All outgoing requests pass through the frame gate
        let frame = Frame::encode(req)?;

        let data = self.exchange_frame(&frame, timeout).await?;

        let (resp, _n) = RESP::decode_owned(&data).map_err(DeviceError::InvalidResponse)?;

        Ok(resp)
    }

    /// Send a raw hex frame, returning the response data
    pub async fn send_hex(&mut self, apdu: &str) -> Result<Vec<u8>, Error> {
        let frame = Frame::from_hex(apdu)?;

        self.exchange_frame(&frame, self.user_timeout).await
    }

    /// Fetch the address for the provided account index
    ///
    /// The device displays the derivation path and requires confirmation.
    pub async fn address(&mut self, account_index: u32) -> Result<Address, Error> {
        debug!("Requesting address for account: {}", account_index);

        let resp = self
            .request::<AddressResp>(&AddressReq::new(account_index), self.user_timeout)
            .await?;

        Ok(resp.address)
    }

    /// Request a transaction signature
    ///
    /// The device displays the transaction and requires confirmation.
    pub async fn sign_tx(&mut self, req: &SignTxReq) -> Result<Signature, Error> {
        debug!(
            "Requesting {} signature for account: {}",
            req.kind, req.account_index
        );

        let resp = self
            .request::<SignTxResp>(req, self.user_timeout)
            .await?;

        Ok(resp.signature)
    }
}
