// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Cursor helpers for fixed-layout big-endian APDU encoding

use byteorder::{BigEndian, ByteOrder};

use crate::ApduError;

/// Sequential writer over an APDU payload buffer
pub(crate) struct Writer<'a> {
    buff: &'a mut [u8],
    index: usize,
}

impl<'a> Writer<'a> {
    pub fn new(buff: &'a mut [u8]) -> Self {
        Self { buff, index: 0 }
    }

    pub fn put(&mut self, d: &[u8]) -> Result<(), ApduError> {
        if self.buff.len() < self.index + d.len() {
            return Err(ApduError::InvalidLength);
        }

        self.buff[self.index..][..d.len()].copy_from_slice(d);
        self.index += d.len();

        Ok(())
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), ApduError> {
        self.put(&[v])
    }

    pub fn put_u32(&mut self, v: u32) -> Result<(), ApduError> {
        let mut b = [0u8; 4];
        BigEndian::write_u32(&mut b, v);
        self.put(&b)
    }

    pub fn put_u64(&mut self, v: u64) -> Result<(), ApduError> {
        let mut b = [0u8; 8];
        BigEndian::write_u64(&mut b, v);
        self.put(&b)
    }

    /// Return the number of bytes written
    pub fn finish(self) -> usize {
        self.index
    }
}

/// Sequential reader over an APDU payload buffer
pub(crate) struct Reader<'a> {
    buff: &'a [u8],
    index: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buff: &'a [u8]) -> Self {
        Self { buff, index: 0 }
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ApduError> {
        if self.buff.len() < self.index + n {
            return Err(ApduError::InvalidLength);
        }

        let d = &self.buff[self.index..][..n];
        self.index += n;

        Ok(d)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], ApduError> {
        let mut d = [0u8; N];
        d.copy_from_slice(self.take(N)?);
        Ok(d)
    }

    pub fn u8(&mut self) -> Result<u8, ApduError> {
        Ok(self.take(1)?[0])
    }

    pub fn u32(&mut self) -> Result<u32, ApduError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn u64(&mut self) -> Result<u64, ApduError> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Return the number of bytes consumed
    pub fn index(&self) -> usize {
        self.index
    }
}
