//! Bounds-checked access to guest linear memory.
//!
//! A [`MemoryView`] wraps the slice the runtime hands out for the calling
//! instance's memory. The slice is resolved fresh on every host call, so the
//! view always covers the current memory size even after the guest grows it.

use crate::trap::HostTrap;
use bcvm_core::Address;

pub(crate) struct MemoryView<'a> {
    data: &'a mut [u8],
}

impl<'a> MemoryView<'a> {
    pub(crate) fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    fn ensure(&self, offset: u32, length: u64) -> Result<std::ops::Range<usize>, HostTrap> {
        let start = offset as u64;
        let end = start + length;
        if end > self.data.len() as u64 {
            return Err(HostTrap::MemoryAccess {
                offset: start,
                length,
            });
        }
        Ok(start as usize..end as usize)
    }

    pub(crate) fn load(&self, offset: u32, length: u32) -> Result<Vec<u8>, HostTrap> {
        let range = self.ensure(offset, length as u64)?;
        Ok(self.data[range].to_vec())
    }

    pub(crate) fn load_exact<const N: usize>(&self, offset: u32) -> Result<[u8; N], HostTrap> {
        let range = self.ensure(offset, N as u64)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[range]);
        Ok(out)
    }

    pub(crate) fn load_address(&self, offset: u32) -> Result<Address, HostTrap> {
        Ok(Address(self.load_exact::<{ Address::LENGTH }>(offset)?))
    }

    pub(crate) fn load_u128_be(&self, offset: u32) -> Result<u128, HostTrap> {
        Ok(u128::from_be_bytes(self.load_exact::<16>(offset)?))
    }

    pub(crate) fn store(&mut self, offset: u32, bytes: &[u8]) -> Result<(), HostTrap> {
        let range = self.ensure(offset, bytes.len() as u64)?;
        self.data[range].copy_from_slice(bytes);
        Ok(())
    }

    pub(crate) fn store_u128_be(&mut self, offset: u32, value: u128) -> Result<(), HostTrap> {
        self.store(offset, &value.to_be_bytes())
    }

    /// Copy `length` bytes of `src` starting at `src_offset` into guest
    /// memory, zero-filling past the end of the source.
    pub(crate) fn store_padded(
        &mut self,
        offset: u32,
        src: &[u8],
        src_offset: u32,
        length: u32,
    ) -> Result<(), HostTrap> {
        let range = self.ensure(offset, length as u64)?;
        for (i, byte) in self.data[range].iter_mut().enumerate() {
            let src_index = src_offset as u64 + i as u64;
            *byte = usize::try_from(src_index)
                .ok()
                .and_then(|index| src.get(index).copied())
                .unwrap_or(0);
        }
        Ok(())
    }
}
