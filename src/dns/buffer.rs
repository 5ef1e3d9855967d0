//! byte buffers for reading and writing DNS messages

use std::io::{Error, ErrorKind, Result};

pub trait PacketBuffer {
    fn read(&mut self) -> Result<u8>;
    fn get(&self, pos: usize) -> Result<u8>;
    fn get_range(&self, start: usize, len: usize) -> Result<&[u8]>;
    fn write(&mut self, val: u8) -> Result<()>;
    fn pos(&self) -> usize;
    fn seek(&mut self, pos: usize) -> Result<()>;
    fn step(&mut self, steps: usize) -> Result<()>;

    fn write_u16(&mut self, val: u16) -> Result<()> {
        self.write((val >> 8) as u8)?;
        self.write((val & 0xFF) as u8)?;

        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        for b in data {
            self.write(*b)?;
        }

        Ok(())
    }

    fn read_u16(&mut self) -> Result<u16> {
        let res = ((self.read()? as u16) << 8) | (self.read()? as u16);

        Ok(res)
    }

    fn read_u32(&mut self) -> Result<u32> {
        let res = ((self.read()? as u32) << 24)
            | ((self.read()? as u32) << 16)
            | ((self.read()? as u32) << 8)
            | (self.read()? as u32);

        Ok(res)
    }
}

fn end_of_buffer() -> Error {
    Error::new(ErrorKind::InvalidInput, "End of buffer")
}

/// Growable buffer used when assembling outgoing messages.
#[derive(Default)]
pub struct VectorPacketBuffer {
    pub buffer: Vec<u8>,
    pub pos: usize,
}

impl VectorPacketBuffer {
    pub fn new() -> VectorPacketBuffer {
        VectorPacketBuffer {
            buffer: Vec::new(),
            pos: 0,
        }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl PacketBuffer for VectorPacketBuffer {
    fn read(&mut self) -> Result<u8> {
        let res = self.get(self.pos)?;
        self.pos += 1;

        Ok(res)
    }

    fn get(&self, pos: usize) -> Result<u8> {
        self.buffer.get(pos).copied().ok_or_else(end_of_buffer)
    }

    fn get_range(&self, start: usize, len: usize) -> Result<&[u8]> {
        self.buffer
            .get(start..start + len)
            .ok_or_else(end_of_buffer)
    }

    fn write(&mut self, val: u8) -> Result<()> {
        self.buffer.push(val);
        self.pos += 1;

        Ok(())
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        self.pos = pos;

        Ok(())
    }

    fn step(&mut self, steps: usize) -> Result<()> {
        self.pos += steps;

        Ok(())
    }
}

/// Read-only view over a received datagram. Every access is bounds checked,
/// so a truncated or hostile message surfaces as an error instead of a panic.
pub struct BytePacketBuffer<'a> {
    pub buf: &'a [u8],
    pub pos: usize,
}

impl<'a> BytePacketBuffer<'a> {
    pub fn new(buf: &'a [u8]) -> BytePacketBuffer<'a> {
        BytePacketBuffer { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }
}

impl<'a> PacketBuffer for BytePacketBuffer<'a> {
    fn read(&mut self) -> Result<u8> {
        let res = self.get(self.pos)?;
        self.pos += 1;

        Ok(res)
    }

    fn get(&self, pos: usize) -> Result<u8> {
        self.buf.get(pos).copied().ok_or_else(end_of_buffer)
    }

    fn get_range(&self, start: usize, len: usize) -> Result<&[u8]> {
        let end = start.checked_add(len).ok_or_else(end_of_buffer)?;
        self.buf.get(start..end).ok_or_else(end_of_buffer)
    }

    fn write(&mut self, _: u8) -> Result<()> {
        Err(Error::new(ErrorKind::PermissionDenied, "Read-only buffer"))
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn seek(&mut self, pos: usize) -> Result<()> {
        self.pos = pos;

        Ok(())
    }

    fn step(&mut self, steps: usize) -> Result<()> {
        self.pos += steps;

        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_vector_buffer_write() {
        let mut buffer = VectorPacketBuffer::new();
        buffer.write_u16(0x1234).unwrap();
        buffer.write(0xde).unwrap();
        buffer.write_bytes(&[1, 2]).unwrap();

        assert_eq!(5, buffer.pos());
        assert_eq!(vec![0x12, 0x34, 0xde, 1, 2], buffer.into_inner());
    }

    #[test]
    fn test_byte_buffer_bounds() {
        let data = [0x00, 0x2a, 0x01];
        let mut buffer = BytePacketBuffer::new(&data);

        assert_eq!(42, buffer.read_u16().unwrap());
        assert_eq!(1, buffer.remaining());
        assert!(buffer.read_u16().is_err());
        assert!(buffer.get(3).is_err());
        assert!(buffer.get_range(2, 2).is_err());
        assert_eq!(&[0x2a, 0x01], buffer.get_range(1, 2).unwrap());
        assert!(buffer.write(0).is_err());
    }
}
