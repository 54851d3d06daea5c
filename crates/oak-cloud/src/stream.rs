//! Control channel byte stream
//!
//! Byte-at-a-time calls forward straight to the runtime's
//! [`ControlChannel`](crate::ControlChannel). `std::io::Read` and
//! `std::io::Write` are layered on top for buffer-oriented callers; the
//! inherent byte methods shadow the trait ones, so call the trait through
//! its path (`io::Read::read(&mut cloud, &mut buf)`) or its provided
//! methods (`read_exact`, `write_all`).

use std::io;

use crate::{Cloud, CloudRuntime};

impl<R: CloudRuntime> Cloud<R> {
    pub fn begin(&mut self) {
        self.runtime_mut().begin();
    }

    /// Write one byte; returns the number of bytes accepted
    pub fn write(&mut self, byte: u8) -> usize {
        self.runtime_mut().write_byte(byte)
    }

    pub fn available(&self) -> usize {
        self.runtime().available()
    }

    pub fn read(&mut self) -> Option<u8> {
        self.runtime_mut().read_byte()
    }

    pub fn peek(&self) -> Option<u8> {
        self.runtime().peek_byte()
    }

    pub fn flush(&mut self) {
        self.runtime_mut().flush();
    }

    pub fn end(&mut self) {
        self.runtime_mut().end();
    }
}

impl<R: CloudRuntime> io::Write for Cloud<R> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut written = 0;
        for &byte in buf {
            if self.runtime_mut().write_byte(byte) == 0 {
                break;
            }
            written += 1;
        }
        if written == 0 && !buf.is_empty() {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.runtime_mut().flush();
        Ok(())
    }
}

impl<R: CloudRuntime> io::Read for Cloud<R> {
    /// Drain whatever is buffered; `WouldBlock` when nothing is
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        let mut count = 0;
        while count < buf.len() {
            match self.runtime_mut().read_byte() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }

        if count == 0 {
            return Err(io::ErrorKind::WouldBlock.into());
        }
        Ok(count)
    }
}
