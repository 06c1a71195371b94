//! Mock UART implementation for testing
//!
//! An in-memory [`UartTransport`]: tests script the bytes the host sends and
//! inspect what the engine wrote back. Clones share the same buffers, so a test
//! can keep one handle while the engine owns another.

use crate::api::frame::ByteSource;
use crate::api::serial::UartTransport;
use crate::constants::API_HEADER_SIZE;
use crate::error::{BeeError, FrameError};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Mock UART that simulates bidirectional communication
#[derive(Clone, Default)]
pub struct MockUart {
    /// Data written by the engine (outgoing)
    tx_buffer: Arc<Mutex<Vec<u8>>>,
    /// Data the host has sent (incoming)
    rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated error for the next operation
    next_error: Arc<Mutex<Option<io::Error>>>,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue data to be read by the engine
    pub fn queue_rx_data(&self, data: &[u8]) {
        lock(&self.rx_buffer).extend(data);
    }

    /// Get data that was written by the engine
    pub fn get_tx_data(&self) -> Vec<u8> {
        lock(&self.tx_buffer).clone()
    }

    /// Get and clear data written by the engine
    pub fn take_tx_data(&self) -> Vec<u8> {
        std::mem::take(&mut *lock(&self.tx_buffer))
    }

    /// Bytes queued but not yet read
    pub fn pending_rx(&self) -> usize {
        lock(&self.rx_buffer).len()
    }

    /// Clear all buffers
    pub fn clear(&self) {
        lock(&self.tx_buffer).clear();
        lock(&self.rx_buffer).clear();
    }

    /// Set an error to be returned on the next operation
    pub fn set_next_error(&self, error: io::Error) {
        *lock(&self.next_error) = Some(error);
    }

    fn take_error(&self) -> Option<io::Error> {
        lock(&self.next_error).take()
    }
}

impl ByteSource for MockUart {
    fn next_byte(&mut self) -> Result<u8, FrameError> {
        if let Some(error) = self.take_error() {
            return Err(FrameError::Transport(error.to_string()));
        }
        lock(&self.rx_buffer)
            .pop_front()
            .ok_or(FrameError::Truncated)
    }
}

impl UartTransport for MockUart {
    fn poll_header(&mut self) -> Result<Option<[u8; API_HEADER_SIZE]>, BeeError> {
        if let Some(error) = self.take_error() {
            return Err(BeeError::SerialPortError(error.to_string()));
        }

        let mut rx = lock(&self.rx_buffer);
        if rx.len() < API_HEADER_SIZE {
            return Ok(None);
        }
        let mut header = [0u8; API_HEADER_SIZE];
        for (slot, byte) in header.iter_mut().zip(rx.drain(..API_HEADER_SIZE)) {
            *slot = byte;
        }
        Ok(Some(header))
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), BeeError> {
        if let Some(error) = self.take_error() {
            return Err(BeeError::SerialPortError(error.to_string()));
        }
        lock(&self.tx_buffer).extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_uart_creation() {
        let uart = MockUart::new();
        assert!(uart.get_tx_data().is_empty());
        assert_eq!(uart.pending_rx(), 0);
    }

    #[test]
    fn test_header_waits_for_three_bytes() {
        let mut uart = MockUart::new();
        uart.queue_rx_data(&[0x7E, 0x00]);
        assert_eq!(uart.poll_header().unwrap(), None);

        uart.queue_rx_data(&[0x04, 0x08]);
        assert_eq!(uart.poll_header().unwrap(), Some([0x7E, 0x00, 0x04]));
        assert_eq!(uart.next_byte(), Ok(0x08));
        assert_eq!(uart.next_byte(), Err(FrameError::Truncated));
    }

    #[test]
    fn test_clones_share_buffers() {
        let uart = MockUart::new();
        let mut engine_side = uart.clone();
        engine_side.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(uart.take_tx_data(), vec![1, 2, 3]);
        assert!(uart.get_tx_data().is_empty());
    }

    #[test]
    fn test_simulated_error() {
        let mut uart = MockUart::new();
        uart.set_next_error(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"));
        assert!(matches!(
            uart.write_all(&[0x7E]),
            Err(BeeError::SerialPortError(_))
        ));
        assert!(uart.write_all(&[0x7E]).is_ok());
    }
}
