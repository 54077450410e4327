//! nRF24L01+ transceiver adapter.
//!
//! Implements [`RadioLink`] over an `embedded-hal` [`SpiDevice`] plus the CE
//! output.  Link settings are shared by every node of the mesh: channel 24,
//! 250 kbps, −6 dBm, CRC-16, auto-ack with 8 retries 1000 µs apart, dynamic
//! payload length.
//!
//! Every role owns one pipe address (`"0GrpE"`..`"3GrpE"`, LSB first).  A
//! node transmits on its own address (mirrored on pipe 0 for the auto-ack)
//! and listens for the three peers on pipes 1-3.  Pipes 2 and 3 only take
//! the distinguishing LSB; the upper bytes are shared with pipe 1.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use log::{debug, info};

use crate::app::ports::RadioLink;
use crate::error::RadioError;
use crate::protocol::{Frame, Role};
use crate::sources::FrameInbox;

// ── Registers ─────────────────────────────────────────────────
const CONFIG: u8 = 0x00;
const EN_AA: u8 = 0x01;
const EN_RXADDR: u8 = 0x02;
const SETUP_AW: u8 = 0x03;
const SETUP_RETR: u8 = 0x04;
const RF_CH: u8 = 0x05;
const RF_SETUP: u8 = 0x06;
const STATUS: u8 = 0x07;
const RX_ADDR_P0: u8 = 0x0A;
const TX_ADDR: u8 = 0x10;
const FIFO_STATUS: u8 = 0x17;
const DYNPD: u8 = 0x1C;
const FEATURE: u8 = 0x1D;

// ── Commands ──────────────────────────────────────────────────
const R_REGISTER: u8 = 0x00;
const W_REGISTER: u8 = 0x20;
const R_RX_PL_WID: u8 = 0x60;
const R_RX_PAYLOAD: u8 = 0x61;
const W_TX_PAYLOAD: u8 = 0xA0;
const FLUSH_TX: u8 = 0xE1;
const FLUSH_RX: u8 = 0xE2;
const NOP: u8 = 0xFF;

// ── Bits ──────────────────────────────────────────────────────
const EN_CRC: u8 = 0x08;
const CRCO: u8 = 0x04;
const PWR_UP: u8 = 0x02;
const PRIM_RX: u8 = 0x01;
const RX_DR: u8 = 0x40;
const TX_DS: u8 = 0x20;
const MAX_RT: u8 = 0x10;
const RX_EMPTY: u8 = 0x01;
const EN_DPL: u8 = 0x04;

pub const CHANNEL: u8 = 24;
/// 1000 µs auto-retransmit delay, 8 retransmits.
const RETRIES: u8 = 0x38;
/// 250 kbps, −6 dBm.
const RF_250K_6DBM: u8 = 0x24;
/// 5-byte addresses.
const AW_5: u8 = 0x03;
const MAX_PAYLOAD: usize = 32;
/// Polls of 100 µs while waiting for TX_DS / MAX_RT.
const TX_POLLS: u32 = 200;

/// Pipe address of `role`, LSB first.
pub const fn pipe_address(role: Role) -> [u8; 5] {
    [b'0' + role.address(), b'G', b'r', b'p', b'E']
}

pub struct Nrf24<SPI, CE, D> {
    spi: SPI,
    ce: CE,
    delay: D,
    role: Role,
    listening: bool,
}

impl<SPI, CE, D> Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    pub fn new(spi: SPI, ce: CE, delay: D, role: Role) -> Self {
        Self {
            spi,
            ce,
            delay,
            role,
            listening: false,
        }
    }

    /// Program the link settings and pipes, then power up in receive mode.
    pub fn configure(&mut self) -> Result<(), RadioError> {
        self.ce.set_low().map_err(|_| RadioError::Pin)?;
        // Power-on reset settling.
        self.delay.delay_ms(5);

        self.write_reg(SETUP_AW, AW_5)?;
        if self.read_reg(SETUP_AW)? != AW_5 {
            return Err(RadioError::NotPresent);
        }

        self.write_reg(CONFIG, EN_CRC | CRCO)?;
        self.write_reg(SETUP_RETR, RETRIES)?;
        self.write_reg(RF_SETUP, RF_250K_6DBM)?;
        self.write_reg(RF_CH, CHANNEL)?;
        self.write_reg(EN_AA, 0x3F)?;
        self.write_reg(FEATURE, EN_DPL)?;
        self.write_reg(DYNPD, 0x3F)?;

        let role = self.role;
        let own = pipe_address(role);
        self.write_addr(TX_ADDR, &own)?;
        self.write_addr(RX_ADDR_P0, &own)?;
        let mut pipe = 1u8;
        for peer in Role::ALL.into_iter().filter(|r| *r != role) {
            let addr = pipe_address(peer);
            if pipe == 1 {
                self.write_addr(RX_ADDR_P0 + pipe, &addr)?;
            } else {
                self.write_addr(RX_ADDR_P0 + pipe, &addr[..1])?;
            }
            pipe += 1;
        }
        self.write_reg(EN_RXADDR, 0x0F)?;

        self.write_reg(STATUS, RX_DR | TX_DS | MAX_RT)?;
        self.flush(FLUSH_RX)?;
        self.flush(FLUSH_TX)?;

        self.start_listening()?;
        info!("RADIO | nRF24 up as {} on channel {CHANNEL}", self.role);
        Ok(())
    }

    /// Pop the next frame from the RX FIFO, `None` once it is empty.
    ///
    /// Payloads that are not exactly one 32-bit word are discarded.
    pub fn read_frame(&mut self) -> Result<Option<Frame>, RadioError> {
        loop {
            if self.read_reg(FIFO_STATUS)? & RX_EMPTY != 0 {
                return Ok(None);
            }

            let mut wid = [R_RX_PL_WID, 0];
            self.command(&mut wid)?;
            let len = usize::from(wid[1]);
            if len == 0 || len > MAX_PAYLOAD {
                // Corrupt width: the FIFO has to be flushed.
                self.flush(FLUSH_RX)?;
                return Ok(None);
            }

            let mut buf = [0u8; MAX_PAYLOAD + 1];
            buf[0] = R_RX_PAYLOAD;
            self.command(&mut buf[..=len])?;
            self.write_reg(STATUS, RX_DR)?;

            if len == 4 {
                return Ok(Some(Frame::from_wire([buf[1], buf[2], buf[3], buf[4]])));
            }
            debug!("RADIO | dropped {len}-byte payload");
        }
    }

    /// Move every pending frame into `inbox`.  Returns how many were posted.
    pub fn drain_into(&mut self, inbox: &FrameInbox) -> Result<usize, RadioError> {
        let mut n = 0;
        while let Some(frame) = self.read_frame()? {
            inbox.post(frame);
            n += 1;
        }
        Ok(n)
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    // ── SPI primitives ────────────────────────────────────────

    fn command(&mut self, buf: &mut [u8]) -> Result<u8, RadioError> {
        self.spi.transfer_in_place(buf).map_err(|_| RadioError::Bus)?;
        Ok(buf[0])
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, RadioError> {
        let mut buf = [R_REGISTER | reg, 0];
        self.command(&mut buf)?;
        Ok(buf[1])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), RadioError> {
        self.command(&mut [W_REGISTER | reg, value]).map(drop)
    }

    fn write_addr(&mut self, reg: u8, addr: &[u8]) -> Result<(), RadioError> {
        let mut buf = [0u8; 6];
        buf[0] = W_REGISTER | reg;
        buf[1..=addr.len()].copy_from_slice(addr);
        self.command(&mut buf[..=addr.len()]).map(drop)
    }

    fn flush(&mut self, cmd: u8) -> Result<(), RadioError> {
        self.command(&mut [cmd]).map(drop)
    }

    fn status(&mut self) -> Result<u8, RadioError> {
        self.command(&mut [NOP])
    }
}

impl<SPI, CE, D> RadioLink for Nrf24<SPI, CE, D>
where
    SPI: SpiDevice,
    CE: OutputPin,
    D: DelayNs,
{
    fn send(&mut self, frame: Frame) -> Result<(), RadioError> {
        let mut buf = [W_TX_PAYLOAD, 0, 0, 0, 0];
        buf[1..].copy_from_slice(&frame.to_wire());
        self.command(&mut buf)?;

        self.ce.set_high().map_err(|_| RadioError::Pin)?;
        let mut outcome = Err(RadioError::Timeout);
        for _ in 0..TX_POLLS {
            let status = self.status()?;
            if status & TX_DS != 0 {
                outcome = Ok(());
                break;
            }
            if status & MAX_RT != 0 {
                outcome = Err(RadioError::NoAck);
                break;
            }
            self.delay.delay_us(100);
        }
        self.ce.set_low().map_err(|_| RadioError::Pin)?;

        self.write_reg(STATUS, TX_DS | MAX_RT)?;
        if outcome.is_err() {
            self.flush(FLUSH_TX)?;
        }
        outcome
    }

    fn start_listening(&mut self) -> Result<(), RadioError> {
        self.write_reg(CONFIG, EN_CRC | CRCO | PWR_UP | PRIM_RX)?;
        self.write_reg(STATUS, RX_DR | TX_DS | MAX_RT)?;
        self.ce.set_high().map_err(|_| RadioError::Pin)?;
        // RX settling.
        self.delay.delay_us(130);
        self.listening = true;
        Ok(())
    }

    fn stop_listening(&mut self) -> Result<(), RadioError> {
        self.ce.set_low().map_err(|_| RadioError::Pin)?;
        self.delay.delay_us(100);
        self.write_reg(CONFIG, EN_CRC | CRCO | PWR_UP)?;
        self.listening = false;
        Ok(())
    }
}
