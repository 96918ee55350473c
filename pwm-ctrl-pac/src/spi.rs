//! SPI bridge to the FPGA bus
//!
//! For a host MCU that reaches the soft-core SoC through its SPI slave port
//! instead of sharing its bus. Each access is one chip-select framed
//! transaction:
//!
//! ```text
//! read:  0x03 addr_lo addr_hi 0x00 d0 d1 d2 d3   (d* clocked back)
//! write: 0x02 addr_lo addr_hi d0 d1 d2 d3
//! ```
//!
//! The address is the 16-bit word index (`byte_address >> 2`), and data is
//! little-endian.

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

use crate::register::MemoryInterface;

const CMD_WRITE: u8 = 0x02;
const CMD_READ: u8 = 0x03;

// Clocked out while the bridge shifts read data back.
const FILL: u8 = 0xcc;

/// Highest byte address the bridge's 16-bit word index can reach.
pub const MAX_ADDRESS: u32 = 0xffff << 2;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError<E> {
    /// The SPI peripheral reported a failure.
    Spi(E),
    /// The address cannot be expressed as a 16-bit word index.
    Address(u32),
}

pub struct SpiMemoryInterface<SPI, CS, DELAY>
where
    SPI: Transfer<u8>,
{
    spi: SPI,
    cs: CS,
    delay: DELAY,
    error: Option<BridgeError<SPI::Error>>,
}

impl<SPI, CS, DELAY> SpiMemoryInterface<SPI, CS, DELAY>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
    DELAY: DelayUs<u32>,
{
    pub fn new(spi: SPI, mut cs: CS, delay: DELAY) -> Self {
        cs.set_high().ok();
        Self {
            spi,
            cs,
            delay,
            error: None,
        }
    }

    pub fn free(self) -> (SPI, CS, DELAY) {
        (self.spi, self.cs, self.delay)
    }

    pub fn delay_mut(&mut self) -> &mut DELAY {
        &mut self.delay
    }

    /// Take the first failure since the last call, if any.
    pub fn take_error(&mut self) -> Option<BridgeError<SPI::Error>> {
        self.error.take()
    }

    fn latch(&mut self, error: BridgeError<SPI::Error>) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn word_index(&mut self, address: u32) -> Option<[u8; 2]> {
        if address > MAX_ADDRESS {
            warn!("spi bridge: address {:#x} out of reach", address);
            self.latch(BridgeError::Address(address));
            return None;
        }
        let index = (address >> 2) as u16;
        Some(index.to_le_bytes())
    }

    fn select(&mut self) {
        self.cs.set_low().ok();
        self.delay.delay_us(1);
    }

    fn deselect(&mut self) {
        self.delay.delay_us(1);
        self.cs.set_high().ok();
        self.delay.delay_us(1);
    }
}

impl<SPI, CS, DELAY> MemoryInterface for SpiMemoryInterface<SPI, CS, DELAY>
where
    SPI: Transfer<u8>,
    CS: OutputPin,
    DELAY: DelayUs<u32>,
{
    fn read32(&mut self, address: u32) -> u32 {
        let address = match self.word_index(address) {
            Some(address) => address,
            None => return 0,
        };

        self.select();

        let mut buffer = [CMD_READ, address[0], address[1], 0x00, FILL, FILL, FILL, FILL];
        let result = self
            .spi
            .transfer(&mut buffer)
            .map(|rx| u32::from_le_bytes([rx[4], rx[5], rx[6], rx[7]]));

        self.deselect();

        match result {
            Ok(value) => value,
            Err(e) => {
                self.latch(BridgeError::Spi(e));
                0
            }
        }
    }

    fn write32(&mut self, address: u32, value: u32) {
        let address = match self.word_index(address) {
            Some(address) => address,
            None => return,
        };
        let value = value.to_le_bytes();

        self.select();

        let mut buffer = [CMD_WRITE, address[0], address[1], value[0], value[1], value[2], value[3]];
        let result = self.spi.transfer(&mut buffer).map(|_| ());

        self.deselect();

        if let Err(e) = result {
            self.latch(BridgeError::Spi(e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::rc::Rc;
    use std::vec::Vec;

    #[derive(Clone, Debug, Eq, PartialEq)]
    enum Event {
        CsLow,
        CsHigh,
        Frame(Vec<u8>),
    }

    type Trace = Rc<RefCell<Vec<Event>>>;

    struct MockSpi {
        trace: Trace,
        reply: [u8; 4],
        fail: bool,
    }

    impl Transfer<u8> for MockSpi {
        type Error = ();

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], ()> {
            self.trace.borrow_mut().push(Event::Frame(words.to_vec()));
            if self.fail {
                return Err(());
            }
            if words[0] == CMD_READ {
                words[4..8].copy_from_slice(&self.reply);
            }
            Ok(words)
        }
    }

    struct MockCs {
        trace: Trace,
    }

    impl OutputPin for MockCs {
        type Error = ();

        fn set_low(&mut self) -> Result<(), ()> {
            self.trace.borrow_mut().push(Event::CsLow);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), ()> {
            self.trace.borrow_mut().push(Event::CsHigh);
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayUs<u32> for NoDelay {
        fn delay_us(&mut self, _us: u32) {}
    }

    fn bridge(reply: [u8; 4], fail: bool) -> (SpiMemoryInterface<MockSpi, MockCs, NoDelay>, Trace) {
        let trace = Trace::default();
        let spi = MockSpi {
            trace: trace.clone(),
            reply,
            fail,
        };
        let cs = MockCs {
            trace: trace.clone(),
        };
        let bridge = SpiMemoryInterface::new(spi, cs, NoDelay);
        trace.borrow_mut().clear();
        (bridge, trace)
    }

    #[test]
    fn write_frame() {
        let (mut bridge, trace) = bridge([0; 4], false);
        bridge.write32(0x1008, 0x1234_5678);

        assert_eq!(
            *trace.borrow(),
            [
                Event::CsLow,
                Event::Frame(std::vec![0x02, 0x02, 0x04, 0x78, 0x56, 0x34, 0x12]),
                Event::CsHigh,
            ]
        );
        assert!(bridge.take_error().is_none());
    }

    #[test]
    fn read_frame() {
        let (mut bridge, trace) = bridge([0xef, 0xbe, 0xad, 0xde], false);
        assert_eq!(bridge.read32(0x1004), 0xdead_beef);

        assert_eq!(
            *trace.borrow(),
            [
                Event::CsLow,
                Event::Frame(std::vec![0x03, 0x01, 0x04, 0x00, FILL, FILL, FILL, FILL]),
                Event::CsHigh,
            ]
        );
    }

    #[test]
    fn spi_failure_is_latched() {
        let (mut bridge, trace) = bridge([0xff; 4], true);
        assert_eq!(bridge.read32(0x1000), 0);
        bridge.write32(0x1000, 1);

        assert_eq!(bridge.take_error(), Some(BridgeError::Spi(())));
        assert!(bridge.take_error().is_none());
        // chip select is released even when the transfer fails
        assert_eq!(trace.borrow().last(), Some(&Event::CsHigh));
    }

    #[test]
    fn unreachable_address_is_not_sent() {
        let (mut bridge, trace) = bridge([0; 4], false);
        bridge.write32(MAX_ADDRESS + 4, 1);
        assert_eq!(bridge.read32(0x4000_0000), 0);

        assert!(trace.borrow().is_empty());
        assert_eq!(
            bridge.take_error(),
            Some(BridgeError::Address(MAX_ADDRESS + 4))
        );
    }

    #[test]
    fn drives_the_pwm_controller() {
        use crate::hal::PwmCtrl;
        use crate::pwm_ctrl::Instance;

        let (bridge, trace) = bridge([0; 4], false);
        let mut pwm = PwmCtrl::new(unsafe { Instance::new(0x800) }, bridge);
        pwm.set_ch_duty(3, 64);

        let frames: Vec<Vec<u8>> = trace
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Frame(f) => Some(f.clone()),
                _ => None,
            })
            .collect();
        // 0x800 + (2 + 3) * 4 = 0x814, word index 0x205
        assert_eq!(frames, [std::vec![0x02, 0x05, 0x02, 64, 0, 0, 0]]);
    }
}
