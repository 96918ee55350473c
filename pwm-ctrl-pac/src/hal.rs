//! PWM controller driver
//!
//! [`PwmCtrl`] pairs a `PWM_CTRL` [`Instance`] with the bus it is reached
//! through and exposes the controller's three registers by name. Each call
//! is one immediate bus transaction (two for the read-modify-write helpers);
//! nothing is cached and nothing is sequenced on the caller's behalf.
//!
//! ```ignore
//! let mut pwm = PwmCtrl::new(pwm_ctrl::PWM_CTRL::take().unwrap(), bus);
//! pwm.set_counter(1000);
//! pwm.set_ch_duty(0, 250);
//! pwm.set_ch_enable(0b0001);
//! ```

use core::fmt;

use crate::config::CHANNELS;
use crate::pwm_ctrl::{self, Instance, CTRL_2};
use crate::register::{MemoryInterface, RWRegister};
use crate::{modify_reg, read_reg, reset_reg, write_reg};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The channel index is not below the implemented channel count.
    ChannelOutOfRange { channel: usize, channels: usize },
    /// More duty values were supplied than there are channels.
    TooManyValues { values: usize, channels: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ChannelOutOfRange { channel, channels } => {
                write!(f, "channel {} out of range (controller has {})", channel, channels)
            }
            Error::TooManyValues { values, channels } => {
                write!(f, "{} duty values for {} channels", values, channels)
            }
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

fn check_channel(channel: usize) -> Result<()> {
    if channel < CHANNELS {
        Ok(())
    } else {
        Err(Error::ChannelOutOfRange {
            channel,
            channels: CHANNELS,
        })
    }
}

pub struct PwmCtrl<M> {
    inst: Instance,
    bus: M,
}

impl<M> PwmCtrl<M>
where
    M: MemoryInterface,
{
    pub fn new(inst: Instance, bus: M) -> Self {
        debug!("pwm_ctrl: {:#x}, {} channels", inst.addr(), CHANNELS);
        Self { inst, bus }
    }

    /// Give back the instance and the bus.
    pub fn free(self) -> (Instance, M) {
        (self.inst, self.bus)
    }

    pub fn instance(&self) -> &Instance {
        &self.inst
    }

    pub fn bus_mut(&mut self) -> &mut M {
        &mut self.bus
    }

    pub fn channel_count(&self) -> usize {
        CHANNELS
    }

    pub fn set_counter(&mut self, value: u32) {
        trace!("pwm_ctrl: CTRL_1 <- {:#x}", value);
        write_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_1, counter: value);
    }

    pub fn counter(&mut self) -> u32 {
        let value = read_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_1, counter);
        trace!("pwm_ctrl: CTRL_1 -> {:#x}", value);
        value
    }

    /// Write the whole channel enable mask. Bits above the channel count are
    /// passed through untouched.
    pub fn set_ch_enable(&mut self, mask: u32) {
        trace!("pwm_ctrl: CTRL_2 <- {:#x}", mask);
        write_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_2, enable: mask);
    }

    pub fn ch_enable(&mut self) -> u32 {
        let mask = read_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_2, enable);
        trace!("pwm_ctrl: CTRL_2 -> {:#x}", mask);
        mask
    }

    /// Set the duty register of channel `ch`.
    ///
    /// An index at or above the channel count trips a debug assertion; in
    /// release builds the write is dropped.
    pub fn set_ch_duty(&mut self, ch: usize, value: u32) {
        debug_assert!(ch < CHANNELS, "PWM channel {} out of range", ch);
        if self.try_set_ch_duty(ch, value).is_err() {
            warn!("pwm_ctrl: dropped duty write to channel {}", ch);
        }
    }

    /// Duty register of channel `ch`.
    ///
    /// An index at or above the channel count trips a debug assertion; in
    /// release builds it reads as 0.
    pub fn ch_duty(&mut self, ch: usize) -> u32 {
        debug_assert!(ch < CHANNELS, "PWM channel {} out of range", ch);
        self.try_ch_duty(ch).unwrap_or_else(|_| {
            warn!("pwm_ctrl: dropped duty read of channel {}", ch);
            0
        })
    }

    fn duty_register(&self, ch: usize) -> Result<RWRegister<u32>> {
        self.inst.CH_CTRL.get(ch).ok_or(Error::ChannelOutOfRange {
            channel: ch,
            channels: CHANNELS,
        })
    }

    pub fn try_set_ch_duty(&mut self, ch: usize, value: u32) -> Result<()> {
        let reg = self.duty_register(ch)?;
        trace!("pwm_ctrl: CH_CTRL[{}] <- {:#x}", ch, value);
        reg.write(&mut self.bus, value);
        Ok(())
    }

    pub fn try_ch_duty(&mut self, ch: usize) -> Result<u32> {
        let reg = self.duty_register(ch)?;
        let value = reg.read(&mut self.bus);
        trace!("pwm_ctrl: CH_CTRL[{}] -> {:#x}", ch, value);
        Ok(value)
    }

    /// Write `values` to channels `0..values.len()`.
    pub fn set_duties(&mut self, values: &[u32]) -> Result<()> {
        if values.len() > CHANNELS {
            return Err(Error::TooManyValues {
                values: values.len(),
                channels: CHANNELS,
            });
        }
        for (ch, (reg, value)) in self.inst.CH_CTRL.iter().zip(values).enumerate() {
            trace!("pwm_ctrl: CH_CTRL[{}] <- {:#x}", ch, value);
            reg.write(&mut self.bus, *value);
        }
        Ok(())
    }

    pub fn duties(&mut self) -> [u32; CHANNELS] {
        let mut duties = [0; CHANNELS];
        for (ch, (duty, reg)) in duties.iter_mut().zip(self.inst.CH_CTRL.iter()).enumerate() {
            *duty = reg.read(&mut self.bus);
            trace!("pwm_ctrl: CH_CTRL[{}] -> {:#x}", ch, *duty);
        }
        duties
    }

    pub fn enable_channel(&mut self, ch: usize) -> Result<()> {
        check_channel(ch)?;
        trace!("pwm_ctrl: CTRL_2 |= {:#x}", CTRL_2::channel(ch));
        modify_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_2, |r| r | CTRL_2::channel(ch));
        Ok(())
    }

    pub fn disable_channel(&mut self, ch: usize) -> Result<()> {
        check_channel(ch)?;
        trace!("pwm_ctrl: CTRL_2 &= !{:#x}", CTRL_2::channel(ch));
        modify_reg!(pwm_ctrl, &mut self.bus, self.inst, CTRL_2, |r| r & !CTRL_2::channel(ch));
        Ok(())
    }

    pub fn is_channel_enabled(&mut self, ch: usize) -> Result<bool> {
        check_channel(ch)?;
        Ok(self.ch_enable() & CTRL_2::channel(ch) != 0)
    }

    /// Borrow one channel. `None` if `ch` is not implemented.
    pub fn channel(&mut self, ch: usize) -> Option<Channel<'_, M>> {
        check_channel(ch).ok()?;
        Some(Channel { pwm: self, index: ch })
    }

    /// Put every register back to its reset value. Channels are disabled
    /// first so no output sees a half-reset configuration.
    pub fn reset(&mut self) {
        debug!("pwm_ctrl: reset");
        trace!("pwm_ctrl: CTRL_2, CTRL_1, CH_CTRL[..] <- reset");
        reset_reg!(pwm_ctrl, &mut self.bus, self.inst, pwm_ctrl::PWM_CTRL, CTRL_2);
        reset_reg!(pwm_ctrl, &mut self.bus, self.inst, pwm_ctrl::PWM_CTRL, CTRL_1);
        for reg in self.inst.CH_CTRL.iter() {
            reg.write(&mut self.bus, pwm_ctrl::PWM_CTRL::reset.CH_CTRL);
        }
    }

    /// Run `f` with interrupts masked, for updates that span several
    /// registers.
    pub fn critical<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        critical_section::with(|_| f(self))
    }
}

/// One PWM channel of a [`PwmCtrl`]
pub struct Channel<'a, M> {
    pwm: &'a mut PwmCtrl<M>,
    index: usize,
}

impl<M> Channel<'_, M>
where
    M: MemoryInterface,
{
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn duty(&mut self) -> u32 {
        self.pwm.ch_duty(self.index)
    }

    pub fn set_duty(&mut self, value: u32) {
        self.pwm.set_ch_duty(self.index, value)
    }

    pub fn enable(&mut self) {
        // index was checked when the view was created
        let _ = self.pwm.enable_channel(self.index);
    }

    pub fn disable(&mut self) {
        let _ = self.pwm.disable_channel(self.index);
    }

    pub fn is_enabled(&mut self) -> bool {
        self.pwm.ch_enable() & CTRL_2::channel(self.index) != 0
    }
}
