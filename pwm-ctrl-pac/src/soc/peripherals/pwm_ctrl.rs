#![allow(non_snake_case, non_upper_case_globals)]
#![allow(non_camel_case_types)]
//! PWM_CTRL
//!
//! Counter, channel enable and per-channel duty registers of the PWM
//! controller. Register offsets are word indices on the 32-bit bus.

use crate::config::CHANNELS;
use crate::register::{word_address, RWRegister, RegisterArray};
use core::fmt;

/// Word index of CTRL_1
pub const CTRL_1_REG_ADDR: u32 = 0x00;

/// Word index of CTRL_2
pub const CTRL_2_REG_ADDR: u32 = 0x01;

/// Word index of CH_CTRL for channel 0; channel N is at `CH_CTRL_REG_ADDR + N`
pub const CH_CTRL_REG_ADDR: u32 = 0x02;

/// Counter value.
pub mod CTRL_1 {
    pub mod counter {
        /// Offset (0 bits)
        pub const offset: u32 = 0;
    
        /// Mask (32 bit: 0xffffffff << 0)
        pub const mask: u32 = 0xffffffff << offset;
    
        /// Read-only values (empty)
        pub mod R {}
        /// Write-only values (empty)
        pub mod W {}
        /// Read-write values (empty)
        pub mod RW {}
    
    }}

/// Channel enable mask. Bit N enables channel N; bits at or above the
/// channel count are not checked by the hardware.
pub mod CTRL_2 {
    pub mod enable {
        /// Offset (0 bits)
        pub const offset: u32 = 0;
    
        /// Mask (32 bit: 0xffffffff << 0)
        pub const mask: u32 = 0xffffffff << offset;
    
        /// Read-only values (empty)
        pub mod R {}
        /// Write-only values (empty)
        pub mod W {}
        /// Read-write values (empty)
        pub mod RW {}
    
    }

    /// Enable bit for channel `ch`
    ///
    /// The mask is 32 bits wide; `ch >= 32` has no enable bit and yields 0.
    #[inline(always)]
    pub const fn channel(ch: usize) -> u32 {
        if ch < u32::BITS as usize {
            1 << ch
        } else {
            0
        }
    }
}

/// Duty cycle of one channel.
pub mod CH_CTRL {
    pub mod duty {
        /// Offset (0 bits)
        pub const offset: u32 = 0;
    
        /// Mask (32 bit: 0xffffffff << 0)
        pub const mask: u32 = 0xffffffff << offset;
    
        /// Read-only values (empty)
        pub mod R {}
        /// Write-only values (empty)
        pub mod W {}
        /// Read-write values (empty)
        pub mod RW {}
    
    }}

pub struct RegisterBlock {
    /// Counter value.
    pub CTRL_1: RWRegister<u32>,

    /// Channel enable mask.
    pub CTRL_2: RWRegister<u32>,

    /// Duty cycle, one register per channel.
    pub CH_CTRL: RegisterArray<u32, CHANNELS>,
}

impl RegisterBlock {
    /// Register handles for a window at `base`. Addresses wrap at the top
    /// of the 32-bit space; no access happens until a handle is used.
    pub const fn at(base: u32) -> Self {
        Self {
            CTRL_1: RWRegister::new(word_address(base, CTRL_1_REG_ADDR)),
            CTRL_2: RWRegister::new(word_address(base, CTRL_2_REG_ADDR)),
            CH_CTRL: RegisterArray::new(word_address(base, CH_CTRL_REG_ADDR)),
        }
    }
}

pub struct ResetValues {
    pub CTRL_1: u32,
    pub CTRL_2: u32,
    pub CH_CTRL: u32,
}

pub struct Instance {
    pub(crate) addr: u32,
    pub(crate) regs: RegisterBlock,
}

impl Instance {
    /// Instance at a base address other than the configured one
    ///
    /// # Safety
    ///
    /// `addr` must be the base of a PWM_CTRL register window with
    /// [`CHANNELS`] channels, and no other `Instance` may refer to it.
    pub const unsafe fn new(addr: u32) -> Self {
        Self {
            addr,
            regs: RegisterBlock::at(addr),
        }
    }

    pub const fn addr(&self) -> u32 {
        self.addr
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PWM_CTRL@{:#010x}", self.addr)
    }
}

impl ::core::ops::Deref for Instance {
    type Target = RegisterBlock;
    #[inline(always)]
    fn deref(&self) -> &RegisterBlock {
        &self.regs
    }
}
