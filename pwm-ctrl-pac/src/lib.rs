#![no_std]

#[cfg(test)]
extern crate std;

#[cfg(all(target_arch = "arm", target_os = "none"))]
use cortex_m as _;

#[macro_use]
mod fmt;

pub mod register;
pub use crate::register::{MemoryInterface, Mmio};
pub use crate::register::{RWRegister, RegisterArray};

mod soc;
pub use soc::*;

/// Build-time integration parameters (`PWM_CTRL_BASE`, `PWM_CTRL_CHANNELS`)
pub mod config {
    include!(concat!(env!("OUT_DIR"), "/config.rs"));
}

pub mod hal;
pub use hal::{Channel, Error, PwmCtrl, Result};

pub mod spi;
