#![allow(non_snake_case, non_upper_case_globals)]
#![allow(non_camel_case_types)]
//! PWM_CTRL

pub use super::super::peripherals::pwm_ctrl::Instance;
pub use super::super::peripherals::pwm_ctrl::{RegisterBlock, ResetValues};
pub use super::super::peripherals::pwm_ctrl::{CTRL_1, CTRL_2, CH_CTRL};
pub use super::super::peripherals::pwm_ctrl::{CTRL_1_REG_ADDR, CTRL_2_REG_ADDR, CH_CTRL_REG_ADDR};


/// Access functions for the PWM_CTRL peripheral instance
pub mod PWM_CTRL {
    use super::ResetValues;
    use super::{Instance, RegisterBlock};
    use crate::config::BASE_ADDRESS;

    const INSTANCE: Instance = Instance {
        addr: BASE_ADDRESS,
        regs: RegisterBlock::at(BASE_ADDRESS),
    };

    /// Reset values for each field in PWM_CTRL
    pub const reset: ResetValues = ResetValues {
        CTRL_1: 0x0,
        CTRL_2: 0x0,
        CH_CTRL: 0x0,
    };

    static mut PWM_CTRL_TAKEN: bool = false;

    /// Safe access to PWM_CTRL
    ///
    /// This function returns `Some(Instance)` if this instance is not
    /// currently taken, and `None` if it is. This ensures that if you
    /// do get `Some(Instance)`, you are ensured unique access to
    /// the peripheral and there cannot be data races (unless other
    /// code uses `unsafe`, of course). You can then pass the
    /// `Instance` around to other functions as required. When you're
    /// done with it, you can call `release(instance)` to return it.
    ///
    /// `Instance` itself dereferences to a `RegisterBlock`, which
    /// provides access to the peripheral's registers.
    #[inline]
    pub fn take() -> Option<Instance> {
        critical_section::with(|_| unsafe {
            if PWM_CTRL_TAKEN {
                None
            } else {
                PWM_CTRL_TAKEN = true;
                Some(INSTANCE)
            }
        })
    }

    /// Release exclusive access to PWM_CTRL
    ///
    /// This function allows you to return an `Instance` so that it
    /// is available to `take()` again. This function will panic if
    /// you return a different `Instance` or if this instance is not
    /// already taken.
    #[inline]
    pub fn release(inst: Instance) {
        let released = critical_section::with(|_| unsafe {
            if PWM_CTRL_TAKEN && inst.addr == INSTANCE.addr {
                PWM_CTRL_TAKEN = false;
                true
            } else {
                false
            }
        });
        if !released {
            panic!("Released a peripheral which was not taken");
        }
    }

    /// Unsafely steal PWM_CTRL
    ///
    /// This function is similar to take() but forcibly takes the
    /// Instance, marking it as taken irregardless of its previous
    /// state.
    #[inline]
    pub unsafe fn steal() -> Instance {
        critical_section::with(|_| unsafe { PWM_CTRL_TAKEN = true });
        INSTANCE
    }

    /// Unsafely obtains an instance of PWM_CTRL
    ///
    /// This will not check if `take()` or `steal()` have already been called
    /// before. It is the caller's responsibility to use the returned instance
    /// in a safe way that does not conflict with other instances.
    #[inline]
    pub unsafe fn conjure() -> Instance {
        INSTANCE
    }
}

/// Base address of PWM_CTRL
///
/// Registers are reached through a `MemoryInterface`; this address is
/// what the interface sees for `CTRL_1`.
pub const PWM_CTRL: u32 = crate::config::BASE_ADDRESS;
