//! Register access primitives
//!
//! Every register access goes through a [`MemoryInterface`]. On the soft core
//! itself that is [`Mmio`], a plain volatile load/store. A host MCU reaching
//! the FPGA over a bridge supplies its own implementation (see
//! [`crate::spi::SpiMemoryInterface`]).
//!
//! The peripheral bus is 32 bits wide: register `n` of a peripheral lives at
//! byte address `base + 4 * n`.

use core::marker::PhantomData;

/// Word-granular access to the peripheral address space.
pub trait MemoryInterface {
    fn read32(&mut self, address: u32) -> u32;
    fn write32(&mut self, address: u32, value: u32);
}

impl<M> MemoryInterface for &mut M
where
    M: MemoryInterface + ?Sized,
{
    #[inline(always)]
    fn read32(&mut self, address: u32) -> u32 {
        (**self).read32(address)
    }

    #[inline(always)]
    fn write32(&mut self, address: u32, value: u32) {
        (**self).write32(address, value)
    }
}

/// Direct volatile access, for code running on the soft core.
///
/// ```no_run
/// use pwm_ctrl_pac::{pwm_ctrl, Mmio, PwmCtrl};
///
/// // PWM_CTRL sits on the core's own bus at the configured base address.
/// let bus = unsafe { Mmio::new() };
/// let mut pwm = PwmCtrl::new(pwm_ctrl::PWM_CTRL::take().unwrap(), bus);
/// pwm.set_counter(1000);
/// pwm.set_ch_duty(0, 250);
/// pwm.set_ch_enable(0b0001);
/// ```
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// # Safety
    ///
    /// Every address that reaches this interface must be a valid, word
    /// aligned device register on the local bus.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl MemoryInterface for Mmio {
    #[inline(always)]
    fn read32(&mut self, address: u32) -> u32 {
        let p = address as usize as *const u32;
        unsafe { p.read_volatile() }
    }

    #[inline(always)]
    fn write32(&mut self, address: u32, value: u32) {
        let p = address as usize as *mut u32;
        unsafe { p.write_volatile(value) }
    }
}

/// Byte address of register word `index` in the window starting at `base`.
///
/// Wraps at the top of the 32-bit address space instead of overflowing.
#[inline(always)]
pub const fn word_address(base: u32, index: u32) -> u32 {
    base.wrapping_add(index.wrapping_mul(4))
}

/// Read-write register handle
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RWRegister<T> {
    address: u32,
    _marker: PhantomData<T>,
}

impl<T> RWRegister<T> {
    pub const fn new(address: u32) -> Self {
        Self {
            address,
            _marker: PhantomData,
        }
    }

    pub const fn address(&self) -> u32 {
        self.address
    }
}

impl RWRegister<u32> {
    #[inline(always)]
    pub fn read<M: MemoryInterface + ?Sized>(&self, bus: &mut M) -> u32 {
        bus.read32(self.address)
    }

    #[inline(always)]
    pub fn write<M: MemoryInterface + ?Sized>(&self, bus: &mut M, value: u32) {
        bus.write32(self.address, value)
    }
}

/// A family of `N` consecutive read-write registers.
///
/// Indexing is checked: asking for register `N` or above yields `None`
/// instead of an address past the end of the family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RegisterArray<T, const N: usize> {
    base: u32,
    _marker: PhantomData<T>,
}

impl<T, const N: usize> RegisterArray<T, N> {
    pub const fn new(base: u32) -> Self {
        Self {
            base,
            _marker: PhantomData,
        }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    pub fn get(&self, index: usize) -> Option<RWRegister<T>> {
        if index < N {
            Some(RWRegister::new(word_address(self.base, index as u32)))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = RWRegister<T>> + '_ {
        (0..N).filter_map(move |index| self.get(index))
    }
}

/// Write to a register, either field-wise or as a whole.
///
/// Fields not named are written as zero. Values and the bus are evaluated
/// once, before any field constant is brought into scope.
///
/// ```ignore
/// write_reg!(pwm_ctrl, &mut bus, pwm, CTRL_1, counter: 1000);
/// write_reg!(pwm_ctrl, &mut bus, pwm, CTRL_2, 0b0101);
/// ```
#[macro_export]
macro_rules! write_reg {
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident, $( $field:ident : $value:expr ),+ $(,)? ) => {{
        let bus = $bus;
        let values: &[u32] = &[$( $value ),+];
        let fields: &[(u32, u32)] = &[$({ use $periph::{$reg::$field::{mask, offset}}; (mask, offset) }),+];
        let mut raw = 0u32;
        for (&(mask, offset), &value) in fields.iter().zip(values) {
            raw |= (value << offset) & mask;
        }
        $instance.$reg.write(bus, raw);
    }};
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident, $value:expr ) => {{
        let bus = $bus;
        let value: u32 = $value;
        $instance.$reg.write(bus, value);
    }};
}

/// Read-modify-write a register.
///
/// The field form replaces only the named fields; the closure form receives
/// the current value and returns the new one.
///
/// ```ignore
/// modify_reg!(pwm_ctrl, &mut bus, pwm, CTRL_2, enable: 0xff);
/// modify_reg!(pwm_ctrl, &mut bus, pwm, CTRL_2, |r| r | (1 << 3));
/// ```
#[macro_export]
macro_rules! modify_reg {
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident, $( $field:ident : $value:expr ),+ $(,)? ) => {{
        let bus = $bus;
        let values: &[u32] = &[$( $value ),+];
        let fields: &[(u32, u32)] = &[$({ use $periph::{$reg::$field::{mask, offset}}; (mask, offset) }),+];
        let mut raw = $instance.$reg.read(&mut *bus);
        for (&(mask, offset), &value) in fields.iter().zip(values) {
            raw = (raw & !mask) | ((value << offset) & mask);
        }
        $instance.$reg.write(&mut *bus, raw);
    }};
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident, | $r:ident | $expr:expr ) => {{
        let bus = $bus;
        let $r: u32 = $instance.$reg.read(&mut *bus);
        let value: u32 = $expr;
        $instance.$reg.write(&mut *bus, value);
    }};
}

/// Read a register, either as a whole or as one or more fields.
///
/// Several fields come back as a tuple in the order they were named.
///
/// ```ignore
/// let counter = read_reg!(pwm_ctrl, &mut bus, pwm, CTRL_1);
/// let mask = read_reg!(pwm_ctrl, &mut bus, pwm, CTRL_2, enable);
/// ```
#[macro_export]
macro_rules! read_reg {
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident, $( $field:ident ),+ ) => {{
        let bus = $bus;
        let raw: u32 = $instance.$reg.read(bus);
        ( $({ use $periph::{$reg::$field::{mask, offset}}; (raw & mask) >> offset }) , * )
    }};
    ( $periph:path, $bus:expr, $instance:expr, $reg:ident ) => {{
        let bus = $bus;
        $instance.$reg.read(bus)
    }};
}

/// Restore a register, or some of its fields, to the instance reset value.
///
/// ```ignore
/// reset_reg!(pwm_ctrl, &mut bus, pwm, pwm_ctrl::PWM_CTRL, CTRL_2);
/// ```
#[macro_export]
macro_rules! reset_reg {
    ( $periph:path, $bus:expr, $instance:expr, $instancemod:path, $reg:ident, $( $field:ident ),+ ) => {{
        let bus = $bus;
        let reset_value: u32 = { use $instancemod::{reset}; reset.$reg };
        let field_mask: u32 = 0 $( | { use $periph::{$reg::$field::{mask}}; mask } )+;
        let raw = $instance.$reg.read(&mut *bus);
        $instance.$reg.write(&mut *bus, (raw & !field_mask) | (reset_value & field_mask));
    }};
    ( $periph:path, $bus:expr, $instance:expr, $instancemod:path, $reg:ident ) => {{
        let bus = $bus;
        let reset_value: u32 = { use $instancemod::{reset}; reset.$reg };
        $instance.$reg.write(bus, reset_value);
    }};
}


#[cfg(test)]
mod tests {
    use super::mock::{Access, MockMemory};
    use super::*;

    #[test]
    fn word_addresses_scale_by_bus_width() {
        assert_eq!(word_address(0x1000, 0), 0x1000);
        assert_eq!(word_address(0x1000, 1), 0x1004);
        assert_eq!(word_address(0x1000, 2), 0x1008);
    }

    #[test]
    fn register_goes_through_bus() {
        let mut bus = MockMemory::new();
        let reg = RWRegister::<u32>::new(0x2004);

        reg.write(&mut bus, 0xdead_beef);
        assert_eq!(reg.read(&mut bus), 0xdead_beef);
        assert_eq!(
            bus.log,
            [Access::Write(0x2004, 0xdead_beef), Access::Read(0x2004)]
        );
    }

    #[test]
    fn borrowed_bus_forwards() {
        fn store<M: MemoryInterface>(mut bus: M) -> u32 {
            bus.write32(0x10, 7);
            bus.read32(0x10)
        }

        let mut bus = MockMemory::new();
        assert_eq!(store(&mut bus), 7);
        assert_eq!(bus.peek(0x10), 7);
    }

    #[test]
    fn array_is_bounds_checked() {
        let regs = RegisterArray::<u32, 4>::new(0x3008);
        assert_eq!(regs.len(), 4);
        assert_eq!(regs.get(0).map(|r| r.address()), Some(0x3008));
        assert_eq!(regs.get(3).map(|r| r.address()), Some(0x3014));
        assert!(regs.get(4).is_none());
        assert!(regs.get(usize::MAX).is_none());
    }

    #[allow(non_snake_case, non_upper_case_globals)]
    mod demo {
        use super::RWRegister;

        pub mod CFG {
            pub mod lo {
                pub const offset: u32 = 0;
                pub const mask: u32 = 0xff << offset;
            }
            pub mod hi {
                pub const offset: u32 = 8;
                pub const mask: u32 = 0xff << offset;
            }
        }

        pub struct ResetValues {
            pub CFG: u32,
        }

        pub mod DEMO {
            pub const reset: super::ResetValues = super::ResetValues { CFG: 0x0000_a55a };
        }

        pub struct RegisterBlock {
            pub CFG: RWRegister<u32>,
        }

        pub const BLOCK: RegisterBlock = RegisterBlock {
            CFG: RWRegister::new(0x40),
        };
    }

    #[test]
    fn write_reg_takes_caller_values_named_like_field_constants() {
        let mut bus = MockMemory::new();
        let mask: u32 = 0x12;
        let offset: u32 = 0x34;
        write_reg!(demo, &mut bus, demo::BLOCK, CFG, lo: mask, hi: offset);
        assert_eq!(bus.peek(0x40), 0x3412);

        let val: u32 = 0xdead_0001;
        write_reg!(demo, &mut bus, demo::BLOCK, CFG, val);
        assert_eq!(bus.peek(0x40), 0xdead_0001);
    }

    #[test]
    fn write_reg_clips_value_to_field() {
        let mut bus = MockMemory::new();
        let raw: u32 = 0x1ff;
        write_reg!(demo, &mut bus, demo::BLOCK, CFG, hi: raw);
        assert_eq!(bus.peek(0x40), 0xff00);
    }

    #[test]
    fn modify_reg_field_form_keeps_other_bits() {
        let mut bus = MockMemory::new();
        bus.poke(0x40, 0xffff_ffff);
        let mask: u32 = 0x0f;
        modify_reg!(demo, &mut bus, demo::BLOCK, CFG, hi: mask);
        assert_eq!(bus.peek(0x40), 0xffff_0fff);

        let offset: u32 = 0x00;
        let val: u32 = 0x21;
        modify_reg!(demo, &mut bus, demo::BLOCK, CFG, lo: offset, hi: val);
        assert_eq!(bus.peek(0x40), 0xffff_2100);
    }

    #[test]
    fn modify_reg_closure_form_sees_current_value() {
        let mut bus = MockMemory::new();
        bus.poke(0x40, 0x0f);
        let mask: u32 = 0xf0;
        modify_reg!(demo, &mut bus, demo::BLOCK, CFG, |bus| bus | mask);
        assert_eq!(bus.peek(0x40), 0xff);
    }

    #[test]
    fn read_reg_fields_and_whole() {
        let mut bus = MockMemory::new();
        bus.poke(0x40, 0x0000_beef);
        let offset = read_reg!(demo, &mut bus, demo::BLOCK, CFG, lo);
        let (mask, val) = read_reg!(demo, &mut bus, demo::BLOCK, CFG, hi, lo);
        assert_eq!(offset, 0xef);
        assert_eq!((mask, val), (0xbe, 0xef));
        assert_eq!(read_reg!(demo, &mut bus, demo::BLOCK, CFG), 0xbeef);
    }

    #[test]
    fn reset_reg_whole_and_fields() {
        let mut bus = MockMemory::new();
        bus.poke(0x40, 0xffff_ffff);
        reset_reg!(demo, &mut bus, demo::BLOCK, demo::DEMO, CFG, hi);
        assert_eq!(bus.peek(0x40), 0xffff_a5ff);

        reset_reg!(demo, &mut bus, demo::BLOCK, demo::DEMO, CFG);
        assert_eq!(bus.peek(0x40), 0x0000_a55a);
    }

    #[test]
    fn word_address_wraps_at_top_of_space() {
        assert_eq!(word_address(0xffff_fff8, 1), 0xffff_fffc);
        assert_eq!(word_address(0xffff_fff8, 2), 0x0000_0000);
        let regs = RegisterArray::<u32, 4>::new(0xffff_fffc);
        assert_eq!(regs.get(1).map(|r| r.address()), Some(0x0000_0000));
    }

    #[test]
    fn array_iterates_in_address_order() {
        let regs = RegisterArray::<u32, 3>::new(0x100);
        let addresses: std::vec::Vec<u32> = regs.iter().map(|r| r.address()).collect();
        assert_eq!(addresses, [0x100, 0x104, 0x108]);
    }
}
