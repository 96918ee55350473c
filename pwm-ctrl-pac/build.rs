use std::env;
use std::fs;
use std::path::PathBuf;

const BASE_VAR: &str = "PWM_CTRL_BASE";
const CHANNELS_VAR: &str = "PWM_CTRL_CHANNELS";

const DEFAULT_BASE: u32 = 0x1000;
const DEFAULT_CHANNELS: u32 = 8;

// CTRL_2 carries one enable bit per channel.
const MAX_CHANNELS: u32 = 32;

// CTRL_1, CTRL_2, then one CH_CTRL word per channel.
const FIXED_REGISTERS: u32 = 2;

fn parse_number(s: &str) -> Option<u32> {
    let s = s.trim().replace('_', "");
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

fn read_var(name: &str, default: u32) -> u32 {
    match env::var(name) {
        Ok(value) => parse_number(&value)
            .unwrap_or_else(|| panic!("{}: cannot parse {:?} as a number", name, value)),
        Err(_) => default,
    }
}

fn main() {
    let base = read_var(BASE_VAR, DEFAULT_BASE);
    let channels = read_var(CHANNELS_VAR, DEFAULT_CHANNELS);

    assert!(base % 4 == 0, "{}: {:#x} is not word aligned", BASE_VAR, base);
    assert!(
        (1..=MAX_CHANNELS).contains(&channels),
        "{}: {} channels requested, supported range is 1..={}",
        CHANNELS_VAR, channels, MAX_CHANNELS
    );

    let window = (FIXED_REGISTERS + channels) * 4;
    assert!(
        base.checked_add(window).is_some(),
        "{}: register window {:#x}+{:#x} overflows the 32-bit address space",
        BASE_VAR, base, window
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let config = format!(
        "/// Byte address of the PWM_CTRL register window.
pub const BASE_ADDRESS: u32 = {:#x};

/// Number of PWM channels implemented by the peripheral.
pub const CHANNELS: usize = {};
",
        base, channels
    );
    fs::write(out_dir.join("config.rs"), config).unwrap();

    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed={}", BASE_VAR);
    println!("cargo:rerun-if-env-changed={}", CHANNELS_VAR);
}
