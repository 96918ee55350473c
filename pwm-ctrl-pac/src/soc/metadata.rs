pub const PERIPHERAL_MODULES: &[&str] = &[
    "pwm_ctrl",
];

pub const INSTANCE_MODULES: &[&str] = &[
    "pwm_ctrl",
];

pub const INSTANCE_NAMES: &[&str] = &[
    "PWM_CTRL",
];
