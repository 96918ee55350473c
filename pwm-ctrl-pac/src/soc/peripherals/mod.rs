pub mod pwm_ctrl;
