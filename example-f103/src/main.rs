#![no_main]
#![no_std]

/*
  Connections:
    A4 - CS_N - PMOD1A.1
    A5 - SCK  - PMOD1A.2
    A6 - MISO - PMOD1A.3
    A7 - MOSI - PMOD1A.4

  The SoC must be built with PWM_CTRL inside the bridge window
  (byte address below 0x40000), e.g. PWM_CTRL_BASE=0x1000.
*/

use panic_semihosting as _;
use cortex_m as _;

use cortex_m_rt::entry;
use stm32f1xx_hal::prelude::*;
use stm32f1xx_hal::stm32;
use stm32f1xx_hal::spi::Spi;
use stm32f1xx_hal::delay::Delay;
use stm32f1xx_hal::gpio::State;
use embedded_hal::spi::MODE_0;
use embedded_hal::digital::v2::OutputPin as _;
use pwm_ctrl_pac::pwm_ctrl;
use pwm_ctrl_pac::spi::SpiMemoryInterface;
use pwm_ctrl_pac::PwmCtrl;

// Counter period, in PWM clock ticks.
const PERIOD: u32 = 1000;
const STEP: u32 = 25;

#[entry]
fn main() -> ! {
    let dp = stm32::Peripherals::take().unwrap();
    let cp = stm32::CorePeripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.use_hse(8.mhz()).sysclk(72.mhz()).pclk1(36.mhz()).freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain(&mut rcc.apb2);
    let mut gpioa = dp.GPIOA.split(&mut rcc.apb2);
    let mut gpioc = dp.GPIOC.split(&mut rcc.apb2);

    let mut led = gpioc.pc13.into_open_drain_output_with_state(&mut gpioc.crh, State::High);

    let cs = gpioa.pa4.into_push_pull_output_with_state(&mut gpioa.crl, State::High);
    let sck = gpioa.pa5.into_alternate_push_pull(&mut gpioa.crl);
    let miso = gpioa.pa6.into_floating_input(&mut gpioa.crl);
    let mosi = gpioa.pa7.into_alternate_push_pull(&mut gpioa.crl);
    let spi = Spi::spi1(
        dp.SPI1,
        (sck, miso, mosi),
        &mut afio.mapr,
        MODE_0,
        4.mhz(),
        clocks,
        &mut rcc.apb2
    );

    let delay = Delay::new(cp.SYST, clocks);

    let bridge = SpiMemoryInterface::new(spi, cs, delay);
    let mut pwm = PwmCtrl::new(pwm_ctrl::PWM_CTRL::take().unwrap(), bridge);

    pwm.reset();
    pwm.critical(|pwm| {
        pwm.set_counter(PERIOD);
        for ch in 0..pwm.channel_count() {
            pwm.set_ch_duty(ch, 0);
        }
        pwm.set_ch_enable(u32::MAX >> (32 - pwm.channel_count()));
    });

    if let Some(e) = pwm.bus_mut().take_error() {
        panic!("PWM_CTRL setup failed: {:?}", e);
    }

    // Ramp channel 0 up while channel 1 ramps down.
    let mut duty = 0u32;
    loop {
        pwm.bus_mut().delay_mut().delay_ms(20u32);

        led.set_low().ok();

        duty = if duty >= PERIOD { 0 } else { duty + STEP };
        pwm.set_ch_duty(0, duty);
        pwm.set_ch_duty(1, PERIOD - duty);

        let readback = pwm.ch_duty(0);
        if readback != duty {
            panic!("Duty mismatch: {:#x} => {:#x}", duty, readback);
        }

        led.set_high().ok();
    }
}
