// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

#![no_main]
#![no_std]

use core::cell::RefCell;

use cortex_m_rt::{entry, exception};
use critical_section::Mutex;
use log::{error, info, LevelFilter};
use panic_halt as _;

use hal::{
    gpio::{Alternate, PD5, PD6},
    i2c::{BlockingI2c, Mode},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f7xx_hal as hal;

use antenna_tracker::{
    config::{capacity, TrackerConfig},
    control::{AttitudeController, SweepSetpoint},
    drivers::{hmc5883l, mpu6050, Hmc5883l, Mpu6050},
    estimator::Estimator,
    hw::{clock, LinkPort, ServoTimer, Usart},
    logging::BufferedLogger,
    motors::Actuator,
    pipeline::Channels,
    protocol::{ProtocolEngine, TelemetryTimers, Work},
    sched::{Periodic, WorkQueue},
    sensors,
    transport::SerialLink,
};

type LinkPins = (PD5<Alternate<7>>, PD6<Alternate<7>>);

static LOGGER: BufferedLogger<{ capacity::LOG }> = BufferedLogger::new(LevelFilter::Info);

static CHANNELS: Channels = Channels::new();
static LINK: SerialLink = SerialLink::new();
static WORK: WorkQueue<Work, { capacity::WORK }> = WorkQueue::new();

static PORT: Mutex<RefCell<Option<LinkPort<pac::USART2, LinkPins>>>> =
    Mutex::new(RefCell::new(None));
static TIMERS: Mutex<RefCell<Option<TelemetryTimers>>> = Mutex::new(RefCell::new(None));

/// Sensor I2C transaction timeout.
const I2C_TIMEOUT_US: u32 = 10_000;

fn park() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}

/// Stop after a bring-up failure, still flushing the log to the console.
fn halt(console: &mut Usart<pac::USART1>) -> ! {
    loop {
        LOGGER.drain(|b| console.try_write_byte(b));
    }
}

#[entry]
fn main() -> ! {
    // Peripherals
    let (Some(dp), Some(cp)) = (pac::Peripherals::take(), cortex_m::Peripherals::take()) else {
        park();
    };

    let config = TrackerConfig::default();

    // Clocks
    let mut rcc = dp.RCC.constrain();
    let clocks = rcc.cfgr.freeze();

    // GPIO
    let gpioa = dp.GPIOA.split();
    let gpiob = dp.GPIOB.split();
    let gpiod = dp.GPIOD.split();

    // USART1 (DBG)
    let tx = gpioa.pa9.into_alternate::<7>();
    let rx = gpioa.pa10.into_alternate::<7>();
    let usart_cfg = Config {
        baud_rate: 115_200.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART1, (tx, rx), &clocks, usart_cfg);
    let mut console = Usart::new(serial);
    LOGGER.register_static();
    info!("antenna tracker, sysclk {} Hz", clocks.sysclk().raw());

    // USART2 (MAVLink)
    let tx = gpiod.pd5.into_alternate::<7>();
    let rx = gpiod.pd6.into_alternate::<7>();
    let link_cfg = Config {
        baud_rate: 57_600.bps(),
        ..Default::default()
    };
    let serial = Serial::new(dp.USART2, (tx, rx), &clocks, link_cfg);
    critical_section::with(|cs| {
        PORT.borrow(cs).replace(Some(LinkPort::new(serial)));
    });
    let dtr = gpiod.pd3.into_pull_up_input();

    // I2C1 (MPU-6050)
    let scl = gpiob.pb8.into_alternate_open_drain::<4>();
    let sda = gpiob.pb9.into_alternate_open_drain::<4>();
    let i2c1 = BlockingI2c::i2c1(
        dp.I2C1,
        (scl, sda),
        Mode::fast(400_000.Hz()),
        &clocks,
        &mut rcc.apb1,
        I2C_TIMEOUT_US,
    );

    // I2C2 (HMC5883L)
    let scl = gpiob.pb10.into_alternate_open_drain::<4>();
    let sda = gpiob.pb11.into_alternate_open_drain::<4>();
    let i2c2 = BlockingI2c::i2c2(
        dp.I2C2,
        (scl, sda),
        Mode::fast(400_000.Hz()),
        &clocks,
        &mut rcc.apb1,
        I2C_TIMEOUT_US,
    );

    // TIM4 CH1/CH2 (servos)
    let _ch1 = gpiob.pb6.into_alternate::<2>();
    let _ch2 = gpiob.pb7.into_alternate::<2>();
    let servos = ServoTimer::tim4(
        dp.TIM4,
        clocks.timclk1().raw(),
        config.altitude_channel.period_us as u16,
    );

    // Sensors
    let mut imu = match Mpu6050::new(i2c1, mpu6050::DEFAULT_ADDRESS) {
        Ok(imu) => imu,
        Err(e) => {
            error!("MPU-6050 probe failed: {:?}", e);
            halt(&mut console);
        }
    };
    let mut mag = match Hmc5883l::new(i2c2, hmc5883l::DEFAULT_ADDRESS) {
        Ok(mag) => mag,
        Err(e) => {
            error!("HMC5883L probe failed: {:?}", e);
            halt(&mut console);
        }
    };

    // Clock and telemetry timers
    critical_section::with(|cs| {
        TIMERS
            .borrow(cs)
            .replace(Some(TelemetryTimers::new(&config.protocol)));
    });
    let _syst = clock::start(cp.SYST, clocks.sysclk().raw());
    unsafe { cortex_m::peripheral::NVIC::unmask(pac::Interrupt::USART2) };

    // Pipeline stages
    let mut estimator = Estimator::new(config.estimator);
    let mut controller = AttitudeController::new(&config);
    let mut actuator = Actuator::new(servos, config.altitude_channel, config.azimuth_channel);
    let mut sweep = SweepSetpoint::new(config.sweep);
    let mut engine = ProtocolEngine::new(&config.protocol, &LINK, &WORK, || {
        critical_section::with(|cs| {
            if let Some(port) = PORT.borrow(cs).borrow_mut().as_mut() {
                port.start_tx();
            }
        });
    });

    let now = clock::now_ms();
    let mut imu_poll = Periodic::started(config.imu_poll_period_ms, now);
    let mut mag_poll = Periodic::started(config.mag_poll_period_ms, now);
    CHANNELS.command.send_latest(sweep.start(now));
    let mut link_up = false;

    info!("calibrating, keep the tracker still");

    loop {
        let now = clock::now_ms();

        if imu_poll.poll(now) {
            sensors::produce(&mut imu, &CHANNELS.imu, now);
        }
        if mag_poll.poll(now) {
            sensors::produce(&mut mag, &CHANNELS.mag, now);
        }

        let _ = estimator.step(&CHANNELS.imu, &CHANNELS.mag, &CHANNELS.attitude);
        let _ = controller.step(&CHANNELS.attitude, &CHANNELS.command, &CHANNELS.motor);
        while actuator.step(&CHANNELS.motor).is_ok() {}

        if let Some(setpoint) = sweep.poll(now) {
            CHANNELS.command.send_latest(setpoint);
        }

        let up = dtr.is_low();
        if up != link_up {
            link_up = up;
            critical_section::with(|cs| {
                if let Some(timers) = TIMERS.borrow(cs).borrow_mut().as_mut() {
                    timers.set_link_up(up, now);
                }
            });
        }

        engine.drain_work(now);
        LOGGER.drain(|b| console.try_write_byte(b));
    }
}

#[exception]
fn SysTick() {
    let now = clock::tick();
    critical_section::with(|cs| {
        if let Some(timers) = TIMERS.borrow(cs).borrow_mut().as_mut() {
            timers.poll(now, &WORK);
        }
    });
}

#[interrupt]
fn USART2() {
    critical_section::with(|cs| {
        if let Some(port) = PORT.borrow(cs).borrow_mut().as_mut() {
            port.service(&LINK, &WORK);
        }
    });
}
