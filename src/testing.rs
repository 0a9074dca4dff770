use std::cell::RefCell;
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::Transaction;

use crate::hw_def::I2C_ADDRESS;
use crate::sink::ReadingSink;
use crate::types::PhysicalReading;

/// Calibration register reads for h0=60 h1=80 h2=3000 h3=30000 t0=410 t1=17 t2=-256 t3=738
pub fn calibration_transactions() -> Vec<Transaction> {
    vec![
        Transaction::write_read(I2C_ADDRESS, vec![0x30], vec![120]),
        Transaction::write_read(I2C_ADDRESS, vec![0x31], vec![160]),
        Transaction::write_read(I2C_ADDRESS, vec![0xB6], 3000i16.to_le_bytes().to_vec()),
        Transaction::write_read(I2C_ADDRESS, vec![0xBA], 30000i16.to_le_bytes().to_vec()),
        Transaction::write_read(I2C_ADDRESS, vec![0x32], vec![0x9A]),
        Transaction::write_read(I2C_ADDRESS, vec![0x33], vec![0x11]),
        Transaction::write_read(I2C_ADDRESS, vec![0x35], vec![0x01]),
        Transaction::write_read(I2C_ADDRESS, vec![0xBC], vec![0x00, 0xFF]),
        Transaction::write_read(I2C_ADDRESS, vec![0xBE], 738i16.to_le_bytes().to_vec()),
    ]
}

/// Monitor start-up: identity, configuration, heater reset, calibration
pub fn startup_transactions() -> Vec<Transaction> {
    let mut transactions = vec![
        Transaction::write_read(I2C_ADDRESS, vec![0x0F], vec![0xBC]),
        Transaction::write(I2C_ADDRESS, vec![0x10, 0x1b]),
        Transaction::write(I2C_ADDRESS, vec![0x20, 0x85]),
        Transaction::write_read(I2C_ADDRESS, vec![0x21], vec![0x02]),
        Transaction::write(I2C_ADDRESS, vec![0x21, 0x00]),
    ];
    transactions.extend(calibration_transactions());
    transactions
}

/// Records every millisecond delay instead of sleeping
#[derive(Clone, Default)]
pub struct RecordingDelay {
    pub delays: Rc<RefCell<Vec<u32>>>,
}

impl RecordingDelay {
    pub fn recorded(&self) -> Vec<u32> {
        self.delays.borrow().clone()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays.borrow_mut().push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.borrow_mut().push(ms);
    }
}

/// Keeps every emitted reading, optionally failing instead
#[derive(Default)]
pub struct CollectingSink {
    pub readings: Vec<PhysicalReading>,
    pub fail: bool,
}

impl ReadingSink for CollectingSink {
    type Error = ();

    fn emit(&mut self, reading: &PhysicalReading) -> Result<(), Self::Error> {
        if self.fail {
            return Err(());
        }
        self.readings.push(*reading);
        Ok(())
    }
}
