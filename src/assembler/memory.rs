//! Occupancy tracking for instruction and data memory.
//!
//! Both regions share one 12-bit address space: instructions live at
//! `0..2048` and data at `2048..3072`.
use super::error::Error;

pub const INSTRUCTION_CAPACITY: usize = 2048;
pub const DATA_CAPACITY: usize = 1024;

/// A first-fit occupancy bitmap over one memory region.
#[derive(Clone, Debug)]
pub struct Bitmap {
    region: &'static str,
    base: u16,
    slots: Vec<bool>,
}

impl Bitmap {
    pub fn new(region: &'static str, base: u16, capacity: usize) -> Self {
        Bitmap { region, base, slots: vec![false; capacity] }
    }

    /// Index of the lowest unoccupied slot.
    pub fn next_free(&self) -> Result<usize, Error> {
        self.slots.iter()
            .position(|used| !used)
            .ok_or(Error::OutOfMemory { region: self.region })
    }

    /// Marks `count` consecutive slots starting at `index` as occupied.
    /// The caller picks a free run; only the region bound is checked.
    pub fn reserve(&mut self, index: usize, count: usize) -> Result<(), Error> {
        if index + count > self.slots.len() {
            return Err(Error::OutOfMemory { region: self.region });
        }
        for slot in &mut self.slots[index..index + count] {
            *slot = true;
        }
        Ok(())
    }

    /// Logical address of a slot.
    pub fn address(&self, index: usize) -> u16 {
        self.base + index as u16
    }
}

/// The two memory regions of a K86 program.
#[derive(Clone, Debug)]
pub struct Memory {
    pub instructions: Bitmap,
    pub data: Bitmap,
}

impl Memory {
    pub fn new() -> Self {
        Memory {
            instructions: Bitmap::new("instruction", 0, INSTRUCTION_CAPACITY),
            data: Bitmap::new("data", INSTRUCTION_CAPACITY as u16, DATA_CAPACITY),
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
