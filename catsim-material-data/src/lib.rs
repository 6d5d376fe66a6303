#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A set of material records packed into one binary blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialBundle {
    pub version: String,
    pub entries: Vec<BundleEntry>,
}

/// One bundled record, keyed by the file name it was read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleEntry {
    pub key: String,
    pub record: MaterialRecord,
}

/// Density and elemental make-up of one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRecord {
    /// Display name from the file header. Empty when the file carries none.
    pub name: String,
    /// g/cm³
    pub density: f64,
    /// Element rows in file order.
    pub elements: Vec<ElementFraction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementFraction {
    pub atomic_number: u16,
    pub mass_fraction: f64,
}

impl ElementFraction {
    pub fn new(atomic_number: u16, mass_fraction: f64) -> Self {
        Self {
            atomic_number,
            mass_fraction,
        }
    }
}

impl MaterialRecord {
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Sum of all mass fractions. Legacy files drift from 1.0 by rounding.
    pub fn total_fraction(&self) -> f64 {
        self.elements.iter().map(|e| e.mass_fraction).sum()
    }

    /// Mass fraction of element `z`, if the material contains it.
    pub fn mass_fraction(&self, z: u16) -> Option<f64> {
        self.elements
            .iter()
            .find(|e| e.atomic_number == z)
            .map(|e| e.mass_fraction)
    }

    pub fn atomic_numbers(&self) -> impl Iterator<Item = u16> + '_ {
        self.elements.iter().map(|e| e.atomic_number)
    }

    /// Returns a copy whose fractions are rescaled to sum to exactly 1.0.
    ///
    /// A record with a non-positive total is returned unchanged.
    pub fn normalized(&self) -> MaterialRecord {
        let total = self.total_fraction();
        let elements = if total > 0.0 {
            self.elements
                .iter()
                .map(|e| ElementFraction::new(e.atomic_number, e.mass_fraction / total))
                .collect()
        } else {
            self.elements.clone()
        };
        MaterialRecord {
            name: self.name.clone(),
            density: self.density,
            elements,
        }
    }
}
