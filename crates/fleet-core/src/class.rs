//! Vehicle classes and their static performance figures.
//!
//! A class is a closed enum; its numbers live in a `ClassSpec` looked up from
//! a `ClassTable`, so a configuration file can retune a class without adding
//! new variants.

use std::str::FromStr;

use crate::FleetError;

/// Size class of a delivery vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum VehicleClass {
    Mini,
    #[default]
    Standard,
    Large,
    Mega,
}

impl VehicleClass {
    pub const ALL: [VehicleClass; 4] = [
        VehicleClass::Mini,
        VehicleClass::Standard,
        VehicleClass::Large,
        VehicleClass::Mega,
    ];

    /// Label used in CSV columns and alert messages.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleClass::Mini     => "mini",
            VehicleClass::Standard => "standard",
            VehicleClass::Large    => "large",
            VehicleClass::Mega     => "mega",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleClass {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mini"     => Ok(VehicleClass::Mini),
            "standard" => Ok(VehicleClass::Standard),
            "large"    => Ok(VehicleClass::Large),
            "mega"     => Ok(VehicleClass::Mega),
            other      => Err(FleetError::Parse(format!("unknown vehicle class {other:?}"))),
        }
    }
}

// ── ClassSpec ─────────────────────────────────────────────────────────────────

/// Immutable performance figures for one class.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassSpec {
    /// Display colour (RGB).
    pub color:            [u8; 3],
    /// Relative marker size for renderers.
    pub size:             f32,
    /// Multiplier on the base speed (cells per tick).
    pub speed_multiplier: f32,
    /// Cargo capacity in units.
    pub capacity:         u32,
    /// Fuel tank capacity.
    pub tank_capacity:    f32,
    /// Fuel burned per cell travelled at full speed.
    pub fuel_per_cell:    f32,
    /// Cost of one scheduled maintenance visit.
    pub maintenance_cost: f64,
}

impl ClassSpec {
    /// Cells per tick for a given base speed.
    #[inline]
    pub fn speed(&self, base_speed: f32) -> f32 {
        base_speed * self.speed_multiplier
    }
}

// ── ClassTable ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClassTable {
    pub mini:     ClassSpec,
    pub standard: ClassSpec,
    pub large:    ClassSpec,
    pub mega:     ClassSpec,
}

impl ClassTable {
    pub fn get(&self, class: VehicleClass) -> &ClassSpec {
        match class {
            VehicleClass::Mini     => &self.mini,
            VehicleClass::Standard => &self.standard,
            VehicleClass::Large    => &self.large,
            VehicleClass::Mega     => &self.mega,
        }
    }
}

impl Default for ClassTable {
    fn default() -> Self {
        Self {
            mini: ClassSpec {
                color:            [0x4c, 0xaf, 0x50],
                size:             0.7,
                speed_multiplier: 1.3,
                capacity:         10,
                tank_capacity:    60.0,
                fuel_per_cell:    0.06,
                maintenance_cost: 120.0,
            },
            standard: ClassSpec {
                color:            [0x21, 0x96, 0xf3],
                size:             1.0,
                speed_multiplier: 1.0,
                capacity:         20,
                tank_capacity:    100.0,
                fuel_per_cell:    0.10,
                maintenance_cost: 200.0,
            },
            large: ClassSpec {
                color:            [0xff, 0x98, 0x00],
                size:             1.3,
                speed_multiplier: 0.8,
                capacity:         35,
                tank_capacity:    150.0,
                fuel_per_cell:    0.14,
                maintenance_cost: 320.0,
            },
            mega: ClassSpec {
                color:            [0x9c, 0x27, 0xb0],
                size:             1.6,
                speed_multiplier: 0.6,
                capacity:         50,
                tank_capacity:    200.0,
                fuel_per_cell:    0.18,
                maintenance_cost: 450.0,
            },
        }
    }
}
