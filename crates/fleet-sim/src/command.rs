//! Manual triggers from the embedding application.

use fleet_core::{VehicleClass, VehicleId};
use fleet_dispatch::{ExternalOrder, OrderRequest};
use fleet_grid::BlockageRequest;

/// A request queued with [`Sim::submit`][crate::Sim::submit] or sent through
/// a [`SimHandle`][crate::SimHandle].  Applied at the next tick boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Unset request fields are randomized.
    CreateOrder(OrderRequest),
    CreateBlockage(BlockageRequest),
    ForceBreakdown(VehicleId),
    AddVehicle(VehicleClass),
    RemoveVehicle(VehicleId),
    /// Replace synthetic generation with a finite order set.
    LoadExternalOrders { orders: Vec<ExternalOrder>, source: String },
    SetSpeed(f32),
}

impl Command {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateOrder(_)             => "create_order",
            Command::CreateBlockage(_)          => "create_blockage",
            Command::ForceBreakdown(_)          => "force_breakdown",
            Command::AddVehicle(_)              => "add_vehicle",
            Command::RemoveVehicle(_)           => "remove_vehicle",
            Command::LoadExternalOrders { .. }  => "load_external_orders",
            Command::SetSpeed(_)                => "set_speed",
        }
    }
}
