//! Vehicles domain module (event-sourced).
//!
//! Impound and release lifecycle for towed vehicles, plus the VIN value
//! object and the best-effort VIN decode collaborator contract.

pub mod vehicle;
pub mod vin;

pub use vehicle::{
    ImpoundVehicle, ImpoundedVehicle, RecordVinDetails, ReleaseVehicle, VehicleCommand,
    VehicleEvent, VehicleId, VehicleImpounded, VehicleReleased, VehicleStatus, VinDetailsRecorded,
};
pub use vin::{Vin, VinDecoder, VinDetails};
