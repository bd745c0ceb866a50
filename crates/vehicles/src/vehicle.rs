use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use towdesk_core::{Aggregate, AggregateRoot, DomainError, EntityId};
use towdesk_events::{Command, Event};

use crate::vin::{Vin, VinDetails};

/// Impounded vehicle identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub EntityId);

impl VehicleId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Vehicle custody lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    Impounded,
    Released,
}

/// Aggregate root: ImpoundedVehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpoundedVehicle {
    id: VehicleId,
    vin: Option<Vin>,
    lot: String,
    details: VinDetails,
    status: VehicleStatus,
    released_to: Option<String>,
    version: u64,
    created: bool,
}

impl ImpoundedVehicle {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: VehicleId) -> Self {
        Self {
            id,
            vin: None,
            lot: String::new(),
            details: VinDetails::default(),
            status: VehicleStatus::Impounded,
            released_to: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> VehicleId {
        self.id
    }

    pub fn vin(&self) -> Option<&Vin> {
        self.vin.as_ref()
    }

    pub fn lot(&self) -> &str {
        &self.lot
    }

    pub fn details(&self) -> &VinDetails {
        &self.details
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    pub fn released_to(&self) -> Option<&str> {
        self.released_to.as_deref()
    }

    /// Invariant: released vehicles accept no further mutation.
    pub fn is_in_custody(&self) -> bool {
        self.status == VehicleStatus::Impounded
    }
}

impl AggregateRoot for ImpoundedVehicle {
    type Id = VehicleId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ImpoundVehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpoundVehicle {
    pub vehicle_id: VehicleId,
    pub vin: Vin,
    pub lot: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordVinDetails.
///
/// Carries attributes from the VIN decode collaborator (or partial operator
/// entry). Only fields still unset on the vehicle are taken; a late decode
/// response never clobbers data that is already there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordVinDetails {
    pub vehicle_id: VehicleId,
    pub details: VinDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ReleaseVehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseVehicle {
    pub vehicle_id: VehicleId,
    pub released_to: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleCommand {
    ImpoundVehicle(ImpoundVehicle),
    RecordVinDetails(RecordVinDetails),
    ReleaseVehicle(ReleaseVehicle),
}

impl Command for VehicleCommand {
    fn target_id(&self) -> EntityId {
        match self {
            VehicleCommand::ImpoundVehicle(c) => c.vehicle_id.0,
            VehicleCommand::RecordVinDetails(c) => c.vehicle_id.0,
            VehicleCommand::ReleaseVehicle(c) => c.vehicle_id.0,
        }
    }
}

/// Event: VehicleImpounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleImpounded {
    pub vehicle_id: VehicleId,
    pub vin: Vin,
    pub lot: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VinDetailsRecorded. Carries only the newly filled fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VinDetailsRecorded {
    pub vehicle_id: VehicleId,
    pub details: VinDetails,
    pub occurred_at: DateTime<Utc>,
}

/// Event: VehicleReleased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleReleased {
    pub vehicle_id: VehicleId,
    pub released_to: String,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleEvent {
    VehicleImpounded(VehicleImpounded),
    VinDetailsRecorded(VinDetailsRecorded),
    VehicleReleased(VehicleReleased),
}

impl Event for VehicleEvent {
    fn event_type(&self) -> &'static str {
        match self {
            VehicleEvent::VehicleImpounded(_) => "vehicles.vehicle.impounded",
            VehicleEvent::VinDetailsRecorded(_) => "vehicles.vehicle.vin_details_recorded",
            VehicleEvent::VehicleReleased(_) => "vehicles.vehicle.released",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            VehicleEvent::VehicleImpounded(e) => e.occurred_at,
            VehicleEvent::VinDetailsRecorded(e) => e.occurred_at,
            VehicleEvent::VehicleReleased(e) => e.occurred_at,
        }
    }
}

impl Aggregate for ImpoundedVehicle {
    type Command = VehicleCommand;
    type Event = VehicleEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            VehicleEvent::VehicleImpounded(e) => {
                self.id = e.vehicle_id;
                self.vin = Some(e.vin.clone());
                self.lot = e.lot.clone();
                self.status = VehicleStatus::Impounded;
                self.created = true;
            }
            VehicleEvent::VinDetailsRecorded(e) => {
                if let Some(year) = e.details.year {
                    self.details.year = Some(year);
                }
                if let Some(make) = &e.details.make {
                    self.details.make = Some(make.clone());
                }
                if let Some(model) = &e.details.model {
                    self.details.model = Some(model.clone());
                }
            }
            VehicleEvent::VehicleReleased(e) => {
                self.status = VehicleStatus::Released;
                self.released_to = Some(e.released_to.clone());
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            VehicleCommand::ImpoundVehicle(cmd) => self.handle_impound(cmd),
            VehicleCommand::RecordVinDetails(cmd) => self.handle_record_details(cmd),
            VehicleCommand::ReleaseVehicle(cmd) => self.handle_release(cmd),
        }
    }
}

impl ImpoundedVehicle {
    fn ensure_vehicle_id(&self, vehicle_id: VehicleId) -> Result<(), DomainError> {
        if self.id != vehicle_id {
            return Err(DomainError::invariant("vehicle_id mismatch"));
        }
        Ok(())
    }

    fn handle_impound(&self, cmd: &ImpoundVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("vehicle already impounded"));
        }
        if cmd.lot.trim().is_empty() {
            return Err(DomainError::validation("storage lot must not be empty"));
        }

        Ok(vec![VehicleEvent::VehicleImpounded(VehicleImpounded {
            vehicle_id: cmd.vehicle_id,
            vin: cmd.vin.clone(),
            lot: cmd.lot.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_details(
        &self,
        cmd: &RecordVinDetails,
    ) -> Result<Vec<VehicleEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_vehicle_id(cmd.vehicle_id)?;

        if !self.is_in_custody() {
            return Err(DomainError::invariant(
                "released vehicles accept no further changes",
            ));
        }

        // Take only the fields still unset; a decode that brings nothing
        // new emits nothing.
        let fresh = VinDetails {
            year: cmd.details.year.filter(|_| self.details.year.is_none()),
            make: cmd
                .details
                .make
                .clone()
                .filter(|_| self.details.make.is_none()),
            model: cmd
                .details
                .model
                .clone()
                .filter(|_| self.details.model.is_none()),
        };
        if fresh.is_empty() {
            return Ok(vec![]);
        }

        Ok(vec![VehicleEvent::VinDetailsRecorded(VinDetailsRecorded {
            vehicle_id: cmd.vehicle_id,
            details: fresh,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_release(&self, cmd: &ReleaseVehicle) -> Result<Vec<VehicleEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_vehicle_id(cmd.vehicle_id)?;

        if self.status == VehicleStatus::Released {
            return Err(DomainError::conflict("vehicle is already released"));
        }
        if cmd.released_to.trim().is_empty() {
            return Err(DomainError::validation(
                "release claimant must not be empty",
            ));
        }

        Ok(vec![VehicleEvent::VehicleReleased(VehicleReleased {
            vehicle_id: cmd.vehicle_id,
            released_to: cmd.released_to.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
