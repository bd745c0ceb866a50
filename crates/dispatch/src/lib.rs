//! Dispatch domain module (event-sourced).
//!
//! Business rules for tow calls and driver/truck assignment, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod call;

pub use call::{
    AssignUnit, CallCancelled, CallCompleted, CallId, CallOpened, CallStatus, CancelCall,
    CompleteCall, DispatchCall, DispatchCommand, DispatchEvent, DriverId, OpenCall, TruckId,
    UnitAssigned, UnitAssignment,
};
