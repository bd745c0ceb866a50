use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use towdesk_core::{Aggregate, AggregateRoot, DomainError, EntityId};
use towdesk_events::{Command, Event};

/// Tow call identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub EntityId);

impl CallId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CallId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Driver identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub EntityId);

impl DriverId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DriverId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Truck identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TruckId(pub EntityId);

impl TruckId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TruckId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Call status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Open,
    Assigned,
    Completed,
    Cancelled,
}

/// The driver/truck pair working a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAssignment {
    pub driver_id: DriverId,
    pub truck_id: TruckId,
}

/// Aggregate root: DispatchCall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchCall {
    id: CallId,
    reference: String,
    location: String,
    status: CallStatus,
    assignment: Option<UnitAssignment>,
    version: u64,
    created: bool,
}

impl DispatchCall {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: CallId) -> Self {
        Self {
            id,
            reference: String::new(),
            location: String::new(),
            status: CallStatus::Open,
            assignment: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> CallId {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn assignment(&self) -> Option<UnitAssignment> {
        self.assignment
    }

    /// Invariant: units can only be (re)assigned while the call is live.
    pub fn is_assignable(&self) -> bool {
        matches!(self.status, CallStatus::Open | CallStatus::Assigned)
    }
}

impl AggregateRoot for DispatchCall {
    type Id = CallId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenCall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenCall {
    pub call_id: CallId,
    /// Dispatcher-facing reference (PO / account ticket number).
    pub reference: String,
    pub location: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AssignUnit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignUnit {
    pub call_id: CallId,
    pub driver_id: DriverId,
    pub truck_id: TruckId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CompleteCall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteCall {
    pub call_id: CallId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelCall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelCall {
    pub call_id: CallId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchCommand {
    OpenCall(OpenCall),
    AssignUnit(AssignUnit),
    CompleteCall(CompleteCall),
    CancelCall(CancelCall),
}

impl Command for DispatchCommand {
    fn target_id(&self) -> EntityId {
        match self {
            DispatchCommand::OpenCall(c) => c.call_id.0,
            DispatchCommand::AssignUnit(c) => c.call_id.0,
            DispatchCommand::CompleteCall(c) => c.call_id.0,
            DispatchCommand::CancelCall(c) => c.call_id.0,
        }
    }
}

/// Event: CallOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOpened {
    pub call_id: CallId,
    pub reference: String,
    pub location: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UnitAssigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitAssigned {
    pub call_id: CallId,
    pub driver_id: DriverId,
    pub truck_id: TruckId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CallCompleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCompleted {
    pub call_id: CallId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CallCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallCancelled {
    pub call_id: CallId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchEvent {
    CallOpened(CallOpened),
    UnitAssigned(UnitAssigned),
    CallCompleted(CallCompleted),
    CallCancelled(CallCancelled),
}

impl Event for DispatchEvent {
    fn event_type(&self) -> &'static str {
        match self {
            DispatchEvent::CallOpened(_) => "dispatch.call.opened",
            DispatchEvent::UnitAssigned(_) => "dispatch.call.unit_assigned",
            DispatchEvent::CallCompleted(_) => "dispatch.call.completed",
            DispatchEvent::CallCancelled(_) => "dispatch.call.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            DispatchEvent::CallOpened(e) => e.occurred_at,
            DispatchEvent::UnitAssigned(e) => e.occurred_at,
            DispatchEvent::CallCompleted(e) => e.occurred_at,
            DispatchEvent::CallCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for DispatchCall {
    type Command = DispatchCommand;
    type Event = DispatchEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            DispatchEvent::CallOpened(e) => {
                self.id = e.call_id;
                self.reference = e.reference.clone();
                self.location = e.location.clone();
                self.status = CallStatus::Open;
                self.assignment = None;
                self.created = true;
            }
            DispatchEvent::UnitAssigned(e) => {
                self.assignment = Some(UnitAssignment {
                    driver_id: e.driver_id,
                    truck_id: e.truck_id,
                });
                self.status = CallStatus::Assigned;
            }
            DispatchEvent::CallCompleted(_) => {
                self.status = CallStatus::Completed;
            }
            DispatchEvent::CallCancelled(_) => {
                self.status = CallStatus::Cancelled;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            DispatchCommand::OpenCall(cmd) => self.handle_open(cmd),
            DispatchCommand::AssignUnit(cmd) => self.handle_assign(cmd),
            DispatchCommand::CompleteCall(cmd) => self.handle_complete(cmd),
            DispatchCommand::CancelCall(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl DispatchCall {
    fn ensure_call_id(&self, call_id: CallId) -> Result<(), DomainError> {
        if self.id != call_id {
            return Err(DomainError::invariant("call_id mismatch"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenCall) -> Result<Vec<DispatchEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("call already exists"));
        }
        if cmd.reference.trim().is_empty() {
            return Err(DomainError::validation("call reference must not be empty"));
        }

        Ok(vec![DispatchEvent::CallOpened(CallOpened {
            call_id: cmd.call_id,
            reference: cmd.reference.clone(),
            location: cmd.location.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_assign(&self, cmd: &AssignUnit) -> Result<Vec<DispatchEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_call_id(cmd.call_id)?;

        if !self.is_assignable() {
            return Err(DomainError::invariant(
                "cannot assign a unit to a completed or cancelled call",
            ));
        }

        Ok(vec![DispatchEvent::UnitAssigned(UnitAssigned {
            call_id: cmd.call_id,
            driver_id: cmd.driver_id,
            truck_id: cmd.truck_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_complete(&self, cmd: &CompleteCall) -> Result<Vec<DispatchEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_call_id(cmd.call_id)?;

        if self.status != CallStatus::Assigned {
            return Err(DomainError::invariant(
                "cannot complete a call without an assigned unit",
            ));
        }

        Ok(vec![DispatchEvent::CallCompleted(CallCompleted {
            call_id: cmd.call_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelCall) -> Result<Vec<DispatchEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_call_id(cmd.call_id)?;

        match self.status {
            CallStatus::Completed => Err(DomainError::invariant("cannot cancel a completed call")),
            CallStatus::Cancelled => Err(DomainError::conflict("call is already cancelled")),
            CallStatus::Open | CallStatus::Assigned => {
                Ok(vec![DispatchEvent::CallCancelled(CallCancelled {
                    call_id: cmd.call_id,
                    reason: cmd.reason.clone(),
                    occurred_at: cmd.occurred_at,
                })])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use towdesk_events::execute;

    fn test_call_id() -> CallId {
        CallId::new(EntityId::new())
    }

    fn test_unit() -> (DriverId, TruckId) {
        (DriverId::new(EntityId::new()), TruckId::new(EntityId::new()))
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn opened_call(call_id: CallId) -> DispatchCall {
        let mut call = DispatchCall::empty(call_id);
        let cmd = OpenCall {
            call_id,
            reference: "PO-4471".to_string(),
            location: "I-35 mile 204".to_string(),
            occurred_at: test_time(),
        };
        execute(&mut call, &DispatchCommand::OpenCall(cmd)).unwrap();
        call
    }

    #[test]
    fn open_call_emits_call_opened_event() {
        let call_id = test_call_id();
        let call = DispatchCall::empty(call_id);

        let cmd = OpenCall {
            call_id,
            reference: "PO-4471".to_string(),
            location: "I-35 mile 204".to_string(),
            occurred_at: test_time(),
        };
        let events = call.handle(&DispatchCommand::OpenCall(cmd)).unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            DispatchEvent::CallOpened(e) => {
                assert_eq!(e.call_id, call_id);
                assert_eq!(e.reference, "PO-4471");
            }
            _ => panic!("Expected CallOpened event"),
        }
    }

    #[test]
    fn open_rejects_an_empty_reference() {
        let call_id = test_call_id();
        let call = DispatchCall::empty(call_id);

        let cmd = OpenCall {
            call_id,
            reference: "  ".to_string(),
            location: "Yard".to_string(),
            occurred_at: test_time(),
        };
        let err = call.handle(&DispatchCommand::OpenCall(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn assign_then_complete_walks_the_lifecycle() {
        let call_id = test_call_id();
        let mut call = opened_call(call_id);
        let (driver_id, truck_id) = test_unit();

        execute(
            &mut call,
            &DispatchCommand::AssignUnit(AssignUnit {
                call_id,
                driver_id,
                truck_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(call.status(), CallStatus::Assigned);
        assert_eq!(call.assignment().unwrap().driver_id, driver_id);

        execute(
            &mut call,
            &DispatchCommand::CompleteCall(CompleteCall {
                call_id,
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(call.status(), CallStatus::Completed);
        assert_eq!(call.version(), 3);
    }

    #[test]
    fn cannot_complete_an_unassigned_call() {
        let call_id = test_call_id();
        let call = opened_call(call_id);

        let err = call
            .handle(&DispatchCommand::CompleteCall(CompleteCall {
                call_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg)
                if msg.contains("cannot complete a call without an assigned unit") => {}
            _ => panic!("Expected InvariantViolation for completing unassigned call"),
        }
    }

    #[test]
    fn cannot_assign_after_cancellation() {
        let call_id = test_call_id();
        let mut call = opened_call(call_id);

        execute(
            &mut call,
            &DispatchCommand::CancelCall(CancelCall {
                call_id,
                reason: Some("Customer left the scene".to_string()),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(call.status(), CallStatus::Cancelled);

        let (driver_id, truck_id) = test_unit();
        let err = call
            .handle(&DispatchCommand::AssignUnit(AssignUnit {
                call_id,
                driver_id,
                truck_id,
                occurred_at: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn reassignment_replaces_the_unit() {
        let call_id = test_call_id();
        let mut call = opened_call(call_id);
        let (first_driver, first_truck) = test_unit();
        let (second_driver, second_truck) = test_unit();

        for (driver_id, truck_id) in [(first_driver, first_truck), (second_driver, second_truck)] {
            execute(
                &mut call,
                &DispatchCommand::AssignUnit(AssignUnit {
                    call_id,
                    driver_id,
                    truck_id,
                    occurred_at: test_time(),
                }),
            )
            .unwrap();
        }

        let unit = call.assignment().unwrap();
        assert_eq!(unit.driver_id, second_driver);
        assert_eq!(unit.truck_id, second_truck);
    }

    #[test]
    fn commands_route_by_call_id() {
        let call_id = test_call_id();
        let cmd = DispatchCommand::CompleteCall(CompleteCall {
            call_id,
            occurred_at: test_time(),
        });
        assert_eq!(cmd.target_id(), call_id.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of assignments, the last one wins and
        /// the version equals the number of applied events.
        #[test]
        fn last_assignment_wins(assignments in 1usize..8) {
            let call_id = test_call_id();
            let mut call = opened_call(call_id);

            let units: Vec<(DriverId, TruckId)> =
                (0..assignments).map(|_| test_unit()).collect();
            for (driver_id, truck_id) in &units {
                execute(
                    &mut call,
                    &DispatchCommand::AssignUnit(AssignUnit {
                        call_id,
                        driver_id: *driver_id,
                        truck_id: *truck_id,
                        occurred_at: test_time(),
                    }),
                )
                .unwrap();
            }

            let unit = call.assignment().unwrap();
            let (last_driver, last_truck) = units[units.len() - 1];
            prop_assert_eq!(unit.driver_id, last_driver);
            prop_assert_eq!(unit.truck_id, last_truck);
            prop_assert_eq!(call.version(), 1 + assignments as u64);
        }
    }
}
