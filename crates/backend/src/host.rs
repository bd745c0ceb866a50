//! Host glue: wires the editable domain state to the remote collaborators.
//!
//! These functions are what the UI layer calls on its discrete input events.
//! They keep the domain's failure semantics: one best-effort attempt per
//! edit, and a failed or stale collaborator response never touches row state.

use chrono::Utc;
use tracing::warn;

use towdesk_charges::{ChargeSheet, LookupTicket, SuggestionOutcome, TotalsChanged};
use towdesk_events::execute;
use towdesk_vehicles::{ImpoundedVehicle, RecordVinDetails, VehicleCommand};

use crate::api::{ChargeStore, PriceService, VinService};
use crate::client::ClientError;

/// Pull the persisted item list and rebuild the sheet's rows from it.
///
/// Returns the totals notification when the refresh moved the grand total.
pub async fn refresh_sheet<S: ChargeStore>(
    store: &S,
    sheet: &mut ChargeSheet,
) -> Result<Option<TotalsChanged>, ClientError> {
    let items = store.fetch_items(sheet.invoice_id()).await?;
    sheet.sync_persisted(&items);
    Ok(sheet.take_totals_changed(Utc::now()))
}

/// Push the full edited row list for the host to persist.
pub async fn persist_sheet<S: ChargeStore>(
    store: &S,
    sheet: &ChargeSheet,
) -> Result<(), ClientError> {
    store.push_items(sheet.invoice_id(), &sheet.draft_items()).await
}

/// Resolve an outstanding lookup ticket against the remote price service
/// and apply the answer. Failures degrade to "no suggestion"; stale answers
/// are dropped by the sheet.
pub async fn lookup_and_apply<S: PriceService>(
    service: &S,
    sheet: &mut ChargeSheet,
    ticket: &LookupTicket,
) -> SuggestionOutcome {
    match service.lookup_price(&ticket.description, &ticket.item_group).await {
        Ok(suggestion) => sheet.apply_suggestion(ticket, suggestion),
        Err(err) => {
            warn!(
                description = %ticket.description,
                error = %err,
                "price lookup failed; leaving row unchanged"
            );
            SuggestionOutcome::NoSuggestion
        }
    }
}

/// Decode the vehicle's VIN and record whatever details are still missing.
///
/// Returns whether anything new was recorded. Decode failures are logged and
/// swallowed; the vehicle keeps whatever the operator entered.
pub async fn decode_and_record<S: VinService>(
    service: &S,
    vehicle: &mut ImpoundedVehicle,
) -> anyhow::Result<bool> {
    let Some(vin) = vehicle.vin().cloned() else {
        return Ok(false);
    };
    let details = match service.decode_vin(&vin).await {
        Ok(Some(details)) if !details.is_empty() => details,
        Ok(_) => return Ok(false),
        Err(err) => {
            warn!(vin = %vin, error = %err, "VIN decode failed");
            return Ok(false);
        }
    };

    let events = execute(
        vehicle,
        &VehicleCommand::RecordVinDetails(RecordVinDetails {
            vehicle_id: vehicle.id_typed(),
            details,
            occurred_at: Utc::now(),
        }),
    )?;
    Ok(!events.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryBackend;
    use towdesk_charges::{InvoiceId, ItemId, PersistedItem};
    use towdesk_core::{EntityId, TaxRate};
    use towdesk_vehicles::{ImpoundVehicle, VehicleId, Vin, VinDetails};

    fn test_invoice() -> InvoiceId {
        InvoiceId::new(EntityId::new())
    }

    fn persisted(id: &str, description: &str, quantity: i64, price: i64) -> PersistedItem {
        PersistedItem {
            id: ItemId::new(id),
            description: description.to_string(),
            quantity,
            price,
            extended: None,
        }
    }

    fn impounded_vehicle(vin: &Vin) -> ImpoundedVehicle {
        let vehicle_id = VehicleId::new(EntityId::new());
        let mut vehicle = ImpoundedVehicle::empty(vehicle_id);
        execute(
            &mut vehicle,
            &VehicleCommand::ImpoundVehicle(ImpoundVehicle {
                vehicle_id,
                vin: vin.clone(),
                lot: "Yard A".to_string(),
                occurred_at: Utc::now(),
            }),
        )
        .unwrap();
        vehicle
    }

    #[tokio::test]
    async fn refresh_edit_lookup_persist_round_trip() {
        let mut backend = InMemoryBackend::new();
        backend.set_price("towing", "Winch out", Some(5_000), Some(2));
        let invoice = test_invoice();
        backend.seed_items(invoice, vec![persisted("a", "Hook up", 1, 6_000)]);

        let mut sheet = ChargeSheet::new(invoice, "towing", TaxRate::ZERO);
        let changed = refresh_sheet(&backend, &mut sheet).await.unwrap();
        assert_eq!(changed.unwrap().totals.total, 6_000);

        let entry = sheet.entry_row();
        let ticket = sheet.set_description(entry, "Winch out").unwrap().unwrap();
        let outcome = lookup_and_apply(&backend, &mut sheet, &ticket).await;
        assert_eq!(outcome, SuggestionOutcome::Applied);
        assert_eq!(sheet.find_row(entry).unwrap().extended(), 10_000);

        persist_sheet(&backend, &sheet).await.unwrap();

        let mut fresh = ChargeSheet::new(invoice, "towing", TaxRate::ZERO);
        refresh_sheet(&backend, &mut fresh).await.unwrap();
        assert_eq!(fresh.actual_rows().count(), 2);
        assert_eq!(fresh.totals().total, 16_000);
    }

    #[tokio::test]
    async fn a_lookup_resolving_after_a_newer_edit_is_dropped() {
        let mut backend = InMemoryBackend::new();
        backend.set_price("towing", "Winch out", Some(5_000), Some(2));

        let mut sheet = ChargeSheet::new(test_invoice(), "towing", TaxRate::ZERO);
        let entry = sheet.entry_row();
        let ticket = sheet.set_description(entry, "Winch out").unwrap().unwrap();

        // The operator keeps typing before the lookup resolves.
        sheet.set_description(entry, "Winch out - heavy").unwrap();

        let outcome = lookup_and_apply(&backend, &mut sheet, &ticket).await;
        assert_eq!(outcome, SuggestionOutcome::Stale);
        let row = sheet.find_row(entry).unwrap();
        assert_eq!(row.description(), "Winch out - heavy");
        assert_eq!(row.unit_price(), 0);
    }

    #[tokio::test]
    async fn offline_refresh_surfaces_the_error_and_keeps_state() {
        let backend = InMemoryBackend::new();
        let invoice = test_invoice();
        backend.seed_items(invoice, vec![persisted("a", "Hook up", 1, 6_000)]);

        let mut sheet = ChargeSheet::new(invoice, "towing", TaxRate::ZERO);
        refresh_sheet(&backend, &mut sheet).await.unwrap();

        backend.set_offline(true);
        let err = refresh_sheet(&backend, &mut sheet).await.unwrap_err();
        assert!(matches!(err, ClientError::Offline));
        assert_eq!(sheet.actual_rows().count(), 1);
    }

    #[tokio::test]
    async fn failed_lookups_leave_the_row_unchanged() {
        let backend = InMemoryBackend::new();
        let mut sheet = ChargeSheet::new(test_invoice(), "towing", TaxRate::ZERO);
        let entry = sheet.entry_row();
        let ticket = sheet.set_description(entry, "Storage").unwrap().unwrap();

        backend.set_offline(true);
        let outcome = lookup_and_apply(&backend, &mut sheet, &ticket).await;
        assert_eq!(outcome, SuggestionOutcome::NoSuggestion);
        assert_eq!(sheet.find_row(entry).unwrap().quantity(), 0);
    }

    #[tokio::test]
    async fn decode_and_record_fills_missing_details_once() {
        let vin = Vin::parse("1HGCM82633A004352").unwrap();
        let mut backend = InMemoryBackend::new();
        backend.set_vin_details(
            &vin,
            VinDetails {
                year: Some(2003),
                make: Some("Honda".to_string()),
                model: Some("Accord".to_string()),
            },
        );

        let mut vehicle = impounded_vehicle(&vin);
        assert!(decode_and_record(&backend, &mut vehicle).await.unwrap());
        assert_eq!(vehicle.details().make.as_deref(), Some("Honda"));

        // Everything already filled: a second decode records nothing.
        assert!(!decode_and_record(&backend, &mut vehicle).await.unwrap());
    }

    #[tokio::test]
    async fn decode_failures_are_swallowed() {
        let vin = Vin::parse("1HGCM82633A004352").unwrap();
        let backend = InMemoryBackend::new();
        backend.set_offline(true);

        let mut vehicle = impounded_vehicle(&vin);
        assert!(!decode_and_record(&backend, &mut vehicle).await.unwrap());
        assert!(vehicle.details().is_empty());
    }
}
