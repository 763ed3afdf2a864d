mod common;

use common::*;
use fleetdb_core::prelude::*;

fn user_by_email(db: &Db, email: &str) -> RecordView {
    db.delegate(USER)
        .unwrap()
        .find_unique_or_throw(&FindUniqueArgs::new(WhereUnique::new("email", email)))
        .unwrap()
}

fn timestamp(view: &RecordView, field: &str) -> chrono::DateTime<chrono::Utc> {
    match view.get(field) {
        Some(Value::Timestamp(ts)) => *ts,
        other => panic!("expected a timestamp in '{field}', found {other:?}"),
    }
}

#[test]
fn every_entity_has_a_delegate() {
    let db = Db::new(fleet_schema());

    for entity in ENTITIES {
        let delegate = db.delegate(entity).unwrap();
        assert_eq!(delegate.entity().name, entity);
    }
    let Err(err) = db.delegate("Invoice") else {
        panic!("an unknown entity should have no delegate");
    };
    assert!(err.is_validation());
}

#[test]
fn create_applies_defaults_and_nested_profiles() {
    let db = seeded();

    let args = FindUniqueArgs::new(WhereUnique::new("email", "ken@acme.io"))
        .include("client_profile", Include::new());
    let ken = db
        .delegate(USER)
        .unwrap()
        .find_unique_or_throw(&args)
        .unwrap();

    assert_eq!(ken.get("role"), Some(&Value::enum_variant("CLIENT")));
    assert_eq!(ken.get("phone"), Some(&Value::Null));
    assert!(timestamp(&ken, "updated_at") >= timestamp(&ken, "created_at"));

    let profile = ken
        .relation("client_profile")
        .and_then(RelationView::as_one)
        .unwrap();
    assert_eq!(profile.get("company"), Some(&Value::from("Acme")));
    assert_eq!(profile.get("user_id"), ken.get("id"));
    assert_eq!(profile.get("credit_limit"), Some(&Value::from(money(500_000))));
}

#[test]
fn create_rejects_missing_and_mistyped_fields() {
    let db = seeded();
    let vehicles = db.delegate(VEHICLE).unwrap();

    let missing = CreateInput::new().set("plate", "FLT-900").set("make", "MAN");
    assert!(
        vehicles
            .create(&CreateArgs::new(missing))
            .unwrap_err()
            .is_validation()
    );

    let mistyped = CreateInput::new()
        .set("plate", "FLT-900")
        .set("make", "MAN")
        .set("model", "TGX")
        .set("year", "last year");
    assert!(
        vehicles
            .create(&CreateArgs::new(mistyped))
            .unwrap_err()
            .is_validation()
    );
    assert_eq!(count(&db, VEHICLE), 3);
}

#[test]
fn generated_references_are_unique_and_addressable() {
    let db = seeded();
    let trips = db.delegate(TRIP).unwrap();

    let all = trips.find_many(&FindManyArgs::new()).unwrap();
    let mut references: Vec<_> = all.iter().filter_map(|t| t.get("reference")).collect();
    references.sort_by(|a, b| Value::canonical_cmp(a, b));
    references.dedup();
    assert_eq!(references.len(), 3);

    let second = all[1].get("reference").cloned().unwrap();
    let found = trips
        .find_unique_or_throw(&FindUniqueArgs::new(WhereUnique::new("reference", second)))
        .unwrap();
    assert_eq!(found.get("id"), Some(&Value::Uint(2)));
}

#[test]
fn update_refreshes_updated_at_and_returns_the_new_row() {
    let db = seeded();
    let before = user_by_email(&db, "ken@acme.io");

    let updated = db
        .delegate(USER)
        .unwrap()
        .update(&UpdateArgs::new(
            WhereUnique::new("email", "ken@acme.io"),
            UpdateInput::new().set("name", "Kenneth").set("phone", "555-0199"),
        ))
        .unwrap();

    assert_eq!(updated.get("name"), Some(&Value::from("Kenneth")));
    assert_eq!(updated.get("phone"), Some(&Value::from("555-0199")));
    assert_eq!(
        timestamp(&updated, "created_at"),
        timestamp(&before, "created_at")
    );
    assert!(timestamp(&updated, "updated_at") >= timestamp(&before, "updated_at"));
}

#[test]
fn numeric_field_operations() {
    let db = seeded();
    let vehicles = db.delegate(VEHICLE).unwrap();

    let view = vehicles
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new()
                .increment("mileage", money(125_050))
                .increment("year", 1),
        ))
        .unwrap();
    assert_eq!(view.get("mileage"), Some(&Value::from(money(125_050))));
    assert_eq!(view.get("year"), Some(&Value::Int(2022)));

    let err = vehicles
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new().divide("mileage", 0),
        ))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn update_conflicts_and_missing_rows() {
    let db = seeded();
    let vehicles = db.delegate(VEHICLE).unwrap();

    let taken = UpdateArgs::new(by_id(3), UpdateInput::new().set("plate", "FLT-001"));
    assert!(vehicles.update(&taken).unwrap_err().is_conflict());

    let missing = UpdateArgs::new(by_id(99), UpdateInput::new().set("make", "DAF"));
    assert!(vehicles.update(&missing).unwrap_err().is_not_found());
    assert!(
        vehicles
            .delete(&DeleteArgs::new(by_id(99)))
            .unwrap_err()
            .is_not_found()
    );
}

#[test]
fn upsert_creates_then_updates() {
    let db = seeded();
    let users = db.delegate(USER).unwrap();
    let args = UpsertArgs::new(
        WhereUnique::new("email", "lin@fleet.io"),
        CreateInput::new().set("email", "lin@fleet.io").set("name", "Lin"),
        UpdateInput::new().set("name", "Lin Wei"),
    );

    let created = users.upsert(&args).unwrap();
    assert_eq!(created.get("name"), Some(&Value::from("Lin")));
    assert_eq!(count(&db, USER), 4);

    let updated = users.upsert(&args).unwrap();
    assert_eq!(updated.get("id"), created.get("id"));
    assert_eq!(updated.get("name"), Some(&Value::from("Lin Wei")));
    assert_eq!(count(&db, USER), 4);
}

#[test]
fn create_many_is_atomic_unless_skipping_duplicates() {
    let db = seeded();
    let shipments = db.delegate(SHIPMENT).unwrap();
    let shipment = |code: &str| {
        CreateInput::new()
            .set("tracking_code", code)
            .set("client_id", 1u64)
            .set("description", "crates")
            .set("weight_kg", 15)
            .set("price", money(1_000))
    };

    let strict = CreateManyArgs::new(vec![shipment("TRK-4"), shipment("TRK-1")]);
    assert!(shipments.create_many(&strict).unwrap_err().is_conflict());
    assert_eq!(count(&db, SHIPMENT), 3);

    let lenient =
        CreateManyArgs::new(vec![shipment("TRK-4"), shipment("TRK-1"), shipment("TRK-5")])
            .skip_duplicates();
    assert_eq!(shipments.create_many(&lenient).unwrap().count, 2);
    assert_eq!(count(&db, SHIPMENT), 5);
}

#[test]
fn batch_update_and_delete_report_counts() {
    let db = seeded();

    let started = db
        .delegate(TRIP)
        .unwrap()
        .update_many(
            &UpdateManyArgs::new(UpdateInput::new().set("status", "IN_PROGRESS"))
                .filter(field("driver_id").eq(1u64)),
        )
        .unwrap();
    assert_eq!(started, BatchPayload { count: 2 });

    let cleared = db
        .delegate(NOTIFICATION)
        .unwrap()
        .delete_many(&DeleteManyArgs::new().filter(field("read").eq(true)))
        .unwrap();
    assert_eq!(cleared.count, 1);
    assert_eq!(count(&db, NOTIFICATION), 2);
}

#[test]
fn find_first_or_throw_on_empty_match() {
    let db = seeded();
    let args = FindManyArgs::new().filter(field("status").eq("DELIVERED"));

    let err = db
        .delegate(SHIPMENT)
        .unwrap()
        .find_first_or_throw(&args)
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.class, ErrorClass::NotFound);
}

#[test]
fn record_views_serialize_to_json() {
    let db = seeded();
    let args = FindUniqueArgs::new(WhereUnique::new("plate", "FLT-001")).select(
        Selection::new()
            .fields(["plate", "driver_id"])
            .count("maintenance"),
    );

    let view = db
        .delegate(VEHICLE)
        .unwrap()
        .find_unique_or_throw(&args)
        .unwrap();

    assert_eq!(
        serde_json::to_value(&view).unwrap(),
        serde_json::json!({
            "plate": "FLT-001",
            "driver_id": 1,
            "_count": { "maintenance": 2 },
        })
    );
}
