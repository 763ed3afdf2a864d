mod common;

use common::*;
use fleetdb_core::prelude::*;

fn ids(db: &Db, entity: &str, filter: Predicate) -> Vec<u64> {
    db.delegate(entity)
        .unwrap()
        .find_many(&FindManyArgs::new().filter(filter))
        .unwrap()
        .iter()
        .map(|row| match row.get("id") {
            Some(Value::Uint(id)) => *id,
            other => panic!("unexpected id {other:?}"),
        })
        .collect()
}

fn get(db: &Db, entity: &str, id: u64) -> RecordView {
    db.delegate(entity)
        .unwrap()
        .find_unique_or_throw(&FindUniqueArgs::new(by_id(id)))
        .unwrap()
}

///
/// FILTERS
///

#[test]
fn filters_follow_relations_across_hops() {
    let db = seeded();

    let graces_trips = relation("driver").is(relation("user").is(field("name").eq("Grace")));
    assert_eq!(ids(&db, TRIP, graces_trips), vec![3]);

    let toll_payers = relation("expenses").some(field("category").eq("TOLL"));
    assert_eq!(ids(&db, DRIVER, toll_payers), vec![1]);

    let volvo_trips = relation("vehicle").is(field("make").eq("Volvo"));
    assert_eq!(ids(&db, TRIP, volvo_trips), vec![1, 2]);

    let clients = relation("client_profile").present();
    assert_eq!(ids(&db, USER, clients), vec![3]);
}

#[test]
fn to_many_quantifiers() {
    let db = seeded();

    let light = relation("shipments").every(field("weight_kg").lt(1000));
    assert_eq!(ids(&db, CLIENT, light), vec![1]);

    let cheap = relation("shipments").none(field("price").gt(money(20_000)));
    assert!(ids(&db, CLIENT, cheap).is_empty());

    // vacuous truth for trips without shipments
    let unloaded = relation("shipments").every(field("weight_kg").gt(100));
    assert_eq!(ids(&db, TRIP, unloaded), vec![2, 3]);
}

#[test]
fn to_one_absence() {
    let db = seeded();

    assert_eq!(ids(&db, VEHICLE, relation("driver").absent()), vec![3]);
    assert_eq!(
        ids(&db, VEHICLE, relation("driver").is_not(field("license").eq("LIC-Ada"))),
        vec![2, 3]
    );
}

///
/// NESTED WRITES
///

#[test]
fn create_connects_existing_rows() {
    let db = seeded();

    let trip = db
        .delegate(TRIP)
        .unwrap()
        .create(&CreateArgs::new(
            CreateInput::new()
                .set("origin", "Mall")
                .set("destination", "Depot")
                .connect("driver", WhereUnique::new("license", "LIC-Grace"))
                .connect_or_create(
                    "vehicle",
                    WhereUnique::new("plate", "FLT-004"),
                    CreateInput::new()
                        .set("plate", "FLT-004")
                        .set("make", "DAF")
                        .set("model", "XF")
                        .set("year", 2024),
                ),
        ))
        .unwrap();

    assert_eq!(trip.get("driver_id"), Some(&Value::Uint(2)));
    assert_eq!(trip.get("vehicle_id"), Some(&Value::Uint(4)));
    assert_eq!(count(&db, VEHICLE), 4);

    let missing = CreateInput::new()
        .set("origin", "Mall")
        .set("destination", "Depot")
        .connect("driver", WhereUnique::new("license", "LIC-Nobody"));
    let err = db
        .delegate(TRIP)
        .unwrap()
        .create(&CreateArgs::new(missing))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn connecting_a_to_one_row_releases_the_previous_one() {
    let db = seeded();

    db.delegate(DRIVER)
        .unwrap()
        .update(&UpdateArgs::new(
            by_id(2),
            UpdateInput::new().relation(
                "vehicle",
                RelationWrite::Connect(WhereUnique::new("plate", "FLT-003")),
            ),
        ))
        .unwrap();

    assert_eq!(get(&db, VEHICLE, 2).get("driver_id"), Some(&Value::Null));
    assert_eq!(get(&db, VEHICLE, 3).get("driver_id"), Some(&Value::Uint(2)));
}

#[test]
fn failed_nested_create_leaves_no_rows() {
    let db = seeded();
    let shipment = CreateInput::new()
        .set("tracking_code", "TRK-1")
        .set("description", "boxes")
        .set("weight_kg", 10)
        .set("price", money(500));
    let input = CreateInput::new()
        .set("email", "sam@globex.io")
        .set("name", "Sam")
        .create(
            "client_profile",
            CreateInput::new()
                .set("company", "Globex")
                .create("shipments", shipment),
        );

    let err = db
        .delegate(USER)
        .unwrap()
        .create(&CreateArgs::new(input))
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(count(&db, USER), 3);
    assert_eq!(count(&db, CLIENT), 1);
    assert_eq!(count(&db, SHIPMENT), 3);
}

#[test]
fn nested_batch_writes_stay_inside_the_parent() {
    let db = seeded();

    db.delegate(DRIVER)
        .unwrap()
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new().relation(
                "trips",
                RelationWrite::UpdateMany {
                    filter: field("destination").eq("Airport"),
                    data: UpdateInput::new().set("status", "COMPLETED"),
                },
            ),
        ))
        .unwrap();
    assert_eq!(
        ids(&db, TRIP, field("status").eq("COMPLETED")),
        vec![2]
    );

    db.delegate(VEHICLE)
        .unwrap()
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new().relation(
                "maintenance",
                RelationWrite::DeleteMany(field("kind").eq("OIL_CHANGE")),
            ),
        ))
        .unwrap();
    assert_eq!(count(&db, MAINTENANCE), 2);
}

#[test]
fn set_replaces_the_related_rows() {
    let db = seeded();

    db.delegate(TRIP)
        .unwrap()
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new().relation(
                "shipments",
                RelationWrite::Set(vec![
                    WhereUnique::new("tracking_code", "TRK-2"),
                    WhereUnique::new("tracking_code", "TRK-3"),
                ]),
            ),
        ))
        .unwrap();

    assert_eq!(ids(&db, SHIPMENT, field("trip_id").eq(1u64)), vec![2, 3]);
    assert_eq!(ids(&db, SHIPMENT, field("trip_id").is_null()), vec![1]);
}

#[test]
fn required_foreign_keys_cannot_be_disconnected() {
    let db = seeded();

    let err = db
        .delegate(DRIVER)
        .unwrap()
        .update(&UpdateArgs::new(
            by_id(1),
            UpdateInput::new().relation("trips", RelationWrite::Disconnect(Some(by_id(1)))),
        ))
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(get(&db, TRIP, 1).get("driver_id"), Some(&Value::Uint(1)));
}

///
/// REFERENTIAL ACTIONS
///

#[test]
fn restrict_blocks_deleting_a_client_with_shipments() {
    let db = seeded();

    let err = db
        .delegate(USER)
        .unwrap()
        .delete(&DeleteArgs::new(WhereUnique::new("email", "ken@acme.io")))
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(count(&db, USER), 3);
    assert_eq!(count(&db, CLIENT), 1);
    assert_eq!(count(&db, NOTIFICATION), 3);
}

#[test]
fn deleting_a_vehicle_cascades_and_clears_references() {
    let db = seeded();

    let deleted = db
        .delegate(VEHICLE)
        .unwrap()
        .delete(&DeleteArgs::new(by_id(1)))
        .unwrap();
    assert_eq!(deleted.get("plate"), Some(&Value::from("FLT-001")));

    assert_eq!(count(&db, MAINTENANCE), 1);
    assert_eq!(ids(&db, TRIP, field("vehicle_id").is_null()), vec![1, 2]);
    assert_eq!(ids(&db, EXPENSE, field("vehicle_id").is_null()), vec![1, 2, 3, 5]);
}

#[test]
fn deleting_a_driver_user_waits_for_their_trips() {
    let db = seeded();
    let users = db.delegate(USER).unwrap();

    let blocked = users.delete(&DeleteArgs::new(by_id(1))).unwrap_err();
    assert!(blocked.is_conflict());
    assert_eq!(count(&db, DRIVER), 2);
    assert_eq!(count(&db, EXPENSE), 5);

    let trips = db
        .delegate(TRIP)
        .unwrap()
        .delete_many(&DeleteManyArgs::new().filter(field("driver_id").eq(1u64)))
        .unwrap();
    assert_eq!(trips.count, 2);
    assert_eq!(ids(&db, SHIPMENT, field("trip_id").is_null()), vec![1, 2, 3]);

    users.delete(&DeleteArgs::new(by_id(1))).unwrap();

    assert_eq!(count(&db, USER), 2);
    assert_eq!(count(&db, DRIVER), 1);
    assert_eq!(count(&db, EXPENSE), 2);
    assert_eq!(count(&db, NOTIFICATION), 1);
    assert_eq!(get(&db, VEHICLE, 1).get("driver_id"), Some(&Value::Null));
}

///
/// TRANSACTIONS
///

#[test]
fn transactions_commit_or_roll_back_together() {
    let db = seeded();
    let vehicle = |plate: &str| {
        CreateArgs::new(
            CreateInput::new()
                .set("plate", plate)
                .set("make", "MAN")
                .set("model", "TGS")
                .set("year", 2022),
        )
    };

    let failed: Result<(), Error> = db.transaction(|db| {
        db.delegate(VEHICLE)?.create(&vehicle("FLT-010"))?;
        db.delegate(VEHICLE)?.create(&vehicle("FLT-001"))?;
        Ok(())
    });
    assert!(failed.unwrap_err().is_conflict());
    assert_eq!(count(&db, VEHICLE), 3);

    let committed: Result<(), Error> = db.transaction(|db| {
        db.delegate(VEHICLE)?.create(&vehicle("FLT-010"))?;
        db.delegate(VEHICLE)?.create(&vehicle("FLT-011"))?;
        Ok(())
    });
    committed.unwrap();
    assert_eq!(count(&db, VEHICLE), 5);
}
