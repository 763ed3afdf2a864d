//! Full fleet-management schema and seed data shared by the integration
//! tests.

#![allow(dead_code)]

use fleetdb_core::prelude::*;
use rust_decimal::Decimal;

pub const USER: &str = "User";
pub const DRIVER: &str = "DriverProfile";
pub const CLIENT: &str = "ClientProfile";
pub const VEHICLE: &str = "Vehicle";
pub const MAINTENANCE: &str = "Maintenance";
pub const TRIP: &str = "Trip";
pub const SHIPMENT: &str = "Shipment";
pub const EXPENSE: &str = "Expense";
pub const NOTIFICATION: &str = "Notification";

pub const ENTITIES: [&str; 9] = [
    USER,
    DRIVER,
    CLIENT,
    VEHICLE,
    MAINTENANCE,
    TRIP,
    SHIPMENT,
    EXPENSE,
    NOTIFICATION,
];

fn id() -> FieldModel {
    FieldModel::required("id", FieldKind::Uint).default(FieldDefault::Autoincrement)
}

fn status(name: &str, variants: &[&str], default: &str) -> FieldModel {
    FieldModel::required("status", FieldKind::enumeration(name, variants))
        .default_value(Value::enum_variant(default))
}

fn timestamps(entity: EntityModel) -> EntityModel {
    entity
        .field(FieldModel::required("created_at", FieldKind::Timestamp).default(FieldDefault::Now))
        .field(
            FieldModel::required("updated_at", FieldKind::Timestamp)
                .default(FieldDefault::UpdatedAt),
        )
}

fn user() -> EntityModel {
    timestamps(
        EntityModel::new(USER, "id")
            .field(id())
            .field(FieldModel::required("email", FieldKind::Text).unique())
            .field(FieldModel::required("name", FieldKind::Text))
            .field(
                FieldModel::required(
                    "role",
                    FieldKind::enumeration("Role", &["ADMIN", "DRIVER", "CLIENT"]),
                )
                .default_value(Value::enum_variant("CLIENT")),
            )
            .field(FieldModel::optional("phone", FieldKind::Text)),
    )
    .relation(RelationModel::has_one("driver_profile", DRIVER, "user_id", "id"))
    .relation(RelationModel::has_one("client_profile", CLIENT, "user_id", "id"))
    .relation(RelationModel::has_many("notifications", NOTIFICATION, "user_id", "id"))
}

fn driver() -> EntityModel {
    EntityModel::new(DRIVER, "id")
        .field(id())
        .field(FieldModel::required("user_id", FieldKind::Uint).unique())
        .field(FieldModel::required("license", FieldKind::Text).unique())
        .field(status(
            "DriverStatus",
            &["AVAILABLE", "ON_TRIP", "OFF_DUTY"],
            "AVAILABLE",
        ))
        .field(FieldModel::optional("rating", FieldKind::Float64))
        .field(
            FieldModel::required("certifications", FieldKind::list(FieldKind::Text))
                .default_value(Vec::<String>::new()),
        )
        .relation(
            RelationModel::belongs_to("user", USER, "user_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
        .relation(RelationModel::has_one("vehicle", VEHICLE, "driver_id", "id"))
        .relation(RelationModel::has_many("trips", TRIP, "driver_id", "id"))
        .relation(RelationModel::has_many("expenses", EXPENSE, "driver_id", "id"))
}

fn client() -> EntityModel {
    EntityModel::new(CLIENT, "id")
        .field(id())
        .field(FieldModel::required("user_id", FieldKind::Uint).unique())
        .field(FieldModel::required("company", FieldKind::Text))
        .field(FieldModel::optional("billing_email", FieldKind::Text))
        .field(
            FieldModel::required("credit_limit", FieldKind::Decimal)
                .default_value(Decimal::ZERO),
        )
        .relation(
            RelationModel::belongs_to("user", USER, "user_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
        .relation(RelationModel::has_many("shipments", SHIPMENT, "client_id", "id"))
}

fn vehicle() -> EntityModel {
    EntityModel::new(VEHICLE, "id")
        .field(id())
        .field(FieldModel::required("plate", FieldKind::Text).unique())
        .field(FieldModel::required("make", FieldKind::Text))
        .field(FieldModel::required("model", FieldKind::Text))
        .field(FieldModel::required("year", FieldKind::Int))
        .field(status(
            "VehicleStatus",
            &["ACTIVE", "MAINTENANCE", "RETIRED"],
            "ACTIVE",
        ))
        .field(FieldModel::required("mileage", FieldKind::Decimal).default_value(Decimal::ZERO))
        .field(FieldModel::optional("capacity_kg", FieldKind::Float64))
        .field(FieldModel::optional("driver_id", FieldKind::Uint).unique())
        .relation(RelationModel::belongs_to("driver", DRIVER, "driver_id", "id"))
        .relation(RelationModel::has_many("maintenance", MAINTENANCE, "vehicle_id", "id"))
        .relation(RelationModel::has_many("trips", TRIP, "vehicle_id", "id"))
        .relation(RelationModel::has_many("expenses", EXPENSE, "vehicle_id", "id"))
}

fn maintenance() -> EntityModel {
    EntityModel::new(MAINTENANCE, "id")
        .field(id())
        .field(FieldModel::required("vehicle_id", FieldKind::Uint))
        .field(FieldModel::required(
            "kind",
            FieldKind::enumeration("MaintenanceKind", &["OIL_CHANGE", "INSPECTION", "REPAIR"]),
        ))
        .field(FieldModel::required("description", FieldKind::Text))
        .field(FieldModel::required("cost", FieldKind::Decimal))
        .field(FieldModel::optional("odometer", FieldKind::Uint))
        .field(
            FieldModel::required("performed_at", FieldKind::Timestamp).default(FieldDefault::Now),
        )
        .relation(
            RelationModel::belongs_to("vehicle", VEHICLE, "vehicle_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
}

fn trip() -> EntityModel {
    EntityModel::new(TRIP, "id")
        .field(id())
        .field(
            FieldModel::required("reference", FieldKind::Ulid)
                .unique()
                .default(FieldDefault::GeneratedUlid),
        )
        .field(FieldModel::required("driver_id", FieldKind::Uint))
        .field(FieldModel::optional("vehicle_id", FieldKind::Uint))
        .field(FieldModel::required("origin", FieldKind::Text))
        .field(FieldModel::required("destination", FieldKind::Text))
        .field(status(
            "TripStatus",
            &["PLANNED", "IN_PROGRESS", "COMPLETED", "CANCELLED"],
            "PLANNED",
        ))
        .field(FieldModel::optional("distance_km", FieldKind::Float64))
        .field(FieldModel::optional("fare", FieldKind::Decimal))
        .relation(RelationModel::belongs_to("driver", DRIVER, "driver_id", "id"))
        .relation(RelationModel::belongs_to("vehicle", VEHICLE, "vehicle_id", "id"))
        .relation(RelationModel::has_many("shipments", SHIPMENT, "trip_id", "id"))
        .relation(RelationModel::has_many("expenses", EXPENSE, "trip_id", "id"))
}

fn shipment() -> EntityModel {
    EntityModel::new(SHIPMENT, "id")
        .field(id())
        .field(FieldModel::required("tracking_code", FieldKind::Text).unique())
        .field(FieldModel::required("client_id", FieldKind::Uint))
        .field(FieldModel::optional("trip_id", FieldKind::Uint))
        .field(FieldModel::required("description", FieldKind::Text))
        .field(FieldModel::required("weight_kg", FieldKind::Float64))
        .field(FieldModel::required("price", FieldKind::Decimal))
        .field(status(
            "ShipmentStatus",
            &["PENDING", "IN_TRANSIT", "DELIVERED"],
            "PENDING",
        ))
        .relation(
            RelationModel::belongs_to("client", CLIENT, "client_id", "id")
                .on_delete(ReferentialAction::Restrict),
        )
        .relation(RelationModel::belongs_to("trip", TRIP, "trip_id", "id"))
}

fn expense() -> EntityModel {
    EntityModel::new(EXPENSE, "id")
        .field(id())
        .field(FieldModel::required("driver_id", FieldKind::Uint))
        .field(FieldModel::optional("vehicle_id", FieldKind::Uint))
        .field(FieldModel::optional("trip_id", FieldKind::Uint))
        .field(FieldModel::required(
            "category",
            FieldKind::enumeration("ExpenseCategory", &["FUEL", "TOLL", "REPAIR", "OTHER"]),
        ))
        .field(FieldModel::required("amount", FieldKind::Decimal))
        .field(FieldModel::optional("note", FieldKind::Text))
        .relation(
            RelationModel::belongs_to("driver", DRIVER, "driver_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
        .relation(RelationModel::belongs_to("vehicle", VEHICLE, "vehicle_id", "id"))
        .relation(RelationModel::belongs_to("trip", TRIP, "trip_id", "id"))
}

fn notification() -> EntityModel {
    EntityModel::new(NOTIFICATION, "id")
        .field(id())
        .field(FieldModel::required("user_id", FieldKind::Uint))
        .field(FieldModel::required("message", FieldKind::Text))
        .field(FieldModel::required("read", FieldKind::Bool).default_value(false))
        .field(
            FieldModel::required("tags", FieldKind::list(FieldKind::Text))
                .default_value(Vec::<String>::new()),
        )
        .relation(
            RelationModel::belongs_to("user", USER, "user_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
}

pub fn fleet_schema() -> Schema {
    Schema::builder()
        .entity(user())
        .entity(driver())
        .entity(client())
        .entity(vehicle())
        .entity(maintenance())
        .entity(trip())
        .entity(shipment())
        .entity(expense())
        .entity(notification())
        .build()
        .expect("fleet schema should validate")
}

///
/// SEED
///

pub fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

pub fn by_id(id: u64) -> WhereUnique {
    WhereUnique::new("id", id)
}

pub fn create(db: &Db, entity: &str, input: CreateInput) -> RecordView {
    db.delegate(entity)
        .expect("entity should exist")
        .create(&CreateArgs::new(input))
        .expect("seed row should insert")
}

pub fn count(db: &Db, entity: &str) -> usize {
    db.row_count(entity).expect("entity should exist")
}

/// Two drivers with vehicles and trips, one client with shipments, a few
/// expenses, maintenance records and notifications. Ids follow insertion
/// order per entity starting at 1.
///
/// - drivers: 1 Ada (vehicle 1), 2 Grace (vehicle 2); vehicle 3 is spare
/// - client: 1 Acme (user Ken)
/// - trips: 1, 2 for driver 1; 3 for driver 2
pub fn seeded() -> Db {
    let db = Db::new(fleet_schema());

    for (email, name) in [("ada@fleet.io", "Ada"), ("grace@fleet.io", "Grace")] {
        let profile = CreateInput::new()
            .set("license", format!("LIC-{name}"))
            .set("rating", 4.5);
        create(
            &db,
            USER,
            CreateInput::new()
                .set("email", email)
                .set("name", name)
                .set("role", "DRIVER")
                .create("driver_profile", profile),
        );
    }
    create(
        &db,
        USER,
        CreateInput::new()
            .set("email", "ken@acme.io")
            .set("name", "Ken")
            .create(
                "client_profile",
                CreateInput::new()
                    .set("company", "Acme")
                    .set("credit_limit", money(500_000)),
            ),
    );

    for (plate, make, year, driver) in [
        ("FLT-001", "Volvo", 2021, Some(1u64)),
        ("FLT-002", "Scania", 2019, Some(2)),
        ("FLT-003", "Volvo", 2023, None),
    ] {
        create(
            &db,
            VEHICLE,
            CreateInput::new()
                .set("plate", plate)
                .set("make", make)
                .set("model", "FH")
                .set("year", year)
                .set("driver_id", driver),
        );
    }

    for (driver, vehicle, origin, destination, fare) in [
        (1u64, 1u64, "Depot", "Harbor", 4_000),
        (1, 1, "Harbor", "Airport", 6_500),
        (2, 2, "Depot", "Mall", 2_500),
    ] {
        create(
            &db,
            TRIP,
            CreateInput::new()
                .set("driver_id", driver)
                .set("vehicle_id", vehicle)
                .set("origin", origin)
                .set("destination", destination)
                .set("fare", money(fare)),
        );
    }

    for (code, trip, weight, price) in [
        ("TRK-1", Some(1u64), 120.0, 9_900),
        ("TRK-2", Some(1), 40.0, 4_500),
        ("TRK-3", None, 800.0, 25_000),
    ] {
        create(
            &db,
            SHIPMENT,
            CreateInput::new()
                .set("tracking_code", code)
                .set("client_id", 1u64)
                .set("trip_id", trip)
                .set("description", "pallets")
                .set("weight_kg", weight)
                .set("price", money(price)),
        );
    }

    for (driver, vehicle, trip, category, amount) in [
        (1u64, Some(1u64), Some(1u64), "FUEL", 8_000),
        (1, Some(1), Some(2), "TOLL", 1_200),
        (1, Some(1), None, "FUEL", 7_500),
        (2, Some(2), Some(3), "FUEL", 5_000),
        (2, None, None, "OTHER", 900),
    ] {
        create(
            &db,
            EXPENSE,
            CreateInput::new()
                .set("driver_id", driver)
                .set("vehicle_id", vehicle)
                .set("trip_id", trip)
                .set("category", category)
                .set("amount", money(amount)),
        );
    }

    for (vehicle, kind, cost) in [
        (1u64, "OIL_CHANGE", 15_000),
        (1, "INSPECTION", 8_000),
        (2, "REPAIR", 120_000),
    ] {
        create(
            &db,
            MAINTENANCE,
            CreateInput::new()
                .set("vehicle_id", vehicle)
                .set("kind", kind)
                .set("description", "scheduled")
                .set("cost", money(cost)),
        );
    }

    for (user, message, read) in [
        (1u64, "trip assigned", false),
        (1, "expense approved", true),
        (3, "shipment delivered", false),
    ] {
        create(
            &db,
            NOTIFICATION,
            CreateInput::new()
                .set("user_id", user)
                .set("message", message)
                .set("read", read),
        );
    }

    db
}
