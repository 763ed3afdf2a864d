//! Fleet schema subset shared by unit tests.

use crate::{
    db::{
        Db,
        write::{CreateArgs, CreateInput},
    },
    model::{
        EntityModel, FieldDefault, FieldKind, FieldModel, ReferentialAction, RelationModel, Schema,
    },
    value::Value,
};
use rust_decimal::Decimal;

pub const USER: &str = "User";
pub const DRIVER: &str = "DriverProfile";
pub const VEHICLE: &str = "Vehicle";
pub const TRIP: &str = "Trip";
pub const NOTIFICATION: &str = "Notification";

fn id() -> FieldModel {
    FieldModel::required("id", FieldKind::Uint).default(FieldDefault::Autoincrement)
}

fn text_list() -> FieldKind {
    FieldKind::list(FieldKind::Text)
}

fn user() -> EntityModel {
    EntityModel::new(USER, "id")
        .field(id())
        .field(FieldModel::required("email", FieldKind::Text).unique())
        .field(FieldModel::required("name", FieldKind::Text))
        .field(
            FieldModel::required(
                "role",
                FieldKind::enumeration("Role", &["ADMIN", "DRIVER", "CLIENT"]),
            )
            .default_value(Value::enum_variant("DRIVER")),
        )
        .field(FieldModel::optional("phone", FieldKind::Text))
        .field(FieldModel::required("created_at", FieldKind::Timestamp).default(FieldDefault::Now))
        .field(
            FieldModel::required("updated_at", FieldKind::Timestamp)
                .default(FieldDefault::UpdatedAt),
        )
        .relation(RelationModel::has_one("driver_profile", DRIVER, "user_id", "id"))
        .relation(RelationModel::has_many("notifications", NOTIFICATION, "user_id", "id"))
}

fn driver() -> EntityModel {
    EntityModel::new(DRIVER, "id")
        .field(id())
        .field(FieldModel::required("user_id", FieldKind::Uint).unique())
        .field(FieldModel::required("license", FieldKind::Text).unique())
        .field(
            FieldModel::required(
                "status",
                FieldKind::enumeration("DriverStatus", &["AVAILABLE", "ON_TRIP", "OFF_DUTY"]),
            )
            .default_value(Value::enum_variant("AVAILABLE")),
        )
        .field(FieldModel::optional("rating", FieldKind::Float64))
        .field(
            FieldModel::required("certifications", text_list())
                .default_value(Vec::<String>::new()),
        )
        .relation(
            RelationModel::belongs_to("user", USER, "user_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
        .relation(RelationModel::has_many("trips", TRIP, "driver_id", "id"))
        .relation(RelationModel::has_one("vehicle", VEHICLE, "driver_id", "id"))
}

fn vehicle() -> EntityModel {
    EntityModel::new(VEHICLE, "id")
        .field(id())
        .field(FieldModel::required("plate", FieldKind::Text).unique())
        .field(FieldModel::required("make", FieldKind::Text))
        .field(FieldModel::required("year", FieldKind::Int))
        .field(
            FieldModel::required(
                "status",
                FieldKind::enumeration("VehicleStatus", &["ACTIVE", "MAINTENANCE", "RETIRED"]),
            )
            .default_value(Value::enum_variant("ACTIVE")),
        )
        .field(FieldModel::required("mileage", FieldKind::Decimal).default_value(Decimal::ZERO))
        .field(FieldModel::optional("driver_id", FieldKind::Uint).unique())
        .relation(RelationModel::belongs_to("driver", DRIVER, "driver_id", "id"))
        .relation(RelationModel::has_many("trips", TRIP, "vehicle_id", "id"))
}

fn trip() -> EntityModel {
    EntityModel::new(TRIP, "id")
        .field(id())
        .field(FieldModel::required("driver_id", FieldKind::Uint))
        .field(FieldModel::optional("vehicle_id", FieldKind::Uint))
        .field(FieldModel::required("origin", FieldKind::Text))
        .field(FieldModel::required("destination", FieldKind::Text))
        .field(
            FieldModel::required(
                "status",
                FieldKind::enumeration(
                    "TripStatus",
                    &["PLANNED", "IN_PROGRESS", "COMPLETED", "CANCELLED"],
                ),
            )
            .default_value(Value::enum_variant("PLANNED")),
        )
        .field(FieldModel::optional("distance_km", FieldKind::Float64))
        .field(FieldModel::optional("fare", FieldKind::Decimal))
        .relation(RelationModel::belongs_to("driver", DRIVER, "driver_id", "id"))
        .relation(RelationModel::belongs_to("vehicle", VEHICLE, "vehicle_id", "id"))
}

fn notification() -> EntityModel {
    EntityModel::new(NOTIFICATION, "id")
        .field(id())
        .field(FieldModel::required("user_id", FieldKind::Uint))
        .field(FieldModel::required("message", FieldKind::Text))
        .field(FieldModel::required("read", FieldKind::Bool).default_value(false))
        .field(FieldModel::required("tags", text_list()).default_value(Vec::<String>::new()))
        .relation(
            RelationModel::belongs_to("user", USER, "user_id", "id")
                .on_delete(ReferentialAction::Cascade),
        )
}

/// Validated fleet schema used across unit tests.
pub fn fleet_schema() -> Schema {
    Schema::builder()
        .entity(user())
        .entity(driver())
        .entity(vehicle())
        .entity(trip())
        .entity(notification())
        .build()
        .expect("fleet schema should validate")
}

fn seed(db: &Db, entity: &str, rows: Vec<CreateInput>) {
    let delegate = db.delegate(entity).expect("fixture entity should exist");
    for row in rows {
        delegate
            .create(&CreateArgs::new(row))
            .expect("fixture row should insert");
    }
}

/// Fresh database over the fleet schema, populated by [`seed_fleet`].
pub fn seeded_db() -> Db {
    let db = Db::new(fleet_schema());
    seed_fleet(&db);

    db
}

/// Small fleet: four users, three drivers, three vehicles, five trips and
/// three notifications. Ids follow insertion order starting at 1.
pub fn seed_fleet(db: &Db) {
    let user = |email: &str, name: &str, role: &str| {
        CreateInput::new()
            .set("email", email)
            .set("name", name)
            .set("role", role)
    };
    seed(
        db,
        USER,
        vec![
            user("ada@fleet.io", "Ada", "DRIVER"),
            user("grace@fleet.io", "Grace", "DRIVER"),
            user("linus@fleet.io", "Linus", "DRIVER"),
            user("ken@fleet.io", "Ken", "CLIENT").set("phone", "555-0100"),
        ],
    );

    let driver = |user_id: u64, license: &str, rating: Option<f64>, certs: Vec<&str>| {
        CreateInput::new()
            .set("user_id", user_id)
            .set("license", license)
            .set("rating", rating)
            .set("certifications", certs)
    };
    seed(
        db,
        DRIVER,
        vec![
            driver(1, "LIC-1", Some(4.8), vec!["hazmat"]),
            driver(2, "LIC-2", None, vec![]),
            driver(3, "LIC-3", Some(4.2), vec!["hazmat", "reefer"]).set("status", "OFF_DUTY"),
        ],
    );

    let vehicle = |plate: &str, make: &str, year: i64| {
        CreateInput::new()
            .set("plate", plate)
            .set("make", make)
            .set("year", year)
    };
    seed(
        db,
        VEHICLE,
        vec![
            vehicle("FLT-001", "Volvo", 2021)
                .set("driver_id", 1u64)
                .set("mileage", Decimal::new(12005, 1)),
            vehicle("FLT-002", "Scania", 2019).set("driver_id", 2u64),
            vehicle("FLT-003", "Volvo", 2023).set("status", "MAINTENANCE"),
        ],
    );

    let trip = |driver_id: u64, vehicle_id: Option<u64>, origin: &str, destination: &str| {
        CreateInput::new()
            .set("driver_id", driver_id)
            .set("vehicle_id", vehicle_id)
            .set("origin", origin)
            .set("destination", destination)
    };
    seed(
        db,
        TRIP,
        vec![
            trip(1, Some(1), "Depot", "Harbor")
                .set("status", "COMPLETED")
                .set("distance_km", 12.5)
                .set("fare", Decimal::new(3000, 2)),
            trip(1, Some(1), "Harbor", "Airport")
                .set("status", "COMPLETED")
                .set("distance_km", 20.0)
                .set("fare", Decimal::new(4550, 2)),
            trip(2, Some(2), "Depot", "Mall")
                .set("status", "IN_PROGRESS")
                .set("distance_km", 7.0),
            trip(2, None, "Airport", "Depot"),
            trip(1, Some(1), "depot", "Station")
                .set("status", "CANCELLED")
                .set("distance_km", 3.0)
                .set("fare", Decimal::new(1000, 2)),
        ],
    );

    let notification = |user_id: u64, message: &str, read: bool, tags: Vec<&str>| {
        CreateInput::new()
            .set("user_id", user_id)
            .set("message", message)
            .set("read", read)
            .set("tags", tags)
    };
    seed(
        db,
        NOTIFICATION,
        vec![
            notification(1, "trip started", false, vec!["trip"]),
            notification(1, "payment received", true, vec!["billing"]),
            notification(2, "welcome", false, vec![]),
        ],
    );
}
