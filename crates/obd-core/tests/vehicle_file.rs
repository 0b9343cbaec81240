//! Vehicle definition file tests: load/save round trips and failure kinds

use obd_core::{ErrorKind, RequestDefinition, VehicleDefinition};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn assert_same_fields(a: &VehicleDefinition, b: &VehicleDefinition) {
    assert_eq!(a.id(), b.id());
    assert_eq!(a.make(), b.make());
    assert_eq!(a.model(), b.model());
    assert_eq!(a.len(), b.len());

    for (x, y) in a.requests().zip(b.requests()) {
        assert_eq!(x.id(), y.id());
        assert_eq!(x.name, y.name);
        assert_eq!(x.description, y.description);
        assert_eq!(x.category, y.category);
        assert_eq!(x.ecu, y.ecu);
        assert_eq!(x.service, y.service);
        assert_eq!(x.pid, y.pid);
        assert_eq!(x.formula, y.formula);
        assert_eq!(x.unit, y.unit);
    }
}

#[test]
fn test_save_then_load_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mx5.json");

    let mut vehicle = VehicleDefinition::with_make_model("Mazda", "MX-5 NA");
    vehicle.add_request(
        RequestDefinition::new(0x7E0, 0x01, 0x0C)
            .with_name("RPM")
            .with_description("Engine speed")
            .with_category("engine")
            .with_formula("(256*A+B)/4")
            .with_unit("rpm"),
    );
    vehicle.add_request(RequestDefinition::new(0x7E0, 0x03, 0x00).with_category("dtc"));
    vehicle.add_request(
        RequestDefinition::new(0x7E1, 0x22, 0x1E12)
            .with_name("Gear")
            .with_formula("A"),
    );

    vehicle.save(&path).unwrap();
    let loaded = VehicleDefinition::load(&path).unwrap();

    assert_eq!(loaded, vehicle);
    assert_same_fields(&loaded, &vehicle);
}

#[test]
fn test_empty_vehicle_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.json");

    let vehicle = VehicleDefinition::new();
    vehicle.save(&path).unwrap();
    let loaded = VehicleDefinition::load(&path).unwrap();

    assert_same_fields(&loaded, &vehicle);
}

#[test]
fn test_load_preserves_file_order() {
    let json = r#"{
        "id": "0d8f5bd4-4a1b-4c1e-9d4e-6a8f2b1c3d5e",
        "make": "Honda",
        "model": "Civic",
        "requests": [
            {"id": "a1a1a1a1-0000-4000-8000-000000000001", "name": "Speed", "description": "",
             "category": "", "ecu": 2016, "service": 1, "pid": 13, "formula": "A", "unit": "km/h"},
            {"id": "a1a1a1a1-0000-4000-8000-000000000002", "name": "RPM", "description": "",
             "category": "", "ecu": 2016, "service": 1, "pid": 12, "formula": "(256*A+B)/4", "unit": "rpm"}
        ]
    }"#;

    let vehicle = VehicleDefinition::from_json(json).unwrap();
    let names: Vec<&str> = vehicle.requests().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Speed", "RPM"]);
    assert_eq!(vehicle.id().to_string(), "0d8f5bd4-4a1b-4c1e-9d4e-6a8f2b1c3d5e");
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = VehicleDefinition::load(dir.path().join("nope.json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileUnavailable);
}

#[test]
fn test_load_malformed_nested_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(
        &path,
        r#"{
            "id": "0d8f5bd4-4a1b-4c1e-9d4e-6a8f2b1c3d5e",
            "make": "Honda", "model": "Civic",
            "requests": [ {"id": "a1a1a1a1-0000-4000-8000-000000000001", "name": "Speed"} ]
        }"#,
    )
    .unwrap();

    let err = VehicleDefinition::load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDefinition);
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn test_load_not_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.json");
    std::fs::write(&path, "make = \"Honda\"").unwrap();

    let err = VehicleDefinition::load(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedDefinition);
}

#[test]
fn test_save_to_missing_directory() {
    let dir = TempDir::new().unwrap();
    let vehicle = VehicleDefinition::new();
    let err = vehicle
        .save(dir.path().join("missing").join("v.json"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FileUnavailable);
}
