use modbus_layout::{compile, validate, Address, LayoutError, MapDocument, DEFAULT_MAX_CELLS};

const BATTERY: &str = r#"
version: 2.1.0
general:
  registers:
    serial:
      name: Serial Number
      ValueType: char[16]
      description: Serial number of the device
    firmware:
      name: Firmware Version
      ValueType: uint16[3]
    soc:
      name: State of Charge
      ValueType: float32
      unit: "%"
      hardware_support_register: auto
    temperature:
      name: Temperature
      ValueType: float32
      unit: degC
      hardware_support_register: auto
cells:
  address: auto
  registers:
    voltage:
      name: Cell Voltage
      ValueType: float32
      unit: V
    balancing:
      name: Balancing Active
      ValueType: bool
      hardware_support_register: auto
"#;

fn load(text: &str) -> MapDocument {
    MapDocument::from_yaml_str(text).unwrap()
}

fn addresses(registers: &[modbus_layout::Register]) -> Vec<Address> {
    registers.iter().map(|r| r.address).collect()
}

#[test]
fn compile_battery_map() {
    let layout = compile(&load(BATTERY)).unwrap();

    assert_eq!(layout.version, Some(semver::Version::new(2, 1, 0)));
    assert_eq!(addresses(&layout.general_registers), vec![0, 8, 11, 13]);
    assert_eq!(layout.general_registers[0].name, "Serial Number");
    assert_eq!(layout.cell_start_address, 15);
    assert_eq!(addresses(&layout.cell_registers), vec![0, 2]);
    assert_eq!(layout.cell_stride(), 3);

    let coils: Vec<(&str, u16)> = layout
        .coils
        .iter()
        .map(|c| (c.owner.as_str(), c.index))
        .collect();
    assert_eq!(
        coils,
        vec![
            ("State of Charge", 0),
            ("Temperature", 1),
            ("Balancing Active", 2)
        ]
    );

    let expanded = layout.expand(2).unwrap();
    let names: Vec<&str> = expanded.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Serial Number",
            "Firmware Version",
            "State of Charge",
            "Temperature",
            "Cell Voltage 1",
            "Balancing Active 1",
            "Cell Voltage 2",
            "Balancing Active 2"
        ]
    );
    assert_eq!(addresses(&expanded[4..]), vec![15, 17, 18, 20]);

    assert!(validate(&load(BATTERY), DEFAULT_MAX_CELLS).is_ok());
}

#[test]
fn name_defaults_to_key() {
    let layout = compile(&load(
        "version: 1.0.0\ngeneral: {registers: {voltage: {ValueType: uint16}}}",
    ))
    .unwrap();
    assert_eq!(layout.general_registers[0].name, "voltage");
    assert!(layout.cell_registers.is_empty());
    assert_eq!(layout.cell_start_address, 1);
}

#[test]
fn conflicting_general_registers() {
    let doc = load(
        r#"
version: 1.0.0
general:
  registers:
    a: {ValueType: uint16, address: 5}
    b: {ValueType: int32, address: 5}
"#,
    );
    assert!(compile(&doc).is_ok());
    match validate(&doc, DEFAULT_MAX_CELLS) {
        Err(LayoutError::AddressConflict { first, second, .. }) => {
            assert_eq!((first.as_str(), second.as_str()), ("a", "b"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn cell_block_running_into_general_registers() {
    // the third block reaches address 20
    let doc = load(
        r#"
version: 1.0.0
general:
  registers:
    status: {ValueType: uint16, address: 20}
cells:
  address: 10
  registers:
    v: {ValueType: float64, offset: 0}
    i: {ValueType: uint16, offset: 4}
"#,
    );
    assert!(validate(&doc, 2).is_ok());
    match validate(&doc, 3) {
        Err(LayoutError::AddressConflict { first, second, .. }) => {
            assert_eq!((first.as_str(), second.as_str()), ("status", "v 3"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn overlap_inside_cell_template() {
    let doc = load(
        r#"
version: 1.0.0
cells:
  address: 0
  registers:
    long: {ValueType: "char[10]", offset: 0}
    wide: {ValueType: uint16, offset: 1}
"#,
    );
    match validate(&doc, DEFAULT_MAX_CELLS) {
        Err(LayoutError::AddressConflict { first, second, .. }) => {
            assert_eq!((first.as_str(), second.as_str()), ("long 1", "wide 1"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn conflicting_coils() {
    let doc = load(
        r#"
version: 1.0.0
general:
  registers:
    a: {ValueType: uint16, hardware_support_register: 2}
cells:
  registers:
    b: {ValueType: uint16, hardware_support_register: 2}
"#,
    );
    match validate(&doc, DEFAULT_MAX_CELLS) {
        Err(LayoutError::FlagConflict { first, second, index }) => {
            assert_eq!((first.as_str(), second.as_str(), index), ("a", "b", 2));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn invalid_type_aborts_compilation() {
    for ty in ["int99", "char[0]", "char[-1]", "char["] {
        let doc = load(&format!(
            "version: 1.0.0\ngeneral: {{registers: {{broken: {{ValueType: '{ty}'}}}}}}"
        ));
        match compile(&doc) {
            Err(LayoutError::InvalidTypeSyntax { field, .. }) => assert_eq!(field, "broken"),
            other => panic!("unexpected {other:?} for {ty}"),
        }
    }
}

#[test]
fn malformed_version() {
    let doc = load("version: latest");
    assert!(matches!(
        compile(&doc),
        Err(LayoutError::MalformedVersion { version, .. }) if version == "latest"
    ));
}

#[test]
fn duplicate_field_names() {
    let doc = load(
        r#"
version: 1.0.0
general:
  registers:
    a: {ValueType: uint16, name: Power}
    b: {ValueType: uint16, name: Power}
"#,
    );
    assert!(matches!(
        compile(&doc),
        Err(LayoutError::DuplicateName { name }) if name == "Power"
    ));
}

#[test]
fn layout_serializes_to_json() {
    let layout = compile(&load(BATTERY)).unwrap();
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["version"], "2.1.0");
    assert_eq!(json["cell_start_address"], 15);
    assert_eq!(json["general_registers"][0]["value_type"], "char[16]");
    assert_eq!(json["general_registers"][2]["hardware_support_register"], 0);
}

#[test]
fn demo_map_is_valid() {
    let layout = validate(&load(include_str!("../../demos/battery.yaml")), DEFAULT_MAX_CELLS).unwrap();
    assert_eq!(layout.cell_start_address, 100);
    assert_eq!(layout.cell_stride(), 3);
    assert_eq!(layout.coils.len(), 2);
}

#[test]
fn general_registers_filling_the_address_space() {
    let doc = load("version: 1.0.0\ngeneral: {registers: {top: {ValueType: uint16, address: 65535}}}\n");
    let layout = validate(&doc, DEFAULT_MAX_CELLS).unwrap();
    assert_eq!(layout.cell_start_address, 65_536);
    assert_eq!(layout.general_registers[0].address, 65_535);
}
