use intesis_web::{Temperature, TemperatureUnit};

#[test]
fn from_celsius() {
    let t = Temperature::from_celsius(22.0);
    assert_eq!(t.celsius(), 22.0);
    assert!((t.fahrenheit() - 71.6).abs() < 0.01);
}

#[test]
fn from_fahrenheit() {
    let t = Temperature::from_fahrenheit(72.0);
    assert!((t.celsius() - 22.222).abs() < 0.01);
    assert!((t.fahrenheit() - 72.0).abs() < 0.01);
}

#[test]
fn body_temperature_fahrenheit() {
    let t = Temperature::from_fahrenheit(98.6);
    assert!((t.celsius() - 37.0).abs() < 1e-9);
}

#[test]
fn from_unit_dispatches() {
    let c = Temperature::from_unit(20.0, TemperatureUnit::Celsius);
    assert_eq!(c.celsius(), 20.0);
    let f = Temperature::from_unit(68.0, TemperatureUnit::Fahrenheit);
    assert!((f.celsius() - 20.0).abs() < 1e-9);
}

#[test]
fn unit_symbols() {
    assert_eq!(TemperatureUnit::from_symbol("C"), Some(TemperatureUnit::Celsius));
    assert_eq!(TemperatureUnit::from_symbol("F"), Some(TemperatureUnit::Fahrenheit));
    assert_eq!(TemperatureUnit::from_symbol("K"), None);
    assert_eq!(TemperatureUnit::Fahrenheit.symbol(), "F");
}

#[test]
fn intesis_tenths() {
    assert_eq!(Temperature::from_celsius(21.5).to_intesis_tenths(), 215);
    assert_eq!(Temperature::from_celsius(22.04).to_intesis_tenths(), 220);
    assert_eq!(Temperature::from_celsius(22.06).to_intesis_tenths(), 221);
}

#[test]
fn display() {
    let t = Temperature::from_celsius(22.5);
    assert_eq!(format!("{t}"), "22.5\u{00b0}C");
}

#[test]
fn power_roundtrip() {
    use intesis_web::{Active, CodeMap, PowerMap};
    for value in [Active::Inactive, Active::Active] {
        let code = PowerMap::to_vendor(value).unwrap();
        assert_eq!(PowerMap::to_semantic(code), value);
    }
}

#[test]
fn target_state_roundtrip() {
    use intesis_web::{CodeMap, TargetState, UserModeMap};
    for value in [TargetState::Auto, TargetState::Heat, TargetState::Cool] {
        let code = UserModeMap::to_vendor(value).unwrap();
        assert_eq!(UserModeMap::to_semantic(code), value);
    }
}

#[test]
fn swing_roundtrip() {
    use intesis_web::{CodeMap, SwingMap, SwingMode};
    for value in [SwingMode::Disabled, SwingMode::Enabled] {
        let code = SwingMap::to_vendor(value).unwrap();
        assert_eq!(SwingMap::to_semantic(code), value);
    }
}
