//! Vendor code <-> consumer value mapping.
//!
//! Each coded service has a `CodeMap`: a table for vendor -> semantic and a
//! pure function for the way back. Unknown vendor codes fall back to the
//! table's default entry; unknown semantic input is not representable.

use std::fmt;

use crate::protocol::VANE_SWING;
use crate::types::{ServiceKind, Services, Temperature};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Active {
    Inactive,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetState {
    Auto,
    Heat,
    Cool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingMode {
    Disabled,
    Enabled,
}

/// Consumer-facing characteristics of a heater/cooler accessory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    Active,
    TargetHeaterCoolerState,
    RotationSpeed,
    CurrentTemperature,
    CoolingThresholdTemperature,
    HeatingThresholdTemperature,
    SwingMode,
}

impl Characteristic {
    pub fn service_kind(&self) -> ServiceKind {
        match self {
            Characteristic::Active => ServiceKind::Power,
            Characteristic::TargetHeaterCoolerState => ServiceKind::UserMode,
            Characteristic::RotationSpeed => ServiceKind::FanSpeed,
            Characteristic::CurrentTemperature => ServiceKind::CurrentTemp,
            Characteristic::CoolingThresholdTemperature
            | Characteristic::HeatingThresholdTemperature => ServiceKind::SetpointTemp,
            Characteristic::SwingMode => ServiceKind::SwingMode,
        }
    }

    pub fn is_writable(&self) -> bool {
        !matches!(self, Characteristic::CurrentTemperature)
    }

    /// Characteristics backed by the given services.
    pub fn available(services: &Services) -> Vec<Characteristic> {
        let mut out = vec![
            Characteristic::Active,
            Characteristic::TargetHeaterCoolerState,
            Characteristic::RotationSpeed,
            Characteristic::CurrentTemperature,
            Characteristic::CoolingThresholdTemperature,
            Characteristic::HeatingThresholdTemperature,
        ];
        if services.swing_mode.is_some() {
            out.push(Characteristic::SwingMode);
        }
        out
    }
}

/// Bounds advertised to the consumer for a numeric characteristic.
///
/// `step` is a hint for the consumer's controls; writes are checked against
/// the range only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacteristicProps {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Characteristic {
    pub fn props(&self) -> Option<CharacteristicProps> {
        match self {
            Characteristic::RotationSpeed => Some(CharacteristicProps {
                min: 0.0,
                max: f64::from(FAN_SPEED_MAX),
                step: 1.0,
            }),
            Characteristic::CoolingThresholdTemperature
            | Characteristic::HeatingThresholdTemperature => Some(CharacteristicProps {
                min: SETPOINT_MIN_C,
                max: SETPOINT_MAX_C,
                step: SETPOINT_STEP_C,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SemanticValue {
    Active(Active),
    TargetState(TargetState),
    FanSpeed(u8),
    Swing(SwingMode),
    Temperature(Temperature),
}

pub trait CodeMap {
    type Semantic: Copy;
    const KIND: ServiceKind;

    fn to_semantic(code: i32) -> Self::Semantic;
    fn to_vendor(value: Self::Semantic) -> Result<i32>;
}

/// Look up `code` in `table`, falling back to `fallback` when out of range.
fn lookup<T: Copy>(table: &[T], code: i32, fallback: T) -> T {
    usize::try_from(code)
        .ok()
        .and_then(|i| table.get(i).copied())
        .unwrap_or(fallback)
}

// off on
//  0   1
const POWER_TABLE: [Active; 2] = [Active::Inactive, Active::Active];

// auto heat dry fan cool
//  0    1    2   3   4
const USER_MODE_TABLE: [TargetState; 5] = [
    TargetState::Auto,
    TargetState::Heat,
    TargetState::Auto,
    TargetState::Auto,
    TargetState::Cool,
];

pub const FAN_SPEED_MAX: u8 = 4;

pub const SETPOINT_MIN_C: f64 = 10.0;
pub const SETPOINT_MAX_C: f64 = 35.0;
pub const SETPOINT_STEP_C: f64 = 1.0;

pub struct PowerMap;

impl CodeMap for PowerMap {
    type Semantic = Active;
    const KIND: ServiceKind = ServiceKind::Power;

    fn to_semantic(code: i32) -> Active {
        lookup(&POWER_TABLE, code, Active::Inactive)
    }

    fn to_vendor(value: Active) -> Result<i32> {
        Ok(match value {
            Active::Active => 1,
            Active::Inactive => 0,
        })
    }
}

pub struct UserModeMap;

impl CodeMap for UserModeMap {
    type Semantic = TargetState;
    const KIND: ServiceKind = ServiceKind::UserMode;

    fn to_semantic(code: i32) -> TargetState {
        lookup(&USER_MODE_TABLE, code, TargetState::Auto)
    }

    fn to_vendor(value: TargetState) -> Result<i32> {
        Ok(match value {
            TargetState::Heat => 1,
            TargetState::Cool => 4,
            TargetState::Auto => 0,
        })
    }
}

/// Fan speed: auto, 1..4. The vendor code is the semantic index.
pub struct FanSpeedMap;

impl CodeMap for FanSpeedMap {
    type Semantic = u8;
    const KIND: ServiceKind = ServiceKind::FanSpeed;

    fn to_semantic(code: i32) -> u8 {
        u8::try_from(code).unwrap_or(0).min(FAN_SPEED_MAX)
    }

    fn to_vendor(value: u8) -> Result<i32> {
        if value > FAN_SPEED_MAX {
            return Err(Error::InvalidValue {
                kind: Self::KIND,
                reason: format!("fan speed {value} above {FAN_SPEED_MAX}"),
            });
        }
        Ok(i32::from(value))
    }
}

pub struct SwingMap;

impl CodeMap for SwingMap {
    type Semantic = SwingMode;
    const KIND: ServiceKind = ServiceKind::SwingMode;

    fn to_semantic(code: i32) -> SwingMode {
        if code == VANE_SWING {
            SwingMode::Enabled
        } else {
            SwingMode::Disabled
        }
    }

    fn to_vendor(value: SwingMode) -> Result<i32> {
        Ok(match value {
            SwingMode::Enabled => VANE_SWING,
            SwingMode::Disabled => 0,
        })
    }
}

/// Setpoint in Celsius to the set-value encoding (tenths of a degree).
pub fn setpoint_to_vendor(temp: Temperature) -> Result<i32> {
    let c = temp.celsius();
    if !(SETPOINT_MIN_C..=SETPOINT_MAX_C).contains(&c) {
        return Err(Error::InvalidValue {
            kind: ServiceKind::SetpointTemp,
            reason: format!("{temp} outside {SETPOINT_MIN_C}..{SETPOINT_MAX_C}"),
        });
    }
    Ok(temp.to_intesis_tenths())
}

/// Read the semantic value of `kind` from extracted services.
pub fn to_semantic(kind: ServiceKind, services: &Services) -> Result<SemanticValue> {
    let code = |k: ServiceKind| {
        services
            .coded(k)
            .map(|s| s.value)
            .ok_or(Error::Unavailable(k))
    };
    Ok(match kind {
        ServiceKind::Power => SemanticValue::Active(PowerMap::to_semantic(code(kind)?)),
        ServiceKind::UserMode => SemanticValue::TargetState(UserModeMap::to_semantic(code(kind)?)),
        ServiceKind::FanSpeed => SemanticValue::FanSpeed(FanSpeedMap::to_semantic(code(kind)?)),
        ServiceKind::SwingMode => SemanticValue::Swing(SwingMap::to_semantic(code(kind)?)),
        ServiceKind::CurrentTemp => SemanticValue::Temperature(services.current_temp.value),
        ServiceKind::SetpointTemp => SemanticValue::Temperature(services.setpoint_temp.value),
        ServiceKind::HorizontalVanes | ServiceKind::VerticalVanes => {
            return Err(Error::Unavailable(kind));
        }
    })
}

/// Encode a semantic value for the set-value endpoint.
pub fn to_vendor(kind: ServiceKind, value: SemanticValue) -> Result<i32> {
    match (kind, value) {
        (ServiceKind::Power, SemanticValue::Active(v)) => PowerMap::to_vendor(v),
        (ServiceKind::UserMode, SemanticValue::TargetState(v)) => UserModeMap::to_vendor(v),
        (ServiceKind::FanSpeed, SemanticValue::FanSpeed(v)) => FanSpeedMap::to_vendor(v),
        (ServiceKind::SwingMode, SemanticValue::Swing(v)) => SwingMap::to_vendor(v),
        (ServiceKind::SetpointTemp, SemanticValue::Temperature(t)) => setpoint_to_vendor(t),
        (kind, value) => Err(Error::InvalidValue {
            kind,
            reason: format!("cannot write {value:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_mapping() {
        assert_eq!(PowerMap::to_semantic(0), Active::Inactive);
        assert_eq!(PowerMap::to_semantic(1), Active::Active);
        assert_eq!(PowerMap::to_semantic(7), Active::Inactive);
        assert_eq!(PowerMap::to_vendor(Active::Active).unwrap(), 1);
        assert_eq!(PowerMap::to_vendor(Active::Inactive).unwrap(), 0);
    }

    #[test]
    fn user_mode_collapses_dry_and_fan_to_auto() {
        assert_eq!(UserModeMap::to_semantic(1), TargetState::Heat);
        assert_eq!(UserModeMap::to_semantic(2), TargetState::Auto);
        assert_eq!(UserModeMap::to_semantic(3), TargetState::Auto);
        assert_eq!(UserModeMap::to_semantic(4), TargetState::Cool);
        assert_eq!(UserModeMap::to_semantic(-1), TargetState::Auto);
        assert_eq!(UserModeMap::to_vendor(TargetState::Cool).unwrap(), 4);
        assert_eq!(UserModeMap::to_vendor(TargetState::Auto).unwrap(), 0);
    }

    #[test]
    fn fan_speed_is_identity() {
        for i in 0..=FAN_SPEED_MAX {
            assert_eq!(FanSpeedMap::to_semantic(i32::from(i)), i);
            assert_eq!(FanSpeedMap::to_vendor(i).unwrap(), i32::from(i));
        }
        assert!(matches!(
            FanSpeedMap::to_vendor(5),
            Err(Error::InvalidValue { kind: ServiceKind::FanSpeed, .. })
        ));
    }

    #[test]
    fn swing_only_code_ten_enabled() {
        assert_eq!(SwingMap::to_semantic(10), SwingMode::Enabled);
        assert_eq!(SwingMap::to_semantic(0), SwingMode::Disabled);
        assert_eq!(SwingMap::to_semantic(3), SwingMode::Disabled);
        assert_eq!(SwingMap::to_vendor(SwingMode::Enabled).unwrap(), 10);
        assert_eq!(SwingMap::to_vendor(SwingMode::Disabled).unwrap(), 0);
    }

    #[test]
    fn setpoint_tenths_and_range() {
        assert_eq!(setpoint_to_vendor(Temperature::from_celsius(21.5)).unwrap(), 215);
        assert_eq!(setpoint_to_vendor(Temperature::from_celsius(10.0)).unwrap(), 100);
        assert!(setpoint_to_vendor(Temperature::from_celsius(36.0)).is_err());
        assert!(setpoint_to_vendor(Temperature::from_celsius(9.5)).is_err());
    }

    #[test]
    fn numeric_props() {
        let setpoint = Characteristic::HeatingThresholdTemperature.props().unwrap();
        assert_eq!(setpoint, Characteristic::CoolingThresholdTemperature.props().unwrap());
        assert_eq!(setpoint.min, 10.0);
        assert_eq!(setpoint.max, 35.0);
        assert_eq!(setpoint.step, 1.0);

        let fan = Characteristic::RotationSpeed.props().unwrap();
        assert_eq!((fan.min, fan.max, fan.step), (0.0, 4.0, 1.0));

        assert!(Characteristic::Active.props().is_none());
        assert!(Characteristic::CurrentTemperature.props().is_none());
    }

    #[test]
    fn mismatched_value_rejected() {
        let err = to_vendor(ServiceKind::Power, SemanticValue::FanSpeed(2)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { kind: ServiceKind::Power, .. }));
        let err = to_vendor(
            ServiceKind::CurrentTemp,
            SemanticValue::Temperature(Temperature::from_celsius(20.0)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }
}
