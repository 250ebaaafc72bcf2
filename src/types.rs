use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Temperature stored as Celsius internally.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn from_fahrenheit(f: f64) -> Self {
        Self((f - 32.0) * (5.0 / 9.0))
    }

    /// Interpret `value` in the given unit.
    pub fn from_unit(value: f64, unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Celsius => Self::from_celsius(value),
            TemperatureUnit::Fahrenheit => Self::from_fahrenheit(value),
        }
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    pub fn fahrenheit(&self) -> f64 {
        self.0 * (9.0 / 5.0) + 32.0
    }

    /// Setpoint encoding used by the set-value endpoint: tenths of a degree C.
    pub fn to_intesis_tenths(&self) -> i32 {
        (self.0 * 10.0).round() as i32
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "C" => Some(TemperatureUnit::Celsius),
            "F" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

/// Where the current-temperature reading came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureSource {
    /// Sensor reading found on the device page.
    Measured,
    /// No reading; the configured default temperature was used.
    ConfigDefaulted,
    /// No reading and no default; mirrors the setpoint.
    SetpointFallback,
}

/// Which vane drives the swing characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SwingOrientation {
    #[default]
    Horizontal,
    Vertical,
}

impl From<String> for SwingOrientation {
    fn from(s: String) -> Self {
        if s == "V" {
            SwingOrientation::Vertical
        } else {
            SwingOrientation::Horizontal
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ServiceKind {
    #[serde(rename = "power")]
    Power,
    #[serde(rename = "userMode")]
    UserMode,
    #[serde(rename = "fanSpeed")]
    FanSpeed,
    #[serde(rename = "currentTemp")]
    CurrentTemp,
    #[serde(rename = "setpointTemp")]
    SetpointTemp,
    #[serde(rename = "horizontalVanes")]
    HorizontalVanes,
    #[serde(rename = "verticalVanes")]
    VerticalVanes,
    #[serde(rename = "swingMode")]
    SwingMode,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Power => "power",
            ServiceKind::UserMode => "userMode",
            ServiceKind::FanSpeed => "fanSpeed",
            ServiceKind::CurrentTemp => "currentTemp",
            ServiceKind::SetpointTemp => "setpointTemp",
            ServiceKind::HorizontalVanes => "horizontalVanes",
            ServiceKind::VerticalVanes => "verticalVanes",
            ServiceKind::SwingMode => "swingMode",
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service whose state is a small vendor integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodedService {
    pub service_id: u32,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentTemp {
    pub units: TemperatureUnit,
    /// Reading before unit conversion.
    pub raw_value: f64,
    pub value: Temperature,
    pub defaulted: TemperatureSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Setpoint {
    pub service_id: u32,
    pub raw_value: String,
    pub value: Temperature,
}

/// Device state as extracted from one device page.
///
/// Vane and swing services are `None` when the model has no such vane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Services {
    pub user_id: String,
    pub power: CodedService,
    pub user_mode: CodedService,
    pub fan_speed: CodedService,
    pub current_temp: CurrentTemp,
    pub setpoint_temp: Setpoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal_vanes: Option<CodedService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_vanes: Option<CodedService>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swing_mode: Option<CodedService>,
}

impl Services {
    pub fn coded(&self, kind: ServiceKind) -> Option<&CodedService> {
        match kind {
            ServiceKind::Power => Some(&self.power),
            ServiceKind::UserMode => Some(&self.user_mode),
            ServiceKind::FanSpeed => Some(&self.fan_speed),
            ServiceKind::HorizontalVanes => self.horizontal_vanes.as_ref(),
            ServiceKind::VerticalVanes => self.vertical_vanes.as_ref(),
            ServiceKind::SwingMode => self.swing_mode.as_ref(),
            ServiceKind::CurrentTemp | ServiceKind::SetpointTemp => None,
        }
    }

    pub fn coded_mut(&mut self, kind: ServiceKind) -> Option<&mut CodedService> {
        match kind {
            ServiceKind::Power => Some(&mut self.power),
            ServiceKind::UserMode => Some(&mut self.user_mode),
            ServiceKind::FanSpeed => Some(&mut self.fan_speed),
            ServiceKind::HorizontalVanes => self.horizontal_vanes.as_mut(),
            ServiceKind::VerticalVanes => self.vertical_vanes.as_mut(),
            ServiceKind::SwingMode => self.swing_mode.as_mut(),
            ServiceKind::CurrentTemp | ServiceKind::SetpointTemp => None,
        }
    }

    /// Service id for write calls. Current temperature is read-only.
    pub fn service_id(&self, kind: ServiceKind) -> Option<u32> {
        match kind {
            ServiceKind::SetpointTemp => Some(self.setpoint_temp.service_id),
            ServiceKind::CurrentTemp => None,
            other => self.coded(other).map(|s| s.service_id),
        }
    }

    /// Kinds present on this device, in display order.
    pub fn kinds(&self) -> Vec<ServiceKind> {
        let mut kinds = vec![
            ServiceKind::Power,
            ServiceKind::UserMode,
            ServiceKind::FanSpeed,
            ServiceKind::CurrentTemp,
            ServiceKind::SetpointTemp,
        ];
        if self.horizontal_vanes.is_some() {
            kinds.push(ServiceKind::HorizontalVanes);
        }
        if self.vertical_vanes.is_some() {
            kinds.push(ServiceKind::VerticalVanes);
        }
        if self.swing_mode.is_some() {
            kinds.push(ServiceKind::SwingMode);
        }
        kinds
    }
}

/// Device identity on the consumer side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DeviceName(String);

impl DeviceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for DeviceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DeviceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    pub device_id: String,
    pub name: DeviceName,
    /// `None` when this cycle could not fetch or parse the device page.
    pub services: Option<Services>,
}

impl Device {
    pub fn user_id(&self) -> Option<&str> {
        self.services.as_ref().map(|s| s.user_id.as_str())
    }
}
