//! Field extraction from the web panel's server-rendered pages.
//!
//! The panel embeds device state as inline script variables and a few
//! well-known elements; everything here is pattern matching over raw text.

use std::sync::OnceLock;

use regex::Regex;

use crate::protocol::{self, VANE_SWING};
use crate::types::*;
use crate::{Error, Result};

/// Inputs that shape extraction but do not come from the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    /// Celsius value used when the page has no sensor reading. `0.0` disables it.
    pub default_temperature: f64,
    pub orientation: SwingOrientation,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_temperature: 0.0,
            orientation: SwingOrientation::Horizontal,
        }
    }
}

/// One entry of the device list on the headers page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHeader {
    pub device_id: String,
    pub name: String,
}

const HVANE_MARKER: &str = "var selectedhvane =";
const VVANE_MARKER: &str = "var selectedvvane =";

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

fn csrf_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r#"signin\[_csrf_token\]" value="([^"]+)""#)
}

fn device_header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(
        &RE,
        r#"<div id="deviceHeader_(\d+)"(?s:.*?)<div class="name left">(.*?)</div>"#,
    )
}

fn user_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"&userId=(\d+)")
}

fn on_off_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"var selectedOnOff = (\d);")
}

fn user_mode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"var selectedUsermode = (\d);")
}

fn fan_speed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"var selectedfanspeed = (\d);")
}

fn setpoint_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"setTempCelsiusConsignaHeader\(\d+, '(\d+\.\d+)'\);")
}

fn current_temp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r#"<div class="key_value">([0-9.]+)&deg;([FC])</div>"#)
}

fn hvane_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"var selectedhvane = (\d+);")
}

fn vvane_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    cached(&RE, r"var selectedvvane = (\d+);")
}

fn capture<'a>(re: &Regex, body: &'a str, field: &str) -> Result<&'a str> {
    re.captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::Parse(format!("{field} not found on device page")))
}

fn parse_code(raw: &str, field: &str) -> Result<i32> {
    raw.parse()
        .map_err(|_| Error::Parse(format!("{field}: not an integer: {raw}")))
}

fn parse_decimal(raw: &str, field: &str) -> Result<f64> {
    raw.parse()
        .map_err(|_| Error::Parse(format!("{field}: not a number: {raw}")))
}

fn coded(body: &str, re: &Regex, kind: ServiceKind) -> Result<CodedService> {
    let raw = capture(re, body, kind.as_str())?;
    Ok(CodedService {
        service_id: protocol::service_id(kind).unwrap_or_default(),
        value: parse_code(raw, kind.as_str())?,
    })
}

fn swing_from(vane: &CodedService) -> CodedService {
    CodedService {
        service_id: vane.service_id,
        value: if vane.value == VANE_SWING { VANE_SWING } else { 0 },
    }
}

/// CSRF token from the login form.
pub fn csrf_token(body: &str) -> Option<&str> {
    csrf_re()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Devices listed on the headers page.
///
/// An empty list is an error: in practice it means the page was not the
/// panel (wrong format or not authenticated) rather than an empty account.
pub fn device_list(body: &str) -> Result<Vec<DeviceHeader>> {
    let devices: Vec<DeviceHeader> = device_header_re()
        .captures_iter(body)
        .map(|caps| DeviceHeader {
            device_id: caps[1].to_string(),
            name: caps[2].to_string(),
        })
        .collect();
    if devices.is_empty() {
        return Err(Error::Parse("no devices found on headers page".to_string()));
    }
    Ok(devices)
}

/// Device state from one `panel/vista` page.
pub fn device_state(body: &str, opts: &ExtractOptions) -> Result<Services> {
    let user_id = capture(user_id_re(), body, "userId")?.to_string();
    let power = coded(body, on_off_re(), ServiceKind::Power)?;
    let user_mode = coded(body, user_mode_re(), ServiceKind::UserMode)?;
    let fan_speed = coded(body, fan_speed_re(), ServiceKind::FanSpeed)?;

    let raw_setpoint = capture(setpoint_re(), body, "setpointTemp")?;
    let setpoint_temp = Setpoint {
        service_id: protocol::service_id(ServiceKind::SetpointTemp).unwrap_or_default(),
        raw_value: raw_setpoint.to_string(),
        value: Temperature::from_celsius(parse_decimal(raw_setpoint, "setpointTemp")?),
    };

    let current_temp = match current_temp_re().captures(body) {
        Some(caps) => {
            let raw_value = parse_decimal(&caps[1], "currentTemp")?;
            let units = TemperatureUnit::from_symbol(&caps[2])
                .ok_or_else(|| Error::Parse(format!("currentTemp: unknown unit {}", &caps[2])))?;
            CurrentTemp {
                units,
                raw_value,
                value: Temperature::from_unit(raw_value, units),
                defaulted: TemperatureSource::Measured,
            }
        }
        None if opts.default_temperature != 0.0 => CurrentTemp {
            units: TemperatureUnit::Celsius,
            raw_value: opts.default_temperature,
            value: Temperature::from_celsius(opts.default_temperature),
            defaulted: TemperatureSource::ConfigDefaulted,
        },
        None => CurrentTemp {
            units: TemperatureUnit::Celsius,
            raw_value: setpoint_temp.value.celsius(),
            value: setpoint_temp.value,
            defaulted: TemperatureSource::SetpointFallback,
        },
    };

    let horizontal_vanes = if body.contains(HVANE_MARKER) {
        Some(coded(body, hvane_re(), ServiceKind::HorizontalVanes)?)
    } else {
        None
    };
    let vertical_vanes = if body.contains(VVANE_MARKER) {
        Some(coded(body, vvane_re(), ServiceKind::VerticalVanes)?)
    } else {
        None
    };
    let swing_mode = match opts.orientation {
        SwingOrientation::Horizontal => horizontal_vanes.as_ref().map(swing_from),
        SwingOrientation::Vertical => vertical_vanes.as_ref().map(swing_from),
    };

    Ok(Services {
        user_id,
        power,
        user_mode,
        fan_speed,
        current_temp,
        setpoint_temp,
        horizontal_vanes,
        vertical_vanes,
        swing_mode,
    })
}
