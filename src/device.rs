use std::sync::Arc;

use tracing::debug;

use crate::cache::RefreshCache;
use crate::protocol::SetValue;
use crate::translate::{
    self, Active, Characteristic, CodeMap, FanSpeedMap, PowerMap, SemanticValue, SwingMap,
    SwingMode, TargetState, UserModeMap,
};
use crate::types::{DeviceName, ServiceKind, Services, Temperature};
use crate::{Error, Result};

pub const MANUFACTURER: &str = "Intesis";

/// Accessory information shown to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInfo {
    pub manufacturer: &'static str,
    pub model: String,
    pub serial_number: String,
}

/// One air conditioner as seen by the consumer.
///
/// Reads go through the refresh cache and then answer from local state;
/// writes hit the set-value endpoint and update local state only once the
/// endpoint acknowledges.
#[derive(Clone)]
pub struct DeviceHandle {
    name: DeviceName,
    device_id: String,
    cache: Arc<RefreshCache>,
}

impl std::fmt::Debug for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("name", &self.name)
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl DeviceHandle {
    pub(crate) fn new(name: DeviceName, device_id: String, cache: Arc<RefreshCache>) -> Self {
        Self {
            name,
            device_id,
            cache,
        }
    }

    pub fn name(&self) -> &DeviceName {
        &self.name
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn info(&self) -> AccessoryInfo {
        AccessoryInfo {
            manufacturer: MANUFACTURER,
            model: self.name.to_string(),
            serial_number: self.device_id.clone(),
        }
    }

    /// Characteristics this model supports. Empty if state was never fetched.
    pub fn characteristics(&self) -> Vec<Characteristic> {
        self.cache
            .with_services(self.name.as_str(), Characteristic::available)
            .unwrap_or_default()
    }

    /// Current local state, without refreshing.
    pub fn snapshot(&self) -> Option<Services> {
        self.cache.with_services(self.name.as_str(), Services::clone)
    }

    async fn refresh_for(&self, ch: Characteristic) {
        let reason = format!("{}: {ch}", self.name);
        self.cache.refresh(&reason).await;
    }

    fn read<R>(&self, kind: ServiceKind, f: impl FnOnce(&Services) -> Option<R>) -> Result<R> {
        self.cache
            .with_services(self.name.as_str(), f)
            .flatten()
            .ok_or(Error::Unavailable(kind))
    }

    /// Read any characteristic as a semantic value.
    pub async fn get(&self, ch: Characteristic) -> Result<SemanticValue> {
        self.refresh_for(ch).await;
        let kind = ch.service_kind();
        self.read(kind, |s| Some(translate::to_semantic(kind, s)))?
    }

    /// Write any characteristic from a semantic value.
    pub async fn set(&self, ch: Characteristic, value: SemanticValue) -> Result<()> {
        let kind = ch.service_kind();
        if !ch.is_writable() {
            return Err(Error::InvalidValue {
                kind,
                reason: format!("{ch} is read-only"),
            });
        }
        let vendor = translate::to_vendor(kind, value)?;
        self.write(kind, vendor, move |s| apply_local(s, kind, vendor, value))
            .await
    }

    async fn get_coded<M: CodeMap>(&self, ch: Characteristic) -> Result<M::Semantic> {
        self.refresh_for(ch).await;
        self.read(M::KIND, |s| s.coded(M::KIND).map(|c| M::to_semantic(c.value)))
    }

    async fn set_coded<M: CodeMap>(&self, value: M::Semantic) -> Result<()> {
        let vendor = M::to_vendor(value)?;
        self.write(M::KIND, vendor, move |s| set_code(s, M::KIND, vendor))
            .await
    }

    async fn write(
        &self,
        kind: ServiceKind,
        vendor: i32,
        update: impl FnOnce(&mut Services),
    ) -> Result<()> {
        let (service_id, user_id) =
            self.read(kind, |s| s.service_id(kind).map(|id| (id, s.user_id.clone())))?;
        debug!(name = %self.name, service = %kind, value = vendor, "SET");

        let req = SetValue {
            device_id: self.device_id.clone(),
            service_id,
            value: vendor,
            user_id,
        };
        self.cache.session().set_value(&req).await?;

        self.cache.update_services(self.name.as_str(), update);
        Ok(())
    }

    pub async fn active(&self) -> Result<Active> {
        self.get_coded::<PowerMap>(Characteristic::Active).await
    }

    pub async fn set_active(&self, value: Active) -> Result<()> {
        self.set_coded::<PowerMap>(value).await
    }

    pub async fn target_state(&self) -> Result<TargetState> {
        self.get_coded::<UserModeMap>(Characteristic::TargetHeaterCoolerState)
            .await
    }

    pub async fn set_target_state(&self, value: TargetState) -> Result<()> {
        self.set_coded::<UserModeMap>(value).await
    }

    /// Fan speed 0 (auto) to 4.
    pub async fn rotation_speed(&self) -> Result<u8> {
        self.get_coded::<FanSpeedMap>(Characteristic::RotationSpeed)
            .await
    }

    pub async fn set_rotation_speed(&self, value: u8) -> Result<()> {
        self.set_coded::<FanSpeedMap>(value).await
    }

    pub async fn swing_mode(&self) -> Result<SwingMode> {
        self.get_coded::<SwingMap>(Characteristic::SwingMode).await
    }

    pub async fn set_swing_mode(&self, value: SwingMode) -> Result<()> {
        self.set_coded::<SwingMap>(value).await
    }

    pub async fn current_temperature(&self) -> Result<Temperature> {
        self.refresh_for(Characteristic::CurrentTemperature).await;
        self.read(ServiceKind::CurrentTemp, |s| Some(s.current_temp.value))
    }

    /// The single setpoint, exposed as both cooling and heating threshold.
    pub async fn setpoint(&self) -> Result<Temperature> {
        self.refresh_for(Characteristic::CoolingThresholdTemperature)
            .await;
        self.read(ServiceKind::SetpointTemp, |s| Some(s.setpoint_temp.value))
    }

    pub async fn set_setpoint(&self, temp: Temperature) -> Result<()> {
        self.set(
            Characteristic::CoolingThresholdTemperature,
            SemanticValue::Temperature(temp),
        )
        .await
    }
}

fn set_code(services: &mut Services, kind: ServiceKind, vendor: i32) {
    if let Some(service) = services.coded_mut(kind) {
        service.value = vendor;
    }
    // Swing is written through its backing vane.
    if kind == ServiceKind::SwingMode
        && let Some(swing_id) = services.swing_mode.map(|s| s.service_id)
    {
        for vane in [&mut services.horizontal_vanes, &mut services.vertical_vanes]
            .into_iter()
            .flatten()
        {
            if vane.service_id == swing_id {
                vane.value = vendor;
            }
        }
    }
}

fn apply_local(services: &mut Services, kind: ServiceKind, vendor: i32, value: SemanticValue) {
    match (kind, value) {
        (ServiceKind::SetpointTemp, SemanticValue::Temperature(temp)) => {
            services.setpoint_temp.value = temp;
            services.setpoint_temp.raw_value = format!("{:.1}", temp.celsius());
        }
        _ => set_code(services, kind, vendor),
    }
}
