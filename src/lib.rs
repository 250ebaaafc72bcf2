mod cache;
mod client;
mod config;
mod device;
mod error;
mod extract;
mod logger;
mod protocol;
mod session;
mod sync;
mod translate;
mod types;

pub use cache::{RefreshCache, RefreshOutcome};
pub use client::{IntesisClient, IntesisClientBuilder};
pub use config::IntesisConfig;
pub use device::{AccessoryInfo, DeviceHandle};
pub use error::{Error, Result};
pub use extract::{DeviceHeader, ExtractOptions, csrf_token, device_list, device_state};
pub use logger::MessageLogMode;
pub use protocol::SetValue;
pub use session::Session;
pub use sync::{ConfigSync, SyncReport};
pub use translate::{
    Active, Characteristic, CharacteristicProps, CodeMap, FanSpeedMap, PowerMap, SemanticValue,
    SwingMap, SwingMode, TargetState, UserModeMap,
};
pub use types::*;
