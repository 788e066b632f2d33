pub mod error;
pub mod types;

pub use error::{RadarError, RadarResult};
pub use types::{
    CompanyDatabase, ControlMessage, Referrer, StoreChange, KEY_LAST_UPDATED, KEY_OVERLAY_MODE,
    KEY_REFERRAL_DATA,
};
