mod get_device_id;
pub use get_device_id::{DeviceId, DeviceSupport, GetDeviceId};

mod manufacturer;
pub use manufacturer::{manufacturer_name, IanaManufacturer};
