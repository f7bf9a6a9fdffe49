//! Conversion between host-native column-major arrays and the row-major
//! image and corner representations the tracking engine works with.

mod frame;
mod host_array;
mod region;

pub use frame::{COLOR_CHANNELS, Frame, decode_image, encode_image};
pub use host_array::{HostArray, HostData, decode_session_index};
pub use region::{Region, decode_region, encode_region};
