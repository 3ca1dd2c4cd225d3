pub mod image;
pub mod pixel;

pub use crate::image::Image;
pub use crate::pixel::convert_pixel_row_format;
pub use crate::pixel::create_pixel_format;
pub use crate::pixel::get_pixel_format_width;
pub use crate::pixel::get_pixel_from_row;
pub use crate::pixel::get_pixel_row_bytes;
pub use crate::pixel::get_raw_channel_from_row;
pub use crate::pixel::get_raw_pixel_from_row;
pub use crate::pixel::set_pixel_to_row;
pub use crate::pixel::set_raw_channel_to_row;
pub use crate::pixel::set_raw_pixel_to_row;
pub use crate::pixel::ColorOrder;
pub use crate::pixel::Pixel;
pub use crate::pixel::PixelFormat;
pub use crate::pixel::RawPixel;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown pixel format")]
    UnknownFormat,

    #[error("no pixel format with depth {depth}, {channels} channels and order {order:?}")]
    UnsupportedFormat {
        depth: usize,
        channels: usize,
        order: ColorOrder,
    },

    #[error("row is too small ({length} bytes given, {required} bytes required)")]
    RowTooSmall { length: usize, required: usize },
}
