use super::RightShift;
use crate::common::PixelFormat;
use crate::image::Image;

/// Shifts every logical pixel in place, leaving stride padding untouched.
pub(super) fn apply(params: &RightShift, image: &mut Image) {
    let bits = params.bits;
    let height = image.desc().height;

    match image.desc().pixel_format {
        PixelFormat::GrayU8 => {
            for y in 0..height {
                for px in image.row_u8_mut(y) {
                    *px >>= bits;
                }
            }
        }
        PixelFormat::GrayU16 => {
            for y in 0..height {
                for px in image.row_u16_mut(y) {
                    *px >>= bits;
                }
            }
        }
    }
}
