// SPDX-License-Identifier: GPL-3.0-only

//! Frame rasterization
//!
//! Copies a live frame into a tightly packed RGBA image at the frame's own
//! size, dropping any row padding the pipeline added.

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::RgbaImage;
use tracing::debug;

/// Rasterize `frame` into an RGBA image of `frame.width` x `frame.height`
pub fn rasterize(frame: &CameraFrame) -> Result<RgbaImage, PhotoError> {
    let (width, height) = (frame.width, frame.height);
    if width == 0 || height == 0 {
        return Err(PhotoError::NoFrameAvailable);
    }

    let image = copy_rgba_rows(frame)?;
    debug!(width, height, stride = frame.stride, "Frame rasterized");
    Ok(image)
}

fn copy_rgba_rows(frame: &CameraFrame) -> Result<RgbaImage, PhotoError> {
    let row_bytes = frame.width as usize * 4;
    let stride = (frame.stride as usize).max(row_bytes);
    let needed = stride * (frame.height as usize - 1) + row_bytes;
    if frame.data.len() < needed {
        return Err(PhotoError::EncodingFailed(format!(
            "RGBA data too small: expected {}, got {}",
            needed,
            frame.data.len()
        )));
    }

    let mut packed = Vec::with_capacity(row_bytes * frame.height as usize);
    for row in frame.data.chunks(stride).take(frame.height as usize) {
        packed.extend_from_slice(&row[..row_bytes]);
    }

    RgbaImage::from_raw(frame.width, frame.height, packed).ok_or_else(|| {
        PhotoError::EncodingFailed("Failed to create RGBA image from frame".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::FrameData;
    use std::time::Instant;

    #[test]
    fn test_rasterize_uses_frame_size() {
        let frame = CameraFrame::from_rgba(3, 2, vec![7u8; 3 * 2 * 4]);
        let image = rasterize(&frame).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [7, 7, 7, 7]);
    }

    #[test]
    fn test_rasterize_strips_row_padding() {
        // 2x2 RGBA, stride 12 (4 bytes padding per row)
        let mut data = vec![0u8; 24];
        data[0..4].copy_from_slice(&[1, 2, 3, 4]);
        data[12 + 4..12 + 8].copy_from_slice(&[9, 8, 7, 6]);
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: FrameData::from(data),
            stride: 12,
            captured_at: Instant::now(),
        };
        let image = rasterize(&frame).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [1, 2, 3, 4]);
        assert_eq!(image.get_pixel(1, 1).0, [9, 8, 7, 6]);
    }

    #[test]
    fn test_rasterize_rejects_short_data() {
        let frame = CameraFrame::from_rgba(4, 4, vec![0u8; 10]);
        assert!(matches!(rasterize(&frame), Err(PhotoError::EncodingFailed(_))));
    }

    #[test]
    fn test_rasterize_empty_frame() {
        let frame = CameraFrame::from_rgba(0, 0, Vec::new());
        assert_eq!(rasterize(&frame), Err(PhotoError::NoFrameAvailable));
    }
}
