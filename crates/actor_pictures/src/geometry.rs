use crate::registry::PictureRegistry;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Crop rectangle in source-image pixels. `y` may be negative when a
/// calibration shifts the picture down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl SourceRect {
    /// Moves the crop onto horizontal frame `frame` of a sprite sheet.
    pub fn at_frame(self, frame: usize, frame_width: u32) -> Self {
        let shift = i64::from(frame_width) * frame as i64;
        Self {
            x: clamp_to_i32(i64::from(self.x) + shift),
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Alignment {
    /// Keep the calibrated face centre in the middle of a narrower crop.
    pub center: bool,
    /// Apply the calibrated vertical offset to the crop.
    pub vertical_offset: bool,
}

impl PictureRegistry {
    pub fn frame_width(&self, picture_name: &str, image: ImageSize) -> u32 {
        let patterns = self.animation_profile(picture_name).pattern_count().max(1);
        image.width / u32::try_from(patterns).unwrap_or(u32::MAX)
    }

    /// Source crop for frame 0 of `picture_name`. A zero requested size means
    /// the full frame size; wider requests are limited to one frame.
    pub fn display_geometry(
        &self,
        picture_name: &str,
        image: ImageSize,
        requested_width: u32,
        requested_height: u32,
        alignment: Alignment,
    ) -> SourceRect {
        let frame_width = self.frame_width(picture_name, image);
        let width = if requested_width == 0 {
            frame_width
        } else {
            requested_width.min(frame_width)
        };
        let height = if requested_height == 0 {
            image.height
        } else {
            requested_height
        };
        let calibration = self.calibration(picture_name);

        let mut x = 0i64;
        if alignment.center && width < frame_width {
            let center_x = calibration
                .center_x
                .map(i64::from)
                .unwrap_or(i64::from(frame_width) / 2);
            let max_x = i64::from(frame_width - width);
            x = (center_x - i64::from(width) / 2).clamp(0, max_x);
        }
        let y = if alignment.vertical_offset {
            calibration.offset_y
        } else {
            0
        };

        SourceRect {
            x: clamp_to_i32(x),
            y,
            width,
            height,
        }
    }
}

fn clamp_to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
