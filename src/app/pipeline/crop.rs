use std::fmt;

/// Video filter forcing a 9:16 frame from a `width`x`height` source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CropFilter {
    /// Full-height window centered horizontally.
    Crop {
        width: u32,
        height: u32,
        x: u32,
        y: u32,
    },
    /// Source narrower than 9:16 at its height. The frame is squeezed to the
    /// derived width, which keeps the height but does not crop anything.
    Scale { width: u32, height: u32 },
}

/// Floor of `height * 9 / 16`.
pub(crate) fn vertical_width(height: u32) -> u32 {
    (u64::from(height) * 9 / 16) as u32
}

impl CropFilter {
    pub(crate) fn for_source(source_width: u32, source_height: u32) -> Self {
        let target_width = vertical_width(source_height);
        if target_width <= source_width {
            Self::Crop {
                width: target_width,
                height: source_height,
                x: (source_width - target_width) / 2,
                y: 0,
            }
        } else {
            Self::Scale {
                width: target_width,
                height: source_height,
            }
        }
    }

    pub(crate) fn is_fallback(&self) -> bool {
        matches!(self, Self::Scale { .. })
    }
}

impl fmt::Display for CropFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Crop {
                width,
                height,
                x,
                y,
            } => write!(f, "crop={width}:{height}:{x}:{y}"),
            Self::Scale { width, height } => write!(f, "scale={width}:{height}"),
        }
    }
}

/// Parses `WIDTHxHEIGHT` as printed by `ffprobe -of csv=p=0:s=x`.
pub(crate) fn parse_dimensions(raw: &str) -> Option<(u32, u32)> {
    let (width, height) = raw.trim().split_once('x')?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}
