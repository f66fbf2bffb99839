//! Target-dimension resolution.

use crate::error::{ConversionError, PipelineResult};
use crate::types::SizeRequest;

/// Map a size request onto a concrete (width, height).
///
/// Presets return their fixed pair verbatim. Custom sizes must be positive and
/// fit in `u32`. No aspect-ratio correction happens here: the codec stretches
/// the source to whatever rectangle this returns.
pub fn resolve(request: &SizeRequest) -> PipelineResult<(u32, u32)> {
    match *request {
        SizeRequest::Preset(preset) => Ok(preset.dimensions()),
        SizeRequest::Custom { width, height } => {
            let invalid = || ConversionError::InvalidDimensions { width, height };
            if width <= 0 || height <= 0 {
                return Err(invalid());
            }
            let w = u32::try_from(width).map_err(|_| invalid())?;
            let h = u32::try_from(height).map_err(|_| invalid())?;
            Ok((w, h))
        }
    }
}
