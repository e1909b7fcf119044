use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};

use super::{RenderError, RenderResult};

/// Light modules kept around the symbol so scanners can find it.
pub const QUIET_ZONE_MODULES: usize = 4;

/// Turns a payload string into a module matrix. The renderer never builds
/// codes itself; swapping the encoder is how callers change symbol settings.
pub trait QrEncoder {
    fn encode(&self, payload: &str) -> RenderResult<QrModules>;
}

/// Square module matrix, row-major, `true` for dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrModules {
    width: usize,
    dark: Vec<bool>,
}

impl QrModules {
    pub fn new(width: usize, dark: Vec<bool>) -> Option<Self> {
        (width > 0 && dark.len() == width * width).then_some(Self { width, dark })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.width && self.dark[y * self.width + x]
    }

    /// Rasterise at the largest whole-pixel scale that fits in `side_px`,
    /// quiet zone included.
    pub fn to_image(&self, side_px: u32) -> GrayImage {
        let span = self.width + 2 * QUIET_ZONE_MODULES;
        let span_px = u32::try_from(span).unwrap_or(u32::MAX);
        let scale = (side_px / span_px.max(1)).max(1);
        let size = span_px.saturating_mul(scale);
        GrayImage::from_fn(size, size, |px, py| {
            let mx = (px / scale) as usize;
            let my = (py / scale) as usize;
            let dark = mx >= QUIET_ZONE_MODULES
                && my >= QUIET_ZONE_MODULES
                && self.is_dark(mx - QUIET_ZONE_MODULES, my - QUIET_ZONE_MODULES);
            if dark {
                Luma([0])
            } else {
                Luma([255])
            }
        })
    }
}

/// Encoder backed by the `qrcode` crate at error-correction level M.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQrEncoder;

impl QrEncoder for DefaultQrEncoder {
    fn encode(&self, payload: &str) -> RenderResult<QrModules> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|err| RenderError::QrEncoding(err.to_string()))?;
        let width = code.width();
        let dark = code
            .to_colors()
            .into_iter()
            .map(|color| color == qrcode::Color::Dark)
            .collect::<Vec<_>>();
        QrModules::new(width, dark)
            .ok_or_else(|| RenderError::QrEncoding("encoder returned a ragged matrix".to_string()))
    }
}

/// `{base}/verify/{certificate_id}`, tolerant of a trailing slash on `base`.
pub fn verification_url(base: &str, certificate_id: &str) -> String {
    format!("{}/verify/{}", base.trim_end_matches('/'), certificate_id)
}

/// Ids are embedded verbatim in the verification URL.
pub fn is_url_safe(certificate_id: &str) -> bool {
    !certificate_id.is_empty()
        && certificate_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}
