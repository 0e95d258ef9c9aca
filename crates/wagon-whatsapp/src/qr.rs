//! QR code rendering for pairing.

use wagon_core::error::WagonError;

/// Generate a compact QR code for terminal display using Unicode half-block characters.
///
/// Packs two rows of modules into one line of text using `▀`, `▄`, `█`, and space.
/// This produces a QR code roughly half the height of a naive renderer.
pub fn generate_qr_terminal(qr_data: &str) -> Result<String, WagonError> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| WagonError::Channel(format!("QR generation failed: {e}")))?;

    let width = code.width();
    let colors: Vec<Color> = code.into_colors();
    let is_dark = |row: usize, col: usize| -> bool {
        if row < width && col < width {
            colors[row * width + col] == Color::Dark
        } else {
            false
        }
    };

    let mut out = String::new();
    // Process two rows at a time.
    let mut row = 0;
    while row < width {
        for col in 0..width {
            let top = is_dark(row, col);
            let bottom = if row + 1 < width {
                is_dark(row + 1, col)
            } else {
                false
            };
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
        row += 2;
    }

    Ok(out)
}

/// Generate a QR code as PNG image bytes (for the pairing endpoint).
pub fn generate_qr_png(qr_data: &str) -> Result<Vec<u8>, WagonError> {
    use image::{ImageBuffer, Luma};
    use qrcode::{EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(qr_data.as_bytes(), EcLevel::L)
        .map_err(|e| WagonError::Channel(format!("QR generation failed: {e}")))?;

    let module_size: u32 = 10;
    let quiet_zone: u32 = 2;
    let modules = code.width() as u32;
    let img_size = (modules + quiet_zone * 2) * module_size;

    let img = ImageBuffer::from_fn(img_size, img_size, |x, y| {
        let mx = (x / module_size).saturating_sub(quiet_zone);
        let my = (y / module_size).saturating_sub(quiet_zone);

        if x / module_size < quiet_zone
            || y / module_size < quiet_zone
            || mx >= modules
            || my >= modules
        {
            Luma([255u8]) // White border
        } else {
            use qrcode::Color;
            match code[(mx as usize, my as usize)] {
                Color::Dark => Luma([0u8]),
                Color::Light => Luma([255u8]),
            }
        }
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| WagonError::Channel(format!("PNG encoding failed: {e}")))?;

    Ok(buf.into_inner())
}
