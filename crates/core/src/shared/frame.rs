/// A single decoded video frame: contiguous RGB bytes in row-major order.
///
/// Pixel-format conversion happens at I/O boundaries only; everything past
/// the ingest boundary treats pixel data as opaque RGB.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * 3,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// Converts a planar YUV 4:2:0 (I420) buffer, as delivered by the
    /// upstream decoder, into a packed RGB frame.
    ///
    /// BT.601 studio-swing integer math; chroma planes are
    /// `ceil(w/2) x ceil(h/2)`.
    pub fn from_yuv420(
        data: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let w = width as usize;
        let h = height as usize;
        let cw = w.div_ceil(2);
        let ch = h.div_ceil(2);
        let expected = w * h + 2 * cw * ch;
        if data.len() != expected {
            return Err(format!(
                "I420 buffer for {width}x{height} must be {expected} bytes, got {}",
                data.len()
            )
            .into());
        }

        let (y_plane, chroma) = data.split_at(w * h);
        let (u_plane, v_plane) = chroma.split_at(cw * ch);

        let mut rgb = Vec::with_capacity(w * h * 3);
        for row in 0..h {
            for col in 0..w {
                let y = y_plane[row * w + col] as i32;
                let u = u_plane[(row / 2) * cw + col / 2] as i32;
                let v = v_plane[(row / 2) * cw + col / 2] as i32;

                let c = 298 * (y - 16);
                let d = u - 128;
                let e = v - 128;

                rgb.push(clamp_u8((c + 409 * e + 128) >> 8));
                rgb.push(clamp_u8((c - 100 * d - 208 * e + 128) >> 8));
                rgb.push(clamp_u8((c + 516 * d + 128) >> 8));
            }
        }

        Ok(Self::new(rgb, width, height))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}
