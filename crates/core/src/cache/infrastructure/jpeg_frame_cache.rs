use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::cache::domain::frame_cache::FrameCache;
use crate::shared::constants::FOLDER_PREVIEW_FRAMES;
use crate::shared::frame::Frame;
use crate::shared::timestamp::format_frame_time;

/// Directory-backed frame cache writing JPEG stills via the `image` crate.
///
/// Files land in `<cache_dir>/preview_frames/<mode>_<stream>-<time>.jpg`;
/// `mode` distinguishes preview from summary usage so the two variants can
/// share one cache directory.
pub struct JpegFrameCache {
    dir: PathBuf,
    mode: String,
}

impl JpegFrameCache {
    pub fn new(cache_dir: &Path, mode: &str) -> Self {
        Self {
            dir: cache_dir.join(FOLDER_PREVIEW_FRAMES),
            mode: mode.to_string(),
        }
    }
}

impl FrameCache for JpegFrameCache {
    fn write(
        &self,
        stream: &str,
        frame_time: f64,
        frame: &Frame,
        size: (u32, u32),
    ) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;

        let img = image::RgbImage::from_raw(frame.width(), frame.height(), frame.data().to_vec())
            .ok_or("failed to create image from frame data")?;

        let (w, h) = size;
        let img = image::imageops::resize(&img, w, h, image::imageops::FilterType::Triangle);

        img.save(self.path_for(stream, frame_time))?;
        Ok(())
    }

    fn path_for(&self, stream: &str, frame_time: f64) -> PathBuf {
        self.dir.join(format!(
            "{}_{}-{}.jpg",
            self.mode,
            stream,
            format_frame_time(frame_time)
        ))
    }

    fn remove(&self, stream: &str, frame_time: f64) {
        let path = self.path_for(stream, frame_time);
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != ErrorKind::NotFound {
                log::debug!("could not remove cached frame {}: {e}", path.display());
            }
        }
    }
}
