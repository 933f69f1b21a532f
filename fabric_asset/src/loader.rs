use fabric_utils::tracing::trace;
use image::{DynamicImage, ImageError};

pub type LoadCallback = Box<dyn FnOnce(Result<DynamicImage, ImageError>) + Send>;

/// Decodes images in the background.
///
/// `load` must not block. The callback is invoked exactly once, from any thread.
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &str, done: LoadCallback);
}

/// Reads images from the file system, one worker thread per request.
#[derive(Debug, Default, Copy, Clone)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &str, done: LoadCallback) {
        let path = path.to_string();
        std::thread::spawn(move || {
            trace!("[Image Loader] Decoding {path}");
            done(image::open(&path));
        });
    }
}
