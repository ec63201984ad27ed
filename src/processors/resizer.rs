// pulp-image/src/processors/resizer.rs
use image::{imageops::FilterType, DynamicImage, GenericImageView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    /// Both dimensions given; aspect ratio is not preserved.
    Exact(u32, u32),
    Width(u32),
    Height(u32),
}

impl ResizeMode {
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> Option<Self> {
        match (width, height) {
            (Some(w), Some(h)) => Some(ResizeMode::Exact(w, h)),
            (Some(w), None) => Some(ResizeMode::Width(w)),
            (None, Some(h)) => Some(ResizeMode::Height(h)),
            (None, None) => None,
        }
    }
}

pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn resize(&self, image: DynamicImage, mode: ResizeMode) -> DynamicImage {
        let (width, height) = calculate_dimensions(image.dimensions(), mode);

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image;
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.filter)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn calculate_dimensions((orig_width, orig_height): (u32, u32), mode: ResizeMode) -> (u32, u32) {
    match mode {
        ResizeMode::Exact(w, h) => (w.max(1), h.max(1)),
        ResizeMode::Width(width) => {
            if width == 0 || width == orig_width || orig_width == 0 {
                return (orig_width, orig_height);
            }
            let ratio = width as f64 / orig_width as f64;
            let height = (orig_height as f64 * ratio).round() as u32;
            (width, height.max(1))
        }
        ResizeMode::Height(height) => {
            if height == 0 || height == orig_height || orig_height == 0 {
                return (orig_width, orig_height);
            }
            let ratio = height as f64 / orig_height as f64;
            let width = (orig_width as f64 * ratio).round() as u32;
            (width.max(1), height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_dimensions() {
        assert_eq!(ResizeMode::from_dimensions(Some(8), Some(6)), Some(ResizeMode::Exact(8, 6)));
        assert_eq!(ResizeMode::from_dimensions(Some(8), None), Some(ResizeMode::Width(8)));
        assert_eq!(ResizeMode::from_dimensions(None, Some(6)), Some(ResizeMode::Height(6)));
        assert_eq!(ResizeMode::from_dimensions(None, None), None);
    }

    #[test]
    fn test_exact_ignores_aspect() {
        assert_eq!(calculate_dimensions((1000, 500), ResizeMode::Exact(300, 300)), (300, 300));
    }

    #[test]
    fn test_proportional_dimensions() {
        assert_eq!(calculate_dimensions((1000, 500), ResizeMode::Width(400)), (400, 200));
        assert_eq!(calculate_dimensions((1000, 500), ResizeMode::Height(100)), (200, 100));
        assert_eq!(calculate_dimensions((3, 1000), ResizeMode::Height(10)), (1, 10));
    }

    #[test]
    fn test_resize_image() {
        let image = DynamicImage::new_rgb8(40, 20);
        let resized = Resizer::new().resize(image, ResizeMode::Width(10));
        assert_eq!(resized.dimensions(), (10, 5));
    }

    #[test]
    fn test_nearest_filter_keeps_hard_edges() {
        let image = DynamicImage::ImageRgb8(image::RgbImage::from_fn(4, 2, |x, _| {
            if x < 2 {
                image::Rgb([0, 0, 0])
            } else {
                image::Rgb([255, 255, 255])
            }
        }));
        let resized = Resizer::new()
            .with_filter(FilterType::Nearest)
            .resize(image, ResizeMode::Width(8))
            .to_rgb8();

        assert_eq!(resized.dimensions(), (8, 4));
        assert_eq!(resized.get_pixel(0, 0), &image::Rgb([0, 0, 0]));
        assert_eq!(resized.get_pixel(7, 3), &image::Rgb([255, 255, 255]));
        assert!(resized.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}
