//! Responsive image selection.
//!
//! Posts carry their image in several sizes, largest first. Rendering picks
//! the smallest size that still covers the width it is drawn at, so the
//! gallery loads thumbnails on narrow screens and full sizes on wide ones.

use crate::config::{Breakpoints, GalleryConfig};
use crate::types::PhotoVariant;

/// Pick the variant that best fits `target_width`.
///
/// `variants` must be ordered largest first. The smallest variant at least
/// as wide as the target wins; if every variant is narrower, the largest is
/// returned. A target of zero selects the smallest variant. Returns `None`
/// only for an empty list.
pub fn resolve(variants: &[PhotoVariant], target_width: u32) -> Option<&PhotoVariant> {
    if target_width == 0 {
        return variants.last();
    }

    variants
        .iter()
        .rev()
        .find(|variant| variant.width >= target_width)
        .or_else(|| variants.first())
}

/// Target width of an image inside the gallery grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GalleryPolicy {
    breakpoints: Breakpoints,
}

impl GalleryPolicy {
    pub fn new(breakpoints: Breakpoints) -> Self {
        Self { breakpoints }
    }

    /// Number of grid columns at a viewport width.
    pub fn columns(&self, viewport_width: u32) -> u32 {
        if viewport_width > self.breakpoints.ultra_wide {
            4
        } else if viewport_width >= self.breakpoints.wide {
            3
        } else {
            2
        }
    }

    /// Width of one grid cell, rounded up to whole pixels.
    pub fn target_width(&self, viewport_width: u32) -> u32 {
        viewport_width.div_ceil(self.columns(viewport_width))
    }

    pub fn resolve<'a>(
        &self,
        variants: &'a [PhotoVariant],
        viewport_width: u32,
    ) -> Option<&'a PhotoVariant> {
        resolve(variants, self.target_width(viewport_width))
    }
}

impl Default for GalleryPolicy {
    fn default() -> Self {
        Self::new(Breakpoints::default())
    }
}

impl From<&GalleryConfig> for GalleryPolicy {
    fn from(config: &GalleryConfig) -> Self {
        Self::new(config.breakpoints)
    }
}

/// Target width of the single image in the detail view.
///
/// Small screens still request a large image so it stays sharp when zoomed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DetailPolicy {
    min_width: u32,
}

impl DetailPolicy {
    pub fn new(min_width: u32) -> Self {
        Self { min_width }
    }

    pub fn target_width(&self, viewport_width: u32) -> u32 {
        viewport_width.max(self.min_width)
    }

    pub fn resolve<'a>(
        &self,
        variants: &'a [PhotoVariant],
        viewport_width: u32,
    ) -> Option<&'a PhotoVariant> {
        resolve(variants, self.target_width(viewport_width))
    }
}

impl Default for DetailPolicy {
    fn default() -> Self {
        Self::new(992)
    }
}

impl From<&GalleryConfig> for DetailPolicy {
    fn from(config: &GalleryConfig) -> Self {
        Self::new(config.detail_min_width)
    }
}
