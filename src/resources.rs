//! Memoizing caches for drawing resources.
//!
//! Every control carries a [`CacheSet`] once its window has been realized. Caches create a backend
//! resource the first time a key is requested and hand out the same handle for every later request
//! with an equal key. They are used from the render thread only.

use crate::backend::{Brush, Graphics, LinearGradient, RenderTarget, Resource, TextFormat};
use crate::color::{canonical_bits, Color, ColorKey};
use crate::error::BackendError;
use cgmath::Point2;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// A get-or-create store of resource handles.
#[derive(Debug)]
pub struct ResourceCache<K, H> {
    entries: HashMap<K, H>,
}

impl<K: Eq + Hash, H: Clone> ResourceCache<K, H> {
    pub fn new() -> ResourceCache<K, H> {
        ResourceCache {
            entries: HashMap::new(),
        }
    }

    /// Returns the handle stored for `key`, creating it with `create` if there is none.
    ///
    /// If `create` fails, nothing is stored and the error is returned.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: K, create: F) -> Result<H, E>
    where
        F: FnOnce() -> Result<H, E>,
    {
        match self.entries.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let handle = create()?;
                Ok(entry.insert(handle).clone())
            }
        }
    }

    /// The number of distinct keys (and thus backend allocations) held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K> ResourceCache<K, Arc<dyn Resource>> {
    /// Releases every stored handle and empties the cache.
    pub fn release(&mut self) {
        for (_, handle) in self.entries.drain() {
            handle.release();
        }
    }
}

impl<K: Eq + Hash, H: Clone> Default for ResourceCache<K, H> {
    fn default() -> Self {
        ResourceCache::new()
    }
}

fn point_bits(point: Point2<f64>) -> [u64; 2] {
    [canonical_bits(point.x), canonical_bits(point.y)]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GradientKey {
    start: ColorKey,
    end: ColorKey,
    start_point: [u64; 2],
    end_point: [u64; 2],
}

impl From<&LinearGradient> for GradientKey {
    fn from(gradient: &LinearGradient) -> Self {
        GradientKey {
            start: gradient.start_color.key(),
            end: gradient.end_color.key(),
            start_point: point_bits(gradient.start_point),
            end_point: point_bits(gradient.end_point),
        }
    }
}

/// Brushes for one drawing role of a control.
#[derive(Debug)]
pub struct BrushCache {
    solid: ResourceCache<ColorKey, Brush>,
    gradient: ResourceCache<GradientKey, Brush>,

    /// Corner radius used with these brushes.
    pub radius: f64,

    /// Stroke thickness used with these brushes.
    pub thickness: f64,
}

impl BrushCache {
    pub fn new() -> BrushCache {
        BrushCache {
            solid: ResourceCache::new(),
            gradient: ResourceCache::new(),
            radius: 4.,
            thickness: 1.,
        }
    }

    /// Returns a solid color brush.
    pub fn solid(
        &mut self,
        target: &mut dyn RenderTarget,
        color: Color,
    ) -> Result<Brush, BackendError> {
        self.solid
            .get_or_try_insert_with(color.key(), || target.create_solid_brush(color))
    }

    /// Returns a linear gradient brush.
    pub fn gradient(
        &mut self,
        target: &mut dyn RenderTarget,
        gradient: &LinearGradient,
    ) -> Result<Brush, BackendError> {
        self.gradient
            .get_or_try_insert_with(gradient.into(), || target.create_gradient_brush(gradient))
    }

    /// Total number of brushes held.
    pub fn len(&self) -> usize {
        self.solid.len() + self.gradient.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn release(&mut self) {
        self.solid.release();
        self.gradient.release();
    }
}

impl Default for BrushCache {
    fn default() -> Self {
        BrushCache::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Thin,
    Light,
    Normal,
    Medium,
    SemiBold,
    Bold,
    Black,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

/// Describes a text format.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescription {
    pub name: String,
    pub size: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
}

/// Font names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    name: String,
    size: u64,
    weight: FontWeight,
    style: FontStyle,
}

impl From<&FontDescription> for FontKey {
    fn from(font: &FontDescription) -> Self {
        FontKey {
            name: font.name.to_lowercase(),
            size: canonical_bits(font.size),
            weight: font.weight,
            style: font.style,
        }
    }
}

/// Text formats for a control, plus the control’s current font settings.
#[derive(Debug)]
pub struct FontCache {
    formats: ResourceCache<FontKey, TextFormat>,
    pub font: FontDescription,
}

impl FontCache {
    pub fn new(font: FontDescription) -> FontCache {
        FontCache {
            formats: ResourceCache::new(),
            font,
        }
    }

    /// Returns a text format.
    pub fn get(
        &mut self,
        graphics: &mut dyn Graphics,
        font: &FontDescription,
    ) -> Result<TextFormat, BackendError> {
        self.formats
            .get_or_try_insert_with(font.into(), || graphics.create_text_format(font))
    }

    /// Returns the text format for the current font settings.
    pub fn current(&mut self, graphics: &mut dyn Graphics) -> Result<TextFormat, BackendError> {
        let font = self.font.clone();
        self.get(graphics, &font)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    pub fn release(&mut self) {
        self.formats.release();
    }
}

/// The drawing roles a control has a brush cache for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushSlot {
    Control,
    Border,
    Accent,
    Shadow,
    Font,
}

/// All resource caches of one control.
#[derive(Debug)]
pub struct CacheSet {
    pub control: BrushCache,
    pub border: BrushCache,
    pub accent: BrushCache,
    pub shadow: BrushCache,
    pub font: BrushCache,
    pub fonts: FontCache,
}

impl CacheSet {
    pub fn new(font: FontDescription) -> CacheSet {
        CacheSet {
            control: BrushCache::new(),
            border: BrushCache::new(),
            accent: BrushCache::new(),
            shadow: BrushCache::new(),
            font: BrushCache::new(),
            fonts: FontCache::new(font),
        }
    }

    pub fn brushes(&mut self, slot: BrushSlot) -> &mut BrushCache {
        match slot {
            BrushSlot::Control => &mut self.control,
            BrushSlot::Border => &mut self.border,
            BrushSlot::Accent => &mut self.accent,
            BrushSlot::Shadow => &mut self.shadow,
            BrushSlot::Font => &mut self.font,
        }
    }

    /// Releases every resource in every cache.
    pub fn release(&mut self) {
        self.control.release();
        self.border.release();
        self.accent.release();
        self.shadow.release();
        self.font.release();
        self.fonts.release();
    }
}
