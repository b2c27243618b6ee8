//! DPI scaling.

use crate::backend::{Platform, WindowId};
use crate::error::Result;
use crate::tree::{ControlId, ControlTree};
use log::debug;

/// Returns the scale factor of a window: its display DPI over the reference DPI, or 1 if the
/// platform doesn’t know.
pub fn scale_factor(platform: &dyn Platform, window: WindowId, reference_dpi: f64) -> f64 {
    match platform.display_dpi(window) {
        Some(dpi) if dpi > 0. && reference_dpi > 0. => dpi / reference_dpi,
        _ => 1.,
    }
}

/// Scales a window root and its subtree by a DPI factor.
///
/// The root keeps its location (which belongs to the platform) but its size is scaled.
/// Descendants have their location, size, and font size scaled. Every scrollbar gets wider.
/// This must happen once per window; calling it again compounds.
pub fn apply_dpi_scaling(tree: &mut ControlTree, root: ControlId, scale: f64) -> Result<()> {
    if scale == 1. {
        return Ok(());
    }
    debug!("scaling {:?} by {}", root, scale);

    let size = tree.get(root)?.size() * scale;
    tree.set_size(root, size)?;
    tree.get_mut(root)?.scroll.scale(scale);

    for id in tree.descendants(root)? {
        let node = tree.get(id)?;
        let bounds = node.bounds().scaled(scale);
        let mut font = node.font().clone();
        font.size *= scale;

        tree.set_location(id, bounds.origin)?;
        tree.set_size(id, bounds.size)?;
        tree.set_font(id, font)?;
        tree.get_mut(id)?.scroll.scale(scale);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UiConfig;
    use crate::headless::HeadlessPlatform;
    use cgmath::{Point2, Vector2};

    #[test]
    fn scale_factor_falls_back_to_one() {
        let mut platform = HeadlessPlatform::with_dpi(144.);
        let window = platform.create_window("test", 100, 100).unwrap();
        assert_eq!(scale_factor(&platform, window, 96.), 1.5);
        assert_eq!(scale_factor(&platform, WindowId(99), 96.), 1.);

        platform.dpi = None;
        assert_eq!(scale_factor(&platform, window, 96.), 1.);
    }

    #[test]
    fn scaling_touches_the_whole_subtree() {
        let mut tree = ControlTree::new(&UiConfig::default());
        let root = tree.create_at(Point2::new(30., 40.), Vector2::new(400., 300.));
        let child = tree.create_at(Point2::new(10., 20.), Vector2::new(100., 30.));
        tree.add_child(root, child).unwrap();

        apply_dpi_scaling(&mut tree, root, 2.).unwrap();

        let root = tree.get(root).unwrap();
        assert_eq!(root.location(), Point2::new(30., 40.));
        assert_eq!(root.size(), Vector2::new(800., 600.));
        assert_eq!(root.scroll.width, 30.);

        let child = tree.get(child).unwrap();
        assert_eq!(child.location(), Point2::new(20., 40.));
        assert_eq!(child.size(), Vector2::new(200., 60.));
        assert_eq!(child.font().size, 32.);
    }
}
