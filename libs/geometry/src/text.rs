//! Text labels.

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::bbox::Bbox;
use crate::point::{Point, Vector};
use crate::rect::Rect;
use crate::transform::{Trans, TransformMut, Transformation, TranslateMut};

/// Horizontal alignment of a text relative to its origin.
#[derive(
    Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum HAlign {
    /// The origin is at the left edge of the text.
    #[default]
    Left,
    /// The origin is at the horizontal center of the text.
    Center,
    /// The origin is at the right edge of the text.
    Right,
}

/// Vertical alignment of a text relative to its origin.
#[derive(
    Debug, Default, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum VAlign {
    /// The origin is at the bottom of the text.
    #[default]
    Bottom,
    /// The origin is at the vertical center of the text.
    Center,
    /// The origin is at the top of the text.
    Top,
}

/// A text label placed by a simple transformation.
///
/// The bounding box of a text is its origin; the glyph extent is a
/// rendering concern.
#[derive(Debug, Default, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Text {
    string: ArcStr,
    trans: Trans,
    size: i64,
    font: Option<u32>,
    halign: HAlign,
    valign: VAlign,
}

impl Text {
    /// Creates a text with default size, font and alignment.
    ///
    /// # Example
    ///
    /// ```
    /// # use geometry::prelude::*;
    /// let t = Text::new("VDD", Trans::from_disp(Vector::new(10, 20)));
    /// assert_eq!(t.origin(), Point::new(10, 20));
    /// assert_eq!(t.bbox(), Some(Rect::from_sides(10, 20, 10, 20)));
    /// ```
    pub fn new(string: impl Into<ArcStr>, trans: Trans) -> Self {
        Self {
            string: string.into(),
            trans,
            ..Default::default()
        }
    }

    /// Sets the text size.
    pub fn with_size(mut self, size: i64) -> Self {
        self.size = size;
        self
    }

    /// Sets the font.
    pub fn with_font(mut self, font: u32) -> Self {
        self.font = Some(font);
        self
    }

    /// Sets the alignment.
    pub fn with_align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    /// The text string.
    pub fn string(&self) -> &ArcStr {
        &self.string
    }

    /// The placement of the text.
    pub fn trans(&self) -> Trans {
        self.trans
    }

    /// The origin of the text.
    pub fn origin(&self) -> Point {
        self.trans.disp().to_point()
    }

    /// The text size, or 0 for the default size.
    pub fn size(&self) -> i64 {
        self.size
    }

    /// The font, if one is set.
    pub fn font(&self) -> Option<u32> {
        self.font
    }

    /// The horizontal alignment.
    pub fn halign(&self) -> HAlign {
        self.halign
    }

    /// The vertical alignment.
    pub fn valign(&self) -> VAlign {
        self.valign
    }
}

impl Bbox for Text {
    fn bbox(&self) -> Option<Rect> {
        Some(Rect::from_point(self.origin()))
    }
}

impl TranslateMut for Text {
    fn translate_mut(&mut self, v: Vector) {
        self.trans = Trans::new(self.trans.fp_trans(), self.trans.disp() + v);
    }
}

impl TransformMut for Text {
    /// Composes the placement with `trans`. Magnification scales the size,
    /// non-Manhattan rotation is snapped to the closest orientation.
    fn transform_mut<T: Transformation>(&mut self, trans: &T) {
        let ct = trans.to_complex() * self.trans.to_complex();
        self.trans = Trans::from_complex(&ct);
        self.size = trans.ctrans(self.size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::ICplxTrans;
    use crate::transform::{FixpointTrans, Transform};

    #[test]
    fn transform_composes_placement() {
        let t = Text::new("A", Trans::new(FixpointTrans::R90, Vector::new(10, 0))).with_size(5);
        let rot = Trans::new(FixpointTrans::R90, Vector::new(0, 1));
        let tt = t.clone().transform(&rot);
        assert_eq!(tt.trans(), rot * t.trans());
        assert_eq!(tt.size(), 5);
        assert_eq!(tt.string().as_str(), "A");
    }

    #[test]
    fn magnification_scales_size() {
        let t = Text::new("B", Trans::identity()).with_size(5);
        let tt = t.transform(&ICplxTrans::new(2., 0., false, Vector::new(3, 4)));
        assert_eq!(tt.size(), 10);
        assert_eq!(tt.origin(), Point::new(3, 4));
    }
}
