//! Print Specification Resolver
//!
//! The only place that knows physical geometry. Everything is measured in
//! PDF points (1 inch = 72 points).

use serde::{Deserialize, Serialize};

use crate::book::TrimSize;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Space kept free above the bottom margin for the running page number.
pub const FOOTER_RESERVE: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    fn inches(width: f32, height: f32) -> Self {
        Self { width: width * POINTS_PER_INCH, height: height * POINTS_PER_INCH }
    }
}

/// Binding-relative margins of a trim size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrimMargins {
    /// Gutter side, nearest the binding.
    pub inside: f32,
    pub outside: f32,
    pub top: f32,
    pub bottom: f32,
}

/// Margins resolved to page edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageParity {
    Even,
    Odd,
}

impl PageParity {
    /// Parity of a zero-based index in the overall page stream.
    pub fn of(page_index: usize) -> Self {
        if page_index % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margins: Margins,
}

impl PageGeometry {
    /// Bottom padding of the content area, leaving room for the footer.
    pub fn content_bottom(&self) -> f32 {
        self.margins.bottom + FOOTER_RESERVE
    }

    pub fn content_width(&self) -> f32 {
        self.width - self.margins.left - self.margins.right
    }
}

impl TrimSize {
    pub fn page_size(self) -> PageSize {
        match self {
            Self::SixByNine => PageSize::inches(6.0, 9.0),
            Self::Letter => PageSize::inches(8.5, 11.0),
        }
    }

    pub fn trim_margins(self) -> TrimMargins {
        match self {
            Self::SixByNine => TrimMargins { inside: 54.0, outside: 36.0, top: 36.0, bottom: 36.0 },
            Self::Letter => TrimMargins { inside: 54.0, outside: 36.0, top: 45.0, bottom: 45.0 },
        }
    }
}

/// Resolve size and edge margins for the page at `page_index`.
///
/// Even pages carry the gutter on the left, odd pages on the right.
pub fn resolve(trim: TrimSize, page_index: usize) -> PageGeometry {
    let size = trim.page_size();
    let m = trim.trim_margins();
    let (left, right) = match PageParity::of(page_index) {
        PageParity::Even => (m.inside, m.outside),
        PageParity::Odd => (m.outside, m.inside),
    };
    PageGeometry {
        width: size.width,
        height: size.height,
        margins: Margins { left, right, top: m.top, bottom: m.bottom },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_sizes_in_points() {
        assert_eq!(TrimSize::SixByNine.page_size(), PageSize { width: 432.0, height: 648.0 });
        assert_eq!(TrimSize::Letter.page_size(), PageSize { width: 612.0, height: 792.0 });
    }

    #[test]
    fn test_even_page_gutter_left() {
        let g = resolve(TrimSize::SixByNine, 0);
        assert_eq!(g.margins.left, 54.0);
        assert_eq!(g.margins.right, 36.0);
    }

    #[test]
    fn test_odd_page_gutter_right() {
        let g = resolve(TrimSize::SixByNine, 1);
        assert_eq!(g.margins.left, 36.0);
        assert_eq!(g.margins.right, 54.0);
    }

    #[test]
    fn test_top_bottom_differ_by_trim() {
        let small = resolve(TrimSize::SixByNine, 3);
        let large = resolve(TrimSize::Letter, 3);
        assert!(small.margins.top < large.margins.top);
        assert!(small.margins.bottom < large.margins.bottom);
    }

    #[test]
    fn test_mirroring_for_all_indices() {
        for trim in TrimSize::ALL {
            for index in 0..50 {
                let a = resolve(trim, index);
                let b = resolve(trim, index + 1);
                assert_eq!(a.margins.left, b.margins.right);
                assert_eq!(a.margins.right, b.margins.left);
                assert_eq!(a.margins.top, b.margins.top);
                assert_eq!(a.margins.bottom, b.margins.bottom);
                assert_eq!(a, resolve(trim, index + 2));
            }
        }
    }

    #[test]
    fn test_content_box() {
        let g = resolve(TrimSize::Letter, 0);
        assert_eq!(g.content_width(), 612.0 - 54.0 - 36.0);
        assert_eq!(g.content_bottom(), 65.0);
    }
}
