/// Gap between the marker and the tooltip.
pub const ANCHOR_GAP: f64 = 5.0;
/// Distance kept from the right edge when the tooltip is shifted left.
pub const EDGE_MARGIN: f64 = 10.0;

/// Box in viewport coordinates (before scrolling is applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Document-space position of the tooltip's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
}

/// Below the anchor by default; shifted left when it would overflow the right edge and
/// flipped above the anchor when it would overflow the bottom edge.
pub fn place(anchor: Rect, tooltip: Size, viewport: Viewport) -> Placement {
    let mut left = anchor.left + viewport.scroll_x;
    let mut top = anchor.bottom() + viewport.scroll_y + ANCHOR_GAP;

    if left + tooltip.width > viewport.width {
        left = viewport.width - tooltip.width - EDGE_MARGIN;
    }

    if top + tooltip.height > viewport.height + viewport.scroll_y {
        top = anchor.top + viewport.scroll_y - tooltip.height - ANCHOR_GAP;
    }

    Placement { left, top }
}
