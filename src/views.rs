// Named views over a received layer set and the cyclic index that walks them.

use crate::compositor::LayerSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Cleaned,
    Heatmap,
    Contours,
}

impl View {
    pub const ALL: [View; 3] = [View::Cleaned, View::Heatmap, View::Contours];

    pub fn label(self) -> &'static str {
        match self {
            View::Cleaned => "CLEANED",
            View::Heatmap => "HEATMAP",
            View::Contours => "CONTOURS",
        }
    }

    /// The subset of `set` this view composites: cleaned is the base alone,
    /// heatmap adds the translucent mid layer, contours adds the top layer.
    pub fn select(self, set: &LayerSet) -> LayerSet {
        let mut out = LayerSet { mid: None, top: None, ..set.clone() };
        match self {
            View::Cleaned => {}
            View::Heatmap => out.mid = set.mid.clone(),
            View::Contours => out.top = set.top.clone(),
        }
        out
    }
}

/// Index in `[0, N)` over the views in `View::ALL` order; moves only by next/prev.
#[derive(Debug)]
pub struct ViewCycler {
    views: [View; 3],
    index: usize,
}

impl ViewCycler {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn current(&self) -> View {
        self.views[self.index]
    }

    pub fn next(&mut self) -> View {
        self.index = (self.index + 1) % self.len();
        self.current()
    }

    pub fn prev(&mut self) -> View {
        self.index = (self.index + self.len() - 1) % self.len();
        self.current()
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

impl Default for ViewCycler {
    fn default() -> Self {
        Self { views: View::ALL, index: 0 }
    }
}
