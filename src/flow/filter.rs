use crate::flow::record::FlowRecord;
use crate::flow::FlowCategory;

/// The filter state a rebuild runs against. Only the controller creates
/// new snapshots; builders see an immutable copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSnapshot {
    pub year: String,
    pub selected_region: Option<String>,
    pub show_inflow: bool,
    pub show_outflow: bool,
}

impl FilterSnapshot {
    pub fn for_year(year: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            selected_region: None,
            show_inflow: true,
            show_outflow: true,
        }
    }

    /// Records of the active year with a finite volume at or above
    /// `min_volume`, tagged with their category.
    ///
    /// With a selection, inflow records come first, then outflow records,
    /// each in table order. A record touching the selection on both ends
    /// appears once per enabled direction.
    pub fn tagged_records<'a>(
        &self,
        records: &'a [FlowRecord],
        min_volume: f64,
    ) -> Vec<(&'a FlowRecord, FlowCategory)> {
        let significant = move || {
            records
                .iter()
                .filter(move |r| {
                    r.year == self.year && r.volume.is_finite() && r.volume >= min_volume
                })
        };

        match self.selected_region.as_deref() {
            None => significant().map(|r| (r, FlowCategory::Normal)).collect(),
            Some(selected) => {
                let mut tagged = Vec::new();
                if self.show_inflow {
                    tagged.extend(
                        significant()
                            .filter(|r| r.destination == selected)
                            .map(|r| (r, FlowCategory::Inflow)),
                    );
                }
                if self.show_outflow {
                    tagged.extend(
                        significant()
                            .filter(|r| r.origin == selected)
                            .map(|r| (r, FlowCategory::Outflow)),
                    );
                }
                tagged
            }
        }
    }
}
