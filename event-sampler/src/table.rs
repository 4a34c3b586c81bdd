//! Columnar event storage.
//!
//! Events are held as parallel column vectors rather than rows, matching
//! the canonical column set of the gamma-astro data format: `TIME` and
//! `MC_ID` are always present, the true-quantity triple
//! (`ENERGY_TRUE`/`RA_TRUE`/`DEC_TRUE`) is carried for source events only,
//! and the reconstructed columns (`ENERGY`/`RA`/`DEC`) are populated by the
//! response smearing stage. `EVENT_ID` is assigned once, after merging.

use crate::{error::SamplerError, meta::MetaValue};
use gammasim_common::{Degrees, EventId, ModelId, Seconds, TeV};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EventTable {
    pub time: Vec<Seconds>,
    pub mc_id: Vec<ModelId>,
    pub energy_true: Option<Vec<TeV>>,
    pub ra_true: Option<Vec<Degrees>>,
    pub dec_true: Option<Vec<Degrees>>,
    pub energy: Option<Vec<TeV>>,
    pub ra: Option<Vec<Degrees>>,
    pub dec: Option<Vec<Degrees>>,
    pub event_id: Option<Vec<EventId>>,
}

impl EventTable {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub(crate) fn column<'a>(
        col: &'a Option<Vec<f64>>,
        name: &'static str,
    ) -> Result<&'a [f64], SamplerError> {
        col.as_deref().ok_or(SamplerError::MissingColumn(name))
    }

    /// Moves the true-quantity columns into their reconstructed slots.
    ///
    /// Background maps are already in reconstructed space, so the
    /// provisional `*_TRUE` columns written by the coordinate sampler are
    /// renamed rather than smeared, and no true-quantity column survives.
    pub fn rename_true_to_reco(&mut self) {
        self.energy = self.energy_true.take();
        self.ra = self.ra_true.take();
        self.dec = self.dec_true.take();
    }

    /// Concatenates tables in order, preserving every row.
    ///
    /// A column present in one part but absent in another is padded with
    /// NaN for the rows of the parts that lack it, so merging background
    /// events (no true columns) with source events keeps the column set of
    /// both. `EVENT_ID` never survives a stack; it is reassigned over the
    /// merged order. Stacking no tables yields a well-formed empty table.
    pub fn stack(parts: Vec<EventTable>) -> EventTable {
        let total: usize = parts.iter().map(EventTable::len).sum();

        let mut out = EventTable::default();
        out.time.reserve(total);
        out.mc_id.reserve(total);

        macro_rules! pad_stack {
            ($field:ident) => {
                if parts.iter().any(|p| p.$field.is_some()) {
                    let mut col = Vec::with_capacity(total);
                    for part in &parts {
                        match &part.$field {
                            Some(values) => col.extend_from_slice(values),
                            None => col.extend(std::iter::repeat_n(f64::NAN, part.len())),
                        }
                    }
                    out.$field = Some(col);
                }
            };
        }

        pad_stack!(energy_true);
        pad_stack!(ra_true);
        pad_stack!(dec_true);
        pad_stack!(energy);
        pad_stack!(ra);
        pad_stack!(dec);

        for part in parts {
            out.time.extend(part.time);
            out.mc_id.extend(part.mc_id);
        }
        out
    }

    /// Tags every row with the model component that generated it.
    pub fn tag_mc_id(&mut self, mc_id: ModelId) {
        self.mc_id = vec![mc_id; self.len()];
    }

    /// Assigns `EVENT_ID` as the contiguous sequence `0..len`.
    pub fn assign_event_ids(&mut self) {
        self.event_id = Some((0..self.len() as EventId).collect());
    }
}

/// An event table together with its attached header mapping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventList {
    pub table: EventTable,
    pub meta: BTreeMap<String, MetaValue>,
}

impl EventList {
    pub fn new(table: EventTable) -> Self {
        Self {
            table,
            meta: BTreeMap::new(),
        }
    }

    /// Concatenates several lists into one, preserving all rows. Metadata
    /// is not merged; the caller attaches it to the result.
    pub fn stack(lists: Vec<EventList>) -> EventList {
        EventList::new(EventTable::stack(
            lists.into_iter().map(|list| list.table).collect(),
        ))
    }
}
