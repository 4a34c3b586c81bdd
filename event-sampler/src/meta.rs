//! Event-list header construction.
//!
//! Builds the fixed gamma-astro data format header key set from the dataset
//! and observation context. Pure and deterministic: no randomness, no
//! mutation, bit-identical output for identical input.
//!
//! See <https://gamma-astro-data-formats.readthedocs.io/en/latest/events/events.html>.

use crate::{caldb, dataset::MapDataset, error::SamplerError, observation::Observation};
use gammasim_common::{seconds_since, time};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

const HDUDOC: &str = "https://github.com/open-gamma-ray-astro/gamma-astro-data-formats";

/// A header value: FITS-style string, integer or floating-point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Str(s) => write!(f, "{s}"),
            MetaValue::Int(i) => write!(f, "{i}"),
            MetaValue::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_owned())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Int(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Float(value)
    }
}

fn aeff_string<'a>(observation: &'a Observation, key: &str) -> Result<&'a str, SamplerError> {
    observation
        .aeff_meta
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| SamplerError::MissingCalibrationKey(key.to_owned()))
}

/// The parsed value of a `CBDn0001` calibration boundary string.
fn cbd_value(observation: &Observation, key: &str) -> Result<String, SamplerError> {
    Ok(caldb::parse_cbd(aeff_string(observation, key)?)?.value)
}

/// Derives the event-list header mapping from the dataset and observation.
pub fn event_list_meta(
    dataset: &MapDataset,
    observation: &Observation,
) -> Result<BTreeMap<String, MetaValue>, SamplerError> {
    let gti = &dataset.gti;
    let mut meta = BTreeMap::new();
    let mut put = |key: &str, value: MetaValue| {
        meta.insert(key.to_owned(), value);
    };

    put("HDUCLAS1", "EVENTS".into());
    put("EXTNAME", "EVENTS".into());
    put("HDUDOC", HDUDOC.into());
    put("HDUVERS", "0.2".into());
    put("HDUCLASS", "GADF".into());

    put("OBS_ID", i64::from(observation.obs_id).into());

    put(
        "TSTART",
        seconds_since(observation.tstart, gti.time_ref()).into(),
    );
    put(
        "TSTOP",
        seconds_since(observation.tstop, gti.time_ref()).into(),
    );
    put("ONTIME", observation.ontime().into());
    put("LIVETIME", observation.livetime.into());
    put("DEADC", observation.dead_time_fraction().into());

    put("RA_PNT", observation.pointing.ra.into());
    put("DEC_PNT", observation.pointing.dec.into());

    put("EQUINOX", "J2000".into());
    put("RADECSYS", "icrs".into());

    put(
        "CREATOR",
        format!("gammasim {}", env!("CARGO_PKG_VERSION")).into(),
    );
    put("EUNIT", "TeV".into());
    put("EVTVER", "".into());

    put("OBSERVER", "gammasim".into());
    put("DSTYP1", "TIME".into());
    put("DSUNI1", "s".into());
    put("DSVAL1", "TABLE".into());
    put("DSREF1", ":GTI".into());
    put("DSTYP2", "ENERGY".into());
    put("DSUNI2", "TeV".into());

    // The simulated target: first source component, else the pointing.
    match dataset.source_models().next() {
        Some((_, model)) => {
            put("OBJECT", model.name.as_str().into());
            if let Some(position) = model.position() {
                put("RA_OBJ", position.ra.into());
                put("DEC_OBJ", position.dec.into());
            }
        }
        None => {
            if let Some(model) = dataset.models.first() {
                put("OBJECT", model.name.as_str().into());
            }
            put("RA_OBJ", observation.pointing.ra.into());
            put("DEC_OBJ", observation.pointing.dec.into());
        }
    }

    put("TELAPSE", gti.time_sum().into());
    put("MJDREFI", (gti.time_ref().floor() as i64).into());
    put("MJDREFF", gti.time_ref().fract().into());
    put("TIMEUNIT", "s".into());
    put("TIMESYS", gti.scale().into());
    put("TIMEREF", "LOCAL".into());
    put("DATE-OBS", time::mjd_date_string(gti.time_start())?.into());
    put("DATE-END", time::mjd_date_string(gti.time_stop())?.into());
    put("TIME-OBS", time::mjd_time_string(gti.time_start())?.into());
    put("TIME-END", time::mjd_time_string(gti.time_stop())?.into());
    put("TIMEDEL", (1e-9).into());
    put("CONV_DEP", 0i64.into());
    put("CONV_RA", 0i64.into());
    put("CONV_DEC", 0i64.into());

    for (idx, model) in dataset.models.iter().enumerate() {
        put(&format!("MID{:05}", idx + 1), (idx as i64 + 1).into());
        put(&format!("MMN{:05}", idx + 1), model.name.as_str().into());
    }
    put("NMCIDS", (dataset.models.len() as i64).into());

    put("ALTITUDE", cbd_value(observation, "CBD50001")?.into());
    put("ALT_PNT", cbd_value(observation, "CBD50001")?.into());
    put("AZ_PNT", cbd_value(observation, "CBD60001")?.into());

    put("ORIGIN", "gammasim".into());
    put("CALDB", cbd_value(observation, "CBD20001")?.into());
    put("IRF", cbd_value(observation, "CBD10001")?.into());
    put("TELESCOP", aeff_string(observation, "TELESCOP")?.into());
    put("INSTRUME", aeff_string(observation, "INSTRUME")?.into());
    put("N_TELS", "".into());
    put("TELLIST", "".into());
    put("GEOLON", "".into());
    put("GEOLAT", "".into());

    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coords::{SkyFrame, SkyPos},
        dataset::{NpredEvaluator, PrecomputedEvaluator, SkyModel},
        gti::Gti,
        map::{BinnedCountsMap, EnergyAxisKind},
    };
    use assert_approx_eq::assert_approx_eq;
    use ndarray::Array3;

    fn observation() -> Observation {
        let aeff_meta = BTreeMap::from(
            [
                ("CBD10001", "NAME(South_z20_50h)"),
                ("CBD20001", "CALDB(1.0.0)"),
                ("CBD50001", "ALT(20.0 deg)"),
                ("CBD60001", "AZ(0.0 deg)"),
                ("TELESCOP", "CTA"),
                ("INSTRUME", "Southern Array"),
            ]
            .map(|(k, v)| (k.to_owned(), v.to_owned())),
        );
        Observation {
            obs_id: 1001,
            tstart: 59000.0,
            tstop: 59000.25,
            pointing: SkyPos {
                ra: 83.633,
                dec: 22.0145,
            },
            livetime: 20520.0,
            aeff_meta,
        }
    }

    fn dataset() -> MapDataset {
        let npred = BinnedCountsMap::new(
            Array3::from_elem((1, 1, 1), 10.0),
            vec![1.0, 10.0],
            vec![21.0, 23.0],
            vec![83.0, 84.0],
            SkyFrame::Icrs,
            EnergyAxisKind::True,
        )
        .unwrap();
        let mut evaluators: BTreeMap<String, Box<dyn NpredEvaluator>> = BTreeMap::new();
        evaluators.insert(
            "crab".to_owned(),
            Box::new(PrecomputedEvaluator::new(npred)),
        );
        MapDataset {
            models: vec![
                SkyModel::background("bkg"),
                SkyModel::source(
                    "crab",
                    SkyPos {
                        ra: 83.633,
                        dec: 22.0145,
                    },
                ),
            ],
            evaluators,
            background: None,
            psf: None,
            edisp: None,
            gti: Gti::new(59000.0, 59000.25, 58999.0, "TT").unwrap(),
        }
    }

    #[test]
    fn time_bounds_are_relative_to_the_reference_epoch() {
        let meta = event_list_meta(&dataset(), &observation()).unwrap();
        match meta["TSTART"] {
            MetaValue::Float(v) => assert_approx_eq!(v, 86400.0),
            ref other => unreachable!("TSTART should be a float, got {other:?}"),
        }
        assert_eq!(meta["MJDREFI"], MetaValue::Int(58999));
        assert_eq!(meta["TIMESYS"], MetaValue::Str("TT".to_owned()));
        assert_eq!(meta["DATE-OBS"], MetaValue::Str("2020-05-31".to_owned()));
    }

    #[test]
    fn object_is_the_first_source_component() {
        let meta = event_list_meta(&dataset(), &observation()).unwrap();
        assert_eq!(meta["OBJECT"], MetaValue::Str("crab".to_owned()));
        assert_eq!(meta["RA_OBJ"], MetaValue::Float(83.633));
    }

    #[test]
    fn per_model_identifier_pairs_are_zero_padded() {
        let meta = event_list_meta(&dataset(), &observation()).unwrap();
        assert_eq!(meta["MID00001"], MetaValue::Int(1));
        assert_eq!(meta["MMN00001"], MetaValue::Str("bkg".to_owned()));
        assert_eq!(meta["MID00002"], MetaValue::Int(2));
        assert_eq!(meta["MMN00002"], MetaValue::Str("crab".to_owned()));
        assert_eq!(meta["NMCIDS"], MetaValue::Int(2));
    }

    #[test]
    fn calibration_keywords_are_parsed_not_sliced() {
        let meta = event_list_meta(&dataset(), &observation()).unwrap();
        assert_eq!(meta["IRF"], MetaValue::Str("South_z20_50h".to_owned()));
        assert_eq!(meta["CALDB"], MetaValue::Str("1.0.0".to_owned()));
        assert_eq!(meta["ALT_PNT"], MetaValue::Str("20.0".to_owned()));
        assert_eq!(meta["AZ_PNT"], MetaValue::Str("0.0".to_owned()));
    }

    #[test]
    fn missing_calibration_header_fails_fast() {
        let mut obs = observation();
        obs.aeff_meta.remove("CBD50001");
        assert!(matches!(
            event_list_meta(&dataset(), &obs),
            Err(SamplerError::MissingCalibrationKey(key)) if key == "CBD50001"
        ));
    }

    #[test]
    fn identical_inputs_build_bit_identical_mappings() {
        let first = event_list_meta(&dataset(), &observation()).unwrap();
        let second = event_list_meta(&dataset(), &observation()).unwrap();
        assert_eq!(first, second);
    }
}
