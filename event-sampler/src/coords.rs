//! Sky positions and celestial frame conversion.
//!
//! Sampled coordinates are reported in ICRS degrees regardless of the
//! native frame of the map they were drawn from.

use gammasim_common::Degrees;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPos {
    pub ra: Degrees,
    pub dec: Degrees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkyFrame {
    #[default]
    Icrs,
    Galactic,
}

/// Galactic-to-ICRS rotation matrix (transpose of the Hipparcos
/// ICRS-to-Galactic matrix).
const GAL_TO_ICRS: [[f64; 3]; 3] = [
    [-0.054_875_560_4, 0.494_109_427_9, -0.867_666_149_0],
    [-0.873_437_090_2, -0.444_829_630_0, -0.198_076_373_4],
    [-0.483_835_015_5, 0.746_982_244_5, 0.455_983_776_2],
];

/// Converts Galactic longitude/latitude to ICRS right ascension/declination,
/// all in degrees. RA is normalised to `[0, 360)`.
pub fn galactic_to_icrs(lon: Degrees, lat: Degrees) -> SkyPos {
    let (l, b) = (lon.to_radians(), lat.to_radians());
    let v = [b.cos() * l.cos(), b.cos() * l.sin(), b.sin()];

    let mut u = [0.0; 3];
    for (row, out) in GAL_TO_ICRS.iter().zip(u.iter_mut()) {
        *out = row[0] * v[0] + row[1] * v[1] + row[2] * v[2];
    }

    let dec = u[2].clamp(-1.0, 1.0).asin().to_degrees();
    let ra = u[1].atan2(u[0]).to_degrees().rem_euclid(360.0);
    SkyPos { ra, dec }
}

/// Maps native-frame coordinates to ICRS; the identity for ICRS input.
pub fn to_icrs(frame: SkyFrame, lon: Degrees, lat: Degrees) -> SkyPos {
    match frame {
        SkyFrame::Icrs => SkyPos { ra: lon, dec: lat },
        SkyFrame::Galactic => galactic_to_icrs(lon, lat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn galactic_centre_maps_to_sgr_a_region() {
        let pos = galactic_to_icrs(0.0, 0.0);
        assert_approx_eq!(pos.ra, 266.4050, 1e-2);
        assert_approx_eq!(pos.dec, -28.9362, 1e-2);
    }

    #[test]
    fn north_galactic_pole() {
        let pos = galactic_to_icrs(0.0, 90.0);
        assert_approx_eq!(pos.ra, 192.8595, 1e-2);
        assert_approx_eq!(pos.dec, 27.1284, 1e-2);
    }

    #[test]
    fn icrs_input_is_passed_through_bit_for_bit() {
        let pos = to_icrs(SkyFrame::Icrs, 83.633, 22.0145);
        assert_eq!(pos.ra, 83.633);
        assert_eq!(pos.dec, 22.0145);
    }

    #[test]
    fn right_ascension_is_normalised() {
        // Anticentre direction, l = 180.
        let pos = galactic_to_icrs(180.0, 0.0);
        assert!((0.0..360.0).contains(&pos.ra));
    }
}
