//! Unit conversions used at the catalog and display boundaries

use uom::si::f64::{Length, Power, Velocity, Volume};
use uom::si::length::{inch, millimeter};
use uom::si::power::{kilowatt, watt};
use uom::si::velocity::{foot_per_second, meter_per_second};
use uom::si::volume::{cubic_centimeter, cubic_millimeter};

/// m/min to ft/min (SFM)
pub fn m_min_to_ft_min(v: f64) -> f64 {
    // Both sides share the per-minute denominator, so convert the length part only.
    Velocity::new::<meter_per_second>(v).get::<foot_per_second>()
}

pub fn kw_to_w(p: f64) -> f64 {
    Power::new::<kilowatt>(p).get::<watt>()
}

pub fn w_to_kw(p: f64) -> f64 {
    Power::new::<watt>(p).get::<kilowatt>()
}

pub fn mm_to_in(l: f64) -> f64 {
    Length::new::<millimeter>(l).get::<inch>()
}

/// mm^3/min to cm^3/min
pub fn mm3_to_cm3(v: f64) -> f64 {
    Volume::new::<cubic_millimeter>(v).get::<cubic_centimeter>()
}
