//! Weighted sensor fusion.
//!
//! Every climate-bearing source (this node's own sensors plus each Fresh
//! peer) contributes a [`WeightedSample`] in engineering units.  The
//! aggregate of each quantity is `Σ(value × weight) / Σ(weight)` over the
//! samples with positive weight.  Wire encodings are normalised to floats
//! before combining and the sums are accumulated in `f64`, so the result does
//! not depend on the order sources are folded in.

use serde::Serialize;

use crate::protocol::RoleReading;
use crate::sources::{Freshness, SourceTable};

/// One source's climate values and trust weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightedSample {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: f32,
    pub weight: f32,
}

impl WeightedSample {
    /// Normalise a peer reading; `None` for roles without climate data.
    pub fn from_reading(reading: &RoleReading) -> Option<Self> {
        match reading {
            RoleReading::Electronic(c) => Some(Self {
                temperature_c: c.temperature_c(),
                humidity_pct: c.humidity_pct(),
                co2_ppm: c.co2_ppm(),
                weight: c.weight(),
            }),
            RoleReading::Window(w) => Self::from_reading(&RoleReading::Electronic(w.climate)),
            RoleReading::Interface(i) => Some(Self {
                temperature_c: i.temperature_c(),
                humidity_pct: i.humidity_pct(),
                co2_ppm: i.co2_ppm(),
                weight: i.weight(),
            }),
            RoleReading::Light(_) => None,
        }
    }
}

/// Weight-normalised mean of temperature, humidity and CO2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub co2_ppm: f32,
}

/// Fuse samples.  Returns `None` when no sample has a positive weight.
pub fn fuse(samples: impl IntoIterator<Item = WeightedSample>) -> Option<Aggregate> {
    let mut total = 0.0f64;
    let (mut t, mut h, mut c) = (0.0f64, 0.0f64, 0.0f64);

    for s in samples {
        if !(s.weight.is_finite() && s.weight > 0.0) {
            continue;
        }
        let w = f64::from(s.weight);
        total += w;
        t += f64::from(s.temperature_c) * w;
        h += f64::from(s.humidity_pct) * w;
        c += f64::from(s.co2_ppm) * w;
    }

    if total <= 0.0 {
        return None;
    }
    Some(Aggregate {
        temperature_c: (t / total) as f32,
        humidity_pct: (h / total) as f32,
        co2_ppm: (c / total) as f32,
    })
}

/// Fuse the local sample with every Fresh climate peer in `table`.
pub fn compute(local: WeightedSample, table: &SourceTable) -> Option<Aggregate> {
    let peers = table
        .peers()
        .filter(|(_, entry)| entry.freshness() == Freshness::Fresh)
        .filter_map(|(_, entry)| WeightedSample::from_reading(entry.reading()));
    fuse(core::iter::once(local).chain(peers))
}
