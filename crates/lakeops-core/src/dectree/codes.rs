//! Release-code tables mapping branch codes to release-level steps.
//!
//! Every branch code the indicators can produce must have an entry; this is
//! checked when a table is loaded so lookups inside the loop never miss.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::indicators::composite;
use crate::config::TableVersion;
use crate::error::{SimError, SimResult};

/// Digit ranges a branch code can take, in composite order.
struct Domain {
    digits: [RangeInclusive<u8>; 4],
    max_step: u8,
}

const ZONE_D: Domain = Domain {
    digits: [1..=3, 1..=2, 0..=2, 1..=2],
    max_step: 2,
};
const ZONE_C: Domain = Domain {
    digits: [1..=3, 0..=2, 1..=2, 1..=2],
    max_step: 1,
};
const ZONE_B: Domain = Domain {
    digits: [1..=3, 1..=2, 1..=3, 1..=2],
    max_step: 1,
};

impl Domain {
    fn codes(&self) -> impl Iterator<Item = ([u8; 4], u16)> + '_ {
        let [t, s, se, ms] = &self.digits;
        t.clone().flat_map(move |t| {
            s.clone().flat_map(move |s| {
                se.clone().flat_map(move |se| {
                    ms.clone()
                        .map(move |ms| ([t, s, se, ms], composite(t, s, se, ms)))
                })
            })
        })
    }

    fn build(&self, rule: impl Fn([u8; 4]) -> u8) -> ReleaseCodeTable {
        ReleaseCodeTable(
            self.codes()
                .map(|(d, code)| (code, rule(d).min(self.max_step)))
                .collect(),
        )
    }
}

/// Branch code to release-level step for one zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReleaseCodeTable(pub BTreeMap<u16, u8>);

impl ReleaseCodeTable {
    pub fn step(&self, code: u16) -> u8 {
        self.0.get(&code).copied().unwrap_or(0)
    }

    fn check(&self, name: &str, domain: &Domain) -> SimResult<()> {
        for (_, code) in domain.codes() {
            match self.0.get(&code) {
                None => {
                    return Err(SimError::config(
                        name,
                        format!("no entry for branch code {code}"),
                    ))
                }
                Some(&step) if step > domain.max_step => {
                    return Err(SimError::domain(
                        format!("{name}[{code}]"),
                        f64::from(step),
                        0.0,
                        f64::from(domain.max_step),
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Release-code tables for the three branches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCodeTables {
    pub zone_d: ReleaseCodeTable,
    pub zone_c: ReleaseCodeTable,
    pub zone_b: ReleaseCodeTable,
}

impl ReleaseCodeTables {
    pub fn for_version(version: TableVersion) -> Self {
        match version {
            TableVersion::Legacy => Self::legacy(),
            TableVersion::Revised => Self::revised(),
        }
    }

    /// The original schedule's tables.
    pub fn legacy() -> Self {
        Self {
            zone_d: ZONE_D.build(|[t, s, se, ms]| match t {
                1 => u8::from(s == 2 && (se == 2 || ms == 2)),
                2 => 1 + u8::from(s == 2 && se == 2 && ms == 2),
                _ => 2,
            }),
            zone_c: ZONE_C.build(|[t, met, se, ms]| {
                u8::from(t >= 2 || met == 2 || (se == 2 && ms == 2))
            }),
            zone_b: ZONE_B.build(|[t, s, se, _]| u8::from(t == 3 || (s == 2 && se >= 2))),
        }
    }

    /// Tables that release earlier on wet outlooks.
    pub fn revised() -> Self {
        Self {
            zone_d: ZONE_D.build(|[t, s, se, ms]| match t {
                1 => u8::from(s == 2 || se == 2),
                2 => 1 + u8::from(se == 2 || ms == 2),
                _ => 2,
            }),
            zone_c: ZONE_C.build(|[t, met, se, ms]| {
                u8::from(t >= 2 || (met >= 1 && se == 2) || ms == 2)
            }),
            zone_b: ZONE_B.build(|[t, s, se, _]| u8::from(t >= 2 || s == 2 || se == 3)),
        }
    }

    /// Check every reachable branch code has an in-range entry.
    pub fn validate(&self) -> SimResult<()> {
        self.zone_d.check("release_codes.zone_d", &ZONE_D)?;
        self.zone_c.check("release_codes.zone_c", &ZONE_C)?;
        self.zone_b.check("release_codes.zone_b", &ZONE_B)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_tables_cover_their_domains() {
        assert!(ReleaseCodeTables::legacy().validate().is_ok());
        assert!(ReleaseCodeTables::revised().validate().is_ok());
    }

    #[test]
    fn domain_sizes() {
        assert_eq!(ZONE_D.codes().count(), 36);
        assert_eq!(ZONE_C.codes().count(), 36);
        assert_eq!(ZONE_B.codes().count(), 36);
    }

    #[test]
    fn legacy_zone_d_steps() {
        let t = ReleaseCodeTables::legacy();
        assert_eq!(t.zone_d.step(1101), 0);
        assert_eq!(t.zone_d.step(1221), 1);
        assert_eq!(t.zone_d.step(2111), 1);
        assert_eq!(t.zone_d.step(2222), 2);
        assert_eq!(t.zone_d.step(3111), 2);
    }

    #[test]
    fn revised_releases_earlier() {
        let legacy = ReleaseCodeTables::legacy();
        let revised = ReleaseCodeTables::revised();
        for (code, &step) in &legacy.zone_d.0 {
            assert!(revised.zone_d.step(*code) >= step, "code {code}");
        }
    }

    #[test]
    fn missing_entry_is_rejected() {
        let mut t = ReleaseCodeTables::legacy();
        t.zone_c.0.remove(&1111);
        let err = t.validate().unwrap_err();
        assert!(err.to_string().contains("1111"));
    }

    #[test]
    fn oversized_step_is_rejected() {
        let mut t = ReleaseCodeTables::legacy();
        t.zone_b.0.insert(1111, 4);
        assert!(matches!(t.validate(), Err(SimError::NumericDomain { .. })));
    }

    #[test]
    fn tables_round_trip_through_json() {
        let t = ReleaseCodeTables::revised();
        let json = serde_json::to_string(&t).unwrap();
        let back: ReleaseCodeTables = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
