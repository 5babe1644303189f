use lakeops_macros::Record;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Low,
    High,
}

#[derive(Debug, Clone, Record)]
pub struct MixedDay {
    pub label: String,
    pub zone: Zone,
    pub code: u8,
    pub stage: f64,
}

fn main() {
    let d = MixedDay { label: "day".to_string(), zone: Zone::High, code: 7, stage: 15.0 };
    let mut series = MixedDaySeries::default();
    assert!(series.is_empty());
    series.push(&d);
    assert_eq!(series.zone, vec![Zone::High]);
    assert_eq!(series.code, vec![7u8]);
    assert_eq!(series.label[0], "day");
}
