use lakeops_macros::Record;

#[derive(Debug, Clone, Copy, Record)]
pub struct TestDay {
    pub stage: f64,
    pub storage: f64,
    pub outflow: f64,
}

fn main() {
    let d = TestDay { stage: 14.5, storage: 3_000_000.0, outflow: 0.0 };
    let mut series = TestDaySeries::with_capacity(10);
    series.push(&d);
    assert_eq!(series.len(), 1);
    assert!(!series.is_empty());
    assert_eq!(series.stage, vec![14.5]);
    assert_eq!(TestDay::column_names(), &["stage", "storage", "outflow"]);
}
