use lakeops_macros::Record;

#[derive(Debug, Clone, Copy, Record)]
#[record(series_name = "Outflows")]
pub struct OutflowDay {
    pub east: f64,
    pub west: f64,
}

fn main() {
    let d = OutflowDay { east: 1.0, west: 2.0 };
    let mut series = Outflows::with_capacity(5);
    series.push(&d);
    series.push(&d);
    assert_eq!(series.len(), 2);
    assert_eq!(series.west, vec![2.0, 2.0]);
    assert_eq!(OutflowDay::column_names(), &["east", "west"]);
}
