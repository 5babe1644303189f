use lakeops_macros::Record;

#[derive(Record)]
pub struct Pair(f64, f64);

fn main() {}
