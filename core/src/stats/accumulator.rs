//! Statistics Accumulator

use crate::pbrt;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::OnceLock;

/// Return the global statistics accumulator.
pub fn stats_accumulator() -> &'static Mutex<StatsAccumulator> {
    static DATA: OnceLock<Mutex<StatsAccumulator>> = OnceLock::new();
    DATA.get_or_init(|| Mutex::new(StatsAccumulator::new()))
}

/// Integer distribution statistic.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StatsDistribution {
    /// Sum of all values.
    sum: i64,

    /// Count of all values.
    count: u64,

    /// Minimum value.
    min: Option<i64>,

    /// Maximum value.
    max: Option<i64>,
}

impl StatsDistribution {
    /// Merges another distribution into this one.
    ///
    /// * `other` - The other distribution.
    pub fn merge(&mut self, other: &Self) {
        self.sum += other.sum;
        self.count += other.count;
        self.min = merge_bound(self.min, other.min, pbrt::min);
        self.max = merge_bound(self.max, other.max, pbrt::max);
    }

    /// Records a value.
    ///
    /// * `val` - The value.
    pub fn report(&mut self, val: i64) {
        self.merge(&Self {
            sum: val,
            count: 1,
            min: Some(val),
            max: Some(val),
        });
    }

    /// Returns the average or `None` if nothing was recorded.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

fn merge_bound(a: Option<i64>, b: Option<i64>, pick: fn(i64, i64) -> i64) -> Option<i64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, b) => a.or(b),
    }
}

/// An accumulated statistic.
#[derive(Copy, Clone, Debug, PartialEq)]
enum StatValue {
    Counter(i64),
    Memory(u64),
    Distribution(StatsDistribution),
}

impl StatValue {
    /// Returns the formatted value or `None` if there is nothing to show.
    fn display(&self) -> Option<String> {
        match *self {
            StatValue::Counter(0) | StatValue::Memory(0) => None,
            StatValue::Counter(v) => Some(format!("{v:12}")),
            StatValue::Memory(v) => {
                let kb = v as f64 / 1024.0;
                Some(if kb < 1024.0 {
                    format!("{kb:12.2} kB")
                } else {
                    format!("{:12.2} MiB", kb / 1024.0)
                })
            }
            StatValue::Distribution(d) => d.average().map(|avg| {
                format!(
                    "{avg:12.3} avg [range {} - {}]",
                    d.min.unwrap_or_default(),
                    d.max.unwrap_or_default()
                )
            }),
        }
    }
}

/// Statistics merged from every thread, keyed by `category/title`.
#[derive(Default)]
pub struct StatsAccumulator {
    stats: BTreeMap<String, StatValue>,
}

impl StatsAccumulator {
    /// Create a new empty `StatsAccumulator`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds to a counter.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Counter value.
    pub fn report_counter(&mut self, name: &str, val: i64) {
        let entry = self
            .stats
            .entry(name.to_string())
            .or_insert(StatValue::Counter(0));
        if let StatValue::Counter(v) = entry {
            *v += val;
        }
    }

    /// Adds to a memory counter.
    ///
    /// * `name` - Statistic name.
    /// * `val`  - Bytes.
    pub fn report_memory_counter(&mut self, name: &str, val: u64) {
        let entry = self
            .stats
            .entry(name.to_string())
            .or_insert(StatValue::Memory(0));
        if let StatValue::Memory(v) = entry {
            *v += val;
        }
    }

    /// Merges an integer distribution.
    ///
    /// * `name`    - Statistic name.
    /// * `distrib` - Distribution.
    pub fn report_int_distribution(&mut self, name: &str, distrib: StatsDistribution) {
        let entry = self
            .stats
            .entry(name.to_string())
            .or_insert(StatValue::Distribution(StatsDistribution::default()));
        if let StatValue::Distribution(d) = entry {
            d.merge(&distrib);
        }
    }

    /// Returns an accumulated counter value; 0 if it was never reported.
    ///
    /// * `name` - Statistic name.
    pub fn counter(&self, name: &str) -> i64 {
        match self.stats.get(name) {
            Some(StatValue::Counter(v)) => *v,
            _ => 0,
        }
    }

    /// Prints the report.
    pub fn print(&self) {
        print!("{self}");
    }
}

impl fmt::Display for StatsAccumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut categories: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, stat) in self.stats.iter() {
            if let Some(value) = stat.display() {
                let (category, title) = name.split_once('/').unwrap_or(("", name));
                categories
                    .entry(category)
                    .or_default()
                    .push(format!("{title:-42}{value}"));
            }
        }

        writeln!(f, "Statistics:")?;
        for (category, items) in categories {
            writeln!(f, "  {category}")?;
            for item in items {
                writeln!(f, "    {item}")?;
            }
        }
        Ok(())
    }
}
