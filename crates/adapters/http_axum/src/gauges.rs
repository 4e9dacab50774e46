//! In-memory gauge registry rendered in Prometheus text exposition format.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::{Mutex, PoisonError};

use neohub_app::ports::{Gauge, MetricsSink};

type Labels = Vec<(&'static str, String)>;

struct Family {
    help: &'static str,
    samples: BTreeMap<Labels, f64>,
}

/// Latest value of every gauge series written through [`MetricsSink`].
///
/// Series are keyed by gauge name and label set; a write replaces the
/// previous value of the same series.
#[derive(Default)]
pub struct GaugeRegistry {
    families: Mutex<BTreeMap<&'static str, Family>>,
}

impl GaugeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render every series, families sorted by name.
    #[must_use]
    pub fn render(&self) -> String {
        let families = self.families.lock().unwrap_or_else(PoisonError::into_inner);
        let mut out = String::new();
        for (name, family) in families.iter() {
            let _ = writeln!(out, "# HELP {name} {}", family.help);
            let _ = writeln!(out, "# TYPE {name} gauge");
            for (labels, value) in &family.samples {
                out.push_str(name);
                if !labels.is_empty() {
                    out.push('{');
                    for (i, (key, val)) in labels.iter().enumerate() {
                        if i > 0 {
                            out.push(',');
                        }
                        let _ = write!(out, "{key}=\"{}\"", escape_label(val));
                    }
                    out.push('}');
                }
                let _ = writeln!(out, " {value}");
            }
        }
        out
    }
}

impl MetricsSink for GaugeRegistry {
    fn set_gauge(&self, gauge: Gauge, labels: &[(&'static str, &str)], value: f64) {
        let labels: Labels = labels
            .iter()
            .map(|(key, val)| (*key, (*val).to_string()))
            .collect();
        let mut families = self.families.lock().unwrap_or_else(PoisonError::into_inner);
        families
            .entry(gauge.name)
            .or_insert_with(|| Family {
                help: gauge.help,
                samples: BTreeMap::new(),
            })
            .samples
            .insert(labels, value);
    }

    fn clear_gauge(&self, gauge: Gauge) {
        self.families
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(gauge.name);
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
