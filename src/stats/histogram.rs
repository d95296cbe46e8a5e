use serde::Serialize;

/// Configuration for histogram generation
#[derive(Debug, Clone)]
pub struct HistogramConfig {
    /// Number of equal-width bins
    pub bins: usize,
    /// Width in characters of the longest bar when rendered as text
    pub bar_width: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 20,
            bar_width: 50,
        }
    }
}

/// Equal-width histogram. Bin `i` covers `[edges[i], edges[i + 1])`; the
/// last bin also includes its upper edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values; non-finite values are ignored
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        let (mut low, mut high) = finite
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if finite.is_empty() {
            low = 0.0;
            high = 1.0;
        } else if low == high {
            low -= 0.5;
            high += 0.5;
        }

        let width = (high - low) / bins as f64;
        let edges: Vec<f64> = (0..=bins)
            .map(|i| if i == bins { high } else { low + width * i as f64 })
            .collect();

        let mut counts = vec![0; bins];
        for v in finite {
            let mut index = (((v - low) / width).floor() as usize).min(bins - 1);
            // Rounding can put a value one bin off its edges
            if index > 0 && v < edges[index] {
                index -= 1;
            } else if index + 1 < bins && v >= edges[index + 1] {
                index += 1;
            }
            counts[index] += 1;
        }

        Self { edges, counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// One line per bin: range, bar and count
    pub fn render(&self, bar_width: usize) -> String {
        let max = self.counts.iter().copied().max().unwrap_or(0);
        let mut output = String::new();

        for (i, &count) in self.counts.iter().enumerate() {
            let close = if i + 1 == self.counts.len() { ']' } else { ')' };
            let bar_len = if max == 0 {
                0
            } else {
                (count * bar_width).div_ceil(max)
            };
            output.push_str(&format!(
                "[{:.4}, {:.4}{} {} {}\n",
                self.edges[i],
                self.edges[i + 1],
                close,
                "#".repeat(bar_len),
                count
            ));
        }

        output
    }
}
