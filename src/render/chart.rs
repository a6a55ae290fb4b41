use crate::model::Recommendation;
use serde::Serialize;

/// Series labels, in draw order. The percentages are the service's default weighting.
pub const SERIES_LABELS: [&str; 3] = ["Foundation (20%)", "Competency (50%)", "Density (30%)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChartKind {
    GroupedBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueAxis {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub label: &'static str,
    pub data: Vec<f64>,
}

/// Grouped bar chart: one group per profile, one bar per sub-score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub series: [ChartSeries; 3],
    pub y_axis: ValueAxis,
    pub responsive: bool,
}

impl ChartSpec {
    pub fn from_recommendations(recs: &[Recommendation]) -> Self {
        let labels = recs.iter().map(|r| r.profile.clone()).collect();
        let foundation = recs.iter().map(|r| r.details.foundation_score).collect();
        let competency = recs.iter().map(|r| r.details.competency_score).collect();
        let density = recs.iter().map(|r| r.details.density_score).collect();

        Self {
            kind: ChartKind::GroupedBar,
            labels,
            series: [
                ChartSeries {
                    label: SERIES_LABELS[0],
                    data: foundation,
                },
                ChartSeries {
                    label: SERIES_LABELS[1],
                    data: competency,
                },
                ChartSeries {
                    label: SERIES_LABELS[2],
                    data: density,
                },
            ],
            y_axis: ValueAxis { min: 0.0, max: 1.0 },
            responsive: true,
        }
    }

    /// Number of groups (profiles) in the chart.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Values for group `idx`, one per series.
    pub fn group(&self, idx: usize) -> Option<[f64; 3]> {
        Some([
            *self.series[0].data.get(idx)?,
            *self.series[1].data.get(idx)?,
            *self.series[2].data.get(idx)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fixtures::four_profiles;

    #[test]
    fn series_are_index_aligned_with_recommendations() {
        let result = four_profiles();
        let chart = ChartSpec::from_recommendations(&result.recommendations);
        assert_eq!(chart.len(), result.recommendations.len());
        for series in &chart.series {
            assert_eq!(series.data.len(), result.recommendations.len());
        }
        for (i, rec) in result.recommendations.iter().enumerate() {
            assert_eq!(chart.labels[i], rec.profile);
            assert_eq!(chart.series[0].data[i], rec.details.foundation_score);
            assert_eq!(chart.series[1].data[i], rec.details.competency_score);
            assert_eq!(chart.series[2].data[i], rec.details.density_score);
        }
    }

    #[test]
    fn axis_is_pinned_to_unit_range() {
        let chart = ChartSpec::from_recommendations(&four_profiles().recommendations);
        assert_eq!(chart.kind, ChartKind::GroupedBar);
        assert_eq!(chart.y_axis, ValueAxis { min: 0.0, max: 1.0 });
        assert!(chart.responsive);
        let labels: Vec<&str> = chart.series.iter().map(|s| s.label).collect();
        assert_eq!(labels, SERIES_LABELS.to_vec());
    }

    #[test]
    fn group_reads_one_value_per_series() {
        let chart = ChartSpec::from_recommendations(&four_profiles().recommendations);
        assert_eq!(chart.group(1), Some([0.7, 0.55, 0.62]));
        assert_eq!(chart.group(9), None);
    }
}
