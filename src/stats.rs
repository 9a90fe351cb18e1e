/// Draw-count aggregate over repeated runs.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunStatistics {
    pub runs: usize,
    pub total_draws: usize,
    pub max_draws: usize,
}

impl RunStatistics {
    pub fn observe(&mut self, draws: usize) {
        self.runs += 1;
        self.total_draws += draws;
        self.max_draws = self.max_draws.max(draws);
    }

    pub fn average_draws(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.total_draws as f64 / self.runs as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_statistics_average_to_zero() {
        let stats = RunStatistics::default();
        assert_eq!(stats.average_draws(), 0.0);
        assert_eq!(stats.max_draws, 0);
    }

    #[test]
    fn observe_tracks_total_and_max() {
        let mut stats = RunStatistics::default();
        for draws in [1, 4, 2, 1] {
            stats.observe(draws);
        }
        assert_eq!(stats.runs, 4);
        assert_eq!(stats.total_draws, 8);
        assert_eq!(stats.max_draws, 4);
        assert!((stats.average_draws() - 2.0).abs() < 1e-12);
    }
}
