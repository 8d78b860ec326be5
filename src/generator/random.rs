use ndarray::Array2;

use crate::*;

/// Uniform hazard placement over all possible boards.
///
/// Draws each hazard by rank among the still-free cells, which is sampling
/// without replacement: every C(total, hazards) placement is equally likely.
#[derive(Clone, Debug)]
pub struct RandomHazardGenerator {
    rng: rand::rngs::SmallRng,
}

impl RandomHazardGenerator {
    pub fn from_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            rng: rand::rngs::SmallRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self {
            rng: rand::rngs::SmallRng::from_os_rng(),
        }
    }
}

impl Default for RandomHazardGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl HazardLayoutGenerator for RandomHazardGenerator {
    fn generate(&mut self, config: BoardConfig) -> HazardLayout {
        use rand::Rng;

        let total_cells = config.total_cells();

        // optimize for full boards
        if config.hazards >= total_cells {
            if config.hazards > total_cells {
                log::warn!(
                    "board already full, generated anyway, requested {} but only fits {}",
                    config.hazards,
                    total_cells
                );
            }
            return HazardLayout::from_hazard_mask(Array2::from_elem(
                config.size.to_nd_index(),
                true,
            ));
        }

        let mut hazard_mask: Array2<bool> = Array2::default(config.size.to_nd_index());
        let mut free_cells = total_cells;
        let mut hazards_placed = 0;

        {
            let cells = hazard_mask.as_slice_mut().expect("layout should be standard");
            while hazards_placed < config.hazards {
                if free_cells == 0 {
                    break;
                }
                let mut place: CellCount = self.rng.random_range(0..free_cells);
                for (i, cell) in cells.iter_mut().enumerate() {
                    let i = i as CellCount;
                    if *cell {
                        place += 1;
                    }
                    if i == place {
                        *cell = true;
                        hazards_placed += 1;
                        free_cells -= 1;
                        break;
                    }
                }
            }
        }

        let layout = HazardLayout::from_hazard_mask(hazard_mask);
        if layout.hazard_count() != config.hazards {
            log::warn!(
                "generated hazard count mismatch, actual: {}, requested: {}",
                layout.hazard_count(),
                config.hazards
            );
        }
        layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_boards_have_exactly_the_requested_hazards() {
        let mut generator = RandomHazardGenerator::from_seed(7);
        for _ in 0..50 {
            let layout = generator.generate(BoardConfig::default());
            assert_eq!(layout.hazard_count(), 5);
            assert_eq!(layout.hazard_indices().len(), 5);
        }
    }

    #[test]
    fn same_seed_generates_the_same_board() {
        let layout_a = RandomHazardGenerator::from_seed(42).generate(BoardConfig::default());
        let layout_b = RandomHazardGenerator::from_seed(42).generate(BoardConfig::default());
        assert_eq!(layout_a, layout_b);
    }

    #[test]
    fn full_board_request_is_honored() {
        let mut generator = RandomHazardGenerator::from_seed(1);
        let layout = generator.generate(BoardConfig::new_unchecked((2, 2), 4));
        assert_eq!(layout.hazard_count(), 4);
    }

    #[test]
    fn hazard_frequency_is_uniform_across_cells() {
        const GENERATIONS: u32 = 4000;

        let config = BoardConfig::default();
        let mut generator = RandomHazardGenerator::from_seed(12345);
        let mut hits = vec![0u32; config.total_cells() as usize];

        for _ in 0..GENERATIONS {
            let layout = generator.generate(config);
            for index in layout.hazard_indices() {
                hits[index as usize] += 1;
            }
        }

        // expected frequency is hazards / total = 0.2, tolerance is over six
        // standard deviations for this sample size
        let expected = f64::from(config.hazards) / f64::from(config.total_cells());
        for (index, &count) in hits.iter().enumerate() {
            let frequency = f64::from(count) / f64::from(GENERATIONS);
            assert!(
                (frequency - expected).abs() < 0.04,
                "cell {index} hazard frequency {frequency} deviates from {expected}"
            );
        }
    }
}
