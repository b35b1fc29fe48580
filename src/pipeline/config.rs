//! Pipeline tuning constants and defaults, carried over verbatim from
//! the reference implementation's `PipelineConfig`.

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub ast_parsing_queue_size: usize,
    pub function_decomposition_queue_size: usize,
    pub function_analysis_queue_size: usize,
    pub ast_parsing_workers: usize,
    pub function_decomposition_workers: usize,
    pub function_analysis_workers: usize,
    pub enable_caching: bool,
    pub enable_priority_scheduling: bool,
    pub enable_dynamic_load_balancing: bool,
    pub pipeline_timeout_secs: u64,
    pub stage_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ast_parsing_queue_size: 100,
            function_decomposition_queue_size: 500,
            function_analysis_queue_size: 1000,
            ast_parsing_workers: 2,
            function_decomposition_workers: 1,
            function_analysis_workers: 4,
            enable_caching: true,
            enable_priority_scheduling: true,
            enable_dynamic_load_balancing: false,
            pipeline_timeout_secs: 300,
            stage_timeout_secs: 60,
        }
    }
}

impl PipelineConfig {
    /// Scales worker counts and queue sizes to the given core count.
    pub fn auto_adjust(&mut self, system_cores: usize) {
        self.ast_parsing_workers = (system_cores / 4).max(1);
        self.function_decomposition_workers = 1;
        self.function_analysis_workers = (system_cores / 2).max(2);

        self.ast_parsing_queue_size = self.ast_parsing_workers * 50;
        self.function_decomposition_queue_size = self.function_decomposition_workers * 500;
        self.function_analysis_queue_size = self.function_analysis_workers * 250;
    }
}

/// Additive priority bonuses for special member functions, applied on
/// top of a function task's complexity score.
pub const CONSTRUCTOR_PRIORITY_BONUS: u32 = 10;
pub const DESTRUCTOR_PRIORITY_BONUS: u32 = 15;
pub const MAIN_PRIORITY_BONUS: u32 = 100;

/// Complexity = 1 + parameter count + branch/loop count.
pub fn complexity_score(parameter_count: usize, branch_or_loop_count: usize) -> u32 {
    1 + parameter_count as u32 + branch_or_loop_count as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = PipelineConfig::default();
        assert_eq!(config.ast_parsing_queue_size, 100);
        assert_eq!(config.function_decomposition_queue_size, 500);
        assert_eq!(config.function_analysis_queue_size, 1000);
        assert_eq!(config.ast_parsing_workers, 2);
        assert_eq!(config.function_decomposition_workers, 1);
        assert_eq!(config.function_analysis_workers, 4);
        assert!(config.enable_caching);
        assert!(config.enable_priority_scheduling);
        assert!(!config.enable_dynamic_load_balancing);
        assert_eq!(config.pipeline_timeout_secs, 300);
        assert_eq!(config.stage_timeout_secs, 60);
    }

    #[test]
    fn auto_adjust_scales_by_core_count() {
        let mut config = PipelineConfig::default();
        config.auto_adjust(8);
        assert_eq!(config.ast_parsing_workers, 2);
        assert_eq!(config.function_decomposition_workers, 1);
        assert_eq!(config.function_analysis_workers, 4);
        assert_eq!(config.ast_parsing_queue_size, 100);
        assert_eq!(config.function_decomposition_queue_size, 500);
        assert_eq!(config.function_analysis_queue_size, 1000);
    }

    #[test]
    fn auto_adjust_floors_parsing_workers_at_one() {
        let mut config = PipelineConfig::default();
        config.auto_adjust(2);
        assert_eq!(config.ast_parsing_workers, 1);
        assert_eq!(config.function_analysis_workers, 2);
    }
}
