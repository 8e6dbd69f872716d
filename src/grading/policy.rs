//! 判分策略：相似度 → 整数分

/// 默认的公平性阈值，相似度不超过该值直接判 0 分
pub const DEFAULT_ZERO_THRESHOLD: f64 = 0.1;

/// 向上取整前减去的容差，避免 `10 × 0.3 = 3.0000000000000004` 多给 1 分
const CEIL_TOLERANCE: f64 = 1e-9;

/// 判分策略
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradingPolicy {
    pub zero_threshold: f64,
}

impl Default for GradingPolicy {
    fn default() -> Self {
        Self {
            zero_threshold: DEFAULT_ZERO_THRESHOLD,
        }
    }
}

impl GradingPolicy {
    pub fn new(zero_threshold: f64) -> Self {
        Self { zero_threshold }
    }

    /// 把相似度换算为得分
    ///
    /// - 负数与 NaN 先截为 0
    /// - 相似度 `<= zero_threshold` 得 0 分
    /// - 否则 `ceil(max_marks × similarity)`，并限制在 `[0, floor(max_marks)]`
    pub fn mark(&self, similarity: f64, max_marks: f64) -> u32 {
        let similarity = if similarity.is_nan() {
            0.0
        } else {
            similarity.max(0.0)
        };

        if similarity <= self.zero_threshold {
            return 0;
        }

        let upper = max_marks.floor().max(0.0);
        let raw = (max_marks * similarity - CEIL_TOLERANCE).ceil();

        raw.clamp(0.0, upper) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.mark(0.1, 10.0), 0);
        assert_eq!(policy.mark(0.05, 10.0), 0);
        assert_eq!(policy.mark(0.0, 10.0), 0);
        assert_eq!(policy.mark(0.1001, 10.0), 2);
    }

    #[test]
    fn test_ceiling() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.mark(0.55, 10.0), 6);
        assert_eq!(policy.mark(0.3, 10.0), 3);
        assert_eq!(policy.mark(0.71, 5.0), 4);
    }

    #[test]
    fn test_full_similarity_gives_max() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.mark(1.0, 10.0), 10);
        assert_eq!(policy.mark(1.0, 1.0), 1);
    }

    #[test]
    fn test_clamped_to_max_marks() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.mark(1.0000002, 10.0), 10);
        assert_eq!(policy.mark(1.0, 2.5), 2);
        assert_eq!(policy.mark(0.9, 0.0), 0);
    }

    #[test]
    fn test_negative_and_nan_similarity() {
        let policy = GradingPolicy::default();
        assert_eq!(policy.mark(-0.8, 10.0), 0);
        assert_eq!(policy.mark(f64::NAN, 10.0), 0);
    }

    #[test]
    fn test_custom_threshold() {
        let policy = GradingPolicy::new(0.5);
        assert_eq!(policy.mark(0.5, 10.0), 0);
        assert_eq!(policy.mark(0.51, 10.0), 6);
    }
}
