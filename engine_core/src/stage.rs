/// When a module's `update()` runs within one loop iteration.
///
/// Ordering follows declaration: stages are dispatched from `Invariably` to `Render`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Stage {
    /// Instantiated, never dispatched.
    None,
    /// Every iteration.
    Invariably,
    /// Logic tick, before `Normal`.
    Pre,
    Normal,
    /// Logic tick, after `Normal`.
    Post,
    /// Render tick.
    Render,
}

impl Stage {
    pub const LOGIC: [Stage; 3] = [Stage::Pre, Stage::Normal, Stage::Post];

    pub const DISPATCHED: [Stage; 5] = [
        Stage::Invariably,
        Stage::Pre,
        Stage::Normal,
        Stage::Post,
        Stage::Render,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::None => "none",
            Stage::Invariably => "invariably",
            Stage::Pre => "pre",
            Stage::Normal => "normal",
            Stage::Post => "post",
            Stage::Render => "render",
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn is_logic(self) -> bool {
        matches!(self, Stage::Pre | Stage::Normal | Stage::Post)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_linearly_ordered() {
        assert!(Stage::None < Stage::Invariably);
        assert!(Stage::Invariably < Stage::Pre);
        assert!(Stage::Pre < Stage::Normal);
        assert!(Stage::Normal < Stage::Post);
        assert!(Stage::Post < Stage::Render);
    }

    #[test]
    fn dispatch_order_is_sorted_and_skips_none() {
        let mut sorted = Stage::DISPATCHED;
        sorted.sort();
        assert_eq!(sorted, Stage::DISPATCHED);
        assert!(!Stage::DISPATCHED.contains(&Stage::None));
        assert!(Stage::LOGIC.iter().all(|s| s.is_logic()));
        assert!(!Stage::Render.is_logic());
    }
}
