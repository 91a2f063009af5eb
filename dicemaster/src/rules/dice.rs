use serde::{Deserialize, Serialize};

/// Default target for a check when the query names no `>threshold`.
pub const DEFAULT_CHECK_THRESHOLD: i32 = 10;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Advantage {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl Advantage {
    /// Recognises the single-letter advantage tokens `A` and `D`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "A" => Some(Advantage::Advantage),
            "D" => Some(Advantage::Disadvantage),
            _ => None,
        }
    }

    pub fn is_normal(&self) -> bool {
        *self == Advantage::Normal
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Critical {
    #[default]
    None,
    Success,
    Failure,
}

impl Critical {
    /// Criticals only exist on a d20, at the extremes of the aggregate.
    pub fn detect(dice_faces: u32, aggregate: i64) -> Self {
        match (dice_faces, aggregate) {
            (20, 1) => Critical::Failure,
            (20, 20) => Critical::Success,
            _ => Critical::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct RollSpec {
    pub dice_count: u32,
    pub dice_faces: u32,
    pub modifier: i32,
    /// Adjustment tokens exactly as written, e.g. `+2-1`.
    pub modifier_text: String,
    pub check_threshold: Option<i32>,
    pub advantage: Advantage,
    pub check_name: Option<String>,
}

impl Default for RollSpec {
    /// A single d20 with no modifier: what malformed notation falls back to.
    fn default() -> Self {
        Self {
            dice_count: 1,
            dice_faces: 20,
            modifier: 0,
            modifier_text: String::new(),
            check_threshold: None,
            advantage: Advantage::Normal,
            check_name: None,
        }
    }
}

impl RollSpec {
    /// Number of dice actually thrown: two for advantage and disadvantage.
    pub fn effective_dice_count(&self) -> u32 {
        if self.advantage.is_normal() {
            self.dice_count
        } else {
            2
        }
    }

    /// Advantage only makes sense for a single die, so a multi-die spec drops it.
    pub fn normalize(&mut self) {
        if self.dice_count > 1 && !self.advantage.is_normal() {
            log::debug!(
                "Dropping {:?} for a {}-die roll",
                self.advantage,
                self.dice_count
            );
            self.advantage = Advantage::Normal;
        }
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(
            f,
            "{}d{}{}",
            self.effective_dice_count(),
            self.dice_faces,
            self.modifier_text
        )?;
        match self.advantage {
            Advantage::Normal => {}
            Advantage::Advantage => write!(f, " adv")?,
            Advantage::Disadvantage => write!(f, " dis")?,
        }
        if let Some(threshold) = self.check_threshold {
            write!(f, " >{}", threshold)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CheckResult {
    pub threshold: i32,
    pub passed: bool,
}

/// The verdict shown for a check, where criticals win over the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Verdict {
    CriticalSuccess,
    CriticalFailure,
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub individual_results: Vec<u32>,
    pub aggregate: i64,
    pub final_value: i64,
    pub seed: u64,
    pub critical: Critical,
    pub check: Option<CheckResult>,
}

impl RollOutcome {
    /// Derives everything about a roll from its raw draws.
    pub fn from_draws(spec: &RollSpec, advantage: Advantage, draws: Vec<u32>, seed: u64) -> Self {
        let aggregate = aggregate(advantage, &draws);
        let final_value = (aggregate + spec.modifier as i64).max(1);
        let critical = Critical::detect(spec.dice_faces, aggregate);
        let check = spec.check_threshold.map(|threshold| CheckResult {
            threshold,
            passed: final_value >= threshold as i64,
        });

        Self {
            individual_results: draws,
            aggregate,
            final_value,
            seed,
            critical,
            check,
        }
    }

    pub fn is_critical_success(&self) -> bool {
        self.critical == Critical::Success
    }

    pub fn is_critical_failure(&self) -> bool {
        self.critical == Critical::Failure
    }

    pub fn meets(&self, threshold: i32) -> bool {
        self.final_value >= threshold as i64
    }

    pub fn verdict(&self, threshold: i32) -> Verdict {
        match self.critical {
            Critical::Success => Verdict::CriticalSuccess,
            Critical::Failure => Verdict::CriticalFailure,
            Critical::None if self.meets(threshold) => Verdict::Success,
            Critical::None => Verdict::Failure,
        }
    }

    pub fn pretty_print(&self, f: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, roll) in self.individual_results.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", roll)?;
        }
        write!(f, "] = {}", self.aggregate)?;
        match self.critical {
            Critical::Success => write!(f, " (Critical Success)")?,
            Critical::Failure => write!(f, " (Critical Failure)")?,
            Critical::None => {}
        }
        Ok(())
    }
}

/// Sum for a plain roll, highest for advantage, lowest for disadvantage.
pub fn aggregate(advantage: Advantage, draws: &[u32]) -> i64 {
    let draws = draws.iter().map(|&d| d as i64);
    match advantage {
        Advantage::Normal => draws.sum(),
        Advantage::Advantage => draws.max().unwrap_or(0),
        Advantage::Disadvantage => draws.min().unwrap_or(0),
    }
}
