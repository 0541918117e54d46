use portfolio::Urgency;
use serde::{Deserialize, Serialize};

fn default_stop_loss_pct() -> f64 {
    -10.0
}
fn default_take_profit_pct() -> f64 {
    20.0
}
fn default_max_concentration_pct() -> f64 {
    25.0
}

/// Risk rules applied by the assessor. Immutable once constructed; passed
/// into each component at startup rather than read from process-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Loss percentage below which an exit is recommended.
    #[serde(default = "default_stop_loss_pct")]
    stop_loss_pct: f64,
    /// Gain percentage above which profit taking is recommended.
    #[serde(default = "default_take_profit_pct")]
    take_profit_pct: f64,
    /// Maximum share of portfolio value a single position may hold.
    #[serde(default = "default_max_concentration_pct")]
    max_concentration_pct: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            stop_loss_pct: default_stop_loss_pct(),
            take_profit_pct: default_take_profit_pct(),
            max_concentration_pct: default_max_concentration_pct(),
        }
    }
}

impl RiskThresholds {
    pub fn new(stop_loss_pct: f64, take_profit_pct: f64, max_concentration_pct: f64) -> Self {
        Self {
            stop_loss_pct,
            take_profit_pct,
            max_concentration_pct,
        }
    }

    pub fn stop_loss_pct(&self) -> f64 {
        self.stop_loss_pct
    }

    pub fn take_profit_pct(&self) -> f64 {
        self.take_profit_pct
    }

    pub fn max_concentration_pct(&self) -> f64 {
        self.max_concentration_pct
    }
}

fn default_enabled() -> bool {
    true
}
fn default_dry_run() -> bool {
    true
}
fn default_max_daily_trades() -> u32 {
    10
}
fn default_max_single_trade_pct() -> f64 {
    25.0
}
fn default_min_trade_value() -> f64 {
    100.0
}
fn default_cooldown_minutes() -> i64 {
    15
}
fn default_auto_exit_loss_pct() -> f64 {
    -15.0
}
fn default_auto_reduce_gain_pct() -> f64 {
    30.0
}
fn default_auto_reduce_concentration_pct() -> f64 {
    30.0
}
fn default_target_position_pct() -> f64 {
    5.0
}
fn default_max_position_pct() -> f64 {
    10.0
}
fn default_act_on_immediate() -> bool {
    true
}
fn default_act_on_high() -> bool {
    true
}

/// Safety limits and auto-action thresholds for the rebalancer. Set at
/// startup, read-only for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalanceConfig {
    #[serde(default = "default_enabled")]
    enabled: bool,
    /// When true, trades are computed and logged but never applied.
    #[serde(default = "default_dry_run")]
    dry_run: bool,

    #[serde(default = "default_max_daily_trades")]
    max_daily_trades: u32,
    /// Max % of a position tradeable in one action.
    #[serde(default = "default_max_single_trade_pct")]
    max_single_trade_pct: f64,
    /// Minimum trade notional; smaller non-SELL_ALL trades are skipped.
    #[serde(default = "default_min_trade_value")]
    min_trade_value: f64,
    /// Wait between automated trades on the same symbol.
    #[serde(default = "default_cooldown_minutes")]
    cooldown_minutes: i64,

    /// Auto-exit a position entirely when its loss exceeds this.
    #[serde(default = "default_auto_exit_loss_pct")]
    auto_exit_loss_pct: f64,
    /// Auto-take-profits when a gain exceeds this.
    #[serde(default = "default_auto_reduce_gain_pct")]
    auto_reduce_gain_pct: f64,
    /// Reduce a position above this share of portfolio value.
    #[serde(default = "default_auto_reduce_concentration_pct")]
    auto_reduce_concentration_pct: f64,

    #[serde(default = "default_target_position_pct")]
    target_position_pct: f64,
    #[serde(default = "default_max_position_pct")]
    max_position_pct: f64,

    #[serde(default = "default_act_on_immediate")]
    act_on_immediate: bool,
    #[serde(default = "default_act_on_high")]
    act_on_high: bool,
    #[serde(default)]
    act_on_medium: bool,
    #[serde(default)]
    act_on_low: bool,
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dry_run: true,
            max_daily_trades: default_max_daily_trades(),
            max_single_trade_pct: default_max_single_trade_pct(),
            min_trade_value: default_min_trade_value(),
            cooldown_minutes: default_cooldown_minutes(),
            auto_exit_loss_pct: default_auto_exit_loss_pct(),
            auto_reduce_gain_pct: default_auto_reduce_gain_pct(),
            auto_reduce_concentration_pct: default_auto_reduce_concentration_pct(),
            target_position_pct: default_target_position_pct(),
            max_position_pct: default_max_position_pct(),
            act_on_immediate: true,
            act_on_high: true,
            act_on_medium: false,
            act_on_low: false,
        }
    }
}

impl RebalanceConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_max_daily_trades(mut self, max: u32) -> Self {
        self.max_daily_trades = max;
        self
    }

    pub fn with_max_single_trade_pct(mut self, pct: f64) -> Self {
        self.max_single_trade_pct = pct;
        self
    }

    pub fn with_min_trade_value(mut self, value: f64) -> Self {
        self.min_trade_value = value;
        self
    }

    pub fn with_cooldown_minutes(mut self, minutes: i64) -> Self {
        self.cooldown_minutes = minutes;
        self
    }

    pub fn with_auto_exit_loss_pct(mut self, pct: f64) -> Self {
        self.auto_exit_loss_pct = pct;
        self
    }

    pub fn with_act_on(mut self, immediate: bool, high: bool, medium: bool, low: bool) -> Self {
        self.act_on_immediate = immediate;
        self.act_on_high = high;
        self.act_on_medium = medium;
        self.act_on_low = low;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn max_daily_trades(&self) -> u32 {
        self.max_daily_trades
    }

    pub fn max_single_trade_pct(&self) -> f64 {
        self.max_single_trade_pct
    }

    pub fn min_trade_value(&self) -> f64 {
        self.min_trade_value
    }

    pub fn cooldown_minutes(&self) -> i64 {
        self.cooldown_minutes
    }

    pub fn auto_exit_loss_pct(&self) -> f64 {
        self.auto_exit_loss_pct
    }

    pub fn auto_reduce_gain_pct(&self) -> f64 {
        self.auto_reduce_gain_pct
    }

    pub fn auto_reduce_concentration_pct(&self) -> f64 {
        self.auto_reduce_concentration_pct
    }

    pub fn target_position_pct(&self) -> f64 {
        self.target_position_pct
    }

    pub fn max_position_pct(&self) -> f64 {
        self.max_position_pct
    }

    /// Whether the rebalancer acts on an alert of the given urgency.
    pub fn act_on(&self, urgency: Urgency) -> bool {
        match urgency {
            Urgency::Immediate => self.act_on_immediate,
            Urgency::High => self.act_on_high,
            Urgency::Medium => self.act_on_medium,
            Urgency::Low => self.act_on_low,
        }
    }
}
