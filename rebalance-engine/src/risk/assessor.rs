use portfolio::{
    AccountState, PortfolioError, Position, PositionAction, Result, RiskLevel,
};

use crate::models::{
    Opportunity, PortfolioRiskAssessment, PositionRiskAssessment, ReallocationSuggestion,
    RiskThresholds, SuggestedAction, SuggestionKind,
};

/// Baseline confidence for rule-based recommendations. Advisory debates can
/// produce their own confidence per position.
const RULE_CONFIDENCE: f64 = 0.7;

/// Share of total value above which idle cash triggers a deploy suggestion.
const IDLE_CASH_PCT: f64 = 30.0;

/// Pure, deterministic risk scoring over position and account state.
/// No I/O, no mutable process state: calling any method twice with identical
/// inputs yields identical output.
pub struct RiskAssessor {
    thresholds: RiskThresholds,
}

impl RiskAssessor {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Assess a single position against the total portfolio value.
    ///
    /// Negative quantities or prices are malformed input and rejected, never
    /// silently coerced to zero.
    pub fn assess_position(
        &self,
        position: &Position,
        total_portfolio_value: f64,
    ) -> Result<PositionRiskAssessment> {
        if position.quantity < 0.0 {
            return Err(PortfolioError::InvalidInput(format!(
                "negative quantity {} for {}",
                position.quantity, position.symbol
            )));
        }
        if position.entry_price < 0.0 || position.current_price.unwrap_or(0.0) < 0.0 {
            return Err(PortfolioError::InvalidInput(format!(
                "negative price for {}",
                position.symbol
            )));
        }
        if total_portfolio_value < 0.0 {
            return Err(PortfolioError::InvalidInput(format!(
                "negative portfolio value {}",
                total_portfolio_value
            )));
        }

        let current_price = position.price();
        let market_value = position.market_value();
        let unrealized_pnl = position.unrealized_pnl();
        let pnl_pct = position.unrealized_pnl_pct();

        let concentration = if total_portfolio_value > 0.0 {
            market_value / total_portfolio_value * 100.0
        } else {
            0.0
        };

        let risk_level = risk_level_for(pnl_pct, concentration);
        let (action, reason) = self.recommend(pnl_pct, concentration, risk_level);

        Ok(PositionRiskAssessment {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            entry_price: position.entry_price,
            current_price,
            market_value,
            unrealized_pnl,
            unrealized_pnl_pct: pnl_pct,
            days_held: position.days_held,
            risk_level,
            concentration,
            recommended_action: action,
            action_reason: reason,
            target_allocation: concentration.min(self.thresholds.max_concentration_pct()),
            stop_loss_price: position.entry_price * (1.0 + self.thresholds.stop_loss_pct() / 100.0),
            take_profit_price: position.entry_price
                * (1.0 + self.thresholds.take_profit_pct() / 100.0),
            confidence_score: RULE_CONFIDENCE,
        })
    }

    /// First matching rule wins.
    fn recommend(
        &self,
        pnl_pct: f64,
        concentration: f64,
        risk_level: RiskLevel,
    ) -> (PositionAction, String) {
        if pnl_pct < self.thresholds.stop_loss_pct() {
            return (
                PositionAction::Exit,
                format!(
                    "Stop loss triggered: {:.1}% loss exceeds {:.0}% threshold",
                    pnl_pct,
                    self.thresholds.stop_loss_pct()
                ),
            );
        }
        if pnl_pct > self.thresholds.take_profit_pct() {
            return (
                PositionAction::Reduce,
                format!(
                    "Take profit opportunity: {:.1}% gain exceeds {:.0}% threshold",
                    pnl_pct,
                    self.thresholds.take_profit_pct()
                ),
            );
        }
        if concentration > self.thresholds.max_concentration_pct() {
            return (
                PositionAction::Reduce,
                format!(
                    "Position too concentrated at {:.1}% of portfolio (max {:.0}%)",
                    concentration,
                    self.thresholds.max_concentration_pct()
                ),
            );
        }
        if risk_level == RiskLevel::Critical {
            return (
                PositionAction::Exit,
                "Critical risk level - recommend full exit".into(),
            );
        }
        if risk_level == RiskLevel::High {
            return (
                PositionAction::Reduce,
                "High risk level - consider reducing exposure".into(),
            );
        }
        (
            PositionAction::Hold,
            "Position within acceptable risk parameters".into(),
        )
    }

    /// Assess the whole portfolio: totals, per-position assessments,
    /// composition metrics and the prioritized action list.
    pub fn assess_portfolio(
        &self,
        account: &AccountState,
        positions: &[Position],
    ) -> Result<PortfolioRiskAssessment> {
        if account.cash_balance < 0.0 {
            return Err(PortfolioError::InvalidInput(format!(
                "negative cash balance {} for account {}",
                account.cash_balance, account.account_id
            )));
        }

        let invested_value: f64 = positions
            .iter()
            .filter(|p| p.quantity > 0.0)
            .map(|p| p.market_value())
            .sum();
        let cash_available = account.cash_balance;
        let total_value = invested_value + cash_available;

        let mut assessed = Vec::new();
        for position in positions.iter().filter(|p| p.quantity > 0.0) {
            assessed.push(self.assess_position(position, total_value)?);
        }

        let total_unrealized_pnl: f64 = assessed.iter().map(|a| a.unrealized_pnl).sum();

        let mut assessment = PortfolioRiskAssessment {
            account_id: account.account_id.clone(),
            total_value,
            cash_available,
            invested_value,
            total_unrealized_pnl,
            overall_risk_level: RiskLevel::Low,
            diversification_score: 100.0,
            concentration_warning: false,
            max_position_concentration: 0.0,
            positions: assessed,
            rebalance_needed: false,
            capital_at_risk: 0.0,
            suggested_actions: Vec::new(),
        };

        // An all-cash portfolio is trivially healthy; nothing to suggest.
        if assessment.positions.is_empty() {
            return Ok(assessment);
        }

        self.analyze_composition(&mut assessment);
        self.generate_suggestions(&mut assessment);

        Ok(assessment)
    }

    fn analyze_composition(&self, assessment: &mut PortfolioRiskAssessment) {
        let count = assessment.positions.len();
        assessment.diversification_score = match count {
            n if n >= 10 => 90.0,
            n if n >= 5 => 70.0,
            n if n >= 3 => 50.0,
            _ => 30.0,
        };

        assessment.max_position_concentration = assessment
            .positions
            .iter()
            .map(|p| p.concentration)
            .fold(0.0, f64::max);

        if assessment.max_position_concentration > self.thresholds.max_concentration_pct() {
            assessment.concentration_warning = true;
            assessment.diversification_score -= 20.0;
        }

        let critical = count_level(&assessment.positions, RiskLevel::Critical);
        let high = count_level(&assessment.positions, RiskLevel::High);
        let moderate = count_level(&assessment.positions, RiskLevel::Moderate);

        assessment.overall_risk_level = if critical > 0 {
            RiskLevel::Critical
        } else if high as f64 > count as f64 * 0.3 {
            RiskLevel::High
        } else if moderate as f64 > count as f64 * 0.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        };

        assessment.rebalance_needed = assessment
            .positions
            .iter()
            .any(|p| p.recommended_action != PositionAction::Hold);

        assessment.capital_at_risk = assessment
            .positions
            .iter()
            .filter(|p| p.unrealized_pnl < 0.0)
            .map(|p| p.unrealized_pnl.abs())
            .sum();
    }

    fn generate_suggestions(&self, assessment: &mut PortfolioRiskAssessment) {
        let mut ordered: Vec<&PositionRiskAssessment> = assessment.positions.iter().collect();
        ordered.sort_by(|a, b| {
            let key_a = (a.recommended_action.priority(), -a.unrealized_pnl_pct.abs());
            let key_b = (b.recommended_action.priority(), -b.unrealized_pnl_pct.abs());
            key_a.partial_cmp(&key_b).unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut suggestions = Vec::new();
        for pos in ordered {
            if pos.recommended_action != PositionAction::Hold {
                suggestions.push(SuggestedAction {
                    priority: suggestions.len() + 1,
                    symbol: Some(pos.symbol.clone()),
                    action: SuggestionKind::from(pos.recommended_action),
                    reason: pos.action_reason.clone(),
                    current_value: pos.market_value,
                    pnl_pct: pos.unrealized_pnl_pct,
                    risk_level: pos.risk_level,
                });
            }
        }

        let cash_pct = if assessment.total_value > 0.0 {
            assessment.cash_available / assessment.total_value * 100.0
        } else {
            0.0
        };
        if cash_pct > IDLE_CASH_PCT {
            suggestions.push(SuggestedAction {
                priority: suggestions.len() + 1,
                symbol: None,
                action: SuggestionKind::DeployCash,
                reason: format!(
                    "Cash position at {:.1}% - consider deploying to opportunities",
                    cash_pct
                ),
                current_value: assessment.cash_available,
                pnl_pct: 0.0,
                risk_level: RiskLevel::Low,
            });
        }

        assessment.suggested_actions = suggestions;
    }

    /// Pair freed capital from REDUCE/EXIT positions against caller-supplied
    /// opportunities (top 3, equal shares). Pure function of the assessment.
    pub fn reallocation_suggestions(
        &self,
        assessment: &PortfolioRiskAssessment,
        opportunities: &[Opportunity],
    ) -> Vec<ReallocationSuggestion> {
        let to_reduce: Vec<&PositionRiskAssessment> = assessment
            .positions
            .iter()
            .filter(|p| {
                matches!(
                    p.recommended_action,
                    PositionAction::Reduce | PositionAction::Exit
                )
            })
            .collect();

        let mut suggestions = Vec::new();
        if to_reduce.is_empty() && opportunities.is_empty() {
            return suggestions;
        }

        let mut freed_capital = 0.0;
        for pos in &to_reduce {
            let amount = if pos.recommended_action == PositionAction::Exit {
                pos.market_value
            } else {
                let target_value = assessment.total_value * (pos.target_allocation / 100.0);
                (pos.market_value - target_value).max(0.0)
            };
            freed_capital += amount;

            suggestions.push(ReallocationSuggestion {
                from_symbol: Some(pos.symbol.clone()),
                to_symbol: None,
                amount,
                reason: pos.action_reason.clone(),
                priority: if pos.recommended_action == PositionAction::Exit {
                    1
                } else {
                    2
                },
                expected_benefit: "Reduce risk exposure".into(),
                risk_impact: format!(
                    "Reduces portfolio risk from {}",
                    assessment.overall_risk_level
                ),
            });
        }

        if !opportunities.is_empty() && freed_capital > 0.0 {
            let top = opportunities.len().min(3);
            for (i, opp) in opportunities.iter().take(top).enumerate() {
                suggestions.push(ReallocationSuggestion {
                    from_symbol: None,
                    to_symbol: Some(opp.symbol.clone()),
                    amount: freed_capital / top as f64,
                    reason: format!(
                        "New opportunity: {}",
                        opp.reason.as_deref().unwrap_or("identified opportunity")
                    ),
                    priority: 3 + i,
                    expected_benefit: opp
                        .expected_return
                        .clone()
                        .unwrap_or_else(|| "Potential upside".into()),
                    risk_impact: opp.risk_level.clone().unwrap_or_else(|| "moderate".into()),
                });
            }
        }

        suggestions
    }
}

/// Position risk classification. First matching rule wins, in this
/// precedence: deep losses dominate, then concentration, then stretched
/// gains.
fn risk_level_for(pnl_pct: f64, concentration: f64) -> RiskLevel {
    if pnl_pct < -20.0 {
        RiskLevel::Critical
    } else if pnl_pct < -10.0 {
        RiskLevel::High
    } else if concentration > 40.0 {
        RiskLevel::High
    } else if concentration > 25.0 {
        RiskLevel::Moderate
    } else if pnl_pct > 30.0 {
        // Profit-taking territory: a large gain can reverse.
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

fn count_level(positions: &[PositionRiskAssessment], level: RiskLevel) -> usize {
    positions.iter().filter(|p| p.risk_level == level).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use portfolio::AccountId;

    fn assessor() -> RiskAssessor {
        RiskAssessor::new(RiskThresholds::default())
    }

    fn account(cash: f64) -> AccountState {
        AccountState::new(AccountId::new("test"), cash)
    }

    #[test]
    fn test_deep_loss_is_critical_exit() {
        // Entry $150, current $100 -> -33.3% pnl.
        let position = Position::new("AAPL", 10.0, 150.0).with_current_price(100.0);
        let a = assessor().assess_position(&position, 10000.0).unwrap();

        assert_eq!(a.risk_level, RiskLevel::Critical);
        assert_eq!(a.recommended_action, PositionAction::Exit);
        assert!(a.action_reason.contains("Stop loss"), "{}", a.action_reason);
        assert!((a.unrealized_pnl_pct + 33.333333).abs() < 1e-3);
    }

    #[test]
    fn test_large_gain_is_moderate_reduce() {
        // Entry $100, current $135 -> +35% pnl, 10% concentration.
        let position = Position::new("NVDA", 10.0, 100.0).with_current_price(135.0);
        let a = assessor().assess_position(&position, 13500.0).unwrap();

        assert_eq!(a.risk_level, RiskLevel::Moderate);
        assert_eq!(a.recommended_action, PositionAction::Reduce);
        assert!(
            a.action_reason.contains("Take profit"),
            "{}",
            a.action_reason
        );
        assert!((a.concentration - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_concentration_rules() {
        // Flat pnl, 45% of portfolio -> HIGH risk, over-concentration reduce.
        let position = Position::new("TSLA", 45.0, 100.0).with_current_price(100.0);
        let a = assessor().assess_position(&position, 10000.0).unwrap();

        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.recommended_action, PositionAction::Reduce);
        assert!(a.action_reason.contains("concentrated"), "{}", a.action_reason);
        assert!((a.target_allocation - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_portfolio_value_zero_concentration() {
        let position = Position::new("AAPL", 0.0, 0.0);
        let a = assessor().assess_position(&position, 0.0).unwrap();
        assert_eq!(a.concentration, 0.0);
        assert_eq!(a.unrealized_pnl_pct, 0.0);
        assert!(!a.concentration.is_nan());
    }

    #[test]
    fn test_negative_quantity_rejected() {
        let mut position = Position::new("AAPL", 5.0, 100.0);
        position.quantity = -5.0;
        let err = assessor().assess_position(&position, 1000.0).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut position = Position::new("AAPL", 5.0, 100.0);
        position.current_price = Some(-1.0);
        let err = assessor().assess_position(&position, 1000.0).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput(_)));
    }

    #[test]
    fn test_assessment_is_deterministic() {
        let position = Position::new("MSFT", 7.0, 320.0).with_current_price(280.0);
        let first = assessor().assess_position(&position, 9000.0).unwrap();
        let second = assessor().assess_position(&position, 9000.0).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_risk_never_decreases_as_loss_deepens() {
        // Hold concentration fixed, walk pnl down; risk level must be
        // monotone non-decreasing.
        let concentration = 10.0;
        let mut last = RiskLevel::Low;
        for pnl in [5.0, -5.0, -10.5, -15.0, -20.5, -45.0] {
            let level = risk_level_for(pnl, concentration);
            assert!(
                level >= last,
                "risk decreased from {:?} to {:?} at pnl {}",
                last,
                level,
                pnl
            );
            last = level;
        }
    }

    #[test]
    fn test_stop_and_take_profit_prices() {
        let position = Position::new("AAPL", 1.0, 200.0).with_current_price(200.0);
        let a = assessor().assess_position(&position, 1000.0).unwrap();
        assert!((a.stop_loss_price - 180.0).abs() < 1e-9);
        assert!((a.take_profit_price - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_portfolio_is_healthy() {
        let a = assessor().assess_portfolio(&account(5000.0), &[]).unwrap();

        assert_eq!(a.diversification_score, 100.0);
        assert_eq!(a.overall_risk_level, RiskLevel::Low);
        assert!(!a.rebalance_needed);
        assert!(a.suggested_actions.is_empty());
        assert!((a.total_value - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_total_is_cash_plus_invested() {
        let positions = vec![
            Position::new("AAPL", 10.0, 100.0).with_current_price(110.0),
            Position::new("MSFT", 5.0, 200.0).with_current_price(180.0),
        ];
        let a = assessor()
            .assess_portfolio(&account(1000.0), &positions)
            .unwrap();

        assert!((a.invested_value - 2000.0).abs() < 1e-9);
        assert!((a.total_value - (a.cash_available + a.invested_value)).abs() < 1e-9);
        assert!((a.total_unrealized_pnl - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_diversification_tiers() {
        let make = |n: usize| -> Vec<Position> {
            (0..n)
                .map(|i| Position::new(format!("SYM{}", i), 1.0, 100.0).with_current_price(100.0))
                .collect()
        };
        let score = |n: usize| {
            assessor()
                .assess_portfolio(&account(100000.0), &make(n))
                .unwrap()
                .diversification_score
        };

        assert_eq!(score(1), 30.0);
        assert_eq!(score(3), 50.0);
        assert_eq!(score(5), 70.0);
        assert_eq!(score(10), 90.0);
    }

    #[test]
    fn test_concentration_warning_docks_diversification() {
        // 5 positions but one is half the book.
        let mut positions = vec![Position::new("BIG", 50.0, 100.0).with_current_price(100.0)];
        for i in 0..4 {
            positions.push(Position::new(format!("S{}", i), 1.0, 100.0).with_current_price(100.0));
        }
        let a = assessor()
            .assess_portfolio(&account(4600.0), &positions)
            .unwrap();

        assert!(a.concentration_warning);
        assert_eq!(a.diversification_score, 50.0); // 70 - 20
        assert!(a.max_position_concentration > 25.0);
    }

    #[test]
    fn test_overall_risk_critical_dominates() {
        let positions = vec![
            Position::new("LOSER", 10.0, 100.0).with_current_price(70.0), // -30% critical
            Position::new("FINE", 10.0, 100.0).with_current_price(100.0),
        ];
        let a = assessor()
            .assess_portfolio(&account(10000.0), &positions)
            .unwrap();
        assert_eq!(a.overall_risk_level, RiskLevel::Critical);
        assert!(a.rebalance_needed);
    }

    #[test]
    fn test_capital_at_risk_sums_losses_only() {
        let positions = vec![
            Position::new("DOWN", 10.0, 100.0).with_current_price(95.0), // -50
            Position::new("UP", 10.0, 100.0).with_current_price(120.0),  // +200
        ];
        let a = assessor()
            .assess_portfolio(&account(10000.0), &positions)
            .unwrap();
        assert!((a.capital_at_risk - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_suggestions_ordered_exit_before_reduce() {
        let positions = vec![
            Position::new("GAINER", 10.0, 100.0).with_current_price(125.0), // reduce
            Position::new("LOSER", 10.0, 150.0).with_current_price(100.0),  // exit
        ];
        let a = assessor()
            .assess_portfolio(&account(100000.0), &positions)
            .unwrap();

        let actions: Vec<_> = a.suggested_actions.iter().map(|s| s.action).collect();
        assert_eq!(actions[0], SuggestionKind::Exit);
        assert_eq!(actions[1], SuggestionKind::Reduce);
        assert_eq!(a.suggested_actions[0].priority, 1);
        assert_eq!(a.suggested_actions[1].priority, 2);
    }

    #[test]
    fn test_idle_cash_suggestion() {
        let positions = vec![Position::new("AAPL", 10.0, 100.0).with_current_price(100.0)];
        // 9000 cash of 10000 total -> 90% idle.
        let a = assessor()
            .assess_portfolio(&account(9000.0), &positions)
            .unwrap();

        let deploy = a
            .suggested_actions
            .iter()
            .find(|s| s.action == SuggestionKind::DeployCash)
            .expect("expected deploy_cash suggestion");
        assert!(deploy.symbol.is_none());
        assert!((deploy.current_value - 9000.0).abs() < 1e-9);
    }

    #[test]
    fn test_reallocation_pairs_freed_capital() {
        let positions = vec![
            Position::new("LOSER", 10.0, 150.0).with_current_price(100.0), // exit, frees 1000
        ];
        let a = assessor()
            .assess_portfolio(&account(9000.0), &positions)
            .unwrap();

        let opportunities = vec![
            Opportunity {
                symbol: "NVDA".into(),
                reason: Some("momentum".into()),
                ..Default::default()
            },
            Opportunity {
                symbol: "MSFT".into(),
                ..Default::default()
            },
        ];
        let suggestions = assessor().reallocation_suggestions(&a, &opportunities);

        // One reduction entry plus two opportunity pairings.
        assert_eq!(suggestions.len(), 3);
        assert_eq!(suggestions[0].from_symbol.as_deref(), Some("LOSER"));
        assert_eq!(suggestions[0].priority, 1);
        assert!((suggestions[0].amount - 1000.0).abs() < 1e-9);

        let paired: Vec<_> = suggestions[1..].iter().collect();
        assert_eq!(paired[0].to_symbol.as_deref(), Some("NVDA"));
        assert_eq!(paired[1].to_symbol.as_deref(), Some("MSFT"));
        // Equal share of freed capital.
        assert!((paired[0].amount - 500.0).abs() < 1e-9);
        assert!((paired[1].amount - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_reallocation_empty_when_healthy() {
        let positions = vec![Position::new("AAPL", 10.0, 100.0).with_current_price(101.0)];
        let a = assessor()
            .assess_portfolio(&account(9000.0), &positions)
            .unwrap();
        assert!(assessor().reallocation_suggestions(&a, &[]).is_empty());
    }
}
