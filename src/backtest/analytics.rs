//! Backtest analytics and reporting

use super::ReplayReport;
use serde::Serialize;

/// Trading days per year used for annualization
const PERIODS_PER_YEAR: f64 = 252.0;

/// Summary statistics from a replay
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub initial_balance: f64,
    pub final_equity: f64,
    /// Final equity / initial balance - 1
    pub total_return: f64,
    /// Total return compounded to a 252-period year
    pub annualized_return: f64,
    /// Mean over standard deviation of per-trade returns, scaled by sqrt(252)
    pub sharpe_ratio: f64,
    /// Fraction of closed trades with positive P&L
    pub win_rate: f64,
    /// Gross profit over gross loss; `None` when nothing was lost
    pub profit_factor: Option<f64>,
    /// Maximum drawdown (absolute)
    pub max_drawdown: f64,
    /// Maximum drawdown (fraction of peak)
    pub max_drawdown_pct: f64,
    /// Closed trades
    pub total_trades: usize,
    pub entry_signals: usize,
    pub bars: usize,
    pub notices: usize,
    pub ledger_failures: usize,
}

impl BacktestSummary {
    /// Compute statistics from a replay report
    pub fn from_report(report: &ReplayReport) -> Self {
        let total_return = if report.initial_balance > 0.0 {
            report.final_equity / report.initial_balance - 1.0
        } else {
            0.0
        };
        let annualized_return = if report.bars > 0 && total_return > -1.0 {
            (1.0 + total_return).powf(PERIODS_PER_YEAR / report.bars as f64) - 1.0
        } else {
            0.0
        };

        let returns: Vec<f64> = report.exits().map(|x| x.return_pct()).collect();
        let pnls: Vec<f64> = report.exits().map(|x| x.pnl).collect();

        let wins = pnls.iter().filter(|p| **p > 0.0).count();
        let win_rate = if pnls.is_empty() {
            0.0
        } else {
            wins as f64 / pnls.len() as f64
        };

        let gross_profit: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
        let gross_loss: f64 = -pnls.iter().filter(|p| **p < 0.0).sum::<f64>();
        let profit_factor = (gross_loss > 0.0).then(|| gross_profit / gross_loss);

        Self {
            initial_balance: report.initial_balance,
            final_equity: report.final_equity,
            total_return,
            annualized_return,
            sharpe_ratio: sharpe_ratio(&returns),
            win_rate,
            profit_factor,
            max_drawdown: report.drawdown.max_drawdown,
            max_drawdown_pct: report.drawdown.max_drawdown_pct,
            total_trades: pnls.len(),
            entry_signals: report.entry_signals,
            bars: report.bars,
            notices: report.notices.len(),
            ledger_failures: report.ledger_failures.len(),
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        let profit_factor = self
            .profit_factor
            .map(|pf| format!("{pf:.2}"))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Final Equity:     {:.2} (from {:.2})
Total Return:     {:+.2}%
Annualized:       {:+.2}%
Sharpe Ratio:     {:.2}
Max Drawdown:     {:.2} ({:.2}%)
Win Rate:         {:.1}%
Profit Factor:    {}

ACTIVITY
───────────────────────────────────────────────────────
Bars:             {}
Entry Signals:    {}
Closed Trades:    {}
Notices:          {}
Ledger Failures:  {}
══════════════════════════════════════════════════════
"#,
            self.final_equity,
            self.initial_balance,
            self.total_return * 100.0,
            self.annualized_return * 100.0,
            self.sharpe_ratio,
            self.max_drawdown,
            self.max_drawdown_pct * 100.0,
            self.win_rate * 100.0,
            profit_factor,
            self.bars,
            self.entry_signals,
            self.total_trades,
            self.notices,
            self.ledger_failures,
        )
    }

    /// Format as pretty-printed JSON
    pub fn format_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Annualized Sharpe ratio of per-trade returns; 0 for fewer than two trades
/// or zero deviation
fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return 0.0;
    }
    mean / std * PERIODS_PER_YEAR.sqrt()
}
