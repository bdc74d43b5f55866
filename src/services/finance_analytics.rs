use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{DateRange, EntryKind, FinanceEntry, Project};
use crate::database::{DatabaseError, Store};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
    pub entry_count: usize,
}

impl FinanceTotals {
    /// Sums saturate at the decimal limits instead of overflowing
    fn add(&mut self, entry: &FinanceEntry) {
        match entry.kind {
            EntryKind::Income => self.income = self.income.saturating_add(entry.amount),
            EntryKind::Expense => self.expense = self.expense.saturating_add(entry.amount),
        }
        self.balance = self.income.saturating_sub(self.expense);
        self.entry_count += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub kind: EntryKind,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBreakdown {
    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPoint {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceDashboard {
    pub workspace_id: Uuid,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub totals: FinanceTotals,
    pub by_category: Vec<CategoryBreakdown>,
    pub by_project: Vec<ProjectBreakdown>,
    pub monthly: Vec<MonthlyPoint>,
}

/// Reporting reads over a workspace's finance entries
#[derive(Clone)]
pub struct FinanceAnalyticsService {
    store: Arc<dyn Store>,
}

impl FinanceAnalyticsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn get_dashboard(&self, workspace_id: Uuid, range: DateRange) -> Result<FinanceDashboard, DatabaseError> {
        let entries = self.store.list_finance_entries(workspace_id, range).await?;
        let projects = self.store.list_projects(workspace_id).await?;

        tracing::debug!(
            "Building finance dashboard for workspace {} from {} entries",
            workspace_id,
            entries.len()
        );
        Ok(summarize(workspace_id, range, &entries, &projects))
    }
}

/// Pure aggregation behind the dashboard
pub fn summarize(workspace_id: Uuid, range: DateRange, entries: &[FinanceEntry], projects: &[Project]) -> FinanceDashboard {
    let mut totals = FinanceTotals::default();
    let mut categories: HashMap<(String, EntryKind), Decimal> = HashMap::new();
    let mut per_project: HashMap<Option<Uuid>, FinanceTotals> = HashMap::new();
    let mut monthly: BTreeMap<(i32, u32), FinanceTotals> = BTreeMap::new();

    for entry in entries {
        totals.add(entry);
        let total = categories
            .entry((entry.category.clone(), entry.kind))
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(entry.amount);
        per_project.entry(entry.project_id).or_default().add(entry);
        monthly
            .entry((entry.occurred_on.year(), entry.occurred_on.month()))
            .or_default()
            .add(entry);
    }

    let mut by_category: Vec<CategoryBreakdown> = categories
        .into_iter()
        .map(|((category, kind), total)| CategoryBreakdown { category, kind, total })
        .collect();
    by_category.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
            .then_with(|| a.kind.cmp(&b.kind))
    });

    let project_names: HashMap<Uuid, &str> = projects.iter().map(|p| (p.id, p.name.as_str())).collect();
    let mut by_project: Vec<ProjectBreakdown> = per_project
        .into_iter()
        .map(|(project_id, t)| ProjectBreakdown {
            project_id,
            project_name: project_id.and_then(|id| project_names.get(&id).map(|n| n.to_string())),
            income: t.income,
            expense: t.expense,
            balance: t.balance,
        })
        .collect();
    // Named projects alphabetically, unassigned entries last
    by_project.sort_by(|a, b| match (&a.project_name, &b.project_name) {
        (Some(x), Some(y)) => x.cmp(y).then_with(|| a.project_id.cmp(&b.project_id)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.project_id.is_none().cmp(&b.project_id.is_none()),
    });

    let monthly = monthly
        .into_iter()
        .map(|((year, month), t)| MonthlyPoint {
            month: format!("{:04}-{:02}", year, month),
            income: t.income,
            expense: t.expense,
            balance: t.balance,
        })
        .collect();

    FinanceDashboard {
        workspace_id,
        from: range.from,
        to: range.to,
        totals,
        by_category,
        by_project,
        monthly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::str::FromStr;

    fn entry(project_id: Option<Uuid>, kind: EntryKind, amount: &str, category: &str, date: &str) -> FinanceEntry {
        FinanceEntry {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            project_id,
            kind,
            amount: Decimal::from_str(amount).unwrap(),
            category: category.into(),
            description: None,
            occurred_on: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            workspace_id: Uuid::nil(),
            name: name.into(),
            description: None,
            notes: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn empty_workspace_has_zero_totals() {
        let dashboard = summarize(Uuid::nil(), DateRange::default(), &[], &[]);
        assert_eq!(dashboard.totals, FinanceTotals::default());
        assert!(dashboard.monthly.is_empty());
        assert!(dashboard.by_project.is_empty());
    }

    #[test]
    fn totals_balance_and_monthly_series() {
        let web = project("Web");
        let entries = vec![
            entry(Some(web.id), EntryKind::Income, "1000.00", "Ventas", "2026-01-10"),
            entry(Some(web.id), EntryKind::Expense, "250.50", "Hosting", "2026-01-20"),
            entry(None, EntryKind::Expense, "99.50", "Oficina", "2026-02-03"),
        ];

        let dashboard = summarize(Uuid::nil(), DateRange::default(), &entries, &[web.clone()]);

        assert_eq!(dashboard.totals.income, dec("1000.00"));
        assert_eq!(dashboard.totals.expense, dec("350.00"));
        assert_eq!(dashboard.totals.balance, dec("650.00"));
        assert_eq!(dashboard.totals.entry_count, 3);

        let months: Vec<&str> = dashboard.monthly.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2026-01", "2026-02"]);
        assert_eq!(dashboard.monthly[0].balance, dec("749.50"));
        let monthly_sum: Decimal = dashboard.monthly.iter().map(|m| m.balance).sum();
        assert_eq!(monthly_sum, dashboard.totals.balance);

        assert_eq!(dashboard.by_project.len(), 2);
        assert_eq!(dashboard.by_project[0].project_name.as_deref(), Some("Web"));
        assert_eq!(dashboard.by_project[0].balance, dec("749.50"));
        assert_eq!(dashboard.by_project[1].project_id, None);
    }

    #[test]
    fn categories_sorted_by_total_descending() {
        let entries = vec![
            entry(None, EntryKind::Expense, "10", "Café", "2026-01-01"),
            entry(None, EntryKind::Expense, "40", "Viajes", "2026-01-02"),
            entry(None, EntryKind::Expense, "15", "Café", "2026-01-03"),
        ];
        let dashboard = summarize(Uuid::nil(), DateRange::default(), &entries, &[]);
        let order: Vec<(&str, Decimal)> = dashboard
            .by_category
            .iter()
            .map(|c| (c.category.as_str(), c.total))
            .collect();
        assert_eq!(order, vec![("Viajes", dec("40")), ("Café", dec("25"))]);
    }

    #[test]
    fn huge_amounts_saturate_instead_of_panicking() {
        let entries = vec![
            entry(None, EntryKind::Income, "79228162514264337593543950335", "Ventas", "2026-01-01"),
            entry(None, EntryKind::Income, "79228162514264337593543950335", "Ventas", "2026-01-02"),
        ];
        let dashboard = summarize(Uuid::nil(), DateRange::default(), &entries, &[]);
        assert_eq!(dashboard.totals.income, Decimal::MAX);
        assert_eq!(dashboard.totals.entry_count, 2);
        assert_eq!(dashboard.by_category[0].total, Decimal::MAX);
    }
}
