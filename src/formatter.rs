//! Response formatter
//!
//! Produces the exact user-facing reply text for each routed action.
//! All aggregate computation (kind filtering, month filtering, category
//! grouping) happens here, client-side, over the full record set.

use crate::models::Transaction;

pub const NO_EXPENSES: &str = "Nenhum gasto registrado até o momento.";
pub const NO_EXPENSES_THIS_MONTH: &str = "Nenhum gasto registrado para este mês.";
pub const NO_PURCHASES: &str = "Nenhuma compra registrada até o momento.";

/// Currency rendering: literal prefix, fixed two decimals.
pub fn brl(value: f64) -> String {
    format!("R${:.2}", value)
}

pub fn income_registered(amount: f64) -> String {
    format!("Receita de {} registrada com sucesso.", brl(amount))
}

pub fn goal_set(amount: f64) -> String {
    format!("Meta de gastos definida para {}.", brl(amount))
}

/// Total of all expenses, with a goal-comparison clause: overage when the
/// total exceeds the goal, remaining headroom otherwise.
pub fn total_expenses(records: &[Transaction], goal: f64) -> String {
    let expenses: Vec<&Transaction> = records.iter().filter(|t| t.is_expense()).collect();

    if expenses.is_empty() {
        return NO_EXPENSES.to_string();
    }

    let total: f64 = expenses.iter().map(|t| t.amount).sum();
    let mut reply = format!("O valor total de gastos é {}.", brl(total));

    if total > goal {
        reply.push_str(&format!(
            "\nVocê ultrapassou sua meta de gastos de {} em {}.",
            brl(goal),
            brl(total - goal)
        ));
    } else {
        reply.push_str(&format!(
            "\nFaltam {} para atingir sua meta de gastos de {}.",
            brl(goal - total),
            brl(goal)
        ));
    }

    reply
}

/// Total of the expenses falling in the given calendar month. No goal
/// clause on this one.
pub fn month_expenses(records: &[Transaction], month: u32) -> String {
    let total: f64 = records
        .iter()
        .filter(|t| t.is_expense() && t.in_month(month))
        .map(|t| t.amount)
        .sum();

    let any = records
        .iter()
        .any(|t| t.is_expense() && t.in_month(month));

    if !any {
        return NO_EXPENSES_THIS_MONTH.to_string();
    }

    format!("O valor total de gastos deste mês é {}.", brl(total))
}

/// Category with the highest expense sum. Ties break on the category
/// encountered first in record order.
pub fn top_category(records: &[Transaction]) -> String {
    let mut totals: Vec<(&str, f64)> = Vec::new();

    for tx in records.iter().filter(|t| t.is_expense()) {
        match totals.iter_mut().find(|(name, _)| *name == tx.category) {
            Some((_, sum)) => *sum += tx.amount,
            None => totals.push((&tx.category, tx.amount)),
        }
    }

    let Some(&(category, sum)) = totals
        .iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
    else {
        return NO_EXPENSES.to_string();
    };

    format!(
        "A categoria com mais gastos é **{}** com {}.",
        category,
        brl(sum)
    )
}

/// One line per expense, in store-return order.
pub fn list_purchases(records: &[Transaction]) -> String {
    let lines: Vec<String> = records
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| format!("- {}: {} ({})", t.description, brl(t.amount), t.category))
        .collect();

    if lines.is_empty() {
        return NO_PURCHASES.to_string();
    }

    format!("Lista de todas as compras:\n{}", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Transaction;
    use chrono::{TimeZone, Utc};

    fn expense(amount: f64, category: &str, description: &str) -> Transaction {
        Transaction::expense(amount, category, description)
    }

    fn sample_records() -> Vec<Transaction> {
        vec![
            expense(100.0, "Food", "mercado"),
            expense(50.0, "Food", "padaria"),
            expense(30.0, "Fuel", "gasolina"),
        ]
    }

    #[test]
    fn test_brl_two_decimals() {
        assert_eq!(brl(1234.5), "R$1234.50");
        assert_eq!(brl(0.0), "R$0.00");
        assert_eq!(brl(59.999), "R$60.00");
    }

    #[test]
    fn test_total_over_goal_reports_overage() {
        let reply = total_expenses(&sample_records(), 120.0);
        assert!(reply.contains("O valor total de gastos é R$180.00."));
        assert!(reply.contains("ultrapassou sua meta de gastos de R$120.00 em R$60.00"));
    }

    #[test]
    fn test_total_under_goal_reports_headroom() {
        let reply = total_expenses(&sample_records(), 500.0);
        assert!(reply.contains("O valor total de gastos é R$180.00."));
        assert!(reply.contains("Faltam R$320.00 para atingir sua meta de gastos de R$500.00."));
    }

    #[test]
    fn test_total_ignores_income_rows() {
        let mut records = sample_records();
        records.push(Transaction::income(2000.0, "salário"));
        let reply = total_expenses(&records, 500.0);
        assert!(reply.contains("R$180.00"));
    }

    #[test]
    fn test_total_empty_ledger() {
        assert_eq!(total_expenses(&[], 500.0), NO_EXPENSES);
        // Income-only ledger counts as no expenses too.
        let records = vec![Transaction::income(10.0, "pix")];
        assert_eq!(total_expenses(&records, 500.0), NO_EXPENSES);
    }

    #[test]
    fn test_month_expenses_filters_by_month() {
        let mut this_month = expense(40.0, "Food", "feira");
        this_month.timestamp = Utc.with_ymd_and_hms(2024, 7, 3, 9, 0, 0).unwrap();
        let mut other_month = expense(99.0, "Food", "jantar");
        other_month.timestamp = Utc.with_ymd_and_hms(2024, 6, 28, 20, 0, 0).unwrap();

        let records = vec![this_month, other_month];
        assert_eq!(
            month_expenses(&records, 7),
            "O valor total de gastos deste mês é R$40.00."
        );
        assert_eq!(month_expenses(&records, 5), NO_EXPENSES_THIS_MONTH);
    }

    #[test]
    fn test_top_category() {
        assert_eq!(
            top_category(&sample_records()),
            "A categoria com mais gastos é **Food** com R$150.00."
        );
    }

    #[test]
    fn test_top_category_tie_breaks_on_first_encountered() {
        let records = vec![
            expense(30.0, "Fuel", "gasolina"),
            expense(30.0, "Food", "mercado"),
        ];
        assert!(top_category(&records).contains("**Fuel**"));
    }

    #[test]
    fn test_top_category_empty() {
        assert_eq!(top_category(&[]), NO_EXPENSES);
    }

    #[test]
    fn test_list_purchases_renders_store_order() {
        let reply = list_purchases(&sample_records());
        assert_eq!(
            reply,
            "Lista de todas as compras:\n\
             - mercado: R$100.00 (Food)\n\
             - padaria: R$50.00 (Food)\n\
             - gasolina: R$30.00 (Fuel)"
        );
    }

    #[test]
    fn test_list_purchases_empty_never_renders_bare_header() {
        assert_eq!(list_purchases(&[]), NO_PURCHASES);
    }

    #[test]
    fn test_confirmations() {
        assert_eq!(
            income_registered(2000.0),
            "Receita de R$2000.00 registrada com sucesso."
        );
        assert_eq!(goal_set(500.0), "Meta de gastos definida para R$500.00.");
    }
}
