use super::ui;
use crate::core::currency::Currency;
use crate::core::subscription::SubscriptionRecord;
use crate::core::valuation::SpendingReport;
use anyhow::Result;
use comfy_table::Cell;

impl SpendingReport {
    pub fn display_as_table(&self) -> String {
        let usd = Currency::Usd.symbol();
        let mut output = format!(
            "{}\n\n",
            ui::style_text("Spending", ui::StyleType::Title)
        );

        output.push_str(&format!(
            "Monthly: {}\nYearly:  {}\nActive: {}, archived: {}\n\n",
            ui::style_text(
                &format!("{:.2} {usd}", self.total_monthly),
                ui::StyleType::TotalValue
            ),
            ui::style_text(
                &format!("{:.2} {usd}", self.yearly_total()),
                ui::StyleType::TotalLabel
            ),
            self.active_count,
            self.archived_count,
        ));

        let mut categories = ui::new_styled_table();
        categories.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell("Monthly (USD)"),
            ui::header_cell("Share"),
        ]);
        for spend in &self.by_category {
            categories.add_row(vec![
                Cell::new(spend.category.to_string()),
                ui::amount_cell(spend.amount),
                ui::percentage_cell(
                    spend.percentage_of(self.total_monthly),
                    spend.is_significant(self.total_monthly),
                ),
            ]);
        }
        output.push_str(&categories.to_string());
        output.push_str("\n\n");

        let mut subscriptions = ui::new_styled_table();
        subscriptions.set_header(vec![
            ui::header_cell("Subscription"),
            ui::header_cell("Monthly (USD)"),
        ]);
        for value in &self.by_subscription {
            subscriptions.add_row(vec![Cell::new(&value.name), ui::amount_cell(value.monthly_usd)]);
        }
        output.push_str(&subscriptions.to_string());

        output
    }
}

pub fn run(records: &[SubscriptionRecord]) -> Result<()> {
    let report = SpendingReport::build(records);

    if report.active_count == 0 {
        println!(
            "{}",
            ui::style_text(
                "Add a subscription to see analytics.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    println!("{}", report.display_as_table());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::subscription::{BillingCycle, Category};

    #[test]
    fn test_report_table() {
        let mut work =
            SubscriptionRecord::new("w", "Editor", 99.0, Currency::Usd, BillingCycle::Monthly);
        work.category = Category::Work;
        let mut tiny =
            SubscriptionRecord::new("t", "Notes", 0.5, Currency::Usd, BillingCycle::Monthly);
        tiny.category = Category::Education;

        let output = SpendingReport::build(&[work, tiny]).display_as_table();

        assert!(output.contains("99.50 $"));
        assert!(output.contains("1194.00 $"));
        assert!(output.contains("Work"));
        assert!(output.contains("99%"));
        assert!(output.contains("<1%"));
        assert!(output.contains("Editor"));
        assert!(output.contains("0.50"));
    }
}
