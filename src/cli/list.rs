use super::ui;
use crate::core::listing;
use crate::core::reminder::ReminderSettings;
use crate::core::subscription::SubscriptionRecord;
use crate::core::valuation::monthly_equivalent;
use anyhow::Result;
use comfy_table::Cell;

/// Renders subscriptions as a table, in the order given.
pub fn display_as_table(
    title: &str,
    records: &[&SubscriptionRecord],
    settings: &ReminderSettings,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Price"),
        ui::header_cell("Cycle"),
        ui::header_cell("Category"),
        ui::header_cell("Monthly (USD)"),
        ui::header_cell("Next Billing"),
        ui::header_cell("Reminder"),
    ]);

    for record in records {
        let name = if record.is_pinned {
            format!("📌 {}", record.name)
        } else {
            record.name.clone()
        };
        let next_billing = ui::format_optional_cell(record.next_billing_date, |d| {
            d.with_timezone(&settings.timezone)
                .format("%Y-%m-%d")
                .to_string()
        });

        table.add_row(vec![
            Cell::new(name),
            Cell::new(format!("{:.2} {}", record.price, record.currency.symbol())),
            Cell::new(record.billing_cycle.to_string()),
            Cell::new(record.category.to_string()),
            ui::amount_cell(monthly_equivalent(record)),
            next_billing,
            Cell::new(record.reminder_lead.to_string()),
        ]);
    }

    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    output.push_str(&table.to_string());
    output
}

pub fn run(
    records: &[SubscriptionRecord],
    settings: &ReminderSettings,
    archived: bool,
    search: Option<&str>,
) -> Result<()> {
    let (title, listing) = if archived {
        ("Archive", listing::archived_listing(records))
    } else {
        ("Subscriptions", listing::active_listing(records, search))
    };

    if listing.is_empty() {
        println!(
            "{}",
            ui::style_text("No subscriptions to show.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    println!("{}", display_as_table(title, &listing, settings));
    Ok(())
}
