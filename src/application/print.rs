//! Plain-text print layout for a single invoice.

use std::fmt;

use bigdecimal::BigDecimal;

use crate::domain::invoice::{round_money, InvoiceDetail};

const DESCRIPTION_WIDTH: usize = 32;
const RULE_WIDTH: usize = 72;

/// Shown under the total. No tax is computed anywhere in the ledger.
pub const VAT_NOTE: &str = "All amounts exclude VAT. VAT is charged where applicable at the prevailing rate.";

fn money(value: &BigDecimal) -> String {
    round_money(value).to_string()
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width - 1).collect();
    clipped.push('…');
    clipped
}

/// Printable layout of an invoice, rendered through `Display`.
pub struct PrintedInvoice<'a>(pub &'a InvoiceDetail);

impl fmt::Display for PrintedInvoice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.0;
        let invoice = &detail.invoice;
        let rule = "-".repeat(RULE_WIDTH);

        writeln!(f, "INVOICE")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f, "Invoice:   {}", invoice.id)?;
        writeln!(f, "Bill to:   {}", invoice.client_name)?;
        writeln!(f, "Date:      {}", invoice.date.format("%Y-%m-%d"))?;
        writeln!(f, "Due date:  {}", invoice.due_date.format("%Y-%m-%d"))?;
        writeln!(f, "Status:    {}", invoice.payment_status.as_str().to_uppercase())?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<w$} {:>8} {:>14} {:>14}",
            "Description",
            "Qty",
            "Unit price",
            "Total",
            w = DESCRIPTION_WIDTH
        )?;
        writeln!(f, "{rule}")?;
        for line in &detail.line_items {
            writeln!(
                f,
                "{:<w$} {:>8} {:>14} {:>14}",
                clip(&line.description, DESCRIPTION_WIDTH),
                line.quantity,
                money(&line.unit_price),
                money(&line.total),
                w = DESCRIPTION_WIDTH
            )?;
        }
        if detail.line_items.is_empty() {
            writeln!(f, "(no line items)")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(
            f,
            "{:<w$} {:>14}",
            "TOTAL",
            money(&invoice.total_amount),
            w = RULE_WIDTH - 15
        )?;
        writeln!(f)?;
        writeln!(f, "{VAT_NOTE}")
    }
}

pub fn render_invoice(detail: &InvoiceDetail) -> String {
    PrintedInvoice(detail).to_string()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::invoice::{Invoice, LineItem, PaymentStatus};

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).expect("valid decimal")
    }

    fn detail(line_items: Vec<(&str, i32, &str, &str)>, total: &str) -> InvoiceDetail {
        let id = Uuid::new_v4();
        let now = Utc::now();
        InvoiceDetail {
            invoice: Invoice {
                id,
                client_name: "Acme".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                due_date: NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
                total_amount: dec(total),
                payment_status: PaymentStatus::Pending,
                created_at: now,
                updated_at: now,
            },
            line_items: line_items
                .into_iter()
                .map(|(d, q, p, t)| LineItem {
                    id: Uuid::new_v4(),
                    invoice_id: id,
                    description: d.to_string(),
                    quantity: q,
                    unit_price: dec(p),
                    total: dec(t),
                })
                .collect(),
        }
    }

    #[test]
    fn renders_header_lines_and_total() {
        let text = render_invoice(&detail(
            vec![("Dev", 10, "150.5", "1505"), ("Design", 5, "200", "1000")],
            "2505",
        ));

        assert!(text.starts_with("INVOICE\n"));
        assert!(text.contains("Bill to:   Acme"));
        assert!(text.contains("Date:      2024-01-15"));
        assert!(text.contains("Due date:  2024-02-15"));
        assert!(text.contains("Status:    PENDING"));
        let dev = text.lines().find(|l| l.starts_with("Dev ")).expect("Dev row");
        assert!(dev.contains("150.50"));
        assert!(dev.ends_with("1505.00"));
        let total = text.lines().find(|l| l.starts_with("TOTAL")).expect("total row");
        assert!(total.ends_with("2505.00"));
        assert!(text.contains(VAT_NOTE));
    }

    #[test]
    fn marks_empty_invoices() {
        let text = render_invoice(&detail(vec![], "0"));
        assert!(text.contains("(no line items)"));
        assert!(text.lines().any(|l| l.starts_with("TOTAL") && l.ends_with("0.00")));
    }

    #[test]
    fn display_matches_rendered_text() {
        let invoice = detail(vec![("Hosting", 1, "12", "12")], "12");
        let rendered = render_invoice(&invoice);
        assert_eq!(format!("{}", PrintedInvoice(&invoice)), rendered);
        assert!(rendered.ends_with(&format!("{VAT_NOTE}\n")));
    }

    #[test]
    fn clips_long_descriptions() {
        let long = "x".repeat(80);
        assert_eq!(clip(&long, 10).chars().count(), 10);
        assert_eq!(clip("short", 10), "short");
    }
}
