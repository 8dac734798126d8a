//! Receipt
//!
//! Text rendering of a priced cart for terminals.

use std::{fmt::Write, io};

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{cart::Cart, pricing::PricingError, summary::CartSummary};

/// Errors that can occur when building a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating line totals or savings.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// A single rendered cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name, or its identifier when unnamed
    pub product: String,

    /// Price of one unit
    pub unit_price: Money<'a, Currency>,

    /// Number of units
    pub quantity: u32,

    /// `unit_price × quantity`
    pub line_total: Money<'a, Currency>,

    /// Savings against the compare-at price
    pub savings: Option<Money<'a, Currency>>,
}

/// Final receipt for a priced cart.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,
    summary: CartSummary<'a>,
    shipping_base: Money<'a, Currency>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt from a cart and its summary.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total cannot be calculated.
    pub fn from_summary(
        cart: &Cart<'a>,
        summary: CartSummary<'a>,
        shipping_base: Money<'a, Currency>,
    ) -> Result<Self, ReceiptError> {
        let lines = cart
            .iter()
            .map(|item| {
                Ok(ReceiptLine {
                    product: item
                        .name()
                        .map_or_else(|| item.product_id().to_string(), str::to_string),
                    unit_price: *item.unit_price(),
                    quantity: item.quantity().get(),
                    line_total: item.line_total()?,
                    savings: item.line_savings()?,
                })
            })
            .collect::<Result<SmallVec<_>, PricingError>>()?;

        Ok(Self {
            lines,
            summary,
            shipping_base,
        })
    }

    /// Rendered lines in cart order
    #[must_use]
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Summary the receipt was built from
    #[must_use]
    pub fn summary(&self) -> &CartSummary<'a> {
        &self.summary
    }

    /// Total savings from the coupon discount and any shipping waiver.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the amounts are in different currencies.
    pub fn savings(&self) -> Result<Money<'a, Currency>, PricingError> {
        self.summary.savings(&self.shipping_base)
    }

    /// Writes the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Unit Price", "Qty", "Line Total", "Savings"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.product.clone(),
                format!("{}", line.unit_price),
                line.quantity.to_string(),
                format!("{}", line.line_total),
                line.savings
                    .map_or_else(String::new, |savings| format!("-{savings}")),
            ]);
        }

        write_receipt_table(&mut out, builder)?;
        write_receipt_summary(&mut out, self)?;

        Ok(())
    }
}

fn write_receipt_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(2..6), Alignment::right());
    table.modify(Columns::new(5..6), Color::FG_GREEN);

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_receipt_summary(
    out: &mut impl io::Write,
    receipt: &Receipt<'_>,
) -> Result<(), ReceiptError> {
    let summary = &receipt.summary;

    let mut rows: SmallVec<[(String, String); 6]> = SmallVec::new();

    rows.push((" Subtotal:".to_string(), format!("{}  ", summary.subtotal)));

    if summary.discount.to_minor_units() > 0 {
        let label = summary
            .coupon
            .as_ref()
            .map_or_else(|| " Discount:".to_string(), |code| format!(" Discount ({code}):"));

        rows.push((label, format!("-{}  ", summary.discount)));
    }

    let shipping_val = if summary.free_shipping.applies() {
        format!("\x1b[32mFree\x1b[0m ({})  ", free_shipping_reason(summary))
    } else {
        format!("{}  ", summary.shipping)
    };

    rows.push((" Shipping:".to_string(), shipping_val));

    rows.push((
        " \x1b[1mTotal:\x1b[0m".to_string(),
        format!("\x1b[1m{}  \x1b[0m", summary.total),
    ));

    let savings = receipt.savings()?;

    if savings.to_minor_units() > 0 {
        rows.push((" Savings:".to_string(), format!("{savings}  ")));
    }

    let label_width = rows
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or(0);

    let value_width = rows
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or(0);

    for (label, value) in &rows {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    writeln!(
        out,
        "\n Or {}x of {} interest-free",
        summary.installments.count(),
        summary.installments.amount()
    )
    .map_err(|_err| ReceiptError::IO)?;

    if let Some(progress) = &summary.free_shipping_progress {
        if progress.is_reached() {
            writeln!(out, " Free shipping unlocked").map_err(|_err| ReceiptError::IO)?;
        } else {
            writeln!(
                out,
                " Add {} more for free shipping",
                progress.remaining()
            )
            .map_err(|_err| ReceiptError::IO)?;
        }
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

fn free_shipping_reason(summary: &CartSummary<'_>) -> &'static str {
    match (summary.free_shipping.threshold, summary.free_shipping.coupon) {
        (true, true) => "threshold + coupon",
        (true, false) => "threshold",
        (false, _) => "coupon",
    }
}

/// Wraps runs of UTF-8 box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
