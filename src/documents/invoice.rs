//! Single-page PDF invoice.
//!
//! The document is assembled by hand: one page, the built-in Helvetica font
//! and a text content stream. Non-ASCII characters are replaced with `?`.

use std::fmt::Write as _;

use crate::documents::format_cents;
use crate::domain::order::Order;
use crate::domain::store::Store;

const PAGE_WIDTH: u32 = 612;
const PAGE_HEIGHT: u32 = 792;
const MARGIN: u32 = 50;
const LINE_HEIGHT: u32 = 14;
/// Lines that fit between the top and bottom margins.
const MAX_LINES: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;

/// Escape `text` for use inside a PDF literal string.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

/// Text lines printed on the invoice.
fn invoice_lines(store: &Store, order: &Order) -> Vec<String> {
    let mut lines = vec![
        store.name.clone(),
        format!("Invoice {}", order.order_number),
        format!("Date: {}", order.created_at.format("%Y-%m-%d")),
        format!("Status: {}", order.status),
        String::new(),
    ];

    if let Some(name) = &order.shipping_name {
        lines.push(format!("Ship to: {name}"));
    }
    if let Some(address) = &order.shipping_address {
        lines.extend(address.lines().map(|line| format!("  {line}")));
    }
    lines.push(String::new());

    for item in &order.items {
        let sku = item
            .sku
            .as_deref()
            .map(|sku| format!(" [{sku}]"))
            .unwrap_or_default();
        lines.push(format!(
            "{} x {}{} @ {} = {}",
            item.quantity,
            item.name,
            sku,
            format_cents(item.unit_price_cents),
            format_cents(item.line_total_cents)
        ));
    }

    lines.push(String::new());
    lines.push(format!("Subtotal: {}", format_cents(order.subtotal_cents)));
    if order.discount_cents > 0 {
        let code = order.discount_code.as_deref().unwrap_or("");
        lines.push(format!(
            "Discount {code}: -{}",
            format_cents(order.discount_cents)
        ));
    }
    lines.push(format!("Tax: {}", format_cents(order.tax_cents)));
    lines.push(format!("Shipping: {}", format_cents(order.shipping_cents)));
    lines.push(format!(
        "Total: {} {}",
        format_cents(order.total_cents),
        order.currency
    ));

    if lines.len() > MAX_LINES {
        lines.truncate(MAX_LINES - 1);
        lines.push("...".to_string());
    }

    lines
}

fn content_stream(lines: &[String]) -> String {
    let mut stream = String::new();
    let _ = writeln!(stream, "BT");
    let _ = writeln!(stream, "/F1 11 Tf");
    let _ = writeln!(stream, "{LINE_HEIGHT} TL");
    let _ = writeln!(stream, "{MARGIN} {} Td", PAGE_HEIGHT - MARGIN);
    for line in lines {
        let _ = writeln!(stream, "({}) '", escape_text(line));
    }
    let _ = writeln!(stream, "ET");
    stream
}

/// Render the invoice for `order` as PDF 1.4 bytes.
pub fn render_invoice(store: &Store, order: &Order) -> Vec<u8> {
    let stream = content_stream(&invoice_lines(store, order));

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>"
        ),
        format!("<< /Length {} >>\nstream\n{stream}endstream", stream.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        let _ = write!(pdf, "{} 0 obj\n{body}\nendobj\n", index + 1);
    }

    let xref_offset = pdf.len();
    let _ = write!(pdf, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(pdf, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        pdf,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        objects.len() + 1
    );

    pdf.into_bytes()
}
