//! Deal display-name derivation.

/// Derive the opportunity display name for a deal.
///
/// The label prefers the estimate number, then the invoice number, then the
/// raw source identifier, so a deal keeps a stable name across its
/// estimate-to-job lifecycle. Applied identically on create and update.
pub fn deal_name(
    first_name: Option<&str>,
    last_name: Option<&str>,
    estimate_number: Option<&str>,
    invoice_number: Option<&str>,
    fallback_id: &str,
) -> String {
    let label = estimate_number
        .filter(|s| !s.is_empty())
        .or(invoice_number.filter(|s| !s.is_empty()))
        .unwrap_or(fallback_id);

    let first = first_name.unwrap_or("").trim();
    let last = last_name.unwrap_or("").trim();
    let full = format!("{first} {last}");
    let full = full.trim();

    if full.is_empty() {
        format!("#{label}")
    } else {
        format!("{full} #{label}")
    }
}
