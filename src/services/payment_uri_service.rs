use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use qrcode::{render::svg, QrCode};

pub const PAYEE_ADDRESS: &str = "8439100899@fam";
pub const PAYEE_NAME: &str = "Nihar Gautam";
pub const CURRENCY: &str = "INR";
pub const CAMPAIGN_LABEL: &str = "Diwali Night 2025";

const QR_MIN_SIZE: u32 = 192;

/// Characters left alone by a browser's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// UPI payment request for `amount` rupees tagged with the ticket id.
pub fn build_payment_uri(amount: u32, ticket_id: &str) -> String {
    let note = format!("{} - {}", CAMPAIGN_LABEL, ticket_id);
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu={}&tn={}",
        PAYEE_ADDRESS,
        encode_component(PAYEE_NAME),
        amount,
        CURRENCY,
        encode_component(&note)
    )
}

pub fn render_qr_svg(uri: &str) -> Result<String, qrcode::types::QrError> {
    let code = QrCode::new(uri.as_bytes())?;
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(QR_MIN_SIZE, QR_MIN_SIZE)
        .quiet_zone(true)
        .dark_color(svg::Color("#000000"))
        .light_color(svg::Color("#FFFFFF"))
        .build())
}

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}
